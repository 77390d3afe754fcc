use anchor_lang::prelude::*;

use crate::utils::errors::{SdkError, SdkResult};

/// An airdrop campaign: a merkle root of `(claimant, unlocked, locked)` allocations funded from `token_vault`.
#[account]
#[derive(Debug, PartialEq, Eq, InitSpace)]
pub struct MerkleDistributor {
    pub bump: u8,
    pub version: u64,
    pub root: [u8; 32],
    pub mint: Pubkey,
    pub token_vault: Pubkey,
    pub max_total_claim: u64,
    pub max_num_nodes: u64,
    pub unlock_period: u64,
    pub total_amount_claimed: u64,
    pub num_nodes_claimed: u64,
    pub start_ts: u64,
    pub end_ts: u64,
    pub clawback_start_ts: u64,
    pub clawback_receiver: Pubkey,
    pub admin: Pubkey,
    pub clawed_back: bool,
    pub claims_closable: bool,
    pub buffer: [u8; 32],
}

impl MerkleDistributor {
    pub fn has_started(&self, now: u64) -> bool {
        self.start_ts <= now
    }
}

/// Tracks the claim of one claimant in one distributor.
#[account]
#[derive(Debug, PartialEq, Eq, InitSpace)]
pub struct ClaimStatus {
    pub claimant: Pubkey,
    pub locked_amount: u64,
    pub locked_amount_withdrawn: u64,
    pub unlocked_amount: u64,
    pub last_claim_ts: u64,
    pub closed: bool,
    pub distributor: Pubkey,
    pub claims_count: u16,
    pub buffer: [u8; 24],
}

impl ClaimStatus {
    /// Amount of the locked allocation available to claim at `now`.
    ///
    /// The locked part unlocks linearly between the distributor start and end, stepping once per `unlock_period`.
    pub fn claimable_locked(&self, distributor: &MerkleDistributor, now: u64) -> u64 {
        if self.closed || now < distributor.start_ts {
            return 0;
        }

        let unlocked = if now >= distributor.end_ts {
            self.locked_amount
        } else if distributor.unlock_period == 0 {
            0
        } else {
            let total_periods = ((distributor.end_ts - distributor.start_ts) / distributor.unlock_period).max(1);
            let elapsed_periods = (now - distributor.start_ts) / distributor.unlock_period;
            let unlocked = self.locked_amount as u128 * elapsed_periods.min(total_periods) as u128 / total_periods as u128;
            unlocked as u64
        };

        unlocked.saturating_sub(self.locked_amount_withdrawn)
    }

    /// State update for a claim of the locked allocation at `now`.
    pub fn claim_locked(&mut self, distributor: &MerkleDistributor, now: u64) -> SdkResult<u64> {
        let amount = self.claimable_locked(distributor, now);

        // Check: something is claimable
        if amount == 0 {
            return Err(SdkError::invalid("nothing to claim from the locked allocation"));
        }

        // Effect: account the claim
        self.locked_amount_withdrawn =
            self.locked_amount_withdrawn.checked_add(amount).ok_or(SdkError::ArithmeticOverflow)?;
        self.last_claim_ts = now;
        self.claims_count = self.claims_count.checked_add(1).ok_or(SdkError::ArithmeticOverflow)?;

        Ok(amount)
    }
}
