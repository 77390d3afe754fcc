use anchor_lang::prelude::*;

use crate::utils::{
    constants::misc::REWARDS_PRECISION,
    errors::{SdkError, SdkResult},
};

/// Reward pool attached to a staking pool. `rewards_state` accumulates rewards per unit of effective stake, scaled
/// by `REWARDS_PRECISION`.
#[account]
#[derive(Debug, PartialEq, Eq, InitSpace)]
pub struct RewardPool {
    pub bump: u8,
    pub nonce: u8,
    pub stake_pool: Pubkey,
    pub mint: Pubkey,
    pub creator: Pubkey,
    pub authority: Pubkey,
    pub reward_amount: u64,
    pub reward_period: u64,
    pub vault: Pubkey,
    pub funded_amount: u64,
    pub claimed_amount: u64,
    pub rewards_state: u128,
    pub last_claim_period_opt: Option<u64>,
    pub buffer: [u8; 32],
}

#[account]
#[derive(Debug, PartialEq, Eq, InitSpace)]
pub struct RewardEntry {
    pub reward_pool: Pubkey,
    pub stake_entry: Pubkey,
    pub created_ts: u64,
    pub accounted_amount: u128,
    pub claimed_amount: u64,
    pub last_accounted_ts: u64,
    pub last_rewards_state: u128,
    pub buffer: [u8; 32],
}

impl RewardEntry {
    /// Rewards the entry can claim given the pool state and the entry's `effective_stake`.
    pub fn claimable(&self, pool: &RewardPool, effective_stake: u128) -> SdkResult<u64> {
        let delta = pool.rewards_state.saturating_sub(self.last_rewards_state);
        let accrued = delta.checked_mul(effective_stake).ok_or(SdkError::ArithmeticOverflow)? / REWARDS_PRECISION;
        let total = self.accounted_amount.checked_add(accrued).ok_or(SdkError::ArithmeticOverflow)?;
        let claimable = total.saturating_sub(self.claimed_amount as u128);

        u64::try_from(claimable).map_err(|_| SdkError::ArithmeticOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_account, encode_record, DecodedAccount};

    fn pool() -> RewardPool {
        RewardPool {
            bump: 254,
            nonce: 0,
            stake_pool: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            creator: Pubkey::new_unique(),
            authority: Pubkey::new_unique(),
            reward_amount: 10,
            reward_period: 86_400,
            vault: Pubkey::new_unique(),
            funded_amount: 1_000_000,
            claimed_amount: 0,
            rewards_state: 3 * REWARDS_PRECISION,
            last_claim_period_opt: None,
            buffer: [0; 32],
        }
    }

    fn entry() -> RewardEntry {
        RewardEntry {
            reward_pool: Pubkey::new_unique(),
            stake_entry: Pubkey::new_unique(),
            created_ts: 0,
            accounted_amount: 5,
            claimed_amount: 2,
            last_accounted_ts: 0,
            last_rewards_state: REWARDS_PRECISION,
            buffer: [0; 32],
        }
    }

    #[test]
    fn claimable_rewards_accrue_from_last_state() {
        let (pool, entry) = (pool(), entry());

        // 2 per unit of stake accrued on 100 units, plus 5 accounted, minus 2 claimed
        assert_eq!(entry.claimable(&pool, 100).unwrap(), 203);
    }

    #[test]
    fn reward_accounts_round_trip() {
        let mut pool = pool();
        let data = encode_record(&pool).unwrap();
        assert_eq!(decode_account(&data).unwrap(), DecodedAccount::RewardPool(Box::new(pool.clone())));

        pool.last_claim_period_opt = Some(42);
        let data = encode_record(&pool).unwrap();
        assert_eq!(decode_account(&data).unwrap(), DecodedAccount::RewardPool(Box::new(pool)));

        let entry = entry();
        let data = encode_record(&entry).unwrap();
        assert_eq!(decode_account(&data).unwrap(), DecodedAccount::RewardEntry(entry));
    }
}
