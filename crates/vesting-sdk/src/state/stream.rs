use anchor_lang::prelude::msg;
use vesting_common::FeePercent;

use crate::{
    state::Address,
    utils::{
        errors::{SdkError, SdkResult},
        stream_type::StreamType,
        unlock_math::{self, PauseAccounting},
    },
};

/// Fee configuration and accounting of one fee-receiving party.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PartyFee {
    pub percent: FeePercent,
    pub total: u64,
    pub withdrawn: u64,
}

/// Capabilities fixed at creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamFlags {
    pub cancelable_by_sender: bool,
    pub cancelable_by_recipient: bool,
    pub transferable_by_sender: bool,
    pub transferable_by_recipient: bool,
    pub can_topup: bool,
    pub automatic_withdrawal: bool,
    pub withdraw_frequency: u64,
    pub pausable: bool,
    pub can_update_rate: bool,
}

/// A stream decoded from either chain into one representation.
///
/// Timestamps are Unix seconds. `deposited_amount` is the net amount the recipient can ever unlock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stream {
    pub id: Address,
    pub version: u8,
    pub name: String,
    pub token_id: String,
    pub sender: Address,
    pub sender_tokens: Option<Address>,
    pub recipient: Address,
    pub recipient_tokens: Option<Address>,
    pub escrow_tokens: Option<Address>,
    pub treasury: Address,
    pub treasury_tokens: Option<Address>,
    pub partner: Address,
    pub partner_tokens: Option<Address>,
    pub created_at: u64,
    pub start: u64,
    pub end: u64,
    pub period: u64,
    pub cliff: u64,
    pub cliff_amount: u64,
    pub amount_per_period: u64,
    pub deposited_amount: u64,
    pub withdrawn_amount: u64,
    pub treasury_fee: PartyFee,
    pub partner_fee: PartyFee,
    pub flags: StreamFlags,
    pub closed: bool,
    pub canceled_at: u64,
    pub last_withdrawn_at: u64,
    pub current_pause_start: u64,
    pub pause_cumulative: u64,
    pub last_rate_change_time: u64,
    pub funds_unlocked_at_last_rate_change: u64,
    pub stream_type: StreamType,
    pub pause_accounting: PauseAccounting,
}

impl Stream {
    pub fn unlocked(&self, now: u64) -> u64 {
        unlock_math::get_unlocked_amount(self, now)
    }

    pub fn withdrawable(&self, now: u64) -> u64 {
        unlock_math::get_withdrawable_amount(self, now)
    }

    pub fn remaining(&self) -> u64 {
        unlock_math::get_remaining_amount(self)
    }

    pub fn is_paused(&self) -> bool {
        self.current_pause_start > 0
    }

    fn check_open(&self) -> SdkResult<()> {
        if self.closed {
            return Err(SdkError::invalid(format!("stream {} is closed", self.id)));
        }

        Ok(())
    }

    /// State update for a withdrawal of `amount` at `now`.
    pub fn withdraw(&mut self, amount: u64, now: u64) -> SdkResult<()> {
        self.check_open()?;

        // Check: the amount does not exceed what is currently withdrawable
        let available = self.withdrawable(now);
        if amount > available {
            return Err(SdkError::invalid(format!("withdraw amount {amount} exceeds withdrawable {available}")));
        }

        // Effect: account the withdrawal
        self.withdrawn_amount = self.withdrawn_amount.checked_add(amount).ok_or(SdkError::ArithmeticOverflow)?;
        self.last_withdrawn_at = now;

        Ok(())
    }

    /// State update for a top-up that adds `net_amount` to the deposit.
    pub fn topup(&mut self, net_amount: u64) -> SdkResult<()> {
        self.check_open()?;

        // Check: the stream accepts top-ups
        if !self.flags.can_topup {
            return Err(SdkError::invalid("stream does not allow top-ups"));
        }
        if net_amount == 0 {
            return Err(SdkError::invalid("top-up amount must be positive"));
        }

        // Effect: extend the deposit and the schedule end
        self.deposited_amount =
            self.deposited_amount.checked_add(net_amount).ok_or(SdkError::ArithmeticOverflow)?;
        self.end = self.recalculated_end()?;

        Ok(())
    }

    /// State update for a pause at `now`.
    pub fn pause(&mut self, now: u64) -> SdkResult<()> {
        self.check_open()?;

        if !self.flags.pausable {
            return Err(SdkError::invalid("stream is not pausable"));
        }
        if self.is_paused() {
            return Err(SdkError::invalid("stream is already paused"));
        }

        self.current_pause_start = now;

        Ok(())
    }

    /// State update for a resume at `now`. The paused span is folded into `pause_cumulative`.
    pub fn resume(&mut self, now: u64) -> SdkResult<()> {
        self.check_open()?;

        if !self.is_paused() {
            return Err(SdkError::invalid("stream is not paused"));
        }

        let paused_for = now.saturating_sub(self.current_pause_start);
        self.pause_cumulative = self.pause_cumulative.checked_add(paused_for).ok_or(SdkError::ArithmeticOverflow)?;
        self.current_pause_start = 0;

        // Under pre-subtracted accounting the schedule timestamps themselves move by the paused span
        if self.pause_accounting == PauseAccounting::PreSubtracted {
            let shift = |t: u64| t.checked_add(paused_for).ok_or(SdkError::ArithmeticOverflow);
            self.cliff = shift(self.cliff)?;
            self.end = shift(self.end)?;
            if self.last_rate_change_time > 0 {
                self.last_rate_change_time = shift(self.last_rate_change_time)?;
            }
        }

        Ok(())
    }

    /// State update for a rate change at `now`.
    ///
    /// The amount unlocked so far becomes the new baseline; later periods are counted from the checkpoint.
    pub fn apply_rate_change(&mut self, new_amount_per_period: u64, now: u64) -> SdkResult<()> {
        self.check_open()?;

        // Check: rate updates are allowed and the new rate can unlock something
        if !self.flags.can_update_rate {
            return Err(SdkError::invalid("stream does not allow rate updates"));
        }
        if new_amount_per_period == 0 {
            return Err(SdkError::invalid("amount per period must be positive"));
        }

        // Effect: checkpoint and switch rate
        self.funds_unlocked_at_last_rate_change = self.unlocked(now);
        self.last_rate_change_time = unlock_math::effective_time(self, now);
        self.amount_per_period = new_amount_per_period;
        self.end = self.recalculated_end()?;

        msg!(
            "Rate changed to {} per period at {}, {} unlocked so far",
            new_amount_per_period,
            self.last_rate_change_time,
            self.funds_unlocked_at_last_rate_change
        );

        Ok(())
    }

    fn recalculated_end(&self) -> SdkResult<u64> {
        if self.last_rate_change_time == 0 {
            unlock_math::calculate_end_time(
                self.cliff,
                self.cliff_amount,
                self.deposited_amount,
                self.period,
                self.amount_per_period,
            )
        } else {
            unlock_math::calculate_end_time(
                self.last_rate_change_time,
                self.funds_unlocked_at_last_rate_change,
                self.deposited_amount,
                self.period,
                self.amount_per_period,
            )
        }
    }
}

/// Payroll-like stream used across unit tests: 100 at the cliff (t=1_000), then 50 every 100 seconds up to 500.
#[cfg(test)]
pub(crate) fn sample_stream() -> Stream {
    let addr = Address::Solana(anchor_lang::prelude::Pubkey::new_unique());
    Stream {
        id: addr,
        version: 1,
        name: "payroll".to_string(),
        token_id: "mint".to_string(),
        sender: addr,
        sender_tokens: None,
        recipient: addr,
        recipient_tokens: None,
        escrow_tokens: None,
        treasury: addr,
        treasury_tokens: None,
        partner: addr,
        partner_tokens: None,
        created_at: 900,
        start: 1_000,
        end: 1_800,
        period: 100,
        cliff: 1_000,
        cliff_amount: 100,
        amount_per_period: 50,
        deposited_amount: 500,
        withdrawn_amount: 0,
        treasury_fee: PartyFee { percent: FeePercent::DEFAULT_TREASURY, total: 0, withdrawn: 0 },
        partner_fee: PartyFee::default(),
        flags: StreamFlags { pausable: true, can_update_rate: true, can_topup: true, ..Default::default() },
        closed: false,
        canceled_at: 0,
        last_withdrawn_at: 0,
        current_pause_start: 0,
        pause_cumulative: 0,
        last_rate_change_time: 0,
        funds_unlocked_at_last_rate_change: 0,
        stream_type: StreamType::Vesting,
        pause_accounting: PauseAccounting::Subtract,
    }
}
