//! Math functions for computing unlocked, withdrawable and remaining amounts of a stream.
//!
//! Every function is pure over a [`Stream`] snapshot and an explicit `now`, so the same inputs always produce the
//! same amounts regardless of the chain the stream was decoded from.

use crate::{
    state::Stream,
    utils::errors::{SdkError, SdkResult},
};

/// How pauses are reflected in the stored timestamps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PauseAccounting {
    /// Schedule timestamps are untouched; the engine freezes time at the pause start and subtracts
    /// `pause_cumulative` from the clock.
    #[default]
    Subtract,
    /// The chain shifts the schedule timestamps by each paused span on resume; the clock is only frozen while a
    /// pause is in progress.
    PreSubtracted,
}

// -------------------------------------------------------------------------- //
//                              PUBLIC FUNCTIONS                              //
// -------------------------------------------------------------------------- //

/// The point on the schedule timeline that corresponds to wall-clock `now`.
pub fn effective_time(stream: &Stream, now: u64) -> u64 {
    let frozen = if stream.current_pause_start > 0 { now.min(stream.current_pause_start) } else { now };

    match stream.pause_accounting {
        PauseAccounting::PreSubtracted => frozen,
        PauseAccounting::Subtract => frozen.saturating_sub(stream.pause_cumulative),
    }
}

/// Calculates the amount unlocked for the recipient at `now`.
///
/// Nothing unlocks before the cliff. From the cliff on, the baseline (`cliff_amount`, or the checkpoint of the last
/// rate change) grows by `amount_per_period` per whole elapsed period, capped at the deposit.
pub fn get_unlocked_amount(stream: &Stream, now: u64) -> u64 {
    let now = effective_time(stream, now);

    if now < stream.cliff {
        return 0;
    }
    if now >= stream.end {
        return stream.deposited_amount;
    }

    let (baseline, anchor) = if stream.last_rate_change_time == 0 {
        (stream.cliff_amount, stream.cliff)
    } else {
        (stream.funds_unlocked_at_last_rate_change, stream.last_rate_change_time)
    };

    // A zero period never streams; only the baseline is unlocked
    if stream.period == 0 {
        return baseline.min(stream.deposited_amount);
    }

    let elapsed_periods = now.saturating_sub(anchor) / stream.period;

    // u64 * u64 + u64 always fits in u128
    let unlocked = elapsed_periods as u128 * stream.amount_per_period as u128 + baseline as u128;

    unlocked.min(stream.deposited_amount as u128) as u64
}

/// Calculates the amount the recipient can withdraw at `now`.
pub fn get_withdrawable_amount(stream: &Stream, now: u64) -> u64 {
    get_unlocked_amount(stream, now).saturating_sub(stream.withdrawn_amount)
}

/// The part of the deposit not yet withdrawn.
pub fn get_remaining_amount(stream: &Stream) -> u64 {
    stream.deposited_amount.saturating_sub(stream.withdrawn_amount)
}

/// Calculates the end of a schedule that unlocks `unlocked_at_anchor` at `anchor` and `amount_per_period` every
/// `period` after it, until `deposited` is reached.
pub fn calculate_end_time(
    anchor: u64,
    unlocked_at_anchor: u64,
    deposited: u64,
    period: u64,
    amount_per_period: u64,
) -> SdkResult<u64> {
    if deposited <= unlocked_at_anchor {
        return Ok(anchor);
    }
    if amount_per_period == 0 {
        return Err(SdkError::invalid("amount per period must be positive"));
    }

    let periods = (deposited - unlocked_at_anchor).div_ceil(amount_per_period);
    periods.checked_mul(period).and_then(|duration| anchor.checked_add(duration)).ok_or(SdkError::ArithmeticOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{stream::sample_stream as stream, StreamFlags};

    #[test]
    fn unlocks_in_whole_periods_after_cliff() {
        let stream = stream();
        assert_eq!(get_unlocked_amount(&stream, 999), 0);
        assert_eq!(get_unlocked_amount(&stream, 1_000), 100);
        assert_eq!(get_unlocked_amount(&stream, 1_099), 100);
        assert_eq!(get_unlocked_amount(&stream, 1_100), 150);
        assert_eq!(get_unlocked_amount(&stream, 1_250), 200);
        assert_eq!(get_unlocked_amount(&stream, 5_000), 500);
    }

    #[test]
    fn end_time_matches_schedule() {
        assert_eq!(calculate_end_time(1_000, 100, 500, 100, 50).unwrap(), 1_800);
        assert_eq!(calculate_end_time(1_000, 100, 510, 100, 50).unwrap(), 1_900);
        assert_eq!(calculate_end_time(1_000, 500, 500, 100, 50).unwrap(), 1_000);
        assert!(calculate_end_time(1_000, 0, 500, 100, 0).is_err());
        assert!(matches!(calculate_end_time(u64::MAX, 0, u64::MAX, u64::MAX, 1), Err(SdkError::ArithmeticOverflow)));
    }

    #[test]
    fn withdrawable_subtracts_withdrawn() {
        let mut stream = stream();
        stream.withdrawn_amount = 120;
        assert_eq!(get_withdrawable_amount(&stream, 1_100), 30);
        assert_eq!(get_withdrawable_amount(&stream, 1_000), 0);
        assert_eq!(get_remaining_amount(&stream), 380);
    }

    #[test]
    fn pause_freezes_unlocking_under_subtract_accounting() {
        let mut stream = stream();
        stream.pause(1_150).unwrap();
        assert_eq!(get_unlocked_amount(&stream, 1_150), 150);
        assert_eq!(get_unlocked_amount(&stream, 1_700), 150);

        stream.resume(1_350).unwrap();
        assert_eq!(stream.pause_cumulative, 200);
        // 1_400 on the clock is 1_200 on the schedule
        assert_eq!(get_unlocked_amount(&stream, 1_400), 200);
        assert_eq!(get_unlocked_amount(&stream, 1_999), 450);
        assert_eq!(get_unlocked_amount(&stream, 2_000), 500);
    }

    #[test]
    fn pre_subtracted_accounting_shifts_the_schedule() {
        let mut stream = stream();
        stream.pause_accounting = PauseAccounting::PreSubtracted;
        stream.pause(900).unwrap();
        stream.resume(1_100).unwrap();

        assert_eq!(stream.cliff, 1_200);
        assert_eq!(stream.end, 2_000);
        assert_eq!(get_unlocked_amount(&stream, 1_199), 0);
        assert_eq!(get_unlocked_amount(&stream, 1_300), 150);
    }

    #[test]
    fn pre_subtracted_pause_after_cliff_never_unlocks_backwards() {
        let mut stream = stream();
        stream.pause_accounting = PauseAccounting::PreSubtracted;
        stream.pause(1_150).unwrap();
        assert_eq!(get_unlocked_amount(&stream, 1_150), 150);
        assert_eq!(get_unlocked_amount(&stream, 1_700), 150);
        assert_eq!(get_withdrawable_amount(&stream, 1_700), 150);

        stream.resume(1_700).unwrap();
        assert_eq!(stream.cliff, 1_550);
        assert_eq!(get_unlocked_amount(&stream, 1_700), 150);
        assert_eq!(get_unlocked_amount(&stream, 1_800), 200);
    }

    #[test]
    fn rate_change_checkpoints_unlocked_amount() {
        let mut stream = stream();
        stream.apply_rate_change(100, 1_250).unwrap();

        assert_eq!(stream.funds_unlocked_at_last_rate_change, 200);
        assert_eq!(stream.last_rate_change_time, 1_250);
        assert_eq!(stream.end, 1_550);
        assert_eq!(get_unlocked_amount(&stream, 1_250), 200);
        assert_eq!(get_unlocked_amount(&stream, 1_349), 200);
        assert_eq!(get_unlocked_amount(&stream, 1_350), 300);
        assert_eq!(get_unlocked_amount(&stream, 1_550), 500);
    }

    #[test]
    fn transitions_respect_capabilities() {
        let mut stream = stream();
        stream.flags = StreamFlags::default();
        assert!(stream.pause(1_100).is_err());
        assert!(stream.apply_rate_change(10, 1_100).is_err());
        assert!(stream.topup(10).is_err());
        assert!(stream.resume(1_100).is_err());

        stream.closed = true;
        assert!(stream.withdraw(0, 1_100).is_err());
    }

    #[test]
    fn topup_extends_the_schedule() {
        let mut stream = stream();
        stream.topup(100).unwrap();
        assert_eq!(stream.deposited_amount, 600);
        assert_eq!(stream.end, 2_000);
        assert_eq!(get_unlocked_amount(&stream, 1_800), 500);
        assert_eq!(get_unlocked_amount(&stream, 2_000), 600);
    }

    #[test]
    fn withdraw_is_bounded_by_withdrawable() {
        let mut stream = stream();
        assert!(stream.withdraw(151, 1_100).is_err());
        stream.withdraw(150, 1_100).unwrap();
        assert_eq!(stream.withdrawable(1_100), 0);
        assert_eq!(stream.last_withdrawn_at, 1_100);
    }
}
