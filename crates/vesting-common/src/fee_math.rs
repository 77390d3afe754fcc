//! Fixed-point fee percentages and the gross-up math used when funding streams.
//!
//! A fee percentage is stored with four decimals of precision, i.e. `0.25 %` is the raw value `2500`. Amounts are
//! scaled in `u128` and floored, so the protocol never receives less than the fee it advertised and the sender never
//! over-deposits by more than one unit.

use std::{fmt, str::FromStr};

use crate::errors::{MathError, MathResult};

/// Number of decimals kept for a fee percentage.
pub const FEE_PRECISION: u32 = 4;

/// `10^FEE_PRECISION`, the scale of the raw percentage value.
pub const FEE_NORMALIZER: u64 = 10_u64.pow(FEE_PRECISION);

/// Raw value of a 100 % fee: `100 * FEE_NORMALIZER`.
pub const FEE_MULTIPLIER: u64 = 100 * FEE_NORMALIZER;

/// A percentage with four decimals of fixed-point precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeePercent(u32);

impl FeePercent {
    pub const ZERO: Self = Self(0);

    /// The fee charged by the protocol treasury when the fee table has no entry for a partner.
    pub const DEFAULT_TREASURY: Self = Self(2_500);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> MathResult<Self> {
        let raw = self.0.checked_add(other.0).ok_or(MathError::Overflow)?;
        if u64::from(raw) > FEE_MULTIPLIER {
            return Err(MathError::InvalidFeePercent(format!("{}+{}", self, other)));
        }

        Ok(Self(raw))
    }
}

impl FromStr for FeePercent {
    type Err = MathError;

    /// Parses a decimal percentage such as `"0.25"` or `"1"`. More than four decimals, or a value above 100, is
    /// rejected instead of rounded.
    fn from_str(s: &str) -> MathResult<Self> {
        let invalid = || MathError::InvalidFeePercent(s.to_string());
        let (int_part, frac_part) = s.trim().split_once('.').unwrap_or((s.trim(), ""));

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if frac_part.len() > FEE_PRECISION as usize {
            return Err(invalid());
        }
        if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let int_value: u64 = if int_part.is_empty() { 0 } else { int_part.parse().map_err(|_| invalid())? };
        let frac_value: u64 = if frac_part.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac_part, width = FEE_PRECISION as usize);
            padded.parse().map_err(|_| invalid())?
        };

        let raw = int_value
            .checked_mul(FEE_NORMALIZER)
            .and_then(|v| v.checked_add(frac_value))
            .ok_or_else(invalid)?;
        if raw > FEE_MULTIPLIER {
            return Err(invalid());
        }

        Ok(Self(raw as u32))
    }
}

impl fmt::Display for FeePercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int_part = u64::from(self.0) / FEE_NORMALIZER;
        let frac_part = u64::from(self.0) % FEE_NORMALIZER;
        if frac_part == 0 {
            return write!(f, "{}", int_part);
        }

        let frac = format!("{:0width$}", frac_part, width = FEE_PRECISION as usize);
        write!(f, "{}.{}", int_part, frac.trim_end_matches('0'))
    }
}

/// Fee percentages applied to one stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeSchedule {
    pub treasury: FeePercent,
    pub partner: FeePercent,
}

impl FeeSchedule {
    pub fn total(&self) -> MathResult<FeePercent> {
        self.treasury.checked_add(self.partner)
    }
}

/// Returns the gross amount the sender must deposit so that `net_amount` remains for the recipient after
/// `total_fee` is deducted.
///
/// `gross = floor(net * (fee_raw + FEE_MULTIPLIER) / FEE_MULTIPLIER)`
pub fn calculate_total_amount_to_deposit(net_amount: u64, total_fee: FeePercent) -> MathResult<u64> {
    let scaled = (net_amount as u128)
        .checked_mul(total_fee.raw() as u128 + FEE_MULTIPLIER as u128)
        .ok_or(MathError::Overflow)?;
    let gross = scaled / FEE_MULTIPLIER as u128;

    u64::try_from(gross).map_err(|_| MathError::Overflow)
}

/// Inverse of [`calculate_total_amount_to_deposit`]. The result is within one unit of the original net amount.
pub fn strip_fees(gross_amount: u64, total_fee: FeePercent) -> MathResult<u64> {
    let scaled = (gross_amount as u128).checked_mul(FEE_MULTIPLIER as u128).ok_or(MathError::Overflow)?;
    let net = scaled / (total_fee.raw() as u128 + FEE_MULTIPLIER as u128);

    u64::try_from(net).map_err(|_| MathError::Overflow)
}

/// The absolute fee charged on `net_amount` for a single party.
pub fn fee_amount(net_amount: u64, fee: FeePercent) -> MathResult<u64> {
    let scaled = (net_amount as u128).checked_mul(fee.raw() as u128).ok_or(MathError::Overflow)?;

    u64::try_from(scaled / FEE_MULTIPLIER as u128).map_err(|_| MathError::Overflow)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parse_and_display() {
        assert_eq!("0.25".parse::<FeePercent>().unwrap().raw(), 2_500);
        assert_eq!("1".parse::<FeePercent>().unwrap().raw(), 10_000);
        assert_eq!(".5".parse::<FeePercent>().unwrap().raw(), 5_000);
        assert_eq!("0.0001".parse::<FeePercent>().unwrap().raw(), 1);
        assert_eq!(FeePercent::from_raw(2_500).to_string(), "0.25");
        assert_eq!(FeePercent::from_raw(120_000).to_string(), "12");
    }

    #[test]
    fn parse_rejects_excess_precision_and_garbage() {
        assert!("0.00001".parse::<FeePercent>().is_err());
        assert!("abc".parse::<FeePercent>().is_err());
        assert!("-1".parse::<FeePercent>().is_err());
        assert!("100.0001".parse::<FeePercent>().is_err());
        assert!("".parse::<FeePercent>().is_err());
    }

    #[test]
    fn gross_up_uses_floor() {
        // 0.25 % on 1_000_000 is exactly 2_500
        assert_eq!(calculate_total_amount_to_deposit(1_000_000, FeePercent::DEFAULT_TREASURY).unwrap(), 1_002_500);
        // 0.25 % on 399 is 0.9975, floored away
        assert_eq!(calculate_total_amount_to_deposit(399, FeePercent::DEFAULT_TREASURY).unwrap(), 399);
        assert_eq!(calculate_total_amount_to_deposit(0, FeePercent::DEFAULT_TREASURY).unwrap(), 0);
    }

    #[test]
    fn gross_up_overflow_is_an_error() {
        let fee = FeePercent::from_raw(10_000);
        assert_eq!(calculate_total_amount_to_deposit(u64::MAX, fee), Err(MathError::Overflow));
    }

    #[test]
    fn schedule_total_caps_at_hundred_percent() {
        let schedule = FeeSchedule { treasury: FeePercent::from_raw(900_000), partner: FeePercent::from_raw(200_000) };
        assert!(schedule.total().is_err());
    }

    #[test]
    fn single_party_fee() {
        assert_eq!(fee_amount(1_000_000, FeePercent::DEFAULT_TREASURY).unwrap(), 2_500);
        assert_eq!(fee_amount(1_000_000, FeePercent::ZERO).unwrap(), 0);
    }

    proptest! {
        #[test]
        fn gross_then_strip_is_within_one_unit(net in 0u64..=u64::MAX / 2, raw_fee in 0u32..=1_000_000u32) {
            let fee = FeePercent::from_raw(raw_fee);
            let gross = calculate_total_amount_to_deposit(net, fee).unwrap();
            prop_assert!(gross >= net);
            let stripped = strip_fees(gross, fee).unwrap();
            prop_assert!(stripped <= net);
            prop_assert!(net - stripped <= 1);
        }
    }
}
