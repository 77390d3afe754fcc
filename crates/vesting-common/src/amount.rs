use crate::errors::{MathError, MathResult};

/// Largest number of decimals a token can have while `10^decimals` still fits in a `u64`.
pub const MAX_TOKEN_DECIMALS: u8 = 19;

/// Converts a human readable amount (`"12.5"`) into base units of a token with `decimals` decimals.
///
/// Extra precision beyond `decimals` is rejected instead of silently truncated.
pub fn to_base_units(ui_amount: &str, decimals: u8) -> MathResult<u64> {
    let invalid = || MathError::InvalidAmount(ui_amount.to_string());
    if decimals > MAX_TOKEN_DECIMALS {
        return Err(invalid());
    }

    let trimmed = ui_amount.trim();
    let (int_part, frac_part) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    // Dev: trailing zeros past the token precision carry no value and are accepted.
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.len() > decimals as usize {
        return Err(invalid());
    }

    let scale = 10_u128.pow(decimals as u32);
    let int_value: u128 = if int_part.is_empty() { 0 } else { int_part.parse().map_err(|_| MathError::Overflow)? };
    let frac_value: u128 = if frac_part.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac_part, width = decimals as usize);
        padded.parse().map_err(|_| invalid())?
    };

    let raw = int_value.checked_mul(scale).and_then(|v| v.checked_add(frac_value)).ok_or(MathError::Overflow)?;

    u64::try_from(raw).map_err(|_| MathError::Overflow)
}

/// Formats base units as a decimal string, without trailing zeros.
pub fn from_base_units(raw: u64, decimals: u8) -> String {
    if decimals == 0 {
        return raw.to_string();
    }

    let scale = 10_u128.pow(decimals.min(MAX_TOKEN_DECIMALS) as u32);
    let int_part = raw as u128 / scale;
    let frac_part = raw as u128 % scale;
    if frac_part == 0 {
        return int_part.to_string();
    }

    let frac = format!("{:0width$}", frac_part, width = decimals as usize);
    format!("{}.{}", int_part, frac.trim_end_matches('0'))
}

/// Sums amounts, failing on overflow.
pub fn checked_sum<I: IntoIterator<Item = u64>>(amounts: I) -> MathResult<u64> {
    amounts.into_iter().try_fold(0u64, |acc, amount| acc.checked_add(amount).ok_or(MathError::Overflow))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ui_amount_conversion() {
        assert_eq!(to_base_units("12.5", 6).unwrap(), 12_500_000);
        assert_eq!(to_base_units("0.000001", 6).unwrap(), 1);
        assert_eq!(to_base_units("7", 0).unwrap(), 7);
        assert_eq!(to_base_units("1.2300", 2).unwrap(), 123);
        assert_eq!(from_base_units(12_500_000, 6), "12.5");
        assert_eq!(from_base_units(1, 9), "0.000000001");
        assert_eq!(from_base_units(3_000, 3), "3");
    }

    #[test]
    fn ui_amount_rejections() {
        assert!(matches!(to_base_units("0.0000001", 6), Err(MathError::InvalidAmount(_))));
        assert!(matches!(to_base_units("1e5", 6), Err(MathError::InvalidAmount(_))));
        assert!(matches!(to_base_units("", 6), Err(MathError::InvalidAmount(_))));
        assert_eq!(to_base_units("18446744073709551616", 0), Err(MathError::Overflow));
        assert_eq!(to_base_units("18446744073709.551616", 6), Err(MathError::Overflow));
    }

    #[test]
    fn sum_overflow() {
        assert_eq!(checked_sum([1, 2, 3]).unwrap(), 6);
        assert_eq!(checked_sum([u64::MAX, 1]), Err(MathError::Overflow));
    }
}
