use std::{fmt, str::FromStr};

use anchor_lang::prelude::*;

use crate::utils::errors::SdkError;

/// The chain family a client talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Chain {
    Solana,
    Aptos,
}

/// A 32-byte Aptos account address, displayed as `0x` followed by 64 lowercase hex digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountAddress(pub [u8; 32]);

impl AccountAddress {
    pub const LENGTH: usize = 32;

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }
}

impl FromStr for AccountAddress {
    type Err = SdkError;

    /// Accepts the short form (`0x1`) as well as the full 64-digit form.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let digits = s.trim().strip_prefix("0x").unwrap_or(s.trim());
        if digits.is_empty() || digits.len() > Self::LENGTH * 2 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SdkError::invalid(format!("invalid Aptos address {s}")));
        }

        let padded = format!("{:0>64}", digits);
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&padded[i * 2..i * 2 + 2], 16)
                .map_err(|_| SdkError::invalid(format!("invalid Aptos address {s}")))?;
        }

        Ok(Self(bytes))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// An account identifier on either supported chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Address {
    Solana(Pubkey),
    Aptos(AccountAddress),
}

impl Address {
    pub fn chain(&self) -> Chain {
        match self {
            Self::Solana(_) => Chain::Solana,
            Self::Aptos(_) => Chain::Aptos,
        }
    }

    /// Parses `s` in the native textual form of `chain`.
    pub fn parse(chain: Chain, s: &str) -> std::result::Result<Self, SdkError> {
        match chain {
            Chain::Solana => s
                .parse::<Pubkey>()
                .map(Self::Solana)
                .map_err(|_| SdkError::invalid(format!("invalid Solana address {s}"))),
            Chain::Aptos => s.parse::<AccountAddress>().map(Self::Aptos),
        }
    }

    pub fn as_solana(&self) -> std::result::Result<Pubkey, SdkError> {
        match self {
            Self::Solana(pubkey) => Ok(*pubkey),
            Self::Aptos(address) => Err(SdkError::invalid(format!("expected a Solana address, got {address}"))),
        }
    }

    pub fn as_aptos(&self) -> std::result::Result<AccountAddress, SdkError> {
        match self {
            Self::Aptos(address) => Ok(*address),
            Self::Solana(pubkey) => Err(SdkError::invalid(format!("expected an Aptos address, got {pubkey}"))),
        }
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        match self {
            Self::Solana(pubkey) => pubkey.to_bytes(),
            Self::Aptos(address) => address.to_bytes(),
        }
    }
}

impl From<Pubkey> for Address {
    fn from(pubkey: Pubkey) -> Self {
        Self::Solana(pubkey)
    }
}

impl From<AccountAddress> for Address {
    fn from(address: AccountAddress) -> Self {
        Self::Aptos(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solana(pubkey) => write!(f, "{}", pubkey),
            Self::Aptos(address) => write!(f, "{}", address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aptos_address_short_and_long_forms() {
        let short: AccountAddress = "0x1".parse().unwrap();
        assert_eq!(short.0[31], 1);
        assert_eq!(short.to_string(), format!("0x{}1", "0".repeat(63)));

        let long: AccountAddress = short.to_string().parse().unwrap();
        assert_eq!(short, long);
    }

    #[test]
    fn aptos_address_rejects_garbage() {
        assert!("0xzz".parse::<AccountAddress>().is_err());
        assert!("0x".parse::<AccountAddress>().is_err());
        assert!(format!("0x{}", "a".repeat(65)).parse::<AccountAddress>().is_err());
    }

    #[test]
    fn chain_mismatch_is_rejected() {
        let solana = Address::Solana(Pubkey::new_unique());
        assert!(solana.as_aptos().is_err());
        assert_eq!(solana.chain(), Chain::Solana);
        assert!(Address::parse(Chain::Solana, "not-base58-0OIl").is_err());
    }
}
