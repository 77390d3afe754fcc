//! Binary encoding of program accounts.
//!
//! Every account starts with an 8-byte discriminator, `sha256("account:<Name>")[..8]`, followed by the borsh
//! encoding of its fields. Accounts are allocated at a fixed size, so trailing bytes after the fields are ignored.

pub mod bcs;
pub mod layout;

use anchor_lang::{prelude::*, AnchorDeserialize, AnchorSerialize, Discriminator, Space};
use solana_sha256_hasher::hash;

use crate::{
    state::{ClaimStatus, Contract, FeeTable, MerkleDistributor, RewardEntry, RewardPool},
    utils::{
        constants::misc::ANCHOR_DISCRIMINATOR_SIZE,
        errors::{SdkError, SdkResult},
    },
};

/// An account type the codec can decode by discriminator.
pub trait AccountRecord: Discriminator + AnchorSerialize + AnchorDeserialize {
    const KIND: &'static str;
    /// Smallest buffer, discriminator included, that can hold the account.
    const MIN_SIZE: usize;
}

impl AccountRecord for Contract {
    const KIND: &'static str = "Contract";
    const MIN_SIZE: usize = ANCHOR_DISCRIMINATOR_SIZE + Contract::INIT_SPACE;
}

impl AccountRecord for FeeTable {
    const KIND: &'static str = "FeeTable";
    // Vec length prefix only
    const MIN_SIZE: usize = ANCHOR_DISCRIMINATOR_SIZE + 4;
}

impl AccountRecord for MerkleDistributor {
    const KIND: &'static str = "MerkleDistributor";
    const MIN_SIZE: usize = ANCHOR_DISCRIMINATOR_SIZE + MerkleDistributor::INIT_SPACE;
}

impl AccountRecord for ClaimStatus {
    const KIND: &'static str = "ClaimStatus";
    const MIN_SIZE: usize = ANCHOR_DISCRIMINATOR_SIZE + ClaimStatus::INIT_SPACE;
}

impl AccountRecord for RewardPool {
    const KIND: &'static str = "RewardPool";
    const MIN_SIZE: usize = ANCHOR_DISCRIMINATOR_SIZE + RewardPool::INIT_SPACE;
}

impl AccountRecord for RewardEntry {
    const KIND: &'static str = "RewardEntry";
    const MIN_SIZE: usize = ANCHOR_DISCRIMINATOR_SIZE + RewardEntry::INIT_SPACE;
}

/// First 8 bytes of `sha256("<namespace>:<name>")`.
pub fn sighash(namespace: &str, name: &str) -> [u8; 8] {
    let preimage = format!("{}:{}", namespace, name);
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash(preimage.as_bytes()).to_bytes()[..8]);

    discriminator
}

/// Splits the discriminator off `data`.
pub fn split_discriminator(data: &[u8]) -> SdkResult<([u8; 8], &[u8])> {
    if data.len() < ANCHOR_DISCRIMINATOR_SIZE {
        return Err(SdkError::malformed("account", format!("{} bytes is shorter than a discriminator", data.len())));
    }

    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&data[..ANCHOR_DISCRIMINATOR_SIZE]);

    Ok((discriminator, &data[ANCHOR_DISCRIMINATOR_SIZE..]))
}

/// Decodes an account of a known type.
pub fn decode_record<T: AccountRecord>(data: &[u8]) -> SdkResult<T> {
    if data.len() < T::MIN_SIZE {
        return Err(SdkError::malformed(T::KIND, format!("{} bytes, expected at least {}", data.len(), T::MIN_SIZE)));
    }

    let (discriminator, mut body) = split_discriminator(data)?;
    if discriminator.as_slice() != T::DISCRIMINATOR {
        return Err(SdkError::UnsupportedDiscriminator(discriminator));
    }

    T::deserialize(&mut body).map_err(|err| SdkError::malformed(T::KIND, err))
}

/// Encodes an account, zero-filled up to its allocation size.
pub fn encode_record<T: AccountRecord>(record: &T) -> SdkResult<Vec<u8>> {
    let mut data = Vec::with_capacity(T::MIN_SIZE);
    data.extend_from_slice(T::DISCRIMINATOR);
    record.serialize(&mut data).map_err(|err| SdkError::malformed(T::KIND, err))?;
    if data.len() < T::MIN_SIZE {
        data.resize(T::MIN_SIZE, 0);
    }

    Ok(data)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedAccount {
    Contract(Box<Contract>),
    FeeTable(FeeTable),
    MerkleDistributor(Box<MerkleDistributor>),
    ClaimStatus(ClaimStatus),
    RewardPool(Box<RewardPool>),
    RewardEntry(RewardEntry),
}

/// Decodes any account the crate knows, dispatching on its discriminator.
pub fn decode_account(data: &[u8]) -> SdkResult<DecodedAccount> {
    let (discriminator, _) = split_discriminator(data)?;
    let discriminator = discriminator.as_slice();

    if discriminator == Contract::DISCRIMINATOR {
        decode_record(data).map(|contract| DecodedAccount::Contract(Box::new(contract)))
    } else if discriminator == FeeTable::DISCRIMINATOR {
        decode_record(data).map(DecodedAccount::FeeTable)
    } else if discriminator == MerkleDistributor::DISCRIMINATOR {
        decode_record(data).map(|distributor| DecodedAccount::MerkleDistributor(Box::new(distributor)))
    } else if discriminator == ClaimStatus::DISCRIMINATOR {
        decode_record(data).map(DecodedAccount::ClaimStatus)
    } else if discriminator == RewardPool::DISCRIMINATOR {
        decode_record(data).map(|pool| DecodedAccount::RewardPool(Box::new(pool)))
    } else if discriminator == RewardEntry::DISCRIMINATOR {
        decode_record(data).map(DecodedAccount::RewardEntry)
    } else {
        let mut unknown = [0u8; 8];
        unknown.copy_from_slice(discriminator);
        Err(SdkError::UnsupportedDiscriminator(unknown))
    }
}

/// Encodes `value` into a fixed-size, NUL-padded byte field.
pub fn encode_text<const N: usize>(field: &'static str, value: &str) -> SdkResult<[u8; N]> {
    let bytes = value.as_bytes();
    if bytes.len() > N {
        return Err(SdkError::InputTooLong { field, len: bytes.len(), capacity: N });
    }

    let mut out = [0u8; N];
    out[..bytes.len()].copy_from_slice(bytes);

    Ok(out)
}

/// Decodes a NUL-padded byte field, dropping the padding.
pub fn decode_text(bytes: &[u8]) -> String {
    let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{contract::sample_contract as contract, PartnerFeeRecord};

    #[test]
    fn discriminators_match_sighash() {
        assert_eq!(Contract::DISCRIMINATOR, sighash("account", "Contract").as_slice());
        assert_eq!(FeeTable::DISCRIMINATOR, sighash("account", "FeeTable").as_slice());
        assert_eq!(MerkleDistributor::DISCRIMINATOR, sighash("account", "MerkleDistributor").as_slice());
        assert_eq!(ClaimStatus::DISCRIMINATOR, sighash("account", "ClaimStatus").as_slice());
        assert_eq!(RewardPool::DISCRIMINATOR, sighash("account", "RewardPool").as_slice());
        assert_eq!(RewardEntry::DISCRIMINATOR, sighash("account", "RewardEntry").as_slice());
        assert_eq!(Contract::DISCRIMINATOR, &[172, 138, 115, 242, 121, 67, 183, 26]);
    }

    #[test]
    fn contract_round_trip_with_trailing_bytes() {
        let contract = contract();
        let mut data = encode_record(&contract).unwrap();
        assert_eq!(data.len(), Contract::MIN_SIZE);

        data.extend_from_slice(&[7; 40]);
        match decode_account(&data).unwrap() {
            DecodedAccount::Contract(decoded) => {
                assert_eq!(*decoded, contract);
                assert_eq!(decoded.name(), "payroll");
            }
            other => panic!("unexpected account {:?}", other),
        }
    }

    #[test]
    fn short_buffer_is_malformed() {
        let data = encode_record(&contract()).unwrap();
        assert!(matches!(
            decode_record::<Contract>(&data[..Contract::MIN_SIZE - 1]),
            Err(SdkError::MalformedAccount { kind: "Contract", .. })
        ));
        assert!(matches!(decode_account(&data[..5]), Err(SdkError::MalformedAccount { .. })));
    }

    #[test]
    fn unknown_discriminator_is_rejected() {
        let mut data = encode_record(&contract()).unwrap();
        data[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(matches!(decode_account(&data), Err(SdkError::UnsupportedDiscriminator([1, 2, 3, 4, 5, 6, 7, 8]))));

        let data = encode_record(&FeeTable::default()).unwrap();
        assert!(matches!(decode_record::<Contract>(&data), Err(SdkError::MalformedAccount { .. })));
    }

    #[test]
    fn fee_table_round_trip() {
        let table = FeeTable {
            entries: vec![PartnerFeeRecord { partner: Pubkey::new_unique(), partner_fee: 100, treasury_fee: 2_000 }],
        };
        let data = encode_record(&table).unwrap();
        assert_eq!(decode_account(&data).unwrap(), DecodedAccount::FeeTable(table));
    }

    #[test]
    fn text_fields() {
        let field: [u8; 8] = encode_text("name", "abc").unwrap();
        assert_eq!(field, [b'a', b'b', b'c', 0, 0, 0, 0, 0]);
        assert_eq!(decode_text(&field), "abc");
        assert_eq!(decode_text(&[0; 4]), "");

        let exact: [u8; 3] = encode_text("name", "abc").unwrap();
        assert_eq!(decode_text(&exact), "abc");

        assert!(matches!(
            encode_text::<2>("name", "abc"),
            Err(SdkError::InputTooLong { field: "name", len: 3, capacity: 2 })
        ));
    }
}
