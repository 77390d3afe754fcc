//! Field layout of the stream account, used to build byte-offset filters for account scans.

use crate::utils::{
    constants::misc::{ANCHOR_DISCRIMINATOR_SIZE, CONTRACT_PARAMS_PADDING, STREAM_NAME_CAPACITY},
    errors::{SdkError, SdkResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    U8,
    U32,
    U64,
    Pubkey,
    Bytes(usize),
    /// Length-prefixed byte vector reserved at its maximum size.
    PaddedVec(usize),
}

impl FieldKind {
    pub const fn width(&self) -> usize {
        match self {
            Self::Bool | Self::U8 => 1,
            Self::U32 => 4,
            Self::U64 => 8,
            Self::Pubkey => 32,
            Self::Bytes(len) => *len,
            Self::PaddedVec(len) => 4 + *len,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutField {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> LayoutField {
    LayoutField { name, kind }
}

use FieldKind::*;

pub const CONTRACT_LAYOUT: &[LayoutField] = &[
    field("discriminator", Bytes(ANCHOR_DISCRIMINATOR_SIZE)),
    field("version", U8),
    field("created_at", U64),
    field("amount_withdrawn", U64),
    field("canceled_at", U64),
    field("end_time", U64),
    field("last_withdrawn_at", U64),
    field("sender", Pubkey),
    field("sender_tokens", Pubkey),
    field("recipient", Pubkey),
    field("recipient_tokens", Pubkey),
    field("mint", Pubkey),
    field("escrow_tokens", Pubkey),
    field("treasury", Pubkey),
    field("treasury_tokens", Pubkey),
    field("treasury_fee_total", U64),
    field("treasury_fee_withdrawn", U64),
    field("treasury_fee_percent", U32),
    field("partner", Pubkey),
    field("partner_tokens", Pubkey),
    field("partner_fee_total", U64),
    field("partner_fee_withdrawn", U64),
    field("partner_fee_percent", U32),
    field("params.start_time", U64),
    field("params.net_amount_deposited", U64),
    field("params.period", U64),
    field("params.amount_per_period", U64),
    field("params.cliff", U64),
    field("params.cliff_amount", U64),
    field("params.cancelable_by_sender", Bool),
    field("params.cancelable_by_recipient", Bool),
    field("params.automatic_withdrawal", Bool),
    field("params.transferable_by_sender", Bool),
    field("params.transferable_by_recipient", Bool),
    field("params.can_topup", Bool),
    field("params.stream_name", Bytes(STREAM_NAME_CAPACITY)),
    field("params.withdraw_frequency", U64),
    field("params.pausable", Bool),
    field("params.can_update_rate", Bool),
    field("closed", Bool),
    field("current_pause_start", U64),
    field("pause_cumulative", U64),
    field("last_rate_change_time", U64),
    field("funds_unlocked_at_last_rate_change", U64),
    field("gross_amount_deposited", U64),
    field("padding", PaddedVec(CONTRACT_PARAMS_PADDING)),
];

/// Byte offset of `name` from the start of the account, discriminator included.
pub fn offset_of(layout: &[LayoutField], name: &str) -> Option<usize> {
    let mut offset = 0;
    for field in layout {
        if field.name == name {
            return Some(offset);
        }
        offset += field.kind.width();
    }

    None
}

pub fn layout_size(layout: &[LayoutField]) -> usize {
    layout.iter().map(|field| field.kind.width()).sum()
}

/// Matches accounts whose bytes at `offset` equal `bytes`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemcmpFilter {
    pub offset: usize,
    pub bytes: Vec<u8>,
}

/// Filter on a stream account field. The value must have exactly the width of the field.
pub fn contract_filter(name: &str, bytes: &[u8]) -> SdkResult<MemcmpFilter> {
    let field = CONTRACT_LAYOUT
        .iter()
        .find(|field| field.name == name)
        .ok_or_else(|| SdkError::invalid(format!("unknown stream field {name}")))?;
    if field.kind.width() != bytes.len() {
        return Err(SdkError::invalid(format!("{name} is {} bytes wide, got {}", field.kind.width(), bytes.len())));
    }

    let offset = offset_of(CONTRACT_LAYOUT, name).ok_or_else(|| SdkError::invalid(format!("unknown field {name}")))?;

    Ok(MemcmpFilter { offset, bytes: bytes.to_vec() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::{encode_record, AccountRecord},
        state::{contract::sample_contract, Contract},
    };

    #[test]
    fn layout_covers_the_whole_account() {
        assert_eq!(layout_size(CONTRACT_LAYOUT), Contract::MIN_SIZE);
    }

    #[test]
    fn offsets_match_the_encoding() {
        let contract = sample_contract();
        let data = encode_record(&contract).unwrap();

        for (name, expected) in [
            ("sender", contract.sender),
            ("recipient", contract.recipient),
            ("mint", contract.mint),
            ("partner", contract.partner),
        ] {
            let offset = offset_of(CONTRACT_LAYOUT, name).unwrap();
            assert_eq!(&data[offset..offset + 32], expected.as_ref(), "{name}");
        }

        let offset = offset_of(CONTRACT_LAYOUT, "gross_amount_deposited").unwrap();
        assert_eq!(&data[offset..offset + 8], &contract.gross_amount_deposited.to_le_bytes());

        let offset = offset_of(CONTRACT_LAYOUT, "params.pausable").unwrap();
        assert_eq!(data[offset], 1);
    }

    #[test]
    fn filters_check_width_and_name() {
        let filter = contract_filter("sender", &[9; 32]).unwrap();
        assert_eq!(filter.offset, offset_of(CONTRACT_LAYOUT, "sender").unwrap());
        assert!(contract_filter("sender", &[9; 8]).is_err());
        assert!(contract_filter("nonexistent", &[9; 32]).is_err());
    }
}
