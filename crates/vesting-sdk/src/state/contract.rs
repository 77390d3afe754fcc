use anchor_lang::{prelude::*, AnchorDeserialize, AnchorSerialize};
use vesting_common::FeePercent;

use crate::{
    codec::decode_text,
    state::{Address, PartyFee, Stream, StreamFlags},
    utils::{
        constants::misc::{CONTRACT_PARAMS_PADDING, STREAM_NAME_CAPACITY},
        stream_type::classify,
        unlock_math::PauseAccounting,
    },
};

/// Creation parameters, stored verbatim inside the stream account.
#[derive(Clone, Debug, PartialEq, Eq, InitSpace, AnchorSerialize, AnchorDeserialize)]
pub struct StreamParams {
    pub start_time: u64,
    pub net_amount_deposited: u64,
    pub period: u64,
    pub amount_per_period: u64,
    pub cliff: u64,
    pub cliff_amount: u64,
    pub cancelable_by_sender: bool,
    pub cancelable_by_recipient: bool,
    pub automatic_withdrawal: bool,
    pub transferable_by_sender: bool,
    pub transferable_by_recipient: bool,
    pub can_topup: bool,
    pub stream_name: [u8; STREAM_NAME_CAPACITY],
    pub withdraw_frequency: u64,
    pub pausable: bool,
    pub can_update_rate: bool,
}

/// The stream account of the Solana stream program.
///
/// `params.net_amount_deposited` is the amount the recipient can ever unlock; fees are tracked separately per party
/// and `gross_amount_deposited` records what the sender paid in total.
#[account]
#[derive(Debug, PartialEq, Eq, InitSpace)]
pub struct Contract {
    pub version: u8,
    pub created_at: u64,
    pub amount_withdrawn: u64,
    pub canceled_at: u64,
    pub end_time: u64,
    pub last_withdrawn_at: u64,
    pub sender: Pubkey,
    pub sender_tokens: Pubkey,
    pub recipient: Pubkey,
    pub recipient_tokens: Pubkey,
    pub mint: Pubkey,
    pub escrow_tokens: Pubkey,
    pub treasury: Pubkey,
    pub treasury_tokens: Pubkey,
    pub treasury_fee_total: u64,
    pub treasury_fee_withdrawn: u64,
    pub treasury_fee_percent: u32,
    pub partner: Pubkey,
    pub partner_tokens: Pubkey,
    pub partner_fee_total: u64,
    pub partner_fee_withdrawn: u64,
    pub partner_fee_percent: u32,
    pub params: StreamParams,
    pub closed: bool,
    pub current_pause_start: u64,
    pub pause_cumulative: u64,
    pub last_rate_change_time: u64,
    pub funds_unlocked_at_last_rate_change: u64,
    pub gross_amount_deposited: u64,
    #[max_len(CONTRACT_PARAMS_PADDING)]
    pub padding: Vec<u8>,
}

impl Contract {
    pub fn name(&self) -> String {
        decode_text(&self.params.stream_name)
    }

    /// Converts the raw account at `id` into the chain-independent stream model.
    pub fn to_stream(&self, id: Pubkey, pause_accounting: PauseAccounting) -> Stream {
        let params = &self.params;
        let mut stream = Stream {
            id: Address::Solana(id),
            version: self.version,
            name: self.name(),
            token_id: self.mint.to_string(),
            sender: Address::Solana(self.sender),
            sender_tokens: Some(Address::Solana(self.sender_tokens)),
            recipient: Address::Solana(self.recipient),
            recipient_tokens: Some(Address::Solana(self.recipient_tokens)),
            escrow_tokens: Some(Address::Solana(self.escrow_tokens)),
            treasury: Address::Solana(self.treasury),
            treasury_tokens: Some(Address::Solana(self.treasury_tokens)),
            partner: Address::Solana(self.partner),
            partner_tokens: Some(Address::Solana(self.partner_tokens)),
            created_at: self.created_at,
            start: params.start_time,
            end: self.end_time,
            period: params.period,
            cliff: params.cliff,
            cliff_amount: params.cliff_amount,
            amount_per_period: params.amount_per_period,
            deposited_amount: params.net_amount_deposited,
            withdrawn_amount: self.amount_withdrawn,
            treasury_fee: PartyFee {
                percent: FeePercent::from_raw(self.treasury_fee_percent),
                total: self.treasury_fee_total,
                withdrawn: self.treasury_fee_withdrawn,
            },
            partner_fee: PartyFee {
                percent: FeePercent::from_raw(self.partner_fee_percent),
                total: self.partner_fee_total,
                withdrawn: self.partner_fee_withdrawn,
            },
            flags: StreamFlags {
                cancelable_by_sender: params.cancelable_by_sender,
                cancelable_by_recipient: params.cancelable_by_recipient,
                transferable_by_sender: params.transferable_by_sender,
                transferable_by_recipient: params.transferable_by_recipient,
                can_topup: params.can_topup,
                automatic_withdrawal: params.automatic_withdrawal,
                withdraw_frequency: params.withdraw_frequency,
                pausable: params.pausable,
                can_update_rate: params.can_update_rate,
            },
            closed: self.closed,
            canceled_at: self.canceled_at,
            last_withdrawn_at: self.last_withdrawn_at,
            current_pause_start: self.current_pause_start,
            pause_cumulative: self.pause_cumulative,
            last_rate_change_time: self.last_rate_change_time,
            funds_unlocked_at_last_rate_change: self.funds_unlocked_at_last_rate_change,
            stream_type: Default::default(),
            pause_accounting,
        };
        stream.stream_type = classify(&stream);

        stream
    }
}

/// Account matching `sample_stream`, with distinct parties.
#[cfg(test)]
pub(crate) fn sample_contract() -> Contract {
    Contract {
        version: 3,
        created_at: 900,
        amount_withdrawn: 25,
        canceled_at: 0,
        end_time: 1_800,
        last_withdrawn_at: 1_200,
        sender: Pubkey::new_unique(),
        sender_tokens: Pubkey::new_unique(),
        recipient: Pubkey::new_unique(),
        recipient_tokens: Pubkey::new_unique(),
        mint: Pubkey::new_unique(),
        escrow_tokens: Pubkey::new_unique(),
        treasury: Pubkey::new_unique(),
        treasury_tokens: Pubkey::new_unique(),
        treasury_fee_total: 1,
        treasury_fee_withdrawn: 0,
        treasury_fee_percent: 2_500,
        partner: Pubkey::new_unique(),
        partner_tokens: Pubkey::new_unique(),
        partner_fee_total: 0,
        partner_fee_withdrawn: 0,
        partner_fee_percent: 0,
        params: StreamParams {
            start_time: 1_000,
            net_amount_deposited: 500,
            period: 100,
            amount_per_period: 50,
            cliff: 1_000,
            cliff_amount: 100,
            cancelable_by_sender: true,
            cancelable_by_recipient: false,
            automatic_withdrawal: false,
            transferable_by_sender: false,
            transferable_by_recipient: true,
            can_topup: false,
            stream_name: crate::codec::encode_text("stream name", "payroll").unwrap(),
            withdraw_frequency: 100,
            pausable: true,
            can_update_rate: false,
        },
        closed: false,
        current_pause_start: 0,
        pause_cumulative: 0,
        last_rate_change_time: 0,
        funds_unlocked_at_last_rate_change: 0,
        gross_amount_deposited: 501,
        padding: vec![0; 126],
    }
}
