use vesting_common::FeePercent;

use crate::{
    codec::bcs::{BcsReader, BcsWriter},
    state::{AccountAddress, Address, PartyFee, Stream, StreamFlags},
    utils::{
        errors::{SdkError, SdkResult},
        stream_type::classify,
        unlock_math::PauseAccounting,
    },
};

const KIND: &str = "AptosContract";

/// Creation parameters of an Aptos stream. The cliff is always at `start`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AptosStreamMeta {
    pub start: u64,
    pub period: u64,
    pub amount_per_period: u64,
    pub cliff_amount: u64,
    pub net_amount_deposited: u64,
    pub cancelable_by_sender: bool,
    pub cancelable_by_recipient: bool,
    pub transferable_by_sender: bool,
    pub transferable_by_recipient: bool,
    pub can_topup: bool,
    pub automatic_withdrawal: bool,
    pub withdrawal_frequency: u64,
    pub pausable: bool,
    pub can_update_rate: bool,
    pub contract_name: String,
}

/// The stream resource published by the Aptos protocol module, BCS encoded in field order.
///
/// Fee percentages use the same four-decimal fixed point as Solana but are stored as `u64`. On resume the module
/// shifts the schedule by the paused time, so the stored timestamps are already pause-adjusted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AptosContract {
    pub version: u8,
    pub sender: AccountAddress,
    pub recipient: AccountAddress,
    pub partner: AccountAddress,
    pub coin_type: String,
    pub created: u64,
    pub end_time: u64,
    pub last_withdrawn_at: u64,
    pub canceled_at: u64,
    pub amount_withdrawn: u64,
    pub closed: bool,
    pub meta: AptosStreamMeta,
    pub treasury_fee_percent: u64,
    pub treasury_fee_total: u64,
    pub treasury_fee_withdrawn: u64,
    pub partner_fee_percent: u64,
    pub partner_fee_total: u64,
    pub partner_fee_withdrawn: u64,
    pub current_pause_start: u64,
    pub pause_cumulative: u64,
    pub last_rate_change_time: u64,
    pub funds_unlocked_at_last_rate_change: u64,
}

impl AptosStreamMeta {
    fn read(reader: &mut BcsReader<'_>) -> SdkResult<Self> {
        Ok(Self {
            start: reader.read_u64()?,
            period: reader.read_u64()?,
            amount_per_period: reader.read_u64()?,
            cliff_amount: reader.read_u64()?,
            net_amount_deposited: reader.read_u64()?,
            cancelable_by_sender: reader.read_bool()?,
            cancelable_by_recipient: reader.read_bool()?,
            transferable_by_sender: reader.read_bool()?,
            transferable_by_recipient: reader.read_bool()?,
            can_topup: reader.read_bool()?,
            automatic_withdrawal: reader.read_bool()?,
            withdrawal_frequency: reader.read_u64()?,
            pausable: reader.read_bool()?,
            can_update_rate: reader.read_bool()?,
            contract_name: reader.read_string()?,
        })
    }

    fn write(&self, writer: &mut BcsWriter) {
        writer
            .write_u64(self.start)
            .write_u64(self.period)
            .write_u64(self.amount_per_period)
            .write_u64(self.cliff_amount)
            .write_u64(self.net_amount_deposited)
            .write_bool(self.cancelable_by_sender)
            .write_bool(self.cancelable_by_recipient)
            .write_bool(self.transferable_by_sender)
            .write_bool(self.transferable_by_recipient)
            .write_bool(self.can_topup)
            .write_bool(self.automatic_withdrawal)
            .write_u64(self.withdrawal_frequency)
            .write_bool(self.pausable)
            .write_bool(self.can_update_rate)
            .write_str(&self.contract_name);
    }
}

impl AptosContract {
    /// Decodes the resource. Bytes after the last field are ignored.
    pub fn decode(data: &[u8]) -> SdkResult<Self> {
        let mut reader = BcsReader::new(KIND, data);

        Ok(Self {
            version: reader.read_u8()?,
            sender: reader.read_address()?,
            recipient: reader.read_address()?,
            partner: reader.read_address()?,
            coin_type: reader.read_string()?,
            created: reader.read_u64()?,
            end_time: reader.read_u64()?,
            last_withdrawn_at: reader.read_u64()?,
            canceled_at: reader.read_u64()?,
            amount_withdrawn: reader.read_u64()?,
            closed: reader.read_bool()?,
            meta: AptosStreamMeta::read(&mut reader)?,
            treasury_fee_percent: reader.read_u64()?,
            treasury_fee_total: reader.read_u64()?,
            treasury_fee_withdrawn: reader.read_u64()?,
            partner_fee_percent: reader.read_u64()?,
            partner_fee_total: reader.read_u64()?,
            partner_fee_withdrawn: reader.read_u64()?,
            current_pause_start: reader.read_u64()?,
            pause_cumulative: reader.read_u64()?,
            last_rate_change_time: reader.read_u64()?,
            funds_unlocked_at_last_rate_change: reader.read_u64()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut writer = BcsWriter::new();
        writer
            .write_u8(self.version)
            .write_address(&self.sender)
            .write_address(&self.recipient)
            .write_address(&self.partner)
            .write_str(&self.coin_type)
            .write_u64(self.created)
            .write_u64(self.end_time)
            .write_u64(self.last_withdrawn_at)
            .write_u64(self.canceled_at)
            .write_u64(self.amount_withdrawn)
            .write_bool(self.closed);
        self.meta.write(&mut writer);
        writer
            .write_u64(self.treasury_fee_percent)
            .write_u64(self.treasury_fee_total)
            .write_u64(self.treasury_fee_withdrawn)
            .write_u64(self.partner_fee_percent)
            .write_u64(self.partner_fee_total)
            .write_u64(self.partner_fee_withdrawn)
            .write_u64(self.current_pause_start)
            .write_u64(self.pause_cumulative)
            .write_u64(self.last_rate_change_time)
            .write_u64(self.funds_unlocked_at_last_rate_change);

        writer.into_bytes()
    }

    /// Converts the resource at `id` into the chain-independent stream model. Fees accrue to `treasury`.
    pub fn to_stream(
        &self,
        id: AccountAddress,
        treasury: AccountAddress,
        pause_accounting: PauseAccounting,
    ) -> SdkResult<Stream> {
        let meta = &self.meta;
        let mut stream = Stream {
            id: Address::Aptos(id),
            version: self.version,
            name: meta.contract_name.clone(),
            token_id: self.coin_type.clone(),
            sender: Address::Aptos(self.sender),
            sender_tokens: None,
            recipient: Address::Aptos(self.recipient),
            recipient_tokens: None,
            escrow_tokens: None,
            treasury: Address::Aptos(treasury),
            treasury_tokens: None,
            partner: Address::Aptos(self.partner),
            partner_tokens: None,
            created_at: self.created,
            start: meta.start,
            end: self.end_time,
            period: meta.period,
            cliff: meta.start,
            cliff_amount: meta.cliff_amount,
            amount_per_period: meta.amount_per_period,
            deposited_amount: meta.net_amount_deposited,
            withdrawn_amount: self.amount_withdrawn,
            treasury_fee: PartyFee {
                percent: fee_percent(self.treasury_fee_percent)?,
                total: self.treasury_fee_total,
                withdrawn: self.treasury_fee_withdrawn,
            },
            partner_fee: PartyFee {
                percent: fee_percent(self.partner_fee_percent)?,
                total: self.partner_fee_total,
                withdrawn: self.partner_fee_withdrawn,
            },
            flags: StreamFlags {
                cancelable_by_sender: meta.cancelable_by_sender,
                cancelable_by_recipient: meta.cancelable_by_recipient,
                transferable_by_sender: meta.transferable_by_sender,
                transferable_by_recipient: meta.transferable_by_recipient,
                can_topup: meta.can_topup,
                automatic_withdrawal: meta.automatic_withdrawal,
                withdraw_frequency: meta.withdrawal_frequency,
                pausable: meta.pausable,
                can_update_rate: meta.can_update_rate,
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

        Ok(stream)
    }
}

fn fee_percent(raw: u64) -> SdkResult<FeePercent> {
    let raw = u32::try_from(raw).map_err(|_| SdkError::malformed(KIND, format!("fee percent {raw} out of range")))?;
    Ok(FeePercent::from_raw(raw))
}

#[cfg(test)]
pub(crate) fn sample_aptos_contract() -> AptosContract {
    AptosContract {
        version: 1,
        sender: "0xa11ce".parse().unwrap(),
        recipient: "0xb0b".parse().unwrap(),
        partner: "0xca401".parse().unwrap(),
        coin_type: "0x1::aptos_coin::AptosCoin".to_string(),
        created: 900,
        end_time: 1_800,
        last_withdrawn_at: 0,
        canceled_at: 0,
        amount_withdrawn: 0,
        closed: false,
        meta: AptosStreamMeta {
            start: 1_000,
            period: 100,
            amount_per_period: 50,
            cliff_amount: 100,
            net_amount_deposited: 500,
            cancelable_by_sender: true,
            cancelable_by_recipient: false,
            transferable_by_sender: false,
            transferable_by_recipient: true,
            can_topup: false,
            automatic_withdrawal: false,
            withdrawal_frequency: 100,
            pausable: true,
            can_update_rate: false,
            contract_name: "payroll".to_string(),
        },
        treasury_fee_percent: 2_500,
        treasury_fee_total: 1,
        treasury_fee_withdrawn: 0,
        partner_fee_percent: 0,
        partner_fee_total: 0,
        partner_fee_withdrawn: 0,
        current_pause_start: 0,
        pause_cumulative: 0,
        last_rate_change_time: 0,
        funds_unlocked_at_last_rate_change: 0,
    }
}
