use crate::{
    state::Address,
    transport::TransactionId,
    utils::{constants::misc::WITHDRAW_ALL, stream_type::StreamType},
};

/// Settings shared by every stream of a creation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamTemplate {
    pub sender: Address,
    /// Mint address on Solana, coin type (`0x1::aptos_coin::AptosCoin`) on Aptos.
    pub token_id: String,
    /// Token program owning the mint. Defaults to the classic token program.
    pub token_program: Option<Address>,
    pub start: u64,
    pub period: u64,
    /// Zero unlocks the cliff amount at `start`.
    pub cliff: u64,
    pub cancelable_by_sender: bool,
    pub cancelable_by_recipient: bool,
    pub transferable_by_sender: bool,
    pub transferable_by_recipient: bool,
    pub can_topup: bool,
    pub automatic_withdrawal: bool,
    pub withdrawal_frequency: u64,
    pub pausable: Option<bool>,
    pub can_update_rate: Option<bool>,
    pub partner: Option<Address>,
    /// The deposit is paid in the native currency and wrapped before the streams are created.
    pub is_native: bool,
}

impl StreamTemplate {
    pub fn effective_cliff(&self) -> u64 {
        if self.cliff == 0 {
            self.start
        } else {
            self.cliff
        }
    }
}

/// Per-recipient part of a creation request. `amount` is the net deposit; fees are added on top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecipientSpec {
    pub recipient: Address,
    pub amount: u64,
    pub name: String,
    pub cliff_amount: u64,
    pub amount_per_period: u64,
}

/// Where the new stream account lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataSource {
    /// A fresh keypair held by the transport, which signs the creation.
    Ephemeral(Address),
    /// An address derived from the sender and a nonce.
    Derived { nonce: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateStreamParams {
    pub template: StreamTemplate,
    pub recipient: RecipientSpec,
    pub metadata: MetadataSource,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateMultipleParams {
    pub template: StreamTemplate,
    pub recipients: Vec<RecipientSpec>,
    /// One ephemeral stream account key per recipient, in recipient order. Supplying them makes the batch
    /// sequential.
    pub ephemeral_keys: Option<Vec<Address>>,
    /// Without ephemeral keys, recipient `i` gets the account derived from `base_nonce + i`.
    pub base_nonce: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateResult {
    pub tx: TransactionId,
    pub metadata: Address,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WithdrawParams {
    pub id: Address,
    pub invoker: Address,
    pub amount: u64,
}

impl WithdrawParams {
    pub fn all(id: Address, invoker: Address) -> Self {
        Self { id, invoker, amount: WITHDRAW_ALL }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CancelParams {
    pub id: Address,
    pub invoker: Address,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferParams {
    pub id: Address,
    pub invoker: Address,
    pub new_recipient: Address,
}

/// `amount` is the net amount added to the stream; fees are added on top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TopupParams {
    pub id: Address,
    pub invoker: Address,
    pub amount: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateParams {
    pub id: Address,
    pub invoker: Address,
    pub enable_automatic_withdrawal: Option<bool>,
    pub withdraw_frequency: Option<u64>,
    pub amount_per_period: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PauseParams {
    pub id: Address,
    pub invoker: Address,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamDirection {
    Outgoing,
    Incoming,
    #[default]
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GetAllParams {
    pub address: Address,
    pub direction: StreamDirection,
    pub stream_type: Option<StreamType>,
}
