//! The boundary to the network. Implementations sign, send and confirm transactions and read raw account bytes;
//! this crate never talks to a node directly.

use std::{fmt, future::Future, pin::Pin};

use anchor_lang::{prelude::*, solana_program::instruction::Instruction};
use solana_hash::Hash;

use crate::{codec::layout::MemcmpFilter, state::Address, utils::errors::SubmissionError};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type TransportResult<T> = std::result::Result<T, SubmissionError>;

/// Reference that bounds the validity window of a transaction. Every item of a batch shares the same one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecentReference {
    Blockhash(Hash),
    /// Unix seconds after which the transaction is dropped.
    ExpirationTimestamp(u64),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransactionId(pub String);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A Move entry function call with BCS encoded arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryFunction {
    pub module_address: String,
    pub module: String,
    pub function: String,
    pub type_args: Vec<String>,
    pub args: Vec<Vec<u8>>,
}

impl EntryFunction {
    /// Fully qualified `<address>::<module>::<function>` name.
    pub fn id(&self) -> String {
        format!("{}::{}::{}", self.module_address, self.module, self.function)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainPayload {
    /// Instructions for one transaction. `signers` lists the keys that must sign besides the fee payer, such as
    /// ephemeral stream account keys.
    Solana { instructions: Vec<Instruction>, signers: Vec<Pubkey> },
    Aptos(EntryFunction),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitRequest {
    pub payload: ChainPayload,
    pub reference: RecentReference,
}

pub trait Transport: Send + Sync {
    /// Fetches a fresh reference for the transactions about to be signed.
    fn prepare(&self) -> BoxFuture<'_, TransportResult<RecentReference>>;

    /// Signs, sends and waits for the confirmation of one transaction.
    fn submit_and_confirm(&self, request: SubmitRequest) -> BoxFuture<'_, TransportResult<TransactionId>>;

    /// Raw bytes of an account, or of the stream resource on Aptos. `None` when it does not exist.
    fn get_account<'a>(&'a self, address: &'a Address) -> BoxFuture<'a, TransportResult<Option<Vec<u8>>>>;

    /// Every account owned by `program` whose bytes match all `filters`.
    fn get_program_accounts<'a>(
        &'a self,
        program: &'a Address,
        filters: Vec<MemcmpFilter>,
    ) -> BoxFuture<'a, TransportResult<Vec<(Address, Vec<u8>)>>>;

    /// Address the chain assigns to an object created by `creator` from `seed`. Only needed on chains whose
    /// derivation scheme the crate does not implement itself.
    fn derive_address(&self, creator: &Address, seed: &[u8]) -> TransportResult<Address> {
        let _ = seed;
        Err(SubmissionError::Transport(format!("address derivation for {:?} is not supported", creator.chain())))
    }
}
