//! Chain clients. Each validates parameters locally, reads state through the transport, builds the chain payload and
//! submits it.

pub mod aptos;
pub mod config;
pub mod params;
pub mod solana;

use std::{future::Future, sync::Arc};

pub use aptos::AptosStreamClient;
pub use config::{ClientConfig, Cluster};
pub use params::*;
pub use solana::SolanaStreamClient;

use crate::{
    batch::BatchResult,
    state::{Address, Chain, Stream},
    transport::{TransactionId, Transport},
    utils::errors::SdkResult,
};

/// Stream operations every chain supports.
pub trait StreamClient {
    /// Creates one stream.
    fn create(&self, params: CreateStreamParams) -> impl Future<Output = SdkResult<CreateResult>> + Send;

    /// Creates one stream per recipient from a shared template. Per-recipient failures are reported in the result;
    /// only a failed validation, state read or wrap transaction fails the whole call.
    fn create_multiple(&self, params: CreateMultipleParams) -> impl Future<Output = SdkResult<BatchResult>> + Send;

    fn withdraw(&self, params: WithdrawParams) -> impl Future<Output = SdkResult<TransactionId>> + Send;

    fn cancel(&self, params: CancelParams) -> impl Future<Output = SdkResult<TransactionId>> + Send;

    fn transfer(&self, params: TransferParams) -> impl Future<Output = SdkResult<TransactionId>> + Send;

    fn topup(&self, params: TopupParams) -> impl Future<Output = SdkResult<TransactionId>> + Send;

    fn update(&self, params: UpdateParams) -> impl Future<Output = SdkResult<TransactionId>> + Send;

    fn pause(&self, params: PauseParams) -> impl Future<Output = SdkResult<TransactionId>> + Send;

    fn unpause(&self, params: PauseParams) -> impl Future<Output = SdkResult<TransactionId>> + Send;

    fn get_one(&self, id: &Address) -> impl Future<Output = SdkResult<Stream>> + Send;

    /// Streams where `params.address` is the sender, the recipient, or either.
    fn get_all(&self, params: GetAllParams) -> impl Future<Output = SdkResult<Vec<Stream>>> + Send;
}

/// A client for whichever chain the config names.
#[derive(Clone)]
pub enum ChainClient {
    Solana(SolanaStreamClient),
    Aptos(AptosStreamClient),
}

impl ChainClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> SdkResult<Self> {
        let client = match config.chain {
            Chain::Solana => Self::Solana(SolanaStreamClient::new(config, transport)?),
            Chain::Aptos => Self::Aptos(AptosStreamClient::new(config, transport)?),
        };

        Ok(client)
    }

    pub fn chain(&self) -> Chain {
        match self {
            Self::Solana(_) => Chain::Solana,
            Self::Aptos(_) => Chain::Aptos,
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident($($arg:expr),*)) => {
        match $self {
            Self::Solana(client) => client.$method($($arg),*).await,
            Self::Aptos(client) => client.$method($($arg),*).await,
        }
    };
}

impl StreamClient for ChainClient {
    async fn create(&self, params: CreateStreamParams) -> SdkResult<CreateResult> {
        dispatch!(self, create(params))
    }

    async fn create_multiple(&self, params: CreateMultipleParams) -> SdkResult<BatchResult> {
        dispatch!(self, create_multiple(params))
    }

    async fn withdraw(&self, params: WithdrawParams) -> SdkResult<TransactionId> {
        dispatch!(self, withdraw(params))
    }

    async fn cancel(&self, params: CancelParams) -> SdkResult<TransactionId> {
        dispatch!(self, cancel(params))
    }

    async fn transfer(&self, params: TransferParams) -> SdkResult<TransactionId> {
        dispatch!(self, transfer(params))
    }

    async fn topup(&self, params: TopupParams) -> SdkResult<TransactionId> {
        dispatch!(self, topup(params))
    }

    async fn update(&self, params: UpdateParams) -> SdkResult<TransactionId> {
        dispatch!(self, update(params))
    }

    async fn pause(&self, params: PauseParams) -> SdkResult<TransactionId> {
        dispatch!(self, pause(params))
    }

    async fn unpause(&self, params: PauseParams) -> SdkResult<TransactionId> {
        dispatch!(self, unpause(params))
    }

    async fn get_one(&self, id: &Address) -> SdkResult<Stream> {
        dispatch!(self, get_one(id))
    }

    async fn get_all(&self, params: GetAllParams) -> SdkResult<Vec<Stream>> {
        dispatch!(self, get_all(params))
    }
}
