//! Multi-recipient submission of stream creations.
//!
//! Every item of a batch shares one recent reference and reaches a terminal state on its own: a failed recipient
//! never stops the others. Results are correlated to recipients by position, not by completion order.

use std::{collections::HashMap, sync::Arc, time::Duration};

use anchor_lang::prelude::*;
use tokio::sync::Semaphore;

use crate::{
    state::Address,
    transport::{ChainPayload, RecentReference, SubmitRequest, TransactionId, Transport, TransportResult},
    utils::{
        constants::misc::DEFAULT_BATCH_CONCURRENCY,
        errors::{SdkResult, SubmissionError},
        program_errors::{ContractErrorCode, ErrorParser},
    },
};

// -------------------------------------------------------------------------- //
//                                   ITEMS                                    //
// -------------------------------------------------------------------------- //

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchItemState {
    Built,
    Signed,
    Submitted,
    Confirmed(TransactionId),
    Failed(SubmissionError),
}

/// One recipient's creation within a batch.
#[derive(Clone, Debug)]
pub struct BatchItem {
    pub recipient: Address,
    /// Address of the stream account the item creates.
    pub metadata: Address,
    pub payload: ChainPayload,
    pub state: BatchItemState,
}

impl BatchItem {
    pub fn new(recipient: Address, metadata: Address, payload: ChainPayload) -> Self {
        Self { recipient, metadata, payload, state: BatchItemState::Built }
    }

    /// State update for binding the item to the shared reference.
    fn sign(&mut self, reference: RecentReference) -> SubmitRequest {
        self.state = BatchItemState::Signed;
        SubmitRequest { payload: self.payload.clone(), reference }
    }

    fn settle(&mut self, outcome: TransportResult<TransactionId>) {
        self.state = match outcome {
            Ok(tx) => BatchItemState::Confirmed(tx),
            Err(err) => {
                msg!("Stream creation for {} failed: {}", self.recipient, err);
                BatchItemState::Failed(err)
            }
        };
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchMode {
    /// One item at a time, each reaching a terminal state before the next is sent. Required when the caller
    /// supplied ephemeral keys, which are single use and tied to their position.
    Sequential,
    Parallel,
}

impl DispatchMode {
    pub fn for_batch(ephemeral_keys_supplied: bool) -> Self {
        if ephemeral_keys_supplied {
            Self::Sequential
        } else {
            Self::Parallel
        }
    }
}

#[derive(Clone, Debug)]
pub struct BatchPlan {
    /// Shared native currency wrap, submitted before any item.
    pub wrap: Option<ChainPayload>,
    pub items: Vec<BatchItem>,
    pub mode: DispatchMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchOptions {
    /// Upper bound on one submit-and-confirm. An item that exceeds it fails with [`SubmissionError::Timeout`].
    pub submit_timeout: Option<Duration>,
    /// Items in flight at once in parallel mode.
    pub max_in_flight: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { submit_timeout: None, max_in_flight: DEFAULT_BATCH_CONCURRENCY }
    }
}

// -------------------------------------------------------------------------- //
//                                  RESULTS                                   //
// -------------------------------------------------------------------------- //

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchError {
    pub recipient: Address,
    pub error: SubmissionError,
    pub parsed_error_code: Option<ContractErrorCode>,
}

/// Outcome of a batch. The call succeeding does not mean every recipient got a stream: inspect `errors`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Confirmed transactions, in item order.
    pub txs: Vec<TransactionId>,
    /// Stream accounts of every item, in item order, whether or not its creation succeeded.
    pub metadatas: Vec<Address>,
    pub metadata_to_recipient: HashMap<Address, Address>,
    pub errors: Vec<BatchError>,
}

impl BatchResult {
    fn collect(items: &[BatchItem], parser: &ErrorParser) -> Self {
        let mut result = Self::default();

        for item in items {
            result.metadatas.push(item.metadata);
            result.metadata_to_recipient.insert(item.metadata, item.recipient);

            match &item.state {
                BatchItemState::Confirmed(tx) => result.txs.push(tx.clone()),
                BatchItemState::Failed(err) => result.errors.push(BatchError {
                    recipient: item.recipient,
                    parsed_error_code: parser.parse(err),
                    error: err.clone(),
                }),
                // Every dispatched item settles before collection
                BatchItemState::Built | BatchItemState::Signed | BatchItemState::Submitted => {}
            }
        }

        result
    }
}

// -------------------------------------------------------------------------- //
//                                 EXECUTION                                  //
// -------------------------------------------------------------------------- //

/// Submits a batch.
///
/// Fails as a whole only when the shared reference can't be fetched or the wrap transaction fails; failures of
/// individual items are reported in [`BatchResult::errors`].
pub async fn execute_batch(
    transport: Arc<dyn Transport>,
    plan: BatchPlan,
    parser: &ErrorParser,
    options: BatchOptions,
) -> SdkResult<BatchResult> {
    let BatchPlan { wrap, mut items, mode } = plan;

    let reference = transport.prepare().await?;

    if let Some(payload) = wrap {
        msg!("Wrapping native currency before {} stream creations", items.len());
        let request = SubmitRequest { payload, reference };
        submit(transport.as_ref(), request, options.submit_timeout).await?;
    }

    let requests: Vec<SubmitRequest> = items.iter_mut().map(|item| item.sign(reference)).collect();

    match mode {
        DispatchMode::Sequential => {
            msg!("Submitting {} stream creations sequentially", items.len());
            for (item, request) in items.iter_mut().zip(requests) {
                item.state = BatchItemState::Submitted;
                let outcome = submit(transport.as_ref(), request, options.submit_timeout).await;
                item.settle(outcome);
            }
        }
        DispatchMode::Parallel => {
            msg!("Submitting {} stream creations in parallel", items.len());
            let semaphore = Arc::new(Semaphore::new(options.max_in_flight.max(1)));
            let handles: Vec<_> = requests
                .into_iter()
                .map(|request| {
                    let transport = Arc::clone(&transport);
                    let semaphore = Arc::clone(&semaphore);
                    let submit_timeout = options.submit_timeout;
                    tokio::spawn(async move {
                        let _permit = semaphore
                            .acquire_owned()
                            .await
                            .map_err(|err| SubmissionError::Transport(err.to_string()))?;
                        submit(transport.as_ref(), request, submit_timeout).await
                    })
                })
                .collect();

            for item in items.iter_mut() {
                item.state = BatchItemState::Submitted;
            }

            // Await in item order so each outcome lands on its own recipient
            for (item, handle) in items.iter_mut().zip(handles) {
                let outcome = handle
                    .await
                    .unwrap_or_else(|err| Err(SubmissionError::Transport(format!("submission task failed: {err}"))));
                item.settle(outcome);
            }
        }
    }

    Ok(BatchResult::collect(&items, parser))
}

async fn submit(
    transport: &dyn Transport,
    request: SubmitRequest,
    submit_timeout: Option<Duration>,
) -> TransportResult<TransactionId> {
    match submit_timeout {
        Some(limit) => tokio::time::timeout(limit, transport.submit_and_confirm(request))
            .await
            .unwrap_or(Err(SubmissionError::Timeout(limit))),
        None => transport.submit_and_confirm(request).await,
    }
}
