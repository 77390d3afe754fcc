#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use anchor_lang::prelude::*;
use solana_hash::Hash;
use vesting_sdk::{
    codec::{encode_record, layout::MemcmpFilter},
    state::{AccountAddress, Address, AptosContract, AptosStreamMeta, Contract, StreamParams},
    transport::{BoxFuture, ChainPayload, RecentReference, SubmitRequest, TransactionId, Transport, TransportResult},
    utils::errors::SubmissionError,
};

pub const NOW: u64 = 1_700_000_000;

type FailRule = Box<dyn Fn(&SubmitRequest) -> Option<SubmissionError> + Send + Sync>;

/// In-memory transport that records every submission and fails the ones matching its rule.
pub struct MockTransport {
    accounts: Mutex<Vec<(Address, Vec<u8>)>>,
    submitted: Mutex<Vec<SubmitRequest>>,
    fail_rule: Option<FailRule>,
    delay: Option<Duration>,
    prepare_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            fail_rule: None,
            delay: None,
            prepare_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn failing_when(
        mut self,
        rule: impl Fn(&SubmitRequest) -> Option<SubmissionError> + Send + Sync + 'static,
    ) -> Self {
        self.fail_rule = Some(Box::new(rule));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_account(self, address: Address, data: Vec<u8>) -> Self {
        self.accounts.lock().unwrap().push((address, data));
        self
    }

    pub fn submitted(&self) -> Vec<SubmitRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn prepare_calls(&self) -> usize {
        self.prepare_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn prepare(&self) -> BoxFuture<'_, TransportResult<RecentReference>> {
        Box::pin(async move {
            let call = self.prepare_calls.fetch_add(1, Ordering::SeqCst);
            Ok(RecentReference::Blockhash(Hash::new_from_array([call as u8 + 1; 32])))
        })
    }

    fn submit_and_confirm(&self, request: SubmitRequest) -> BoxFuture<'_, TransportResult<TransactionId>> {
        Box::pin(async move {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            match self.delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => tokio::task::yield_now().await,
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let failure = self.fail_rule.as_ref().and_then(|rule| rule(&request));
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push(request);

            match failure {
                Some(err) => Err(err),
                None => Ok(TransactionId(format!("tx-{}", submitted.len()))),
            }
        })
    }

    fn get_account<'a>(&'a self, address: &'a Address) -> BoxFuture<'a, TransportResult<Option<Vec<u8>>>> {
        Box::pin(async move {
            let accounts = self.accounts.lock().unwrap();
            Ok(accounts.iter().find(|(key, _)| key == address).map(|(_, data)| data.clone()))
        })
    }

    fn get_program_accounts<'a>(
        &'a self,
        _program: &'a Address,
        filters: Vec<MemcmpFilter>,
    ) -> BoxFuture<'a, TransportResult<Vec<(Address, Vec<u8>)>>> {
        Box::pin(async move {
            let accounts = self.accounts.lock().unwrap();
            let matching = accounts
                .iter()
                .filter(|(_, data)| {
                    filters.iter().all(|filter| {
                        data.get(filter.offset..filter.offset + filter.bytes.len()) == Some(filter.bytes.as_slice())
                    })
                })
                .cloned()
                .collect();
            Ok(matching)
        })
    }

    /// Creator bytes with the seed written over the tail.
    fn derive_address(&self, creator: &Address, seed: &[u8]) -> TransportResult<Address> {
        let mut bytes = creator.to_bytes();
        let tail = bytes.len() - seed.len().min(32);
        bytes[tail..].copy_from_slice(&seed[..seed.len().min(32)]);
        Ok(Address::Aptos(AccountAddress(bytes)))
    }
}

/// Function name of an Aptos payload, `"solana"` otherwise.
pub fn function_of(request: &SubmitRequest) -> String {
    match &request.payload {
        ChainPayload::Aptos(entry) => entry.function.clone(),
        ChainPayload::Solana { .. } => "solana".to_string(),
    }
}

pub fn aptos(hex: &str) -> AccountAddress {
    hex.parse().unwrap()
}

// -------------------------------------------------------------------------- //
//                                  ACCOUNTS                                  //
// -------------------------------------------------------------------------- //

pub fn solana_contract(sender: Pubkey, recipient: Pubkey, mint: Pubkey) -> Contract {
    let mut stream_name = [0u8; 64];
    stream_name[..7].copy_from_slice(b"payroll");

    Contract {
        version: 2,
        created_at: NOW - 100,
        amount_withdrawn: 0,
        canceled_at: 0,
        end_time: NOW + 900,
        last_withdrawn_at: 0,
        sender,
        sender_tokens: Pubkey::new_unique(),
        recipient,
        recipient_tokens: Pubkey::new_unique(),
        mint,
        escrow_tokens: Pubkey::new_unique(),
        treasury: Pubkey::new_unique(),
        treasury_tokens: Pubkey::new_unique(),
        treasury_fee_total: 2,
        treasury_fee_withdrawn: 0,
        treasury_fee_percent: 2_500,
        partner: Pubkey::new_unique(),
        partner_tokens: Pubkey::new_unique(),
        partner_fee_total: 0,
        partner_fee_withdrawn: 0,
        partner_fee_percent: 0,
        params: StreamParams {
            start_time: NOW,
            net_amount_deposited: 1_000,
            period: 10,
            amount_per_period: 10,
            cliff: NOW,
            cliff_amount: 100,
            cancelable_by_sender: true,
            cancelable_by_recipient: false,
            automatic_withdrawal: false,
            transferable_by_sender: false,
            transferable_by_recipient: true,
            can_topup: true,
            stream_name,
            withdraw_frequency: 10,
            pausable: true,
            can_update_rate: false,
        },
        closed: false,
        current_pause_start: 0,
        pause_cumulative: 0,
        last_rate_change_time: 0,
        funds_unlocked_at_last_rate_change: 0,
        gross_amount_deposited: 1_002,
        padding: vec![],
    }
}

pub fn encode_contract(contract: &Contract) -> Vec<u8> {
    encode_record(contract).unwrap()
}

pub fn aptos_contract(sender: AccountAddress, recipient: AccountAddress) -> AptosContract {
    AptosContract {
        version: 1,
        sender,
        recipient,
        partner: AccountAddress::default(),
        coin_type: "0x1::aptos_coin::AptosCoin".to_string(),
        created: NOW - 100,
        end_time: NOW + 900,
        last_withdrawn_at: 0,
        canceled_at: 0,
        amount_withdrawn: 0,
        closed: false,
        meta: AptosStreamMeta {
            start: NOW,
            period: 10,
            amount_per_period: 10,
            cliff_amount: 100,
            net_amount_deposited: 1_000,
            cancelable_by_sender: true,
            cancelable_by_recipient: true,
            transferable_by_sender: false,
            transferable_by_recipient: false,
            can_topup: false,
            automatic_withdrawal: false,
            withdrawal_frequency: 10,
            pausable: true,
            can_update_rate: true,
            contract_name: "grant".to_string(),
        },
        treasury_fee_percent: 0,
        treasury_fee_total: 0,
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
