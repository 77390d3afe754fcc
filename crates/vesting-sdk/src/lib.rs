//! Client library for token vesting and payment streams.
//!
//! The crate builds the wire payloads for the stream, airdrop distributor and reward pool programs, decodes their
//! on-chain accounts into a uniform [`state::Stream`] model, and orchestrates multi-recipient stream creation with
//! per-recipient failure capture.
//!
//! Network access, signing and fee-market logic are left to the caller through the [`transport::Transport`] trait.

use anchor_lang::prelude::*;

pub mod batch;
pub mod client;
pub mod codec;
pub mod instructions;
pub mod state;
pub mod transport;
pub mod utils;

pub use batch::{BatchError, BatchResult};
pub use client::{ChainClient, ClientConfig, StreamClient};
pub use state::{Address, Stream};
pub use utils::errors::{SdkError, SdkResult, SubmissionError};

declare_id!("strmRqUCoQUgGUan5YhzUZa6KqdzwX5L6FpUxfmKg5m"); // Mainnet stream program
