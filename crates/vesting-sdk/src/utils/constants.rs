use anchor_lang::prelude::*;

// Account Seeds
pub mod seeds {
    pub const CLAIM_STATUS: &[u8] = b"ClaimStatus";
    pub const ESCROW: &[u8] = b"strm";
    pub const METADATA: &[u8] = b"strm-met";
    pub const REWARD_ENTRY: &[u8] = b"reward-entry";
    pub const WITHDRAWOR: &[u8] = b"withdraw_request";
}

// Program and well-known account addresses
pub mod programs {
    use super::*;

    pub const STREAM_PROGRAM_MAINNET: Pubkey = pubkey!("strmRqUCoQUgGUan5YhzUZa6KqdzwX5L6FpUxfmKg5m");
    pub const STREAM_PROGRAM_DEVNET: Pubkey = pubkey!("HqDGZjaVRXJ9MGRQEw7qDc2rAr6iH1n1kAQdCZaCMfMZ");
    pub const DISTRIBUTOR_PROGRAM: Pubkey = pubkey!("MErKy6nZVoVAkryxAejJz2juifQ4ArgLgHmaJCQkU7N");
    pub const REWARD_POOL_PROGRAM_MAINNET: Pubkey = pubkey!("RWRDdfRbi3339VgKxTAXg4cjyniF7cbhNbMxZWiSKmj");
    pub const REWARD_POOL_PROGRAM_DEVNET: Pubkey = pubkey!("RWRDyfZa6Rk9UYi85yjYYfGmoUqffLqjo6vZdFawEez");

    pub const TREASURY: Pubkey = pubkey!("5SEpbdjFK5FxwTvfsGMXVQTD2v4M2c5tyRTxhdsPkgDw");
    pub const FEE_ORACLE: Pubkey = pubkey!("B743wFVk2pCYhV91cn287e1xY7f1vt4gdY48hhNiuQmT");

    pub const NATIVE_MINT: Pubkey = pubkey!("So11111111111111111111111111111111111111112");
    pub const RENT_SYSVAR: Pubkey = pubkey!("SysvarRent111111111111111111111111111111111");
    pub const SYSTEM_PROGRAM: Pubkey = pubkey!("11111111111111111111111111111111");

    // Aptos module publishers, as hex account addresses
    pub const APTOS_MODULE_MAINNET: &str = "0x9009d93d52576bf9ac6dc6cf10b870610bcb316342fef6eff80662fbbfce51b0";
    pub const APTOS_MODULE_TESTNET: &str = "0xc6737de143d91b2f99a7e490d4f8348fdfa3bdd1eb8737a27d0455f8a3625688";
    pub const APTOS_PROTOCOL_MODULE: &str = "protocol";
    pub const APTOS_ADMIN_MODULE: &str = "admin";
}

// Miscellaneous
pub mod misc {
    pub const ANCHOR_DISCRIMINATOR_SIZE: usize = 8;
    pub const AMOUNT_SCALE_DECIMALS: u8 = 9; // lamports in 1 SOL
    pub const CONTRACT_PARAMS_PADDING: usize = 126;
    pub const DEFAULT_BATCH_CONCURRENCY: usize = 8;
    pub const MAX_PROOF_LEN: usize = 32;
    pub const REWARDS_PRECISION: u128 = 1_000_000_000_000_000_000; // 1e18
    pub const STREAM_NAME_CAPACITY: usize = 64;
    pub const WITHDRAW_ALL: u64 = u64::MAX;
}

// Instruction data padding, zero bytes appended after the arguments
pub mod padding {
    pub const CREATE: usize = 32;
    pub const UPDATE: usize = 16;
    pub const NONE: usize = 0;
}
