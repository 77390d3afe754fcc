//! Program-derived addresses used by the instruction builders.

use anchor_lang::prelude::*;
use anchor_spl::associated_token;

use crate::utils::constants::seeds;

/// Token account holding the stream's escrowed funds.
pub fn find_escrow_address(program_id: &Pubkey, metadata: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[seeds::ESCROW, metadata.as_ref()], program_id).0
}

/// Authority the program uses for automatic withdrawals.
pub fn find_withdrawor_address(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[seeds::WITHDRAWOR], program_id).0
}

/// Stream account derived from the sender and a nonce, used when no ephemeral keypair signs the creation.
pub fn find_metadata_address(program_id: &Pubkey, sender: &Pubkey, nonce: u64) -> Pubkey {
    Pubkey::find_program_address(&[seeds::METADATA, sender.as_ref(), &nonce.to_le_bytes()], program_id).0
}

/// Associated token account of `owner` for `mint` under `token_program`.
pub fn find_associated_token_address(owner: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[owner.as_ref(), token_program.as_ref(), mint.as_ref()], &associated_token::ID).0
}

pub fn find_claim_status_address(program_id: &Pubkey, claimant: &Pubkey, distributor: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[seeds::CLAIM_STATUS, claimant.as_ref(), distributor.as_ref()], program_id).0
}

pub fn find_reward_entry_address(program_id: &Pubkey, reward_pool: &Pubkey, stake_entry: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[seeds::REWARD_ENTRY, reward_pool.as_ref(), stake_entry.as_ref()], program_id).0
}
