//! Native token wrapping: fund the owner's wrapped-SOL account and sync its token balance.

use anchor_lang::{prelude::*, solana_program::instruction::Instruction};
use anchor_spl::{associated_token, token};

use crate::{
    instructions::{readonly, signer, writable},
    utils::{
        constants::programs::{NATIVE_MINT, SYSTEM_PROGRAM},
        pda::find_associated_token_address,
    },
};

const ATA_CREATE_IDEMPOTENT: u8 = 1;
const SYSTEM_TRANSFER: u32 = 2;
const TOKEN_SYNC_NATIVE: u8 = 17;

/// Creates the associated token account of `owner` for `mint` unless it already exists.
pub fn create_associated_token_account_idempotent(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
) -> Instruction {
    let ata = find_associated_token_address(owner, mint, token_program);

    Instruction {
        program_id: associated_token::ID,
        accounts: vec![
            signer(*payer),
            writable(ata),
            readonly(*owner),
            readonly(*mint),
            readonly(SYSTEM_PROGRAM),
            readonly(*token_program),
        ],
        data: vec![ATA_CREATE_IDEMPOTENT],
    }
}

/// Moves `lamports` from `from` to `to`.
pub fn system_transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    Instruction { program_id: SYSTEM_PROGRAM, accounts: vec![signer(*from), writable(*to)], data }
}

/// Updates the token balance of a native token account to its lamport balance.
pub fn sync_native(account: &Pubkey) -> Instruction {
    Instruction { program_id: token::ID, accounts: vec![writable(*account)], data: vec![TOKEN_SYNC_NATIVE] }
}

/// Instructions that wrap `lamports` of `owner` into its native token account.
pub fn wrap_native(owner: &Pubkey, lamports: u64) -> Vec<Instruction> {
    let ata = find_associated_token_address(owner, &NATIVE_MINT, &token::ID);

    vec![
        create_associated_token_account_idempotent(owner, owner, &NATIVE_MINT, &token::ID),
        system_transfer(owner, &ata, lamports),
        sync_native(&ata),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_sequence() {
        let owner = Pubkey::new_unique();
        let ixs = wrap_native(&owner, 1_500);
        let ata = find_associated_token_address(&owner, &NATIVE_MINT, &token::ID);

        assert_eq!(ixs.len(), 3);
        assert_eq!(ixs[0].program_id, associated_token::ID);
        assert_eq!(ixs[0].accounts[1].pubkey, ata);

        assert_eq!(ixs[1].program_id, SYSTEM_PROGRAM);
        assert_eq!(ixs[1].data[..4], [2, 0, 0, 0]);
        assert_eq!(ixs[1].data[4..], 1_500u64.to_le_bytes());

        assert_eq!(ixs[2].program_id, token::ID);
        assert_eq!(ixs[2].data, vec![17]);
        assert_eq!(ixs[2].accounts[0].pubkey, ata);
    }
}
