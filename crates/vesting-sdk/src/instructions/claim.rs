use anchor_lang::{
    prelude::*,
    solana_program::instruction::{AccountMeta, Instruction},
    AnchorDeserialize, AnchorSerialize, ToAccountMetas,
};

use crate::{
    instructions::{build_instruction, readonly, signer, writable},
    utils::{
        constants::{misc::MAX_PROOF_LEN, padding, programs::SYSTEM_PROGRAM},
        errors::{SdkError, SdkResult},
    },
};

// -------------------------------------------------------------------------- //
//                                DISTRIBUTOR                                 //
// -------------------------------------------------------------------------- //

#[derive(Clone, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct NewClaimArgs {
    pub amount_unlocked: u64,
    pub amount_locked: u64,
    pub proof: Vec<[u8; 32]>,
}

impl NewClaimArgs {
    fn check(&self) -> SdkResult<()> {
        if self.proof.len() > MAX_PROOF_LEN {
            return Err(SdkError::InputTooLong { field: "merkle proof", len: self.proof.len(), capacity: MAX_PROOF_LEN });
        }

        Ok(())
    }
}

instruction_args!(NewClaimArgs, "new_claim", [78, 177, 98, 123, 210, 21, 187, 83], padding::NONE, validate);

#[derive(Clone, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct ClaimLockedArgs {}

instruction_args!(ClaimLockedArgs, "claim_locked", [34, 206, 181, 23, 11, 207, 147, 90], padding::NONE);

/// Closes a fully claimed claim status. The proof is required only when the claim was never opened.
#[derive(Clone, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct CloseClaimArgs {
    pub amount_unlocked: Option<u64>,
    pub amount_locked: Option<u64>,
    pub proof: Option<Vec<[u8; 32]>>,
}

instruction_args!(CloseClaimArgs, "close_claim", [42, 177, 165, 35, 213, 179, 211, 19], padding::NONE);

#[derive(Clone, Debug)]
pub struct ClaimAccounts {
    pub distributor: Pubkey,
    pub claim_status: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub claimant: Pubkey,
    pub mint: Pubkey,
    pub token_program: Pubkey,
}

impl ToAccountMetas for ClaimAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            writable(self.distributor),
            writable(self.claim_status),
            writable(self.from),
            writable(self.to),
            signer(self.claimant),
            readonly(self.mint),
            readonly(self.token_program),
        ]
    }
}

/// Opens the claim: transfers the unlocked allocation and records the locked one.
pub fn new_claim(program_id: Pubkey, accounts: &ClaimAccounts, args: &NewClaimArgs) -> SdkResult<Instruction> {
    let mut ix = build_instruction(program_id, accounts, args)?;
    ix.accounts.push(readonly(SYSTEM_PROGRAM));

    Ok(ix)
}

/// Transfers the part of the locked allocation unlocked so far.
pub fn claim_locked(program_id: Pubkey, accounts: &ClaimAccounts) -> SdkResult<Instruction> {
    build_instruction(program_id, accounts, &ClaimLockedArgs {})
}

#[derive(Clone, Debug)]
pub struct CloseClaimAccounts {
    pub distributor: Pubkey,
    pub claim_status: Pubkey,
    pub claimant: Pubkey,
}

impl ToAccountMetas for CloseClaimAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            writable(self.distributor),
            writable(self.claim_status),
            signer(self.claimant),
            readonly(SYSTEM_PROGRAM),
        ]
    }
}

pub fn close_claim(program_id: Pubkey, accounts: &CloseClaimAccounts, args: &CloseClaimArgs) -> SdkResult<Instruction> {
    build_instruction(program_id, accounts, args)
}

// -------------------------------------------------------------------------- //
//                                REWARD POOL                                 //
// -------------------------------------------------------------------------- //

#[derive(Clone, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct ClaimRewardsArgs {}

instruction_args!(ClaimRewardsArgs, "claim_rewards", [4, 144, 132, 71, 116, 23, 151, 80], padding::NONE);

#[derive(Clone, Debug)]
pub struct ClaimRewardsAccounts {
    pub reward_pool: Pubkey,
    pub stake_entry: Pubkey,
    pub reward_entry: Pubkey,
    pub vault: Pubkey,
    pub to: Pubkey,
    pub claimant: Pubkey,
    pub mint: Pubkey,
    pub token_program: Pubkey,
}

impl ToAccountMetas for ClaimRewardsAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            writable(self.reward_pool),
            readonly(self.stake_entry),
            writable(self.reward_entry),
            writable(self.vault),
            writable(self.to),
            signer(self.claimant),
            readonly(self.mint),
            readonly(self.token_program),
        ]
    }
}

pub fn claim_rewards(program_id: Pubkey, accounts: &ClaimRewardsAccounts) -> SdkResult<Instruction> {
    build_instruction(program_id, accounts, &ClaimRewardsArgs {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::{decode_instruction, encode_instruction_data, DecodedInstruction};

    #[test]
    fn new_claim_round_trip_and_proof_cap() {
        let args = NewClaimArgs { amount_unlocked: 10, amount_locked: 90, proof: vec![[3; 32], [4; 32]] };
        let data = encode_instruction_data(&args).unwrap();
        assert_eq!(data.len(), 8 + 8 + 8 + 4 + 64);
        assert_eq!(decode_instruction(&data).unwrap(), DecodedInstruction::NewClaim(args));

        let args = NewClaimArgs { amount_unlocked: 0, amount_locked: 0, proof: vec![[0; 32]; MAX_PROOF_LEN + 1] };
        assert!(matches!(encode_instruction_data(&args), Err(SdkError::InputTooLong { .. })));
    }

    #[test]
    fn close_claim_with_and_without_proof() {
        for args in [
            CloseClaimArgs { amount_unlocked: None, amount_locked: None, proof: None },
            CloseClaimArgs { amount_unlocked: Some(1), amount_locked: Some(2), proof: Some(vec![[9; 32]]) },
        ] {
            let data = encode_instruction_data(&args).unwrap();
            assert_eq!(decode_instruction(&data).unwrap(), DecodedInstruction::CloseClaim(args));
        }
    }

    #[test]
    fn new_claim_appends_system_program() {
        let accounts = ClaimAccounts {
            distributor: Pubkey::new_unique(),
            claim_status: Pubkey::new_unique(),
            from: Pubkey::new_unique(),
            to: Pubkey::new_unique(),
            claimant: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            token_program: anchor_spl::token::ID,
        };
        let args = NewClaimArgs { amount_unlocked: 1, amount_locked: 0, proof: vec![] };
        let ix = new_claim(Pubkey::new_unique(), &accounts, &args).unwrap();
        assert_eq!(ix.accounts.len(), 8);
        assert_eq!(ix.accounts[7].pubkey, SYSTEM_PROGRAM);
        assert_eq!(claim_locked(Pubkey::new_unique(), &accounts).unwrap().accounts.len(), 7);
    }
}
