use anchor_lang::{
    prelude::*,
    solana_program::instruction::{AccountMeta, Instruction},
    AnchorDeserialize, AnchorSerialize, ToAccountMetas,
};

use crate::{
    instructions::{build_instruction, readonly, signer, writable},
    utils::{
        constants::{padding, programs::SYSTEM_PROGRAM},
        errors::{SdkError, SdkResult},
    },
};

#[derive(Clone, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct TopupArgs {
    pub amount: u64,
}

impl TopupArgs {
    fn check(&self) -> SdkResult<()> {
        if self.amount == 0 {
            return Err(SdkError::invalid("top-up amount must be positive"));
        }

        Ok(())
    }
}

instruction_args!(TopupArgs, "topup", [126, 42, 49, 78, 225, 151, 99, 77], padding::NONE, validate);

#[derive(Clone, Debug)]
pub struct TopupAccounts {
    pub sender: Pubkey,
    pub sender_tokens: Pubkey,
    pub metadata: Pubkey,
    pub escrow_tokens: Pubkey,
    pub treasury: Pubkey,
    pub treasury_tokens: Pubkey,
    pub withdrawor: Pubkey,
    pub partner: Pubkey,
    pub partner_tokens: Pubkey,
    pub mint: Pubkey,
    pub fee_oracle: Pubkey,
    pub token_program: Pubkey,
}

impl ToAccountMetas for TopupAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            signer(self.sender),
            writable(self.sender_tokens),
            writable(self.metadata),
            writable(self.escrow_tokens),
            writable(self.treasury),
            writable(self.treasury_tokens),
            writable(self.withdrawor),
            writable(self.partner),
            writable(self.partner_tokens),
            readonly(self.mint),
            readonly(self.fee_oracle),
            readonly(self.token_program),
            readonly(SYSTEM_PROGRAM),
        ]
    }
}

pub fn topup(program_id: Pubkey, accounts: &TopupAccounts, args: &TopupArgs) -> SdkResult<Instruction> {
    build_instruction(program_id, accounts, args)
}
