use anchor_lang::{
    prelude::*,
    solana_program::instruction::{AccountMeta, Instruction},
    AnchorDeserialize, AnchorSerialize, ToAccountMetas,
};

use crate::{
    instructions::{build_instruction, readonly, signer, writable},
    utils::{
        constants::{misc::WITHDRAW_ALL, padding},
        errors::SdkResult,
    },
};

#[derive(Clone, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct WithdrawArgs {
    /// `WITHDRAW_ALL` withdraws everything unlocked.
    pub amount: u64,
}

impl WithdrawArgs {
    pub fn all() -> Self {
        Self { amount: WITHDRAW_ALL }
    }
}

instruction_args!(WithdrawArgs, "withdraw", [183, 18, 70, 156, 148, 109, 161, 34], padding::NONE);

#[derive(Clone, Debug)]
pub struct WithdrawAccounts {
    pub authority: Pubkey,
    pub recipient: Pubkey,
    pub recipient_tokens: Pubkey,
    pub metadata: Pubkey,
    pub escrow_tokens: Pubkey,
    pub treasury: Pubkey,
    pub treasury_tokens: Pubkey,
    pub partner: Pubkey,
    pub partner_tokens: Pubkey,
    pub mint: Pubkey,
    pub token_program: Pubkey,
}

impl ToAccountMetas for WithdrawAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            signer(self.authority),
            writable(self.recipient),
            writable(self.recipient_tokens),
            writable(self.metadata),
            writable(self.escrow_tokens),
            writable(self.treasury),
            writable(self.treasury_tokens),
            writable(self.partner),
            writable(self.partner_tokens),
            readonly(self.mint),
            readonly(self.token_program),
        ]
    }
}

pub fn withdraw(program_id: Pubkey, accounts: &WithdrawAccounts, args: &WithdrawArgs) -> SdkResult<Instruction> {
    build_instruction(program_id, accounts, args)
}
