use anchor_lang::{
    prelude::*,
    solana_program::instruction::{AccountMeta, Instruction},
    AnchorDeserialize, AnchorSerialize, ToAccountMetas,
};
use anchor_spl::associated_token;

use crate::{
    instructions::{build_instruction, readonly, signer, writable},
    utils::{
        constants::{
            padding,
            programs::{RENT_SYSVAR, SYSTEM_PROGRAM},
        },
        errors::SdkResult,
    },
};

#[derive(Clone, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct TransferRecipientArgs {}

instruction_args!(TransferRecipientArgs, "transfer_recipient", [235, 246, 224, 64, 105, 166, 20, 138], padding::NONE);

#[derive(Clone, Debug)]
pub struct TransferRecipientAccounts {
    pub authority: Pubkey,
    pub new_recipient: Pubkey,
    pub new_recipient_tokens: Pubkey,
    pub metadata: Pubkey,
    pub mint: Pubkey,
    pub token_program: Pubkey,
}

impl ToAccountMetas for TransferRecipientAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            signer(self.authority),
            writable(self.new_recipient),
            writable(self.new_recipient_tokens),
            writable(self.metadata),
            readonly(self.mint),
            readonly(RENT_SYSVAR),
            readonly(self.token_program),
            readonly(associated_token::ID),
            readonly(SYSTEM_PROGRAM),
        ]
    }
}

pub fn transfer_recipient(program_id: Pubkey, accounts: &TransferRecipientAccounts) -> SdkResult<Instruction> {
    build_instruction(program_id, accounts, &TransferRecipientArgs {})
}
