use anchor_lang::{
    prelude::*,
    solana_program::instruction::{AccountMeta, Instruction},
    AnchorDeserialize, AnchorSerialize, ToAccountMetas,
};

use crate::{
    instructions::{build_instruction, readonly, signer, writable},
    utils::{constants::padding, errors::SdkResult},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct CancelArgs {}

instruction_args!(CancelArgs, "cancel", [232, 219, 223, 41, 219, 236, 220, 190], padding::NONE);

#[derive(Clone, Debug)]
pub struct CancelAccounts {
    pub authority: Pubkey,
    pub sender: Pubkey,
    pub sender_tokens: Pubkey,
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

impl ToAccountMetas for CancelAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            signer(self.authority),
            writable(self.sender),
            writable(self.sender_tokens),
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

pub fn cancel(program_id: Pubkey, accounts: &CancelAccounts) -> SdkResult<Instruction> {
    build_instruction(program_id, accounts, &CancelArgs {})
}
