use anchor_lang::{
    prelude::*,
    solana_program::instruction::{AccountMeta, Instruction},
    AnchorDeserialize, AnchorSerialize, ToAccountMetas,
};

use crate::{
    instructions::{build_instruction, readonly, signer, writable},
    utils::{
        constants::{padding, programs::SYSTEM_PROGRAM},
        errors::SdkResult,
    },
};

#[derive(Clone, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct ClawbackArgs {}

instruction_args!(ClawbackArgs, "clawback", [111, 92, 142, 79, 33, 234, 82, 27], padding::NONE);

#[derive(Clone, Debug)]
pub struct ClawbackAccounts {
    pub distributor: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub admin: Pubkey,
    pub mint: Pubkey,
    pub token_program: Pubkey,
}

impl ToAccountMetas for ClawbackAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            writable(self.distributor),
            writable(self.from),
            writable(self.to),
            signer(self.admin),
            readonly(self.mint),
            readonly(SYSTEM_PROGRAM),
            readonly(self.token_program),
        ]
    }
}

/// Returns the unclaimed balance of the distributor vault to the clawback receiver.
pub fn clawback(program_id: Pubkey, accounts: &ClawbackAccounts) -> SdkResult<Instruction> {
    build_instruction(program_id, accounts, &ClawbackArgs {})
}
