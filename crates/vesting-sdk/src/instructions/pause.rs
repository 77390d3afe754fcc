use anchor_lang::{
    prelude::*,
    solana_program::instruction::{AccountMeta, Instruction},
    AnchorDeserialize, AnchorSerialize, ToAccountMetas,
};

use crate::{
    instructions::{build_instruction, signer, writable},
    utils::{constants::padding, errors::SdkResult},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct PauseArgs {}

instruction_args!(PauseArgs, "pause", [211, 22, 221, 251, 74, 121, 193, 47], padding::NONE);

#[derive(Clone, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct UnpauseArgs {}

instruction_args!(UnpauseArgs, "unpause", [169, 144, 4, 38, 10, 141, 188, 255], padding::NONE);

#[derive(Clone, Debug)]
pub struct PauseAccounts {
    pub sender: Pubkey,
    pub metadata: Pubkey,
}

impl ToAccountMetas for PauseAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![signer(self.sender), writable(self.metadata)]
    }
}

pub fn pause(program_id: Pubkey, accounts: &PauseAccounts) -> SdkResult<Instruction> {
    build_instruction(program_id, accounts, &PauseArgs {})
}

pub fn unpause(program_id: Pubkey, accounts: &PauseAccounts) -> SdkResult<Instruction> {
    build_instruction(program_id, accounts, &UnpauseArgs {})
}
