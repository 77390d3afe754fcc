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

/// Changes to a live stream. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct UpdateArgs {
    pub enable_automatic_withdrawal: Option<bool>,
    pub withdraw_frequency: Option<u64>,
    pub amount_per_period: Option<u64>,
}

impl UpdateArgs {
    fn check(&self) -> SdkResult<()> {
        if self.enable_automatic_withdrawal.is_none()
            && self.withdraw_frequency.is_none()
            && self.amount_per_period.is_none()
        {
            return Err(SdkError::invalid("update changes nothing"));
        }
        if self.withdraw_frequency == Some(0) {
            return Err(SdkError::invalid("withdraw frequency must be positive"));
        }
        if self.amount_per_period == Some(0) {
            return Err(SdkError::invalid("amount per period must be positive"));
        }

        Ok(())
    }
}

instruction_args!(UpdateArgs, "update", [219, 200, 88, 176, 158, 63, 253, 127], padding::UPDATE, validate);

#[derive(Clone, Debug)]
pub struct UpdateAccounts {
    pub authority: Pubkey,
    pub metadata: Pubkey,
    pub withdrawor: Pubkey,
}

impl ToAccountMetas for UpdateAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![signer(self.authority), writable(self.metadata), writable(self.withdrawor), readonly(SYSTEM_PROGRAM)]
    }
}

pub fn update(program_id: Pubkey, accounts: &UpdateAccounts, args: &UpdateArgs) -> SdkResult<Instruction> {
    build_instruction(program_id, accounts, args)
}
