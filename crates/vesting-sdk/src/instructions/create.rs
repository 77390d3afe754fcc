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
            misc::STREAM_NAME_CAPACITY,
            padding,
            programs::{RENT_SYSVAR, SYSTEM_PROGRAM},
        },
        errors::{SdkError, SdkResult},
    },
};

#[derive(Clone, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct CreateArgs {
    pub start_time: u64,
    pub net_amount_deposited: u64,
    pub period: u64,
    pub amount_per_period: u64,
    pub cliff: u64,
    pub cliff_amount: u64,
    pub cancelable_by_sender: bool,
    pub cancelable_by_recipient: bool,
    pub automatic_withdrawal: bool,
    pub transferable_by_sender: bool,
    pub transferable_by_recipient: bool,
    pub can_topup: bool,
    pub stream_name: [u8; STREAM_NAME_CAPACITY],
    pub withdraw_frequency: u64,
    pub pausable: Option<bool>,
    pub can_update_rate: Option<bool>,
}

impl CreateArgs {
    fn check(&self) -> SdkResult<()> {
        if self.period == 0 {
            return Err(SdkError::invalid("period must be positive"));
        }
        if self.net_amount_deposited == 0 {
            return Err(SdkError::invalid("deposit must be positive"));
        }

        Ok(())
    }
}

instruction_args!(CreateArgs, "create", [24, 30, 200, 40, 5, 28, 7, 119], padding::CREATE, validate);

#[derive(Clone, Debug)]
pub struct CreateAccounts {
    pub sender: Pubkey,
    pub sender_tokens: Pubkey,
    pub recipient: Pubkey,
    pub metadata: Pubkey,
    /// An ephemeral metadata keypair signs the creation; a derived metadata address does not.
    pub metadata_is_signer: bool,
    pub escrow_tokens: Pubkey,
    pub recipient_tokens: Pubkey,
    pub treasury: Pubkey,
    pub treasury_tokens: Pubkey,
    pub withdrawor: Pubkey,
    pub partner: Pubkey,
    pub partner_tokens: Pubkey,
    pub mint: Pubkey,
    pub fee_oracle: Pubkey,
    pub stream_program: Pubkey,
    pub token_program: Pubkey,
}

impl ToAccountMetas for CreateAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            signer(self.sender),
            writable(self.sender_tokens),
            writable(self.recipient),
            AccountMeta::new(self.metadata, self.metadata_is_signer),
            writable(self.escrow_tokens),
            writable(self.recipient_tokens),
            writable(self.treasury),
            writable(self.treasury_tokens),
            writable(self.withdrawor),
            writable(self.partner),
            writable(self.partner_tokens),
            readonly(self.mint),
            readonly(self.fee_oracle),
            readonly(RENT_SYSVAR),
            readonly(self.stream_program),
            readonly(self.token_program),
            readonly(associated_token::ID),
            readonly(SYSTEM_PROGRAM),
        ]
    }
}

pub fn create(accounts: &CreateAccounts, args: &CreateArgs) -> SdkResult<Instruction> {
    build_instruction(accounts.stream_program, accounts, args)
}
