//! Instruction builders for the stream, distributor and reward pool programs.
//!
//! Instruction data is `discriminator || borsh(args) || zero padding`. The discriminator is
//! `sha256("global:<name>")[..8]`; the padding length is fixed per instruction and reserved for future arguments.

/// Implements [`Discriminator`] and [`InstructionArgs`] for an argument struct.
macro_rules! instruction_args {
    ($args:ty, $name:literal, $discriminator:expr, $padding:expr) => {
        impl anchor_lang::Discriminator for $args {
            const DISCRIMINATOR: &'static [u8] = &$discriminator;
        }

        impl $crate::instructions::InstructionArgs for $args {
            const NAME: &'static str = $name;
            const RESERVED_PADDING: usize = $padding;
        }
    };
    ($args:ty, $name:literal, $discriminator:expr, $padding:expr, validate) => {
        impl anchor_lang::Discriminator for $args {
            const DISCRIMINATOR: &'static [u8] = &$discriminator;
        }

        impl $crate::instructions::InstructionArgs for $args {
            const NAME: &'static str = $name;
            const RESERVED_PADDING: usize = $padding;

            fn validate(&self) -> $crate::utils::errors::SdkResult<()> {
                self.check()
            }
        }
    };
}
pub(crate) use instruction_args;

pub mod cancel;
pub mod claim;
pub mod clawback;
pub mod create;
pub mod pause;
pub mod topup;
pub mod transfer;
pub mod update;
pub mod withdraw;
pub mod wrap;

use anchor_lang::{
    prelude::*,
    solana_program::instruction::{AccountMeta, Instruction},
    AnchorDeserialize, AnchorSerialize, Discriminator, ToAccountMetas,
};

pub use cancel::*;
pub use claim::*;
pub use clawback::*;
pub use create::*;
pub use pause::*;
pub use topup::*;
pub use transfer::*;
pub use update::*;
pub use withdraw::*;
pub use wrap::*;

use crate::{
    codec::split_discriminator,
    utils::errors::{SdkError, SdkResult},
};

/// Arguments of one program instruction.
pub trait InstructionArgs: Discriminator + AnchorSerialize + AnchorDeserialize {
    const NAME: &'static str;
    /// Zero bytes appended after the arguments.
    const RESERVED_PADDING: usize;

    fn validate(&self) -> SdkResult<()> {
        Ok(())
    }
}

pub fn encode_instruction_data<A: InstructionArgs>(args: &A) -> SdkResult<Vec<u8>> {
    args.validate()?;

    let mut data = Vec::with_capacity(8 + A::RESERVED_PADDING);
    data.extend_from_slice(A::DISCRIMINATOR);
    args.serialize(&mut data).map_err(|err| SdkError::invalid(format!("{}: {err}", A::NAME)))?;
    data.resize(data.len() + A::RESERVED_PADDING, 0);

    Ok(data)
}

/// Decodes the arguments of a known instruction. Padding and any other trailing bytes are ignored.
pub fn decode_instruction_args<A: InstructionArgs>(data: &[u8]) -> SdkResult<A> {
    let (discriminator, mut body) = split_discriminator(data)?;
    if discriminator.as_slice() != A::DISCRIMINATOR {
        return Err(SdkError::UnsupportedDiscriminator(discriminator));
    }

    A::deserialize(&mut body).map_err(|err| SdkError::malformed(A::NAME, err))
}

pub fn build_instruction<A: InstructionArgs, T: ToAccountMetas>(
    program_id: Pubkey,
    accounts: &T,
    args: &A,
) -> SdkResult<Instruction> {
    Ok(Instruction { program_id, accounts: accounts.to_account_metas(None), data: encode_instruction_data(args)? })
}

pub(crate) fn writable(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new(pubkey, false)
}

pub(crate) fn readonly(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new_readonly(pubkey, false)
}

pub(crate) fn signer(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new(pubkey, true)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedInstruction {
    Create(CreateArgs),
    Withdraw(WithdrawArgs),
    Cancel(CancelArgs),
    TransferRecipient(TransferRecipientArgs),
    Topup(TopupArgs),
    Update(UpdateArgs),
    Pause(PauseArgs),
    Unpause(UnpauseArgs),
    NewClaim(NewClaimArgs),
    ClaimLocked(ClaimLockedArgs),
    CloseClaim(CloseClaimArgs),
    Clawback(ClawbackArgs),
    ClaimRewards(ClaimRewardsArgs),
}

/// Decodes instruction data of any instruction the crate builds, dispatching on its discriminator.
pub fn decode_instruction(data: &[u8]) -> SdkResult<DecodedInstruction> {
    let (discriminator, _) = split_discriminator(data)?;
    let d = discriminator.as_slice();

    let decoded = if d == CreateArgs::DISCRIMINATOR {
        DecodedInstruction::Create(decode_instruction_args(data)?)
    } else if d == WithdrawArgs::DISCRIMINATOR {
        DecodedInstruction::Withdraw(decode_instruction_args(data)?)
    } else if d == CancelArgs::DISCRIMINATOR {
        DecodedInstruction::Cancel(decode_instruction_args(data)?)
    } else if d == TransferRecipientArgs::DISCRIMINATOR {
        DecodedInstruction::TransferRecipient(decode_instruction_args(data)?)
    } else if d == TopupArgs::DISCRIMINATOR {
        DecodedInstruction::Topup(decode_instruction_args(data)?)
    } else if d == UpdateArgs::DISCRIMINATOR {
        DecodedInstruction::Update(decode_instruction_args(data)?)
    } else if d == PauseArgs::DISCRIMINATOR {
        DecodedInstruction::Pause(decode_instruction_args(data)?)
    } else if d == UnpauseArgs::DISCRIMINATOR {
        DecodedInstruction::Unpause(decode_instruction_args(data)?)
    } else if d == NewClaimArgs::DISCRIMINATOR {
        DecodedInstruction::NewClaim(decode_instruction_args(data)?)
    } else if d == ClaimLockedArgs::DISCRIMINATOR {
        DecodedInstruction::ClaimLocked(decode_instruction_args(data)?)
    } else if d == CloseClaimArgs::DISCRIMINATOR {
        DecodedInstruction::CloseClaim(decode_instruction_args(data)?)
    } else if d == ClawbackArgs::DISCRIMINATOR {
        DecodedInstruction::Clawback(decode_instruction_args(data)?)
    } else if d == ClaimRewardsArgs::DISCRIMINATOR {
        DecodedInstruction::ClaimRewards(decode_instruction_args(data)?)
    } else {
        return Err(SdkError::UnsupportedDiscriminator(discriminator));
    };

    Ok(decoded)
}
