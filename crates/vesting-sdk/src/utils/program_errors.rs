//! Maps the numeric failures reported by the on-chain programs to named error codes.
//!
//! Codes are looked up in a versioned table keyed by `(module, code)`. A structured program error reported by the
//! transport is preferred; the failure text is parsed only when the structured form is missing.

use std::fmt;

use anchor_lang::prelude::*;

use crate::utils::errors::{RawProgramError, SubmissionError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContractErrorCode {
    // Stream program
    AccountsNotWritable,
    InvalidMetadata,
    InvalidMetadataAccount,
    MetadataAccountMismatch,
    InvalidEscrowAccount,
    NotAssociated,
    MintMismatch,
    TransferNotAllowed,
    ContractClosed,
    InvalidTreasury,
    InvalidTimestamps,
    InvalidDepositConfiguration,
    AmountIsZero,
    AmountMoreThanAvailable,
    AmountAvailableIsZero,
    ArithmeticError,
    InvalidMetadataSize,
    UninitializedMetadata,
    Unauthorized,
    SelfTransfer,
    AlreadyPaused,
    NotPaused,
    MetadataNotRentExempt,
    StreamNotPausable,
    RateUpdateNotAllowed,
    TopupNotAllowed,
    CancelNotAllowed,
    // Aptos protocol module
    ProtocolPaused,
    InvalidCoinType,
    // Distributor program
    InsufficientUnlockedTokens,
    InvalidProof,
    ExceededMaxClaim,
    MaxNodesExceeded,
    OwnerMismatch,
    ClawbackDuringVesting,
    ClawbackBeforeStart,
    ClawbackAlreadyClaimed,
    SameClawbackReceiver,
    ClaimingIsNotStarted,
    ClaimExpired,
}

impl fmt::Display for ContractErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The program module an error code belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorModule {
    StreamProgram,
    Distributor,
    AptosProtocol,
}

pub struct ErrorTable {
    pub version: u8,
    pub entries: &'static [(ErrorModule, u32, ContractErrorCode)],
}

impl ErrorTable {
    pub fn lookup(&self, module: ErrorModule, code: u32) -> Option<ContractErrorCode> {
        self.entries.iter().find(|(m, c, _)| *m == module && *c == code).map(|(_, _, name)| *name)
    }
}

use ContractErrorCode as E;
use ErrorModule::{AptosProtocol, Distributor, StreamProgram};

pub const ERROR_TABLE_V1: ErrorTable = ErrorTable {
    version: 1,
    entries: &[
        (StreamProgram, 0x60, E::AccountsNotWritable),
        (StreamProgram, 0x61, E::InvalidMetadata),
        (StreamProgram, 0x62, E::InvalidMetadataAccount),
        (StreamProgram, 0x63, E::MetadataAccountMismatch),
        (StreamProgram, 0x64, E::InvalidEscrowAccount),
        (StreamProgram, 0x65, E::NotAssociated),
        (StreamProgram, 0x66, E::MintMismatch),
        (StreamProgram, 0x67, E::TransferNotAllowed),
        (StreamProgram, 0x68, E::ContractClosed),
        (StreamProgram, 0x69, E::InvalidTreasury),
        (StreamProgram, 0x6a, E::InvalidTimestamps),
        (StreamProgram, 0x6b, E::InvalidDepositConfiguration),
        (StreamProgram, 0x6c, E::AmountIsZero),
        (StreamProgram, 0x6d, E::AmountMoreThanAvailable),
        (StreamProgram, 0x6e, E::AmountAvailableIsZero),
        (StreamProgram, 0x6f, E::ArithmeticError),
        (StreamProgram, 0x70, E::InvalidMetadataSize),
        (StreamProgram, 0x71, E::UninitializedMetadata),
        (StreamProgram, 0x72, E::Unauthorized),
        (StreamProgram, 0x73, E::SelfTransfer),
        (StreamProgram, 0x74, E::AlreadyPaused),
        (StreamProgram, 0x75, E::NotPaused),
        (StreamProgram, 0x76, E::MetadataNotRentExempt),
        (AptosProtocol, 0x1, E::Unauthorized),
        (AptosProtocol, 0x2, E::ContractClosed),
        (AptosProtocol, 0x3, E::InvalidTimestamps),
        (AptosProtocol, 0x4, E::AmountIsZero),
        (AptosProtocol, 0x5, E::AmountMoreThanAvailable),
        (AptosProtocol, 0x6, E::TransferNotAllowed),
        (AptosProtocol, 0x7, E::ProtocolPaused),
        (AptosProtocol, 0x8, E::InvalidCoinType),
        (Distributor, 6000, E::InsufficientUnlockedTokens),
        (Distributor, 6001, E::InvalidProof),
        (Distributor, 6002, E::ExceededMaxClaim),
        (Distributor, 6003, E::MaxNodesExceeded),
        (Distributor, 6004, E::Unauthorized),
        (Distributor, 6005, E::OwnerMismatch),
        (Distributor, 6006, E::ClawbackDuringVesting),
        (Distributor, 6007, E::ClawbackBeforeStart),
        (Distributor, 6008, E::ClawbackAlreadyClaimed),
        (Distributor, 6009, E::SameClawbackReceiver),
        (Distributor, 6010, E::ClaimingIsNotStarted),
        (Distributor, 6011, E::ArithmeticError),
    ],
};

/// Extends v1 with the pause and rate-update capabilities.
pub const ERROR_TABLE_V2: ErrorTable = ErrorTable {
    version: 2,
    entries: &[
        (StreamProgram, 0x77, E::StreamNotPausable),
        (StreamProgram, 0x78, E::RateUpdateNotAllowed),
        (StreamProgram, 0x79, E::TopupNotAllowed),
        (StreamProgram, 0x7a, E::CancelNotAllowed),
        (AptosProtocol, 0x9, E::AlreadyPaused),
        (AptosProtocol, 0xa, E::NotPaused),
        (AptosProtocol, 0xb, E::RateUpdateNotAllowed),
        (Distributor, 6012, E::ClaimExpired),
    ],
};

pub const ERROR_TABLES: &[ErrorTable] = &[ERROR_TABLE_V1, ERROR_TABLE_V2];

/// Looks the code up in every table up to and including `version`, newest first.
pub fn lookup_error(version: u8, module: ErrorModule, code: u32) -> Option<ContractErrorCode> {
    ERROR_TABLES.iter().rev().filter(|table| table.version <= version).find_map(|table| table.lookup(module, code))
}

pub const LATEST_ERROR_TABLE_VERSION: u8 = 2;

const SOLANA_CUSTOM_ERROR_MARKER: &str = "custom program error: 0x";
const APTOS_ABORT_MARKER: &str = "Move abort in ";

/// Chain-specific parser turning a submission failure into a named error code.
#[derive(Clone, Debug)]
pub enum ErrorParser {
    Solana { stream_program: Pubkey, distributor_program: Pubkey },
    Aptos { module_address: String },
}

impl ErrorParser {
    pub fn parse(&self, err: &SubmissionError) -> Option<ContractErrorCode> {
        let SubmissionError::Rejected { message, program_error } = err else {
            return None;
        };

        match program_error {
            Some(raw) => self.parse_structured(raw),
            None => self.parse_text(message),
        }
    }

    fn parse_structured(&self, raw: &RawProgramError) -> Option<ContractErrorCode> {
        let module = self.module_of(&raw.module)?;
        lookup_error(LATEST_ERROR_TABLE_VERSION, module, raw.code)
    }

    fn parse_text(&self, message: &str) -> Option<ContractErrorCode> {
        match self {
            Self::Solana { distributor_program, .. } => {
                let code = parse_hex_after(message, SOLANA_CUSTOM_ERROR_MARKER)?;
                // Dev: the program id is not always part of the log line; fall back to the stream program
                let module =
                    if message.contains(&distributor_program.to_string()) { Distributor } else { StreamProgram };
                lookup_error(LATEST_ERROR_TABLE_VERSION, module, code)
            }
            Self::Aptos { .. } => {
                let start = message.find(APTOS_ABORT_MARKER)? + APTOS_ABORT_MARKER.len();
                let rest = &message[start..];
                let (module_path, tail) = rest.split_once(": ")?;
                let module = self.module_of(module_path)?;
                let code = parse_hex_after(tail, "0x")?;
                lookup_error(LATEST_ERROR_TABLE_VERSION, module, code)
            }
        }
    }

    fn module_of(&self, module: &str) -> Option<ErrorModule> {
        match self {
            Self::Solana { stream_program, distributor_program } => {
                let program = module.parse::<Pubkey>().ok()?;
                if program == *stream_program {
                    Some(StreamProgram)
                } else if program == *distributor_program {
                    Some(Distributor)
                } else {
                    None
                }
            }
            Self::Aptos { module_address } => {
                let (address, name) = module.rsplit_once("::")?;
                let same_address = normalize_hex(address) == normalize_hex(module_address);
                (same_address && name == crate::utils::constants::programs::APTOS_PROTOCOL_MODULE)
                    .then_some(AptosProtocol)
            }
        }
    }
}

fn parse_hex_after(message: &str, marker: &str) -> Option<u32> {
    let start = message.find(marker)? + marker.len();
    let digits: String = message[start..].chars().take_while(|c| c.is_ascii_hexdigit()).collect();
    u32::from_str_radix(&digits, 16).ok()
}

fn normalize_hex(address: &str) -> String {
    let digits = address.trim().trim_start_matches("0x").trim_start_matches('0');
    digits.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::programs::{APTOS_MODULE_MAINNET, DISTRIBUTOR_PROGRAM, STREAM_PROGRAM_MAINNET};

    fn solana() -> ErrorParser {
        ErrorParser::Solana { stream_program: STREAM_PROGRAM_MAINNET, distributor_program: DISTRIBUTOR_PROGRAM }
    }

    #[test]
    fn structured_error_is_preferred() {
        let err = SubmissionError::Rejected {
            message: "custom program error: 0x60".to_string(),
            program_error: Some(RawProgramError { module: STREAM_PROGRAM_MAINNET.to_string(), code: 0x6d }),
        };
        assert_eq!(solana().parse(&err), Some(ContractErrorCode::AmountMoreThanAvailable));
    }

    #[test]
    fn solana_text_fallback() {
        let err = SubmissionError::rejected("Error processing Instruction 1: custom program error: 0x74");
        assert_eq!(solana().parse(&err), Some(ContractErrorCode::AlreadyPaused));

        let err = SubmissionError::rejected(format!(
            "Program {} failed: custom program error: 0x1771",
            DISTRIBUTOR_PROGRAM
        ));
        assert_eq!(solana().parse(&err), Some(ContractErrorCode::InvalidProof));
    }

    #[test]
    fn aptos_text_fallback() {
        let parser = ErrorParser::Aptos { module_address: APTOS_MODULE_MAINNET.to_string() };
        let err = SubmissionError::rejected(format!("Move abort in {}::protocol: 0x5", APTOS_MODULE_MAINNET));
        assert_eq!(parser.parse(&err), Some(ContractErrorCode::AmountMoreThanAvailable));

        let err = SubmissionError::rejected("Move abort in 0x1::coin: EINSUFFICIENT_BALANCE(0x10006)");
        assert_eq!(parser.parse(&err), None);
    }

    #[test]
    fn unknown_codes_and_non_rejections_yield_none() {
        assert_eq!(solana().parse(&SubmissionError::rejected("custom program error: 0xffff")), None);
        assert_eq!(solana().parse(&SubmissionError::Transport("connection reset".to_string())), None);
        assert_eq!(solana().parse(&SubmissionError::rejected("blockhash not found")), None);
    }

    #[test]
    fn older_table_versions_do_not_see_newer_codes() {
        assert_eq!(lookup_error(1, StreamProgram, 0x77), None);
        assert_eq!(lookup_error(2, StreamProgram, 0x77), Some(ContractErrorCode::StreamNotPausable));
        assert_eq!(lookup_error(2, StreamProgram, 0x60), Some(ContractErrorCode::AccountsNotWritable));
    }
}
