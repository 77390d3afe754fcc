pub mod constants;
pub mod errors;
pub mod pda;
pub mod program_errors;
pub mod stream_type;
pub mod unlock_math;
pub mod validations;

// Re-export shared utilities for convenience
pub use vesting_common::{
    calculate_total_amount_to_deposit, current_unix_time, fee_amount, strip_fees, FeePercent, FeeSchedule,
};
