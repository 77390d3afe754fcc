pub mod amount;
pub mod errors;
pub mod fee_math;
pub mod time;

// Export all of the crate symbols
pub use amount::*;
pub use errors::*;
pub use fee_math::*;
pub use time::*;
