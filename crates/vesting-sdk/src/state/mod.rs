pub mod address;
pub mod aptos_contract;
pub mod contract;
pub mod distributor;
pub mod fee_table;
pub mod reward_pool;
pub mod stream;

pub use address::{AccountAddress, Address, Chain};
pub use aptos_contract::{AptosContract, AptosStreamMeta};
pub use contract::{Contract, StreamParams};
pub use distributor::{ClaimStatus, MerkleDistributor};
pub use fee_table::{FeeTable, PartnerFeeRecord};
pub use reward_pool::{RewardEntry, RewardPool};
pub use stream::{PartyFee, Stream, StreamFlags};
