//! Tranche Bond Protocol
//!
//! Off-chain model of a tranche bond: a pool of deposited collateral split
//! into an ordered sequence of risk tranches, most senior first. The
//! entities here are immutable point-in-time snapshots; every operation is
//! a pure function reproducing the deterministic integer arithmetic the
//! chain-side contract performs, so previews agree bit-for-bit with
//! on-chain results.

pub mod bond;
pub mod constants;
pub mod state;
pub mod tranche;
pub mod waterfall;

// Re-exports
pub use bond::Bond;
pub use constants::TRANCHE_RATIO_GRANULARITY;
pub use state::{BondData, TokenData, TrancheData};
pub use tranche::Tranche;
pub use waterfall::{mint_amount, proportional_share, required_input, waterfall_claim};
