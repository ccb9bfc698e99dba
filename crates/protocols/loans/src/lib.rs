//! Loan planning over tranche bonds.
//!
//! A borrower deposits bond collateral, mints the full tranche stack, and
//! sells some of it on swap venues for a single output currency. This crate
//! provides the venue abstraction, a constant-product reference venue, and
//! the [`LoanManager`] that sequences sales senior-first to minimize the
//! aggregate discount.

pub mod constants;
pub mod cpmm;
pub mod manager;
pub mod state;
pub mod venue;

pub use constants::DISCOUNT_PRECISION;
pub use cpmm::ConstantProductVenue;
pub use manager::LoanManager;
pub use state::{BorrowOutput, Sale, SalesOptions};
pub use venue::SwapVenue;
