//! Loans Constants

/// Fixed-point scale of the discount quotient (five decimal digits).
pub const DISCOUNT_PRECISION: u32 = 100_000;
