//! Bond protocol constants.

/// Fixed denominator against which tranche ratios are expressed.
///
/// The ratios of all tranches belonging to one bond sum to this value;
/// a ratio of 200 is a 20% claim on newly deposited collateral.
pub const TRANCHE_RATIO_GRANULARITY: u32 = 1000;
