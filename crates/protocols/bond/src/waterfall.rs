//! Waterfall Arithmetic
//!
//! Pure big-integer math for tranche minting and redemption. No I/O.
//!
//! Every division here is truncating (floor) division on non-negative
//! integers, and multiplications always run before divisions, matching the
//! chain-side contract's order of operations exactly. Reordering changes
//! rounding and is a correctness bug.

use crate::constants::TRANCHE_RATIO_GRANULARITY;
use num_bigint::BigUint;
use num_traits::Zero;

/// `pool * amount / supply`, floor; 0 when supply is 0.
pub fn proportional_share(pool: &BigUint, amount: &BigUint, supply: &BigUint) -> BigUint {
    if supply.is_zero() {
        return BigUint::zero();
    }
    pool * amount / supply
}

/// Tranche tokens minted for a collateral deposit.
///
/// Virgin bond (no collateral yet): `input * ratio / granularity`.
/// Otherwise the mint also scales by the debt:collateral ratio:
/// `input * ratio * total_debt / granularity / total_collateral`.
pub fn mint_amount(
    input: &BigUint,
    ratio: u32,
    total_debt: &BigUint,
    total_collateral: &BigUint,
) -> BigUint {
    let ratio = BigUint::from(ratio);
    let granularity = BigUint::from(TRANCHE_RATIO_GRANULARITY);

    if total_collateral.is_zero() {
        input * ratio / granularity
    } else {
        input * ratio * total_debt / granularity / total_collateral
    }
}

/// Collateral required so that [`mint_amount`] yields `desired` for the
/// tranche with the given ratio. Exact algebraic inverse, subject to the
/// same floor truncation.
pub fn required_input(
    desired: &BigUint,
    ratio: u32,
    total_debt: &BigUint,
    total_collateral: &BigUint,
) -> BigUint {
    if ratio == 0 {
        return BigUint::zero();
    }
    let ratio = BigUint::from(ratio);
    let granularity = BigUint::from(TRANCHE_RATIO_GRANULARITY);

    if total_collateral.is_zero() {
        desired * granularity / ratio
    } else if total_debt.is_zero() {
        // degenerate snapshot: collateral with no debt cannot be inverted
        BigUint::zero()
    } else {
        desired * granularity * total_collateral / ratio / total_debt
    }
}

/// The collateral claim of one tranche during a waterfall walk:
/// `min(remaining, supply)`.
pub fn waterfall_claim(remaining: &BigUint, supply: &BigUint) -> BigUint {
    if remaining > supply {
        supply.clone()
    } else {
        remaining.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_proportional_share() {
        // 1:1 backing
        assert_eq!(
            proportional_share(&big(1_000_000), &big(500_000), &big(1_000_000)),
            big(500_000)
        );
        // floors
        assert_eq!(proportional_share(&big(10), &big(1), &big(3)), big(3));
    }

    #[test]
    fn test_proportional_share_zero_supply() {
        assert_eq!(
            proportional_share(&big(1_000_000), &big(1), &BigUint::zero()),
            BigUint::zero()
        );
    }

    #[test]
    fn test_mint_amount_virgin_bond() {
        // no existing collateral: straight ratio split
        let minted = mint_amount(&big(100_000_000), 200, &BigUint::zero(), &BigUint::zero());
        assert_eq!(minted, big(20_000_000));
    }

    #[test]
    fn test_mint_amount_at_par() {
        // debt == collateral: the debt multiplier is a no-op
        let minted = mint_amount(&big(100_000_000), 500, &big(30_000_000), &big(30_000_000));
        assert_eq!(minted, big(50_000_000));
    }

    #[test]
    fn test_mint_amount_under_par() {
        // collateral 20M backing 30M debt: mint scales up by 3/2
        let minted = mint_amount(&big(10_000_000), 200, &big(30_000_000), &big(20_000_000));
        // 10M * 200 * 30M / 1000 / 20M = 3M
        assert_eq!(minted, big(3_000_000));
    }

    #[test]
    fn test_required_input_inverts_mint() {
        let debt = big(30_000_000);
        let collateral = big(20_000_000);
        let desired = big(3_000_000);

        let input = required_input(&desired, 200, &debt, &collateral);
        assert_eq!(mint_amount(&input, 200, &debt, &collateral), desired);
    }

    #[test]
    fn test_required_input_virgin_bond() {
        let input = required_input(&big(20_000_000), 200, &BigUint::zero(), &BigUint::zero());
        assert_eq!(input, big(100_000_000));
    }

    #[test]
    fn test_required_input_truncation_bounds() {
        // where division is inexact the round trip may lose at most
        // rounding error, never overshoot
        let debt = big(29_999_999);
        let collateral = big(30_000_001);
        for desired in [1u64, 7, 999, 123_457] {
            let desired = big(desired);
            let input = required_input(&desired, 300, &debt, &collateral);
            let back = mint_amount(&input, 300, &debt, &collateral);
            assert!(back <= desired);
        }
    }

    #[test]
    fn test_waterfall_claim_is_min() {
        assert_eq!(waterfall_claim(&big(100), &big(70)), big(70));
        assert_eq!(waterfall_claim(&big(50), &big(70)), big(50));
        assert_eq!(waterfall_claim(&BigUint::zero(), &big(70)), BigUint::zero());
    }

    #[test]
    fn test_mint_amount_large_values_no_overflow() {
        // 18-decimals scale amounts comfortably exceed u128 once multiplied
        let input = BigUint::parse_bytes(b"340282366920938463463374607431768211455", 10).unwrap();
        let debt = BigUint::parse_bytes(b"250000000000000000000000000000", 10).unwrap();
        let collateral = BigUint::parse_bytes(b"125000000000000000000000000000", 10).unwrap();
        let minted = mint_amount(&input, 500, &debt, &collateral);
        // ratio 1/2 of input, times debt:collateral 2 => equals input
        assert_eq!(minted, input);
    }
}
