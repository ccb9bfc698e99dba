//! Bond Snapshot Records
//!
//! Wire-format records for bond and tranche state as an indexer delivers
//! them. Big integers arrive as decimal strings (subgraph convention) and
//! are parsed once, at entity construction.

use bulwark_core::{Error, Result};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Token record attached to a tranche or to the bond's collateral.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    /// Contract address
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub decimals: String,
    pub total_supply: String,
}

/// One tranche's snapshot state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrancheData {
    /// Tranche token contract address
    pub id: String,
    /// Position in the seniority order (0 = most senior)
    pub index: String,
    /// Proportional claim out of [`TRANCHE_RATIO_GRANULARITY`](crate::TRANCHE_RATIO_GRANULARITY)
    pub ratio: String,
    pub total_collateral: String,
    pub total_collateral_at_maturity: Option<String>,
    pub total_supply_at_maturity: Option<String>,
    pub token: TokenData,
}

/// A bond's snapshot state, including all of its tranches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondData {
    /// Bond contract address
    pub id: String,
    pub start_date: String,
    pub maturity_date: String,
    pub matured_date: Option<String>,
    pub collateral: TokenData,
    pub tranches: Vec<TrancheData>,
    pub is_mature: bool,
    pub total_debt: String,
    pub total_debt_at_maturity: Option<String>,
    pub total_collateral: String,
    pub total_collateral_at_maturity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_limit: Option<String>,
}

pub(crate) fn parse_amount(field: &str, raw: &str) -> Result<BigUint> {
    BigUint::from_str(raw).map_err(|_| {
        Error::invalid_structure(format!("{field}: not a base-unit integer: {raw:?}"))
    })
}

/// Absent maturity fields read as zero.
pub(crate) fn parse_opt_amount(field: &str, raw: Option<&String>) -> Result<BigUint> {
    match raw {
        Some(raw) => parse_amount(field, raw),
        None => Ok(BigUint::zero()),
    }
}

pub(crate) fn parse_int<T: FromStr>(field: &str, raw: &str) -> Result<T> {
    raw.parse::<T>()
        .map_err(|_| Error::invalid_structure(format!("{field}: not an integer: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(
            parse_amount("totalDebt", "30000000").unwrap(),
            BigUint::from(30_000_000u64)
        );
        assert!(parse_amount("totalDebt", "12.5").is_err());
        assert!(parse_amount("totalDebt", "").is_err());
    }

    #[test]
    fn test_parse_opt_amount_none_is_zero() {
        assert!(parse_opt_amount("totalDebtAtMaturity", None)
            .unwrap()
            .is_zero());
    }

    #[test]
    fn test_bond_data_deserializes_indexer_json() {
        let json = r#"{
            "id": "0xb0nd",
            "startDate": "1700000000",
            "maturityDate": "1731536000",
            "maturedDate": null,
            "collateral": {
                "id": "0xc011",
                "symbol": "AMPL",
                "name": "Ampleforth",
                "decimals": "9",
                "totalSupply": "50000000000000000"
            },
            "tranches": [],
            "isMature": false,
            "totalDebt": "30000000",
            "totalDebtAtMaturity": null,
            "totalCollateral": "30000000",
            "totalCollateralAtMaturity": null
        }"#;
        let data: BondData = serde_json::from_str(json).unwrap();
        assert_eq!(data.id, "0xb0nd");
        assert_eq!(data.total_debt, "30000000");
        assert!(data.deposit_limit.is_none());
        assert!(!data.is_mature);
    }
}
