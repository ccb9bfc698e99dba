//! Tranche Entity
//!
//! Immutable snapshot of one tranche's state: its token, seniority index,
//! ratio claim, and live/frozen accounting quantities.

use crate::state::{parse_amount, parse_int, parse_opt_amount, TrancheData};
use crate::waterfall;
use bulwark_core::{ChainId, Error, Result, Token, TokenAmount};
use num_bigint::BigUint;

#[derive(Debug, Clone)]
pub struct Tranche {
    token: Token,
    collateral: Token,
    index: u32,
    ratio: u32,
    total_collateral: BigUint,
    total_supply: BigUint,
    total_collateral_at_maturity: BigUint,
    total_supply_at_maturity: BigUint,
}

impl Tranche {
    pub fn from_data(data: &TrancheData, collateral: Token, chain_id: ChainId) -> Result<Self> {
        let decimals = parse_int::<u8>("tranche.token.decimals", &data.token.decimals)?;
        let token = Token::new(chain_id, data.id.clone(), decimals)
            .with_metadata(data.token.symbol.clone(), data.token.name.clone());

        Ok(Self {
            token,
            collateral,
            index: parse_int("tranche.index", &data.index)?,
            ratio: parse_int("tranche.ratio", &data.ratio)?,
            total_collateral: parse_amount("tranche.totalCollateral", &data.total_collateral)?,
            total_supply: parse_amount("tranche.token.totalSupply", &data.token.total_supply)?,
            total_collateral_at_maturity: parse_opt_amount(
                "tranche.totalCollateralAtMaturity",
                data.total_collateral_at_maturity.as_ref(),
            )?,
            total_supply_at_maturity: parse_opt_amount(
                "tranche.totalSupplyAtMaturity",
                data.total_supply_at_maturity.as_ref(),
            )?,
        })
    }

    /// Tranche token contract address.
    pub fn address(&self) -> &str {
        &self.token.address
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn collateral_token(&self) -> &Token {
        &self.collateral
    }

    /// Position in the seniority order; 0 is most senior.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Claim out of [`TRANCHE_RATIO_GRANULARITY`](crate::TRANCHE_RATIO_GRANULARITY).
    pub fn ratio(&self) -> u32 {
        self.ratio
    }

    pub fn decimals(&self) -> u8 {
        self.token.decimals
    }

    pub fn total_collateral(&self) -> &BigUint {
        &self.total_collateral
    }

    pub fn total_supply(&self) -> &BigUint {
        &self.total_supply
    }

    pub fn total_collateral_at_maturity(&self) -> &BigUint {
        &self.total_collateral_at_maturity
    }

    pub fn total_supply_at_maturity(&self) -> &BigUint {
        &self.total_supply_at_maturity
    }

    /// Collateral returned for redeeming `amount` tranche tokens against
    /// this tranche's live state: `total_collateral * amount / total_supply`,
    /// floored.
    pub fn redeem_value(&self, amount: &TokenAmount) -> Result<TokenAmount> {
        if amount.token != self.token {
            return Err(Error::invalid_input(format!(
                "amount currency {} is not tranche token {}",
                amount.token, self.token
            )));
        }

        let out =
            waterfall::proportional_share(&self.total_collateral, &amount.amount, &self.total_supply);
        Ok(TokenAmount::new(self.collateral.clone(), out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TokenData;

    fn tranche_data(collateral: u64, supply: u64) -> TrancheData {
        TrancheData {
            id: "0xa11ce".into(),
            index: "0".into(),
            ratio: "200".into(),
            total_collateral: collateral.to_string(),
            total_collateral_at_maturity: None,
            total_supply_at_maturity: None,
            token: TokenData {
                id: "0xa11ce".into(),
                symbol: "TRANCHE-A".into(),
                name: "Tranche A".into(),
                decimals: "9".into(),
                total_supply: supply.to_string(),
            },
        }
    }

    fn collateral_token() -> Token {
        Token::new(1, "0xc011", 9).with_metadata("AMPL", "Ampleforth")
    }

    #[test]
    fn test_from_data() {
        let tranche =
            Tranche::from_data(&tranche_data(1_000_000, 2_000_000), collateral_token(), 1).unwrap();
        assert_eq!(tranche.index(), 0);
        assert_eq!(tranche.ratio(), 200);
        assert_eq!(tranche.decimals(), 9);
        assert_eq!(tranche.total_collateral(), &BigUint::from(1_000_000u64));
        assert!(tranche.total_supply_at_maturity().eq(&BigUint::from(0u8)));
    }

    #[test]
    fn test_from_data_rejects_bad_integers() {
        let mut data = tranche_data(1, 1);
        data.total_collateral = "not-a-number".into();
        let err = Tranche::from_data(&data, collateral_token(), 1).unwrap_err();
        assert_eq!(err.error_code(), "invalid_structure");
    }

    #[test]
    fn test_redeem_value_proportional() {
        let tranche =
            Tranche::from_data(&tranche_data(1_000_000, 2_000_000), collateral_token(), 1).unwrap();
        let amount = TokenAmount::new(tranche.token().clone(), 500_000u64);
        let out = tranche.redeem_value(&amount).unwrap();
        assert_eq!(out.token, collateral_token());
        assert_eq!(out.amount, BigUint::from(250_000u64));
    }

    #[test]
    fn test_redeem_value_rejects_foreign_token() {
        let tranche =
            Tranche::from_data(&tranche_data(1_000_000, 1_000_000), collateral_token(), 1).unwrap();
        let foreign = TokenAmount::new(Token::new(1, "0xdead", 9), 1u64);
        let err = tranche.redeem_value(&foreign).unwrap_err();
        assert_eq!(err.error_code(), "invalid_input");
    }
}
