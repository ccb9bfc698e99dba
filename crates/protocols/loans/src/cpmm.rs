//! Constant Product Venue
//!
//! Reference [`SwapVenue`] over x * y = k reserves with a flat fee taken
//! on the input side. Quotes are big-integer floor division, with the
//! inverse quote rounded up so the quoted input always clears the
//! requested output.

use crate::venue::SwapVenue;
use async_trait::async_trait;
use bulwark_core::{Error, Ratio, Result, Token, TokenAmount};
use num_bigint::BigUint;
use num_traits::{One, Zero};

#[derive(Debug, Clone)]
pub struct ConstantProductVenue {
    token0: Token,
    token1: Token,
    reserves0: BigUint,
    reserves1: BigUint,
    fee_num: u32,
    fee_denom: u32,
}

impl ConstantProductVenue {
    /// A pool snapshot over two distinct tokens. `fee_num / fee_denom` is
    /// the fraction of the input that trades (e.g. 997/1000 for a 0.3% fee).
    pub fn new(
        reserves0: TokenAmount,
        reserves1: TokenAmount,
        fee_num: u32,
        fee_denom: u32,
    ) -> Result<Self> {
        if reserves0.token == reserves1.token {
            return Err(Error::invalid_structure(
                "venue pair must hold two distinct tokens",
            ));
        }
        if fee_denom == 0 || fee_num == 0 || fee_num > fee_denom {
            return Err(Error::invalid_structure(format!(
                "invalid fee fraction {fee_num}/{fee_denom}"
            )));
        }

        Ok(Self {
            token0: reserves0.token,
            token1: reserves1.token,
            reserves0: reserves0.amount,
            reserves1: reserves1.amount,
            fee_num,
            fee_denom,
        })
    }

    /// Reserves oriented for a swap that sells `input_token`:
    /// `(reserves_in, reserves_out, output_token)`.
    fn orient(&self, input_token: &Token) -> Result<(&BigUint, &BigUint, &Token)> {
        if input_token == &self.token0 {
            Ok((&self.reserves0, &self.reserves1, &self.token1))
        } else if input_token == &self.token1 {
            Ok((&self.reserves1, &self.reserves0, &self.token0))
        } else {
            Err(Error::invalid_input(format!(
                "token {input_token} is not part of this venue"
            )))
        }
    }
}

#[async_trait]
impl SwapVenue for ConstantProductVenue {
    fn token0(&self) -> &Token {
        &self.token0
    }

    fn token1(&self) -> &Token {
        &self.token1
    }

    fn spot_price(&self, base: &Token) -> Result<Ratio> {
        let (reserves_in, reserves_out, _) = self.orient(base)?;
        if reserves_in.is_zero() || reserves_out.is_zero() {
            return Err(Error::NoLiquidity);
        }
        Ok(Ratio::new(reserves_out.clone(), reserves_in.clone()))
    }

    /// `(reserves_out * input * fee_num) / (reserves_in * fee_denom + input * fee_num)`
    async fn quote_output(&self, input: &TokenAmount) -> Result<TokenAmount> {
        let (reserves_in, reserves_out, out_token) = self.orient(&input.token)?;
        if reserves_in.is_zero() || reserves_out.is_zero() {
            return Err(Error::NoLiquidity);
        }
        if input.amount.is_zero() {
            return Ok(TokenAmount::zero(out_token.clone()));
        }

        let fee_num = BigUint::from(self.fee_num);
        let fee_denom = BigUint::from(self.fee_denom);
        let numerator = reserves_out * &input.amount * &fee_num;
        let denominator = reserves_in * &fee_denom + &input.amount * &fee_num;

        Ok(TokenAmount::new(out_token.clone(), numerator / denominator))
    }

    /// `(reserves_in * output * fee_denom) / ((reserves_out - output) * fee_num) + 1`
    async fn quote_input(&self, desired_output: &TokenAmount) -> Result<TokenAmount> {
        // orienting by the output token flips the reserve roles
        let (reserves_out, reserves_in, in_token) = self.orient(&desired_output.token)?;
        if reserves_in.is_zero() || reserves_out.is_zero() {
            return Err(Error::NoLiquidity);
        }
        if desired_output.amount.is_zero() {
            return Ok(TokenAmount::zero(in_token.clone()));
        }
        if &desired_output.amount >= reserves_out {
            return Err(Error::NoLiquidity);
        }

        let numerator =
            reserves_in * &desired_output.amount * BigUint::from(self.fee_denom);
        let denominator =
            (reserves_out - &desired_output.amount) * BigUint::from(self.fee_num);

        Ok(TokenAmount::new(
            in_token.clone(),
            numerator / denominator + BigUint::one(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tranche_token() -> Token {
        Token::new(1, "0xa11ce", 9).with_metadata("TRANCHE-A", "Tranche A")
    }

    fn currency_token() -> Token {
        Token::new(1, "0xc0ffee", 9).with_metadata("USDX", "USD Example")
    }

    fn pool(reserves0: u64, reserves1: u64, fee_num: u32, fee_denom: u32) -> ConstantProductVenue {
        ConstantProductVenue::new(
            TokenAmount::new(tranche_token(), reserves0),
            TokenAmount::new(currency_token(), reserves1),
            fee_num,
            fee_denom,
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_degenerate_pairs() {
        let same = ConstantProductVenue::new(
            TokenAmount::new(tranche_token(), 1u64),
            TokenAmount::new(tranche_token(), 1u64),
            1,
            1,
        );
        assert_eq!(same.unwrap_err().error_code(), "invalid_structure");

        let bad_fee = ConstantProductVenue::new(
            TokenAmount::new(tranche_token(), 1u64),
            TokenAmount::new(currency_token(), 1u64),
            1001,
            1000,
        );
        assert_eq!(bad_fee.unwrap_err().error_code(), "invalid_structure");
    }

    #[tokio::test]
    async fn test_quote_output_feeless_balanced_pool() {
        // equal reserves, no fee: selling the full reserve returns half
        let venue = pool(1_000, 1_000, 1, 1);
        let out = venue
            .quote_output(&TokenAmount::new(tranche_token(), 1_000u64))
            .await
            .unwrap();
        assert_eq!(out.token, currency_token());
        assert_eq!(out.amount, BigUint::from(500u64));
    }

    #[tokio::test]
    async fn test_quote_output_applies_fee() {
        let venue = pool(10_000, 10_000, 997, 1000);
        let out = venue
            .quote_output(&TokenAmount::new(tranche_token(), 10u64))
            .await
            .unwrap();
        // 10000 * 10 * 997 / (10000 * 1000 + 10 * 997) = 9 (floored)
        assert_eq!(out.amount, BigUint::from(9u64));
    }

    #[tokio::test]
    async fn test_quote_input_covers_requested_output() {
        let venue = pool(1_000_000, 1_000_000, 997, 1000);
        for desired in [1u64, 499, 12_345, 600_000] {
            let desired = TokenAmount::new(currency_token(), desired);
            let input = venue.quote_input(&desired).await.unwrap();
            assert_eq!(input.token, tranche_token());

            let realized = venue.quote_output(&input).await.unwrap();
            assert!(realized.amount >= desired.amount);
        }
    }

    #[tokio::test]
    async fn test_quote_input_exceeding_reserves() {
        let venue = pool(1_000, 1_000, 1, 1);
        let err = venue
            .quote_input(&TokenAmount::new(currency_token(), 1_000u64))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "no_liquidity");
    }

    #[tokio::test]
    async fn test_empty_pool_has_no_liquidity() {
        let venue = pool(0, 1_000, 1, 1);
        let err = venue
            .quote_output(&TokenAmount::new(tranche_token(), 10u64))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "no_liquidity");
    }

    #[tokio::test]
    async fn test_rejects_foreign_token() {
        let venue = pool(1_000, 1_000, 1, 1);
        let foreign = TokenAmount::new(Token::new(1, "0xdead", 9), 10u64);
        assert_eq!(
            venue.quote_output(&foreign).await.unwrap_err().error_code(),
            "invalid_input"
        );
    }

    #[test]
    fn test_spot_price() {
        let venue = pool(2_000, 1_000, 997, 1000);
        // one tranche token is worth half a currency token at the margin
        assert_eq!(
            venue.spot_price(&tranche_token()).unwrap(),
            Ratio::new(1, 2)
        );
        assert_eq!(
            venue.spot_price(&currency_token()).unwrap(),
            Ratio::new(2, 1)
        );
        assert!(venue.spot_price(&Token::new(1, "0xdead", 9)).is_err());
    }

    #[test]
    fn test_spot_price_empty_pool_is_no_liquidity() {
        let venue = pool(0, 1_000, 1, 1);
        assert_eq!(
            venue.spot_price(&tranche_token()).unwrap_err().error_code(),
            "no_liquidity"
        );
        assert_eq!(
            venue.spot_price(&currency_token()).unwrap_err().error_code(),
            "no_liquidity"
        );
    }
}
