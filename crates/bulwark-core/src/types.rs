//! Core type definitions for Bulwark

use num_bigint::{BigInt, BigUint};
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Chain identifier (EVM-style numeric network id)
pub type ChainId = u64;

/// Token identity: network, contract address, and decimal precision.
///
/// Addresses are compared case-insensitively; `symbol` and `name` are
/// display metadata and take no part in equality or hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub chain_id: ChainId,
    pub address: String,
    pub decimals: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Token {
    pub fn new(chain_id: ChainId, address: impl Into<String>, decimals: u8) -> Self {
        Self {
            chain_id,
            address: address.into(),
            decimals,
            symbol: None,
            name: None,
        }
    }

    pub fn with_metadata(
        mut self,
        symbol: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.symbol = Some(symbol.into());
        self.name = Some(name.into());
        self
    }

    /// Case-insensitive address comparison, same-chain only.
    pub fn same_address(&self, address: &str) -> bool {
        self.address.eq_ignore_ascii_case(address)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address.eq_ignore_ascii_case(&other.address)
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.to_ascii_lowercase().hash(state);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "{} ({})", symbol, self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

/// A token paired with a non-negative quantity in the token's smallest unit.
///
/// All monetary arithmetic in the workspace operates on these base-unit
/// integers; human-scaled values are a display concern outside the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAmount {
    pub token: Token,
    pub amount: BigUint,
}

impl TokenAmount {
    pub fn new(token: Token, amount: impl Into<BigUint>) -> Self {
        Self {
            token,
            amount: amount.into(),
        }
    }

    pub fn zero(token: Token) -> Self {
        Self {
            token,
            amount: BigUint::zero(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token.symbol {
            Some(symbol) => write!(f, "{} {}", self.amount, symbol),
            None => write!(f, "{}", self.amount),
        }
    }
}

/// Exact signed rational, used for collateralization percentages, venue
/// prices, and discounts. Never reduced implicitly; never a float.
#[derive(Debug, Clone)]
pub struct Ratio {
    pub numer: BigInt,
    pub denom: BigInt,
}

impl Ratio {
    /// `denom` must be nonzero.
    pub fn new(numer: impl Into<BigInt>, denom: impl Into<BigInt>) -> Self {
        Self {
            numer: numer.into(),
            denom: denom.into(),
        }
    }

    pub fn zero() -> Self {
        Self {
            numer: BigInt::zero(),
            denom: BigInt::from(1),
        }
    }

    pub fn is_negative(&self) -> bool {
        (self.numer.sign() == num_bigint::Sign::Minus)
            != (self.denom.sign() == num_bigint::Sign::Minus)
            && !self.numer.is_zero()
    }

    /// Lossy conversion for display only.
    pub fn to_f64(&self) -> f64 {
        let numer = self.numer.to_f64().unwrap_or(f64::MAX);
        let denom = self.denom.to_f64().unwrap_or(f64::MAX);
        if denom == 0.0 {
            return 0.0;
        }
        numer / denom
    }
}

impl PartialEq for Ratio {
    fn eq(&self, other: &Self) -> bool {
        // cross-multiplication; valid for any nonzero denominators
        &self.numer * &other.denom == &other.numer * &self.denom
    }
}

impl Eq for Ratio {}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numer, self.denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_equality_ignores_case_and_metadata() {
        let a = Token::new(1, "0xAbCd", 18).with_metadata("TKN", "Token");
        let b = Token::new(1, "0xabcd", 18);
        assert_eq!(a, b);

        let other_chain = Token::new(5, "0xabcd", 18);
        assert_ne!(a, other_chain);
    }

    #[test]
    fn test_token_amount_zero() {
        let token = Token::new(1, "0x01", 9);
        let amount = TokenAmount::zero(token);
        assert!(amount.is_zero());
    }

    #[test]
    fn test_ratio_cross_equality() {
        assert_eq!(Ratio::new(20, 100), Ratio::new(1, 5));
        assert_ne!(Ratio::new(1, 3), Ratio::new(1, 4));
    }

    #[test]
    fn test_ratio_sign() {
        assert!(Ratio::new(-3, 100).is_negative());
        assert!(!Ratio::new(3, 100).is_negative());
        assert!(!Ratio::zero().is_negative());
    }

    #[test]
    fn test_ratio_to_f64() {
        assert!((Ratio::new(1, 4).to_f64() - 0.25).abs() < 1e-12);
    }
}
