//! Sale Plans and Borrow Results

use bulwark_core::{Token, TokenAmount};
use num_bigint::BigUint;
use num_traits::Zero;

/// One leg of a sale plan, per tranche in seniority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sale {
    /// Sell exactly this many tranche tokens.
    Amount(TokenAmount),
    /// Sell the entire minted balance of this tranche; the settlement
    /// contract substitutes the realized amount.
    SellAll(Token),
}

impl Sale {
    pub fn token(&self) -> &Token {
        match self {
            Self::Amount(amount) => &amount.token,
            Self::SellAll(token) => token,
        }
    }

    /// The literal sale size, when one exists.
    pub fn amount(&self) -> Option<&BigUint> {
        match self {
            Self::Amount(amount) => Some(&amount.amount),
            Self::SellAll(_) => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Amount(amount) => amount.amount.is_zero(),
            Self::SellAll(_) => false,
        }
    }
}

/// Options for [`LoanManager::sales`](crate::LoanManager::sales).
#[derive(Debug, Clone, Copy, Default)]
pub struct SalesOptions {
    /// Shape the plan for on-chain settlement: full liquidations become
    /// [`Sale::SellAll`] markers instead of literal amounts.
    pub contract_input: bool,
}

/// What the borrower walks away with after a deposit-and-sell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowOutput {
    /// Unsold tranche tokens, per tranche in seniority order.
    pub tranche_tokens: Vec<TokenAmount>,
    /// Total currency proceeds of the sales.
    pub currency_output: TokenAmount,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_views() {
        let token = Token::new(1, "0xa", 9);
        let sale = Sale::Amount(TokenAmount::new(token.clone(), 5u64));
        assert_eq!(sale.amount(), Some(&BigUint::from(5u64)));
        assert!(!sale.is_zero());

        let all = Sale::SellAll(token.clone());
        assert_eq!(all.token(), &token);
        assert_eq!(all.amount(), None);
        assert!(!all.is_zero());

        assert!(Sale::Amount(TokenAmount::zero(token)).is_zero());
    }
}
