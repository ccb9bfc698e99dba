//! Swap Venue Abstraction

use async_trait::async_trait;
use bulwark_core::{Error, Ratio, Result, Token, TokenAmount};

/// A two-token trading venue that can quote swaps in both directions.
///
/// The planner awaits quotes strictly sequentially, since every decision
/// depends on the output of the previous one. Quote failures propagate
/// unchanged and abort the plan; nothing is retried.
#[async_trait]
pub trait SwapVenue: Send + Sync {
    fn token0(&self) -> &Token;

    fn token1(&self) -> &Token;

    /// Price of `base` denominated in the pair's other token.
    fn spot_price(&self, base: &Token) -> Result<Ratio>;

    /// Output received for swapping `input` in.
    async fn quote_output(&self, input: &TokenAmount) -> Result<TokenAmount>;

    /// Input required to receive at least `desired_output`.
    async fn quote_input(&self, desired_output: &TokenAmount) -> Result<TokenAmount>;

    fn contains(&self, token: &Token) -> bool {
        self.token0() == token || self.token1() == token
    }

    /// The pair's other token.
    fn counterpart(&self, token: &Token) -> Result<&Token> {
        if token == self.token0() {
            Ok(self.token1())
        } else if token == self.token1() {
            Ok(self.token0())
        } else {
            Err(Error::invalid_input(format!(
                "token {token} is not part of this venue"
            )))
        }
    }
}
