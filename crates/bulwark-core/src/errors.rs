//! Error types for Bulwark

use num_bigint::BigUint;
use thiserror::Error;

/// Errors raised by bond accounting and sale sequencing.
///
/// Every failure is terminal for the call that raised it: entities are
/// immutable snapshots, so there is never partial state to unwind, and
/// nothing is retried internally.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid structure: {message}")]
    InvalidStructure { message: String },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("deposit limit exceeded: limit {limit}, attempted {attempted}")]
    LimitExceeded { limit: BigUint, attempted: BigUint },

    #[error("insufficient collateral: required {required}, available {available}")]
    InsufficientCollateral {
        required: BigUint,
        available: BigUint,
    },

    #[error("insufficient deposit: desired output {desired}, reachable {reachable}")]
    InsufficientDeposit { desired: BigUint, reachable: BigUint },

    #[error("bond is not mature")]
    NotMature,

    #[error("no liquidity: aggregate sale produced zero output")]
    NoLiquidity,

    #[error("venue error: {message}")]
    Venue { message: String },
}

impl Error {
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn venue(message: impl Into<String>) -> Self {
        Self::Venue {
            message: message.into(),
        }
    }

    /// Get a stable, machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidStructure { .. } => "invalid_structure",
            Self::InvalidInput { .. } => "invalid_input",
            Self::LimitExceeded { .. } => "limit_exceeded",
            Self::InsufficientCollateral { .. } => "insufficient_collateral",
            Self::InsufficientDeposit { .. } => "insufficient_deposit",
            Self::NotMature => "not_mature",
            Self::NoLiquidity => "no_liquidity",
            Self::Venue { .. } => "venue_error",
        }
    }
}

/// Result type alias for Bulwark operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = Error::invalid_input("wrong currency");
        assert_eq!(err.error_code(), "invalid_input");

        let err = Error::LimitExceeded {
            limit: BigUint::from(100u32),
            attempted: BigUint::from(150u32),
        };
        assert_eq!(err.error_code(), "limit_exceeded");
        assert_eq!(
            err.to_string(),
            "deposit limit exceeded: limit 100, attempted 150"
        );
    }
}
