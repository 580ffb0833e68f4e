use thiserror::Error;

use crate::validate::Fault;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// `latest()` was asked for on a chain holding no blocks.
    #[error("chain is empty")]
    EmptyChain,

    #[error("invalid difficulty {requested}: must be between 0 and {max}")]
    InvalidDifficulty { requested: i64, max: usize },

    #[error("nonce space exhausted while mining block {index}")]
    NonceSpaceExhausted { index: u64 },

    #[error("chain is invalid: {0}")]
    InvalidChain(Fault),
}
