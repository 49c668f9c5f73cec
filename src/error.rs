use thiserror::Error;

use crate::blockchain::pow::PowError;
use crate::network::FetchError;

/// Errors surfaced by the node core.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Malformed input at the boundary; never touches chain state.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("chain has no blocks")]
    EmptyChain,

    #[error("invalid chain: {0}")]
    InvalidChain(String),

    #[error("peer fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("proof of work failed: {0}")]
    Pow(#[from] PowError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, NodeError>;
