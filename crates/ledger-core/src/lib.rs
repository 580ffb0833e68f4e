//! Hash-linked ledger core: blocks chained by digest, a proof-of-work nonce
//! search, and validation that re-derives hashes to expose tampering.

pub mod block;
pub mod chain;
pub mod config;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod payload;
pub mod pow;
pub mod validate;

pub use block::Block;
pub use chain::{genesis_block, Chain};
pub use config::{ChainConfig, MiningOrder};
pub use error::{LedgerError, Result};
pub use payload::{Payload, Transfer};
pub use pow::{mine, mine_parallel, Difficulty, MiningReport};
pub use validate::{check_link_consistency, check_self_consistency, Fault, FaultKind};
