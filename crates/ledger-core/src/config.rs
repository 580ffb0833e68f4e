use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::block::Block;
use crate::error::Result;
use crate::payload::Payload;
use crate::pow::{self, Difficulty, MiningReport};

/// When proof-of-work runs relative to linking a block onto the tip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MiningOrder {
    /// Mine against whatever `previous_hash` the block carries, then let
    /// `append` relink and rehash it. The proof does not survive the append.
    MineThenLink,
    /// Link to the tip first, then mine. The stored hash meets the difficulty.
    #[default]
    LinkThenMine,
}

impl fmt::Display for MiningOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MiningOrder::MineThenLink => "mine-then-link",
            MiningOrder::LinkThenMine => "link-then-mine",
        })
    }
}

impl FromStr for MiningOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "mine-then-link" => Ok(MiningOrder::MineThenLink),
            "link-then-mine" => Ok(MiningOrder::LinkThenMine),
            other => Err(format!(
                "unknown mining order '{other}', expected mine-then-link or link-then-mine"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub difficulty: Difficulty,
    pub order: MiningOrder,
    /// Spread the nonce search over the rayon pool.
    pub parallel: bool,
}

impl ChainConfig {
    pub fn mine<D: Payload + Sync>(&self, block: &mut Block<D>) -> Result<MiningReport> {
        if self.parallel {
            pow::mine_parallel(block, self.difficulty)
        } else {
            pow::mine(block, self.difficulty)
        }
    }
}
