//! Proof-of-work: search the nonce until the block digest starts with
//! `difficulty` hex zeros.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::block::Block;
use crate::constants::{DEFAULT_DIFFICULTY, HASH_HEX_SIZE};
use crate::encoding::{abbreviate, block_digest};
use crate::error::{LedgerError, Result};
use crate::payload::Payload;

/// Nonces handed to the thread pool per round of the parallel search.
const PARALLEL_BATCH: u64 = 1 << 14;

/// Required number of leading `'0'` characters in a hex digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Difficulty(usize);

impl Difficulty {
    pub const ZERO: Difficulty = Difficulty(0);

    pub fn new(zeros: usize) -> Result<Self> {
        if zeros > HASH_HEX_SIZE {
            return Err(LedgerError::InvalidDifficulty {
                requested: i64::try_from(zeros).unwrap_or(i64::MAX),
                max: HASH_HEX_SIZE,
            });
        }
        Ok(Self(zeros))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(DEFAULT_DIFFICULTY)
    }
}

impl TryFrom<i64> for Difficulty {
    type Error = LedgerError;

    fn try_from(value: i64) -> Result<Self> {
        usize::try_from(value)
            .ok()
            .filter(|zeros| *zeros <= HASH_HEX_SIZE)
            .map(Self)
            .ok_or(LedgerError::InvalidDifficulty {
                requested: value,
                max: HASH_HEX_SIZE,
            })
    }
}

impl From<Difficulty> for i64 {
    fn from(d: Difficulty) -> Self {
        d.0 as i64
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a finished search cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MiningReport {
    /// Hashes computed beyond the one the block already carried.
    pub attempts: u64,
    pub elapsed: Duration,
}

impl MiningReport {
    pub fn hash_rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.attempts as f64 / secs
    }
}

pub fn count_leading_zero_chars(hash: &str) -> usize {
    hash.bytes().take_while(|b| *b == b'0').count()
}

pub fn meets_difficulty(hash: &str, difficulty: Difficulty) -> bool {
    count_leading_zero_chars(hash) >= difficulty.get()
}

/// Increments `block.nonce` and rehashes until the stored hash meets
/// `difficulty`. The stored hash is checked first, so a block that already
/// qualifies costs zero attempts and is left untouched.
///
/// There is no attempt cap. The only failure is running out of nonces.
pub fn mine<D: Payload>(block: &mut Block<D>, difficulty: Difficulty) -> Result<MiningReport> {
    let start = Instant::now();
    let mut attempts = 0u64;

    while !meets_difficulty(&block.hash, difficulty) {
        block.nonce = block
            .nonce
            .checked_add(1)
            .ok_or(LedgerError::NonceSpaceExhausted { index: block.index })?;
        block.rehash();
        attempts += 1;
    }

    let report = MiningReport {
        attempts,
        elapsed: start.elapsed(),
    };
    info!(
        "Mined block {} at difficulty {} with nonce {} after {} attempts in {:?}: {}",
        block.index,
        difficulty,
        block.nonce,
        attempts,
        report.elapsed,
        abbreviate(&block.hash)
    );
    Ok(report)
}

/// Same contract as [`mine`], with each round of nonces spread over the rayon
/// pool.
///
/// Every round takes the lowest qualifying nonce, so the committed nonce and
/// hash are the ones the sequential search finds. `attempts` counts every
/// hash evaluated on any thread, so it can exceed the sequential count.
pub fn mine_parallel<D: Payload + Sync>(
    block: &mut Block<D>,
    difficulty: Difficulty,
) -> Result<MiningReport> {
    let start = Instant::now();

    if meets_difficulty(&block.hash, difficulty) {
        return Ok(MiningReport {
            attempts: 0,
            elapsed: start.elapsed(),
        });
    }

    let exhausted = LedgerError::NonceSpaceExhausted { index: block.index };
    let evaluated = AtomicU64::new(0);
    let mut lo = block.nonce.checked_add(1).ok_or(exhausted.clone())?;

    let found = {
        let template = &*block;
        loop {
            let hi = lo.saturating_add(PARALLEL_BATCH - 1);
            let hit = (lo..=hi).into_par_iter().find_first(|nonce| {
                evaluated.fetch_add(1, Ordering::Relaxed);
                let hash = block_digest(
                    template.index,
                    template.timestamp,
                    &template.data,
                    &template.previous_hash,
                    *nonce,
                );
                meets_difficulty(&hash, difficulty)
            });
            if let Some(nonce) = hit {
                break nonce;
            }
            debug!("no hit for block {} in nonces {}..={}", template.index, lo, hi);
            if hi == u64::MAX {
                return Err(exhausted);
            }
            lo = hi + 1;
        }
    };

    block.nonce = found;
    block.rehash();

    let report = MiningReport {
        attempts: evaluated.into_inner(),
        elapsed: start.elapsed(),
    };
    info!(
        "Mined block {} in parallel at difficulty {} with nonce {} after {} attempts in {:?}: {}",
        block.index,
        difficulty,
        block.nonce,
        report.attempts,
        report.elapsed,
        abbreviate(&block.hash)
    );
    Ok(report)
}
