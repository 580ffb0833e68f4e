use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::block::Block;
use crate::config::{ChainConfig, MiningOrder};
use crate::constants::{GENESIS_DATA, GENESIS_PREVIOUS_HASH};
use crate::encoding::{abbreviate, unix_timestamp};
use crate::error::{LedgerError, Result};
use crate::payload::Payload;
use crate::pow::MiningReport;
use crate::validate;

/// Index 0, sentinel previous hash `"0"`, nonce 0.
pub fn genesis_block<D: Payload>(data: D, timestamp: u64) -> Block<D> {
    Block::new(0, timestamp, data, GENESIS_PREVIOUS_HASH, 0)
}

/// In-memory, single-writer sequence of blocks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chain<D> {
    blocks: Vec<Block<D>>,
}

impl<D: Payload + From<&'static str>> Chain<D> {
    /// A chain holding only a genesis block marked `"Genesis Block"`.
    pub fn new() -> Self {
        Self::with_genesis(D::from(GENESIS_DATA))
    }
}

impl<D: Payload + From<&'static str>> Default for Chain<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Payload> Chain<D> {
    pub fn with_genesis(data: D) -> Self {
        let genesis = genesis_block(data, unix_timestamp());
        debug!("created genesis block {}", abbreviate(&genesis.hash));
        Self {
            blocks: vec![genesis],
        }
    }

    /// Adopts `blocks` as they are. Nothing is checked; use [`Chain::verify`].
    pub fn from_blocks(blocks: Vec<Block<D>>) -> Self {
        Self { blocks }
    }

    pub fn latest(&self) -> Result<&Block<D>> {
        self.blocks.last().ok_or(LedgerError::EmptyChain)
    }

    /// Links `block` to the current tip, rehashes it and stores it. Whatever
    /// `previous_hash` and `hash` the caller set beforehand are overwritten.
    pub fn append(&mut self, mut block: Block<D>) -> Result<&Block<D>> {
        block.previous_hash = self.latest()?.hash.clone();
        block.rehash();
        Ok(self.push(block))
    }

    /// Mines `block` and appends it, in the order `config.order` names.
    ///
    /// With [`MiningOrder::MineThenLink`] the report describes work that
    /// `append` then discards: the stored hash is rehashed against the tip
    /// and need not meet the difficulty.
    pub fn mine_and_append(
        &mut self,
        mut block: Block<D>,
        config: &ChainConfig,
    ) -> Result<MiningReport>
    where
        D: Sync,
    {
        match config.order {
            MiningOrder::MineThenLink => {
                let report = config.mine(&mut block)?;
                self.append(block)?;
                Ok(report)
            }
            MiningOrder::LinkThenMine => {
                block.previous_hash = self.latest()?.hash.clone();
                block.rehash();
                let report = config.mine(&mut block)?;
                self.push(block);
                Ok(report)
            }
        }
    }

    fn push(&mut self, block: Block<D>) -> &Block<D> {
        debug!(
            "appending block {} at height {} linked to {}: {}",
            block.index,
            self.blocks.len(),
            abbreviate(&block.previous_hash),
            abbreviate(&block.hash)
        );
        self.blocks.push(block);
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn validate(&self) -> bool {
        self.verify().is_ok()
    }

    /// Like [`Chain::validate`], but names the first broken position.
    pub fn verify(&self) -> Result<()> {
        match validate::find_fault(&self.blocks) {
            None => Ok(()),
            Some(fault) => {
                warn!("chain validation failed: {fault}");
                Err(LedgerError::InvalidChain(fault))
            }
        }
    }

    /// Relinks and rehashes every block from `position` to the tip, the
    /// forward rewrite needed to make an edited chain validate again.
    /// Proof-of-work is not redone. Returns how many blocks were rewritten.
    pub fn reseal_from(&mut self, position: usize) -> usize {
        let len = self.blocks.len();
        for i in position..len {
            if i > 0 {
                let previous = self.blocks[i - 1].hash.clone();
                self.blocks[i].previous_hash = previous;
            }
            self.blocks[i].rehash();
            debug!("resealed block at position {i}: {}", abbreviate(&self.blocks[i].hash));
        }
        len.saturating_sub(position)
    }

    pub fn get(&self, position: usize) -> Option<&Block<D>> {
        self.blocks.get(position)
    }

    /// Direct access to a stored block. Edits made through this are
    /// out-of-band and show up as validation faults.
    pub fn get_mut(&mut self, position: usize) -> Option<&mut Block<D>> {
        self.blocks.get_mut(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block<D>> {
        self.blocks.iter()
    }

    pub fn blocks(&self) -> &[Block<D>] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block<D>> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl<'a, D> IntoIterator for &'a Chain<D> {
    type Item = &'a Block<D>;
    type IntoIter = std::slice::Iter<'a, Block<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
