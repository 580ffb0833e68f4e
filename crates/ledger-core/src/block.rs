use serde::{Deserialize, Serialize};
use std::fmt;

use crate::encoding::{block_digest, unix_timestamp};
use crate::payload::Payload;

/// One ledger entry.
///
/// Fields are public on purpose: an edit made after the block was stored is
/// not prevented here, it is caught by [`crate::validate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block<D> {
    pub index: u64,
    pub timestamp: u64,
    pub data: D,
    pub previous_hash: String,
    pub nonce: u64,
    pub hash: String,
}

impl<D: Payload> Block<D> {
    /// Builds a block and computes its initial hash.
    pub fn new(
        index: u64,
        timestamp: u64,
        data: D,
        previous_hash: impl Into<String>,
        nonce: u64,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            data,
            previous_hash: previous_hash.into(),
            nonce,
            hash: String::new(),
        };
        block.hash = block.recompute_hash();
        block
    }

    /// A block stamped with the current time, nonce 0 and an empty
    /// placeholder link that `Chain::append` will overwrite.
    pub fn unlinked(index: u64, data: D) -> Self {
        Self::new(index, unix_timestamp(), data, "", 0)
    }

    /// Digest of the current field values. Does not touch `self.hash`.
    pub fn recompute_hash(&self) -> String {
        block_digest(
            self.index,
            self.timestamp,
            &self.data,
            &self.previous_hash,
            self.nonce,
        )
    }

    /// Stores the digest of the current field values.
    pub fn rehash(&mut self) {
        self.hash = self.recompute_hash();
    }

    pub fn is_self_consistent(&self) -> bool {
        self.hash == self.recompute_hash()
    }
}

impl<D: Payload> fmt::Display for Block<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Index: {}", self.index)?;
        writeln!(f, "Timestamp: {}", self.timestamp)?;
        writeln!(f, "Data: {}", self.data.canonical())?;
        writeln!(f, "Nonce: {}", self.nonce)?;
        writeln!(f, "Previous Hash: {}", self.previous_hash)?;
        write!(f, "Hash: {}", self.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Transfer;
    use serde_json::json;

    const TS: u64 = 1_600_000_000;

    #[test]
    fn block_hash_example() {
        let block = Block::new(1, TS, "Transaction Data 1", "0", 0);
        assert_eq!(
            block.hash,
            "240c510add38db1fd443dbd518379bc3b11bedddf3653d6392f1d0c92ae28b06"
        );
    }

    #[test]
    fn genesis_shaped_block_hash() {
        let block = Block::new(0, TS, "Genesis Block", "0", 0);
        assert_eq!(
            block.hash,
            "e6ee3b432c76339ec37f561cac46fcee76c650ea0b29183177a4f967de9f85a5"
        );
    }

    #[test]
    fn constructed_block_is_self_consistent() {
        let block = Block::new(7, TS, Transfer::new(10, "Alice", "Bob"), "abc", 3);
        assert!(block.is_self_consistent());
        assert_eq!(block.nonce, 3);
    }

    #[test]
    fn recompute_does_not_assign() {
        let mut block = Block::new(1, TS, json!({"amount": 10}), "0", 0);
        let before = block.hash.clone();
        block.nonce += 1;
        let fresh = block.recompute_hash();
        assert_ne!(fresh, before);
        assert_eq!(block.hash, before);
        assert!(!block.is_self_consistent());
        block.rehash();
        assert_eq!(block.hash, fresh);
        assert!(block.is_self_consistent());
    }

    #[test]
    fn every_field_feeds_the_hash() {
        let base = Block::new(1, TS, "data".to_string(), "prev", 0);
        let mut edits: Vec<Block<String>> = vec![base.clone(); 5];
        edits[0].index = 2;
        edits[1].timestamp += 1;
        edits[2].data.push('!');
        edits[3].previous_hash.push('x');
        edits[4].nonce = 1;
        for edited in &edits {
            assert_ne!(edited.recompute_hash(), base.hash);
            assert!(!edited.is_self_consistent());
        }
    }

    #[test]
    fn unlinked_block_has_placeholder_link() {
        let block = Block::unlinked(4, "pending");
        assert_eq!(block.previous_hash, "");
        assert_eq!(block.nonce, 0);
        assert!(block.timestamp > 0);
        assert!(block.is_self_consistent());
    }

    #[test]
    fn display_lists_fields() {
        let block = Block::new(2, TS, "x", "0", 9);
        let text = block.to_string();
        assert!(text.starts_with("Index: 2\n"));
        assert!(text.contains("Nonce: 9"));
        assert!(text.ends_with(&block.hash));
    }

    #[test]
    fn block_serialization_example() {
        let block = Block::new(1, TS, Transfer::new(10, "Alice", "Bob"), "0", 0);
        let json = serde_json::to_string(&block).unwrap();
        let back: Block<Transfer> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);
        assert!(back.is_self_consistent());
    }
}
