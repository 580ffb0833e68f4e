//! Tamper detection by re-deriving hashes.
//!
//! A chain is either valid or not; [`find_fault`] only reports where the
//! first break is so callers can show it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::block::Block;
use crate::payload::Payload;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Stored hash differs from the hash of the block's current fields.
    SelfConsistency,
    /// Stored previous hash differs from the predecessor's stored hash.
    LinkConsistency,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fault {
    pub position: usize,
    pub kind: FaultKind,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FaultKind::SelfConsistency => {
                write!(f, "block {} hash does not match its contents", self.position)
            }
            FaultKind::LinkConsistency => write!(
                f,
                "block {} previous hash does not match block {}",
                self.position,
                self.position.saturating_sub(1)
            ),
        }
    }
}

pub fn check_self_consistency<D: Payload>(block: &Block<D>) -> bool {
    block.is_self_consistent()
}

pub fn check_link_consistency<D>(block: &Block<D>, previous: &Block<D>) -> bool {
    block.previous_hash == previous.hash
}

/// First position, in chain order, where either invariant fails.
///
/// Every block including genesis is checked for self-consistency, before its
/// link to the predecessor.
pub fn find_fault<D: Payload>(blocks: &[Block<D>]) -> Option<Fault> {
    for (position, block) in blocks.iter().enumerate() {
        if !check_self_consistency(block) {
            return Some(Fault {
                position,
                kind: FaultKind::SelfConsistency,
            });
        }
        if position > 0 && !check_link_consistency(block, &blocks[position - 1]) {
            return Some(Fault {
                position,
                kind: FaultKind::LinkConsistency,
            });
        }
    }
    None
}

pub fn is_valid<D: Payload>(blocks: &[Block<D>]) -> bool {
    find_fault(blocks).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked(n: u64) -> Vec<Block<String>> {
        let mut blocks: Vec<Block<String>> = Vec::new();
        for i in 0..n {
            let prev = blocks.last().map_or("0".to_string(), |b| b.hash.clone());
            blocks.push(Block::new(i, 1_600_000_000 + i, format!("entry {i}"), prev, 0));
        }
        blocks
    }

    #[test]
    fn empty_and_single_are_valid() {
        assert!(is_valid::<String>(&[]));
        assert!(is_valid(&linked(1)));
    }

    #[test]
    fn linked_sequence_is_valid() {
        assert_eq!(find_fault(&linked(5)), None);
    }

    #[test]
    fn data_edit_breaks_self_consistency() {
        let mut blocks = linked(4);
        blocks[2].data = "forged".into();
        assert_eq!(
            find_fault(&blocks),
            Some(Fault {
                position: 2,
                kind: FaultKind::SelfConsistency
            })
        );
    }

    #[test]
    fn rehash_moves_fault_to_next_link() {
        let mut blocks = linked(4);
        blocks[1].data = "forged".into();
        blocks[1].rehash();
        assert!(check_self_consistency(&blocks[1]));
        assert!(!check_link_consistency(&blocks[2], &blocks[1]));
        assert_eq!(
            find_fault(&blocks),
            Some(Fault {
                position: 2,
                kind: FaultKind::LinkConsistency
            })
        );
    }

    #[test]
    fn genesis_edit_is_detected() {
        let mut blocks = linked(3);
        blocks[0].timestamp += 1;
        assert_eq!(
            find_fault(&blocks),
            Some(Fault {
                position: 0,
                kind: FaultKind::SelfConsistency
            })
        );
    }

    #[test]
    fn fault_display() {
        let f = Fault {
            position: 2,
            kind: FaultKind::LinkConsistency,
        };
        assert_eq!(f.to_string(), "block 2 previous hash does not match block 1");
    }
}
