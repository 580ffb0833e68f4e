use ledger_core::{Block, Chain, Transfer};
use serde_json::{json, Value};

pub const TS: u64 = 1_600_000_000;

/// Genesis plus the two transfers from the tampering walkthrough.
pub fn walkthrough_chain() -> Chain<Value> {
    let mut chain: Chain<Value> = Chain::new();
    chain
        .append(Block::new(1, TS, json!({"amount": 10, "to": "Alice", "from": "Bob"}), "", 0))
        .expect("append block A");
    chain
        .append(Block::new(2, TS + 1, json!({"amount": 5, "to": "Charlie", "from": "Alice"}), "", 0))
        .expect("append block B");
    chain
}

pub fn transfer_chain(len: u64) -> Chain<Transfer> {
    let mut chain = Chain::with_genesis(Transfer::new(0, "genesis", "genesis"));
    for i in 1..len {
        let t = Transfer::new(i * 10, format!("user{}", i + 1), format!("user{i}"));
        chain
            .append(Block::new(i, TS + i, t, "", 0))
            .expect("append transfer");
    }
    chain
}
