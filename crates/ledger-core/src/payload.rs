//! Block payloads and their canonical string form.
//!
//! The ledger treats `data` as opaque: all it needs is a deterministic
//! string rendering to feed into the block preimage.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;

/// A value that can be stored in a block.
///
/// `canonical` must return the same text for equal values on every call,
/// otherwise stored hashes stop matching their blocks.
pub trait Payload {
    fn canonical(&self) -> Cow<'_, str>;
}

impl Payload for str {
    fn canonical(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Payload for String {
    fn canonical(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl<T: Payload + ?Sized> Payload for &T {
    fn canonical(&self) -> Cow<'_, str> {
        (**self).canonical()
    }
}

macro_rules! display_payload {
    ($($t:ty),* $(,)?) => {
        $(
            impl Payload for $t {
                fn canonical(&self) -> Cow<'_, str> {
                    Cow::Owned(self.to_string())
                }
            }
        )*
    };
}

display_payload!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool);

/// JSON values render compactly with object keys in sorted order.
impl Payload for Value {
    fn canonical(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

/// A value transfer between two named parties.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub amount: u64,
    pub to: String,
    pub from: String,
}

impl Transfer {
    pub fn new(amount: u64, to: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            amount,
            to: to.into(),
            from: from.into(),
        }
    }
}

impl Payload for Transfer {
    fn canonical(&self) -> Cow<'_, str> {
        Cow::Owned(
            json!({
                "amount": self.amount,
                "to": self.to,
                "from": self.from,
            })
            .to_string(),
        )
    }
}

impl From<Transfer> for Value {
    fn from(t: Transfer) -> Self {
        json!({ "amount": t.amount, "to": t.to, "from": t.from })
    }
}
