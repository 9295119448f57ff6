use serde::{Deserialize, Serialize};

use super::Cents;

pub type WalletId = i64;

/// A named money pool. The id is assigned by the store on creation and
/// never reused. The balance is derived state: it always equals the
/// signed sum of the wallet's transactions and is only ever written by
/// reconciliation, never accepted as caller input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub name: String,
    pub description: String,
    pub balance: Cents,
}

impl Wallet {
    /// A wallet as it exists before its first transaction.
    pub fn new(id: WalletId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            balance: 0,
        }
    }
}
