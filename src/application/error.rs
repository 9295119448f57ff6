use thiserror::Error;

use crate::domain::{Cents, TransactionId, WalletId};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Wallet name must not be empty")]
    InvalidName,

    #[error("Wallet name already taken: {0}")]
    DuplicateName(String),

    #[error("Transaction amount must be positive, got {0}")]
    InvalidAmount(Cents),

    #[error("Wallet not found: {0}")]
    WalletNotFound(WalletId),

    #[error("Transaction {id} not found in wallet {wallet_id}")]
    TransactionNotFound {
        id: TransactionId,
        wallet_id: WalletId,
    },

    #[error("Balance overflow while reconciling wallet {0}")]
    BalanceOverflow(WalletId),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl LedgerError {
    /// True for caller errors (malformed input, unknown ids) that left
    /// the ledger untouched, as opposed to storage faults.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, LedgerError::Storage(_))
    }
}
