use serde::{Deserialize, Serialize};

use super::{Cents, WalletId};

pub type TransactionId = i64;

/// Direction of a ledger entry. Stored and marshalled as an integer
/// code: income rows are 0, expense rows are 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money entering the wallet
    Income,
    /// Money leaving the wallet
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }

    /// Integer code used in the database and across the boundary.
    pub fn code(&self) -> i64 {
        match self {
            TransactionKind::Income => 0,
            TransactionKind::Expense => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(TransactionKind::Income),
            1 => Some(TransactionKind::Expense),
            _ => None,
        }
    }

    /// Sign of this kind's contribution to a wallet balance.
    pub fn sign(&self) -> i64 {
        match self {
            TransactionKind::Income => 1,
            TransactionKind::Expense => -1,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single income or expense entry posted against exactly one wallet.
/// The amount is a strictly positive magnitude; direction comes from the
/// kind. A transaction can change in place, but never moves to another
/// wallet and never outlives the wallet that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub wallet_id: WalletId,
    pub amount: Cents,
    pub kind: TransactionKind,
    pub description: String,
    /// Caller-supplied display timestamp ("YYYY-MM-DD HH:MM:SS" by
    /// convention). Used only for ordering; backdating is legal.
    pub transaction_date: String,
}

impl Transaction {
    /// Signed contribution of this entry to its wallet's balance.
    /// None when the product leaves the i64 range.
    pub fn signed_amount(&self) -> Option<Cents> {
        self.amount.checked_mul(self.kind.sign())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_string_roundtrip() {
        for kind in [TransactionKind::Income, TransactionKind::Expense] {
            assert_eq!(TransactionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(TransactionKind::parse("INCOME"), Some(TransactionKind::Income));
        assert_eq!(TransactionKind::parse("transfer"), None);
    }

    #[test]
    fn test_kind_code_roundtrip() {
        assert_eq!(TransactionKind::Income.code(), 0);
        assert_eq!(TransactionKind::Expense.code(), 1);
        for kind in [TransactionKind::Income, TransactionKind::Expense] {
            assert_eq!(TransactionKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(TransactionKind::from_code(2), None);
    }

    #[test]
    fn test_signed_amount() {
        let entry = Transaction {
            id: 1,
            wallet_id: 1,
            amount: 4000,
            kind: TransactionKind::Expense,
            description: String::new(),
            transaction_date: "2025-01-01 00:00:00".into(),
        };
        assert_eq!(entry.signed_amount(), Some(-4000));

        let entry = Transaction {
            kind: TransactionKind::Income,
            ..entry
        };
        assert_eq!(entry.signed_amount(), Some(4000));
    }
}
