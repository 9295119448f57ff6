use super::{Cents, Transaction};

/// The signed sum of a wallet's transactions left the representable
/// i64 range. The stored balance must never carry a wrapped value, so
/// the triggering operation fails instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceOverflow;

impl std::fmt::Display for BalanceOverflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "balance arithmetic overflowed the i64 range")
    }
}

impl std::error::Error for BalanceOverflow {}

/// Re-derive a wallet balance from its full transaction set.
///
/// Full re-summation on every call, never incremental deltas: recomputing
/// twice from the same rows yields the same result, so the stored balance
/// cannot drift from the transaction history.
pub fn sum_signed(transactions: &[Transaction]) -> Result<Cents, BalanceOverflow> {
    transactions.iter().try_fold(0_i64, |acc, entry| {
        let signed = entry.signed_amount().ok_or(BalanceOverflow)?;
        acc.checked_add(signed).ok_or(BalanceOverflow)
    })
}

#[cfg(test)]
mod tests {
    use super::super::TransactionKind;
    use super::*;

    fn entry(amount: Cents, kind: TransactionKind) -> Transaction {
        Transaction {
            id: 0,
            wallet_id: 1,
            amount,
            kind,
            description: String::new(),
            transaction_date: "2025-01-01 00:00:00".into(),
        }
    }

    #[test]
    fn test_sum_empty() {
        assert_eq!(sum_signed(&[]), Ok(0));
    }

    #[test]
    fn test_sum_mixed() {
        let entries = vec![
            entry(10000, TransactionKind::Income),
            entry(4000, TransactionKind::Expense),
            entry(500, TransactionKind::Expense),
        ];
        assert_eq!(sum_signed(&entries), Ok(5500));
    }

    #[test]
    fn test_sum_can_go_negative() {
        let entries = vec![
            entry(1000, TransactionKind::Income),
            entry(2500, TransactionKind::Expense),
        ];
        assert_eq!(sum_signed(&entries), Ok(-1500));
    }

    #[test]
    fn test_sum_is_idempotent() {
        let entries = vec![
            entry(123, TransactionKind::Income),
            entry(45, TransactionKind::Expense),
        ];
        assert_eq!(sum_signed(&entries), sum_signed(&entries));
    }

    #[test]
    fn test_sum_overflow_is_an_error() {
        let entries = vec![
            entry(i64::MAX, TransactionKind::Income),
            entry(1, TransactionKind::Income),
        ];
        assert_eq!(sum_signed(&entries), Err(BalanceOverflow));
    }

    #[test]
    fn test_sum_underflow_is_an_error() {
        let entries = vec![
            entry(i64::MAX, TransactionKind::Expense),
            entry(i64::MAX, TransactionKind::Expense),
        ];
        assert_eq!(sum_signed(&entries), Err(BalanceOverflow));
    }
}
