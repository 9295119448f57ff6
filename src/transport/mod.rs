//! The boundary exposed to the presentation layer. Calls marshal plain
//! records in and out of the ledger service; results are boolean or
//! absence only. Callers needing diagnostics re-query state through the
//! read operations, so no error taxonomy crosses this line — every
//! swallowed failure is logged before it is flattened.

use serde::{Deserialize, Serialize};

use crate::application::{LedgerError, LedgerService};
use crate::domain::{Cents, Transaction, TransactionId, TransactionKind, Wallet, WalletId};

/// Wallet as seen across the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub id: WalletId,
    pub name: String,
    pub description: String,
    pub balance: Cents,
}

/// Transaction as seen across the boundary. `kind` carries the wire
/// encoding: 0 = income, 1 = expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub wallet_id: WalletId,
    pub amount: Cents,
    pub description: String,
    pub kind: i64,
    pub transaction_date: String,
}

impl From<Wallet> for WalletRecord {
    fn from(wallet: Wallet) -> Self {
        Self {
            id: wallet.id,
            name: wallet.name,
            description: wallet.description,
            balance: wallet.balance,
        }
    }
}

impl From<Transaction> for TransactionRecord {
    fn from(entry: Transaction) -> Self {
        Self {
            id: entry.id,
            wallet_id: entry.wallet_id,
            amount: entry.amount,
            description: entry.description,
            kind: entry.kind.code(),
            transaction_date: entry.transaction_date,
        }
    }
}

/// In-process handle for presentation-layer callers: a synchronous
/// request/response surface over the ledger service.
pub struct LedgerHandle {
    service: LedgerService,
}

impl LedgerHandle {
    /// Open or create the store at the given path. Idempotent for
    /// repeated opens of the same path within a process lifetime.
    pub async fn open(database_path: &str) -> Result<Self, LedgerError> {
        let service = LedgerService::init(database_path).await?;
        Ok(Self { service })
    }

    /// The service behind the boundary, for callers that live in-process
    /// and want the typed API (integrity check, export).
    pub fn service(&self) -> &LedgerService {
        &self.service
    }

    pub async fn create_wallet(&self, name: &str, description: &str) -> Option<WalletRecord> {
        match self.service.create_wallet(name, description).await {
            Ok(wallet) => Some(wallet.into()),
            Err(err) => {
                log_failure("create_wallet", &err);
                None
            }
        }
    }

    pub async fn list_wallets(&self) -> Vec<WalletRecord> {
        match self.service.list_wallets().await {
            Ok(wallets) => wallets.into_iter().map(Into::into).collect(),
            Err(err) => {
                log_failure("list_wallets", &err);
                Vec::new()
            }
        }
    }

    pub async fn get_wallet(&self, id: WalletId) -> Option<WalletRecord> {
        match self.service.get_wallet(id).await {
            Ok(wallet) => Some(wallet.into()),
            Err(err) => {
                log_failure("get_wallet", &err);
                None
            }
        }
    }

    pub async fn update_wallet(&self, id: WalletId, name: &str, description: &str) -> bool {
        report("update_wallet", self.service.update_wallet(id, name, description).await)
    }

    pub async fn delete_wallet(&self, id: WalletId) -> bool {
        report("delete_wallet", self.service.delete_wallet(id).await)
    }

    pub async fn create_transaction(
        &self,
        wallet_id: WalletId,
        description: &str,
        amount: Cents,
        kind: TransactionKind,
        transaction_date: &str,
    ) -> bool {
        let result = self
            .service
            .create_transaction(wallet_id, description, amount, kind, transaction_date)
            .await;
        report("create_transaction", result.map(|_| ()))
    }

    pub async fn list_transactions(&self, wallet_id: WalletId) -> Vec<TransactionRecord> {
        match self.service.list_transactions(wallet_id).await {
            Ok(entries) => entries.into_iter().map(Into::into).collect(),
            Err(err) => {
                log_failure("list_transactions", &err);
                Vec::new()
            }
        }
    }

    pub async fn update_transaction(
        &self,
        id: TransactionId,
        wallet_id: WalletId,
        description: &str,
        amount: Cents,
        kind: TransactionKind,
        transaction_date: &str,
    ) -> bool {
        let result = self
            .service
            .update_transaction(id, wallet_id, description, amount, kind, transaction_date)
            .await;
        report("update_transaction", result)
    }

    pub async fn delete_transaction(&self, id: TransactionId, wallet_id: WalletId) -> bool {
        report("delete_transaction", self.service.delete_transaction(id, wallet_id).await)
    }
}

fn report(op: &'static str, result: Result<(), LedgerError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            log_failure(op, &err);
            false
        }
    }
}

fn log_failure(op: &'static str, err: &LedgerError) {
    if err.is_rejection() {
        tracing::debug!(op, %err, "call rejected");
    } else {
        tracing::error!(op, %err, "call failed");
    }
}
