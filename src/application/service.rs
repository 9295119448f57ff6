use anyhow::Context;
use sqlx::SqliteConnection;
use tokio::sync::Mutex;

use crate::domain::{
    sum_signed, Cents, Transaction, TransactionId, TransactionKind, Wallet, WalletId,
};
use crate::storage::Repository;

use super::LedgerError;

/// One wallet whose stored balance disagrees with the signed sum of its
/// transactions.
#[derive(Debug, Clone)]
pub struct BalanceDrift {
    pub wallet_id: WalletId,
    pub stored: Cents,
    pub recomputed: Cents,
}

/// Result of a full ledger verification pass.
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub wallet_count: i64,
    pub transaction_count: i64,
    pub orphaned_transactions: i64,
    pub invalid_amounts: i64,
    pub drifted: Vec<BalanceDrift>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.orphaned_transactions == 0 && self.invalid_amounts == 0 && self.drifted.is_empty()
    }
}

/// The ledger service: wallet CRUD, transaction CRUD and wallet-scoped
/// queries over the record store, with balance reconciliation folded
/// into every transaction mutation.
///
/// Every public call is a single atomic unit: it either commits fully or
/// leaves prior committed state untouched. Mutations run under one
/// exclusive lock spanning their record writes and the reconciliation
/// pass, so two near-simultaneous edits can never recompute from a stale
/// transaction set. Reads go straight to the pool and only ever observe
/// committed state.
pub struct LedgerService {
    repo: Repository,
    write_lock: Mutex<()>,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            write_lock: Mutex::new(()),
        }
    }

    /// Open or create a database at the given path. Repeated opens of
    /// the same path within a process are idempotent: the schema
    /// migration is a no-op on an initialized database.
    pub async fn init(database_path: &str) -> Result<Self, LedgerError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database without touching the schema.
    pub async fn connect(database_path: &str) -> Result<Self, LedgerError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Wallet operations
    // ========================

    /// Create a wallet with balance 0. Transactions are the only way the
    /// balance changes afterwards.
    pub async fn create_wallet(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Wallet, LedgerError> {
        if name.trim().is_empty() {
            return Err(LedgerError::InvalidName);
        }

        let _guard = self.write_lock.lock().await;
        let mut tx = self.repo.begin().await?;

        if Repository::wallet_id_by_name(&mut tx, name).await?.is_some() {
            return Err(LedgerError::DuplicateName(name.to_string()));
        }

        let id = Repository::insert_wallet(&mut tx, name, description).await?;
        tx.commit().await.context("Failed to commit wallet insert")?;

        tracing::debug!(wallet_id = id, name, "wallet created");
        Ok(Wallet::new(id, name, description))
    }

    /// Get a wallet by id.
    pub async fn get_wallet(&self, id: WalletId) -> Result<Wallet, LedgerError> {
        self.repo
            .get_wallet(id)
            .await?
            .ok_or(LedgerError::WalletNotFound(id))
    }

    /// List all wallets, id ascending.
    pub async fn list_wallets(&self) -> Result<Vec<Wallet>, LedgerError> {
        Ok(self.repo.list_wallets().await?)
    }

    /// Rename / re-describe a wallet. The balance is not an input here:
    /// whatever the caller believes the balance to be, the stored value
    /// stays reconciler-owned. Does not touch transactions.
    pub async fn update_wallet(
        &self,
        id: WalletId,
        name: &str,
        description: &str,
    ) -> Result<(), LedgerError> {
        if name.trim().is_empty() {
            return Err(LedgerError::InvalidName);
        }

        let _guard = self.write_lock.lock().await;
        let mut tx = self.repo.begin().await?;

        if let Some(other) = Repository::wallet_id_by_name(&mut tx, name).await? {
            if other != id {
                return Err(LedgerError::DuplicateName(name.to_string()));
            }
        }

        if !Repository::update_wallet(&mut tx, id, name, description).await? {
            return Err(LedgerError::WalletNotFound(id));
        }
        tx.commit().await.context("Failed to commit wallet update")?;

        tracing::debug!(wallet_id = id, "wallet updated");
        Ok(())
    }

    /// Delete a wallet and all of its transactions as one unit. Deleting
    /// a nonexistent wallet is a failure, not a no-op: the caller must be
    /// able to tell "deleted" from "nothing to delete".
    pub async fn delete_wallet(&self, id: WalletId) -> Result<(), LedgerError> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.repo.begin().await?;

        if !Repository::delete_wallet(&mut tx, id).await? {
            return Err(LedgerError::WalletNotFound(id));
        }
        let removed = Repository::delete_wallet_transactions(&mut tx, id).await?;
        tx.commit().await.context("Failed to commit wallet delete")?;

        tracing::debug!(wallet_id = id, transactions = removed, "wallet deleted");
        Ok(())
    }

    // ========================
    // Transaction operations
    // ========================

    /// Post an income or expense entry against an existing wallet. The
    /// insert and the balance recomputation commit together; on any
    /// failure neither an orphan entry nor a stale balance remains.
    pub async fn create_transaction(
        &self,
        wallet_id: WalletId,
        description: &str,
        amount: Cents,
        kind: TransactionKind,
        transaction_date: &str,
    ) -> Result<Transaction, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let _guard = self.write_lock.lock().await;
        let mut tx = self.repo.begin().await?;

        if Repository::wallet_by_id(&mut tx, wallet_id).await?.is_none() {
            return Err(LedgerError::WalletNotFound(wallet_id));
        }

        let id =
            Repository::insert_transaction(&mut tx, wallet_id, amount, kind, description, transaction_date)
                .await?;
        let balance = self.reconcile(&mut tx, wallet_id).await?;
        tx.commit()
            .await
            .context("Failed to commit transaction insert")?;

        tracing::debug!(transaction_id = id, wallet_id, balance, "transaction created");
        Ok(Transaction {
            id,
            wallet_id,
            amount,
            kind,
            description: description.to_string(),
            transaction_date: transaction_date.to_string(),
        })
    }

    /// Get a transaction by id.
    pub async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, LedgerError> {
        Ok(self.repo.get_transaction(id).await?)
    }

    /// A wallet's transactions, newest display date first. An unknown
    /// wallet id yields an empty sequence.
    pub async fn list_transactions(
        &self,
        wallet_id: WalletId,
    ) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.repo.list_transactions(wallet_id).await?)
    }

    /// Update a transaction in place. `wallet_id` must match the stored
    /// owner; ownership is never reassigned. An update that changes no
    /// field still reconciles.
    pub async fn update_transaction(
        &self,
        id: TransactionId,
        wallet_id: WalletId,
        description: &str,
        amount: Cents,
        kind: TransactionKind,
        transaction_date: &str,
    ) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let _guard = self.write_lock.lock().await;
        let mut tx = self.repo.begin().await?;

        let updated = Repository::update_transaction(
            &mut tx,
            id,
            wallet_id,
            amount,
            kind,
            description,
            transaction_date,
        )
        .await?;
        if !updated {
            return Err(LedgerError::TransactionNotFound { id, wallet_id });
        }

        let balance = self.reconcile(&mut tx, wallet_id).await?;
        tx.commit()
            .await
            .context("Failed to commit transaction update")?;

        tracing::debug!(transaction_id = id, wallet_id, balance, "transaction updated");
        Ok(())
    }

    /// Delete a transaction scoped by its owning wallet. A wrong owner
    /// fails exactly like a missing id and leaves the entry and balance
    /// untouched.
    pub async fn delete_transaction(
        &self,
        id: TransactionId,
        wallet_id: WalletId,
    ) -> Result<(), LedgerError> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.repo.begin().await?;

        if !Repository::delete_transaction(&mut tx, id, wallet_id).await? {
            return Err(LedgerError::TransactionNotFound { id, wallet_id });
        }

        let balance = self.reconcile(&mut tx, wallet_id).await?;
        tx.commit()
            .await
            .context("Failed to commit transaction delete")?;

        tracing::debug!(transaction_id = id, wallet_id, balance, "transaction deleted");
        Ok(())
    }

    // ========================
    // Integrity operations
    // ========================

    /// Verify the whole ledger: every stored balance is compared against
    /// a fresh re-summation of its transaction history, alongside the
    /// raw row checks. Read-only.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, LedgerError> {
        let stats = self.repo.integrity_stats().await?;
        let wallets = self.repo.list_wallets().await?;

        let mut drifted = Vec::new();
        for wallet in &wallets {
            let entries = self.repo.list_transactions(wallet.id).await?;
            let recomputed =
                sum_signed(&entries).map_err(|_| LedgerError::BalanceOverflow(wallet.id))?;
            if recomputed != wallet.balance {
                drifted.push(BalanceDrift {
                    wallet_id: wallet.id,
                    stored: wallet.balance,
                    recomputed,
                });
            }
        }

        Ok(IntegrityReport {
            wallet_count: stats.wallet_count,
            transaction_count: stats.transaction_count,
            orphaned_transactions: stats.orphaned_transactions,
            invalid_amounts: stats.invalid_amounts,
            drifted,
        })
    }

    /// Recompute a wallet's balance from its full transaction set and
    /// write it back, inside the caller's SQL transaction. Runs to
    /// completion before any mutating call reports success, so the
    /// balance invariant holds immediately, never eventually.
    async fn reconcile(
        &self,
        conn: &mut SqliteConnection,
        wallet_id: WalletId,
    ) -> Result<Cents, LedgerError> {
        let entries = Repository::transactions_for_wallet(conn, wallet_id).await?;
        let balance =
            sum_signed(&entries).map_err(|_| LedgerError::BalanceOverflow(wallet_id))?;
        Repository::write_balance(conn, wallet_id, balance).await?;
        Ok(balance)
    }
}
