use anyhow::{Context, Result};
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool};

use crate::domain::{Cents, Transaction, TransactionId, TransactionKind, Wallet, WalletId};

use super::MIGRATION_001_INITIAL;

/// Raw row counts used by the integrity check.
#[derive(Debug, Clone)]
pub struct IntegrityStats {
    pub wallet_count: i64,
    pub transaction_count: i64,
    pub orphaned_transactions: i64,
    pub invalid_amounts: i64,
}

/// The record store: durable wallet and transaction rows with integer
/// identity and wallet-scoped enumeration.
///
/// Reads go through the pool. Mutating operations are associated
/// functions over a `SqliteConnection` so the service can scope a
/// multi-step mutation (write + balance reconciliation) inside one SQL
/// transaction obtained from [`Repository::begin`].
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Apply the schema. Safe to run on every open.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Open or create a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Begin a SQL transaction for a multi-step mutation.
    pub async fn begin(&self) -> Result<sqlx::Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .context("Failed to begin transaction")
    }

    // ========================
    // Wallet operations
    // ========================

    /// Insert a wallet row with balance 0 and return its fresh id.
    /// Ids are assigned by AUTOINCREMENT and never reused after delete.
    pub async fn insert_wallet(
        conn: &mut SqliteConnection,
        name: &str,
        description: &str,
    ) -> Result<WalletId> {
        let result = sqlx::query("INSERT INTO wallets (name, description, balance) VALUES (?, ?, 0)")
            .bind(name)
            .bind(description)
            .execute(&mut *conn)
            .await
            .context("Failed to insert wallet")?;
        Ok(result.last_insert_rowid())
    }

    pub async fn wallet_by_id(conn: &mut SqliteConnection, id: WalletId) -> Result<Option<Wallet>> {
        let row = sqlx::query("SELECT id, name, description, balance FROM wallets WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .context("Failed to fetch wallet")?;
        row.as_ref().map(Self::row_to_wallet).transpose()
    }

    /// Id of the wallet with the given name, if any. Names are unique.
    pub async fn wallet_id_by_name(
        conn: &mut SqliteConnection,
        name: &str,
    ) -> Result<Option<WalletId>> {
        let row = sqlx::query("SELECT id FROM wallets WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await
            .context("Failed to fetch wallet by name")?;
        Ok(row.map(|r| r.get("id")))
    }

    /// Rename / re-describe a wallet. The balance column is deliberately
    /// absent from the SET list: it is store-owned and only written by
    /// [`Repository::write_balance`]. Returns false when the id is unknown.
    pub async fn update_wallet(
        conn: &mut SqliteConnection,
        id: WalletId,
        name: &str,
        description: &str,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE wallets SET name = ?, description = ? WHERE id = ?")
            .bind(name)
            .bind(description)
            .bind(id)
            .execute(&mut *conn)
            .await
            .context("Failed to update wallet")?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a wallet row. Returns false when the id is unknown.
    /// The caller cascades to the wallet's transactions in the same SQL
    /// transaction via [`Repository::delete_wallet_transactions`].
    pub async fn delete_wallet(conn: &mut SqliteConnection, id: WalletId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM wallets WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await
            .context("Failed to delete wallet")?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every transaction owned by the given wallet.
    pub async fn delete_wallet_transactions(
        conn: &mut SqliteConnection,
        wallet_id: WalletId,
    ) -> Result<u64> {
        let result = sqlx::query("DELETE FROM transactions WHERE wallet_id = ?")
            .bind(wallet_id)
            .execute(&mut *conn)
            .await
            .context("Failed to delete wallet transactions")?;
        Ok(result.rows_affected())
    }

    /// Write a reconciled balance. The only code path that touches the
    /// balance column.
    pub async fn write_balance(
        conn: &mut SqliteConnection,
        wallet_id: WalletId,
        balance: Cents,
    ) -> Result<()> {
        sqlx::query("UPDATE wallets SET balance = ? WHERE id = ?")
            .bind(balance)
            .bind(wallet_id)
            .execute(&mut *conn)
            .await
            .context("Failed to write balance")?;
        Ok(())
    }

    /// Get a wallet by id.
    pub async fn get_wallet(&self, id: WalletId) -> Result<Option<Wallet>> {
        let mut conn = self.acquire().await?;
        Self::wallet_by_id(&mut conn, id).await
    }

    /// List all wallets in insertion order (id ascending). Each call
    /// re-reads current state.
    pub async fn list_wallets(&self) -> Result<Vec<Wallet>> {
        let rows = sqlx::query("SELECT id, name, description, balance FROM wallets ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list wallets")?;
        rows.iter().map(Self::row_to_wallet).collect()
    }

    // ========================
    // Transaction operations
    // ========================

    /// Insert a transaction row and return its fresh id.
    pub async fn insert_transaction(
        conn: &mut SqliteConnection,
        wallet_id: WalletId,
        amount: Cents,
        kind: TransactionKind,
        description: &str,
        transaction_date: &str,
    ) -> Result<TransactionId> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (wallet_id, amount, kind, description, transaction_date)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(wallet_id)
        .bind(amount)
        .bind(kind.code())
        .bind(description)
        .bind(transaction_date)
        .execute(&mut *conn)
        .await
        .context("Failed to insert transaction")?;
        Ok(result.last_insert_rowid())
    }

    /// Update a transaction in place. The predicate is scoped on
    /// (id, wallet_id): a wrong owner touches zero rows exactly like a
    /// missing id, and ownership can never be reassigned.
    pub async fn update_transaction(
        conn: &mut SqliteConnection,
        id: TransactionId,
        wallet_id: WalletId,
        amount: Cents,
        kind: TransactionKind,
        description: &str,
        transaction_date: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET amount = ?, kind = ?, description = ?, transaction_date = ?
            WHERE id = ? AND wallet_id = ?
            "#,
        )
        .bind(amount)
        .bind(kind.code())
        .bind(description)
        .bind(transaction_date)
        .bind(id)
        .bind(wallet_id)
        .execute(&mut *conn)
        .await
        .context("Failed to update transaction")?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a transaction scoped by its owning wallet. Returns false
    /// when the id is unknown or belongs to a different wallet.
    pub async fn delete_transaction(
        conn: &mut SqliteConnection,
        id: TransactionId,
        wallet_id: WalletId,
    ) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ? AND wallet_id = ?")
            .bind(id)
            .bind(wallet_id)
            .execute(&mut *conn)
            .await
            .context("Failed to delete transaction")?;
        Ok(result.rows_affected() > 0)
    }

    /// Every transaction owned by the given wallet, newest display date
    /// first. Date ties break on id descending so the order is a stable
    /// total order: repeated calls with no mutation in between return
    /// identical sequences.
    pub async fn transactions_for_wallet(
        conn: &mut SqliteConnection,
        wallet_id: WalletId,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, wallet_id, amount, kind, description, transaction_date
            FROM transactions
            WHERE wallet_id = ?
            ORDER BY transaction_date DESC, id DESC
            "#,
        )
        .bind(wallet_id)
        .fetch_all(&mut *conn)
        .await
        .context("Failed to list transactions")?;
        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Get a transaction by id.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let row = sqlx::query(
            "SELECT id, wallet_id, amount, kind, description, transaction_date FROM transactions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch transaction")?;
        row.as_ref().map(Self::row_to_transaction).transpose()
    }

    /// List a wallet's transactions. An unknown wallet id yields an
    /// empty sequence, which is what the boundary contract expects after
    /// a cascading delete.
    pub async fn list_transactions(&self, wallet_id: WalletId) -> Result<Vec<Transaction>> {
        let mut conn = self.acquire().await?;
        Self::transactions_for_wallet(&mut conn, wallet_id).await
    }

    // ========================
    // Integrity operations
    // ========================

    /// Raw counts for the integrity check: totals, transactions whose
    /// wallet no longer exists, and rows violating the positive-amount
    /// rule.
    pub async fn integrity_stats(&self) -> Result<IntegrityStats> {
        let wallet_count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM wallets")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count wallets")?
            .get("count");

        let transaction_count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM transactions")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count transactions")?
            .get("count");

        let orphaned_transactions: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS count
            FROM transactions t
            WHERE NOT EXISTS (SELECT 1 FROM wallets w WHERE w.id = t.wallet_id)
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to count orphaned transactions")?
        .get("count");

        let invalid_amounts: i64 =
            sqlx::query("SELECT COUNT(*) AS count FROM transactions WHERE amount <= 0")
                .fetch_one(&self.pool)
                .await
                .context("Failed to count invalid amounts")?
                .get("count");

        Ok(IntegrityStats {
            wallet_count,
            transaction_count,
            orphaned_transactions,
            invalid_amounts,
        })
    }

    // ========================
    // Row mapping
    // ========================

    fn row_to_wallet(row: &sqlx::sqlite::SqliteRow) -> Result<Wallet> {
        Ok(Wallet {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            balance: row.get("balance"),
        })
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let code: i64 = row.get("kind");
        Ok(Transaction {
            id: row.get("id"),
            wallet_id: row.get("wallet_id"),
            amount: row.get("amount"),
            kind: TransactionKind::from_code(code)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction kind: {}", code))?,
            description: row.get("description"),
            transaction_date: row.get("transaction_date"),
        })
    }

    async fn acquire(&self) -> Result<sqlx::pool::PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .context("Failed to acquire connection")
    }
}
