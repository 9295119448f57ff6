use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{Transaction, Wallet, WalletId};

/// Full ledger snapshot for JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub wallets: Vec<Wallet>,
    pub transactions: Vec<Transaction>,
}

/// Exporter for converting ledger data to CSV or JSON.
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export all wallets with their reconciled balances to CSV.
    pub async fn export_wallets_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let wallets = self.service.list_wallets().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "name", "description", "balance"])?;

        let mut count = 0;
        for wallet in &wallets {
            csv_writer.write_record(&[
                wallet.id.to_string(),
                wallet.name.clone(),
                wallet.description.clone(),
                wallet.balance.to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export one wallet's transactions to CSV, newest first.
    pub async fn export_transactions_csv<W: Write>(
        &self,
        writer: W,
        wallet_id: WalletId,
    ) -> Result<usize> {
        let entries = self.service.list_transactions(wallet_id).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "wallet_id",
            "date",
            "kind",
            "amount",
            "description",
        ])?;

        let mut count = 0;
        for entry in &entries {
            csv_writer.write_record(&[
                entry.id.to_string(),
                entry.wallet_id.to_string(),
                entry.transaction_date.clone(),
                entry.kind.as_str().to_string(),
                entry.amount.to_string(),
                entry.description.clone(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the full ledger as a JSON snapshot.
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let wallets = self.service.list_wallets().await?;
        let mut transactions = Vec::new();
        for wallet in &wallets {
            transactions.extend(self.service.list_transactions(wallet.id).await?);
        }

        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            wallets,
            transactions,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
