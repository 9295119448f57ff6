use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};

use crate::domain::{format_cents, parse_cents, TransactionId, TransactionKind, WalletId};
use crate::io::Exporter;
use crate::transport::LedgerHandle;

/// Crumina - Pocket Money Ledger
#[derive(Parser)]
#[command(name = "crumina")]
#[command(about = "A local-first pocket money ledger with per-wallet reconciled balances")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "crumina.db")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Wallet management commands
    #[command(subcommand)]
    Wallet(WalletCommands),

    /// Transaction management commands
    #[command(subcommand)]
    Tx(TxCommands),

    /// Show balance for one wallet or all wallets
    Balance {
        /// Wallet id (omit for all wallets)
        wallet: Option<WalletId>,
    },

    /// Verify that every stored balance matches its transaction history
    Check,

    /// Export data to CSV or JSON
    Export {
        /// What to export: wallets, transactions, full
        export_type: String,

        /// Wallet id (required for transactions)
        #[arg(short, long)]
        wallet: Option<WalletId>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum WalletCommands {
    /// Create a new wallet
    Create {
        /// Wallet name (must be unique)
        name: String,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// List all wallets
    List,

    /// Show one wallet and its transactions
    Show {
        /// Wallet id
        id: WalletId,
    },

    /// Rename or re-describe a wallet
    Update {
        /// Wallet id
        id: WalletId,

        /// New wallet name
        name: String,

        /// New description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Delete a wallet and all of its transactions
    Delete {
        /// Wallet id
        id: WalletId,
    },
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// Post an income or expense entry against a wallet
    Add {
        /// Wallet id
        wallet: WalletId,

        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// Entry kind: income or expense
        #[arg(short, long)]
        kind: String,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Date (YYYY-MM-DD HH:MM:SS, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// List a wallet's transactions, newest first
    List {
        /// Wallet id
        wallet: WalletId,
    },

    /// Edit a transaction in place (all fields are re-submitted)
    Edit {
        /// Transaction id
        id: TransactionId,

        /// Owning wallet id
        wallet: WalletId,

        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// Entry kind: income or expense
        #[arg(short, long)]
        kind: String,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Date (YYYY-MM-DD HH:MM:SS)
        #[arg(long)]
        date: String,
    },

    /// Remove a transaction from its wallet
    Rm {
        /// Transaction id
        id: TransactionId,

        /// Owning wallet id
        wallet: WalletId,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                LedgerHandle::open(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Wallet(wallet_cmd) => {
                let handle = LedgerHandle::open(&self.database).await?;
                run_wallet_command(&handle, wallet_cmd).await?;
            }

            Commands::Tx(tx_cmd) => {
                let handle = LedgerHandle::open(&self.database).await?;
                run_tx_command(&handle, tx_cmd).await?;
            }

            Commands::Balance { wallet } => {
                let handle = LedgerHandle::open(&self.database).await?;
                run_balance_command(&handle, wallet).await?;
            }

            Commands::Check => {
                let handle = LedgerHandle::open(&self.database).await?;
                run_check_command(&handle).await?;
            }

            Commands::Export {
                export_type,
                wallet,
                output,
            } => {
                let handle = LedgerHandle::open(&self.database).await?;
                run_export_command(&handle, &export_type, wallet, output.as_deref()).await?;
            }
        }

        Ok(())
    }
}

fn parse_kind(input: &str) -> Result<TransactionKind> {
    TransactionKind::parse(input)
        .with_context(|| format!("Invalid kind '{}'. Valid kinds: income, expense", input))
}

fn default_date() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

async fn run_wallet_command(handle: &LedgerHandle, cmd: WalletCommands) -> Result<()> {
    match cmd {
        WalletCommands::Create { name, description } => {
            let Some(wallet) = handle.create_wallet(&name, &description).await else {
                bail!("Failed to create wallet '{}' (empty or duplicate name?)", name);
            };
            println!("Created wallet {}: {}", wallet.id, wallet.name);
        }

        WalletCommands::List => {
            let wallets = handle.list_wallets().await;
            if wallets.is_empty() {
                println!("No wallets found.");
            } else {
                println!("{:<6} {:<20} {:>12}  DESCRIPTION", "ID", "NAME", "BALANCE");
                println!("{}", "-".repeat(56));
                for wallet in wallets {
                    println!(
                        "{:<6} {:<20} {:>12}  {}",
                        wallet.id,
                        wallet.name,
                        format_cents(wallet.balance),
                        wallet.description
                    );
                }
            }
        }

        WalletCommands::Show { id } => {
            let Some(wallet) = handle.get_wallet(id).await else {
                bail!("Wallet {} not found", id);
            };
            println!("Wallet: {}", wallet.name);
            println!("  ID:          {}", wallet.id);
            if !wallet.description.is_empty() {
                println!("  Description: {}", wallet.description);
            }
            println!("  Balance:     {}", format_cents(wallet.balance));

            let entries = handle.list_transactions(id).await;
            println!("  Entries:     {}", entries.len());
            for entry in entries {
                let sign = if entry.kind == 0 { "+" } else { "-" };
                println!(
                    "    [{}] {} {}{}  {}",
                    entry.id,
                    entry.transaction_date,
                    sign,
                    format_cents(entry.amount),
                    entry.description
                );
            }
        }

        WalletCommands::Update {
            id,
            name,
            description,
        } => {
            if !handle.update_wallet(id, &name, &description).await {
                bail!("Failed to update wallet {} (unknown id or bad name?)", id);
            }
            println!("Updated wallet {}", id);
        }

        WalletCommands::Delete { id } => {
            if !handle.delete_wallet(id).await {
                bail!("Wallet {} not found", id);
            }
            println!("Deleted wallet {} and its transactions", id);
        }
    }
    Ok(())
}

async fn run_tx_command(handle: &LedgerHandle, cmd: TxCommands) -> Result<()> {
    match cmd {
        TxCommands::Add {
            wallet,
            amount,
            kind,
            description,
            date,
        } => {
            let amount =
                parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;
            let kind = parse_kind(&kind)?;
            let date = date.unwrap_or_else(default_date);

            if !handle
                .create_transaction(wallet, &description, amount, kind, &date)
                .await
            {
                bail!("Failed to add transaction (unknown wallet or bad amount?)");
            }

            let balance = handle
                .get_wallet(wallet)
                .await
                .map(|w| format_cents(w.balance))
                .unwrap_or_default();
            println!(
                "Recorded {} {} on wallet {} (balance {})",
                kind,
                format_cents(amount),
                wallet,
                balance
            );
        }

        TxCommands::List { wallet } => {
            let entries = handle.list_transactions(wallet).await;
            if entries.is_empty() {
                println!("No transactions for wallet {}.", wallet);
            } else {
                println!(
                    "{:<6} {:<20} {:<8} {:>12}  DESCRIPTION",
                    "ID", "DATE", "KIND", "AMOUNT"
                );
                println!("{}", "-".repeat(64));
                for entry in entries {
                    let kind = if entry.kind == 0 { "income" } else { "expense" };
                    println!(
                        "{:<6} {:<20} {:<8} {:>12}  {}",
                        entry.id,
                        entry.transaction_date,
                        kind,
                        format_cents(entry.amount),
                        entry.description
                    );
                }
            }
        }

        TxCommands::Edit {
            id,
            wallet,
            amount,
            kind,
            description,
            date,
        } => {
            let amount =
                parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;
            let kind = parse_kind(&kind)?;

            if !handle
                .update_transaction(id, wallet, &description, amount, kind, &date)
                .await
            {
                bail!("Failed to edit transaction {} (wrong wallet or bad input?)", id);
            }
            println!("Updated transaction {}", id);
        }

        TxCommands::Rm { id, wallet } => {
            if !handle.delete_transaction(id, wallet).await {
                bail!("Transaction {} not found in wallet {}", id, wallet);
            }
            println!("Deleted transaction {}", id);
        }
    }
    Ok(())
}

async fn run_balance_command(handle: &LedgerHandle, wallet: Option<WalletId>) -> Result<()> {
    match wallet {
        Some(id) => {
            let Some(wallet) = handle.get_wallet(id).await else {
                bail!("Wallet {} not found", id);
            };
            println!("{}: {}", wallet.name, format_cents(wallet.balance));
        }
        None => {
            let wallets = handle.list_wallets().await;
            if wallets.is_empty() {
                println!("No wallets found.");
                return Ok(());
            }
            for wallet in wallets {
                println!("{:<20} {:>12}", wallet.name, format_cents(wallet.balance));
            }
        }
    }
    Ok(())
}

async fn run_check_command(handle: &LedgerHandle) -> Result<()> {
    let report = handle.service().check_integrity().await?;

    println!("Wallets:              {}", report.wallet_count);
    println!("Transactions:         {}", report.transaction_count);
    println!("Orphaned entries:     {}", report.orphaned_transactions);
    println!("Invalid amounts:      {}", report.invalid_amounts);
    println!("Drifted balances:     {}", report.drifted.len());

    for drift in &report.drifted {
        println!(
            "  wallet {}: stored {} but transactions sum to {}",
            drift.wallet_id,
            format_cents(drift.stored),
            format_cents(drift.recomputed)
        );
    }

    if report.is_clean() {
        println!("Ledger OK.");
        Ok(())
    } else {
        bail!("Ledger integrity check failed");
    }
}

async fn run_export_command(
    handle: &LedgerHandle,
    export_type: &str,
    wallet: Option<WalletId>,
    output: Option<&str>,
) -> Result<()> {
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(handle.service());

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "wallets" => {
            let count = exporter.export_wallets_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} wallets", count);
            }
        }
        "transactions" => {
            let wallet_id =
                wallet.context("Transaction export requires --wallet <id>")?;
            let count = exporter.export_transactions_csv(writer, wallet_id).await?;
            if output.is_some() {
                eprintln!("Exported {} transactions", count);
            }
        }
        "full" => {
            let snapshot = exporter.export_full_json(writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported full ledger: {} wallets, {} transactions",
                    snapshot.wallets.len(),
                    snapshot.transactions.len()
                );
            }
        }
        _ => {
            bail!(
                "Invalid export type '{}'. Valid types: wallets, transactions, full",
                export_type
            );
        }
    }

    Ok(())
}
