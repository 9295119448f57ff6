use anyhow::Result;
use crumina::io::Exporter;
use crumina::TransactionKind;

mod common;
use common::{date, test_service};

#[tokio::test]
async fn test_wallet_csv_includes_reconciled_balances() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let wallet = service.create_wallet("Cash", "pocket").await?;
    service
        .create_transaction(wallet.id, "salary", 10000, TransactionKind::Income, &date("2025-01-01"))
        .await?;

    let mut buf = Vec::new();
    let exporter = Exporter::new(&service);
    let count = exporter.export_wallets_csv(&mut buf).await?;
    assert_eq!(count, 1);

    let csv = String::from_utf8(buf)?;
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("id,name,description,balance"));
    assert_eq!(
        lines.next(),
        Some(format!("{},Cash,pocket,10000", wallet.id).as_str())
    );

    Ok(())
}

#[tokio::test]
async fn test_transaction_csv_is_newest_first() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let wallet = service.create_wallet("Cash", "").await?;
    service
        .create_transaction(wallet.id, "older", 100, TransactionKind::Income, &date("2025-01-01"))
        .await?;
    service
        .create_transaction(wallet.id, "newer", 40, TransactionKind::Expense, &date("2025-02-01"))
        .await?;

    let mut buf = Vec::new();
    let exporter = Exporter::new(&service);
    let count = exporter.export_transactions_csv(&mut buf, wallet.id).await?;
    assert_eq!(count, 2);

    let csv = String::from_utf8(buf)?;
    let rows: Vec<&str> = csv.lines().skip(1).collect();
    assert!(rows[0].contains("newer") && rows[0].contains("expense"));
    assert!(rows[1].contains("older") && rows[1].contains("income"));

    Ok(())
}

#[tokio::test]
async fn test_full_json_snapshot_round_trips() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let a = service.create_wallet("A", "").await?;
    let b = service.create_wallet("B", "").await?;
    service
        .create_transaction(a.id, "x", 100, TransactionKind::Income, &date("2025-01-01"))
        .await?;
    service
        .create_transaction(b.id, "y", 50, TransactionKind::Expense, &date("2025-01-02"))
        .await?;

    let mut buf = Vec::new();
    let exporter = Exporter::new(&service);
    let snapshot = exporter.export_full_json(&mut buf).await?;
    assert_eq!(snapshot.wallets.len(), 2);
    assert_eq!(snapshot.transactions.len(), 2);

    let parsed: crumina::io::LedgerSnapshot = serde_json::from_slice(&buf)?;
    assert_eq!(parsed.wallets, snapshot.wallets);
    assert_eq!(parsed.transactions, snapshot.transactions);

    Ok(())
}
