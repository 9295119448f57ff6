use anyhow::Result;
use crumina::TransactionKind;

mod common;
use common::{date, test_handle};

#[tokio::test]
async fn test_records_carry_wire_kind_codes() -> Result<()> {
    let (handle, _temp) = test_handle().await?;

    let wallet = handle.create_wallet("Cash", "").await.unwrap();
    assert!(
        handle
            .create_transaction(wallet.id, "in", 100, TransactionKind::Income, &date("2025-01-01"))
            .await
    );
    assert!(
        handle
            .create_transaction(wallet.id, "out", 40, TransactionKind::Expense, &date("2025-01-02"))
            .await
    );

    let records = handle.list_transactions(wallet.id).await;
    assert_eq!(records.len(), 2);
    // Newest first; 0 = income, 1 = expense
    assert_eq!(records[0].kind, 1);
    assert_eq!(records[1].kind, 0);

    Ok(())
}

#[tokio::test]
async fn test_boolean_calls_flatten_failures() -> Result<()> {
    let (handle, _temp) = test_handle().await?;

    // Unknown ids and bad input come back as plain false / None / empty,
    // with no panic and no state change.
    assert!(handle.get_wallet(1).await.is_none());
    assert!(!handle.update_wallet(1, "X", "").await);
    assert!(!handle.delete_wallet(1).await);
    assert!(
        !handle
            .create_transaction(1, "ghost", 100, TransactionKind::Income, &date("2025-01-01"))
            .await
    );
    assert!(!handle.delete_transaction(1, 1).await);
    assert!(handle.list_wallets().await.is_empty());
    assert!(handle.list_transactions(1).await.is_empty());

    assert!(handle.create_wallet("", "").await.is_none());

    Ok(())
}

#[tokio::test]
async fn test_balance_visible_at_the_boundary() -> Result<()> {
    let (handle, _temp) = test_handle().await?;

    let wallet = handle.create_wallet("Cash", "").await.unwrap();
    assert_eq!(wallet.balance, 0);

    handle
        .create_transaction(wallet.id, "salary", 10000, TransactionKind::Income, &date("2025-01-01"))
        .await;

    // The very next read already reflects the mutation; the boundary
    // never observes a transiently stale balance.
    let refreshed = handle.get_wallet(wallet.id).await.unwrap();
    assert_eq!(refreshed.balance, 10000);

    let listed = handle.list_wallets().await;
    assert_eq!(listed[0].balance, 10000);

    Ok(())
}

#[tokio::test]
async fn test_update_ignores_any_notion_of_caller_balance() -> Result<()> {
    let (handle, _temp) = test_handle().await?;

    let wallet = handle.create_wallet("Cash", "").await.unwrap();
    handle
        .create_transaction(wallet.id, "salary", 5000, TransactionKind::Income, &date("2025-01-01"))
        .await;

    // The boundary simply has no balance parameter: a rename can never
    // smuggle a stale value into the store.
    assert!(handle.update_wallet(wallet.id, "Renamed", "still mine").await);
    let refreshed = handle.get_wallet(wallet.id).await.unwrap();
    assert_eq!(refreshed.name, "Renamed");
    assert_eq!(refreshed.balance, 5000);

    Ok(())
}

#[tokio::test]
async fn test_repeated_reads_are_identical() -> Result<()> {
    let (handle, _temp) = test_handle().await?;

    let wallet = handle.create_wallet("Cash", "").await.unwrap();
    for day in ["2025-01-03", "2025-01-01", "2025-01-02"] {
        handle
            .create_transaction(wallet.id, day, 100, TransactionKind::Income, &date(day))
            .await;
    }

    assert_eq!(handle.list_wallets().await, handle.list_wallets().await);
    assert_eq!(
        handle.list_transactions(wallet.id).await,
        handle.list_transactions(wallet.id).await
    );

    Ok(())
}
