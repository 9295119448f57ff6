// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use crumina::application::LedgerService;
use crumina::transport::LedgerHandle;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to create a test transport handle with a temporary database
pub async fn test_handle() -> Result<(LedgerHandle, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let handle = LedgerHandle::open(db_path.to_str().unwrap()).await?;
    Ok((handle, temp_dir))
}

/// Midnight display timestamp for a calendar date
pub fn date(day: &str) -> String {
    format!("{} 00:00:00", day)
}
