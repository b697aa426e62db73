//! 설정에 따른 RangeStore 생성.

use std::sync::Arc;

use oisync_core::{SheetsConfig, StoreBackend};
use oisync_sheets::{GoogleSheetsStore, MemoryRangeStore, RangeStore, SheetsResult};
use tracing::{info, warn};

/// `sheets.backend`에 맞는 저장소를 생성합니다.
///
/// 메모리 백엔드는 설정된 두 워크시트를 빈 상태로 갖고 시작합니다.
pub fn build_store(config: &SheetsConfig) -> SheetsResult<Arc<dyn RangeStore>> {
    match config.backend {
        StoreBackend::Google => {
            let store = GoogleSheetsStore::from_config(config)?;
            info!(spreadsheet_id = %store.spreadsheet_id(), "Using Google Sheets store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; nothing will be written to the spreadsheet");
            Ok(Arc::new(MemoryRangeStore::with_worksheets([
                config.snapshot_worksheet.clone(),
                config.delta_worksheet.clone(),
            ])))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oisync_core::SheetRange;

    #[tokio::test]
    async fn test_memory_backend_has_configured_worksheets() {
        let config = SheetsConfig {
            backend: StoreBackend::Memory,
            ..SheetsConfig::default()
        };
        let store = build_store(&config).unwrap();
        assert_eq!(store.name(), "memory");
        assert!(store.get(&SheetRange::new("Sheet5", "G1")).await.is_ok());
        assert!(store.get(&SheetRange::new("Sheet1", "A1")).await.is_ok());
    }

    #[test]
    fn test_google_backend_requires_credentials_file() {
        let config = SheetsConfig {
            credentials_path: "/nonexistent/service_account.json".into(),
            ..SheetsConfig::default()
        };
        let err = build_store(&config).err().unwrap();
        assert!(err.is_auth_error());
    }
}
