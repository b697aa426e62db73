//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! `Arc<AppState>`로 래핑되어 웹훅 핸들러와 스케줄러가 같은
//! 오케스트레이터와 흐름 가드를 공유합니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use oisync_core::AppConfig;
use oisync_pipeline::{build_store, FlowGuard, SyncOrchestrator, SyncOutcome};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 동기화 흐름 실행기
    pub orchestrator: Arc<SyncOrchestrator>,

    /// 흐름별 단일 실행 가드 (웹훅과 스케줄러가 공유)
    pub guard: FlowGuard,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(orchestrator: SyncOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            guard: FlowGuard::new(),
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 설정에서 저장소와 오케스트레이터를 구성합니다.
    pub fn from_config(config: &AppConfig) -> SyncOutcome<Self> {
        let store = build_store(&config.sheets)?;
        let orchestrator = SyncOrchestrator::from_config(config, store)?;
        Ok(Self::new(orchestrator))
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }
}

/// 테스트용 상태 생성.
///
/// 소스는 `source_url`, 스테이징은 `download_dir`, 저장소는 메모리 백엔드를 씁니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state(
    source_url: &str,
    download_dir: &std::path::Path,
    store: Arc<oisync_sheets::MemoryRangeStore>,
) -> AppState {
    let mut config = AppConfig::default();
    config.source.base_url = source_url.to_string();
    config.source.download_dir = download_dir.to_path_buf();
    config.sheets.backend = oisync_core::StoreBackend::Memory;

    let orchestrator = SyncOrchestrator::from_config(&config, store)
        .expect("test orchestrator configuration is valid");
    AppState::new(orchestrator)
}
