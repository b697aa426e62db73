//! OI 동기화 트리거 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 웹훅 트리거 (스냅샷/증분 흐름)
//! - 헬스 체크 엔드포인트
//! - 증분 흐름 cron 스케줄러
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: HTTP 엔드포인트
//! - [`tasks`]: 백그라운드 스케줄러
//! - [`error`]: 트리거 응답 에러

pub mod error;
pub mod routes;
pub mod state;
pub mod tasks;

pub use error::{ApiError, ApiResult, StatusResponse};
pub use routes::*;
pub use state::AppState;
pub use tasks::{run_scheduled_sync, start_sync_scheduler, SchedulerError};

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
