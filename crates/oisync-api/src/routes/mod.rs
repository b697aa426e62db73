//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/webhook/start-download` - 스냅샷 흐름 시작
//! - `/webhook/sync-today` - 증분 흐름 실행

pub mod health;
pub mod webhook;

pub use health::{health_router, FlowStatus, ReadyResponse};
pub use webhook::webhook_router;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new().merge(health_router()).merge(webhook_router())
}
