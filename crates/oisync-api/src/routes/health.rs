//! 헬스 체크 endpoint.
//!
//! 로드밸런서나 오케스트레이션 시스템에서 사용하는 liveness/readiness 응답을 제공합니다.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use oisync_core::Flow;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::StatusResponse;
use crate::state::AppState;

/// 상세 헬스 체크 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyResponse {
    /// 전체 상태 ("ok")
    pub status: String,

    /// API 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,

    /// 현재 시간 (ISO 8601)
    pub timestamp: String,

    /// 저장소 백엔드 이름
    pub store: String,

    /// 흐름별 실행 상태
    pub flows: FlowStatus,
}

/// 흐름별 실행 상태 ("idle" | "running").
#[derive(Debug, Serialize, Deserialize)]
pub struct FlowStatus {
    pub snapshot: String,
    pub sync_today: String,
}

fn flow_state(state: &AppState, flow: Flow) -> String {
    if state.guard.is_busy(flow) {
        "running".to_string()
    } else {
        "idle".to_string()
    }
}

/// 간단한 헬스 체크 (liveness 체크용).
///
/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(StatusResponse::new("ok")))
}

/// 상세 헬스 체크 (readiness 체크용).
///
/// GET /health/ready
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = ReadyResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        store: state.orchestrator.store().name().to_string(),
        flows: FlowStatus {
            snapshot: flow_state(&state, Flow::Snapshot),
            sync_today: flow_state(&state, Flow::SyncToday),
        },
    };

    (StatusCode::OK, Json(response))
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(health_ready))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use oisync_sheets::MemoryRangeStore;
    use tower::ServiceExt;

    use crate::state::create_test_state;

    #[tokio::test]
    async fn test_health_check_returns_ok_status() {
        let app = Router::new().route("/health", get(health_check));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_health_ready_reports_running_flow() {
        let tmp = tempfile::tempdir().unwrap();
        let state = Arc::new(create_test_state(
            "http://127.0.0.1:1",
            tmp.path(),
            Arc::new(MemoryRangeStore::new()),
        ));
        let _permit = state.guard.try_acquire(Flow::SyncToday).unwrap();

        let app = health_router().with_state(state);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let ready: ReadyResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(ready.status, "ok");
        assert_eq!(ready.store, "memory");
        assert_eq!(ready.flows.snapshot, "idle");
        assert_eq!(ready.flows.sync_today, "running");
    }
}
