//! 웹훅 트리거 endpoint.
//!
//! - `GET|POST /webhook/start-download`: 스냅샷 흐름을 백그라운드로 시작하고 즉시 응답
//! - `GET /webhook/sync-today`: 증분 흐름을 실행하고 `SyncResult`를 응답
//!
//! 같은 흐름이 실행 중이면 두 endpoint 모두 409로 거절합니다.
//! 흐름은 허가(permit)를 가진 별도 태스크에서 실행되므로, 요청이 타임아웃으로
//! 끊겨도 진행 중인 시프트/쓰기는 끝까지 수행됩니다.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use oisync_core::{Flow, SyncResult};
use oisync_pipeline::FlowPermit;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult, StatusResponse};
use crate::state::AppState;

fn acquire(state: &AppState, flow: Flow) -> ApiResult<FlowPermit> {
    state.guard.try_acquire(flow).ok_or_else(|| {
        warn!(flow = %flow, "Trigger rejected: flow already running");
        ApiError::Busy { flow }
    })
}

/// 스냅샷 흐름 시작.
///
/// GET|POST /webhook/start-download
pub async fn start_download(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatusResponse>> {
    let permit = acquire(&state, Flow::Snapshot)?;
    let orchestrator = state.orchestrator.clone();

    tokio::spawn(async move {
        let _permit = permit;
        let result = orchestrator.run_snapshot(Utc::now()).await;
        info!(status = ?result.status, detail = %result.detail, "Background snapshot finished");
    });

    info!("Snapshot flow started in background");
    Ok(Json(StatusResponse::new("download started")))
}

/// 증분 흐름 실행.
///
/// GET /webhook/sync-today
pub async fn sync_today(State(state): State<Arc<AppState>>) -> ApiResult<Json<SyncResult>> {
    let flow = Flow::SyncToday;
    let permit = acquire(&state, flow)?;
    let orchestrator = state.orchestrator.clone();

    let handle = tokio::spawn(async move {
        let _permit = permit;
        orchestrator.run_sync_today(Utc::now()).await
    });

    let result = handle.await.map_err(|e| ApiError::TaskAborted {
        flow,
        message: e.to_string(),
    })?;
    Ok(Json(result))
}

/// 웹훅 라우터 생성.
pub fn webhook_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/webhook/start-download",
            get(start_download).post(start_download),
        )
        .route("/webhook/sync-today", get(sync_today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use mockito::Matcher;
    use oisync_core::{SheetRange, SyncStatus};
    use oisync_sheets::{MemoryRangeStore, RangeStore};
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::state::create_test_state;

    const CSV: &str = "\
Participant wise Open Interest (no. of contracts) in Equity Derivatives,,,,,,,,,
Client Type,Future Index Long,Future Index Short,Future Stock Long,Future Stock Short,Option Index Call Long,Option Index Put Long,Option Index Call Short,Option Index Put Short,Total
Client,1,2,31,41,5,6,7,8,9
DII,1,2,32,42,5,6,7,8,9
FII,1,2,33,43,5,6,7,8,9
Pro,1,2,34,44,5,6,7,8,9
TOTAL,1,2,35,45,5,6,7,8,9
";

    async fn serve(server: &mut mockito::ServerGuard, status: usize, body: &str) {
        server
            .mock("GET", Matcher::Regex(r"^/fao_participant_oi_\d{8}\.csv$".to_string()))
            .with_status(status)
            .with_body(body)
            .create_async()
            .await;
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn wait_until_idle(state: &AppState, flow: Flow) {
        for _ in 0..200 {
            if !state.guard.is_busy(flow) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("{} flow did not finish", flow);
    }

    #[tokio::test]
    async fn test_start_download_runs_snapshot_in_background() {
        let mut server = mockito::Server::new_async().await;
        serve(&mut server, 200, CSV).await;
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryRangeStore::new());
        let state = Arc::new(create_test_state(&server.url(), tmp.path(), store.clone()));

        let response = webhook_router()
            .with_state(state.clone())
            .oneshot(request("POST", "/webhook/start-download"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"status": "download started"})
        );

        wait_until_idle(&state, Flow::Snapshot).await;
        let sheet = store.get(&SheetRange::whole_sheet("Sheet1")).await.unwrap();
        assert_eq!(sheet.len(), 6);
    }

    #[tokio::test]
    async fn test_start_download_accepts_get() {
        let mut server = mockito::Server::new_async().await;
        serve(&mut server, 200, CSV).await;
        let tmp = tempfile::tempdir().unwrap();
        let state = Arc::new(create_test_state(
            &server.url(),
            tmp.path(),
            Arc::new(MemoryRangeStore::new()),
        ));

        let response = webhook_router()
            .with_state(state.clone())
            .oneshot(request("GET", "/webhook/start-download"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        wait_until_idle(&state, Flow::Snapshot).await;
    }

    #[tokio::test]
    async fn test_start_download_busy_returns_conflict() {
        let tmp = tempfile::tempdir().unwrap();
        let state = Arc::new(create_test_state(
            "http://127.0.0.1:1",
            tmp.path(),
            Arc::new(MemoryRangeStore::new()),
        ));
        let _permit = state.guard.try_acquire(Flow::Snapshot).unwrap();

        let response = webhook_router()
            .with_state(state)
            .oneshot(request("POST", "/webhook/start-download"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["status"], "busy");
        assert_eq!(json["detail"], "snapshot flow is already running");
    }

    #[tokio::test]
    async fn test_sync_today_returns_sync_result() {
        let mut server = mockito::Server::new_async().await;
        serve(&mut server, 200, CSV).await;
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryRangeStore::with_worksheets(["Sheet5"]));
        let state = Arc::new(create_test_state(&server.url(), tmp.path(), store.clone()));

        let response = webhook_router()
            .with_state(state.clone())
            .oneshot(request("GET", "/webhook/sync-today"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let result: SyncResult = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.status, SyncStatus::Success, "{}", result.detail);
        assert_eq!(result.flow, Some(Flow::SyncToday));

        assert!(!state.guard.is_busy(Flow::SyncToday));
        let live = store.get(&SheetRange::new("Sheet5", "G3:G7")).await.unwrap();
        assert_eq!(live.cell(4, 0), "35");
    }

    #[tokio::test]
    async fn test_sync_today_failure_is_still_ok_response() {
        let mut server = mockito::Server::new_async().await;
        serve(&mut server, 404, "").await;
        let tmp = tempfile::tempdir().unwrap();
        let state = Arc::new(create_test_state(
            &server.url(),
            tmp.path(),
            Arc::new(MemoryRangeStore::with_worksheets(["Sheet5"])),
        ));

        let response = webhook_router()
            .with_state(state)
            .oneshot(request("GET", "/webhook/sync-today"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert!(json["detail"].as_str().unwrap().contains("HTTP 404"));
    }

    #[tokio::test]
    async fn test_sync_today_busy_returns_conflict() {
        let tmp = tempfile::tempdir().unwrap();
        let state = Arc::new(create_test_state(
            "http://127.0.0.1:1",
            tmp.path(),
            Arc::new(MemoryRangeStore::new()),
        ));
        let _permit = state.guard.try_acquire(Flow::SyncToday).unwrap();

        let response = webhook_router()
            .with_state(state)
            .oneshot(request("GET", "/webhook/sync-today"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["status"], "busy");
    }
}
