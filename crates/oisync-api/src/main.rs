//! OI 동기화 트리거 서버.
//!
//! Axum 기반 웹훅 서버와 증분 흐름 스케줄러를 시작합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, Router};
use oisync_api::routes::create_api_router;
use oisync_api::state::AppState;
use oisync_api::tasks::start_sync_scheduler;
use oisync_core::{init_logging, AppConfig, LogConfig, ServerConfig};
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// 소켓 주소 반환.
fn socket_addr(config: &ServerConfig) -> anyhow::Result<SocketAddr> {
    format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}; check server.host and server.port",
                config.host, config.port
            )
        })
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // sync-today는 요청 안에서 실행되므로 흐름 전체보다 길게 설정
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default().context("Failed to load configuration")?;
    init_logging(LogConfig::from_settings(&config.logging))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting OI sync trigger server...");

    let addr = socket_addr(&config.server)?;
    let state = Arc::new(AppState::from_config(&config).context("Failed to build sync pipeline")?);

    info!(
        version = %state.version,
        store = state.orchestrator.store().name(),
        snapshot_worksheet = %config.sheets.snapshot_worksheet,
        delta_worksheet = %config.sheets.delta_worksheet,
        "Application state initialized"
    );

    // 전역 종료 토큰 (스케줄러에 종료 전파)
    let shutdown_token = CancellationToken::new();

    let scheduler_handle = start_sync_scheduler(state.clone(), &config.schedule, shutdown_token.clone())
        .await
        .context("Failed to start sync scheduler")?;

    let app = create_router(state, Duration::from_secs(config.server.request_timeout_secs));

    info!(%addr, "Trigger server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("Server shutdown initiated, cleaning up...");
    shutdown_token.cancel();

    if let Some(handle) = scheduler_handle {
        match tokio::time::timeout(Duration::from_secs(10), handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Scheduler task ended abnormally"),
            Err(_) => warn!("Scheduler shutdown timeout, forcing shutdown"),
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
