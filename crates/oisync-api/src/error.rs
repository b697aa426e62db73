//! 트리거 응답 에러 타입.
//!
//! 흐름 자체의 실패는 `SyncResult`로 200 응답에 담기므로,
//! 여기서는 흐름을 시작하지 못한 경우만 다룹니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use oisync_core::Flow;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 웹훅 상태 응답.
///
/// ```json
/// { "status": "busy", "detail": "sync_today flow is already running" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    /// 상태 문자열 ("download started", "ok", "busy", "error")
    pub status: String,
    /// 추가 설명 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StatusResponse {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            detail: None,
        }
    }

    pub fn with_detail(status: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            detail: Some(detail.into()),
        }
    }
}

/// 트리거 처리 에러.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 같은 흐름이 이미 실행 중
    #[error("{flow} flow is already running")]
    Busy { flow: Flow },

    /// 백그라운드 실행 태스크가 비정상 종료
    #[error("{flow} flow task aborted: {message}")]
    TaskAborted { flow: Flow, message: String },
}

impl ApiError {
    /// HTTP 상태 코드.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Busy { .. } => StatusCode::CONFLICT,
            Self::TaskAborted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn status_label(&self) -> &'static str {
        match self {
            Self::Busy { .. } => "busy",
            Self::TaskAborted { .. } => "error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = StatusResponse::with_detail(self.status_label(), self.to_string());
        (self.status_code(), Json(body)).into_response()
    }
}

/// 핸들러 결과 타입.
pub type ApiResult<T> = Result<T, ApiError>;
