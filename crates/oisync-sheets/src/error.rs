//! 원격 저장소 에러 타입.

use thiserror::Error;

/// 스프레드시트 저장소 에러 (RemoteStoreFailure).
#[derive(Debug, Error)]
pub enum SheetsError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    Network(String),

    /// 요청 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// API 에러 응답 (non-2xx)
    #[error("Sheets API error {status}: {message}")]
    Api { status: u16, message: String },

    /// 인증/권한 에러
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 서비스 계정 키 로드/서명 에러
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// 해석할 수 없는 범위
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// 응답 파싱 에러
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SheetsError {
    /// 인증 에러인지 확인.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, SheetsError::Unauthorized(_) | SheetsError::Credentials(_))
            || matches!(self, SheetsError::Api { status, .. } if *status == 401 || *status == 403)
    }
}

impl From<reqwest::Error> for SheetsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SheetsError::Timeout(err.to_string())
        } else if err.is_decode() {
            SheetsError::Parse(err.to_string())
        } else {
            SheetsError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SheetsError {
    fn from(err: serde_json::Error) -> Self {
        SheetsError::Parse(err.to_string())
    }
}

/// 저장소 작업 Result 타입.
pub type SheetsResult<T> = Result<T, SheetsError>;
