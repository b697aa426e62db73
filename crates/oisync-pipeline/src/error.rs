//! 파이프라인 에러 타입.

use std::path::PathBuf;

use oisync_core::CoreError;
use oisync_sheets::SheetsError;
use thiserror::Error;

use crate::shifter::ShiftStep;

/// 원격 소스 파일 가져오기 에러 (FetchFailure).
#[derive(Debug, Error)]
pub enum FetchError {
    /// 스테이징 디렉토리 생성 실패
    #[error("Failed to prepare staging directory {}: {source}", path.display())]
    StagingDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 스테이징 파일 쓰기 실패
    #[error("Failed to write staged file {}: {source}", path.display())]
    StagingWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 네트워크/전송 에러
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// non-2xx 응답
    #[error("Source returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// HTTP 클라이언트 생성 실패
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// 테이블 추출 에러 (ExtractionFailure).
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 추적 구간을 채울 행이 부족함
    #[error("Insufficient rows: need {required} rows after the metadata row, found {found}")]
    InsufficientRows { required: usize, found: usize },

    /// 그리드 구조 이상
    #[error("Malformed grid: {0}")]
    MalformedGrid(String),

    /// 컬럼 헤더가 기대값과 다름
    #[error("Header mismatch at column {column}: expected '{expected}', found '{found}'")]
    HeaderMismatch {
        column: usize,
        expected: String,
        found: String,
    },

    /// CSV 파싱 에러
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// 스테이징 파일 읽기 실패
    #[error("Failed to read staged file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 히스토리 시프트 에러.
///
/// 실패한 단계와 그 전에 완료된 단계를 함께 담아 원격 상태를 추론할 수 있게 합니다.
#[derive(Debug, Error)]
#[error("Shift {from} -> {to} failed at {failed_step} (completed: {completed:?}): {source}")]
pub struct ShiftError {
    /// 원본 범위
    pub from: String,
    /// 대상 범위
    pub to: String,
    /// 실패한 단계
    pub failed_step: ShiftStep,
    /// 실패 전에 완료된 단계
    pub completed: Vec<ShiftStep>,
    /// 원인
    #[source]
    pub source: SheetsError,
}

/// 동기화 흐름 에러. 오케스트레이터 경계에서 SyncResult로 변환됩니다.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("History shift failed: {0}")]
    Shift(#[from] ShiftError),

    #[error("Remote store failed: {0}")]
    Store(#[from] SheetsError),

    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),
}

impl SyncError {
    /// 에러 단계 이름 (로그 필드용).
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Extraction(_) => "extract",
            Self::Shift(_) => "shift",
            Self::Store(_) => "store",
            Self::Config(_) => "config",
        }
    }

    /// 스프레드시트 인증/권한 실패 여부.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Self::Store(e) => e.is_auth_error(),
            Self::Shift(e) => e.source.is_auth_error(),
            _ => false,
        }
    }
}

/// 동기화 Result 타입.
pub type SyncOutcome<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_rows_message() {
        let err = SyncError::from(ExtractionError::InsufficientRows {
            required: 6,
            found: 3,
        });
        assert_eq!(err.stage(), "extract");
        assert_eq!(
            err.to_string(),
            "Extraction failed: Insufficient rows: need 6 rows after the metadata row, found 3"
        );
    }

    #[test]
    fn test_auth_failures_are_detected_through_shift_and_store() {
        let shift = SyncError::from(ShiftError {
            from: "Sheet5!G1".to_string(),
            to: "Sheet5!C1".to_string(),
            failed_step: ShiftStep::ReadSource,
            completed: vec![],
            source: SheetsError::Unauthorized("token expired".to_string()),
        });
        assert!(shift.is_auth_error());
        assert!(SyncError::from(SheetsError::Api { status: 403, message: "denied".into() }).is_auth_error());
        assert!(!SyncError::from(ExtractionError::MalformedGrid("x".into())).is_auth_error());
    }

    #[test]
    fn test_shift_error_names_failed_step() {
        let err = ShiftError {
            from: "Sheet5!G3:G7".to_string(),
            to: "Sheet5!C3:C7".to_string(),
            failed_step: ShiftStep::ClearSource,
            completed: vec![ShiftStep::ReadSource, ShiftStep::WriteDestination],
            source: SheetsError::Timeout("deadline".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("failed at clear_source"));
        assert!(message.contains("Sheet5!G3:G7 -> Sheet5!C3:C7"));
    }
}
