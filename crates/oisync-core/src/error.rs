//! 코어 에러 타입.

use thiserror::Error;

/// 설정 및 도메인 값 검증 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 소스 로드/역직렬화 실패
    #[error("configuration load error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    /// 설정 값 검증 실패
    #[error("invalid configuration: {0}")]
    Config(String),

    /// 알 수 없는 타임존 이름
    #[error("unknown time zone: {0}")]
    InvalidTimezone(String),

    /// 컷오프 시각 형식 오류 (HH:MM)
    #[error("invalid cutoff time '{0}', expected HH:MM")]
    InvalidCutoff(String),

    /// 영업일 식별자 형식 오류 (DDMMYYYY)
    #[error("invalid business date '{0}', expected DDMMYYYY")]
    InvalidDate(String),
}

/// 코어 작업 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;
