//! 설정 관리.
//!
//! 기본값 → TOML 파일(선택) → 환경 변수(`OISYNC__<SECTION>__<KEY>`) 순으로
//! 덮어씁니다. 모든 컴포넌트는 전역 상태 대신 이 구조체를 생성자로 전달받습니다.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::business_date::{parse_cutoff, parse_timezone, BusinessDateResolver};
use crate::error::{CoreError, CoreResult};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP 트리거 서버 설정
    pub server: ServerConfig,
    /// 원격 소스 파일 설정
    pub source: SourceConfig,
    /// 영업일 계산 설정
    pub business_date: BusinessDateConfig,
    /// 스프레드시트 설정
    pub sheets: SheetsConfig,
    /// 테이블 추출 설정
    pub extraction: ExtractionConfig,
    /// 스케줄러 설정
    pub schedule: ScheduleConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초). sync-today는 요청 안에서 실행되므로 흐름 전체보다 길어야 함
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 300,
        }
    }
}

/// 원격 소스 파일 설정.
///
/// URL 형식: `<base_url>/<file_prefix>_<DDMMYYYY>.csv`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// 소스 기본 URL
    pub base_url: String,
    /// 파일 이름 접두사
    pub file_prefix: String,
    /// 브라우저 형태의 User-Agent (없으면 원격 소스가 요청을 거부)
    pub user_agent: String,
    /// 스테이징 디렉토리
    pub download_dir: PathBuf,
    /// 요청 타임아웃 (초). None이면 전송 계층 기본값
    pub timeout_secs: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nsearchives.nseindia.com/content/nsccl".to_string(),
            file_prefix: "fao_participant_oi".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            download_dir: PathBuf::from("Download"),
            timeout_secs: None,
        }
    }
}

/// 영업일 계산 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BusinessDateConfig {
    /// IANA 타임존 이름
    pub timezone: String,
    /// 컷오프 시각 (`HH:MM`)
    pub cutoff: String,
}

impl Default for BusinessDateConfig {
    fn default() -> Self {
        Self {
            timezone: "Asia/Kolkata".to_string(),
            cutoff: "19:30".to_string(),
        }
    }
}

impl BusinessDateConfig {
    /// 설정값으로 계산기 생성.
    pub fn resolver(&self) -> CoreResult<BusinessDateResolver> {
        Ok(BusinessDateResolver::new(
            parse_timezone(&self.timezone)?,
            parse_cutoff(&self.cutoff)?,
        ))
    }
}

/// RangeStore 백엔드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Google Sheets API v4
    #[default]
    Google,
    /// 프로세스 내 메모리 (로컬 드라이런)
    Memory,
}

/// 스프레드시트 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// 백엔드 선택
    pub backend: StoreBackend,
    /// 스프레드시트 ID
    pub spreadsheet_id: String,
    /// 서비스 계정 키 파일 경로
    pub credentials_path: PathBuf,
    /// Sheets API 기본 URL
    pub api_base_url: String,
    /// 토큰 엔드포인트 재정의 (None이면 키 파일의 token_uri)
    pub token_url: Option<String>,
    /// 전체 교체 흐름의 워크시트
    pub snapshot_worksheet: String,
    /// 증분 흐름의 워크시트
    pub delta_worksheet: String,
    /// 요청 타임아웃 (초). None이면 전송 계층 기본값
    pub timeout_secs: Option<u64>,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Google,
            spreadsheet_id: "1ZbIM2t5x-g7KyaZFxw635-foX0AkK0ET2R2quUk6G8Y".to_string(),
            credentials_path: PathBuf::from("service_account.json"),
            api_base_url: "https://sheets.googleapis.com/v4".to_string(),
            token_url: None,
            snapshot_worksheet: "Sheet1".to_string(),
            delta_worksheet: "Sheet5".to_string(),
            timeout_secs: None,
        }
    }
}

/// 테이블 추출 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// 기대하는 컬럼 헤더 (원본 1행). 비어 있으면 검증 생략
    pub expected_header: Vec<String>,
}

/// 스케줄러 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// 스케줄 트리거 활성화
    pub enabled: bool,
    /// 6필드 cron 식 (초 포함)
    pub cron: String,
    /// cron 평가 타임존
    pub timezone: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cron: "0 0 20 * * Mon-Fri".to_string(),
            timezone: "Asia/Kolkata".to_string(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 환경 변수 접두사
    pub const ENV_PREFIX: &'static str = "OISYNC";
    /// 기본 설정 파일 경로
    pub const DEFAULT_PATH: &'static str = "config/oisync.toml";

    /// 파일(없어도 됨)과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix(Self::ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("extraction.expected_header"),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// `OISYNC_CONFIG` 또는 기본 경로에서 로드합니다.
    pub fn load_default() -> CoreResult<Self> {
        let path = std::env::var("OISYNC_CONFIG").unwrap_or_else(|_| Self::DEFAULT_PATH.to_string());
        Self::load(path)
    }

    /// 값 검증.
    pub fn validate(&self) -> CoreResult<()> {
        if self.server.port == 0 {
            return Err(CoreError::Config("server.port must be non-zero".to_string()));
        }
        if self.source.base_url.trim().is_empty() {
            return Err(CoreError::Config("source.base_url is empty".to_string()));
        }
        if self.source.user_agent.trim().is_empty() {
            return Err(CoreError::Config(
                "source.user_agent is empty; the source rejects requests without one".to_string(),
            ));
        }
        if self.sheets.backend == StoreBackend::Google && self.sheets.spreadsheet_id.trim().is_empty() {
            return Err(CoreError::Config("sheets.spreadsheet_id is empty".to_string()));
        }
        if self.sheets.snapshot_worksheet.is_empty() || self.sheets.delta_worksheet.is_empty() {
            return Err(CoreError::Config("worksheet names must be non-empty".to_string()));
        }
        self.business_date.resolver()?;
        parse_timezone(&self.schedule.timezone)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.sheets.snapshot_worksheet, "Sheet1");
        assert_eq!(config.sheets.delta_worksheet, "Sheet5");
        assert!(config.extraction.expected_header.is_empty());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.source.file_prefix, "fao_participant_oi");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oisync.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[sheets]
backend = "memory"
delta_worksheet = "Tracker"

[business_date]
cutoff = "18:00"

[extraction]
expected_header = ["Client Type", "Future Index Long"]
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.sheets.backend, StoreBackend::Memory);
        assert_eq!(config.sheets.delta_worksheet, "Tracker");
        assert_eq!(config.business_date.cutoff, "18:00");
        assert_eq!(config.extraction.expected_header.len(), 2);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.business_date.cutoff = "half past seven".to_string();
        assert!(matches!(config.validate(), Err(CoreError::InvalidCutoff(_))));

        let mut config = AppConfig::default();
        config.schedule.timezone = "Nowhere/City".to_string();
        assert!(matches!(config.validate(), Err(CoreError::InvalidTimezone(_))));

        let mut config = AppConfig::default();
        config.source.user_agent = String::new();
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = AppConfig::default();
        config.sheets.spreadsheet_id = String::new();
        assert!(config.validate().is_err());
        config.sheets.backend = StoreBackend::Memory;
        assert!(config.validate().is_ok());
    }
}
