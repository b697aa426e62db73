//! 동기화 흐름과 결과 레코드.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 지원하는 동기화 흐름.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    /// 워크시트 전체 교체
    Snapshot,
    /// 히스토리 시프트 후 당일 값 기록
    SyncToday,
}

impl Flow {
    /// 문자열로 변환.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::SyncToday => "sync_today",
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 결과 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Error,
}

/// 트리거에 반환되는 결과 레코드.
///
/// 실패도 치명적 에러가 아니라 `status = "error"`인 결과로 반환됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    /// 성공/실패
    pub status: SyncStatus,
    /// 사람이 읽을 수 있는 상세 메시지
    pub detail: String,
    /// 실행한 흐름
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<Flow>,
    /// 처리한 영업일 (`DDMMYYYY`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_date: Option<String>,
    /// 실행 ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
}

impl SyncResult {
    /// 성공 결과.
    pub fn success(detail: impl Into<String>) -> Self {
        Self {
            status: SyncStatus::Success,
            detail: detail.into(),
            flow: None,
            business_date: None,
            run_id: None,
        }
    }

    /// 실패 결과.
    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            status: SyncStatus::Error,
            detail: detail.into(),
            flow: None,
            business_date: None,
            run_id: None,
        }
    }

    #[must_use]
    pub fn with_flow(mut self, flow: Flow) -> Self {
        self.flow = Some(flow);
        self
    }

    #[must_use]
    pub fn with_business_date(mut self, date: impl Into<String>) -> Self {
        self.business_date = Some(date.into());
        self
    }

    #[must_use]
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// 성공 여부.
    pub fn is_success(&self) -> bool {
        self.status == SyncStatus::Success
    }
}
