//! 동기화 실행 리포트.

use std::path::PathBuf;
use std::time::Duration;

use oisync_core::{BusinessDate, Flow, SyncResult};
use serde::Serialize;
use uuid::Uuid;

use crate::shifter::ShiftOutcome;

/// 한 번의 흐름 실행 결과.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// 실행 ID
    pub run_id: Uuid,
    /// 실행한 흐름
    pub flow: Flow,
    /// 처리한 영업일
    pub business_date: BusinessDate,
    /// 대상 워크시트
    pub worksheet: String,
    /// 기록한 블록 범위 (스냅샷)
    pub range: Option<String>,
    /// 스테이징 파일 경로
    pub staged_file: Option<PathBuf>,
    /// 받은 바이트 수
    pub bytes_fetched: u64,
    /// 실행한 시프트 (순서대로)
    pub shifts: Vec<ShiftOutcome>,
    /// 기록한 행 수
    pub rows_written: usize,
    /// 기록한 셀 수 (날짜 셀 포함)
    pub cells_written: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SyncReport {
    pub fn new(
        run_id: Uuid,
        flow: Flow,
        business_date: BusinessDate,
        worksheet: impl Into<String>,
    ) -> Self {
        Self {
            run_id,
            flow,
            business_date,
            worksheet: worksheet.into(),
            range: None,
            staged_file: None,
            bytes_fetched: 0,
            shifts: Vec::new(),
            rows_written: 0,
            cells_written: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// 시프트로 옮긴 셀 수.
    pub fn cells_shifted(&self) -> usize {
        self.shifts.iter().map(|s| s.cells_moved).sum()
    }

    /// 사람이 읽을 수 있는 요약.
    pub fn detail(&self) -> String {
        match self.flow {
            Flow::Snapshot => format!(
                "Uploaded {} rows for {} to worksheet {}",
                self.rows_written, self.business_date, self.worksheet
            ),
            Flow::SyncToday => format!(
                "Shifted {} ranges ({} cells) and wrote {} cells for {} to worksheet {}",
                self.shifts.len(),
                self.cells_shifted(),
                self.cells_written,
                self.business_date,
                self.worksheet
            ),
        }
    }

    /// 성공 SyncResult로 변환.
    pub fn to_result(&self) -> SyncResult {
        SyncResult::success(self.detail())
            .with_flow(self.flow)
            .with_business_date(self.business_date.identifier())
            .with_run_id(self.run_id)
    }

    /// 리포트 요약 로그 출력
    pub fn log_summary(&self) {
        tracing::info!(
            flow = %self.flow,
            run_id = %self.run_id,
            business_date = %self.business_date,
            worksheet = %self.worksheet,
            range = self.range.as_deref().unwrap_or("-"),
            bytes_fetched = self.bytes_fetched,
            shifts = self.shifts.len(),
            cells_shifted = self.cells_shifted(),
            rows_written = self.rows_written,
            cells_written = self.cells_written,
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "동기화 완료"
        );
    }
}
