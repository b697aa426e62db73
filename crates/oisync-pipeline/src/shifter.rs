//! 히스토리 시프트 (원본 범위 → 대상 범위 이동).
//!
//! 이동은 원자적 연산이 아니라 순서가 정해진 단계들의 프로토콜입니다:
//! - 값이 있으면: 원본 읽기 → 대상 쓰기 → 원본 지우기
//! - 값이 없으면: 원본 읽기 → 대상 지우기 → 원본 지우기
//!
//! 대상에는 원본 범위 전체 크기로 씁니다. 읽기 결과에서 잘린 빈 셀은 빈 문자열로
//! 채워 쓰므로 대상의 이전 값이 남지 않습니다.
//!
//! 원본 지우기는 항상 마지막입니다. 대상 쓰기 후 원본 지우기 전에 실패하면
//! 원본과 대상이 같은 값을 갖는 중복 상태가 되며 데이터는 잃지 않습니다.

use std::fmt;
use std::sync::Arc;

use oisync_core::SheetRange;
use oisync_sheets::{parse_cells, RangeStore, SheetsError};
use serde::Serialize;
use tracing::debug;

use crate::error::ShiftError;

/// 시프트 프로토콜 단계.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStep {
    /// 원본 범위 읽기
    ReadSource,
    /// 읽은 값을 대상 범위에 쓰기
    WriteDestination,
    /// 원본이 비었을 때 대상 범위 지우기
    ClearDestination,
    /// 원본 범위 지우기
    ClearSource,
}

impl ShiftStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadSource => "read_source",
            Self::WriteDestination => "write_destination",
            Self::ClearDestination => "clear_destination",
            Self::ClearSource => "clear_source",
        }
    }
}

impl fmt::Display for ShiftStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 원본 값 유무에 따른 단계 목록.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftPlan {
    steps: Vec<ShiftStep>,
}

impl ShiftPlan {
    pub fn for_values(has_values: bool) -> Self {
        let middle = if has_values {
            ShiftStep::WriteDestination
        } else {
            ShiftStep::ClearDestination
        };
        Self {
            steps: vec![ShiftStep::ReadSource, middle, ShiftStep::ClearSource],
        }
    }

    pub fn steps(&self) -> &[ShiftStep] {
        &self.steps
    }
}

/// 성공한 시프트 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftOutcome {
    /// 원본 범위
    pub from: String,
    /// 대상 범위
    pub to: String,
    /// 실행한 단계 (순서대로)
    pub steps: Vec<ShiftStep>,
    /// 옮긴 (값이 있는) 셀 수
    pub cells_moved: usize,
}

/// RangeStore 위에서 시프트 프로토콜을 실행합니다.
#[derive(Clone)]
pub struct HistoryShifter {
    store: Arc<dyn RangeStore>,
}

impl HistoryShifter {
    pub fn new(store: Arc<dyn RangeStore>) -> Self {
        Self { store }
    }

    /// `from`의 값을 `to`로 옮기고 `from`을 비웁니다.
    ///
    /// 원본이 비어 있으면 대상도 비웁니다.
    pub async fn shift(
        &self,
        from: &SheetRange,
        to: &SheetRange,
    ) -> Result<ShiftOutcome, ShiftError> {
        let mut completed = Vec::with_capacity(3);
        let fail = |step: ShiftStep, completed: &[ShiftStep], source: SheetsError| ShiftError {
            from: from.to_string(),
            to: to.to_string(),
            failed_step: step,
            completed: completed.to_vec(),
            source,
        };

        let source_rect = from
            .cells()
            .map(parse_cells)
            .transpose()
            .map_err(|e| fail(ShiftStep::ReadSource, &completed, e))?;

        let values = self
            .store
            .get(from)
            .await
            .map_err(|e| fail(ShiftStep::ReadSource, &completed, e))?;
        completed.push(ShiftStep::ReadSource);

        let plan = ShiftPlan::for_values(!values.is_empty());
        let values = match source_rect {
            Some(rect) => values.padded_to(rect.rows(), rect.cols()),
            None => values,
        };

        for &step in plan.steps().iter().skip(1) {
            let result = match step {
                ShiftStep::WriteDestination => self.store.update(to, &values).await,
                ShiftStep::ClearDestination => self.store.clear(to).await,
                ShiftStep::ClearSource => self.store.clear(from).await,
                ShiftStep::ReadSource => Ok(()),
            };
            result.map_err(|e| fail(step, &completed, e))?;
            completed.push(step);
            debug!(from = %from, to = %to, step = %step, "Shift step completed");
        }

        Ok(ShiftOutcome {
            from: from.to_string(),
            to: to.to_string(),
            steps: completed,
            cells_moved: values.filled_cells(),
        })
    }
}
