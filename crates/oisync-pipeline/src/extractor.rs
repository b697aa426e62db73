//! 테이블 추출.
//!
//! 원본 파일의 행 구성:
//! - 0행: 메타데이터 (두 프로젝션 모두 건너뜀)
//! - 1행: 컬럼 헤더
//! - 2행부터: 데이터
//!
//! 셀 값은 텍스트 그대로 유지하며 타입 변환은 하지 않습니다.

use oisync_core::{
    ColumnProjection, DataGrid, DeltaLayout, ExtractionConfig, DELTA_LAYOUT, SNAPSHOT_PROJECTION,
};
use tracing::debug;

use crate::error::ExtractionError;

/// 프로젝션 전에 버리는 메타데이터 행 수.
pub const METADATA_ROWS: usize = 1;

/// CSV 바이트를 그리드로 파싱합니다.
///
/// 헤더를 따로 취급하지 않고, 행마다 셀 수가 달라도 허용합니다.
pub fn parse_grid(bytes: &[u8]) -> Result<DataGrid, ExtractionError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = DataGrid::empty();
    for record in reader.records() {
        let record = record?;
        grid.push_row(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

/// 추적 윈도우의 라이브 컬럼 값.
///
/// `column(0)`은 G열, `column(1)`은 H열에 쓰이며 각 길이는 윈도우 행 수와 같습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaColumns {
    columns: Vec<Vec<String>>,
}

impl DeltaColumns {
    /// 프로젝션 위치의 컬럼 값.
    pub fn column(&self, index: usize) -> Option<&[String]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    /// 전체 컬럼.
    pub fn columns(&self) -> &[Vec<String>] {
        &self.columns
    }

    /// 윈도우 행 수.
    pub fn window_len(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }
}

/// 스냅샷/증분 프로젝션 추출기.
#[derive(Debug, Clone)]
pub struct TableExtractor {
    expected_header: Vec<String>,
    layout: DeltaLayout,
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self {
            expected_header: Vec::new(),
            layout: DELTA_LAYOUT,
        }
    }
}

impl TableExtractor {
    /// 설정으로 생성. `expected_header`가 비어 있으면 헤더 검증을 하지 않습니다.
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            expected_header: config.expected_header.clone(),
            ..Self::default()
        }
    }

    /// 증분 레이아웃 지정.
    #[must_use]
    pub fn with_layout(mut self, layout: DeltaLayout) -> Self {
        self.layout = layout;
        self
    }

    /// 전체 교체용 그리드: 프로젝션된 헤더 + 모든 데이터 행 (너비 6, 빈 셀은 "").
    pub fn extract_snapshot(&self, grid: &DataGrid) -> Result<DataGrid, ExtractionError> {
        let body = grid.rows().get(METADATA_ROWS..).unwrap_or_default();
        let header = body.first().ok_or_else(|| {
            ExtractionError::MalformedGrid("no column header row after the metadata row".to_string())
        })?;
        self.validate_header(header, &SNAPSHOT_PROJECTION)?;

        let rows: Vec<Vec<String>> = body
            .iter()
            .map(|row| SNAPSHOT_PROJECTION.project_row(row))
            .collect();

        debug!(rows = rows.len(), "Snapshot projection extracted");
        Ok(DataGrid::new(rows))
    }

    /// 증분용 컬럼: 헤더 다음 윈도우 행들의 원본 3, 4번 컬럼.
    ///
    /// 메타데이터 행을 뺀 뒤 헤더 + 윈도우 행 수만큼 없으면 `InsufficientRows`.
    pub fn extract_delta(&self, grid: &DataGrid) -> Result<DeltaColumns, ExtractionError> {
        let projection = &self.layout.projection;
        let body = grid.rows().get(METADATA_ROWS..).unwrap_or_default();
        let required = self.layout.window_rows + 1;
        if body.len() < required {
            return Err(ExtractionError::InsufficientRows {
                required,
                found: body.len(),
            });
        }
        self.validate_header(&body[0], projection)?;

        let window = &body[1..required];
        let columns = projection
            .source_columns
            .iter()
            .map(|&idx| {
                window
                    .iter()
                    .map(|row| row.get(idx).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        debug!(window_rows = window.len(), "Delta projection extracted");
        Ok(DeltaColumns { columns })
    }

    /// 기대 헤더가 있으면 프로젝션된 인덱스마다 비교 (공백 제거, 대소문자 무시).
    fn validate_header(
        &self,
        header: &[String],
        projection: &ColumnProjection,
    ) -> Result<(), ExtractionError> {
        if self.expected_header.is_empty() {
            return Ok(());
        }

        for &idx in projection.source_columns {
            let Some(expected) = self.expected_header.get(idx) else {
                continue;
            };
            let found = header.get(idx).map(String::as_str).unwrap_or("");
            if !expected.trim().eq_ignore_ascii_case(found.trim()) {
                return Err(ExtractionError::HeaderMismatch {
                    column: idx,
                    expected: expected.clone(),
                    found: found.to_string(),
                });
            }
        }
        Ok(())
    }
}
