//! 컬럼 프로젝션과 증분 동기화 레이아웃.
//!
//! 원본 CSV의 컬럼 인덱스와 시트 목적지 컬럼의 대응은 업스트림 파일 형식과의
//! 암묵적 계약입니다. 전체 교체 경로와 셀 단위 쓰기 경로가 같은 상수를 공유합니다.

use super::range::{block_span, cell_ref, column_span};

/// 원본 컬럼 인덱스 → 목적지 컬럼 매핑.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnProjection {
    /// 프로젝션 이름
    pub name: &'static str,
    /// 0 기반 원본 컬럼 인덱스 (출력 순서)
    pub source_columns: &'static [usize],
    /// 목적지 컬럼 문자 (source_columns와 같은 길이)
    pub destination_columns: &'static [&'static str],
}

/// 전체 교체용 프로젝션: 원본 B,C,F,G,H,I → 목적지 A–F.
pub const SNAPSHOT_PROJECTION: ColumnProjection = ColumnProjection {
    name: "snapshot",
    source_columns: &[1, 2, 5, 6, 7, 8],
    destination_columns: &["A", "B", "C", "D", "E", "F"],
};

/// 증분 업데이트용 프로젝션: 원본 D,E → 목적지 G,H.
pub const DELTA_PROJECTION: ColumnProjection = ColumnProjection {
    name: "delta",
    source_columns: &[3, 4],
    destination_columns: &["G", "H"],
};

impl ColumnProjection {
    /// 출력 컬럼 수.
    pub fn width(&self) -> usize {
        self.source_columns.len()
    }

    /// 한 행을 프로젝션. 없는 셀은 빈 문자열로 채워 항상 width() 길이.
    pub fn project_row(&self, row: &[String]) -> Vec<String> {
        self.source_columns
            .iter()
            .map(|&idx| row.get(idx).cloned().unwrap_or_default())
            .collect()
    }

    /// 목적지 블록 범위 (예: `A1:F7`).
    pub fn destination_block(&self, first_row: u32, rows: u32) -> String {
        let first = self.destination_columns.first().copied().unwrap_or("A");
        let last = self.destination_columns.last().copied().unwrap_or(first);
        block_span(first, last, first_row, first_row + rows.max(1) - 1)
    }
}

/// 증분(sync-today) 흐름의 시트 레이아웃.
///
/// 라이브 컬럼(G,H)의 추적 윈도우와 날짜 셀(G1)을 히스토리 컬럼(C,D)과 C1으로
/// 옮긴 뒤 새 값을 씁니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaLayout {
    /// 라이브 컬럼에 쓰는 프로젝션
    pub projection: ColumnProjection,
    /// 라이브 컬럼별 히스토리 컬럼 (projection.destination_columns와 같은 길이)
    pub history_columns: &'static [&'static str],
    /// 추적 윈도우 행 수
    pub window_rows: usize,
    /// 윈도우 첫 목적지 행 (1 기반)
    pub first_row: u32,
    /// 영업일 라벨 행 (1 기반)
    pub date_row: u32,
}

/// 기본 증분 레이아웃: G3:G7/H3:H7 → C3:C7/D3:D7, G1 → C1.
pub const DELTA_LAYOUT: DeltaLayout = DeltaLayout {
    projection: DELTA_PROJECTION,
    history_columns: &["C", "D"],
    window_rows: 5,
    first_row: 3,
    date_row: 1,
};

impl DeltaLayout {
    /// 라이브 컬럼의 윈도우 범위 (예: `G3:G7`).
    pub fn live_range(&self, column: usize) -> Option<String> {
        self.projection
            .destination_columns
            .get(column)
            .map(|col| column_span(col, self.first_row, self.window_rows as u32))
    }

    /// 히스토리 컬럼의 윈도우 범위 (예: `C3:C7`).
    pub fn history_range(&self, column: usize) -> Option<String> {
        self.history_columns
            .get(column)
            .map(|col| column_span(col, self.first_row, self.window_rows as u32))
    }

    /// 윈도우 i번째 행의 라이브 셀 (예: column 0, row 0 → `G3`).
    pub fn live_cell(&self, column: usize, window_row: usize) -> Option<String> {
        self.projection
            .destination_columns
            .get(column)
            .map(|col| cell_ref(col, self.first_row + window_row as u32))
    }

    /// 라이브 날짜 셀 (`G1`).
    pub fn date_cell(&self) -> String {
        let col = self.projection.destination_columns.first().copied().unwrap_or("G");
        cell_ref(col, self.date_row)
    }

    /// 히스토리 날짜 셀 (`C1`).
    pub fn history_date_cell(&self) -> String {
        let col = self.history_columns.first().copied().unwrap_or("C");
        cell_ref(col, self.date_row)
    }

    /// 시프트 순서대로 (원본, 목적지) 범위 쌍: 컬럼 윈도우들, 그다음 날짜 셀.
    pub fn shift_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = (0..self.projection.width())
            .filter_map(|col| Some((self.live_range(col)?, self.history_range(col)?)))
            .collect();
        pairs.push((self.date_cell(), self.history_date_cell()));
        pairs
    }
}
