//! 행/열 셀 그리드.

use serde::{Deserialize, Serialize};

/// 셀 값의 2차원 그리드 (행 우선).
///
/// 셀은 항상 문자열이며 빈 셀은 빈 문자열로 표현합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataGrid {
    rows: Vec<Vec<String>>,
}

impl DataGrid {
    /// 행 목록으로 생성.
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// 빈 그리드.
    pub fn empty() -> Self {
        Self::default()
    }

    /// 단일 셀 그리드 (1x1).
    pub fn single(value: impl Into<String>) -> Self {
        Self {
            rows: vec![vec![value.into()]],
        }
    }

    /// 단일 열 그리드 (Nx1).
    pub fn column<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: values.into_iter().map(|v| vec![v.into()]).collect(),
        }
    }

    /// 행 참조.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// 행 소유권 반환.
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    /// 특정 행.
    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// 특정 셀. 범위를 벗어나면 빈 문자열.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// 행 수.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 가장 긴 행의 셀 수.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// 값이 있는 셀이 하나도 없으면 true.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(|cell| cell.is_empty())
    }

    /// 값이 있는 셀 수.
    pub fn filled_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|c| !c.is_empty()).count()
    }

    /// 행 추가.
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// 모든 행을 가장 긴 행 길이로 맞춤 (빈 문자열로 채움).
    pub fn into_rectangular(mut self) -> Self {
        let width = self.width();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
        self
    }

    /// 최소 `rows` x `cols` 크기가 되도록 빈 문자열로 채웁니다.
    ///
    /// 빈 셀을 잘라낸 읽기 결과를 원래 범위 크기로 되돌릴 때 씁니다.
    pub fn padded_to(mut self, rows: usize, cols: usize) -> Self {
        if self.rows.len() < rows {
            self.rows.resize(rows, Vec::new());
        }
        let width = self.width().max(cols);
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
        self
    }
}

impl From<Vec<Vec<String>>> for DataGrid {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::new(rows)
    }
}

impl From<Vec<Vec<&str>>> for DataGrid {
    fn from(rows: Vec<Vec<&str>>) -> Self {
        Self::new(
            rows.into_iter()
                .map(|r| r.into_iter().map(str::to_string).collect())
                .collect(),
        )
    }
}
