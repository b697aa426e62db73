//! 프로세스 내 메모리 RangeStore.
//!
//! 로컬 드라이런과 테스트에서 사용합니다. Sheets API와 같은 규칙을 따릅니다:
//! 없는 워크시트는 에러, 읽기 결과의 뒤쪽 빈 셀/행은 잘림, 빈 문자열 쓰기는 셀 삭제.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use oisync_core::{DataGrid, SheetRange};
use tokio::sync::RwLock;
use tracing::debug;

use crate::a1::{parse_cells, CellRect};
use crate::error::{SheetsError, SheetsResult};
use crate::traits::RangeStore;

/// (행, 열) → 값. 0 기반.
type Cells = BTreeMap<(usize, usize), String>;

/// 메모리 저장소.
#[derive(Debug, Default)]
pub struct MemoryRangeStore {
    sheets: RwLock<HashMap<String, Cells>>,
    operations: RwLock<Vec<String>>,
}

impl MemoryRangeStore {
    /// 워크시트가 없는 빈 저장소.
    pub fn new() -> Self {
        Self::default()
    }

    /// 빈 워크시트들을 가진 저장소.
    pub fn with_worksheets<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sheets = names
            .into_iter()
            .map(|name| (name.into(), Cells::new()))
            .collect();
        Self {
            sheets: RwLock::new(sheets),
            operations: RwLock::new(Vec::new()),
        }
    }

    /// 지금까지 수행한 작업 기록 (`"get Sheet5!G3:G7"` 형식).
    pub async fn operations(&self) -> Vec<String> {
        self.operations.read().await.clone()
    }

    async fn record(&self, op: &str, target: impl std::fmt::Display) {
        self.operations.write().await.push(format!("{} {}", op, target));
    }
}

fn missing_worksheet(range: &SheetRange) -> SheetsError {
    SheetsError::Api {
        status: 400,
        message: format!("Unable to parse range: {}", range),
    }
}

/// 범위가 가리키는 사각형. 워크시트 전체는 None.
fn resolve(range: &SheetRange) -> SheetsResult<Option<CellRect>> {
    range.cells().map(parse_cells).transpose()
}

/// 값이 있는 셀만 담은 사각형을 그리드로 변환. 뒤쪽 빈 셀/행은 잘림.
fn read_rect(cells: &Cells, rect: CellRect) -> DataGrid {
    let mut rows: Vec<Vec<String>> = (rect.first_row..=rect.last_row)
        .map(|r| {
            let mut row: Vec<String> = (rect.first_col..=rect.last_col)
                .map(|c| cells.get(&(r, c)).cloned().unwrap_or_default())
                .collect();
            while row.last().is_some_and(String::is_empty) {
                row.pop();
            }
            row
        })
        .collect();
    while rows.last().is_some_and(Vec::is_empty) {
        rows.pop();
    }
    DataGrid::new(rows)
}

/// 값이 있는 셀 전체를 덮는 사각형 (A1 기준).
fn used_rect(cells: &Cells) -> Option<CellRect> {
    let last_row = cells.keys().map(|(r, _)| *r).max()?;
    let last_col = cells.keys().map(|(_, c)| *c).max()?;
    Some(CellRect {
        first_row: 0,
        first_col: 0,
        last_row,
        last_col,
    })
}

fn write_grid(cells: &mut Cells, origin: (usize, usize), grid: &DataGrid) {
    for (r, row) in grid.rows().iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let key = (origin.0 + r, origin.1 + c);
            if value.is_empty() {
                cells.remove(&key);
            } else {
                cells.insert(key, value.clone());
            }
        }
    }
}

#[async_trait]
impl RangeStore for MemoryRangeStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, range: &SheetRange) -> SheetsResult<DataGrid> {
        self.record("get", range).await;
        let rect = resolve(range)?;

        let sheets = self.sheets.read().await;
        let cells = sheets
            .get(range.sheet())
            .ok_or_else(|| missing_worksheet(range))?;

        Ok(match rect.or_else(|| used_rect(cells)) {
            Some(rect) => read_rect(cells, rect),
            None => DataGrid::empty(),
        })
    }

    async fn update(&self, range: &SheetRange, grid: &DataGrid) -> SheetsResult<()> {
        self.record("update", range).await;
        let rect = resolve(range)?.unwrap_or(CellRect {
            first_row: 0,
            first_col: 0,
            last_row: 0,
            last_col: 0,
        });

        // 단일 셀 범위는 시작점으로만 쓰이고, 여러 셀 범위는 데이터를 담을 수 있어야 함
        let anchor_only = rect.rows() == 1 && rect.cols() == 1;
        if !anchor_only && (grid.len() > rect.rows() || grid.width() > rect.cols()) {
            return Err(SheetsError::Api {
                status: 400,
                message: format!(
                    "Requested writing within range [{}], but tried writing {}x{} values",
                    range,
                    grid.len(),
                    grid.width()
                ),
            });
        }

        let mut sheets = self.sheets.write().await;
        let cells = sheets
            .get_mut(range.sheet())
            .ok_or_else(|| missing_worksheet(range))?;
        write_grid(cells, (rect.first_row, rect.first_col), grid);
        debug!(range = %range, rows = grid.len(), "memory update");
        Ok(())
    }

    async fn clear(&self, range: &SheetRange) -> SheetsResult<()> {
        self.record("clear", range).await;
        let rect = resolve(range)?;

        let mut sheets = self.sheets.write().await;
        let cells = sheets
            .get_mut(range.sheet())
            .ok_or_else(|| missing_worksheet(range))?;
        match rect {
            Some(rect) => cells.retain(|&(r, c), _| !rect.contains(r, c)),
            None => cells.clear(),
        }
        Ok(())
    }

    async fn replace_worksheet(&self, worksheet: &str, grid: &DataGrid) -> SheetsResult<()> {
        self.record("replace", worksheet).await;
        let mut sheets = self.sheets.write().await;
        let cells = sheets.entry(worksheet.to_string()).or_default();
        cells.clear();
        write_grid(cells, (0, 0), grid);
        debug!(worksheet, rows = grid.len(), "memory replace");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(cells: &str) -> SheetRange {
        SheetRange::new("Sheet5", cells)
    }

    #[tokio::test]
    async fn test_update_then_get_column() {
        let store = MemoryRangeStore::with_worksheets(["Sheet5"]);
        store
            .update(&range("G3:G7"), &DataGrid::column(["1", "2", "3", "4", "5"]))
            .await
            .unwrap();

        let grid = store.get(&range("G3:G7")).await.unwrap();
        assert_eq!(grid, DataGrid::column(["1", "2", "3", "4", "5"]));
        assert_eq!(store.get(&range("G5")).await.unwrap(), DataGrid::single("3"));
    }

    #[tokio::test]
    async fn test_get_trims_trailing_empty_rows() {
        let store = MemoryRangeStore::with_worksheets(["Sheet5"]);
        store
            .update(&range("G3:G7"), &DataGrid::column(["1", "2"]))
            .await
            .unwrap();

        let grid = store.get(&range("G3:G7")).await.unwrap();
        assert_eq!(grid.len(), 2);
        assert!(store.get(&range("H3:H7")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_only_touches_range() {
        let store = MemoryRangeStore::with_worksheets(["Sheet5"]);
        store.update(&range("G1"), &DataGrid::single("13032024")).await.unwrap();
        store
            .update(&range("G3:G4"), &DataGrid::column(["1", "2"]))
            .await
            .unwrap();

        store.clear(&range("G3:G7")).await.unwrap();

        assert!(store.get(&range("G3:G7")).await.unwrap().is_empty());
        assert_eq!(store.get(&range("G1")).await.unwrap(), DataGrid::single("13032024"));
    }

    #[tokio::test]
    async fn test_missing_worksheet_is_error() {
        let store = MemoryRangeStore::new();
        let err = store.get(&range("A1")).await.unwrap_err();
        assert!(matches!(err, SheetsError::Api { status: 400, .. }));
        assert!(store.update(&range("A1"), &DataGrid::single("x")).await.is_err());
        assert!(store.clear(&range("A1")).await.is_err());
    }

    #[tokio::test]
    async fn test_oversized_write_is_rejected() {
        let store = MemoryRangeStore::with_worksheets(["Sheet5"]);
        let err = store
            .update(&range("G3:G4"), &DataGrid::column(["1", "2", "3"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SheetsError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_replace_creates_missing_worksheet() {
        let store = MemoryRangeStore::new();
        let grid = DataGrid::from(vec![
            vec!["Client Type", "Future Index Long"],
            vec!["Client", "1200"],
        ]);

        store.replace_worksheet("Sheet1", &grid).await.unwrap();

        let whole = store.get(&SheetRange::whole_sheet("Sheet1")).await.unwrap();
        assert_eq!(whole, grid);
        assert_eq!(
            store.get(&SheetRange::new("Sheet1", "A1:B1")).await.unwrap(),
            DataGrid::from(vec![vec!["Client Type", "Future Index Long"]])
        );
    }

    #[tokio::test]
    async fn test_replace_discards_previous_contents() {
        let store = MemoryRangeStore::with_worksheets(["Sheet1"]);
        store
            .update(&SheetRange::new("Sheet1", "A1:C3"), &DataGrid::from(vec![
                vec!["a", "b", "c"],
                vec!["d", "e", "f"],
                vec!["g", "h", "i"],
            ]))
            .await
            .unwrap();

        store
            .replace_worksheet("Sheet1", &DataGrid::from(vec![vec!["x"]]))
            .await
            .unwrap();

        let whole = store.get(&SheetRange::whole_sheet("Sheet1")).await.unwrap();
        assert_eq!(whole, DataGrid::single("x"));
    }

    #[tokio::test]
    async fn test_operations_are_recorded_in_order() {
        let store = MemoryRangeStore::with_worksheets(["Sheet5"]);
        store.get(&range("G3:G7")).await.unwrap();
        store.clear(&range("G3:G7")).await.unwrap();

        assert_eq!(
            store.operations().await,
            vec!["get Sheet5!G3:G7".to_string(), "clear Sheet5!G3:G7".to_string()]
        );
    }
}
