//! A1 표기 범위 해석.

use oisync_core::SheetRange;

use crate::error::{SheetsError, SheetsResult};

/// 0 기반, 양끝 포함 셀 사각형.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub first_row: usize,
    pub first_col: usize,
    pub last_row: usize,
    pub last_col: usize,
}

impl CellRect {
    /// 행 수.
    pub fn rows(&self) -> usize {
        self.last_row - self.first_row + 1
    }

    /// 열 수.
    pub fn cols(&self) -> usize {
        self.last_col - self.first_col + 1
    }

    /// 셀이 사각형 안에 있는지 확인.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }
}

/// 열 문자를 0 기반 인덱스로 변환 (A → 0, AA → 26).
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters
        .chars()
        .try_fold(0usize, |acc, c| {
            let c = c.to_ascii_uppercase();
            if !c.is_ascii_uppercase() {
                return None;
            }
            acc.checked_mul(26)?
                .checked_add(c as usize - 'A' as usize + 1)
        })
        .map(|n| n - 1)
}

fn parse_cell(cell: &str) -> Option<(usize, usize)> {
    let split = cell.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell.split_at(split);
    let col = column_index(letters)?;
    let row: usize = digits.parse().ok()?;
    (row >= 1).then_some((row - 1, col))
}

/// `G3`, `G3:G7` 형식의 셀 범위를 해석합니다.
pub fn parse_cells(cells: &str) -> SheetsResult<CellRect> {
    let invalid = || SheetsError::InvalidRange(cells.to_string());
    let mut parts = cells.trim().split(':');

    let start = parts.next().and_then(parse_cell).ok_or_else(invalid)?;
    let end = match parts.next() {
        Some(part) => parse_cell(part).ok_or_else(invalid)?,
        None => start,
    };
    if parts.next().is_some() {
        return Err(invalid());
    }

    Ok(CellRect {
        first_row: start.0.min(end.0),
        first_col: start.1.min(end.1),
        last_row: start.0.max(end.0),
        last_col: start.1.max(end.1),
    })
}

/// `Sheet5!G3:G7`, `'Daily OI'!A1` 형식의 범위를 해석합니다.
///
/// 워크시트 이름이 없으면 `default_sheet`를 사용합니다.
pub fn parse_range(text: &str, default_sheet: Option<&str>) -> SheetsResult<SheetRange> {
    let invalid = || SheetsError::InvalidRange(text.to_string());
    let text = text.trim();

    let (sheet, cells) = match text.rfind('!') {
        Some(idx) => {
            let (sheet, cells) = (&text[..idx], &text[idx + 1..]);
            let sheet = match sheet.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
                Some(quoted) => quoted.replace("''", "'"),
                None => sheet.to_string(),
            };
            (sheet, cells)
        }
        None => (default_sheet.ok_or_else(invalid)?.to_string(), text),
    };

    if sheet.is_empty() {
        return Err(invalid());
    }
    parse_cells(cells)?;
    Ok(SheetRange::new(sheet, cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oisync_core::column_letter;

    #[test]
    fn test_column_index_round_trips_letters() {
        assert_eq!(column_index("A"), Some(0));
        assert_eq!(column_index("g"), Some(6));
        assert_eq!(column_index("AA"), Some(26));
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A1"), None);
        for idx in [0, 7, 25, 26, 51, 701, 702] {
            assert_eq!(column_index(&column_letter(idx)), Some(idx));
        }
    }

    #[test]
    fn test_parse_single_cell() {
        let rect = parse_cells("G1").unwrap();
        assert_eq!((rect.first_row, rect.first_col), (0, 6));
        assert_eq!((rect.rows(), rect.cols()), (1, 1));
    }

    #[test]
    fn test_parse_column_span() {
        let rect = parse_cells("G3:G7").unwrap();
        assert_eq!(rect.first_row, 2);
        assert_eq!(rect.last_row, 6);
        assert_eq!(rect.rows(), 5);
        assert!(rect.contains(4, 6));
        assert!(!rect.contains(4, 7));
    }

    #[test]
    fn test_parse_normalizes_reversed_corners() {
        assert_eq!(parse_cells("F7:A1").unwrap(), parse_cells("A1:F7").unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "G", "3", "G0", "G3:G", "A1:B2:C3", "!A1"] {
            assert!(parse_cells(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_overlong_column_letters_are_rejected() {
        assert_eq!(column_index("AAAAAAAAAAAAAAA"), None);
        assert!(parse_cells("AAAAAAAAAAAAAAA1").is_err());
        assert!(parse_range("AAAAAAAAAAAAAAA1", Some("Sheet5")).is_err());
    }

    #[test]
    fn test_parse_range_with_sheet_prefix() {
        let range = parse_range("Sheet5!G3:G7", None).unwrap();
        assert_eq!(range, SheetRange::new("Sheet5", "G3:G7"));

        let range = parse_range("'Daily OI'!A1", None).unwrap();
        assert_eq!(range.sheet(), "Daily OI");
        assert_eq!(range.to_string(), "'Daily OI'!A1");
    }

    #[test]
    fn test_parse_range_falls_back_to_default_sheet() {
        let range = parse_range("C1", Some("Sheet5")).unwrap();
        assert_eq!(range, SheetRange::new("Sheet5", "C1"));
        assert!(parse_range("C1", None).is_err());
        assert!(parse_range("!C1", Some("Sheet5")).is_err());
    }
}
