//! 시트 범위 주소 (`<sheet>!<A1 range>`).
//!
//! 코어는 범위를 생성만 하고 해석하지 않습니다. 범위 해석은 RangeStore 구현의 몫입니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 워크시트 이름과 A1 표기 셀 범위.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetRange {
    sheet: String,
    cells: Option<String>,
}

impl SheetRange {
    /// 워크시트와 셀 범위로 생성 (예: `("Sheet5", "G3:G7")`).
    pub fn new(sheet: impl Into<String>, cells: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            cells: Some(cells.into()),
        }
    }

    /// 워크시트 전체를 가리키는 범위.
    pub fn whole_sheet(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            cells: None,
        }
    }

    /// 워크시트 이름.
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// 셀 범위 (워크시트 전체면 None).
    pub fn cells(&self) -> Option<&str> {
        self.cells.as_deref()
    }

    /// A1 표기에서 쓰이는 워크시트 이름 (필요 시 작은따옴표로 감쌈).
    pub fn quoted_sheet(&self) -> String {
        quote_sheet_name(&self.sheet)
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cells {
            Some(cells) => write!(f, "{}!{}", self.quoted_sheet(), cells),
            None => write!(f, "{}", self.quoted_sheet()),
        }
    }
}

/// 영숫자/밑줄 이외 문자가 있거나 숫자로 시작하면 작은따옴표로 감쌈.
pub fn quote_sheet_name(name: &str) -> String {
    let plain = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());

    if plain {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// 0 기반 열 인덱스를 열 문자로 변환 (0 → A, 26 → AA).
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// 단일 셀 주소 (예: `G3`).
pub fn cell_ref(column: &str, row: u32) -> String {
    format!("{}{}", column, row)
}

/// 한 열의 연속 행 범위 (예: `G3:G7`). 한 행이면 단일 셀 주소.
pub fn column_span(column: &str, first_row: u32, rows: u32) -> String {
    if rows <= 1 {
        return cell_ref(column, first_row);
    }
    format!(
        "{}{}:{}{}",
        column,
        first_row,
        column,
        first_row + rows - 1
    )
}

/// 사각 블록 범위 (예: `A1:F7`).
pub fn block_span(first_column: &str, last_column: &str, first_row: u32, last_row: u32) -> String {
    format!("{}{}:{}{}", first_column, first_row, last_column, last_row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_plain_sheet() {
        let range = SheetRange::new("Sheet5", "G3:G7");
        assert_eq!(range.to_string(), "Sheet5!G3:G7");
        assert_eq!(SheetRange::whole_sheet("Sheet1").to_string(), "Sheet1");
    }

    #[test]
    fn test_display_quotes_special_names() {
        assert_eq!(SheetRange::new("FII Data", "A1").to_string(), "'FII Data'!A1");
        assert_eq!(SheetRange::new("O'Neil", "A1").to_string(), "'O''Neil'!A1");
        assert_eq!(SheetRange::whole_sheet("2024").to_string(), "'2024'");
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(6), "G");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_spans() {
        assert_eq!(column_span("G", 3, 5), "G3:G7");
        assert_eq!(column_span("G", 1, 1), "G1");
        assert_eq!(block_span("A", "F", 1, 7), "A1:F7");
        assert_eq!(cell_ref("H", 4), "H4");
    }
}
