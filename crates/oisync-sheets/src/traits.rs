//! 범위 저장소 trait 정의.

use async_trait::async_trait;
use oisync_core::{DataGrid, SheetRange};

use crate::SheetsResult;

/// 범위 주소 기반 스프레드시트 저장소.
///
/// 모든 호출은 독립적으로 성공/실패하며 여러 호출을 묶는 원자성은 없습니다.
#[async_trait]
pub trait RangeStore: Send + Sync {
    /// 저장소 이름 반환 (로그용).
    fn name(&self) -> &str;

    /// 범위의 셀 값을 읽습니다.
    ///
    /// 비어 있는 범위는 빈 그리드를 반환하며, 뒤쪽 빈 셀/행은 잘릴 수 있습니다.
    async fn get(&self, range: &SheetRange) -> SheetsResult<DataGrid>;

    /// 범위의 왼쪽 위 셀부터 그리드를 기록합니다.
    ///
    /// 값은 사용자가 입력한 것처럼 해석됩니다 (숫자 문자열 → 숫자).
    async fn update(&self, range: &SheetRange, grid: &DataGrid) -> SheetsResult<()>;

    /// 범위의 값을 모두 지웁니다.
    async fn clear(&self, range: &SheetRange) -> SheetsResult<()>;

    /// 워크시트 내용을 그리드로 완전히 교체합니다.
    ///
    /// 워크시트가 없으면 그리드 크기로 생성한 뒤 `A1`부터 기록합니다.
    async fn replace_worksheet(&self, worksheet: &str, grid: &DataGrid) -> SheetsResult<()>;
}
