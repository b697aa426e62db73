//! 도메인 모델.

pub mod business_date;
pub mod grid;
pub mod projection;
pub mod range;
pub mod sync_result;

pub use business_date::{
    parse_cutoff, parse_timezone, BusinessDate, BusinessDateResolver, DEFAULT_CUTOFF,
    DEFAULT_TIMEZONE,
};
pub use grid::DataGrid;
pub use projection::{
    ColumnProjection, DeltaLayout, DELTA_LAYOUT, DELTA_PROJECTION, SNAPSHOT_PROJECTION,
};
pub use range::{block_span, cell_ref, column_letter, column_span, quote_sheet_name, SheetRange};
pub use sync_result::{Flow, SyncResult, SyncStatus};
