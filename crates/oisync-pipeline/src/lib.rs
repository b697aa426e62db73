//! 일별 참가자 OI 파일 동기화 파이프라인.
//!
//! 이 crate는 다음을 제공합니다:
//! - 원격 소스 파일 다운로드와 스테이징
//! - 스냅샷/증분 프로젝션 추출
//! - 히스토리 시프트 프로토콜
//! - 두 동기화 흐름의 오케스트레이션과 흐름별 단일 실행 보장
//! - `oisync` CLI

pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod guard;
pub mod orchestrator;
pub mod report;
pub mod shifter;
pub mod store;

pub use error::{ExtractionError, FetchError, ShiftError, SyncError, SyncOutcome};
pub use extractor::{parse_grid, DeltaColumns, TableExtractor, METADATA_ROWS};
pub use fetcher::{SourceFetcher, StagedFile};
pub use guard::{FlowGuard, FlowPermit};
pub use orchestrator::SyncOrchestrator;
pub use report::SyncReport;
pub use shifter::{HistoryShifter, ShiftOutcome, ShiftPlan, ShiftStep};
pub use store::build_store;
