//! 범위 주소 기반 스프레드시트 저장소.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - RangeStore trait: get / update / clear / replace_worksheet
//! - Google Sheets API v4 클라이언트
//! - 서비스 계정 JWT 기반 토큰 발급 및 캐싱
//! - 로컬 드라이런과 테스트용 메모리 저장소
//! - A1 범위 해석

pub mod a1;
pub mod auth;
pub mod error;
pub mod google;
pub mod memory;
pub mod traits;

pub use a1::{column_index, parse_cells, parse_range, CellRect};
pub use auth::{ServiceAccountAuth, ServiceAccountKey, StaticToken, TokenSource};
pub use error::*;
pub use google::GoogleSheetsStore;
pub use memory::MemoryRangeStore;
pub use traits::*;
