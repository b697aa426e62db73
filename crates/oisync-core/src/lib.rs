//! # OI Sync Core
//!
//! 일별 참가자 미결제약정(OI) 파일을 스프레드시트로 동기화하는 시스템의
//! 핵심 타입을 제공합니다:
//! - 영업일(BusinessDate) 계산 및 컷오프 규칙
//! - 데이터 그리드와 컬럼 프로젝션
//! - 시트 범위 주소
//! - 동기화 결과 레코드
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
