//! 백그라운드 태스크 모듈.
//!
//! - 증분 흐름 스케줄러: cron 식에 따라 sync_today 흐름 실행

pub mod scheduler;

pub use scheduler::{run_scheduled_sync, start_sync_scheduler, SchedulerError};
