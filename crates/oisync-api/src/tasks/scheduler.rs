//! 증분 흐름 cron 스케줄러.
//!
//! 설정된 cron 식(초 포함 6필드)을 설정된 타임존에서 평가하여
//! 웹훅과 같은 `FlowGuard`를 거쳐 증분 흐름을 실행합니다.
//! 흐름이 이미 실행 중이면 이번 회차는 건너뜁니다. 결과는 로그로만 남습니다.

use std::sync::Arc;

use chrono::Utc;
use oisync_core::{parse_timezone, CoreError, Flow, ScheduleConfig, SyncResult};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::state::AppState;

/// 스케줄러 구성 에러.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Invalid schedule timezone: {0}")]
    Timezone(#[from] CoreError),

    #[error("Scheduler error for cron '{cron}': {source}")]
    Job {
        cron: String,
        #[source]
        source: JobSchedulerError,
    },
}

/// 예약 회차 1회 실행.
///
/// 흐름이 실행 중이면 `None`을 반환합니다.
pub async fn run_scheduled_sync(state: &AppState) -> Option<SyncResult> {
    let Some(_permit) = state.guard.try_acquire(Flow::SyncToday) else {
        warn!(flow = %Flow::SyncToday, "Scheduled run skipped: flow already running");
        return None;
    };

    info!("Scheduled sync_today run started");
    let result = state.orchestrator.run_sync_today(Utc::now()).await;
    if result.is_success() {
        info!(detail = %result.detail, "Scheduled sync_today run finished");
    } else {
        error!(detail = %result.detail, "Scheduled sync_today run failed");
    }
    Some(result)
}

/// 증분 흐름 스케줄러 시작.
///
/// `schedule.enabled`가 false면 아무것도 시작하지 않고 `None`을 반환합니다.
/// 반환된 핸들은 `shutdown_token`이 취소되면 스케줄러를 정지하고 종료합니다.
pub async fn start_sync_scheduler(
    state: Arc<AppState>,
    config: &ScheduleConfig,
    shutdown_token: CancellationToken,
) -> Result<Option<JoinHandle<()>>, SchedulerError> {
    if !config.enabled {
        info!("Sync scheduler disabled");
        return Ok(None);
    }

    let timezone = parse_timezone(&config.timezone)?;
    let job_error = |source: JobSchedulerError| SchedulerError::Job {
        cron: config.cron.clone(),
        source,
    };

    let mut scheduler = JobScheduler::new().await.map_err(job_error)?;
    let job = Job::new_async_tz(config.cron.as_str(), timezone, move |_uuid, _lock| {
        let state = state.clone();
        Box::pin(async move {
            run_scheduled_sync(&state).await;
        })
    })
    .map_err(job_error)?;
    scheduler.add(job).await.map_err(job_error)?;
    scheduler.start().await.map_err(job_error)?;

    info!(cron = %config.cron, timezone = %timezone, "Sync scheduler started");

    let handle = tokio::spawn(async move {
        shutdown_token.cancelled().await;
        if let Err(e) = scheduler.shutdown().await {
            warn!(error = %e, "Failed to stop sync scheduler cleanly");
        }
        info!("Sync scheduler stopped");
    });

    Ok(Some(handle))
}
