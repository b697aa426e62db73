//! 동기화 흐름 조합.
//!
//! 두 가지 흐름을 제공합니다:
//! - **snapshot**: 가져오기 → 스냅샷 추출 → 워크시트 전체 교체
//! - **sync_today**: 가져오기 → 히스토리 시프트 3회 → 증분 추출 → 셀 단위 쓰기 → 날짜 셀 쓰기
//!
//! 모든 실패는 이 경계에서 `SyncResult { status: "error" }`로 변환됩니다.
//! 시프트 이후의 실패는 되돌리지 않으며, 다음 성공 실행이 상태를 바로잡습니다.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use oisync_core::{
    AppConfig, BusinessDate, BusinessDateResolver, DataGrid, DeltaLayout, Flow, SheetRange,
    SyncResult, DELTA_LAYOUT, SNAPSHOT_PROJECTION,
};
use oisync_sheets::RangeStore;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::SyncOutcome;
use crate::extractor::{parse_grid, TableExtractor};
use crate::fetcher::{SourceFetcher, StagedFile};
use crate::report::SyncReport;
use crate::shifter::HistoryShifter;

/// 동기화 오케스트레이터.
pub struct SyncOrchestrator {
    resolver: BusinessDateResolver,
    fetcher: SourceFetcher,
    extractor: TableExtractor,
    shifter: HistoryShifter,
    store: Arc<dyn RangeStore>,
    layout: DeltaLayout,
    snapshot_worksheet: String,
    delta_worksheet: String,
}

impl SyncOrchestrator {
    /// 설정과 저장소로 생성.
    pub fn from_config(config: &AppConfig, store: Arc<dyn RangeStore>) -> SyncOutcome<Self> {
        Ok(Self {
            resolver: config.business_date.resolver()?,
            fetcher: SourceFetcher::new(config.source.clone())?,
            extractor: TableExtractor::new(&config.extraction),
            shifter: HistoryShifter::new(store.clone()),
            store,
            layout: DELTA_LAYOUT,
            snapshot_worksheet: config.sheets.snapshot_worksheet.clone(),
            delta_worksheet: config.sheets.delta_worksheet.clone(),
        })
    }

    pub fn resolver(&self) -> &BusinessDateResolver {
        &self.resolver
    }

    pub fn shifter(&self) -> &HistoryShifter {
        &self.shifter
    }

    pub fn store(&self) -> &Arc<dyn RangeStore> {
        &self.store
    }

    /// 전체 교체 흐름 실행.
    pub async fn run_snapshot(&self, now: DateTime<Utc>) -> SyncResult {
        self.run(Flow::Snapshot, now).await
    }

    /// 증분 흐름 실행.
    pub async fn run_sync_today(&self, now: DateTime<Utc>) -> SyncResult {
        self.run(Flow::SyncToday, now).await
    }

    /// 흐름을 실행하고 결과를 SyncResult로 변환합니다.
    pub async fn run(&self, flow: Flow, now: DateTime<Utc>) -> SyncResult {
        let run_id = Uuid::new_v4();
        let span = info_span!("sync_flow", flow = %flow, run_id = %run_id);

        async move {
            let started = Instant::now();
            let date = self.resolver.resolve(now);
            info!(business_date = %date, "Sync flow started");

            let outcome = match flow {
                Flow::Snapshot => self.try_snapshot(run_id, date).await,
                Flow::SyncToday => self.try_sync_today(run_id, date).await,
            };

            match outcome {
                Ok(mut report) => {
                    report.elapsed = started.elapsed();
                    report.log_summary();
                    report.to_result()
                }
                Err(e) => {
                    error!(stage = e.stage(), business_date = %date, "Sync flow failed: {}", e);
                    if e.is_auth_error() {
                        warn!("Spreadsheet rejected the credentials; check sheets.credentials_path and sharing");
                    }
                    SyncResult::error(e.to_string())
                        .with_flow(flow)
                        .with_business_date(date.identifier())
                        .with_run_id(run_id)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn fetch(&self, report: &mut SyncReport) -> SyncOutcome<StagedFile> {
        let staged = self.fetcher.fetch(report.business_date).await?;
        report.staged_file = Some(staged.path.clone());
        report.bytes_fetched = staged.bytes_written;
        Ok(staged)
    }

    /// 가져오기 → 스냅샷 추출 → 워크시트 교체.
    pub async fn try_snapshot(
        &self,
        run_id: Uuid,
        date: BusinessDate,
    ) -> SyncOutcome<SyncReport> {
        let mut report = SyncReport::new(run_id, Flow::Snapshot, date, &self.snapshot_worksheet);

        let staged = self.fetch(&mut report).await?;
        let grid = parse_grid(&staged.read().await?)?;
        let snapshot = self.extractor.extract_snapshot(&grid)?;

        self.store
            .replace_worksheet(&self.snapshot_worksheet, &snapshot)
            .await?;

        let block = SNAPSHOT_PROJECTION.destination_block(1, snapshot.len() as u32);
        report.range = Some(SheetRange::new(&self.snapshot_worksheet, block).to_string());
        report.rows_written = snapshot.len().saturating_sub(1);
        report.cells_written = snapshot.filled_cells();
        info!(
            worksheet = %self.snapshot_worksheet,
            range = report.range.as_deref().unwrap_or_default(),
            rows = report.rows_written,
            "Data updated successfully"
        );
        Ok(report)
    }

    /// 가져오기 → 시프트 → 증분 추출 → 라이브 셀 쓰기 → 날짜 셀 쓰기.
    ///
    /// 가져오기가 실패하면 시트를 건드리지 않습니다. 세 시프트가 모두 끝난 뒤에만
    /// 새 값을 씁니다.
    pub async fn try_sync_today(
        &self,
        run_id: Uuid,
        date: BusinessDate,
    ) -> SyncOutcome<SyncReport> {
        let sheet = self.delta_worksheet.as_str();
        let mut report = SyncReport::new(run_id, Flow::SyncToday, date, sheet);

        // 시프트 중에 다른 흐름이 같은 스테이징 파일을 덮어쓸 수 있으므로 먼저 읽어 둠
        let staged = self.fetch(&mut report).await?;
        let bytes = staged.read().await?;

        for (from, to) in self.layout.shift_pairs() {
            let outcome = self
                .shifter
                .shift(&SheetRange::new(sheet, from), &SheetRange::new(sheet, to))
                .await?;
            info!(
                from = %outcome.from,
                to = %outcome.to,
                cells_moved = outcome.cells_moved,
                "History shifted"
            );
            report.shifts.push(outcome);
        }

        let grid = parse_grid(&bytes)?;
        let delta = self.extractor.extract_delta(&grid)?;

        for row in 0..delta.window_len() {
            for (col, values) in delta.columns().iter().enumerate() {
                let Some(cell) = self.layout.live_cell(col, row) else {
                    continue;
                };
                let value = values.get(row).cloned().unwrap_or_default();
                self.store
                    .update(&SheetRange::new(sheet, cell), &DataGrid::single(value))
                    .await?;
                report.cells_written += 1;
            }
            report.rows_written += 1;
        }

        self.store
            .update(
                &SheetRange::new(sheet, self.layout.date_cell()),
                &DataGrid::single(date.identifier()),
            )
            .await?;
        report.cells_written += 1;

        info!(
            worksheet = sheet,
            business_date = %date,
            cells = report.cells_written,
            "Today's values written"
        );
        Ok(report)
    }
}
