//! OI sheet sync CLI.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use oisync_core::{init_logging, AppConfig, Flow, LogConfig, SyncResult};
use oisync_pipeline::{build_store, HistoryShifter, SyncOrchestrator};
use oisync_sheets::parse_range;

#[derive(Parser)]
#[command(name = "oisync")]
#[command(about = "Participant OI file to spreadsheet sync", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로 (기본: $OISYNC_CONFIG 또는 config/oisync.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 현재 영업일 출력 (DDMMYYYY)
    ResolveDate,

    /// 전체 교체 흐름 1회 실행
    Snapshot,

    /// 증분 흐름 1회 실행
    SyncToday,

    /// 셀 하나 읽기
    ReadCell {
        /// 워크시트 (기본: 증분 워크시트)
        #[arg(long)]
        sheet: Option<String>,
        /// A1 셀 주소 (예: "G1", "Sheet5!G1")
        #[arg(long)]
        cell: String,
    },

    /// 범위 하나를 히스토리 시프트
    Shift {
        /// 워크시트 (기본: 증분 워크시트)
        #[arg(long)]
        sheet: Option<String>,
        /// 원본 범위 (예: "G3:G7")
        #[arg(long)]
        from: String,
        /// 대상 범위 (예: "C3:C7")
        #[arg(long)]
        to: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path),
        None => AppConfig::load_default(),
    };
    config.context("Failed to load configuration")
}

fn print_result(result: &SyncResult) -> anyhow::Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_flow(config: &AppConfig, flow: Flow) -> anyhow::Result<ExitCode> {
    let store = build_store(&config.sheets).context("Failed to create sheet store")?;
    let orchestrator = SyncOrchestrator::from_config(config, store)?;

    tracing::info!(flow = %flow, "OI sync 실행");
    let result = orchestrator.run(flow, Utc::now()).await;
    print_result(&result)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let mut log_config = LogConfig::from_settings(&config.logging);
    if let Some(level) = &cli.log_level {
        log_config.level = level.clone();
    }
    init_logging(log_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::ResolveDate => {
            let resolver = config.business_date.resolver()?;
            println!("{}", resolver.resolve_now());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Snapshot => run_flow(&config, Flow::Snapshot).await,
        Commands::SyncToday => run_flow(&config, Flow::SyncToday).await,
        Commands::ReadCell { sheet, cell } => {
            let sheet = sheet.unwrap_or_else(|| config.sheets.delta_worksheet.clone());
            let range = parse_range(&cell, Some(&sheet))?;
            let store = build_store(&config.sheets).context("Failed to create sheet store")?;

            let grid = store
                .get(&range)
                .await
                .with_context(|| format!("Failed to read {}", range))?;
            println!("Value at {}: '{}'", range, grid.cell(0, 0));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Shift { sheet, from, to } => {
            let sheet = sheet.unwrap_or_else(|| config.sheets.delta_worksheet.clone());
            let from = parse_range(&from, Some(&sheet))?;
            let to = parse_range(&to, Some(&sheet))?;
            let store = build_store(&config.sheets).context("Failed to create sheet store")?;

            let outcome = HistoryShifter::new(store).shift(&from, &to).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
