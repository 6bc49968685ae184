//! Standalone sync collector CLI.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tusync_collector::{modules, CollectorConfig};
use tusync_data::storage::{connect, run_migrations};
use tusync_data::{RateLimiter, SyncLedger, TushareClient};

#[derive(Parser)]
#[command(name = "tusync-collector")]
#[command(about = "TuSync Market Data Collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 스키마 마이그레이션 적용
    Migrate,

    /// 기초 데이터 전량 동기화 (종목 목록 → 주주 명단 → 핫머니 명부)
    SyncBase,

    /// 단일 거래일 동기화 (기본: 오늘)
    SyncDaily {
        /// 거래일 (YYYYMMDD)
        #[arg(long)]
        date: Option<String>,

        /// 특정 종목만 동기화 (쉼표로 구분, 예: "000001.SZ,600000.SH")
        #[arg(long)]
        codes: Option<String>,
    },

    /// 날짜 범위 동기화
    SyncRange {
        /// 시작일 (YYYYMMDD)
        #[arg(long)]
        start: String,

        /// 종료일 (YYYYMMDD)
        #[arg(long)]
        end: String,

        /// 특정 종목만 동기화 (쉼표로 구분)
        #[arg(long)]
        codes: Option<String>,
    },

    /// 블록 명부 + 구성 종목 동기화 (THS/DC)
    SyncBoards {
        /// DC 명부 스냅샷 날짜 (YYYYMMDD)
        #[arg(long)]
        date: Option<String>,
    },

    /// 최근 실패한 동기화 단위 조회
    Failures {
        /// 최대 조회 건수
        #[arg(long, default_value = "50")]
        limit: i64,
    },

    /// 데몬 모드: 주기적으로 당일 동기화 실행
    Daemon,
}

/// 쉼표로 구분된 종목 코드 파싱.
fn parse_codes(codes: Option<String>) -> Option<Vec<String>> {
    codes.map(|s| {
        s.split(',')
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect()
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("tusync_collector={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("TuSync Data Collector 시작");

    // 설정 로드
    let config = CollectorConfig::from_env()?;
    tracing::debug!(database_url = %config.database_url, "설정 로드 완료");

    // DB 연결
    let pool = connect(&config.database_url).await?;
    tracing::info!("데이터베이스 연결 성공");

    // 클라이언트 구성 (제한기 인스턴스 하나를 주입)
    let limiter = Arc::new(RateLimiter::new(
        config.tushare.max_calls_per_min,
        config.tushare.rate_period(),
    ));
    let client = TushareClient::new(&config.tushare, limiter)?;

    // 명령 실행
    match cli.command {
        Commands::Migrate => {
            run_migrations(&pool).await?;
        }
        Commands::SyncBase => {
            let summary = modules::sync_base_data(&pool, &client).await?;
            tracing::info!(total_rows = summary.total_rows, "기초 데이터 동기화 결과");
        }
        Commands::SyncDaily { date, codes } => {
            let date = date.unwrap_or_else(tusync_core::date::today);
            let codes = parse_codes(codes);
            let summary =
                modules::sync_daily_by_date(&pool, &client, &date, codes.as_deref()).await?;
            tracing::info!(
                date,
                total_rows = summary.total_rows,
                skipped = summary.skipped,
                "일별 동기화 결과"
            );
        }
        Commands::SyncRange { start, end, codes } => {
            let codes = parse_codes(codes);
            let summary =
                modules::sync_daily_by_range(&pool, &client, &start, &end, codes.as_deref())
                    .await?;
            tracing::info!(
                start,
                end,
                synced_dates = summary.synced_dates,
                total_rows = summary.total_rows,
                "기간 동기화 결과"
            );
        }
        Commands::SyncBoards { date } => {
            let ths = modules::sync_ths_boards(&pool, &client).await?;
            tracing::info!(total_rows = ths.total_rows, "THS 블록 동기화 결과");

            let dc = modules::sync_dc_boards(&pool, &client, date.as_deref()).await?;
            tracing::info!(total_rows = dc.total_rows, "DC 블록 동기화 결과");
        }
        Commands::Failures { limit } => {
            let ledger = SyncLedger::new(pool.clone());
            let failures = ledger.failures(limit).await?;
            for record in &failures {
                tracing::warn!(
                    trade_date = %record.trade_date,
                    sync_type = %record.sync_type,
                    error = record.error_msg.as_deref().unwrap_or(""),
                    "실패한 동기화 단위"
                );
            }
            tracing::info!(count = failures.len(), "실패 단위 조회 완료");
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.daemon.interval_minutes
            );

            let mut interval = tokio::time::interval(config.daemon.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        let date = tusync_core::date::today();
                        tracing::info!(date, "=== 당일 동기화 실행 시작 ===");

                        match modules::sync_daily_by_date(&pool, &client, &date, None).await {
                            Ok(summary) => {
                                tracing::info!(
                                    total_rows = summary.total_rows,
                                    skipped = summary.skipped,
                                    "당일 동기화 완료"
                                );
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "당일 동기화 실패");
                            }
                        }

                        tracing::info!(
                            "=== 다음 실행: {}분 후 ===",
                            config.daemon.interval_minutes
                        );
                    }
                }
            }
        }
    }

    pool.close().await;
    tracing::info!("TuSync Data Collector 종료");

    Ok(())
}
