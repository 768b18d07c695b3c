//! `sylogd` 데몬 -- 메인 엔트리 포인트.
//!
//! UDP syslog 수신, 버퍼링, 월별 SQLite 파티션 적재를 수행하는 인제스트
//! 파이프라인을 구동한다.
//!
//! # 사용법
//!
//! ```text
//! sylogd --config /etc/sylogd/sylogd.toml
//! sylogd --validate    # 설정만 검증하고 종료
//! sylogd --log-level debug --log-format pretty
//! ```

mod cli;
mod health;
mod logging;
mod metrics_server;
mod orchestrator;

use anyhow::Result;
use clap::Parser;
use sylogd_core::config::AppConfig;

use crate::cli::DaemonCli;
use crate::orchestrator::Orchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    let (config_path, explicit) = match cli.config.clone() {
        Some(path) => (path, true),
        None => AppConfig::discover_path(),
    };

    let mut config = AppConfig::load_from(&config_path, explicit)
        .await
        .map_err(|e| {
            anyhow::anyhow!("failed to load config from {}: {}", config_path.display(), e)
        })?;

    if let Some(ref level) = cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.general.log_format = format.clone();
    }
    if let Some(ref pid_file) = cli.pid_file {
        config.general.pid_file = pid_file.clone();
    }

    if cli.validate {
        match config.validate() {
            Ok(()) => {
                // tracing이 아직 초기화되지 않았을 수 있으니 최소 구독자를 먼저 세운다.
                let _guard = tracing_subscriber::fmt().with_env_filter("info").try_init();
                tracing::info!("configuration is valid");
                return Ok(());
            }
            Err(e) => {
                return Err(anyhow::anyhow!("configuration validation failed: {}", e));
            }
        }
    }

    logging::init_tracing(&config.general)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_path = %config_path.display(),
        "sylogd starting"
    );

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
    }

    let mut orchestrator = Orchestrator::build_from_config(config).await?;
    orchestrator.run().await?;

    tracing::info!("sylogd shut down cleanly");
    Ok(())
}
