//! 파이프라인 오케스트레이션 -- 조립, 생명주기 관리, graceful shutdown.
//!
//! [`Orchestrator`]는 `sylogd` 데몬의 중심 조정자다. 설정을 로드하고,
//! 인제스트 파이프라인을 빌드하며, 시작/종료 순서를 관리하고 메인
//! 이벤트 루프를 실행한다.
//!
//! 원형은 이 자리에서 eBPF 엔진 → 로그 파이프라인 → SBOM 스캐너 →
//! 컨테이너 가드 순으로 여러 모듈을 기동/정지했다. 이 저장소는 모듈이
//! 하나(인제스트 파이프라인)뿐이므로 순서 문제는 사라졌지만, PID 파일
//! 관리와 시그널 대기 루프는 원형 그대로 유지한다.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use sylogd_core::config::AppConfig;
use sylogd_core::pipeline::Pipeline;
use sylogd_ingest::IngestPipeline;

use crate::health::{aggregate_status, DaemonHealth, ModuleHealth};

/// 데몬 메인 오케스트레이터.
///
/// 설정 로딩, 인제스트 파이프라인 생명주기, 헬스 모니터링, graceful
/// shutdown의 전체 흐름을 관리한다.
pub struct Orchestrator {
    config: AppConfig,
    pipeline: IngestPipeline,
    start_time: Instant,
}

impl Orchestrator {
    /// 설정 파일을 로드하고 오케스트레이터를 빌드한다.
    pub async fn build(config_path: &Path) -> Result<Self> {
        let config = AppConfig::load_from(config_path, true)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
        Self::build_from_config(config).await
    }

    /// 이미 로드된 설정으로부터 빌드한다. 테스트나 이미 로딩이 끝난
    /// 경우에 쓴다.
    pub async fn build_from_config(config: AppConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        let runtime_config = sylogd_ingest::config::IngestRuntimeConfig::from_core(
            &config.ingest,
            &config.database.sqlite.database,
        );
        let pipeline = IngestPipeline::new(runtime_config)
            .map_err(|e| anyhow::anyhow!("failed to initialize ingest pipeline: {}", e))?;

        tracing::info!("orchestrator initialized");

        Ok(Self {
            config,
            pipeline,
            start_time: Instant::now(),
        })
    }

    /// 파이프라인을 시작하고 메인 이벤트 루프에 진입한다.
    ///
    /// `SIGTERM`(systemd, Docker, `kill`) 또는 `SIGINT`(Ctrl+C)를 받을
    /// 때까지 블록한다.
    pub async fn run(&mut self) -> Result<()> {
        if !self.config.general.pid_file.is_empty() {
            let path = Path::new(&self.config.general.pid_file);
            write_pid_file(path)?;
        }

        tracing::info!("starting ingest pipeline");
        if let Err(e) = self.pipeline.start().await {
            if !self.config.general.pid_file.is_empty() {
                remove_pid_file(Path::new(&self.config.general.pid_file));
            }
            return Err(anyhow::anyhow!("failed to start ingest pipeline: {}", e));
        }

        tracing::info!("entering main event loop");
        let signal = wait_for_shutdown_signal().await?;
        tracing::info!(signal = signal, "shutdown signal received");

        self.shutdown().await?;

        if !self.config.general.pid_file.is_empty() {
            remove_pid_file(Path::new(&self.config.general.pid_file));
        }

        Ok(())
    }

    /// 파이프라인을 graceful하게 정지한다.
    async fn shutdown(&mut self) -> Result<()> {
        tracing::info!("stopping ingest pipeline");
        self.pipeline
            .stop()
            .await
            .map_err(|e| anyhow::anyhow!("failed to stop ingest pipeline: {}", e))
    }

    /// 현재 집계된 헬스 상태를 반환한다.
    pub async fn health(&self) -> DaemonHealth {
        let status = self.pipeline.health_check().await;
        let modules = vec![ModuleHealth {
            name: "ingest".to_owned(),
            enabled: self.config.ingest.enabled,
            status,
        }];
        let overall_status = aggregate_status(&modules);
        let uptime_secs = self.start_time.elapsed().as_secs();

        DaemonHealth {
            status: overall_status,
            uptime_secs,
            modules,
        }
    }

    /// 로드된 설정에 대한 참조.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// 종료 시그널(`SIGTERM` 또는 `SIGINT`)을 기다린다. 발화한 시그널의
/// 이름을 반환한다.
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// 현재 프로세스의 PID를 파일에 기록한다. 중복 인스턴스 실행을 막는다.
fn write_pid_file(path: &Path) -> Result<()> {
    use std::fs::{self, OpenOptions};
    use std::io::{ErrorKind, Write};

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pid = std::process::id();

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            let existing_pid = fs::read_to_string(path).unwrap_or_else(|_| "unknown".to_string());
            return Err(anyhow::anyhow!(
                "PID file {} already exists with PID: {}. Is another instance running?",
                path.display(),
                existing_pid.trim()
            ));
        }
        Err(e) => return Err(e.into()),
    };

    writeln!(file, "{}", pid)?;

    tracing::info!(pid = pid, path = %path.display(), "PID file written");
    Ok(())
}

/// 종료 시 PID 파일을 제거한다. 제거에 실패해도 경고만 남기고 계속한다.
fn remove_pid_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove PID file");
    } else {
        tracing::info!(path = %path.display(), "PID file removed");
    }
}
