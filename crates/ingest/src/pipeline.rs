//! 파이프라인 오케스트레이션 -- 수신/버퍼/적재/종료의 전체 흐름을 관리합니다.
//!
//! [`IngestPipeline`]은 core의 [`Pipeline`](sylogd_core::pipeline::Pipeline)
//! trait을 구현하여 `daemon`에서 다른 모듈과 동일한 생명주기로 관리됩니다.
//!
//! # 내부 아키텍처
//! ```text
//! UdpReceiver -> (Arc<Mutex<DatagramBuffer>> + Notify) -> BatchWriter -> 연월별 SQLite 파일
//! ```

use std::sync::{Arc, Mutex};

use sylogd_core::error::{IngestError, SylogdError};
use sylogd_core::pipeline::{HealthStatus, Pipeline};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::buffer::DatagramBuffer;
use crate::config::IngestRuntimeConfig;
use crate::error::IngestPipelineError;
use crate::receiver::UdpReceiver;
use crate::shutdown::ShutdownCoordinator;
use crate::writer::BatchWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineState {
    Initialized,
    Running,
    Stopped,
}

/// 수집 파이프라인 -- UDP 수신, 버퍼링, 배치 적재, graceful shutdown을 관리합니다.
///
/// core의 `Pipeline` trait을 구현하여 `daemon`에서 다른 모듈과 동일한
/// 생명주기(start/stop/health_check)로 관리됩니다.
pub struct IngestPipeline {
    config: IngestRuntimeConfig,
    state: PipelineState,
    queue: Arc<Mutex<DatagramBuffer>>,
    notify: Arc<Notify>,
    shutdown: ShutdownCoordinator,
    receiver_task: Option<tokio::task::JoinHandle<()>>,
    writer_task: Option<tokio::task::JoinHandle<()>>,
    signal_task: Option<tokio::task::JoinHandle<()>>,
}

impl IngestPipeline {
    pub fn new(config: IngestRuntimeConfig) -> Result<Self, IngestPipelineError> {
        config.validate()?;
        let queue = Arc::new(Mutex::new(DatagramBuffer::new(
            config.queue_capacity,
            config.drop_policy.clone(),
        )));
        Ok(Self {
            config,
            state: PipelineState::Initialized,
            queue,
            notify: Arc::new(Notify::new()),
            shutdown: ShutdownCoordinator::new(),
            receiver_task: None,
            writer_task: None,
            signal_task: None,
        })
    }

    pub fn state_name(&self) -> &'static str {
        match self.state {
            PipelineState::Initialized => "initialized",
            PipelineState::Running => "running",
            PipelineState::Stopped => "stopped",
        }
    }

    /// 큐 사용률을 반환한다 (헬스체크/메트릭용).
    pub fn queue_utilization(&self) -> f64 {
        self.queue.lock().expect("datagram queue mutex poisoned").utilization()
    }

    /// 종료 신호(SIGINT/SIGTERM) 발화 여부를 기다리는 취소 토큰.
    ///
    /// 호출자(데몬 오케스트레이터)는 이 토큰이 취소될 때까지 대기한 뒤
    /// `stop()`을 호출해 태스크를 정리한다.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.cancellation_token()
    }
}

impl Pipeline for IngestPipeline {
    async fn start(&mut self) -> Result<(), SylogdError> {
        if self.state == PipelineState::Running {
            return Err(IngestError::InitFailed("already running".to_owned()).into());
        }

        if !self.config.enabled {
            tracing::info!("ingest pipeline disabled, skipping start");
            self.state = PipelineState::Running;
            return Ok(());
        }

        tracing::info!(bind_addr = %self.config.bind_addr, "starting ingest pipeline");

        let cancel = self.shutdown.cancellation_token();

        let receiver = UdpReceiver::bind(&self.config.bind_addr, Arc::clone(&self.queue), Arc::clone(&self.notify))
            .await
            .map_err(|e| SylogdError::from(IngestError::from(e)))?;
        let receiver_cancel = cancel.clone();
        self.receiver_task = Some(tokio::spawn(receiver.run(receiver_cancel)));

        let writer = BatchWriter::new(self.config.clone());
        let writer_queue = Arc::clone(&self.queue);
        let writer_notify = Arc::clone(&self.notify);
        let writer_cancel = cancel.clone();
        self.writer_task = Some(tokio::spawn(
            writer.run(writer_queue, writer_notify, writer_cancel),
        ));

        let signal_waiter = self.shutdown.clone();
        self.signal_task = Some(tokio::spawn(async move {
            let signal_name = signal_waiter.wait_for_signal().await;
            tracing::info!(signal = signal_name, "shutdown signal received");
        }));

        self.state = PipelineState::Running;
        tracing::info!("ingest pipeline started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), SylogdError> {
        if self.state != PipelineState::Running {
            return Err(IngestError::InitFailed("not running".to_owned()).into());
        }

        tracing::info!("stopping ingest pipeline");
        self.shutdown.cancellation_token().cancel();

        if let Some(task) = self.signal_task.take() {
            task.abort();
        }
        if let Some(task) = self.receiver_task.take() {
            let _ = tokio::time::timeout(std::time::Duration::from_secs(5), task).await;
        }
        if let Some(task) = self.writer_task.take() {
            let _ = tokio::time::timeout(std::time::Duration::from_secs(10), task).await;
        }

        self.shutdown.mark_closed();
        self.state = PipelineState::Stopped;
        tracing::info!("ingest pipeline stopped");
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        match self.state {
            PipelineState::Running => {
                let receiver_alive = self
                    .receiver_task
                    .as_ref()
                    .is_none_or(|t| !t.is_finished());
                let writer_alive = self.writer_task.as_ref().is_none_or(|t| !t.is_finished());

                if self.config.enabled && (!receiver_alive || !writer_alive) {
                    return HealthStatus::Unhealthy(
                        "receiver or writer task terminated unexpectedly".to_owned(),
                    );
                }

                let utilization = self.queue_utilization();
                if utilization > 0.9 {
                    HealthStatus::Degraded(format!(
                        "queue utilization high: {:.1}%",
                        utilization * 100.0
                    ))
                } else {
                    HealthStatus::Healthy
                }
            }
            PipelineState::Initialized => HealthStatus::Unhealthy("not started".to_owned()),
            PipelineState::Stopped => HealthStatus::Unhealthy("stopped".to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_config(dir: &tempfile::TempDir) -> IngestRuntimeConfig {
        let mut config = IngestRuntimeConfig::default();
        config.enabled = false;
        config.database_template = dir
            .path()
            .join("syslog.sqlite3")
            .to_string_lossy()
            .into_owned();
        config
    }

    #[test]
    fn new_pipeline_is_initialized() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = IngestPipeline::new(disabled_config(&dir)).unwrap();
        assert_eq!(pipeline.state_name(), "initialized");
    }

    #[tokio::test]
    async fn disabled_pipeline_starts_and_stops_without_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = IngestPipeline::new(disabled_config(&dir)).unwrap();

        Pipeline::start(&mut pipeline).await.unwrap();
        assert_eq!(pipeline.state_name(), "running");
        assert!(pipeline.receiver_task.is_none());

        Pipeline::stop(&mut pipeline).await.unwrap();
        assert_eq!(pipeline.state_name(), "stopped");
    }

    #[tokio::test]
    async fn enabled_pipeline_lifecycle_on_ephemeral_port() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = disabled_config(&dir);
        config.enabled = true;
        config.bind_addr = "127.0.0.1:0".to_owned();
        config.batch_timeout_secs = 3600;
        let mut pipeline = IngestPipeline::new(config).unwrap();

        Pipeline::start(&mut pipeline).await.unwrap();
        assert_eq!(pipeline.state_name(), "running");
        assert!(Pipeline::health_check(&pipeline).await.is_healthy());

        Pipeline::stop(&mut pipeline).await.unwrap();
        assert_eq!(pipeline.state_name(), "stopped");
    }

    #[tokio::test]
    async fn double_start_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = IngestPipeline::new(disabled_config(&dir)).unwrap();
        Pipeline::start(&mut pipeline).await.unwrap();
        let err = Pipeline::start(&mut pipeline).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn stop_before_start_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = IngestPipeline::new(disabled_config(&dir)).unwrap();
        let err = Pipeline::stop(&mut pipeline).await;
        assert!(err.is_err());
    }
}
