//! 종료 조정자 (C7) — RUNNING → DRAINING → CLOSED 상태 머신
//!
//! `RUNNING`: 소켓이 열려 있고 작성기가 루프 중.
//! `DRAINING`: 소켓은 닫혔고(새 enqueue 없음) 작성기는 계속 드레인한다.
//! `CLOSED`: 마지막 플러시 완료, 저장소 핸들 닫힘.
//!
//! SIGINT/SIGTERM에서 결정적으로 완료되어야 한다.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// 종료 상태 머신의 단계.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    Draining,
    Closed,
}

impl ShutdownState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Running,
            1 => Self::Draining,
            _ => Self::Closed,
        }
    }
}

/// 인입 파이프라인의 종료 상태를 추적하고 신호를 전파한다.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    state: Arc<AtomicU8>,
    cancel: CancellationToken,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(0)),
            cancel: CancellationToken::new(),
        }
    }

    /// 수신기/작성기가 관찰하는 취소 토큰.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> ShutdownState {
        ShutdownState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// SIGINT 또는 SIGTERM을 기다린 뒤 DRAINING으로 전이하고 취소 토큰을 발화한다.
    pub async fn wait_for_signal(&self) -> &'static str {
        let signal_name = wait_for_shutdown_signal().await;
        self.state.store(1, Ordering::SeqCst);
        self.cancel.cancel();
        signal_name
    }

    /// 작성기가 자연 종료(큐 비워짐 + 취소됨)에 도달했음을 보고한다.
    pub fn mark_closed(&self) {
        self.state.store(2, Ordering::SeqCst);
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// SIGTERM 또는 SIGINT를 기다린다. 발화한 시그널의 이름을 반환한다.
async fn wait_for_shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(err) => {
            tracing::error!(error = %err, "failed to install SIGTERM handler");
            std::future::pending::<()>().await;
            unreachable!()
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(err) => {
            tracing::error!(error = %err, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
            unreachable!()
        }
    };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    }
}
