//! UDP 수신기 (C6) — 비차단 수신 루프
//!
//! 수신 콜백 자체는 파싱이나 저장소 I/O를 전혀 하지 않는다 — 수신 경로를
//! 일정 시간으로 유지하는 것이 핵심 성능 결정이다. 종료 신호가 설정되면
//! 새 데이터그램은 조용히 버려진다.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::Utc;
use tokio::net::UdpSocket;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::buffer::{DatagramBuffer, RawDatagram};
use crate::error::IngestPipelineError;

/// OS 데이터그램 최대 크기에 맞춘 수신 버퍼 한계.
const MAX_DATAGRAM_SIZE: usize = 65_535;

/// 비차단 UDP 수신 루프.
pub struct UdpReceiver {
    socket: UdpSocket,
    queue: Arc<Mutex<DatagramBuffer>>,
    notify: Arc<Notify>,
}

impl UdpReceiver {
    pub async fn bind(
        bind_addr: &str,
        queue: Arc<Mutex<DatagramBuffer>>,
        notify: Arc<Notify>,
    ) -> Result<Self, IngestPipelineError> {
        let socket =
            UdpSocket::bind(bind_addr)
                .await
                .map_err(|e| IngestPipelineError::Receiver {
                    bind_addr: bind_addr.to_owned(),
                    reason: e.to_string(),
                })?;
        Ok(Self {
            socket,
            queue,
            notify,
        })
    }

    /// 실제로 바인드된 로컬 주소 (포트 0 지정 시 할당된 포트 확인용).
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.socket.local_addr()
    }

    /// 취소 신호가 올 때까지 수신 루프를 실행한다. 종료 후에는 새 데이터그램을
    /// 받지 않는다 (소켓은 닫히지 않지만 읽은 내용을 즉시 버린다).
    pub async fn run(self, cancel: CancellationToken) {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::info!("udp receiver stopping, draining socket reads silently");
                    break;
                }
                result = self.socket.recv_from(&mut buf) => {
                    match result {
                        Ok((len, peer)) => {
                            self.enqueue(Bytes::copy_from_slice(&buf[..len]), peer);
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "udp recv error, continuing");
                        }
                    }
                }
            }
        }
    }

    fn enqueue(&self, payload: Bytes, peer: std::net::SocketAddr) {
        metrics::counter!(sylogd_core::metrics::INGEST_DATAGRAMS_RECEIVED_TOTAL).increment(1);
        let datagram = RawDatagram::new(payload, peer, Utc::now());

        let mut queue = self.queue.lock().expect("datagram queue mutex poisoned");
        let dropped = queue.push(datagram);
        let depth = queue.len();
        drop(queue);

        metrics::gauge!(sylogd_core::metrics::INGEST_QUEUE_DEPTH).set(depth as f64);
        if dropped {
            metrics::counter!(
                sylogd_core::metrics::INGEST_DATAGRAMS_DROPPED_TOTAL,
                sylogd_core::metrics::LABEL_REASON => "queue_full"
            )
            .increment(1);
        }
        self.notify.notify_one();
    }
}
