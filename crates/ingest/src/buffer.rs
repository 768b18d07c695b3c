//! 수신 큐 -- UDP 수신기와 배치 작성기 사이의 인메모리 버퍼
//!
//! [`DatagramBuffer`]는 수신된 원시 데이터그램을 인메모리에 버퍼링하고,
//! 배치 크기 또는 시간 간격에 따라 배치 작성기가 드레인한다.
//!
//! # 오버플로우 정책
//! 큐가 가득 찬 경우:
//! - [`DropPolicy::Oldest`](crate::config::DropPolicy::Oldest): 가장 오래된 엔트리를 드롭 (기본값)
//! - [`DropPolicy::Newest`](crate::config::DropPolicy::Newest): 새 유입을 거부

use std::collections::VecDeque;
use std::net::SocketAddr;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::config::DropPolicy;

/// C6→C5 큐의 원소. 파싱되지 않은 원시 페이로드 + 수신 메타데이터.
///
/// 배치 작성기만이 이 값을 소비하며, C2→C3→C1은 배치 작성기 안에서만 실행된다
/// (UDP 수신 콜백은 파싱을 하지 않는다 -- §4.6).
#[derive(Debug, Clone)]
pub struct RawDatagram {
    pub payload: Bytes,
    pub peer: SocketAddr,
    pub received_at: DateTime<Utc>,
}

impl RawDatagram {
    pub fn new(payload: Bytes, peer: SocketAddr, received_at: DateTime<Utc>) -> Self {
        Self {
            payload,
            peer,
            received_at,
        }
    }
}

/// 인메모리 수신 큐
///
/// 수신된 원시 데이터그램을 임시 저장하고, 배치 단위로 배치 작성기에 전달한다.
/// 용량이 초과되면 설정된 드롭 정책에 따라 엔트리를 제거한다.
pub struct DatagramBuffer {
    buffer: VecDeque<RawDatagram>,
    capacity: usize,
    drop_policy: DropPolicy,
    dropped_count: u64,
    total_received: u64,
}

impl DatagramBuffer {
    /// 새 수신 큐를 생성한다.
    pub fn new(capacity: usize, drop_policy: DropPolicy) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity.min(10_000)),
            capacity,
            drop_policy,
            dropped_count: 0,
            total_received: 0,
        }
    }

    /// 데이터그램을 큐에 추가한다.
    ///
    /// 큐가 가득 찬 경우 드롭 정책에 따라 처리한다.
    /// 드롭이 발생하면 `true`를 반환한다.
    pub fn push(&mut self, datagram: RawDatagram) -> bool {
        self.total_received += 1;

        if self.buffer.len() >= self.capacity {
            match self.drop_policy {
                DropPolicy::Oldest => {
                    self.buffer.pop_front();
                    self.dropped_count += 1;
                    tracing::warn!(
                        dropped = self.dropped_count,
                        capacity = self.capacity,
                        "queue full, dropped oldest datagram"
                    );
                    self.buffer.push_back(datagram);
                    return true;
                }
                DropPolicy::Newest => {
                    self.dropped_count += 1;
                    tracing::warn!(
                        dropped = self.dropped_count,
                        capacity = self.capacity,
                        "queue full, rejected incoming datagram"
                    );
                    return true;
                }
            }
        }

        self.buffer.push_back(datagram);
        false
    }

    /// 배치 크기만큼 또는 큐에 남은 만큼 엔트리를 드레인한다.
    pub fn drain_batch(&mut self, batch_size: usize) -> Vec<RawDatagram> {
        let count = batch_size.min(self.buffer.len());
        self.buffer.drain(..count).collect()
    }

    /// 큐의 모든 엔트리를 드레인한다.
    pub fn drain_all(&mut self) -> Vec<RawDatagram> {
        self.buffer.drain(..).collect()
    }

    /// 현재 큐에 저장된 엔트리 수를 반환한다.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// 큐가 비어있는지 확인한다.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// 큐 최대 용량을 반환한다.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 지금까지 드롭된 엔트리 수를 반환한다.
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count
    }

    /// 총 유입 엔트리 수를 반환한다.
    pub fn total_received(&self) -> u64 {
        self.total_received
    }

    /// 큐 사용률을 0.0~1.0 범위로 반환한다.
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        f64::from(u32::try_from(self.buffer.len()).unwrap_or(u32::MAX))
            / f64::from(u32::try_from(self.capacity).unwrap_or(u32::MAX))
    }

    /// 배치 플러시 조건(크기 기준)을 확인한다.
    pub fn should_flush(&self, batch_size: usize) -> bool {
        self.buffer.len() >= batch_size
    }
}
