//! 배치 작성기 (C5) — 큐에서 데이터그램을 소비해 파싱하고, 연월별로 묶어
//! 원자적으로 커밋한다.
//!
//! 루프 계약 (종료 신호 **그리고** 큐가 비워질 때까지):
//! 1. `BATCH_TIMEOUT` 타임아웃으로 새 항목 알림을 기다린다.
//! 2. 항목이 도착하면 C2→C3→C1을 통해 파싱하고, 레코드가 만들어지면 진행중인
//!    배치에 추가한다.
//! 3. 배치가 `BATCH_SIZE`에 도달하면 플러시한다.
//! 4. 대기가 타임아웃되고 배치가 비어있지 않으면 플러시한다.
//! 5. 루프 내부의 예기치 않은 오류는 로그로 남기고 계속한다 — 잘못된
//!    데이터그램 하나가 작성기를 멈추게 해서는 안 된다.
//! 6. 종료 시 마지막 플러시를 수행한다.
//!
//! 연월별 파티션은 각각 독립된 SQLite 파일이므로(§6), 작성기는 연결을 직접
//! 들고 있지 않고 [`PartitionManager`]에게 위임한다.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use sylogd_core::types::{LogRecord, YearMonth};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::buffer::DatagramBuffer;
use crate::config::IngestRuntimeConfig;
use crate::error::IngestPipelineError;
use crate::partition::PartitionManager;
use crate::{normalizer, record_parser};

/// 배치 작성기 태스크.
pub struct BatchWriter {
    partitions: PartitionManager,
    config: IngestRuntimeConfig,
}

impl BatchWriter {
    pub fn new(config: IngestRuntimeConfig) -> Self {
        let partitions = PartitionManager::new(config.database_template.clone());
        Self { partitions, config }
    }

    /// 큐가 비워지고 취소 신호가 들어올 때까지 루프를 실행한다.
    ///
    /// `queue`는 수신기와 공유하는 인메모리 큐이고, `notify`는 수신기가 새
    /// 데이터그램을 넣을 때마다 깨우는 도어벨이다.
    pub async fn run(
        mut self,
        queue: Arc<Mutex<DatagramBuffer>>,
        notify: Arc<Notify>,
        cancel: CancellationToken,
    ) {
        let mut batch: Vec<LogRecord> = Vec::with_capacity(self.config.batch_size);
        let timeout = Duration::from_secs(self.config.batch_timeout_secs.max(1));

        loop {
            let timed_out = tokio::select! {
                () = notify.notified() => false,
                () = tokio::time::sleep(timeout) => true,
            };

            let remaining = self.config.batch_size.saturating_sub(batch.len()).max(1);
            let drained = {
                let mut q = queue.lock().expect("datagram queue mutex poisoned");
                q.drain_batch(remaining)
            };

            for datagram in drained {
                if let Some(record) = self.parse_one(datagram) {
                    batch.push(record);
                }
            }

            if batch.len() >= self.config.batch_size {
                self.flush(&mut batch);
            } else if timed_out && !batch.is_empty() {
                metrics::counter!(sylogd_core::metrics::INGEST_BATCH_TIMEOUT_FLUSHES_TOTAL)
                    .increment(1);
                self.flush(&mut batch);
            }

            if cancel.is_cancelled() {
                let drained_empty = queue.lock().expect("datagram queue mutex poisoned").is_empty();
                if drained_empty && batch.is_empty() {
                    break;
                }
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch);
        }
        tracing::info!("batch writer terminated");
    }

    fn parse_one(&self, datagram: crate::buffer::RawDatagram) -> Option<LogRecord> {
        let text = std::str::from_utf8(&datagram.payload).ok()?;
        let normalized = normalizer::normalize(text, datagram.received_at);
        let record =
            record_parser::parse(normalized.as_bytes(), datagram.peer, datagram.received_at)?;

        if record.sys_log_tag == sylogd_core::types::UNKNOWN_TAG
            && record.process_id == sylogd_core::types::UNKNOWN_PROCID
        {
            metrics::counter!(sylogd_core::metrics::INGEST_RECORDS_FAILOPEN_TOTAL).increment(1);
        } else {
            metrics::counter!(sylogd_core::metrics::INGEST_RECORDS_PARSED_TOTAL).increment(1);
        }

        Some(record)
    }

    /// 진행중인 배치를 연월로 그룹화하고, 그룹별로 원자적 커밋을 수행한다.
    ///
    /// 한 그룹의 실패는 해당 그룹만 롤백할 뿐 다른 그룹의 커밋을 막지 않는다.
    fn flush(&mut self, batch: &mut Vec<LogRecord>) {
        let start = Instant::now();
        let mut groups: BTreeMap<YearMonth, Vec<LogRecord>> = BTreeMap::new();
        for record in batch.drain(..) {
            groups.entry(record.partition()).or_default().push(record);
        }

        for (ym, records) in groups {
            match self.flush_group(ym, &records) {
                Ok(()) => {
                    metrics::counter!(
                        sylogd_core::metrics::INGEST_BATCHES_FLUSHED_TOTAL,
                        sylogd_core::metrics::LABEL_RESULT => "success"
                    )
                    .increment(1);
                    metrics::histogram!(sylogd_core::metrics::INGEST_BATCH_SIZE)
                        .record(records.len() as f64);
                }
                Err(err) => {
                    tracing::error!(
                        partition = %ym,
                        error = %err,
                        "batch commit failed for partition, group rolled back"
                    );
                    metrics::counter!(
                        sylogd_core::metrics::INGEST_BATCHES_FLUSHED_TOTAL,
                        sylogd_core::metrics::LABEL_RESULT => "failure"
                    )
                    .increment(1);
                }
            }
        }

        metrics::histogram!(sylogd_core::metrics::INGEST_BATCH_FLUSH_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());
    }

    fn flush_group(
        &mut self,
        ym: YearMonth,
        records: &[LogRecord],
    ) -> Result<(), IngestPipelineError> {
        let base_table = ym.base_table_name();
        let fts_table = ym.fts_table_name();

        let conn = self.partitions.connection_for(ym)?;
        let tx = conn
            .unchecked_transaction()
            .map_err(IngestPipelineError::Sqlite)?;
        {
            let sql = format!(
                "INSERT INTO {base_table}
                 (Facility, Priority, FromHost, InfoUnitID, ReceivedAt, DeviceReportedTime, SysLogTag, ProcessID, Message)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            );
            let mut stmt = tx.prepare(&sql)?;
            for record in records {
                stmt.execute(rusqlite::params![
                    record.facility,
                    record.priority,
                    record.from_host,
                    record.info_unit_id,
                    record.received_at.to_rfc3339(),
                    record.device_reported_time.to_rfc3339(),
                    record.sys_log_tag,
                    record.process_id,
                    record.message,
                ])?;
            }
        }

        if let Err(err) = tx.execute(
            &format!("INSERT INTO {fts_table}({fts_table}) VALUES('rebuild')"),
            [],
        ) {
            tracing::warn!(partition = %ym, error = %err, "fts rebuild failed, base data still committed");
        } else {
            metrics::counter!(
                sylogd_core::metrics::PARTITION_FTS_REBUILDS_TOTAL,
                sylogd_core::metrics::LABEL_PARTITION => ym.to_string()
            )
            .increment(1);
        }

        tx.commit().map_err(|e| IngestPipelineError::Commit {
            year_month: ym.to_string(),
            reason: e.to_string(),
        })
    }
}
