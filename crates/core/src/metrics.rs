//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `sylogd_`
//! - 모듈명: `ingest_`, `partition_`, `query_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use sylogd_core::metrics;
//! use metrics::counter;
//!
//! counter!(sylogd_core::metrics::INGEST_DATAGRAMS_RECEIVED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 드롭 사유 레이블 키 (queue_full, decode_error, parse_error)
pub const LABEL_REASON: &str = "reason";

/// 파티션(YYYYMM) 레이블 키
pub const LABEL_PARTITION: &str = "partition";

/// 쿼리 방향 레이블 키 (forward, backward)
pub const LABEL_DIRECTION: &str = "direction";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── UDP Receiver / Collector 메트릭 ────────────────────────────────

/// Ingest: 수신된 전체 데이터그램 수 (counter)
pub const INGEST_DATAGRAMS_RECEIVED_TOTAL: &str = "sylogd_ingest_datagrams_received_total";

/// Ingest: 드롭된 데이터그램 수 (counter, label: reason)
pub const INGEST_DATAGRAMS_DROPPED_TOTAL: &str = "sylogd_ingest_datagrams_dropped_total";

/// Ingest: UTF-8 디코딩 실패 수 (counter)
pub const INGEST_DECODE_ERRORS_TOTAL: &str = "sylogd_ingest_decode_errors_total";

/// Ingest: 정상 파싱된 레코드 수 (counter)
pub const INGEST_RECORDS_PARSED_TOTAL: &str = "sylogd_ingest_records_parsed_total";

/// Ingest: fail-open 경로로 파싱된 레코드 수 (counter)
pub const INGEST_RECORDS_FAILOPEN_TOTAL: &str = "sylogd_ingest_records_failopen_total";

/// Ingest: 수신 큐 내 현재 항목 수 (gauge)
pub const INGEST_QUEUE_DEPTH: &str = "sylogd_ingest_queue_depth";

// ─── Batch Writer 메트릭 ─────────────────────────────────────────────

/// Ingest: 커밋된 배치 수 (counter, label: result)
pub const INGEST_BATCHES_FLUSHED_TOTAL: &str = "sylogd_ingest_batches_flushed_total";

/// Ingest: 배치 적재 소요 시간 (histogram, 초)
pub const INGEST_BATCH_FLUSH_DURATION_SECONDS: &str =
    "sylogd_ingest_batch_flush_duration_seconds";

/// Ingest: 배치 1회에 적재된 레코드 수 (histogram)
pub const INGEST_BATCH_SIZE: &str = "sylogd_ingest_batch_size";

/// Ingest: 타임아웃으로 트리거된 플러시 수 (counter)
pub const INGEST_BATCH_TIMEOUT_FLUSHES_TOTAL: &str =
    "sylogd_ingest_batch_timeout_flushes_total";

// ─── Partition Manager 메트릭 ────────────────────────────────────────

/// Partition: 새로 생성된 월별 파티션 수 (counter)
pub const PARTITION_CREATED_TOTAL: &str = "sylogd_partition_created_total";

/// Partition: FTS 재빌드 실행 수 (counter, label: partition)
pub const PARTITION_FTS_REBUILDS_TOTAL: &str = "sylogd_partition_fts_rebuilds_total";

// ─── Query (Boundary Finder / Query Builder / Runner) 메트릭 ────────

/// Query: 실행된 경계 탐색 횟수 (counter)
pub const QUERY_BOUNDARY_PROBES_TOTAL: &str = "sylogd_query_boundary_probes_total";

/// Query: 경계 탐색 소요 시간 (histogram, 초)
pub const QUERY_BOUNDARY_PROBE_DURATION_SECONDS: &str =
    "sylogd_query_boundary_probe_duration_seconds";

/// Query: 페이지 조회 소요 시간 (histogram, 초, label: direction)
pub const QUERY_PAGE_FETCH_DURATION_SECONDS: &str = "sylogd_query_page_fetch_duration_seconds";

/// Query: 실행된 전체 조회 수 (counter)
pub const QUERY_EXECUTIONS_TOTAL: &str = "sylogd_query_executions_total";

// ─── Daemon 메트릭 ──────────────────────────────────────────────────

/// Daemon: 가동 시간 (gauge, 초)
pub const DAEMON_UPTIME_SECONDS: &str = "sylogd_daemon_uptime_seconds";

/// Daemon: 등록된 모듈 수 (gauge)
pub const DAEMON_MODULES_REGISTERED: &str = "sylogd_daemon_modules_registered";

/// Daemon: 빌드 정보 (gauge, 항상 1, labels: version, commit, rust_version)
pub const DAEMON_BUILD_INFO: &str = "sylogd_daemon_build_info";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 배치 적재/쿼리 지연 시간 히스토그램 버킷 (초)
///
/// 100us ~ 10s 범위, 로그 단위 분포
pub const PROCESSING_DURATION_BUCKETS: [f64; 10] = [
    0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 10.0,
];

/// 배치 크기 히스토그램 버킷 (레코드 수)
pub const BATCH_SIZE_BUCKETS: [f64; 8] = [1.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0, 10000.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// `metrics::describe_counter!()`, `describe_gauge!()`, `describe_histogram!()`을
/// 호출하여 Prometheus HELP 텍스트를 설정합니다.
///
/// 이 함수는 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // UDP Receiver / Collector
    describe_counter!(
        INGEST_DATAGRAMS_RECEIVED_TOTAL,
        "Total number of UDP datagrams received"
    );
    describe_counter!(
        INGEST_DATAGRAMS_DROPPED_TOTAL,
        "Total number of datagrams dropped before reaching storage"
    );
    describe_counter!(
        INGEST_DECODE_ERRORS_TOTAL,
        "Total number of datagrams that failed UTF-8 decoding"
    );
    describe_counter!(
        INGEST_RECORDS_PARSED_TOTAL,
        "Total number of records parsed from the RFC5424 grammar"
    );
    describe_counter!(
        INGEST_RECORDS_FAILOPEN_TOTAL,
        "Total number of records that fell back to the fail-open record"
    );
    describe_gauge!(
        INGEST_QUEUE_DEPTH,
        "Current number of records buffered in the ingest queue"
    );

    // Batch Writer
    describe_counter!(
        INGEST_BATCHES_FLUSHED_TOTAL,
        "Total number of batch flush attempts, by result"
    );
    describe_histogram!(
        INGEST_BATCH_FLUSH_DURATION_SECONDS,
        "Time to commit a single batch to storage in seconds"
    );
    describe_histogram!(INGEST_BATCH_SIZE, "Number of records in a flushed batch");
    describe_counter!(
        INGEST_BATCH_TIMEOUT_FLUSHES_TOTAL,
        "Total number of flushes triggered by the batch timeout rather than a full batch"
    );

    // Partition Manager
    describe_counter!(
        PARTITION_CREATED_TOTAL,
        "Total number of monthly partitions created"
    );
    describe_counter!(
        PARTITION_FTS_REBUILDS_TOTAL,
        "Total number of FTS rebuild directives issued, by partition"
    );

    // Query
    describe_counter!(
        QUERY_BOUNDARY_PROBES_TOTAL,
        "Total number of boundary probe queries issued while resolving a time range to an id range"
    );
    describe_histogram!(
        QUERY_BOUNDARY_PROBE_DURATION_SECONDS,
        "Time to resolve a time range to an id range in seconds"
    );
    describe_histogram!(
        QUERY_PAGE_FETCH_DURATION_SECONDS,
        "Time to fetch a single page of results in seconds, by direction"
    );
    describe_counter!(
        QUERY_EXECUTIONS_TOTAL,
        "Total number of log queries executed"
    );

    // Daemon
    describe_gauge!(DAEMON_UPTIME_SECONDS, "sylogd daemon uptime in seconds");
    describe_gauge!(
        DAEMON_MODULES_REGISTERED,
        "Number of modules registered in the daemon"
    );
    describe_gauge!(
        DAEMON_BUILD_INFO,
        "Build information (always 1, with version/commit labels)"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        INGEST_DATAGRAMS_RECEIVED_TOTAL,
        INGEST_DATAGRAMS_DROPPED_TOTAL,
        INGEST_DECODE_ERRORS_TOTAL,
        INGEST_RECORDS_PARSED_TOTAL,
        INGEST_RECORDS_FAILOPEN_TOTAL,
        INGEST_QUEUE_DEPTH,
        INGEST_BATCHES_FLUSHED_TOTAL,
        INGEST_BATCH_FLUSH_DURATION_SECONDS,
        INGEST_BATCH_SIZE,
        INGEST_BATCH_TIMEOUT_FLUSHES_TOTAL,
        PARTITION_CREATED_TOTAL,
        PARTITION_FTS_REBUILDS_TOTAL,
        QUERY_BOUNDARY_PROBES_TOTAL,
        QUERY_BOUNDARY_PROBE_DURATION_SECONDS,
        QUERY_PAGE_FETCH_DURATION_SECONDS,
        QUERY_EXECUTIONS_TOTAL,
        DAEMON_UPTIME_SECONDS,
        DAEMON_MODULES_REGISTERED,
        DAEMON_BUILD_INFO,
    ];

    #[test]
    fn all_metrics_start_with_sylogd_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("sylogd_"),
                "Metric '{}' does not start with 'sylogd_' prefix",
                name
            );
        }
    }

    #[test]
    fn all_metrics_have_19_entries() {
        assert_eq!(
            ALL_METRIC_NAMES.len(),
            19,
            "Expected 19 metrics (6 ingest + 4 batch writer + 2 partition + 4 query + 3 daemon)"
        );
    }

    #[test]
    fn describe_all_does_not_panic() {
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        let labels = [LABEL_REASON, LABEL_PARTITION, LABEL_DIRECTION, LABEL_RESULT];
        for label in &labels {
            assert_eq!(
                label.to_lowercase(),
                *label,
                "Label key '{}' should be lowercase",
                label
            );
        }
    }

    #[test]
    fn processing_duration_buckets_are_sorted() {
        let buckets = PROCESSING_DURATION_BUCKETS;
        for i in 1..buckets.len() {
            assert!(
                buckets[i] > buckets[i - 1],
                "Bucket values must be in ascending order"
            );
        }
    }

    #[test]
    fn batch_size_buckets_are_sorted() {
        let buckets = BATCH_SIZE_BUCKETS;
        for i in 1..buckets.len() {
            assert!(
                buckets[i] > buckets[i - 1],
                "Bucket values must be in ascending order"
            );
        }
    }
}
