//! 수집 파이프라인 전용 에러 — 경계를 넘을 때 `sylogd_core::error::IngestError`로 수렴한다.

use sylogd_core::error::IngestError;

/// 수집 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum IngestPipelineError {
    /// 설정값이 유효하지 않음 (batch_size=0 등)
    #[error("invalid ingest config field '{field}': {reason}")]
    Config { field: String, reason: String },

    /// UDP 소켓 바인드/수신 실패
    #[error("udp receiver error on {bind_addr}: {reason}")]
    Receiver { bind_addr: String, reason: String },

    /// 큐에 넣을 수 없음 (채널이 닫힘 등, drop-policy와는 별개의 치명적 상황)
    #[error("channel error: {0}")]
    Channel(String),

    /// 파티션 생성/DDL 실패
    #[error("partition {year_month} setup failed: {reason}")]
    Partition { year_month: String, reason: String },

    /// 배치 커밋 실패
    #[error("batch commit failed for partition {year_month}: {reason}")]
    Commit { year_month: String, reason: String },

    /// SQLite 드라이버 에러
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<IngestPipelineError> for IngestError {
    fn from(err: IngestPipelineError) -> Self {
        IngestError::InitFailed(err.to_string())
    }
}
