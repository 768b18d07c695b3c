//! 에러 타입 — 도메인별 에러 정의

/// sylogd 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SylogdError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 수집/적재 파이프라인 에러
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// 질의 계획/실행 에러
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    /// 스토리지 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음 (명시적으로 지정된 비-기본 경로)
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// 알 수 없는 database.driver 값
    #[error("unknown database driver: '{driver}' (expected one of: sqlite, meilisearch)")]
    UnknownDriver { driver: String },
}

/// 수집 파이프라인 에러 — 상세 에러는 `sylogd-ingest`가 소유하며, 경계를 넘을 때 이 범주로 수렴한다.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 채널 전송 실패
    #[error("channel send failed: {0}")]
    ChannelSend(String),

    /// 채널 수신 실패
    #[error("channel receive failed: {0}")]
    ChannelRecv(String),

    /// 파이프라인 초기화 실패
    #[error("ingest pipeline init failed: {0}")]
    InitFailed(String),
}

/// 질의 계획/실행 에러 — 상세 에러는 `sylogd-query`가 소유한다.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// SQL 조립 실패 (잘못된 FTS 구문 등)
    #[error("query build failed: {0}")]
    Build(String),

    /// 쿼리 실행 실패 (손상/잠금된 파티션 파일 등)
    #[error("query execution failed: {0}")]
    Exec(String),
}

/// 스토리지 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 연결 실패
    #[error("connection failed: {0}")]
    Connection(String),

    /// 쿼리 실패
    #[error("query failed: {0}")]
    Query(String),
}
