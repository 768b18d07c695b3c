//! 질의 도메인 에러 타입

use sylogd_core::error::QueryError;

#[derive(Debug, thiserror::Error)]
pub enum QueryPlanError {
    #[error("no partition files match template '{template}'")]
    NoPartitions { template: String },

    #[error("partition file not found: {path}")]
    PartitionNotFound { path: String },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

impl From<QueryPlanError> for QueryError {
    fn from(err: QueryPlanError) -> Self {
        match err {
            QueryPlanError::Sqlite(e) => QueryError::Exec(e.to_string()),
            other => QueryError::Build(other.to_string()),
        }
    }
}
