//! 수집 파이프라인 런타임 설정
//!
//! [`IngestRuntimeConfig`]는 core의 [`IngestConfig`](sylogd_core::config::IngestConfig)를
//! 파이프라인이 실제로 쓰는 형태(바인드 주소, 드롭 정책 등)로 펼친 것이다.
//!
//! # 사용 예시
//! ```ignore
//! use sylogd_core::config::AppConfig;
//! use sylogd_ingest::config::IngestRuntimeConfig;
//!
//! let app_config = AppConfig::default();
//! let config = IngestRuntimeConfig::from_core(&app_config.ingest);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::IngestPipelineError;

/// 큐 오버플로우 시 드롭 정책
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropPolicy {
    /// 가장 오래된 엔트리를 드롭 (기본값, §4.6 결정)
    #[default]
    Oldest,
    /// 가장 최신(유입) 엔트리를 드롭
    Newest,
}

/// 수집 파이프라인 런타임 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRuntimeConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// UDP 바인드 주소 (`ip:port` 형태로 결합됨)
    pub bind_addr: String,
    /// 배치 크기 (이 개수만큼 모이면 플러시)
    pub batch_size: usize,
    /// 배치 대기 타임아웃 (초) — 타임아웃 시 비어있지 않으면 플러시
    pub batch_timeout_secs: u64,
    /// 인메모리 큐 최대 용량
    pub queue_capacity: usize,
    /// 큐 오버플로우 드롭 정책
    pub drop_policy: DropPolicy,
    /// 수신 직후 정규화 결과를 덤프할지 여부 (`LOG_DUMP`)
    pub log_dump: bool,
    /// 적재 SQL/파라미터를 덤프할지 여부 (`SQL_DUMP`)
    pub sql_dump: bool,
    /// `base.ext` 형태의 파티션 파일 템플릿. 연월마다 `base_<YYYYMM>.ext`로 전개된다.
    pub database_template: String,
}

impl Default for IngestRuntimeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_addr: "0.0.0.0:5140".to_owned(),
            batch_size: 1000,
            batch_timeout_secs: 5,
            queue_capacity: 10_000,
            drop_policy: DropPolicy::Oldest,
            log_dump: false,
            sql_dump: false,
            database_template: "syslog.sqlite3".to_owned(),
        }
    }
}

impl IngestRuntimeConfig {
    /// core의 `IngestConfig`와 `database.sqlite.database` 템플릿으로부터 런타임 설정을 생성한다.
    pub fn from_core(core: &sylogd_core::config::IngestConfig, database_template: &str) -> Self {
        Self {
            enabled: core.enabled,
            bind_addr: format!("{}:{}", core.binding_ip, core.binding_port),
            batch_size: core.batch_size,
            batch_timeout_secs: core.batch_timeout_secs,
            queue_capacity: core.queue_capacity,
            log_dump: core.log_dump,
            sql_dump: core.sql_dump,
            database_template: database_template.to_owned(),
            ..Self::default()
        }
    }

    /// 설정값의 유효성을 검증한다.
    pub fn validate(&self) -> Result<(), IngestPipelineError> {
        if self.batch_size == 0 {
            return Err(IngestPipelineError::Config {
                field: "batch_size".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.batch_timeout_secs == 0 {
            return Err(IngestPipelineError::Config {
                field: "batch_timeout_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.queue_capacity == 0 {
            return Err(IngestPipelineError::Config {
                field: "queue_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.enabled && self.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(IngestPipelineError::Config {
                field: "bind_addr".to_owned(),
                reason: format!("'{}' is not a valid socket address", self.bind_addr),
            });
        }

        Ok(())
    }
}

/// 런타임 설정 빌더
///
/// 3개 이상의 설정 필드가 있으므로 빌더 패턴을 사용한다.
#[derive(Default)]
pub struct IngestRuntimeConfigBuilder {
    config: IngestRuntimeConfig,
}

impl IngestRuntimeConfigBuilder {
    /// 새 빌더를 생성한다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 활성화 여부를 설정한다.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// 바인드 주소를 설정한다.
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_addr = addr.into();
        self
    }

    /// 배치 크기를 설정한다.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// 배치 타임아웃(초)을 설정한다.
    pub fn batch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.batch_timeout_secs = secs;
        self
    }

    /// 큐 용량을 설정한다.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// 드롭 정책을 설정한다.
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.config.drop_policy = policy;
        self
    }

    /// 설정을 검증하고 `IngestRuntimeConfig`를 생성한다.
    pub fn build(self) -> Result<IngestRuntimeConfig, IngestPipelineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
