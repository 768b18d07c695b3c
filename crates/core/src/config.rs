//! 설정 관리 — `sylogd.toml` 파싱, 환경변수 오버레이, 런타임 설정

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// `database.driver`로 허용되는 값의 집합. 알 수 없는 값은 [`AppConfig::validate`]에서 거부한다.
pub const ALLOWED_DRIVERS: [&str; 2] = ["sqlite", "meilisearch"];

/// 설정 파일 경로를 오버라이드하는 환경변수.
pub const CONFIG_PATH_ENV_VAR: &str = "SYLOGD_CONFIG";

/// 작업 디렉토리에서 찾는 기본 설정 파일명.
pub const DEFAULT_CONFIG_FILENAME: &str = "sylogd.toml";

/// sylogd 통합 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub database: DatabaseConfig,
    pub ingest: IngestConfig,
    pub web_server: WebServerConfig,
    pub metrics: MetricsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            database: DatabaseConfig::default(),
            ingest: IngestConfig::default(),
            web_server: WebServerConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// 일반 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    pub data_dir: String,
    pub pid_file: String,
    /// `DEBUG` 환경변수에 대응. 파서/정규화 실패 시 진단 이벤트를 남긴다.
    pub debug: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            data_dir: ".".to_owned(),
            pid_file: "/var/run/sylogd.pid".to_owned(),
            debug: false,
        }
    }
}

/// `database` 섹션. `driver`는 [`ALLOWED_DRIVERS`] 중 하나여야 하며, 문자열로 보관하고
/// [`AppConfig::validate`]에서 명시적으로 검증한다 — enum deserialize에 맡기면 파싱 실패와
/// "알 수 없는 드라이버" 실패가 뒤섞여 진단 메시지가 흐려진다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub driver: String,
    pub sqlite: SqliteConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: "sqlite".to_owned(),
            sqlite: SqliteConfig::default(),
        }
    }
}

/// SQLite 드라이버 설정. `database`는 `base.ext` 형태의 템플릿 경로로,
/// 파티션마다 `base_<YYYYMM>.ext`로 전개된다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    pub database: String,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            database: "syslog.sqlite3".to_owned(),
        }
    }
}

/// 수집(ingest) 설정. 배치 작성기/UDP 리시버가 공유하는 파라미터.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub enabled: bool,
    pub binding_ip: String,
    pub binding_port: u16,
    /// `BATCH_SIZE` 기본값 1000.
    pub batch_size: usize,
    /// `BATCH_TIMEOUT` 기본값 5초.
    pub batch_timeout_secs: u64,
    /// 수신 큐 용량. 초과분은 드롭 정책에 따라 버려진다.
    pub queue_capacity: usize,
    /// `LOG_DUMP` 환경변수에 대응 — 정규화된 메시지를 표준 로그로 덤프한다.
    pub log_dump: bool,
    /// `SQL_DUMP` 환경변수에 대응 — 실행되는 SQL과 파라미터를 덤프한다.
    pub sql_dump: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            binding_ip: "0.0.0.0".to_owned(),
            binding_port: 5140,
            batch_size: 1000,
            batch_timeout_secs: 5,
            queue_capacity: 10_000,
            log_dump: false,
            sql_dump: false,
        }
    }
}

/// 질의(웹 조회) 설정. HTTP/템플릿 레이어는 범위 밖이지만, 바인딩 주소와
/// 운영에 필요한 최소 파라미터는 설정 문서 형식으로 유지한다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebServerConfig {
    pub bind_ip: String,
    pub bind_port: u16,
    pub debug: bool,
    /// 로그 메시지 내 민감정보 레다크션 활성화 여부.
    pub redact: bool,
    pub users_file: String,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            bind_ip: "127.0.0.1".to_owned(),
            bind_port: 5141,
            debug: false,
            redact: false,
            users_file: String::new(),
        }
    }
}

/// Prometheus 메트릭 노출 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub bind_ip: String,
    pub bind_port: u16,
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_ip: "127.0.0.1".to_owned(),
            bind_port: 9090,
            endpoint: "/metrics".to_owned(),
        }
    }
}

impl AppConfig {
    /// 설정 경로를 결정한다. 환경변수가 우선하며, 없으면 작업 디렉토리의 고정 파일명을 쓴다.
    /// 반환값의 두 번째 요소는 "명시적으로 지정된 경로인가"이다 — 명시 경로가 없으면
    /// 기본 설정으로 합성(synthesize)하고, 있으면 없을 때 하드 에러로 취급한다.
    pub fn discover_path() -> (PathBuf, bool) {
        match std::env::var(CONFIG_PATH_ENV_VAR) {
            Ok(path) => (PathBuf::from(path), true),
            Err(_) => (PathBuf::from(DEFAULT_CONFIG_FILENAME), false),
        }
    }

    /// 설정을 로드한다. 기본 파일이 없으면 기본값으로 합성해 반환하고, 명시적으로
    /// 지정된 파일이 없으면 에러를 반환한다 (호출자는 프로세스를 비정상 종료해야 한다).
    pub async fn load() -> Result<Self, ConfigError> {
        let (path, explicit) = Self::discover_path();
        Self::load_from(&path, explicit).await
    }

    /// 명시된 경로로부터 로드한다. `explicit`이 `true`면 파일이 없을 때 하드
    /// 에러로 취급하고, `false`면 기본값으로 합성한다. CLI에서 `--config`로
    /// 명시 경로를 받았을 때 `explicit = true`로 호출한다.
    pub async fn load_from(path: &Path, explicit: bool) -> Result<Self, ConfigError> {
        if !path.exists() {
            if explicit {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            return Ok(Self::default());
        }

        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::ParseFailed {
                reason: e.to_string(),
            })?;

        let mut config: AppConfig =
            toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed {
                reason: e.to_string(),
            })?;

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 환경변수로 설정을 덮어쓴다. 불리언 변수는 리터럴 문자열 `"True"`만 참으로 받아들인다.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DEBUG") {
            self.general.debug = is_true(&v);
        }
        if let Ok(v) = std::env::var("LOG_DUMP") {
            self.ingest.log_dump = is_true(&v);
        }
        if let Ok(v) = std::env::var("SQL_DUMP") {
            self.ingest.sql_dump = is_true(&v);
        }
        if let Ok(v) = std::env::var("SQL_WRITE") {
            self.ingest.enabled = is_true(&v);
        }
        if let Ok(v) = std::env::var("BINDING_IP") {
            self.ingest.binding_ip = v;
        }
        if let Ok(v) = std::env::var("BINDING_PORT") {
            if let Ok(port) = v.parse() {
                self.ingest.binding_port = port;
            }
        }
        if let Ok(v) = std::env::var("BATCH_SIZE") {
            if let Ok(n) = v.parse() {
                self.ingest.batch_size = n;
            }
        }
        if let Ok(v) = std::env::var("BATCH_TIMEOUT") {
            if let Ok(n) = v.parse() {
                self.ingest.batch_timeout_secs = n;
            }
        }
    }

    /// 드라이버 선택지를 명시적으로 검증하고, 그 외 필수 불변식을 점검한다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !ALLOWED_DRIVERS.contains(&self.database.driver.as_str()) {
            return Err(ConfigError::UnknownDriver {
                driver: self.database.driver.clone(),
            });
        }
        if self.ingest.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ingest.batch_size".to_owned(),
                reason: "must be non-zero".to_owned(),
            });
        }
        if self.ingest.batch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ingest.batch_timeout_secs".to_owned(),
                reason: "must be non-zero".to_owned(),
            });
        }
        if self.ingest.queue_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ingest.queue_capacity".to_owned(),
                reason: "must be non-zero".to_owned(),
            });
        }
        Ok(())
    }
}

fn is_true(value: &str) -> bool {
    value == "True"
}
