//! CLI 전용 에러 타입과 종료 코드 매핑

use sylogd_core::error::SylogdError;

/// CLI 전용 에러 타입.
///
/// `exit_code()`가 각 variant를 표준 Unix 종료 코드로 매핑한다.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// 설정 로딩/검증 실패.
    #[error("configuration error: {0}")]
    Config(String),

    /// 서브커맨드 고유의 실행 실패.
    #[error("{0}")]
    Command(String),

    /// 출력 렌더링 중 JSON 직렬화 실패.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO 에러 (파일 읽기, stdout 쓰기 등).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// sylogd-core에서 올라온 도메인 에러.
    #[error("{0}")]
    Core(#[from] SylogdError),
}

impl CliError {
    /// 에러를 프로세스 종료 코드로 매핑한다.
    ///
    /// | 코드 | 의미                     |
    /// |------|--------------------------|
    /// | 0    | 성공                     |
    /// | 1    | 일반 / 명령 에러         |
    /// | 2    | 설정 에러                |
    /// | 10   | IO 에러                  |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}
