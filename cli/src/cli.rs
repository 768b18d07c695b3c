//! CLI 인자 정의 -- clap derive API 사용.
//!
//! 선언적 구조만 담당한다. 부수효과나 I/O는 전부 `commands/` 쪽에 있다.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// sylogd-query -- 월별 SQLite 파티션에 대한 syslog 조회 CLI.
///
/// 서브커맨드 상세는 `sylogd-query <COMMAND> --help`로 확인한다.
#[derive(Parser, Debug)]
#[command(name = "sylogd-query", version, about, long_about = None)]
pub struct Cli {
    /// sylogd.toml 설정 파일 경로. 지정하지 않으면 `SYLOGD_CONFIG` 환경
    /// 변수, 없으면 기본 파일명을 순서대로 탐색한다.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 로그 레벨 재정의 (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// 출력 형식.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// 지원하는 출력 형식.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// 사람이 읽기 좋은 표 형태 텍스트.
    Text,
    /// 기계 판독용 JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 파티션 SQLite 파일에 대해 시간/호스트/전문 검색을 실행한다.
    Search(SearchArgs),

    /// 설정을 다루는 서브커맨드.
    Config(ConfigArgs),
}

// ---- search ----

/// 질의 실행기를 실행해 결과 한 페이지를 가져온다.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// 조회할 파티션 SQLite 파일 경로 (`base_<YYYYMM>.ext`). 생략하면
    /// 설정의 `database.sqlite.database` 템플릿에서 가장 최근 파티션을
    /// 고른다.
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// 전문 검색어 (FTS5 MATCH 문법). 생략 시 메시지 내용으로 필터링하지
    /// 않는다.
    #[arg(long)]
    pub query: Option<String>,

    /// `FromHost`로 정확히 일치시킨다.
    #[arg(long)]
    pub from_host: Option<String>,

    /// 하한 시각 (RFC 3339, 예: `2026-01-01T00:00:00Z`).
    #[arg(long)]
    pub since: Option<String>,

    /// 상한 시각 (RFC 3339).
    #[arg(long)]
    pub until: Option<String>,

    /// 한 페이지당 행 수.
    #[arg(long, default_value_t = 50)]
    pub page_size: u32,

    /// 이전 페이지 응답이 돌려준 커서 ID. 첫 페이지는 생략한다.
    #[arg(long)]
    pub last_id: Option<i64>,

    /// 탐색 방향.
    #[arg(long, value_enum, default_value_t = DirectionArg::Next)]
    pub direction: DirectionArg,
}

/// 탐색 방향 (clap 표현). `sylogd_query::Direction`으로 변환된다.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum DirectionArg {
    Next,
    Prev,
}

// ---- config ----

/// 설정을 다룬다.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// 설정 파일을 검증하고 결과를 보고한다.
    Validate,
    /// 유효 설정(파일 + 환경 변수 재정의 + 기본값)을 보여준다.
    Show,
}
