//! `sylogd` 데몬의 커맨드라인 인자 정의.

use std::path::PathBuf;

use clap::Parser;

/// sylogd 수집 데몬.
///
/// UDP syslog 수신, 버퍼링, 월별 SQLite 파티션 적재를 담당하는 인제스트
/// 파이프라인의 생명주기(start/stop/health)를 관리한다.
#[derive(Parser, Debug)]
#[command(name = "sylogd")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// 설정 파일 경로. 지정하지 않으면 `SYLOGD_CONFIG` 환경변수, 그마저 없으면
    /// 작업 디렉토리의 `sylogd.toml`을 찾는다 (없으면 기본값으로 합성).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 로그 레벨 오버라이드 (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// 로그 형식 오버라이드 (json, pretty).
    #[arg(long)]
    pub log_format: Option<String>,

    /// 설정 파일을 검증만 하고 데몬을 시작하지 않는다.
    #[arg(long)]
    pub validate: bool,

    /// PID 파일 경로 오버라이드 (설정 파일보다 우선한다).
    #[arg(long)]
    pub pid_file: Option<String>,
}
