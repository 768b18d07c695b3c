//! `sylogd-query config` 커맨드 핸들러

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use sylogd_core::config::AppConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// `config` 커맨드를 실행한다.
pub async fn execute(
    args: ConfigArgs,
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let (path, explicit) = match config_path {
        Some(p) => (p.to_path_buf(), true),
        None => AppConfig::discover_path(),
    };

    match args.action {
        ConfigAction::Validate => execute_validate(&path, explicit, writer).await,
        ConfigAction::Show => execute_show(&path, explicit, writer).await,
    }
}

/// 설정 파일을 로드/검증하고 결과를 보고한다.
async fn execute_validate(
    path: &Path,
    explicit: bool,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %path.display(), "validating configuration");

    let report = match AppConfig::load_from(path, explicit).await {
        Ok(config) => match config.validate() {
            Ok(()) => ConfigValidationReport {
                source: path.display().to_string(),
                valid: true,
                errors: Vec::new(),
            },
            Err(e) => ConfigValidationReport {
                source: path.display().to_string(),
                valid: false,
                errors: vec![e.to_string()],
            },
        },
        Err(e) => ConfigValidationReport {
            source: path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// 유효 설정(파일 + 환경 변수 재정의 + 기본값)을 보여준다.
async fn execute_show(path: &Path, explicit: bool, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %path.display(), "loading configuration");

    let mut config = AppConfig::load_from(path, explicit)
        .await
        .map_err(|e| CliError::Config(e.to_string()))?;
    config.apply_env_overrides();

    let report = ConfigReport {
        source: path.display().to_string(),
        config_toml: toml::to_string_pretty(&config)
            .unwrap_or_else(|e| format!("(serialization error: {})", e)),
    };

    writer.render(&report)?;

    Ok(())
}

/// 설정 표시 보고서.
#[derive(Serialize)]
pub struct ConfigReport {
    pub source: String,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Configuration (source: {})", self.source.bold())?;
        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// 설정 검증 보고서.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}
