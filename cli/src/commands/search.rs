//! `sylogd-query search` 커맨드 핸들러

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sylogd_core::config::AppConfig;
use sylogd_core::types::LogRecord;
use sylogd_query::{available_partitions, run_search, Direction, SearchRequest};
use tracing::info;

use crate::cli::{DirectionArg, SearchArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// `search` 커맨드를 실행한다.
pub async fn execute(
    args: SearchArgs,
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let database_path = resolve_database_path(args.db, config_path).await?;

    let received_at_min = parse_timestamp(args.since.as_deref(), "--since")?;
    let received_at_max = parse_timestamp(args.until.as_deref(), "--until")?;

    let request = SearchRequest {
        database_path,
        from_host: args.from_host,
        search_query: args.query,
        received_at_min,
        received_at_max,
        last_id: args.last_id,
        direction: match args.direction {
            DirectionArg::Next => Direction::Next,
            DirectionArg::Prev => Direction::Prev,
        },
        page_size: args.page_size,
    };

    info!(db = %request.database_path, "running search");
    let response = run_search(&request);

    if let Some(ref err) = response.error {
        return Err(CliError::Command(format!("search failed: {}", err)));
    }

    writer.render(&SearchReport::from(response))?;
    Ok(())
}

/// `--db`가 주어지지 않으면 설정 파일의 파티션 템플릿에서 최신 파티션을
/// 고른다.
async fn resolve_database_path(
    db: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<String, CliError> {
    if let Some(path) = db {
        return Ok(path.to_string_lossy().into_owned());
    }

    let (path, explicit) = match config_path {
        Some(p) => (p.to_path_buf(), true),
        None => AppConfig::discover_path(),
    };
    let config = AppConfig::load_from(&path, explicit)
        .await
        .map_err(|e| CliError::Config(e.to_string()))?;

    let partitions = available_partitions(&config.database.sqlite.database)
        .map_err(|e| CliError::Command(format!("failed to list partitions: {}", e)))?;

    partitions.into_iter().next().ok_or_else(|| {
        CliError::Command(format!(
            "no partition files found matching template '{}'",
            config.database.sqlite.database
        ))
    })
}

fn parse_timestamp(raw: Option<&str>, flag: &str) -> Result<Option<DateTime<Utc>>, CliError> {
    match raw {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| CliError::Command(format!("invalid {} timestamp '{}': {}", flag, s, e))),
    }
}

/// 렌더링 가능한 검색 결과 보고서.
#[derive(Serialize)]
pub struct SearchReport {
    pub rows: Vec<LogRecord>,
    pub total_count: Option<i64>,
    pub approximate_count: bool,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub next_last_id: Option<i64>,
    pub prev_last_id: Option<i64>,
}

impl From<sylogd_query::SearchResponse> for SearchReport {
    fn from(resp: sylogd_query::SearchResponse) -> Self {
        Self {
            rows: resp.rows,
            total_count: resp.total_count,
            approximate_count: resp.approximate_count,
            has_next_page: resp.has_next_page,
            has_prev_page: resp.has_prev_page,
            next_last_id: resp.next_last_id,
            prev_last_id: resp.prev_last_id,
        }
    }
}

impl Render for SearchReport {
    fn render_text(&self, w: &mut dyn std::io::Write) -> std::io::Result<()> {
        if self.rows.is_empty() {
            writeln!(w, "no matching records")?;
            return Ok(());
        }

        for row in &self.rows {
            writeln!(
                w,
                "{:>10}  {}  {:<20}  {}",
                row.id.map(|id| id.to_string()).unwrap_or_default(),
                row.received_at.to_rfc3339(),
                row.from_host,
                row.message
            )?;
        }

        writeln!(w)?;
        match self.total_count {
            Some(count) if self.approximate_count => {
                writeln!(w, "~{} matching rows (approximate)", count)?;
            }
            Some(count) => writeln!(w, "{} matching rows", count)?,
            None => {}
        }
        if self.has_next_page {
            if let Some(id) = self.next_last_id {
                writeln!(w, "next page: --last-id {} --direction next", id)?;
            }
        }
        if self.has_prev_page {
            if let Some(id) = self.prev_last_id {
                writeln!(w, "prev page: --last-id {} --direction prev", id)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timestamp_accepts_rfc3339() {
        let parsed = parse_timestamp(Some("2026-01-01T00:00:00Z"), "--since").unwrap();
        assert!(parsed.is_some());
    }

    #[test]
    fn parse_timestamp_none_when_absent() {
        assert_eq!(parse_timestamp(None, "--since").unwrap(), None);
    }

    #[test]
    fn parse_timestamp_rejects_malformed_input() {
        let err = parse_timestamp(Some("not-a-date"), "--since").unwrap_err();
        assert!(err.to_string().contains("--since"));
    }

    #[test]
    fn search_report_renders_no_rows_message() {
        let report = SearchReport {
            rows: Vec::new(),
            total_count: Some(0),
            approximate_count: false,
            has_next_page: false,
            has_prev_page: false,
            next_last_id: None,
            prev_last_id: None,
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).unwrap();
        assert!(String::from_utf8(buffer).unwrap().contains("no matching records"));
    }

    #[test]
    fn search_report_renders_pagination_hints() {
        let row = LogRecord {
            id: Some(7),
            facility: 1,
            priority: 5,
            from_host: "host1".to_owned(),
            info_unit_id: 0,
            received_at: Utc::now(),
            device_reported_time: Utc::now(),
            sys_log_tag: "tag".to_owned(),
            process_id: "0".to_owned(),
            message: "boot sequence complete".to_owned(),
        };
        let report = SearchReport {
            rows: vec![row],
            total_count: None,
            approximate_count: false,
            has_next_page: true,
            has_prev_page: false,
            next_last_id: Some(42),
            prev_last_id: None,
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("boot sequence complete"));
        assert!(output.contains("next page: --last-id 42"));
    }
}
