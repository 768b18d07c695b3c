//! 로그 질의 실행기 (C10) — 경계 탐색(C8)과 SQL 조립(C9)을 묶어 하나의
//! 검색 요청을 실행하고 페이지네이션 정보를 도출한다.
//!
//! 선택된 파티션 파일은 `mode=ro` URI로 읽기 전용 연결을 연다 — 인제스트
//! 경로와 절대 경합하지 않는다. 내부에서 나는 어떤 에러도 호출자에게
//! 전파하지 않는다: 전부 `SearchResponse::error`에 담겨 돌아온다 (원본
//! `web.py`가 `aiosqlite.OperationalError`/`DatabaseError`만 좁게 잡아
//! 문자열로 남기고 절대 올리지 않는 것과 동일한 태도).

use rusqlite::{Connection, OpenFlags};
use sylogd_core::types::{LogRecord, YearMonth};

use crate::boundary::find_boundaries;
use crate::builder::{build_count_query, build_page_query, Direction, SearchParams};
use crate::error::QueryPlanError;

/// `Δ`만큼의 여유를 두고 `id_lo`를 좁히는 근사 카운트 보정 폭.
const APPROXIMATE_COUNT_SLACK: i64 = 50;

/// 하나의 검색 요청.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub database_path: String,
    pub from_host: Option<String>,
    pub search_query: Option<String>,
    pub received_at_min: Option<chrono::DateTime<chrono::Utc>>,
    pub received_at_max: Option<chrono::DateTime<chrono::Utc>>,
    pub last_id: Option<i64>,
    pub direction: Direction,
    pub page_size: u32,
}

/// 검색 결과와 페이지네이션 정보. 실행 중 에러는 `error`에만 남고 다른
/// 필드는 빈 상태로 채워진다 — 호출자는 항상 이 구조체를 받는다.
#[derive(Debug, Clone, Default)]
pub struct SearchResponse {
    pub rows: Vec<LogRecord>,
    pub total_count: Option<i64>,
    pub approximate_count: bool,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub next_last_id: Option<i64>,
    pub prev_last_id: Option<i64>,
    pub error: Option<String>,
}

/// 검색을 실행한다. 내부 에러는 절대 `panic`하거나 전파되지 않고
/// `SearchResponse::error`로 귀결된다.
pub fn run_search(req: &SearchRequest) -> SearchResponse {
    match execute(req) {
        Ok(resp) => resp,
        Err(err) => SearchResponse {
            error: Some(err.to_string()),
            ..Default::default()
        },
    }
}

fn execute(req: &SearchRequest) -> Result<SearchResponse, QueryPlanError> {
    let ym = year_month_from_path(&req.database_path).ok_or_else(|| {
        QueryPlanError::PartitionNotFound {
            path: req.database_path.clone(),
        }
    })?;
    let conn = open_read_only(&req.database_path)?;

    let base_table = ym.base_table_name();
    let fts_table = ym.fts_table_name();

    let has_time_bound = req.received_at_min.is_some() || req.received_at_max.is_some();
    let boundary = if has_time_bound {
        find_boundaries(&conn, &base_table, req.received_at_min, req.received_at_max)?
    } else {
        Default::default()
    };

    let has_search = req
        .search_query
        .as_deref()
        .is_some_and(|s| !s.is_empty());
    let has_from_host = req
        .from_host
        .as_deref()
        .is_some_and(|s| !s.is_empty());
    let use_approximate_count = !has_search && !has_from_host && has_time_bound;

    let mut id_lo = boundary.id_lo;
    let id_hi = boundary.id_hi;

    // 첫 페이지(last_id 없음)에서 근사 카운트를 쓸 때만 id_lo를 좁힌다 —
    // 실제 스캔 범위를 page_size 근방으로 줄이는 최적화.
    if use_approximate_count && req.last_id.is_none() {
        if let Some(id_hi) = id_hi {
            let lower = id_lo.unwrap_or(1);
            let tightened = id_hi - i64::from(req.page_size) - APPROXIMATE_COUNT_SLACK;
            id_lo = Some(lower.max(tightened));
        }
    }

    let params = SearchParams {
        id_lo,
        id_hi,
        from_host: req.from_host.as_deref(),
        search_query: req.search_query.as_deref(),
        last_id: req.last_id,
        direction: req.direction,
        page_size: req.page_size,
    };

    // 산술 근사는 id_hi까지 알아야 성립한다 (t_max 없이 t_min만 주어진
    // 경우는 상한이 없어 정확한 COUNT로 돌아간다).
    let can_approximate = use_approximate_count && id_hi.is_some();
    let total_count = if can_approximate {
        id_hi.map(|hi| (hi - id_lo.unwrap_or(1)) + 1)
    } else {
        let count_query = build_count_query(&base_table, &fts_table, &params);
        let count: i64 = conn.query_row(
            &count_query.sql,
            rusqlite::params_from_iter(count_query.params.iter()),
            |row| row.get(0),
        )?;
        Some(count)
    };

    let page_query = build_page_query(&base_table, &fts_table, &params);
    let mut stmt = conn.prepare(&page_query.sql)?;
    let mut rows: Vec<LogRecord> = stmt
        .query_map(rusqlite::params_from_iter(page_query.params.iter()), |row| {
            Ok(LogRecord {
                id: row.get(0)?,
                facility: row.get(1)?,
                priority: row.get(2)?,
                from_host: row.get(3)?,
                info_unit_id: row.get(4)?,
                received_at: row.get(5)?,
                device_reported_time: row.get(6)?,
                sys_log_tag: row.get(7)?,
                process_id: row.get(8)?,
                message: row.get(9)?,
            })
        })?
        .collect::<Result<_, _>>()?;

    let has_more = rows.len() > req.page_size as usize;
    rows.truncate(req.page_size as usize);
    if req.direction == Direction::Prev {
        rows.reverse();
    }

    let newest_id = rows.first().and_then(|r| r.id);
    let oldest_id = rows.last().and_then(|r| r.id);

    let (has_next_page, next_last_id, has_prev_page, prev_last_id) = match req.direction {
        Direction::Next => {
            let has_next = has_more;
            let has_prev = req.last_id.is_some();
            (
                has_next,
                has_next.then_some(oldest_id).flatten(),
                has_prev,
                has_prev.then_some(newest_id).flatten(),
            )
        }
        Direction::Prev => {
            let has_prev = has_more;
            (
                true,
                oldest_id,
                has_prev,
                has_prev.then_some(newest_id).flatten(),
            )
        }
    };

    Ok(SearchResponse {
        rows,
        total_count,
        approximate_count: can_approximate,
        has_next_page,
        has_prev_page,
        next_last_id,
        prev_last_id,
        error: None,
    })
}

fn year_month_from_path(path: &str) -> Option<YearMonth> {
    let stem = std::path::Path::new(path).file_stem()?.to_str()?;
    let (_, suffix) = stem.rsplit_once('_')?;
    YearMonth::parse(suffix)
}

fn open_read_only(path: &str) -> rusqlite::Result<Connection> {
    let uri = format!("file:{path}?mode=ro");
    Connection::open_with_flags(
        uri,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
    )
}
