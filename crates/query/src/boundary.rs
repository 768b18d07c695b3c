//! 경계 탐색기 (C8) — 시간 범위를 `[id_lo, id_hi]` ID 범위로 변환한다.
//!
//! `ReceivedAt` 전체 스캔은 큰 구간에서 비싸므로, 점점 커지는 청크로
//! `ReceivedAt` 인덱스를 탐침한다. 이렇게 하면 대부분의 탐침이 인덱스의
//! 작은 슬라이스만 건드린다.
//!
//! 이 컴포넌트는 원본(`aiosyslogd`)에 대응물이 없다 — 원본의 `web.py`는
//! `ReceivedAt` 범위 조건을 직접 걸 뿐이다. 여기서는 ID 기반 키셋
//! 페이지네이션(C9)과 맞물리도록 시간을 ID로 미리 환산해두는 최적화
//! 레이어다.

use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;

use crate::error::QueryPlanError;

/// 탐침 청크 일정 (분). 일정을 넘어서는 인덱스는 마지막 값으로 고정된다.
const CHUNK_SCHEDULE_MINUTES: [i64; 4] = [5, 15, 30, 60];

/// `id_hi` 탐침의 전체 탐색 한도.
const FORWARD_SEARCH_CAP_HOURS: i64 = 24;

fn chunk_minutes(step: usize) -> i64 {
    CHUNK_SCHEDULE_MINUTES
        .get(step)
        .copied()
        .unwrap_or(*CHUNK_SCHEDULE_MINUTES.last().unwrap())
}

/// 하나의 탐침에 대한 진단 기록.
#[derive(Debug, Clone)]
pub struct ProbeTrace {
    pub description: String,
    pub elapsed_ms: f64,
}

/// 경계 탐색 결과.
#[derive(Debug, Clone, Default)]
pub struct BoundaryResult {
    pub id_lo: Option<i64>,
    pub id_hi: Option<i64>,
    pub traces: Vec<ProbeTrace>,
}

/// `t_min`/`t_max`로부터 `[id_lo, id_hi]`를 탐색한다. 어느 한쪽이든 없으면
/// 해당 경계는 계산되지 않고 `None`으로 남는다.
pub fn find_boundaries(
    conn: &Connection,
    table: &str,
    t_min: Option<DateTime<Utc>>,
    t_max: Option<DateTime<Utc>>,
) -> Result<BoundaryResult, QueryPlanError> {
    let mut result = BoundaryResult::default();

    // 특수 케이스: t_max만 있고 t_min이 없으면 id_lo = 1 (맨 처음부터).
    if t_max.is_some() && t_min.is_none() {
        result.id_lo = Some(1);
    } else if let Some(t_min) = t_min {
        let upper = t_max.unwrap_or_else(Utc::now);
        result.id_lo = probe_min_id_forward(
            conn,
            table,
            t_min,
            upper,
            LowerBound::Inclusive,
            &mut result.traces,
        )?;
    }

    if let Some(t_max) = t_max {
        result.id_hi = find_id_hi(conn, table, t_min, t_max, &mut result.traces)?;
    }

    Ok(result)
}

/// 하한 경계의 포함 여부. `id_lo` 탐침은 `t_min` 자신을 포함해야 하고,
/// `id_hi` successor 탐침은 `t_max` 자신을 제외해야 한다 — 그래야
/// `ReceivedAt == t_max`인 행이 successor로 오인되어 경계 밖으로
/// 밀려나지 않는다.
#[derive(Clone, Copy, PartialEq, Eq)]
enum LowerBound {
    Inclusive,
    Exclusive,
}

/// `cursor`부터 `upper`까지 확장 청크로 `MIN(ID)`를 탐침한다. 첫 non-empty
/// 결과에서 멈춘다. `lower`가 `Exclusive`면 `cursor` 자신과 같은
/// `ReceivedAt`은 매 청크에서 제외된다.
fn probe_min_id_forward(
    conn: &Connection,
    table: &str,
    mut cursor: DateTime<Utc>,
    upper: DateTime<Utc>,
    lower: LowerBound,
    traces: &mut Vec<ProbeTrace>,
) -> Result<Option<i64>, QueryPlanError> {
    let mut step = 0;
    while cursor < upper {
        let delta = Duration::minutes(chunk_minutes(step));
        let window_end = cursor + delta;
        let lower_op = match lower {
            LowerBound::Inclusive => ">=",
            LowerBound::Exclusive => ">",
        };
        let sql =
            format!("SELECT MIN(ID) FROM {table} WHERE ReceivedAt {lower_op} ?1 AND ReceivedAt < ?2");
        let start = std::time::Instant::now();
        let found: Option<i64> = conn.query_row(
            &sql,
            rusqlite::params![cursor.to_rfc3339(), window_end.to_rfc3339()],
            |row| row.get(0),
        )?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(table, %cursor, %window_end, ?found, elapsed_ms, "boundary probe");
        traces.push(ProbeTrace {
            description: format!("probe MIN(ID) in ({cursor}, {window_end}), lower={lower_op}"),
            elapsed_ms,
        });

        if found.is_some() {
            return Ok(found);
        }
        cursor = window_end;
        step += 1;
    }
    Ok(None)
}

/// `t_max` 직후의 successor ID를 찾아 `id_hi = successor - 1`을 도출한다.
/// successor 탐침은 `ReceivedAt > t_max`(배타적)로 걸어야 한다 —
/// `id_lo` 탐침과 같은 포함 하한을 쓰면 `ReceivedAt == t_max`인 행이
/// successor로 오인되어 `id_hi`가 그 행 자신을 제외해버린다. 24시간
/// 내에 successor가 없으면 `MAX(ID) WHERE ReceivedAt <= t_max`로 폴백한다.
fn find_id_hi(
    conn: &Connection,
    table: &str,
    t_min: Option<DateTime<Utc>>,
    t_max: DateTime<Utc>,
    traces: &mut Vec<ProbeTrace>,
) -> Result<Option<i64>, QueryPlanError> {
    let cap = t_max + Duration::hours(FORWARD_SEARCH_CAP_HOURS);
    if let Some(successor) =
        probe_min_id_forward(conn, table, t_max, cap, LowerBound::Exclusive, traces)?
    {
        return Ok(Some(successor - 1));
    }

    let start = std::time::Instant::now();
    let sql = match t_min {
        Some(_) => format!("SELECT MAX(ID) FROM {table} WHERE ReceivedAt <= ?1 AND ReceivedAt >= ?2"),
        None => format!("SELECT MAX(ID) FROM {table} WHERE ReceivedAt <= ?1"),
    };
    let id_hi: Option<i64> = if let Some(t_min) = t_min {
        conn.query_row(
            &sql,
            rusqlite::params![t_max.to_rfc3339(), t_min.to_rfc3339()],
            |row| row.get(0),
        )?
    } else {
        conn.query_row(&sql, rusqlite::params![t_max.to_rfc3339()], |row| {
            row.get(0)
        })?
    };
    traces.push(ProbeTrace {
        description: format!("fallback MAX(ID) WHERE ReceivedAt <= {t_max}"),
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    });
    Ok(id_hi)
}
