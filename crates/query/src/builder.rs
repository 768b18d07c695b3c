//! SQL 조립기 (C9) — 경계(C8)와 검색 파라미터로부터 COUNT 질의와 페이지
//! 질의를 만든다.
//!
//! `WHERE` 절의 순서는 `ID >= id_lo`, `ID <= id_hi`, `FromHost = ?`,
//! FTS 서브쿼리 순으로 고정한다. FTS 서브쿼리에도 `id_lo`/`id_hi`를
//! 그대로 복사해 넣는데, 이는 원본 `web.py`의 `FromHost` + 시간 범위
//! 조합 케이스가 `INTERSECT` 서브쿼리로 ID 범위를 좁혔던 것과 같은
//! 취지다 — FTS의 rowid 조인이 인덱스 범위를 벗어나지 않도록 한다.

use rusqlite::types::Value;

/// 페이지네이션 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// 하나의 검색 요청을 표현하는 파라미터 묶음.
#[derive(Debug, Clone)]
pub struct SearchParams<'a> {
    pub id_lo: Option<i64>,
    pub id_hi: Option<i64>,
    pub from_host: Option<&'a str>,
    pub search_query: Option<&'a str>,
    pub last_id: Option<i64>,
    pub direction: Direction,
    pub page_size: u32,
}

/// 조립된 SQL과 바인드 파라미터.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

fn build_where(fts_table: &str, p: &SearchParams<'_>) -> (Vec<String>, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    if let Some(id_lo) = p.id_lo {
        clauses.push("ID >= ?".to_owned());
        params.push(Value::Integer(id_lo));
    }
    if let Some(id_hi) = p.id_hi {
        clauses.push("ID <= ?".to_owned());
        params.push(Value::Integer(id_hi));
    }
    if let Some(from_host) = p.from_host {
        clauses.push("FromHost = ?".to_owned());
        params.push(Value::Text(from_host.to_owned()));
    }
    if let Some(query) = p.search_query {
        let mut sub = format!("ID IN (SELECT rowid FROM {fts_table} WHERE Message MATCH ?");
        params.push(Value::Text(query.to_owned()));
        if let Some(id_lo) = p.id_lo {
            sub.push_str(" AND rowid >= ?");
            params.push(Value::Integer(id_lo));
        }
        if let Some(id_hi) = p.id_hi {
            sub.push_str(" AND rowid <= ?");
            params.push(Value::Integer(id_hi));
        }
        sub.push(')');
        clauses.push(sub);
    }

    (clauses, params)
}

/// 총 건수 질의 — `COUNT(*)`, 페이지네이션 절 없이 검색 조건만 반영한다.
pub fn build_count_query(table: &str, fts_table: &str, p: &SearchParams<'_>) -> BuiltQuery {
    let (clauses, params) = build_where(fts_table, p);
    let sql = if clauses.is_empty() {
        format!("SELECT COUNT(*) FROM {table}")
    } else {
        format!("SELECT COUNT(*) FROM {table} WHERE {}", clauses.join(" AND "))
    };
    BuiltQuery { sql, params }
}

/// 한 페이지 질의 — 검색 조건에 더해 커서(`last_id`)와 방향에 따른
/// 페이지네이션 절, `ORDER BY`, `LIMIT page_size + 1`을 덧붙인다.
///
/// `LIMIT`이 `page_size + 1`인 이유는 실행기(C10)가 다음/이전 페이지
/// 존재 여부를 한 행 더 읽어서 판단하기 위함이다.
pub fn build_page_query(table: &str, fts_table: &str, p: &SearchParams<'_>) -> BuiltQuery {
    let (mut clauses, mut params) = build_where(fts_table, p);

    if let Some(last_id) = p.last_id {
        match p.direction {
            Direction::Next => clauses.push("ID < ?".to_owned()),
            Direction::Prev => clauses.push("ID > ?".to_owned()),
        }
        params.push(Value::Integer(last_id));
    }

    let order = match p.direction {
        Direction::Next => "DESC",
        Direction::Prev => "ASC",
    };
    let limit = i64::from(p.page_size) + 1;

    let sql = if clauses.is_empty() {
        format!("SELECT * FROM {table} ORDER BY ID {order} LIMIT {limit}")
    } else {
        format!(
            "SELECT * FROM {table} WHERE {} ORDER BY ID {order} LIMIT {limit}",
            clauses.join(" AND ")
        )
    };

    BuiltQuery { sql, params }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_params() -> SearchParams<'static> {
        SearchParams {
            id_lo: None,
            id_hi: None,
            from_host: None,
            search_query: None,
            last_id: None,
            direction: Direction::Next,
            page_size: 50,
        }
    }

    #[test]
    fn count_query_with_no_filters() {
        let q = build_count_query("SystemEvents202506", "SystemEventsFTS202506", &base_params());
        assert_eq!(q.sql, "SELECT COUNT(*) FROM SystemEvents202506");
        assert!(q.params.is_empty());
    }

    #[test]
    fn count_query_with_id_range_and_from_host() {
        let p = SearchParams {
            id_lo: Some(10),
            id_hi: Some(200),
            from_host: Some("web01"),
            ..base_params()
        };
        let q = build_count_query("SystemEvents202506", "SystemEventsFTS202506", &p);
        assert_eq!(
            q.sql,
            "SELECT COUNT(*) FROM SystemEvents202506 WHERE ID >= ? AND ID <= ? AND FromHost = ?"
        );
        assert_eq!(q.params.len(), 3);
    }

    #[test]
    fn fts_subquery_copies_in_id_bounds() {
        let p = SearchParams {
            id_lo: Some(10),
            id_hi: Some(200),
            search_query: Some("error"),
            ..base_params()
        };
        let q = build_count_query("SystemEvents202506", "SystemEventsFTS202506", &p);
        assert!(q.sql.contains(
            "ID IN (SELECT rowid FROM SystemEventsFTS202506 WHERE Message MATCH ? AND rowid >= ? AND rowid <= ?)"
        ));
        assert_eq!(q.params.len(), 5);
    }

    #[test]
    fn page_query_next_direction_orders_descending() {
        let p = SearchParams {
            last_id: Some(500),
            direction: Direction::Next,
            page_size: 50,
            ..base_params()
        };
        let q = build_page_query("SystemEvents202506", "SystemEventsFTS202506", &p);
        assert!(q.sql.contains("WHERE ID < ?"));
        assert!(q.sql.ends_with("ORDER BY ID DESC LIMIT 51"));
    }

    #[test]
    fn page_query_prev_direction_orders_ascending() {
        let p = SearchParams {
            last_id: Some(500),
            direction: Direction::Prev,
            page_size: 50,
            ..base_params()
        };
        let q = build_page_query("SystemEvents202506", "SystemEventsFTS202506", &p);
        assert!(q.sql.contains("WHERE ID > ?"));
        assert!(q.sql.ends_with("ORDER BY ID ASC LIMIT 51"));
    }

    #[test]
    fn page_query_without_last_id_has_no_pagination_clause() {
        let p = SearchParams {
            page_size: 50,
            ..base_params()
        };
        let q = build_page_query("SystemEvents202506", "SystemEventsFTS202506", &p);
        assert_eq!(q.sql, "SELECT * FROM SystemEvents202506 ORDER BY ID DESC LIMIT 51");
    }
}
