//! 파티션 매니저 (C4) — 연월별 SQLite 파일/테이블/인덱스/FTS 테이블 존재 보장
//!
//! 설정의 `base.ext` 템플릿은 연월마다 `base_<YYYYMM>.ext` 파일로 전개된다
//! (§6). `connection_for(ym)`은 멱등적이다: 이미 열려 있는 연결이 있으면
//! 즉시 반환하고, 아니면 파일을 열어 베이스 테이블, `ReceivedAt` 인덱스,
//! contentless FTS5 테이블을 생성한 뒤 캐시에 넣는다. 캐시는 생성이 실제로
//! 커밋된 뒤에만 갱신된다 (§3 invariant).

use std::collections::HashMap;
use std::path::PathBuf;

use rusqlite::Connection;
use sylogd_core::types::YearMonth;

use crate::error::IngestPipelineError;

/// 연월별 파티션 파일(연결 + 테이블/인덱스/FTS)의 존재를 보장하고 연결을 캐시한다.
pub struct PartitionManager {
    database_template: String,
    connections: HashMap<YearMonth, Connection>,
}

impl PartitionManager {
    pub fn new(database_template: impl Into<String>) -> Self {
        Self {
            database_template: database_template.into(),
            connections: HashMap::new(),
        }
    }

    /// `ym`에 해당하는 파티션 파일의 연결을 보장하고 반환한다.
    ///
    /// C5(배치 작성기)만이 호출하는 단일-writer 전제이므로 내부 캐시는
    /// 락 없이 갱신된다.
    pub fn connection_for(&mut self, ym: YearMonth) -> Result<&Connection, IngestPipelineError> {
        if !self.connections.contains_key(&ym) {
            let path = partition_path(&self.database_template, ym);
            let conn = open_and_prepare(&path, ym).map_err(|e| IngestPipelineError::Partition {
                year_month: ym.to_string(),
                reason: e.to_string(),
            })?;
            self.connections.insert(ym, conn);
        }
        Ok(self
            .connections
            .get(&ym)
            .expect("just inserted above"))
    }
}

/// `base.ext` 템플릿을 `base_<YYYYMM>.ext`로 전개한다.
fn partition_path(template: &str, ym: YearMonth) -> PathBuf {
    match template.rsplit_once('.') {
        Some((base, ext)) => PathBuf::from(format!("{base}_{ym}.{ext}")),
        None => PathBuf::from(format!("{template}_{ym}")),
    }
}

fn open_and_prepare(path: &std::path::Path, ym: YearMonth) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "auto_vacuum", "FULL")?;
    create_partition(&conn, ym)?;
    Ok(conn)
}

fn create_partition(conn: &Connection, ym: YearMonth) -> rusqlite::Result<()> {
    let base_table = ym.base_table_name();
    let fts_table = ym.fts_table_name();
    let index_name = ym.received_at_index_name();

    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {base_table} (
            ID INTEGER PRIMARY KEY AUTOINCREMENT,
            Facility INTEGER,
            Priority INTEGER,
            FromHost TEXT,
            InfoUnitID INTEGER,
            ReceivedAt TIMESTAMP,
            DeviceReportedTime TIMESTAMP,
            SysLogTag TEXT,
            ProcessID TEXT,
            Message TEXT
        );
        CREATE INDEX IF NOT EXISTS {index_name} ON {base_table} (ReceivedAt);
        CREATE VIRTUAL TABLE IF NOT EXISTS {fts_table} USING fts5(
            Message,
            content='{base_table}',
            content_rowid='ID'
        );"
    ))
}
