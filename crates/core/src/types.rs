//! 도메인 타입 — LogRecord, 파티션 키, 우선순위 이름표

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// severity 이름표. 인덱스가 곧 값이다 (0=emergency .. 7=debug).
pub const SEVERITY_NAMES: [&str; 8] = [
    "emergency",
    "alert",
    "critical",
    "error",
    "warning",
    "notice",
    "info",
    "debug",
];

/// facility 이름표. 인덱스가 곧 값이다 (0=kernel .. 23=local7).
pub const FACILITY_NAMES: [&str; 24] = [
    "kernel", "user", "mail", "system", "security0", "syslog", "lpd", "nntp", "uucp", "time",
    "security1", "ftpd", "ntpd", "logaudit", "logalert", "clock", "local0", "local1", "local2",
    "local3", "local4", "local5", "local6", "local7",
];

/// `-` 필드를 만났을 때 치환되는 고정값.
pub const UNKNOWN_TAG: &str = "UNKNOWN";
pub const UNKNOWN_PROCID: &str = "0";

/// 하나의 syslog 레코드에 대해 영속화되고 조회되는 최종 단위.
///
/// `id`는 파티션에 적재되기 전에는 `None`, 커밋 후에는 `Some(rowid)`이다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: Option<i64>,
    pub facility: u8,
    pub priority: u8,
    pub from_host: String,
    pub info_unit_id: i32,
    pub received_at: DateTime<Utc>,
    pub device_reported_time: DateTime<Utc>,
    pub sys_log_tag: String,
    pub process_id: String,
    pub message: String,
}

impl LogRecord {
    /// 이 레코드가 속하는 파티션 키 (`ReceivedAt` 기준).
    pub fn partition(&self) -> YearMonth {
        YearMonth::from_datetime(self.received_at)
    }
}

/// `YYYYMM` 형식의 파티션 키. 월 단위 테이블/FTS 인덱스 명명에 사용한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth(u32);

impl YearMonth {
    /// `ReceivedAt`의 연월로부터 키를 도출한다.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        use chrono::Datelike;
        Self((dt.year() as u32) * 100 + dt.month())
    }

    /// `^\d{6}$`를 만족하는 문자열로부터만 구성한다. 테이블명을 SQL에 보간하기 전 필수 검증 지점.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u32 = s.parse().ok()?;
        let month = value % 100;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self(value))
    }

    /// `YYYYMM`의 정수 표현.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn base_table_name(self) -> String {
        format!("SystemEvents{}", self.0)
    }

    pub fn fts_table_name(self) -> String {
        format!("SystemEventsFTS{}", self.0)
    }

    pub fn received_at_index_name(self) -> String {
        format!("idx_ReceivedAt_{}", self.0)
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn year_month_from_datetime() {
        let dt = Utc.with_ymd_and_hms(2025, 6, 11, 12, 0, 0).unwrap();
        assert_eq!(YearMonth::from_datetime(dt).as_u32(), 202506);
    }

    #[test]
    fn year_month_table_names() {
        let ym = YearMonth::parse("202506").unwrap();
        assert_eq!(ym.base_table_name(), "SystemEvents202506");
        assert_eq!(ym.fts_table_name(), "SystemEventsFTS202506");
        assert_eq!(ym.received_at_index_name(), "idx_ReceivedAt_202506");
    }

    #[test]
    fn year_month_parse_rejects_bad_input() {
        assert!(YearMonth::parse("20250a").is_none());
        assert!(YearMonth::parse("2025006").is_none());
        assert!(YearMonth::parse("202513").is_none());
        assert!(YearMonth::parse("202500").is_none());
        assert!(YearMonth::parse("'; DROP TABLE x; --").is_none());
    }

    #[test]
    fn year_month_parse_accepts_valid() {
        assert_eq!(YearMonth::parse("202506").unwrap().as_u32(), 202506);
        assert_eq!(YearMonth::parse("000001").unwrap().as_u32(), 1);
    }

    #[test]
    fn year_month_ordering_is_chronological() {
        let a = YearMonth::parse("202505").unwrap();
        let b = YearMonth::parse("202506").unwrap();
        assert!(a < b);
    }
}
