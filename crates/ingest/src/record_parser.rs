//! 구조화 레코드 추출 (C3) — 정규 RFC 5424 문자열 → `LogRecord`
//!
//! RFC 5424 문법(`pri, ver, ts, host, app, pid, msgid, sd, msg`)에 맞으면
//! 필드별로 추출하고, 전혀 맞지 않으면 fail-open 레코드를 만든다. 이 경로를
//! 거치면 더 이상 데이터그램이 조용히 유실되지 않는다.

use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use sylogd_core::types::{LogRecord, UNKNOWN_PROCID, UNKNOWN_TAG};

use crate::priority;

/// 기본 PRI (RFC 5424 그래머가 전혀 맞지 않고 `<N>`도 없을 때 사용).
const DEFAULT_PRI: u16 = 14;

/// 정규화된 메시지를 `LogRecord`로 파싱한다. UTF-8이 아닌 입력은 `None`
/// (디코딩 실패, 조용히 드롭).
pub fn parse(bytes: &[u8], peer: SocketAddr, received_at: DateTime<Utc>) -> Option<LogRecord> {
    let text = std::str::from_utf8(bytes).ok()?;
    Some(parse_str(text, peer, received_at))
}

fn parse_str(text: &str, peer: SocketAddr, received_at: DateTime<Utc>) -> LogRecord {
    match parse_rfc5424(text, peer, received_at) {
        Some(record) => record,
        None => fail_open(text, peer, received_at),
    }
}

/// `<PRI>1 TS HOST APP PROCID MSGID SD MSG` 문법에 맞춰 파싱한다.
fn parse_rfc5424(text: &str, peer: SocketAddr, received_at: DateTime<Utc>) -> Option<LogRecord> {
    let text = text.trim_start();
    let rest = text.strip_prefix('<')?;
    let (pri_str, rest) = rest.split_once('>')?;
    if pri_str.is_empty() || !pri_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let rest = rest.strip_prefix('1')?;
    let rest = rest.strip_prefix(char::is_whitespace)?;

    let mut parts = rest.trim_start().splitn(6, ' ');
    let ts = parts.next()?;
    let host = parts.next()?;
    let app = parts.next()?;
    let pid = parts.next()?;
    let msgid = parts.next()?;
    let sd_and_msg = parts.next().unwrap_or("");
    // SD + MSG are not space-delimited in general (SD can contain spaces inside
    // brackets); this pipeline only ever emits "-" SD from the normalizer, so a
    // single split on the next space is sufficient here.
    let (_sd, msg) = sd_and_msg.split_once(' ').unwrap_or((sd_and_msg, ""));

    let (facility, severity) = priority::decode_str(pri_str);

    let from_host = if host == "-" {
        peer.ip().to_string()
    } else {
        host.to_owned()
    };
    let sys_log_tag = if app == "-" {
        UNKNOWN_TAG.to_owned()
    } else {
        app.to_owned()
    };
    let process_id = if pid == "-" {
        UNKNOWN_PROCID.to_owned()
    } else {
        pid.to_owned()
    };
    let _ = msgid;

    let device_reported_time = DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(received_at);

    Some(LogRecord {
        id: None,
        facility,
        priority: severity,
        from_host,
        info_unit_id: 1,
        received_at,
        device_reported_time,
        sys_log_tag,
        process_id,
        message: msg.to_owned(),
    })
}

/// 5424 그래머가 전혀 맞지 않을 때의 최후 경로.
fn fail_open(text: &str, peer: SocketAddr, received_at: DateTime<Utc>) -> LogRecord {
    let pri = extract_pri_or_default(text);
    let (facility, severity) = priority::decode(pri);

    LogRecord {
        id: None,
        facility,
        priority: severity,
        from_host: peer.ip().to_string(),
        info_unit_id: 1,
        received_at,
        device_reported_time: received_at,
        sys_log_tag: UNKNOWN_TAG.to_owned(),
        process_id: UNKNOWN_PROCID.to_owned(),
        message: text.to_owned(),
    }
}

fn extract_pri_or_default(text: &str) -> u16 {
    let Some(rest) = text.trim_start().strip_prefix('<') else {
        return DEFAULT_PRI;
    };
    let Some((pri_str, _)) = rest.split_once('>') else {
        return DEFAULT_PRI;
    };
    pri_str.parse().unwrap_or(DEFAULT_PRI)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn peer() -> SocketAddr {
        "203.0.113.5:9999".parse().unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_well_formed_rfc5424() {
        let msg = "<34>1 2026-06-15T08:12:00.000Z myhost sshd 1234 - - login failed";
        let record = parse(msg.as_bytes(), peer(), now()).unwrap();
        assert_eq!(record.facility, 4);
        assert_eq!(record.priority, 2);
        assert_eq!(record.from_host, "myhost");
        assert_eq!(record.sys_log_tag, "sshd");
        assert_eq!(record.process_id, "1234");
        assert_eq!(record.message, "login failed");
        assert_eq!(
            record.device_reported_time,
            Utc.with_ymd_and_hms(2026, 6, 15, 8, 12, 0).unwrap()
        );
    }

    #[test]
    fn dash_fields_resolve_to_fallbacks() {
        let msg = "<13>1 2026-06-15T08:12:00.000Z - - - - - no hostname here";
        let record = parse(msg.as_bytes(), peer(), now()).unwrap();
        assert_eq!(record.from_host, "203.0.113.5");
        assert_eq!(record.sys_log_tag, "UNKNOWN");
        assert_eq!(record.process_id, "0");
    }

    #[test]
    fn unparseable_timestamp_falls_back_to_received_at() {
        let msg = "<13>1 not-a-timestamp host app 1 - - msg";
        let record = parse(msg.as_bytes(), peer(), now()).unwrap();
        assert_eq!(record.device_reported_time, now());
    }

    #[test]
    fn fail_open_extracts_pri_when_present() {
        let msg = "<40>completely malformed garbage with no RFC5424 shape";
        let record = parse(msg.as_bytes(), peer(), now()).unwrap();
        let (facility, severity) = priority::decode(40);
        assert_eq!(record.facility, facility);
        assert_eq!(record.priority, severity);
        assert_eq!(record.sys_log_tag, "UNKNOWN");
        assert_eq!(record.process_id, "0");
        assert_eq!(record.from_host, "203.0.113.5");
        assert_eq!(record.message, msg);
    }

    #[test]
    fn fail_open_defaults_pri_when_absent() {
        let msg = "no angle brackets at all";
        let record = parse(msg.as_bytes(), peer(), now()).unwrap();
        let (facility, severity) = priority::decode(14);
        assert_eq!(record.facility, facility);
        assert_eq!(record.priority, severity);
    }

    #[test]
    fn invalid_utf8_is_dropped() {
        let bytes: &[u8] = &[0xff, 0xfe, 0xfd];
        assert!(parse(bytes, peer(), now()).is_none());
    }

    #[test]
    fn never_panics_on_arbitrary_short_inputs() {
        for s in ["", "<", ">", "<>", "<1", "1>", "<999999999999999999>1 x"] {
            let _ = parse(s.as_bytes(), peer(), now());
        }
    }
}
