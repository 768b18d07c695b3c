//! 메시지 정규화 (C2) — RFC 3164 → RFC 5424 베스트 에포트 변환
//!
//! 입력 텍스트 메시지를 받아 `<PRI>1 TIMESTAMP HOST APP PROCID MSGID SD MSG`
//! (MSGID=SD=`-`) 형태의 정규 RFC 5424 문자열을 돌려준다. 이미 5424 형식이면
//! 그대로 반환하고, 3164 패턴조차 맞지 않으면 원문을 그대로 반환한다 — 이후
//! 레코드 파서의 fail-open 경로가 받아준다.

use chrono::{DateTime, Datelike, Utc};

/// RFC 3164 월 약어 목록 (1월부터).
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// 메시지를 정규 RFC 5424 문자열로 정규화한다.
///
/// `now`는 타임스탬프 연도 복원(및 연도 롤백 판정)에 쓰이는 기준 시각이며,
/// 테스트에서 주입할 수 있도록 매개변수로 받는다.
pub fn normalize(raw: &str, now: DateTime<Utc>) -> String {
    if is_already_rfc5424(raw) {
        return raw.to_owned();
    }

    match parse_rfc3164(raw, now) {
        Some(canonical) => canonical,
        None => raw.to_owned(),
    }
}

/// `>` 다음 문자가 `1`이고 그 다음이 공백이면 이미 RFC 5424로 간주한다.
fn is_already_rfc5424(raw: &str) -> bool {
    let Some(gt_pos) = raw.find('>') else {
        return false;
    };
    let rest = &raw[gt_pos + 1..];
    let mut chars = rest.chars();
    matches!(chars.next(), Some('1')) && matches!(chars.next(), Some(c) if c.is_whitespace())
}

/// `<PRI>MMM D HH:MM:SS HOST TAG(:| -)? MSG` 패턴을 관대하게 파싱한다.
fn parse_rfc3164(raw: &str, now: DateTime<Utc>) -> Option<String> {
    let (pri, rest) = extract_pri(raw)?;

    // "MMM D HH:MM:SS" 는 공백으로 구분된 최소 4개 토큰(월, 일, 시각, 이후 전부)
    let rest = rest.trim_start();
    let mut parts = rest.splitn(4, ' ').filter(|s| !s.is_empty());
    let month_str = parts.next()?;
    let day_str = parts.next()?;
    let time_str = parts.next()?;
    let tail = parts.next().unwrap_or("").trim_start();

    let month = MONTHS.iter().position(|m| *m == month_str)? as u32 + 1;
    let day: u32 = day_str.parse().ok()?;

    let mut time_parts = time_str.splitn(3, ':');
    let hour: u32 = time_parts.next()?.parse().ok()?;
    let minute: u32 = time_parts.next()?.parse().ok()?;
    let second: u32 = time_parts.next()?.parse().ok()?;

    let timestamp = reconstruct_timestamp(month, day, hour, minute, second, now);

    // tail = "HOST TAG(:| -)? MSG"
    let mut tail_parts = tail.splitn(2, ' ');
    let host = tail_parts.next().unwrap_or("-");
    let after_host = tail_parts.next().unwrap_or("").trim_start();

    let (app, procid, msg) = split_tag_and_message(after_host);

    Some(format!(
        "<{pri}>1 {timestamp} {host} {app} {procid} - - {msg}"
    ))
}

/// `<PRI>` 를 추출한다. PRI는 그대로(유효성 검증 없이) 보존된다 — 디코딩은 C1의 몫이다.
fn extract_pri(raw: &str) -> Option<(&str, &str)> {
    let raw = raw.trim_start();
    let rest = raw.strip_prefix('<')?;
    let (pri, rest) = rest.split_once('>')?;
    if pri.is_empty() || !pri.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((pri, rest))
}

/// 연도가 없는 RFC 3164 타임스탬프를 복원한다.
///
/// 현재 연도로 구성했을 때 `now`보다 미래라면 연말 경계를 넘은 것으로 보고
/// 1년을 차감한다 (예: 12/31에 기록된 로그를 1/1에 수신).
fn reconstruct_timestamp(
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    now: DateTime<Utc>,
) -> String {
    let year = now.year();
    let candidate = chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second));

    let Some(naive) = candidate else {
        return now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
    };

    let naive = if naive > now.naive_utc() {
        chrono::NaiveDate::from_ymd_opt(year - 1, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .unwrap_or(naive)
    } else {
        naive
    };

    let dt = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc);
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// `TAG: MSG`, `TAG - MSG`, `NAME[PID]: MSG`, 혹은 구분자 없이 `TAG MSG`
/// (공백 하나뿐) 형태에서 app/procid/msg를 분리한다. 어느 구분자도 없고
/// 공백조차 없으면 태그를 분리할 수 없으므로 전체를 메시지로 둔다.
fn split_tag_and_message(s: &str) -> (String, String, String) {
    let (tag, msg) = if let Some((tag, msg)) = s.split_once(": ") {
        (tag, msg)
    } else if let Some((tag, msg)) = s.split_once(" - ") {
        (tag, msg)
    } else if let Some((tag, msg)) = s.split_once(' ') {
        (tag, msg)
    } else {
        ("-", s)
    };

    if let Some(bracket_open) = tag.find('[') {
        if let Some(bracket_close) = tag.find(']') {
            if bracket_close > bracket_open {
                let name = &tag[..bracket_open];
                let pid = &tag[bracket_open + 1..bracket_close];
                if !pid.is_empty() && pid.bytes().all(|b| b.is_ascii_digit()) {
                    return (name.to_owned(), pid.to_owned(), msg.to_owned());
                }
            }
        }
    }

    let app = if tag.is_empty() { "-".to_owned() } else { tag.to_owned() };
    (app, "-".to_owned(), msg.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn already_rfc5424_is_unchanged() {
        let raw = "<34>1 2026-06-15T08:12:00.000Z host app 123 - - message";
        assert_eq!(normalize(raw, now()), raw);
    }

    #[test]
    fn rfc3164_with_pid_is_split() {
        let raw = "<34>Jun 15 08:12:00 myhost sshd[1234]: login failed";
        let out = normalize(raw, now());
        assert!(out.starts_with("<34>1 2026-06-15T08:12:00.000Z myhost sshd 1234 - - login failed"));
    }

    #[test]
    fn rfc3164_without_pid_uses_dash_procid() {
        let raw = "<13>Jun 15 08:12:00 myhost su: su(pam): session opened";
        let out = normalize(raw, now());
        assert!(out.starts_with("<13>1 2026-06-15T08:12:00.000Z myhost su - -"));
    }

    #[test]
    fn rfc3164_with_bare_space_separator_is_split() {
        let raw = "<13>Jun 15 08:12:00 myhost sshd hello world";
        let out = normalize(raw, now());
        assert!(out.starts_with("<13>1 2026-06-15T08:12:00.000Z myhost sshd - - hello world"));
    }

    #[test]
    fn future_timestamp_rolls_back_a_year() {
        // "now" is early January; a December day would be in the future this year
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        let raw = "<0>Dec 31 23:59:59 myhost kernel: boot";
        let out = normalize(raw, now);
        assert!(out.contains("2025-12-31T23:59:59"));
    }

    #[test]
    fn unparseable_message_passes_through_unchanged() {
        let raw = "not a syslog message at all";
        assert_eq!(normalize(raw, now()), raw);
    }

    #[test]
    fn missing_pri_falls_back_to_unchanged() {
        let raw = "Jun 15 08:12:00 myhost sshd: no PRI here";
        assert_eq!(normalize(raw, now()), raw);
    }
}
