//! 파티션 파일 발견 — `base.ext` 템플릿을 `base_*.ext` glob으로 전개해
//! 존재하는 파티션 파일들을 찾는다.
//!
//! 원본 `web.py::get_available_databases`와 동일하게, 날짜순 내림차순
//! (최신 파일이 먼저)으로 정렬한다.

use crate::error::QueryPlanError;

/// 설정된 템플릿으로부터 존재하는 파티션 파일 경로 목록을 찾는다.
///
/// 내림차순 정렬되어 있으므로 `available_partitions().first()`가 최신
/// 파티션이다.
pub fn available_partitions(database_template: &str) -> Result<Vec<String>, QueryPlanError> {
    let pattern = glob_pattern(database_template);
    let mut files: Vec<String> = glob::glob(&pattern)?
        .filter_map(Result::ok)
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    files.sort_unstable_by(|a, b| b.cmp(a));
    Ok(files)
}

/// `base.ext` → `base_*.ext` glob 패턴으로 전개한다.
fn glob_pattern(template: &str) -> String {
    match template.rsplit_once('.') {
        Some((base, ext)) => format!("{base}_*.{ext}"),
        None => format!("{template}_*"),
    }
}
