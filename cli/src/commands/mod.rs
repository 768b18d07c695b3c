//! 커맨드 핸들러 -- 서브커맨드마다 모듈 하나

pub mod config;
pub mod search;
