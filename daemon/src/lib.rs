//! sylogd 데몬 라이브러리.
//!
//! 내부 모듈을 통합 테스트에 노출하기 위해 공개한다. 프로덕션에서는
//! `sylogd` 바이너리(`main.rs`)로 사용한다.

pub mod health;
pub mod logging;
pub mod metrics_server;
pub mod orchestrator;
