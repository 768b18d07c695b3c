//! # 모듈 구성
//!
//! - [`priority`]: PRI 필드(Facility/Severity) 디코딩
//! - [`normalizer`]: RFC 3164 → RFC 5424 best-effort 정규화
//! - [`record_parser`]: RFC 5424 그래머 추출 + fail-open 레코드 생성
//! - [`buffer`]: 인메모리 데이터그램 버퍼링 (드롭 정책 포함)
//! - [`partition`]: 연월별 파티션 파일/테이블/인덱스/FTS 관리
//! - [`writer`]: 배치 작성기 (파싱 → 그룹화 → 원자적 커밋)
//! - [`receiver`]: UDP 수신 루프
//! - [`shutdown`]: RUNNING → DRAINING → CLOSED 종료 상태 머신
//! - [`pipeline`]: 전체 파이프라인 오케스트레이션 (Pipeline trait 구현)
//! - [`config`]: 파이프라인 런타임 설정
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! UdpReceiver -> DatagramBuffer(+Notify) -> BatchWriter -> 연월별 SQLite 파일
//!                                              |
//!                                     normalizer + record_parser + priority
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod partition;
pub mod pipeline;
pub mod priority;
pub mod receiver;
pub mod record_parser;
pub mod shutdown;
pub mod writer;

// --- 주요 타입 re-export ---

pub use buffer::{DatagramBuffer, RawDatagram};
pub use config::{DropPolicy, IngestRuntimeConfig, IngestRuntimeConfigBuilder};
pub use error::IngestPipelineError;
pub use partition::PartitionManager;
pub use pipeline::IngestPipeline;
pub use receiver::UdpReceiver;
pub use shutdown::{ShutdownCoordinator, ShutdownState};
pub use writer::BatchWriter;
