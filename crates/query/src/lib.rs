pub mod boundary;
pub mod builder;
pub mod error;
pub mod partitions;
pub mod runner;

pub use boundary::{find_boundaries, BoundaryResult, ProbeTrace};
pub use builder::{build_count_query, build_page_query, BuiltQuery, Direction, SearchParams};
pub use error::QueryPlanError;
pub use partitions::available_partitions;
pub use runner::{run_search, SearchRequest, SearchResponse};
