pub mod introspector;
pub mod stats_service;

pub use introspector::{DatabaseIntrospector, PostgresIntrospector};
pub use stats_service::StatsService;
