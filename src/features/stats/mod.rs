//! Read-only PostgreSQL diagnostics.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/v1/stats/db` | Database size, table sizes, row estimates |
//! | GET | `/v1/stats/queries` | Slowest statement shapes (needs `pg_stat_statements`) |
//! | GET | `/v1/stats/connections` | Backends connected to this database |
//!
//! These endpoints always answer 200; engine failures are reported in the
//! payload's `error` field.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::{PostgresIntrospector, StatsService};
