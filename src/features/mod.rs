pub mod activity_logs;
pub mod comments;
pub mod files;
pub mod organizations;
pub mod stats;
pub mod users;
