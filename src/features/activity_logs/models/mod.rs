pub mod activity_log;

#[cfg(test)]
pub use activity_log::ActivityLog;
pub use activity_log::{ActivityAction, NewActivityLog};
