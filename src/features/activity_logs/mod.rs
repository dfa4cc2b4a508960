//! Append-only audit trail of file actions.
//!
//! Entries are written by the files feature inside its own transactions and
//! are never read back through the API, so this feature has no routes.

pub mod models;
pub mod services;

pub use models::{ActivityAction, NewActivityLog};
pub use services::ActivityLogService;
