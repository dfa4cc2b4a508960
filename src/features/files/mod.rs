//! Design files owned by users within an organization.
//!
//! Creating, editing and viewing a file append to the activity log; create
//! and edit do so in the same transaction as the change itself.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/v1/files` | List files (filter, search, sort) |
//! | POST | `/v1/files` | Create file |
//! | GET | `/v1/files/{id}` | Get file with owner, organization and comments |
//! | PUT | `/v1/files/{id}` | Edit file, bumping its version |
//! | DELETE | `/v1/files/{id}` | Delete file with its comments and logs |
//! | POST | `/v1/files/{id}/view` | Count a view |
//! | GET | `/v1/users/{id}/files` | Files owned by a user |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::FileService;
