//! Comments pinned on design files.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/v1/files/{id}/comments` | List a file's comments, newest first |
//! | POST | `/v1/files/{id}/comments` | Comment on a file |
//! | PUT | `/v1/comments/{id}` | Edit comment content |
//! | DELETE | `/v1/comments/{id}` | Delete comment |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CommentService;
