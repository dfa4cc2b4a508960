//! Users that belong to an organization and own design files.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/v1/users` | List users, newest first |
//! | POST | `/v1/users` | Create user (email must be unique) |
//! | GET | `/v1/users/{id}` | Get user |
//! | PUT | `/v1/users/{id}` | Partially update user |
//! | DELETE | `/v1/users/{id}` | Delete user without owned files |
//!
//! Files owned by a user are listed by the files feature at
//! `/v1/users/{id}/files`.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::UserService;
