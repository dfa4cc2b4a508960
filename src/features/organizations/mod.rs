//! Organizations (tenants) that group users and own design files.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/v1/organizations` | List organizations, newest first |
//! | POST | `/v1/organizations` | Create organization |
//! | GET | `/v1/organizations/{id}` | Get organization |
//! | PUT | `/v1/organizations/{id}` | Partially update organization |
//! | DELETE | `/v1/organizations/{id}` | Delete organization without dependents |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::OrganizationService;
