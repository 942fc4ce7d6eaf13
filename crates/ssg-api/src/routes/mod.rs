//! # API Route Modules
//!
//! - `credentials`: status allocation, status updates and credential info
//!   (`/credentials/...`).
//! - `status`: health check and published status list credentials
//!   (`/` and `/{status_credential_id}`).

pub mod credentials;
pub mod status;
