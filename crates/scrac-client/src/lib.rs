//! scrac-client: Signal CLI REST API client
//!
//! HTTP client for a signal-cli-rest-api server. Exposes one method per
//! server operation; the scrac binary maps its command names onto these.

pub mod api;
pub mod error;
pub mod types;

pub use api::{BasicAuth, SignalApiClient};
pub use error::{Result, SignalError};
