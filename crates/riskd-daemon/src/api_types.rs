//! Request and response types for the ambient HTTP endpoints (§6
//! "HTTP/observability surface"). No business logic lives here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

pub use crate::state::StatusSnapshot as StatusResponse;
