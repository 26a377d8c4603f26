//! riskd-daemon library target.
//!
//! Owns the Runtime Supervisor (§4.13) and the ambient HTTP/observability
//! surface (§6). Library-only: `riskd-cli` is the sole binary entry point
//! and wires `Supervisor::boot` together with `http::build_router`.

pub mod api_types;
pub mod dry_run;
pub mod http;
pub mod state;
pub mod supervisor;
