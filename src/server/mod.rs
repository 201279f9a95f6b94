//! HTTP exposure of the marketplace
//!
//! The `ServerBuilder` wires a repository and an optional search index into
//! an axum router:
//! - `/health`, `/healthz` liveness probes
//! - `/v1/status` backend summary
//! - `/api/search`, `/api/listings`, `/api/categories`

pub mod builder;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
