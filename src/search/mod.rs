//! Faceted listing search
//!
//! - [`matcher`]: compiles a request into a plan and matches a snapshot locally
//! - [`controller`]: fronts the matcher with the optional external index,
//!   reconciling a stale index and falling back to local matching
//! - [`gate`]: last-request-wins supersession for overlapping searches

pub mod controller;
pub mod gate;
pub mod matcher;

pub use controller::{SearchOutcome, SearchPath, SearchService};
pub use gate::{SearchGate, SearchTicket};
pub use matcher::{QueryPlan, match_listings, post_filter};
