//! Custom middleware implementations for the API.
//!
//! This module contains the request budget, request IDs and metrics
//! collection.

pub mod budget;
pub mod metrics;
pub mod request_id;

pub use budget::*;
pub use metrics::*;
pub use request_id::*;
