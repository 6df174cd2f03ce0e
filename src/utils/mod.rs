//! Utility functions and helper modules.
//!
//! Client address and user agent extraction for logs, and route labels for
//! metrics.

pub mod http;
pub mod route;

pub use http::*;
pub use route::*;
