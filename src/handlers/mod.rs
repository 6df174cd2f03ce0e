//! HTTP request handlers for API endpoints.

pub mod analytics;
pub mod health;
pub mod metrics;
pub mod openapi;
pub mod version;
pub mod welcome;

pub use analytics::*;
pub use health::*;
pub use metrics::*;
pub use openapi::*;
pub use version::*;
pub use welcome::*;
