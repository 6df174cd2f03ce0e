//! Business logic and service layer modules.
//!
//! This module contains the request budget, the query catalog and the
//! metrics collector.

pub mod budget;
pub mod catalog;
pub mod metrics;

pub use budget::*;
pub use catalog::*;
pub use metrics::*;
