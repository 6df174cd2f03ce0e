//! Data models for the API's requests and responses.

pub mod api;

pub use api::*;
