//! Errors surfaced to HTTP clients.

use crate::services::CatalogError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("{0} not configured")]
    Unavailable(&'static str),
}

impl ApiError {
    pub fn client_message(&self) -> String {
        match self {
            ApiError::InvalidParameter { .. } => self.to_string(),
            ApiError::Catalog(CatalogError::Pool(_)) => "Analytics store unavailable".to_string(),
            ApiError::Catalog(_) => "Failed to query analytics store".to_string(),
            ApiError::Unavailable(_) => "Service temporarily unavailable".to_string(),
        }
    }
}

/// Central failure handler for request-scoped errors. Store details are
/// logged, never sent to the client.
impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            ApiError::Catalog(CatalogError::Pool(_)) | ApiError::Unavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Rejected request");
        }

        HttpResponse::build(status).json(json!({
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": self.client_message(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let pool = ApiError::from(CatalogError::Pool("timed out".into()));
        assert_eq!(pool.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let query = ApiError::from(CatalogError::Query {
            query: "poi",
            message: "relation \"public.poi\" does not exist".into(),
        });
        assert_eq!(query.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!query.client_message().contains("relation"));

        let bad = ApiError::InvalidParameter {
            name: "poi_id",
            reason: "not an integer".into(),
        };
        assert_eq!(bad.status_code(), StatusCode::BAD_REQUEST);
        assert!(bad.client_message().contains("poi_id"));
    }
}
