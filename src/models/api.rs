//! API request and response models.

use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Response model for the health check endpoint
#[derive(Clone, Debug, Serialize, Deserialize, Apiv2Schema)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            status: "unhealthy".to_string(),
        }
    }
}

/// Response model for the version information endpoint
#[derive(Clone, Debug, Serialize, Deserialize, Apiv2Schema)]
pub struct VersionResponse {
    pub version: String,
    pub commit: String,
    pub build_time: String,
}

/// Query parameters for `/events/daily`
#[derive(Clone, Debug, Default, Serialize, Deserialize, Apiv2Schema)]
pub struct DailyEventsQuery {
    /// `true` splits the daily totals by point of interest; any other value
    /// is ignored
    pub by_poi: Option<String>,
}

impl DailyEventsQuery {
    pub fn split_by_poi(&self) -> bool {
        self.by_poi
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }
}

/// Path parameters for `/events/daily/{poi_id}`
#[derive(Clone, Debug, Serialize, Deserialize, Apiv2Schema)]
pub struct PoiPath {
    /// Numeric point-of-interest id
    pub poi_id: String,
}

impl PoiPath {
    pub fn parse_id(&self) -> Result<i64, std::num::ParseIntError> {
        self.poi_id.trim().parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(by_poi: Option<&str>) -> DailyEventsQuery {
        DailyEventsQuery {
            by_poi: by_poi.map(str::to_string),
        }
    }

    #[test]
    fn test_only_true_splits_by_poi() {
        assert!(query(Some("true")).split_by_poi());
        assert!(query(Some("TRUE")).split_by_poi());
        for other in [None, Some("false"), Some("1"), Some("yes"), Some("")] {
            assert!(!query(other).split_by_poi(), "{other:?}");
        }
    }

    #[test]
    fn test_poi_id_must_be_an_integer() {
        let path = |id: &str| PoiPath { poi_id: id.to_string() };
        assert_eq!(path("42").parse_id().ok(), Some(42));
        assert!(path("abc").parse_id().is_err());
        assert!(path("4.2").parse_id().is_err());
    }
}
