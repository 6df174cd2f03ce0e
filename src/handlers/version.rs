//! Version information endpoint handler.

use crate::models::VersionResponse;
use actix_web::{web, Error, Result};
use paperclip::actix::api_v2_operation;

/// Build metadata baked in at compile time
#[derive(Clone, Copy, Debug)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub build_time: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
            build_time: option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        }
    }
}

/// Version information endpoint
#[api_v2_operation(
    summary = "Version Information Endpoint",
    description = "Returns the current API version, commit hash, and build time.",
    tags("Operations"),
    responses(
        (status = 200, description = "Successful response", body = VersionResponse)
    )
)]
pub async fn version() -> Result<web::Json<VersionResponse>, Error> {
    let build = BuildInfo::current();
    Ok(web::Json(VersionResponse {
        version: build.version.to_string(),
        commit: build.commit.to_string(),
        build_time: build.build_time.to_string(),
    }))
}
