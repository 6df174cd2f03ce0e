//! Static welcome route.

use crate::config::{ServerConfig, DEFAULT_WELCOME_MESSAGE};
use actix_web::{web, Error, HttpRequest, HttpResponse, Result};
use paperclip::actix::api_v2_operation;

/// Welcome endpoint
#[api_v2_operation(
    summary = "Welcome Endpoint",
    description = "Returns a static welcome message. Counts against the request budget.",
    tags("Welcome"),
    responses(
        (status = 200, description = "Welcome text, or the request limit message once the budget is spent", content_type = "text/plain")
    )
)]
pub async fn welcome(req: HttpRequest) -> Result<HttpResponse, Error> {
    let message = req
        .app_data::<web::Data<ServerConfig>>()
        .map(|config| config.welcome_message.clone())
        .unwrap_or_else(|| DEFAULT_WELCOME_MESSAGE.to_string());

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(message))
}
