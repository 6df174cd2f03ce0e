//! Route pattern extraction utilities.

use actix_web::HttpRequest;

/// Label for a request's route in metrics.
///
/// Uses the matched resource pattern (`/events/daily/{poi_id}`) when routing
/// has run. Requests answered before routing, such as budget denials, fall
/// back to the raw path with numeric segments collapsed to `{id}`.
pub fn extract_route_pattern(req: &HttpRequest) -> String {
    match req.match_pattern() {
        Some(pattern) => pattern,
        None => normalize_path(req.path()),
    }
}

fn normalize_path(path: &str) -> String {
    if !path.starts_with('/') {
        return "/unknown".to_string();
    }
    if path == "/" {
        return path.to_string();
    }

    path.split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
