//! Client-held allowance carried in a cookie.
//!
//! The cookie value is `"{remaining}:{expires_unix}"`. The embedded expiry is
//! checked on every read so a client replaying a stale cookie past its TTL is
//! treated as a first visit, the same as a client whose cookie expired. An
//! expiry further out than one TTL was not issued by this server and is
//! ignored the same way.

use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie},
    error::HttpError,
    HttpMessage, HttpRequest, HttpResponse,
};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Reads and writes the per-client allowance
#[derive(Clone, Debug)]
pub struct CookieBudgetStore {
    name: String,
    ttl: Duration,
}

impl CookieBudgetStore {
    /// `ttl` is raised to one second; a cookie must outlive the response
    /// that issues it.
    pub fn new(name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            name: name.into(),
            ttl: ttl.max(Duration::from_secs(1)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn ttl_secs(&self) -> i64 {
        i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)
    }

    /// Current allowance of the requesting client, `None` for a first visit.
    pub fn read(&self, req: &HttpRequest) -> Option<u32> {
        self.read_at(req, Utc::now())
    }

    pub fn read_at(&self, req: &HttpRequest, now: DateTime<Utc>) -> Option<u32> {
        let cookie = req.cookie(&self.name)?;
        let now = now.timestamp();
        let latest = now.saturating_add(self.ttl_secs());
        match parse_value(cookie.value()) {
            Some((remaining, expires)) if expires > now && expires <= latest => Some(remaining),
            Some((_, expires)) if expires > latest => {
                tracing::debug!(cookie = %self.name, expires, "Budget cookie expiry beyond its TTL");
                None
            }
            Some(_) => {
                tracing::debug!(cookie = %self.name, "Budget cookie past its expiry");
                None
            }
            None => {
                tracing::debug!(cookie = %self.name, value = %cookie.value(), "Unreadable budget cookie");
                None
            }
        }
    }

    /// Attach `remaining` to the response with a fresh expiry.
    pub fn write(&self, res: &mut HttpResponse, remaining: u32) -> Result<(), HttpError> {
        res.add_cookie(&self.cookie_at(remaining, Utc::now()))
    }

    pub fn cookie_at(&self, remaining: u32, now: DateTime<Utc>) -> Cookie<'static> {
        let ttl_secs = self.ttl_secs();
        let expires = now.timestamp().saturating_add(ttl_secs);
        Cookie::build(self.name.clone(), format_value(remaining, expires))
            .path("/")
            .http_only(true)
            .max_age(CookieDuration::seconds(ttl_secs))
            .finish()
    }
}

pub fn format_value(remaining: u32, expires_unix: i64) -> String {
    format!("{remaining}:{expires_unix}")
}

fn parse_value(raw: &str) -> Option<(u32, i64)> {
    let (remaining, expires) = raw.split_once(':')?;
    Some((remaining.parse().ok()?, expires.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use chrono::TimeZone;

    fn store() -> CookieBudgetStore {
        CookieBudgetStore::new("rate", Duration::from_secs(10))
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_missing_cookie_is_first_visit() {
        let req = TestRequest::get().to_http_request();
        assert_eq!(store().read_at(&req, at(1_000)), None);
    }

    #[test]
    fn test_reads_live_value() {
        let req = TestRequest::get()
            .cookie(Cookie::new("rate", format_value(4, 1_010)))
            .to_http_request();
        assert_eq!(store().read_at(&req, at(1_000)), Some(4));
        assert_eq!(store().read_at(&req, at(1_009)), Some(4));
    }

    #[test]
    fn test_expired_value_is_not_honored() {
        let req = TestRequest::get()
            .cookie(Cookie::new("rate", format_value(4, 1_010)))
            .to_http_request();
        assert_eq!(store().read_at(&req, at(1_010)), None);
        assert_eq!(store().read_at(&req, at(5_000)), None);
    }

    #[test]
    fn test_expiry_beyond_ttl_is_not_honored() {
        let req = TestRequest::get()
            .cookie(Cookie::new("rate", format_value(0, 1_000 + 86_400)))
            .to_http_request();
        assert_eq!(store().read_at(&req, at(1_000)), None);

        let issued = TestRequest::get()
            .cookie(Cookie::new("rate", format_value(0, 1_010)))
            .to_http_request();
        assert_eq!(store().read_at(&issued, at(1_000)), Some(0));
    }

    #[test]
    fn test_zero_ttl_still_outlives_the_response() {
        let store = CookieBudgetStore::new("rate", Duration::ZERO);
        let cookie = store.cookie_at(1, at(1_000));
        let req = TestRequest::get().cookie(cookie).to_http_request();
        assert_eq!(store.read_at(&req, at(1_000)), Some(1));
    }

    #[test]
    fn test_malformed_values_are_first_visits() {
        for raw in ["2", "-1:1010", "two:1010", "3:", ":1010", "3:soon"] {
            let req = TestRequest::get()
                .cookie(Cookie::new("rate", raw))
                .to_http_request();
            assert_eq!(store().read_at(&req, at(1_000)), None, "value {raw:?}");
        }
    }

    #[test]
    fn test_cookie_carries_ttl_and_expiry() {
        let cookie = store().cookie_at(2, at(1_000));
        assert_eq!(cookie.name(), "rate");
        assert_eq!(cookie.value(), "2:1010");
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(10)));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
    }

    #[test]
    fn test_write_attaches_cookie() {
        let mut res = HttpResponse::Ok().finish();
        store().write(&mut res, 1).unwrap();
        let cookie = res.cookies().find(|c| c.name() == "rate").unwrap();
        assert!(cookie.value().starts_with("1:"));
    }
}
