//! Request-budget middleware applied to every accounted route.

use crate::{
    services::{AppMetrics, RequestBudget},
    utils::http::extract_client_ip,
};
use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{forward_ready, ResourceDef, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web, Error,
};
use std::{
    future::{ready, Ready},
    pin::Pin,
    rc::Rc,
};

/// Routes that count against the budget, all served on `GET`.
///
/// The POI segment only matches an integer, so a malformed id reaches its
/// handler for the 400 without being charged. Unknown paths, other methods
/// and the operational routes under `/api/` are never accounted.
pub const ACCOUNTED_ROUTES: [&str; 7] = [
    "/",
    "/events/hourly",
    "/events/daily",
    r"/events/daily/{poi_id:-?\d+}",
    "/stats/hourly",
    "/stats/daily",
    "/poi",
];

/// Matcher over [`ACCOUNTED_ROUTES`]
#[derive(Clone)]
pub struct AccountedRoutes {
    routes: Rc<[ResourceDef]>,
}

impl AccountedRoutes {
    pub fn new() -> Self {
        Self {
            routes: ACCOUNTED_ROUTES.iter().map(|p| ResourceDef::new(*p)).collect(),
        }
    }

    pub fn is_accounted(&self, method: &Method, path: &str) -> bool {
        *method == Method::GET && self.routes.iter().any(|route| route.is_match(path))
    }
}

impl Default for AccountedRoutes {
    fn default() -> Self {
        Self::new()
    }
}

/// Budget middleware factory
///
/// Reads the principal's allowance, refuses the request with the fixed
/// "limit reached" body when nothing is left, and otherwise runs the handler
/// and persists the updated allowance.
pub struct BudgetMiddleware {
    budget: RequestBudget,
    routes: AccountedRoutes,
}

impl BudgetMiddleware {
    pub fn new(budget: RequestBudget) -> Self {
        Self {
            budget,
            routes: AccountedRoutes::new(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BudgetMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = BudgetService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BudgetService {
            service,
            budget: self.budget.clone(),
            routes: self.routes.clone(),
        }))
    }
}

pub struct BudgetService<S> {
    service: S,
    budget: RequestBudget,
    routes: AccountedRoutes,
}

impl<S, B> Service<ServiceRequest> for BudgetService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !self.routes.is_accounted(req.method(), req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_boxed_body()) });
        }

        let admission = self.budget.admit(req.request());
        let mode = self.budget.mode();

        if let Some(metrics) = req.app_data::<web::Data<AppMetrics>>() {
            metrics.record_admission(mode.as_str(), admission.admitted);
            if let Some(pool) = self.budget.token_pool() {
                metrics.set_pool_available(pool.available());
            }
        }

        if !admission.admitted {
            tracing::info!(
                target: "budget",
                client_ip = %extract_client_ip(req.request()),
                path = %req.path(),
                mode = %mode,
                "Request limit reached"
            );
            let res = req.into_response(self.budget.denied_response());
            return Box::pin(async move { Ok(res) });
        }

        tracing::debug!(
            target: "budget",
            client_ip = %extract_client_ip(req.request()),
            path = %req.path(),
            mode = %mode,
            remaining = admission.next,
            "Request admitted"
        );

        let fut = self.service.call(req);
        let budget = self.budget.clone();

        Box::pin(async move {
            let mut res = fut.await?.map_into_boxed_body();
            budget.settle(admission, res.response_mut());
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_served_data_routes_are_accounted() {
        let routes = AccountedRoutes::new();
        for path in ["/", "/events/hourly", "/events/daily", "/events/daily/42", "/poi"] {
            assert!(routes.is_accounted(&Method::GET, path), "{path}");
        }
        for path in ["/api/health", "/api/metrics", "/api/spec/v2", "/favicon.ico", "/apiary"] {
            assert!(!routes.is_accounted(&Method::GET, path), "{path}");
        }
    }

    #[test]
    fn test_malformed_poi_id_is_not_accounted() {
        let routes = AccountedRoutes::new();
        assert!(routes.is_accounted(&Method::GET, "/events/daily/-3"));
        assert!(!routes.is_accounted(&Method::GET, "/events/daily/abc"));
        assert!(!routes.is_accounted(&Method::GET, "/events/daily/4.2"));
    }

    #[test]
    fn test_other_methods_are_not_accounted() {
        let routes = AccountedRoutes::new();
        assert!(!routes.is_accounted(&Method::POST, "/poi"));
        assert!(!routes.is_accounted(&Method::DELETE, "/"));
    }
}
