//! Declarative route table
//!
//! Each HTTP route is a (method, path) pair mapped to an [`Endpoint`]. The
//! table does not depend on the transport; `server::create_router` turns it
//! into an axum router.

use axum::http::Method;

/// Operation served by a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `POST /api/logs`
    IngestLog,
    /// `GET /api/logs`
    QueryLogs,
    /// Liveness probe
    Health,
    /// Readiness probe (pings the store)
    Ready,
    /// Prometheus exposition
    Metrics,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub path: &'static str,
    pub endpoint: Endpoint,
}

pub const LOGS_PATH: &str = "/api/logs";

pub static ROUTES: [Route; 5] = [
    Route {
        method: Method::POST,
        path: LOGS_PATH,
        endpoint: Endpoint::IngestLog,
    },
    Route {
        method: Method::GET,
        path: LOGS_PATH,
        endpoint: Endpoint::QueryLogs,
    },
    Route {
        method: Method::GET,
        path: "/health",
        endpoint: Endpoint::Health,
    },
    Route {
        method: Method::GET,
        path: "/ready",
        endpoint: Endpoint::Ready,
    },
    Route {
        method: Method::GET,
        path: "/metrics",
        endpoint: Endpoint::Metrics,
    },
];
