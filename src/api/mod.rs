//! HTTP API: routes, handlers, rate limiting, and the server entry point

pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod server;
pub mod types;

pub use handlers::AppState;
pub use rate_limit::RateLimiter;
pub use server::serve_api;
