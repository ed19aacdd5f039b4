pub mod auth;
pub mod rate_limit;

pub use auth::{customer_auth_middleware, issue_customer_token, CustomerClaims};
pub use rate_limit::rate_limit_middleware;
