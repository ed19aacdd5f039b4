use std::sync::Arc;
use skyseat_booking::BookingEngine;
use skyseat_store::app_config::BusinessRules;
use skyseat_store::RedisClient;

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BookingEngine>,
    /// `None` disables rate limiting
    pub redis: Option<Arc<RedisClient>>,
    pub metrics: Arc<Metrics>,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}
