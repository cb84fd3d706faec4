//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use dailystream_core::ports::NewsProvider;
use dailystream_core::resolver::{QueryResolver, ResolverSettings};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
/// Nothing in it changes after construction.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resolver: QueryResolver,
}

impl AppState {
    pub fn new(config: Arc<Config>, provider: Arc<dyn NewsProvider>) -> Self {
        let resolver = QueryResolver::new(
            provider,
            ResolverSettings::new(config.news_api_key.clone()),
        );
        Self { config, resolver }
    }
}
