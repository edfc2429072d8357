// QoreORM - driver and dialect bootstrap
// Core library

pub mod config;
pub mod engine;
pub mod observability;

use std::collections::HashMap;

pub use config::EngineConfig;
pub use engine::{Engine, EngineError, EngineFactory, EngineResult, Registry};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds an engine using the global registry and the default sqlx
/// connector
pub async fn new_engine(driver_name: &str, data_source_name: &str) -> EngineResult<Engine> {
    EngineFactory::shared()
        .new_engine(driver_name, data_source_name)
        .await
}

/// Builds an engine and forwards `params` to its dialect
pub async fn new_engine_with_params(
    driver_name: &str,
    data_source_name: &str,
    params: HashMap<String, String>,
) -> EngineResult<Engine> {
    EngineFactory::shared()
        .new_engine_with_params(driver_name, data_source_name, params)
        .await
}
