//! Engine Constructor
//!
//! Runs the bootstrap pipeline: driver lookup, DSN parsing, dialect lookup,
//! connection open, dialect initialization, then engine assembly. The first
//! failing step ends the call; nothing is retried.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::instrument;

use crate::config::EngineConfig;
use crate::engine::connection::SqlxConnector;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::handle::Engine;
use crate::engine::registry::Registry;
use crate::engine::traits::Connector;

static SHARED: Lazy<EngineFactory> = Lazy::new(EngineFactory::with_defaults);

/// Everything needed to build engines: where drivers come from, how
/// connections are opened and which defaults apply
#[derive(Clone)]
pub struct EngineFactory {
    registry: Arc<Registry>,
    connector: Arc<dyn Connector>,
    config: EngineConfig,
}

impl EngineFactory {
    pub fn new(registry: Arc<Registry>, connector: Arc<dyn Connector>, config: EngineConfig) -> Self {
        Self {
            registry,
            connector,
            config,
        }
    }

    /// Global registry, sqlx connector and the on-disk configuration
    pub fn with_defaults() -> Self {
        let config = EngineConfig::load();
        let connector = Arc::new(SqlxConnector::new(&config));
        Self::new(Registry::global(), connector, config)
    }

    /// Process-wide factory used by the free construction functions
    pub fn shared() -> &'static EngineFactory {
        &SHARED
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Builds an engine for `driver_name` / `data_source_name`
    #[instrument(skip_all, fields(driver = %driver_name))]
    pub async fn new_engine(&self, driver_name: &str, data_source_name: &str) -> EngineResult<Engine> {
        let result = self.build(driver_name, data_source_name).await;
        match &result {
            Ok(engine) => tracing::info!(
                family = %engine.family(),
                connection = %engine.connection_id(),
                "engine ready"
            ),
            Err(e) => tracing::warn!(stage = e.stage(), error = %e, "engine construction failed"),
        }
        result
    }

    /// Like `new_engine`, then hands `params` to the dialect.
    ///
    /// Params are only forwarded once construction succeeded.
    pub async fn new_engine_with_params(
        &self,
        driver_name: &str,
        data_source_name: &str,
        params: HashMap<String, String>,
    ) -> EngineResult<Engine> {
        let mut engine = self.new_engine(driver_name, data_source_name).await?;
        engine.set_dialect_params(params);
        Ok(engine)
    }

    async fn build(&self, driver_name: &str, data_source_name: &str) -> EngineResult<Engine> {
        let driver = self
            .registry
            .query_driver(driver_name)
            .ok_or_else(|| EngineError::unsupported_driver(driver_name))?;

        let uri = driver.parse(driver_name, data_source_name)?;

        let dialect_factory = self
            .registry
            .query_dialect(uri.family)
            .ok_or_else(|| EngineError::unsupported_dialect(uri.family))?;

        let conn = self.connector.open(driver_name, data_source_name).await?;

        let mut dialect = dialect_factory();
        if let Err(e) = dialect
            .init(conn.as_ref(), &uri, driver_name, data_source_name)
            .await
        {
            if let Err(close_err) = conn.close().await {
                tracing::warn!(error = %close_err, "failed to close connection after dialect init error");
            }
            return Err(match e {
                EngineError::DialectInitError { .. } => e,
                other => EngineError::dialect_init(uri.family, other.to_string()),
            });
        }

        Ok(Engine::assemble(
            self.clone(),
            driver_name,
            data_source_name,
            uri.family,
            conn,
            dialect,
        ))
    }
}
