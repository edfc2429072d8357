//! Engine handle
//!
//! The long-lived handle returned by the constructor. It is the sole owner
//! of its connection: nothing else closes it, and it is closed exactly once,
//! either by `close()` or, as a last resort, when the engine is dropped.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::engine::cache::Cacher;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::factory::EngineFactory;
use crate::engine::logger::{LogLevel, Logger, TracingLogger};
use crate::engine::mapper::{CacheMapper, NameMapper, SnakeMapper};
use crate::engine::traits::{Connection, Dialect};
use crate::engine::types::{
    ConnectionId, DbFamily, ExecutionContext, Location, Model, TableDescriptor,
};

pub struct Engine {
    factory: EngineFactory,
    driver_name: String,
    data_source_name: String,
    family: DbFamily,
    conn: Arc<dyn Connection>,
    dialect: Box<dyn Dialect>,
    tables: RwLock<HashMap<TypeId, Arc<TableDescriptor>>>,
    cachers: parking_lot::RwLock<HashMap<String, Arc<dyn Cacher>>>,
    logger: Arc<dyn Logger>,
    mapper: Arc<dyn NameMapper>,
    tz_location: Location,
    database_tz: Location,
    context: ExecutionContext,
    closed: AtomicBool,
}

impl Engine {
    /// Attaches a bound connection and dialect to the default policies
    pub(crate) fn assemble(
        factory: EngineFactory,
        driver_name: &str,
        data_source_name: &str,
        family: DbFamily,
        conn: Box<dyn Connection>,
        dialect: Box<dyn Dialect>,
    ) -> Self {
        let logger = TracingLogger::new(factory.config().log_level);
        logger.set_show_sql(factory.config().show_sql);

        // SQLite has no server time zone; store UTC there
        let database_tz = match family {
            DbFamily::Sqlite => Location::Utc,
            _ => Location::Local,
        };

        Self {
            factory,
            driver_name: driver_name.to_string(),
            data_source_name: data_source_name.to_string(),
            family,
            conn: Arc::from(conn),
            dialect,
            tables: RwLock::new(HashMap::new()),
            cachers: parking_lot::RwLock::new(HashMap::new()),
            logger: Arc::new(logger),
            mapper: Arc::new(CacheMapper::new(SnakeMapper)),
            tz_location: Location::Local,
            database_tz,
            context: ExecutionContext::background(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    pub fn data_source_name(&self) -> &str {
        &self.data_source_name
    }

    pub fn family(&self) -> DbFamily {
        self.family
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.conn.id()
    }

    /// Quotes an identifier the way this engine's dialect does
    pub fn quote(&self, identifier: &str) -> String {
        self.dialect.quote(identifier)
    }

    /// Forwards dialect-specific tuning to the bound dialect
    pub fn set_dialect_params(&mut self, params: HashMap<String, String>) {
        self.dialect.set_params(params);
    }

    // ==================== Default policies ====================

    /// Application-facing time zone
    pub fn tz_location(&self) -> Location {
        self.tz_location
    }

    pub fn set_tz_location(&mut self, location: Location) {
        self.tz_location = location;
    }

    /// Time zone timestamps are stored in
    pub fn database_tz(&self) -> Location {
        self.database_tz
    }

    pub fn set_tz_database(&mut self, location: Location) {
        self.database_tz = location;
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    pub fn set_logger(&mut self, logger: Arc<dyn Logger>) {
        self.logger = logger;
    }

    pub fn set_log_level(&self, level: LogLevel) {
        self.logger.set_level(level);
    }

    pub fn show_sql(&self, show: bool) {
        self.logger.set_show_sql(show);
    }

    pub fn mapper(&self) -> &Arc<dyn NameMapper> {
        &self.mapper
    }

    /// Replaces the identifier mapper. Cached table descriptors were built
    /// with the old mapper and are dropped.
    pub fn set_mapper(&mut self, mapper: Arc<dyn NameMapper>) {
        self.mapper = mapper;
        self.tables.get_mut().clear();
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn set_context(&mut self, context: ExecutionContext) {
        self.context = context;
    }

    // ==================== Metadata cache ====================

    /// Table descriptor for `T`, built on first request
    pub async fn table_info<T: Model>(&self) -> Arc<TableDescriptor> {
        let key = TypeId::of::<T>();
        if let Some(table) = self.tables.read().await.get(&key) {
            return Arc::clone(table);
        }

        let mut tables = self.tables.write().await;
        let table = tables.entry(key).or_insert_with(|| {
            Arc::new(TableDescriptor {
                model: T::model_name().to_string(),
                name: self.mapper.obj_to_table(T::model_name()),
                columns: T::field_names()
                    .iter()
                    .map(|field| self.mapper.obj_to_table(field))
                    .collect(),
            })
        });
        Arc::clone(table)
    }

    pub async fn cached_table_count(&self) -> usize {
        self.tables.read().await.len()
    }

    pub async fn clear_table_cache(&self) {
        self.tables.write().await.clear();
    }

    // ==================== Cachers ====================

    pub fn set_cacher(&self, name: impl Into<String>, cacher: Arc<dyn Cacher>) {
        self.cachers.write().insert(name.into(), cacher);
    }

    pub fn cacher(&self, name: &str) -> Option<Arc<dyn Cacher>> {
        self.cachers.read().get(name).cloned()
    }

    pub fn unset_cacher(&self, name: &str) -> Option<Arc<dyn Cacher>> {
        self.cachers.write().remove(name)
    }

    // ==================== Connection ====================

    /// Checks the connection, bounded by the context timeout if any
    pub async fn ping(&self) -> EngineResult<()> {
        if self.is_closed() {
            return Err(EngineError::Closed);
        }
        match self.context.timeout {
            Some(limit) => tokio::time::timeout(limit, self.conn.ping())
                .await
                .map_err(|_| EngineError::query(format!("ping timed out after {:?}", limit)))?,
            None => self.conn.ping().await,
        }
    }

    /// Releases the connection. Later calls are no-ops.
    pub async fn close(&self) -> EngineResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::debug!(driver = %self.driver_name, connection = %self.conn.id(), "closing engine");
        self.conn.close().await
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Runs `f` and closes the engine afterwards, whether `f` failed or not.
    /// An error from `f` takes precedence over an error from closing.
    pub async fn scope<T, F>(self, f: F) -> EngineResult<T>
    where
        F: for<'a> FnOnce(&'a Engine) -> BoxFuture<'a, EngineResult<T>>,
    {
        let result = f(&self).await;
        let closed = self.close().await;
        let value = result?;
        closed?;
        Ok(value)
    }

    /// A new engine for the same driver and data source, with its own
    /// connection, dialect and caches
    pub async fn try_clone(&self) -> EngineResult<Engine> {
        self.factory
            .new_engine(&self.driver_name, &self.data_source_name)
            .await
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("driver_name", &self.driver_name)
            .field("family", &self.family)
            .field("connection", &self.conn.id())
            .field("tz_location", &self.tz_location)
            .field("database_tz", &self.database_tz)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.is_closed() || self.conn.is_closed() {
            return;
        }
        tracing::warn!(
            driver = %self.driver_name,
            connection = %self.conn.id(),
            "engine dropped without close()"
        );

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let conn = Arc::clone(&self.conn);
            handle.spawn(async move {
                if let Err(e) = conn.close().await {
                    tracing::warn!(error = %e, "background close failed");
                }
            });
        }
    }
}
