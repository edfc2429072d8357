//! Collaborator traits
//!
//! The engine never talks to a database directly. It resolves a `Driver` to
//! understand the connection string, asks a `Connector` for a physical
//! `Connection`, and binds a fresh `Dialect` to that connection.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::engine::dialects::DialectBase;
use crate::engine::error::EngineResult;
use crate::engine::types::{ConnectionId, ConnectionUri, DbFamily};

/// Understands the connection string syntax of one low-level driver
pub trait Driver: Send + Sync {
    /// Parses `data_source_name` into a structured descriptor.
    ///
    /// Fails with `MalformedConnectionString` when the DSN does not follow
    /// the driver's syntax.
    fn parse(&self, driver_name: &str, data_source_name: &str) -> EngineResult<ConnectionUri>;
}

/// Produces a fresh dialect for every engine
pub type DialectFactory = std::sync::Arc<dyn Fn() -> Box<dyn Dialect> + Send + Sync>;

/// Per-family SQL translator, bound to exactly one connection
///
/// Implementors own a `DialectBase` and state only what differs per family;
/// binding, params and version bookkeeping run through the base.
#[async_trait]
pub trait Dialect: Send + Sync {
    fn family(&self) -> DbFamily;

    fn base(&self) -> &DialectBase;

    fn base_mut(&mut self) -> &mut DialectBase;

    /// Statement returning the server version as a single text value
    fn version_query(&self) -> &'static str;

    /// Quotes an identifier for this family
    fn quote(&self, identifier: &str) -> String;

    /// Binds the dialect to an open connection.
    ///
    /// Runs `version_query()` against the connection to learn the server
    /// version; any failure here is reported as `DialectInitError`.
    async fn init(
        &mut self,
        conn: &dyn Connection,
        uri: &ConnectionUri,
        driver_name: &str,
        data_source_name: &str,
    ) -> EngineResult<()> {
        let family = self.family();
        let query = self.version_query();
        self.base_mut()
            .init(family, query, conn, uri, driver_name, data_source_name)
            .await
    }

    /// Dialect-specific tuning that the DSN cannot express
    fn set_params(&mut self, params: HashMap<String, String>) {
        self.base_mut().params = params;
    }

    fn params(&self) -> &HashMap<String, String> {
        &self.base().params
    }

    /// `None` until `init` succeeded
    fn uri(&self) -> Option<&ConnectionUri> {
        self.base().uri.as_ref()
    }

    fn server_version(&self) -> Option<&str> {
        self.base().server_version.as_deref()
    }
}

/// Opens physical connections
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(
        &self,
        driver_name: &str,
        data_source_name: &str,
    ) -> EngineResult<Box<dyn Connection>>;
}

/// A live database handle owned by a single engine
#[async_trait]
pub trait Connection: Send + Sync {
    fn id(&self) -> ConnectionId;

    fn driver_name(&self) -> &str;

    fn data_source_name(&self) -> &str;

    async fn ping(&self) -> EngineResult<()>;

    /// Runs `sql` and returns the first column of the first row as text
    async fn query_scalar(&self, sql: &str) -> EngineResult<Option<String>>;

    /// Releases the connection. Calling it again is a no-op.
    async fn close(&self) -> EngineResult<()>;

    fn is_closed(&self) -> bool;
}
