// Engine Module
// Driver/dialect resolution and Engine construction

pub mod bootstrap;
pub mod cache;
pub mod connection;
pub mod dialects;
pub mod drivers;
pub mod error;
pub mod factory;
pub mod handle;
pub mod logger;
pub mod mapper;
pub mod registry;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{Cacher, MemoryCacher};
pub use connection::SqlxConnector;
pub use error::{EngineError, EngineResult};
pub use factory::EngineFactory;
pub use handle::Engine;
pub use logger::{LogLevel, Logger, TracingLogger};
pub use mapper::{CacheMapper, GonicMapper, NameMapper, SameMapper, SnakeMapper};
pub use registry::Registry;
pub use traits::{Connection, Connector, Dialect, DialectFactory, Driver};
pub use types::*;
