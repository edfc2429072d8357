//! In-memory connector used by unit tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::traits::{Connection, Connector};
use crate::engine::types::ConnectionId;

#[derive(Default)]
pub struct Counters {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
}

impl Counters {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Connector whose connections answer every scalar query with `version`
pub struct MockConnector {
    pub counters: Arc<Counters>,
    pub version: Option<String>,
    pub fail_open: bool,
}

impl MockConnector {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            version: Some("mock 1.0".to_string()),
            fail_open: false,
        }
    }

    /// Connections report no server version, so dialect init fails
    pub fn without_version() -> Self {
        Self {
            version: None,
            ..Self::new()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn open(
        &self,
        driver_name: &str,
        data_source_name: &str,
    ) -> EngineResult<Box<dyn Connection>> {
        if self.fail_open {
            return Err(EngineError::connection_failed(driver_name, "connection refused"));
        }
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            id: ConnectionId::new(),
            driver_name: driver_name.to_string(),
            data_source_name: data_source_name.to_string(),
            version: self.version.clone(),
            counters: Arc::clone(&self.counters),
            closed: AtomicBool::new(false),
        }))
    }
}

pub struct MockConnection {
    id: ConnectionId,
    driver_name: String,
    data_source_name: String,
    version: Option<String>,
    counters: Arc<Counters>,
    closed: AtomicBool,
}

#[async_trait]
impl Connection for MockConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn driver_name(&self) -> &str {
        &self.driver_name
    }

    fn data_source_name(&self) -> &str {
        &self.data_source_name
    }

    async fn ping(&self) -> EngineResult<()> {
        if self.is_closed() {
            return Err(EngineError::Closed);
        }
        Ok(())
    }

    async fn query_scalar(&self, _sql: &str) -> EngineResult<Option<String>> {
        Ok(self.version.clone())
    }

    async fn close(&self) -> EngineResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
