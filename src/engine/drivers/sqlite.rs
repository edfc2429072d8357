//! SQLite driver
//!
//! The DSN is a file path, optionally prefixed with `file:` and followed by
//! `?key=value` options. Parsing never fails.

use crate::engine::drivers::parse_query;
use crate::engine::error::EngineResult;
use crate::engine::traits::Driver;
use crate::engine::types::{ConnectionUri, DbFamily};

#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDriver;

impl SqliteDriver {
    /// Splits a DSN into its database path and raw query string.
    pub(crate) fn split_dsn(data_source_name: &str) -> (&str, Option<&str>) {
        let (path, query) = match data_source_name.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (data_source_name, None),
        };
        (path.strip_prefix("file:").unwrap_or(path), query)
    }
}

impl Driver for SqliteDriver {
    fn parse(&self, _driver_name: &str, data_source_name: &str) -> EngineResult<ConnectionUri> {
        let (path, query) = Self::split_dsn(data_source_name);
        let mut uri = ConnectionUri::new(DbFamily::Sqlite, path);
        if let Some(query) = query {
            uri.params = parse_query(query);
        }
        Ok(uri)
    }
}
