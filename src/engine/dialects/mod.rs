//! Built-in dialects
//!
//! One dialect per database family. A dialect instance is created fresh for
//! every engine and bound to that engine's connection by `init`.

pub mod mssql;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sqlite;

use std::collections::HashMap;

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::traits::Connection;
use crate::engine::types::{ConnectionUri, DbFamily};

pub use mssql::MssqlDialect;
pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

/// State every dialect carries once bound to a connection
#[derive(Debug, Default, Clone)]
pub struct DialectBase {
    pub uri: Option<ConnectionUri>,
    pub driver_name: String,
    pub data_source_name: String,
    pub server_version: Option<String>,
    pub params: HashMap<String, String>,
}

impl DialectBase {
    /// Records the binding and probes the server version.
    pub async fn init(
        &mut self,
        family: DbFamily,
        version_query: &str,
        conn: &dyn Connection,
        uri: &ConnectionUri,
        driver_name: &str,
        data_source_name: &str,
    ) -> EngineResult<()> {
        let version = conn
            .query_scalar(version_query)
            .await
            .map_err(|e| EngineError::dialect_init(family, e.to_string()))?
            .ok_or_else(|| EngineError::dialect_init(family, "server version query returned no rows"))?;

        tracing::debug!(
            family = %family,
            driver = %driver_name,
            server_version = %version,
            "dialect initialized"
        );

        self.uri = Some(uri.clone());
        self.driver_name = driver_name.to_string();
        self.data_source_name = data_source_name.to_string();
        self.server_version = Some(version);
        Ok(())
    }
}

/// Wraps `identifier` in `open`/`close`, doubling any embedded `close`.
pub(crate) fn quote_with(identifier: &str, open: char, close: char) -> String {
    let mut quoted = String::with_capacity(identifier.len() + 2);
    quoted.push(open);
    for c in identifier.chars() {
        if c == close {
            quoted.push(close);
        }
        quoted.push(c);
    }
    quoted.push(close);
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::MockConnector;
    use crate::engine::traits::{Connector, Dialect};

    #[test]
    fn quoting_escapes_closing_char() {
        assert_eq!(quote_with("user", '"', '"'), "\"user\"");
        assert_eq!(quote_with("we\"ird", '"', '"'), "\"we\"\"ird\"");
        assert_eq!(quote_with("a]b", '[', ']'), "[a]]b]");
    }

    #[tokio::test]
    async fn init_binds_every_builtin_dialect() {
        let connector = MockConnector::new();
        let dialects: Vec<Box<dyn Dialect>> = vec![
            Box::new(MySqlDialect::new()),
            Box::new(PostgresDialect::new()),
            Box::new(SqliteDialect::new()),
            Box::new(MssqlDialect::new()),
            Box::new(OracleDialect::new()),
        ];

        for mut dialect in dialects {
            let family = dialect.family();
            let conn = connector.open("mock", "dsn").await.expect("open");
            let uri = ConnectionUri::new(family, "app");

            assert!(dialect.uri().is_none());
            dialect
                .init(conn.as_ref(), &uri, "mock", "dsn")
                .await
                .expect("init");

            assert_eq!(dialect.uri().map(|u| u.family), Some(family));
            assert_eq!(dialect.server_version(), Some("mock 1.0"));
            assert_eq!(dialect.base().driver_name, "mock");
            assert_eq!(dialect.base().data_source_name, "dsn");
        }
    }

    #[tokio::test]
    async fn init_without_version_row_fails() {
        let connector = MockConnector::without_version();
        let conn = connector.open("mock", "dsn").await.expect("open");
        let mut dialect = OracleDialect::new();

        let err = dialect
            .init(conn.as_ref(), &ConnectionUri::new(DbFamily::Oracle, "ORCL"), "mock", "dsn")
            .await
            .expect_err("no version row");

        assert!(matches!(
            err,
            EngineError::DialectInitError { family: DbFamily::Oracle, .. }
        ));
        assert!(dialect.server_version().is_none());
    }

    #[test]
    fn params_are_stored_on_the_base() {
        let mut dialect = SqliteDialect::new();
        dialect.set_params(HashMap::from([("journal".to_string(), "wal".to_string())]));
        assert_eq!(dialect.params().get("journal").map(String::as_str), Some("wal"));
        assert_eq!(dialect.quote("a`b"), "`a``b`");
    }
}
