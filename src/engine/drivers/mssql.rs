//! SQL Server driver
//!
//! Shared by the `mssql` and `odbc` driver names. The DSN is a list of
//! `key=value` pairs separated by `;`, for example
//! `server=db,1433;user id=sa;password=pw;database=app`.

use crate::engine::drivers::split_host_port;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::traits::Driver;
use crate::engine::types::{ConnectionUri, DbFamily};

#[derive(Debug, Default, Clone, Copy)]
pub struct OdbcDriver;

impl Driver for OdbcDriver {
    fn parse(&self, driver_name: &str, data_source_name: &str) -> EngineResult<ConnectionUri> {
        let mut uri = ConnectionUri::new(DbFamily::Mssql, "");

        for pair in data_source_name.split(';') {
            let Some((key, value)) = pair.trim().split_once('=') else {
                continue;
            };
            let value = value.trim().to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "database" => uri.database = value,
                "server" | "data source" => {
                    // sql server writes the port after a comma
                    let addr = value.replacen(',', ":", 1);
                    let (host, port) =
                        split_host_port(&addr).map_err(|e| EngineError::malformed(driver_name, e))?;
                    uri.host = Some(host);
                    uri.port = port;
                }
                "user id" | "uid" => uri.user = Some(value),
                "password" | "pwd" => uri.password = Some(value),
                other => {
                    uri.params.insert(other.to_string(), value);
                }
            }
        }

        if uri.database.is_empty() {
            return Err(EngineError::malformed(driver_name, "no db name provided"));
        }

        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_odbc_pairs() {
        let uri = OdbcDriver
            .parse(
                "odbc",
                "driver={SQL Server};Server=sql01,1444;User Id=sa;Password=pw;Database=crm",
            )
            .expect("should parse");

        assert_eq!(uri.family, DbFamily::Mssql);
        assert_eq!(uri.database, "crm");
        assert_eq!(uri.host.as_deref(), Some("sql01"));
        assert_eq!(uri.port, Some(1444));
        assert_eq!(uri.user.as_deref(), Some("sa"));
        assert_eq!(uri.params.get("driver").map(String::as_str), Some("{SQL Server}"));
    }

    #[test]
    fn requires_database() {
        let err = OdbcDriver
            .parse("mssql", "server=localhost;user id=sa")
            .expect_err("database missing");
        assert!(matches!(err, EngineError::MalformedConnectionString { .. }));
        assert!(err.to_string().contains("no db name provided"));
    }
}
