//! Oracle driver
//!
//! Shared by `oci8` and `goracle`. DSN shape:
//! `user/password@host:port/dbname` (IPv6 hosts in brackets).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::engine::drivers::split_host_port;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::traits::Driver;
use crate::engine::types::{ConnectionUri, DbFamily};

static ORACLE_DSN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<user>.*)/(?P<password>.*)@(?P<net>.*)/(?P<dbname>.*)$")
        .expect("oracle DSN pattern is valid")
});

#[derive(Debug, Default, Clone, Copy)]
pub struct OracleDriver;

impl Driver for OracleDriver {
    fn parse(&self, driver_name: &str, data_source_name: &str) -> EngineResult<ConnectionUri> {
        let caps = ORACLE_DSN
            .captures(data_source_name)
            .ok_or_else(|| EngineError::malformed(driver_name, "dbname is empty"))?;

        let dbname = caps.name("dbname").map(|m| m.as_str()).unwrap_or_default();
        if dbname.is_empty() {
            return Err(EngineError::malformed(driver_name, "dbname is empty"));
        }

        let mut uri = ConnectionUri::new(DbFamily::Oracle, dbname);
        uri.user = caps.name("user").map(|m| m.as_str().to_string());
        uri.password = caps.name("password").map(|m| m.as_str().to_string());
        if let Some(net) = caps.name("net").map(|m| m.as_str()) {
            let (host, port) =
                split_host_port(net).map_err(|e| EngineError::malformed(driver_name, e))?;
            uri.host = Some(host);
            uri.port = port;
        }

        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_password_host_db() {
        let uri = OracleDriver
            .parse("oci8", "scott/tiger@10.0.0.5:1521/ORCL")
            .expect("should parse");

        assert_eq!(uri.family, DbFamily::Oracle);
        assert_eq!(uri.database, "ORCL");
        assert_eq!(uri.user.as_deref(), Some("scott"));
        assert_eq!(uri.password.as_deref(), Some("tiger"));
        assert_eq!(uri.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(uri.port, Some(1521));
    }

    #[test]
    fn parses_ipv6_host() {
        let uri = OracleDriver
            .parse("goracle", "scott/tiger@[::1]:1521/XE")
            .expect("should parse");
        assert_eq!(uri.host.as_deref(), Some("::1"));
        assert_eq!(uri.database, "XE");
    }

    #[test]
    fn rejects_missing_dbname() {
        assert!(OracleDriver.parse("oci8", "scott/tiger@host:1521/").is_err());
        assert!(OracleDriver.parse("oci8", "scott@host").is_err());
    }
}
