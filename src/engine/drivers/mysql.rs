//! MySQL drivers
//!
//! Two client syntaxes reach the MySQL family:
//!
//! - `mysql`: `[user[:password]@][net[(addr)]]/dbname[?param1=value1&...]`
//! - `mymysql`: `[proto:raddr[,laddr=..][,timeout=..]*]dbname/user/password`

use once_cell::sync::Lazy;
use regex::Regex;

use crate::engine::drivers::{parse_duration, parse_query, split_host_port};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::traits::Driver;
use crate::engine::types::{ConnectionUri, DbFamily, Location};

static MYSQL_DSN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:(?P<user>.*?)(?::(?P<passwd>.*))?@)?",
        r"(?:(?P<net>[^\(]*)(?:\((?P<addr>[^\)]*)\))?)?",
        r"/(?P<dbname>.*?)",
        r"(?:\?(?P<params>[^\?]*))?$",
    ))
    .expect("mysql DSN pattern is valid")
});

#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDriver;

impl Driver for MySqlDriver {
    fn parse(&self, driver_name: &str, data_source_name: &str) -> EngineResult<ConnectionUri> {
        let caps = MYSQL_DSN
            .captures(data_source_name)
            .ok_or_else(|| EngineError::malformed(driver_name, "dsn format error"))?;
        let group = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().to_string())
                .filter(|s| !s.is_empty())
        };

        let mut uri = ConnectionUri::new(DbFamily::MySql, group("dbname").unwrap_or_default());
        uri.user = group("user");
        uri.password = group("passwd");
        uri.protocol = group("net");

        if let Some(addr) = group("addr") {
            // unix sockets carry a path, not host:port
            if uri.protocol.as_deref() == Some("unix") {
                uri.host = Some(addr);
            } else {
                let (host, port) =
                    split_host_port(&addr).map_err(|e| EngineError::malformed(driver_name, e))?;
                uri.host = Some(host);
                uri.port = port;
            }
        }

        if let Some(params) = group("params") {
            uri.params = parse_query(&params);
        }
        if let Some(charset) = uri.params.get("charset") {
            uri.charset = Some(charset.clone());
        }
        if let Some(loc) = uri.params.get("loc") {
            let location = loc
                .parse::<Location>()
                .map_err(|e| EngineError::malformed(driver_name, e))?;
            uri.location = Some(location);
        }
        if let Some(timeout) = uri.params.get("timeout") {
            let timeout =
                parse_duration(timeout).map_err(|e| EngineError::malformed(driver_name, e))?;
            uri.timeout = Some(timeout);
        }

        Ok(uri)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MyMySqlDriver;

impl Driver for MyMySqlDriver {
    fn parse(&self, driver_name: &str, data_source_name: &str) -> EngineResult<ConnectionUri> {
        let mut uri = ConnectionUri::new(DbFamily::MySql, "");

        let db_part = match data_source_name.split_once('*') {
            Some((proto_part, db_part)) => {
                let (proto, options) = proto_part.split_once(':').ok_or_else(|| {
                    EngineError::malformed(driver_name, "Wrong protocol part of URI")
                })?;
                uri.protocol = Some(proto.to_string());

                let mut options = options.split(',');
                let raddr = options.next().unwrap_or_default();
                uri.remote_addr = Some(raddr.to_string());
                if proto == "tcp" {
                    let (host, port) = split_host_port(raddr)
                        .map_err(|e| EngineError::malformed(driver_name, e))?;
                    uri.host = Some(host);
                    uri.port = port;
                }

                for option in options {
                    let (key, value) = option.split_once('=').unwrap_or((option, "true"));
                    match key {
                        "laddr" => uri.local_addr = Some(value.to_string()),
                        "timeout" => {
                            let timeout = parse_duration(value)
                                .map_err(|e| EngineError::malformed(driver_name, e))?;
                            uri.timeout = Some(timeout);
                        }
                        other => {
                            return Err(EngineError::malformed(
                                driver_name,
                                format!("Unknown option: {}", other),
                            ))
                        }
                    }
                }
                db_part
            }
            None => data_source_name,
        };

        let parts: Vec<&str> = db_part.split('/').collect();
        if parts.len() != 3 {
            return Err(EngineError::malformed(
                driver_name,
                "Wrong database part of URI",
            ));
        }
        uri.database = parts[0].to_string();
        uri.user = Some(parts[1].to_string());
        uri.password = Some(parts[2].to_string());

        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn parses_full_mysql_dsn() {
        let uri = MySqlDriver
            .parse(
                "mysql",
                "root:secret@tcp(127.0.0.1:3306)/shop?charset=utf8mb4&loc=UTC&timeout=5s",
            )
            .expect("should parse");

        assert_eq!(uri.family, DbFamily::MySql);
        assert_eq!(uri.database, "shop");
        assert_eq!(uri.user.as_deref(), Some("root"));
        assert_eq!(uri.password.as_deref(), Some("secret"));
        assert_eq!(uri.protocol.as_deref(), Some("tcp"));
        assert_eq!(uri.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(uri.port, Some(3306));
        assert_eq!(uri.charset.as_deref(), Some("utf8mb4"));
        assert_eq!(uri.location, Some(Location::Utc));
        assert_eq!(uri.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn parses_minimal_mysql_dsn() {
        let uri = MySqlDriver.parse("mysql", "/test").expect("should parse");
        assert_eq!(uri.database, "test");
        assert!(uri.user.is_none());
        assert!(uri.host.is_none());
    }

    #[test]
    fn rejects_mysql_dsn_without_slash() {
        let err = MySqlDriver
            .parse("mysql", "root@localhost")
            .expect_err("missing database separator");
        assert!(matches!(err, EngineError::MalformedConnectionString { .. }));
    }

    #[test]
    fn rejects_unknown_location() {
        let err = MySqlDriver
            .parse("mysql", "root@/db?loc=Nowhere")
            .expect_err("bad loc");
        assert!(err.to_string().contains("Nowhere"));
    }

    #[test]
    fn parses_mymysql_with_protocol() {
        let uri = MyMySqlDriver
            .parse(
                "mymysql",
                "tcp:localhost:3307,laddr=127.0.0.1:0,timeout=2s*app/admin/pw",
            )
            .expect("should parse");

        assert_eq!(uri.family, DbFamily::MySql);
        assert_eq!(uri.protocol.as_deref(), Some("tcp"));
        assert_eq!(uri.host.as_deref(), Some("localhost"));
        assert_eq!(uri.port, Some(3307));
        assert_eq!(uri.local_addr.as_deref(), Some("127.0.0.1:0"));
        assert_eq!(uri.timeout, Some(Duration::from_secs(2)));
        assert_eq!(uri.database, "app");
        assert_eq!(uri.user.as_deref(), Some("admin"));
        assert_eq!(uri.password.as_deref(), Some("pw"));
    }

    #[test]
    fn mymysql_requires_three_database_parts() {
        assert!(MyMySqlDriver.parse("mymysql", "app/admin").is_err());
        assert!(MyMySqlDriver.parse("mymysql", "tcp*app/a/b").is_err());
        assert!(MyMySqlDriver
            .parse("mymysql", "tcp:host:1,bogus=1*app/a/b")
            .is_err());
    }

    #[test]
    fn mymysql_rejects_slash_in_password() {
        let err = MyMySqlDriver
            .parse("mymysql", "app/admin/pa/ss")
            .expect_err("four database parts");
        assert!(matches!(err, EngineError::MalformedConnectionString { .. }));
    }
}
