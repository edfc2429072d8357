//! Built-in connection string parsers
//!
//! Each driver understands the DSN syntax of one client library and turns it
//! into a `ConnectionUri`.

pub mod mssql;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sqlite;

use std::collections::HashMap;
use std::time::Duration;

pub use mssql::OdbcDriver;
pub use mysql::{MyMySqlDriver, MySqlDriver};
pub use oracle::OracleDriver;
pub use postgres::PostgresDriver;
pub use sqlite::SqliteDriver;

/// Splits `host:port`, `[v6]:port` or a bare host.
pub(crate) fn split_host_port(addr: &str) -> Result<(String, Option<u16>), String> {
    let addr = addr.trim();
    if addr.is_empty() {
        return Ok((String::new(), None));
    }

    if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| format!("Unterminated IPv6 address: {}", addr))?;
        let port = match tail.strip_prefix(':') {
            Some(port) => Some(parse_port(port)?),
            None if tail.is_empty() => None,
            None => return Err(format!("Invalid address: {}", addr)),
        };
        return Ok((host.to_string(), port));
    }

    match addr.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => Ok((host.to_string(), Some(parse_port(port)?))),
        Some(_) => Ok((addr.to_string(), None)),
        None => Ok((addr.to_string(), None)),
    }
}

fn parse_port(raw: &str) -> Result<u16, String> {
    raw.parse::<u16>()
        .map_err(|_| format!("Invalid port: {}", raw))
}

/// Parses `a=1&b=2` into a map. Keys without `=` get an empty value.
pub(crate) fn parse_query(raw: &str) -> HashMap<String, String> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

/// Parses durations written like `30s`, `1m30s`, `250ms` or `1.5h`.
pub(crate) fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Empty duration".to_string());
    }
    if raw == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = 0f64; // nanoseconds
    let mut rest = raw;
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| format!("Missing unit in duration: {}", raw))?;
        if num_end == 0 {
            return Err(format!("Invalid duration: {}", raw));
        }
        let value: f64 = rest[..num_end]
            .parse()
            .map_err(|_| format!("Invalid duration: {}", raw))?;
        rest = &rest[num_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            unit => return Err(format!("Unknown unit {:?} in duration: {}", unit, raw)),
        };
        total += value * scale;
        rest = &rest[unit_end..];
    }

    Ok(Duration::from_nanos(total.round() as u64))
}
