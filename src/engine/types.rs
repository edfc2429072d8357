//! Shared data types for the engine bootstrap layer
//!
//! These types describe what a connection string resolves to and the
//! defaults an Engine is assembled with.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Abstract database family, reachable through one or more drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbFamily {
    MySql,
    Postgres,
    #[serde(rename = "sqlite3")]
    Sqlite,
    Mssql,
    Oracle,
}

impl DbFamily {
    pub const ALL: [DbFamily; 5] = [
        DbFamily::MySql,
        DbFamily::Postgres,
        DbFamily::Sqlite,
        DbFamily::Mssql,
        DbFamily::Oracle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DbFamily::MySql => "mysql",
            DbFamily::Postgres => "postgres",
            DbFamily::Sqlite => "sqlite3",
            DbFamily::Mssql => "mssql",
            DbFamily::Oracle => "oracle",
        }
    }
}

impl fmt::Display for DbFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(DbFamily::MySql),
            "postgres" | "postgresql" => Ok(DbFamily::Postgres),
            "sqlite3" | "sqlite" => Ok(DbFamily::Sqlite),
            "mssql" => Ok(DbFamily::Mssql),
            "oracle" => Ok(DbFamily::Oracle),
            other => Err(format!("Unknown database family: {}", other)),
        }
    }
}

/// Time zone used when reading or writing timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// The process's local time zone
    Local,
    Utc,
    /// Fixed offset in seconds east of UTC
    Fixed { offset_secs: i32 },
}

impl Location {
    /// Offset of this location at the given instant.
    pub fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        match self {
            Location::Local => instant.with_timezone(&Local).offset().fix(),
            Location::Utc => Utc.fix(),
            Location::Fixed { offset_secs } => {
                FixedOffset::east_opt(*offset_secs).unwrap_or_else(|| Utc.fix())
            }
        }
    }

    /// Converts a UTC instant into this location.
    pub fn convert(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset_at(instant))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local => f.write_str("Local"),
            Location::Utc => f.write_str("UTC"),
            Location::Fixed { offset_secs } => {
                let sign = if *offset_secs < 0 { '-' } else { '+' };
                let abs = offset_secs.unsigned_abs();
                write!(f, "{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60)
            }
        }
    }
}

impl FromStr for Location {
    type Err = String;

    /// Accepts `Local`, `UTC` or a fixed offset such as `+08:00` / `-0530`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        match raw.to_ascii_lowercase().as_str() {
            "local" => return Ok(Location::Local),
            "utc" | "z" => return Ok(Location::Utc),
            _ => {}
        }

        let (sign, rest) = match raw.as_bytes().first() {
            Some(b'+') => (1, &raw[1..]),
            Some(b'-') => (-1, &raw[1..]),
            _ => return Err(format!("Unknown time zone: {}", raw)),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("Invalid time zone offset: {}", raw));
        }
        let hours: i32 = digits[..2].parse().map_err(|_| format!("Invalid hours: {}", raw))?;
        let minutes: i32 = digits[2..]
            .parse()
            .map_err(|_| format!("Invalid minutes: {}", raw))?;
        if hours > 23 || minutes > 59 {
            return Err(format!("Time zone offset out of range: {}", raw));
        }

        Ok(Location::Fixed {
            offset_secs: sign * (hours * 3600 + minutes * 60),
        })
    }
}

/// Parsed connection string
///
/// Only `family` is guaranteed; the other fields are filled in as far as
/// the driver's DSN syntax carries them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionUri {
    pub family: DbFamily,
    pub protocol: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: String,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub charset: Option<String>,
    pub schema: Option<String>,
    pub local_addr: Option<String>,
    pub remote_addr: Option<String>,
    pub timeout: Option<Duration>,
    /// Time zone requested by the connection string
    pub location: Option<Location>,
    pub params: HashMap<String, String>,
}

impl ConnectionUri {
    pub fn new(family: DbFamily, database: impl Into<String>) -> Self {
        Self {
            family,
            protocol: None,
            host: None,
            port: None,
            database: database.into(),
            user: None,
            password: None,
            charset: None,
            schema: None,
            local_addr: None,
            remote_addr: None,
            timeout: None,
            location: None,
            params: HashMap::new(),
        }
    }
}

/// Identity of one physical connection handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Defaults applied to operations the engine runs on the caller's behalf
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    pub timeout: Option<Duration>,
}

impl ExecutionContext {
    /// No deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// An in-process type that maps onto a table
pub trait Model: 'static {
    /// Application-side type name, e.g. `UserAccount`
    fn model_name() -> &'static str;

    /// Application-side field names, in declaration order
    fn field_names() -> &'static [&'static str];
}

/// Table schema derived from a `Model` through the engine's name mapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub model: String,
    pub name: String,
    pub columns: Vec<String>,
}
