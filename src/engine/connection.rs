//! SQLx connector
//!
//! Opens physical connections through sqlx's `Any` driver. Each engine gets
//! its own small pool, owned by the engine and closed with it.
//!
//! SQLx has no transport for SQL Server or Oracle; those drivers still parse
//! and resolve a dialect, but opening them fails with `ConnectionError`
//! unless a different `Connector` is supplied.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use url::{form_urlencoded, Url};

use crate::config::EngineConfig;
use crate::engine::drivers::{MyMySqlDriver, MySqlDriver, PostgresDriver, SqliteDriver};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::traits::{Connection, Connector, Driver};
use crate::engine::types::{ConnectionId, ConnectionUri};

/// Connector backed by sqlx pools
#[derive(Debug, Clone)]
pub struct SqlxConnector {
    max_connections: u32,
    acquire_timeout: Duration,
}

impl SqlxConnector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_connections: config.max_connections.max(1),
            acquire_timeout: Duration::from_secs(config.acquire_timeout_secs),
        }
    }

    /// Translates a driver DSN into the URL sqlx expects
    pub fn sqlx_url(driver_name: &str, data_source_name: &str) -> EngineResult<String> {
        match driver_name {
            "sqlite3" => Ok(Self::sqlite_url(data_source_name)),
            "postgres" | "pgx" => {
                if data_source_name.starts_with("postgres://")
                    || data_source_name.starts_with("postgresql://")
                {
                    return Ok(data_source_name.to_string());
                }
                let uri = PostgresDriver.parse(driver_name, data_source_name)?;
                Self::url_from_uri("postgres", &uri, 5432)
            }
            "mysql" => {
                let uri = MySqlDriver.parse(driver_name, data_source_name)?;
                Self::url_from_uri("mysql", &uri, 3306)
            }
            "mymysql" => {
                let uri = MyMySqlDriver.parse(driver_name, data_source_name)?;
                Self::url_from_uri("mysql", &uri, 3306)
            }
            other => Err(EngineError::connection_failed(
                other,
                "no native transport available for this driver",
            )),
        }
    }

    /// Builds an opaque `sqlite:` URL. The whole path is one percent-encoded
    /// segment so URL parsing cannot normalize or re-decode it.
    fn sqlite_url(data_source_name: &str) -> String {
        let (path, query) = SqliteDriver::split_dsn(data_source_name);
        let options: BTreeMap<String, String> = query
            .map(|q| {
                form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .filter(|(key, _)| matches!(key.as_str(), "mode" | "cache" | "immutable" | "vfs"))
                    .collect()
            })
            .unwrap_or_default();

        let in_memory = path == ":memory:"
            || path.is_empty()
            || options.get("mode").map(String::as_str) == Some("memory");
        if in_memory {
            return "sqlite::memory:".to_string();
        }

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if !options.contains_key("mode") {
            serializer.append_pair("mode", "rwc");
        }
        serializer.extend_pairs(&options);

        format!("sqlite:{}?{}", encode_component(path), serializer.finish())
    }

    fn url_from_uri(scheme: &str, uri: &ConnectionUri, default_port: u16) -> EngineResult<String> {
        let bad_url = |e: String| EngineError::connection_failed(scheme, e);

        let socket = socket_path(uri);
        let mut url = Url::parse(&format!("{}://localhost", scheme)).map_err(|e| bad_url(e.to_string()))?;
        if let Some(host) = uri.host.as_deref().filter(|h| !h.is_empty() && socket.is_none()) {
            url.set_host(Some(host)).map_err(|e| bad_url(e.to_string()))?;
        }
        url.set_port(Some(uri.port.unwrap_or(default_port)))
            .map_err(|_| bad_url("cannot set port".to_string()))?;
        if let Some(user) = &uri.user {
            url.set_username(user)
                .map_err(|_| bad_url("cannot set user".to_string()))?;
        }
        if let Some(password) = &uri.password {
            url.set_password(Some(password))
                .map_err(|_| bad_url("cannot set password".to_string()))?;
        }
        url.set_path(&uri.database);

        {
            let mut query = url.query_pairs_mut();
            let params: BTreeMap<&String, &String> = uri.params.iter().collect();
            query.extend_pairs(params);
            if let Some(socket) = socket {
                // sqlx-postgres takes a socket directory through `host`
                let key = if scheme == "postgres" { "host" } else { "socket" };
                query.append_pair(key, socket);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url.to_string())
    }
}

/// Unix socket path named by the URI, if any
fn socket_path(uri: &ConnectionUri) -> Option<&str> {
    if uri.protocol.as_deref() == Some("unix") {
        return uri
            .host
            .as_deref()
            .or(uri.remote_addr.as_deref())
            .filter(|path| !path.is_empty());
    }
    uri.host.as_deref().filter(|h| h.starts_with('/'))
}

/// Percent-encodes everything but unreserved characters, `/` included
fn encode_component(value: &str) -> String {
    // byte_serialize writes a literal `+` as `%2B`, so any `+` left is a space
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

impl Default for SqlxConnector {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

#[async_trait]
impl Connector for SqlxConnector {
    async fn open(
        &self,
        driver_name: &str,
        data_source_name: &str,
    ) -> EngineResult<Box<dyn Connection>> {
        let url = Self::sqlx_url(driver_name, data_source_name)?;
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(&url)
            .await
            .map_err(|e| EngineError::connection_failed(driver_name, e.to_string()))?;

        let conn = SqlxConnection {
            id: ConnectionId::new(),
            driver_name: driver_name.to_string(),
            data_source_name: data_source_name.to_string(),
            pool,
            closed: AtomicBool::new(false),
        };
        tracing::debug!(driver = %driver_name, connection = %conn.id, "connection opened");

        Ok(Box::new(conn))
    }
}

/// A pool-backed connection handle
pub struct SqlxConnection {
    id: ConnectionId,
    driver_name: String,
    data_source_name: String,
    pool: AnyPool,
    closed: AtomicBool,
}

impl SqlxConnection {
    fn ensure_open(&self) -> EngineResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(EngineError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for SqlxConnection {
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
        self.ensure_open()?;
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| EngineError::query(e.to_string()))?;
        Ok(())
    }

    async fn query_scalar(&self, sql: &str) -> EngineResult<Option<String>> {
        self.ensure_open()?;
        sqlx::query_scalar::<_, String>(sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| EngineError::query(e.to_string()))
    }

    async fn close(&self) -> EngineResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.pool.close().await;
        tracing::debug!(driver = %self.driver_name, connection = %self.id, "connection closed");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_urls() {
        assert_eq!(
            SqlxConnector::sqlx_url("sqlite3", "file:test.db").expect("url"),
            "sqlite:test.db?mode=rwc"
        );
        assert_eq!(
            SqlxConnector::sqlx_url("sqlite3", ":memory:").expect("url"),
            "sqlite::memory:"
        );
        assert_eq!(
            SqlxConnector::sqlx_url("sqlite3", "file:shared?mode=memory&cache=shared").expect("url"),
            "sqlite::memory:"
        );
    }

    #[test]
    fn sqlite_paths_are_encoded_as_one_segment() {
        assert_eq!(
            SqlxConnector::sqlx_url("sqlite3", "file:my data.db").expect("url"),
            "sqlite:my%20data.db?mode=rwc"
        );
        assert_eq!(
            SqlxConnector::sqlx_url("sqlite3", "file:sub/../rel.db").expect("url"),
            "sqlite:sub%2F..%2Frel.db?mode=rwc"
        );
        assert_eq!(
            SqlxConnector::sqlx_url("sqlite3", "file:50%25.db").expect("url"),
            "sqlite:50%2525.db?mode=rwc"
        );
        assert_eq!(
            SqlxConnector::sqlx_url("sqlite3", "/var/lib/app+1.db").expect("url"),
            "sqlite:%2Fvar%2Flib%2Fapp%2B1.db?mode=rwc"
        );
    }

    #[test]
    fn sqlite_keeps_options_sqlx_understands() {
        assert_eq!(
            SqlxConnector::sqlx_url("sqlite3", "file:app.db?mode=ro&cache=shared&_loc=auto")
                .expect("url"),
            "sqlite:app.db?cache=shared&mode=ro"
        );
    }

    #[test]
    fn postgres_key_values_become_url() {
        let url = SqlxConnector::sqlx_url(
            "postgres",
            "host=db user=app password=p@ss dbname=orders sslmode=disable",
        )
        .expect("url");
        assert_eq!(url, "postgres://app:p%40ss@db:5432/orders?sslmode=disable");

        let passthrough = "postgres://app@db/orders";
        assert_eq!(
            SqlxConnector::sqlx_url("pgx", passthrough).expect("url"),
            passthrough
        );
    }

    #[test]
    fn postgres_forwards_params_and_socket_host() {
        let url = SqlxConnector::sqlx_url(
            "postgres",
            "host=/var/run/postgresql user=app dbname=orders sslrootcert=/etc/ca.pem \
             sslmode=verify-full application_name=svc",
        )
        .expect("url");
        assert_eq!(
            url,
            "postgres://app@localhost:5432/orders?application_name=svc&sslmode=verify-full\
             &sslrootcert=%2Fetc%2Fca.pem&host=%2Fvar%2Frun%2Fpostgresql"
        );
    }

    #[test]
    fn mysql_unix_sockets_become_socket_param() {
        let url = SqlxConnector::sqlx_url("mysql", "root@unix(/tmp/mysql.sock)/shop?parseTime=true")
            .expect("url");
        assert_eq!(
            url,
            "mysql://root@localhost:3306/shop?parseTime=true&socket=%2Ftmp%2Fmysql.sock"
        );

        let url = SqlxConnector::sqlx_url("mymysql", "unix:/var/run/mysqld/mysqld.sock*shop/root/pw")
            .expect("url");
        assert_eq!(
            url,
            "mysql://root:pw@localhost:3306/shop?socket=%2Fvar%2Frun%2Fmysqld%2Fmysqld.sock"
        );
    }

    #[test]
    fn mysql_dsn_becomes_url() {
        let url = SqlxConnector::sqlx_url("mysql", "root:pw@tcp(10.1.1.1:3307)/shop?charset=utf8mb4")
            .expect("url");
        assert_eq!(url, "mysql://root:pw@10.1.1.1:3307/shop?charset=utf8mb4");

        let url = SqlxConnector::sqlx_url("mymysql", "shop/root/pw").expect("url");
        assert_eq!(url, "mysql://root:pw@localhost:3306/shop");
    }

    #[test]
    fn drivers_without_transport_fail_to_open() {
        let err = SqlxConnector::sqlx_url("mssql", "server=x;database=y").expect_err("no transport");
        assert!(matches!(err, EngineError::ConnectionError { .. }));
    }
}
