//! Built-in driver/dialect bundles
//!
//! The closed set of drivers understood out of the box. Several drivers may
//! serve one family (native and ODBC, or two client libraries); they all
//! share that family's dialect.

use std::sync::Arc;

use crate::engine::dialects::{MssqlDialect, MySqlDialect, OracleDialect, PostgresDialect, SqliteDialect};
use crate::engine::drivers::{
    MyMySqlDriver, MySqlDriver, OdbcDriver, OracleDriver, PostgresDriver, SqliteDriver,
};
use crate::engine::registry::Registry;
use crate::engine::traits::{Dialect, DialectFactory, Driver};
use crate::engine::types::DbFamily;

/// One built-in driver and the dialect of its family
pub struct Bundle {
    pub driver_name: &'static str,
    pub family: DbFamily,
    pub driver: fn() -> Arc<dyn Driver>,
    pub dialect: fn() -> Box<dyn Dialect>,
}

fn driver<D: Driver + Default + 'static>() -> Arc<dyn Driver> {
    Arc::new(D::default())
}

fn dialect<D: Dialect + Default + 'static>() -> Box<dyn Dialect> {
    Box::new(D::default())
}

pub static BUNDLES: &[Bundle] = &[
    Bundle {
        driver_name: "mssql",
        family: DbFamily::Mssql,
        driver: driver::<OdbcDriver>,
        dialect: dialect::<MssqlDialect>,
    },
    Bundle {
        driver_name: "odbc",
        family: DbFamily::Mssql,
        driver: driver::<OdbcDriver>,
        dialect: dialect::<MssqlDialect>,
    },
    Bundle {
        driver_name: "mysql",
        family: DbFamily::MySql,
        driver: driver::<MySqlDriver>,
        dialect: dialect::<MySqlDialect>,
    },
    Bundle {
        driver_name: "mymysql",
        family: DbFamily::MySql,
        driver: driver::<MyMySqlDriver>,
        dialect: dialect::<MySqlDialect>,
    },
    Bundle {
        driver_name: "postgres",
        family: DbFamily::Postgres,
        driver: driver::<PostgresDriver>,
        dialect: dialect::<PostgresDialect>,
    },
    Bundle {
        driver_name: "pgx",
        family: DbFamily::Postgres,
        driver: driver::<PostgresDriver>,
        dialect: dialect::<PostgresDialect>,
    },
    Bundle {
        driver_name: "sqlite3",
        family: DbFamily::Sqlite,
        driver: driver::<SqliteDriver>,
        dialect: dialect::<SqliteDialect>,
    },
    Bundle {
        driver_name: "oci8",
        family: DbFamily::Oracle,
        driver: driver::<OracleDriver>,
        dialect: dialect::<OracleDialect>,
    },
    Bundle {
        driver_name: "goracle",
        family: DbFamily::Oracle,
        driver: driver::<OracleDriver>,
        dialect: dialect::<OracleDialect>,
    },
];

/// Seeds `registry` with every bundle whose driver name is not registered yet
///
/// Returns how many drivers were newly registered. Running it again, or from
/// several threads at once, leaves the registry unchanged.
pub fn bootstrap(registry: &Registry) -> usize {
    let mut added = 0;
    for bundle in BUNDLES {
        if registry.query_driver(bundle.driver_name).is_some() {
            continue;
        }
        if registry.register_driver(bundle.driver_name, (bundle.driver)()) {
            added += 1;
        }
        let factory: DialectFactory = Arc::new(bundle.dialect);
        registry.register_dialect(bundle.family, factory);
    }
    tracing::debug!(added, total = registry.len(), "bootstrapped driver bundles");
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_bundle_is_queryable_after_bootstrap() {
        let registry = Registry::new();
        assert_eq!(bootstrap(&registry), BUNDLES.len());

        for bundle in BUNDLES {
            assert!(
                registry.query_driver(bundle.driver_name).is_some(),
                "driver {} missing",
                bundle.driver_name
            );
            let factory = registry
                .query_dialect(bundle.family)
                .unwrap_or_else(|| panic!("dialect {} missing", bundle.family));
            assert_eq!(factory().family(), bundle.family);
        }
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let registry = Registry::new();
        bootstrap(&registry);
        let names = registry.driver_names();

        assert_eq!(bootstrap(&registry), 0);
        assert_eq!(registry.driver_names(), names);
        assert_eq!(registry.families().len(), DbFamily::ALL.len());
    }

    #[test]
    fn bootstrap_keeps_user_registrations() {
        let registry = Registry::new();
        registry.register_driver("mysql", Arc::new(SqliteDriver));

        assert_eq!(bootstrap(&registry), BUNDLES.len() - 1);

        let uri = registry
            .query_driver("mysql")
            .expect("mysql registered")
            .parse("mysql", "app.db")
            .expect("sqlite driver accepts any path");
        assert_eq!(uri.family, DbFamily::Sqlite);
    }

    #[test]
    fn concurrent_bootstrap_registers_each_driver_once() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || bootstrap(&registry))
            })
            .collect();

        let added: usize = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .sum();

        assert_eq!(added, BUNDLES.len());
        assert_eq!(registry.len(), BUNDLES.len());
    }
}
