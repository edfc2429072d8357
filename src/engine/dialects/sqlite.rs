//! SQLite dialect

use crate::engine::dialects::{quote_with, DialectBase};
use crate::engine::traits::Dialect;
use crate::engine::types::DbFamily;

#[derive(Debug, Default)]
pub struct SqliteDialect {
    base: DialectBase,
}

impl SqliteDialect {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Dialect for SqliteDialect {
    fn family(&self) -> DbFamily {
        DbFamily::Sqlite
    }

    fn base(&self) -> &DialectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DialectBase {
        &mut self.base
    }

    fn version_query(&self) -> &'static str {
        "SELECT sqlite_version()"
    }

    fn quote(&self, identifier: &str) -> String {
        quote_with(identifier, '`', '`')
    }
}
