//! PostgreSQL dialect

use crate::engine::dialects::{quote_with, DialectBase};
use crate::engine::traits::Dialect;
use crate::engine::types::DbFamily;

pub const DEFAULT_SCHEMA: &str = "public";

#[derive(Debug, Default)]
pub struct PostgresDialect {
    base: DialectBase,
}

impl PostgresDialect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema tables are created in: a `schema` param, the DSN's
    /// `search_path`, then `public`
    pub fn schema(&self) -> &str {
        self.base
            .params
            .get("schema")
            .map(String::as_str)
            .or_else(|| self.base.uri.as_ref().and_then(|u| u.schema.as_deref()))
            .unwrap_or(DEFAULT_SCHEMA)
    }
}

impl Dialect for PostgresDialect {
    fn family(&self) -> DbFamily {
        DbFamily::Postgres
    }

    fn base(&self) -> &DialectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DialectBase {
        &mut self.base
    }

    fn version_query(&self) -> &'static str {
        "SELECT version()"
    }

    fn quote(&self, identifier: &str) -> String {
        quote_with(identifier, '"', '"')
    }
}
