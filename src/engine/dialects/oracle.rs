//! Oracle dialect

use crate::engine::dialects::{quote_with, DialectBase};
use crate::engine::traits::Dialect;
use crate::engine::types::DbFamily;

#[derive(Debug, Default)]
pub struct OracleDialect {
    base: DialectBase,
}

impl OracleDialect {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Dialect for OracleDialect {
    fn family(&self) -> DbFamily {
        DbFamily::Oracle
    }

    fn base(&self) -> &DialectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DialectBase {
        &mut self.base
    }

    fn version_query(&self) -> &'static str {
        "SELECT banner FROM v$version WHERE ROWNUM = 1"
    }

    fn quote(&self, identifier: &str) -> String {
        quote_with(identifier, '"', '"')
    }
}
