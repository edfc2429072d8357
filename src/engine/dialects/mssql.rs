//! SQL Server dialect

use crate::engine::dialects::{quote_with, DialectBase};
use crate::engine::traits::Dialect;
use crate::engine::types::DbFamily;

#[derive(Debug, Default)]
pub struct MssqlDialect {
    base: DialectBase,
}

impl MssqlDialect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column type used for unbounded strings; `DEFAULT_VARCHAR` param
    /// switches between `VARCHAR` and `NVARCHAR`
    pub fn default_varchar(&self) -> &str {
        match self.base.params.get("DEFAULT_VARCHAR").map(String::as_str) {
            Some(v) if v.eq_ignore_ascii_case("nvarchar") => "NVARCHAR",
            _ => "VARCHAR",
        }
    }
}

impl Dialect for MssqlDialect {
    fn family(&self) -> DbFamily {
        DbFamily::Mssql
    }

    fn base(&self) -> &DialectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DialectBase {
        &mut self.base
    }

    fn version_query(&self) -> &'static str {
        "SELECT @@VERSION"
    }

    fn quote(&self, identifier: &str) -> String {
        quote_with(identifier, '[', ']')
    }
}
