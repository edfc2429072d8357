//! MySQL dialect

use std::collections::HashMap;

use crate::engine::dialects::{quote_with, DialectBase};
use crate::engine::traits::Dialect;
use crate::engine::types::DbFamily;

#[derive(Debug, Default)]
pub struct MySqlDialect {
    base: DialectBase,
    row_format: Option<String>,
}

impl MySqlDialect {
    pub fn new() -> Self {
        Self::default()
    }

    /// `ROW_FORMAT` appended to generated `CREATE TABLE` statements
    pub fn row_format(&self) -> Option<&str> {
        self.row_format.as_deref()
    }

    /// Character set requested by the connection string
    pub fn charset(&self) -> Option<&str> {
        self.base.uri.as_ref().and_then(|u| u.charset.as_deref())
    }
}

impl Dialect for MySqlDialect {
    fn family(&self) -> DbFamily {
        DbFamily::MySql
    }

    fn base(&self) -> &DialectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DialectBase {
        &mut self.base
    }

    fn version_query(&self) -> &'static str {
        "SELECT VERSION()"
    }

    fn quote(&self, identifier: &str) -> String {
        quote_with(identifier, '`', '`')
    }

    fn set_params(&mut self, params: HashMap<String, String>) {
        self.row_format = params.get("rowFormat").map(|v| v.to_uppercase());
        self.base.params = params;
    }
}
