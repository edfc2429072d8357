//! Identifier mapping
//!
//! Translates between application-side names (`UserAccount`) and
//! database-side names (`user_account`).

use std::collections::HashMap;

use parking_lot::RwLock;

pub trait NameMapper: Send + Sync {
    fn obj_to_table(&self, name: &str) -> String;
    fn table_to_obj(&self, name: &str) -> String;
}

/// Uses names unchanged on both sides
#[derive(Debug, Default, Clone, Copy)]
pub struct SameMapper;

impl NameMapper for SameMapper {
    fn obj_to_table(&self, name: &str) -> String {
        name.to_string()
    }

    fn table_to_obj(&self, name: &str) -> String {
        name.to_string()
    }
}

/// `UserAccount` <-> `user_account`
///
/// Every upper-case letter after the first character starts a new word, so
/// `ID` maps to `i_d`. Use `GonicMapper` for names containing initialisms.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnakeMapper;

impl NameMapper for SnakeMapper {
    fn obj_to_table(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 4);
        for (i, c) in name.chars().enumerate() {
            if c.is_ascii_uppercase() {
                if i > 0 {
                    out.push('_');
                }
                out.push(c.to_ascii_lowercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    fn table_to_obj(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len());
        let mut upper_next = true;
        for c in name.chars() {
            if c == '_' {
                upper_next = true;
                continue;
            }
            if upper_next {
                out.push(c.to_ascii_uppercase());
                upper_next = false;
            } else {
                out.push(c);
            }
        }
        out
    }
}

const COMMON_INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID", "IP",
    "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS", "TTL",
    "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XSRF", "XSS",
];

/// Snake case that keeps initialisms together: `UserID` <-> `user_id`,
/// `HTTPServer` <-> `http_server`
#[derive(Debug, Default, Clone, Copy)]
pub struct GonicMapper;

impl NameMapper for GonicMapper {
    fn obj_to_table(&self, name: &str) -> String {
        let chars: Vec<char> = name.chars().collect();
        let mut out = String::with_capacity(name.len() + 4);
        for (i, &c) in chars.iter().enumerate() {
            if c.is_ascii_uppercase() && i > 0 {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
                if prev.is_ascii_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_ascii_uppercase() && next_is_lower)
                {
                    out.push('_');
                }
            }
            out.push(c.to_ascii_lowercase());
        }
        out
    }

    fn table_to_obj(&self, name: &str) -> String {
        name.split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let upper = word.to_ascii_uppercase();
                if COMMON_INITIALISMS.contains(&upper.as_str()) {
                    return upper;
                }
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect()
    }
}

/// Memoizes another mapper in both directions
pub struct CacheMapper<M> {
    inner: M,
    to_table: RwLock<HashMap<String, String>>,
    to_obj: RwLock<HashMap<String, String>>,
}

impl<M: NameMapper> CacheMapper<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            to_table: RwLock::new(HashMap::new()),
            to_obj: RwLock::new(HashMap::new()),
        }
    }

    fn lookup(
        cache: &RwLock<HashMap<String, String>>,
        name: &str,
        map: impl FnOnce(&str) -> String,
    ) -> String {
        if let Some(hit) = cache.read().get(name) {
            return hit.clone();
        }
        cache
            .write()
            .entry(name.to_string())
            .or_insert_with(|| map(name))
            .clone()
    }

    /// Number of memoized names in both directions
    pub fn cached(&self) -> usize {
        self.to_table.read().len() + self.to_obj.read().len()
    }
}

impl<M: NameMapper> NameMapper for CacheMapper<M> {
    fn obj_to_table(&self, name: &str) -> String {
        Self::lookup(&self.to_table, name, |n| self.inner.obj_to_table(n))
    }

    fn table_to_obj(&self, name: &str) -> String {
        Self::lookup(&self.to_obj, name, |n| self.inner.table_to_obj(n))
    }
}
