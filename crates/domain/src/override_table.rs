//! Operator supplied PTR overrides.
//!
//! Source format, one mapping per line:
//!
//! ```text
//! # comment
//! 1.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.1.8.b.d.0.1.0.0.2.ip6.arpa. = server.example.com.
//! ```
//!
//! Keys are stored by decoded address, which is equivalent to keying on the
//! canonical lowercase reverse name.

use crate::reverse_name::{parse_reverse_name, validate_fqdn};
use rustc_hash::FxHashMap;
use std::fmt;
use std::net::Ipv6Addr;
use std::sync::Arc;

/// A skipped override line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideLoadWarning {
    /// 1-based line number in the source.
    pub line: usize,
    pub reason: String,
}

impl fmt::Display for OverrideLoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Result of parsing an override source.
#[derive(Debug, Clone, Default)]
pub struct OverrideLoad {
    pub table: OverrideTable,
    pub warnings: Vec<OverrideLoadWarning>,
}

#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: FxHashMap<Ipv6Addr, Arc<str>>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses override lines. Bad lines are skipped and reported; they never
    /// stop the lines after them from loading.
    pub fn parse(source: &str) -> OverrideLoad {
        let mut table = OverrideTable::new();
        let mut warnings = Vec::new();

        for (idx, raw) in source.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_line(line) {
                Ok((addr, target)) => {
                    table.insert(addr, target);
                }
                Err(reason) => warnings.push(OverrideLoadWarning {
                    line: idx + 1,
                    reason,
                }),
            }
        }

        OverrideLoad { table, warnings }
    }

    /// Adds or replaces a mapping; the later definition wins.
    pub fn insert(&mut self, addr: Ipv6Addr, target: impl Into<Arc<str>>) -> Option<Arc<str>> {
        self.entries.insert(addr, target.into())
    }

    pub fn get(&self, addr: Ipv6Addr) -> Option<&str> {
        self.entries.get(&addr).map(|target| target.as_ref())
    }

    /// Looks up a textual reverse key. Non-canonical case is accepted;
    /// anything that is not a full reverse name never matches.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let addr = parse_reverse_name(key).ok()?;
        self.get(addr)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_line(line: &str) -> Result<(Ipv6Addr, String), String> {
    let (key, target) = line
        .split_once('=')
        .ok_or_else(|| "missing '=' separator".to_string())?;

    let key = key.trim();
    let target = target.trim();

    if key.is_empty() {
        return Err("empty reverse key".to_string());
    }
    if target.is_empty() {
        return Err(format!("empty target for '{}'", key));
    }

    let addr = parse_reverse_name(key).map_err(|e| e.to_string())?;
    validate_fqdn(target).map_err(|e| e.to_string())?;

    Ok((addr, target.to_string()))
}
