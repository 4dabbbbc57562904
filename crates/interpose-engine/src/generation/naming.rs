//! Unique names for generated types

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

/// Hands out names that are unique within one module scope.
///
/// The first request for a base name gets it unchanged; later requests get
/// `_1`, `_2`, ... appended.
#[derive(Debug, Default)]
pub struct NamingScope {
    used: Mutex<FxHashSet<String>>,
}

impl NamingScope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a unique name derived from `base`
    pub fn unique_name(&self, base: &str) -> String {
        let mut used = self.used.lock();
        if used.insert(base.to_string()) {
            return base.to_string();
        }
        let mut counter = 1usize;
        loop {
            let candidate = format!("{}_{}", base, counter);
            if used.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Check whether a name was handed out
    pub fn contains(&self, name: &str) -> bool {
        self.used.lock().contains(name)
    }

    /// Number of names handed out
    pub fn len(&self) -> usize {
        self.used.lock().len()
    }

    /// Check for no names handed out
    pub fn is_empty(&self) -> bool {
        self.used.lock().is_empty()
    }
}

/// Turn a type display name into an identifier fragment: `Repo<i64, string>`
/// becomes `Repo_i64_string`
pub fn flatten_type_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            if pending_sep {
                out.push('_');
                pending_sep = false;
            }
            out.push(ch);
        } else if ch == '<' || ch == ',' {
            pending_sep = true;
        } else if ch == '.' {
            out.push('.');
        }
        // '>', '!' and spaces are dropped
    }
    out
}
