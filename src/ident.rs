//! Collision-free diagram identifiers.
//!
//! One [`IdRegistry`] lives for exactly one diagram generation pass and is
//! threaded through it by `&mut`; two passes never share ids.

use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct IdRegistry {
    used: HashSet<String>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<prefix>_<sanitized raw>`, e.g. `E_users`, `A_users_id`.
    pub fn node_id(&mut self, prefix: &str, raw: &str) -> String {
        let stem = sanitize(raw, "N");
        self.claim(format!("{}_{}", prefix, stem))
    }

    /// Bare entity name for crow's-foot diagrams.
    pub fn entity_name(&mut self, raw: &str) -> String {
        self.claim(sanitize(raw, "T"))
    }

    /// Reserve `base`, appending `_2`, `_3`, ... until it is unused.
    fn claim(&mut self, base: String) -> String {
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.used.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}_{}", base, suffix);
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

/// Replace everything outside `[A-Za-z0-9_]` with `_`. An empty result
/// becomes `fallback`; a leading digit gets a `<fallback>_` prefix.
pub fn sanitize(raw: &str, fallback: &str) -> String {
    let safe: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if safe.is_empty() {
        fallback.to_string()
    } else if safe.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{}_{}", fallback, safe)
    } else {
        safe
    }
}
