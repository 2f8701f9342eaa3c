//! Subdomain registry.
//!
//! Each subdomain party gets its own set of method trees. At request time the
//! configured base host is stripped from the request host and the remaining
//! prefix (e.g. `api.`) picks the set. Host names compare ASCII
//! case-insensitively. Literal subdomains win over the
//! wildcard subdomain; a host with no registered subdomain uses the root set.

use std::collections::HashMap;

use crate::mux::Routes;

/// Marks the party that accepts any subdomain.
pub(crate) const WILDCARD: &str = "*.";

#[derive(Default)]
pub(crate) struct Subdomains {
    literal: HashMap<String, Routes>,
    wildcard: Option<Routes>,
}

/// The routes picked for a host, plus the subdomain a wildcard party captured.
pub(crate) struct Resolved<'r, 'h> {
    pub(crate) routes: &'r Routes,
    pub(crate) captured: Option<&'h str>,
}

impl Subdomains {
    /// Returns the routes for `pattern`, creating them on first use.
    pub(crate) fn routes_mut(&mut self, pattern: &str) -> &mut Routes {
        if pattern == WILDCARD {
            return self.wildcard.get_or_insert_with(Routes::default);
        }
        self.literal.entry(pattern.to_ascii_lowercase()).or_default()
    }

    /// Picks the routes for `host`, or `None` for the root routes.
    pub(crate) fn resolve<'r, 'h>(&'r self, host: &'h str, base: &str) -> Option<Resolved<'r, 'h>> {
        let prefix = subdomain_of(host, base)?;

        if let Some(routes) = self.literal.get(&prefix.to_ascii_lowercase()) {
            return Some(Resolved { routes, captured: None });
        }

        self.wildcard.as_ref().map(|routes| Resolved {
            routes,
            captured: prefix.strip_suffix('.'),
        })
    }
}

// `api.localhost:8080` with base `localhost:8080` yields `api.`.
fn subdomain_of<'h>(host: &'h str, base: &str) -> Option<&'h str> {
    let (prefix, suffix) = host.split_at_checked(host.len().checked_sub(base.len())?)?;
    if !suffix.eq_ignore_ascii_case(base) {
        return None;
    }
    (prefix.len() > 1 && prefix.ends_with('.')).then_some(prefix)
}
