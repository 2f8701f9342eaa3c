//! Route groups.
//!
//! A party only exists while routes are being registered. It joins its
//! prefix onto every path, prepends its middleware onto every chain, and
//! points the insert at its subdomain's trees. Nothing of it is left at
//! request time.

use std::sync::Arc;

use tracing::warn;

use crate::controller::{Controller, ControllerAction, ID_PARAM};
use crate::error::RouteError;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::mux::Mux;
use crate::subdomain::WILDCARD;

/// A group of routes sharing a path prefix, a subdomain, and middleware.
///
/// ```rust
/// use trellis::{Context, Method, Mux, Request};
///
/// let mut mux = Mux::new();
/// {
///     let mut admin = mux.party("/admin");
///     admin.middleware(|ctx: &mut Context| {
///         ctx.set("admin", true);
///         ctx.next();
///     });
///     admin.get("/stats", |ctx: &mut Context| {
///         let admin = ctx.get::<bool>("admin").copied().unwrap_or(false);
///         ctx.write_str(if admin { "stats" } else { "denied" });
///     }).unwrap();
/// }
///
/// let res = mux.serve(Request::new(Method::Get, "localhost", "/admin/stats"));
/// assert_eq!(res.text(), "stats");
/// ```
pub struct Party<'m> {
    mux: &'m mut Mux,
    prefix: String,
    subdomain: Option<String>,
    middleware: Vec<BoxedHandler>,
}

impl<'m> Party<'m> {
    pub(crate) fn root(mux: &'m mut Mux) -> Self {
        Self {
            mux,
            prefix: String::new(),
            subdomain: None,
            middleware: Vec::new(),
        }
    }

    pub(crate) fn new(mux: &'m mut Mux, prefix: &str) -> Self {
        let mut party = Self::root(mux);
        party.scope(prefix);
        party
    }

    // A trailing `.` without a leading `/` scopes a subdomain; anything else
    // is a path prefix.
    fn scope(&mut self, prefix: &str) {
        if prefix.ends_with('.') && !prefix.starts_with('/') {
            if self.mux.config().host().is_none() {
                warn!(subdomain = prefix, "subdomain party declared without a base host; its routes are unreachable");
            }
            let outer = self.subdomain.take().unwrap_or_default();
            self.subdomain = Some(format!("{prefix}{outer}"));
        } else {
            self.prefix = join(&self.prefix, prefix);
        }
    }

    /// Opens a nested party that inherits this one's prefix, subdomain and
    /// middleware.
    pub fn party(&mut self, prefix: &str) -> Party<'_> {
        let mut party = Party {
            mux: &mut *self.mux,
            prefix: self.prefix.clone(),
            subdomain: self.subdomain.clone(),
            middleware: self.middleware.clone(),
        };
        party.scope(prefix);
        party
    }

    /// Appends middleware run before every route registered afterwards.
    pub fn middleware(&mut self, unit: impl Handler) -> &mut Self {
        self.middleware.push(unit.boxed());
        self
    }

    pub fn handle(&mut self, method: Method, path: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.handle_chain(method, path, vec![handler.boxed()])
    }

    /// Registers `units` behind this party's middleware.
    ///
    /// The last unit is the terminal handler, so `units` must not be empty.
    pub fn handle_chain(
        &mut self,
        method: Method,
        path: &str,
        units: Vec<BoxedHandler>,
    ) -> Result<(), RouteError> {
        let path = join(&self.prefix, path);
        if units.is_empty() {
            return Err(RouteError::EmptyChain { path });
        }
        let unreachable = self.subdomain.as_deref().filter(|s| s.contains('*') && *s != WILDCARD);
        if let Some(subdomain) = unreachable {
            return Err(RouteError::NestedWildcardSubdomain {
                path,
                subdomain: subdomain.to_owned(),
            });
        }

        let chain: Vec<BoxedHandler> = self.middleware.iter().cloned().chain(units).collect();
        self.mux.insert(self.subdomain.as_deref(), method, &path, chain.into())
    }

    pub fn get(&mut self, path: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.handle(Method::Get, path, handler)
    }

    pub fn post(&mut self, path: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.handle(Method::Post, path, handler)
    }

    pub fn put(&mut self, path: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.handle(Method::Put, path, handler)
    }

    pub fn delete(&mut self, path: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.handle(Method::Delete, path, handler)
    }

    pub fn head(&mut self, path: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.handle(Method::Head, path, handler)
    }

    pub fn options(&mut self, path: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.handle(Method::Options, path, handler)
    }

    pub fn connect(&mut self, path: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.handle(Method::Connect, path, handler)
    }

    pub fn patch(&mut self, path: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.handle(Method::Patch, path, handler)
    }

    pub fn trace(&mut self, path: &str, handler: impl Handler) -> Result<(), RouteError> {
        self.handle(Method::Trace, path, handler)
    }

    /// Registers `handler` for all nine methods.
    pub fn any(&mut self, path: &str, handler: impl Handler) -> Result<(), RouteError> {
        let handler = handler.boxed();
        for method in Method::ALL {
            self.handle_chain(method, path, vec![Arc::clone(&handler)])?;
        }
        Ok(())
    }

    /// Routes the actions `controller` declares under `path`.
    ///
    /// Plain actions are registered on `path`, `*By` actions on
    /// `path/:param1`.
    pub fn controller<C: Controller>(&mut self, path: &str, controller: C) -> Result<(), RouteError> {
        let controller = Arc::new(controller);
        let by_path = format!("{}/:{ID_PARAM}", path.trim_end_matches('/'));

        for &action in controller.actions() {
            let route = if action.takes_id() { by_path.as_str() } else { path };
            let unit = ControllerAction::new(Arc::clone(&controller), action);
            self.handle(action.method(), route, unit)?;
        }
        Ok(())
    }
}

// `/party1` + `/path1` → `/party1/path1`; a trailing `/` on the prefix is
// folded into the path's leading one.
fn join(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let mut joined = String::with_capacity(prefix.len() + path.len());
    joined.push_str(prefix);
    joined.push_str(path);
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_prefixes() {
        assert_eq!(join("", "/path1"), "/path1");
        assert_eq!(join("/party1", "/path1"), "/party1/path1");
        assert_eq!(join("/party1/", "/"), "/party1/");
        assert_eq!(join("/", "/x"), "/x");
    }

    #[test]
    fn subdomain_scopes_nest_outward() {
        let mut mux = Mux::new();
        let mut api = Party::new(&mut mux, "api.");
        assert_eq!(api.subdomain.as_deref(), Some("api."));
        assert_eq!(api.prefix, "");

        let v1 = api.party("v1.");
        assert_eq!(v1.subdomain.as_deref(), Some("v1.api."));
    }

    #[test]
    fn wildcard_nested_in_literal_subdomain_is_rejected() {
        let mut mux = Mux::with_config(crate::Config::default().with_host("localhost"));
        let mut api = Party::new(&mut mux, "api.");
        let mut any = api.party("*.");
        assert_eq!(any.subdomain.as_deref(), Some("*.api."));

        let err = any.get("/", |_: &mut crate::Context| {}).unwrap_err();
        assert_eq!(
            err,
            RouteError::NestedWildcardSubdomain { path: "/".into(), subdomain: "*.api.".into() }
        );
    }

    #[test]
    fn empty_chain_is_rejected() {
        let mut mux = Mux::new();
        let mut party = Party::new(&mut mux, "/v1");
        party.middleware(|ctx: &mut crate::Context| ctx.next());

        assert_eq!(
            party.handle_chain(Method::Get, "/x", Vec::new()),
            Err(RouteError::EmptyChain { path: "/v1/x".into() })
        );
    }

    #[test]
    fn nested_parties_inherit_middleware() {
        let mut mux = Mux::new();
        let mut outer = Party::new(&mut mux, "/a");
        outer.middleware(|ctx: &mut crate::Context| ctx.next());

        let mut inner = outer.party("/b");
        inner.middleware(|ctx: &mut crate::Context| ctx.next());
        assert_eq!(inner.prefix, "/a/b");
        assert_eq!(inner.middleware.len(), 2);
    }
}
