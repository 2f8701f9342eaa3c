//! The request multiplexer.
//!
//! One segment trie per HTTP method, one set of tries per subdomain party,
//! one error table. All of it is built during registration and only read
//! while serving, so a `Mux` behind an `Arc` serves any number of concurrent
//! requests without locks.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use http::StatusCode;
use tracing::{debug, error, trace};

use crate::config::Config;
use crate::context::Context;
use crate::controller::Controller;
use crate::error::RouteError;
use crate::error_handlers::ErrorHandlers;
use crate::handler::{BoxedHandler, Chain, Handler};
use crate::method::Method;
use crate::params::Params;
use crate::party::Party;
use crate::request::Request;
use crate::response::Response;
use crate::subdomain::Subdomains;
use crate::tree::{Match, Node};

/// One trie per method.
#[derive(Default)]
pub(crate) struct Routes {
    trees: HashMap<Method, Node<Chain>>,
}

impl Routes {
    pub(crate) fn insert(&mut self, method: Method, path: &str, chain: Chain) -> Result<(), RouteError> {
        self.trees.entry(method).or_default().insert(path, chain)
    }

    fn at(&self, method: Method, path: &str) -> Option<Match<'_, Chain>> {
        self.trees.get(&method)?.at(path)
    }
}

/// The outcome of routing one request.
pub struct Dispatch {
    /// The matched route's chain, or the `404` error chain.
    pub chain: Chain,
    /// Path parameters, empty when nothing matched.
    pub params: Params,
    /// `false` when no route matched and `chain` is the `404` chain.
    pub matched: bool,
}

/// The application router.
///
/// Register routes, parties and error handlers first, then hand the mux to
/// [`Server::serve`](crate::Server::serve) or call [`Mux::serve`] directly.
///
/// ```rust
/// use trellis::{Context, Method, Mux, Request, StatusCode};
///
/// let mut mux = Mux::new();
/// mux.get("/users/:id", |ctx: &mut Context| {
///     let id = ctx.param("id").unwrap_or_default().to_owned();
///     ctx.write_str(&id);
/// }).unwrap();
///
/// let res = mux.serve(Request::new(Method::Get, "localhost", "/users/42"));
/// assert_eq!(res.status(), StatusCode::OK);
/// assert_eq!(res.text(), "42");
///
/// let res = mux.serve(Request::new(Method::Get, "localhost", "/nope"));
/// assert_eq!(res.status(), StatusCode::NOT_FOUND);
/// ```
pub struct Mux {
    config: Config,
    routes: Routes,
    // `None` until a subdomain party registers a route.
    subdomains: Option<Box<Subdomains>>,
    errors: ErrorHandlers,
}

impl Mux {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            routes: Routes::default(),
            subdomains: None,
            errors: ErrorHandlers::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Opens a route group.
    ///
    /// `"/admin"` scopes a path prefix. A prefix ending in `.` scopes a
    /// subdomain instead: `"api."` for one subdomain, `"*."` for any.
    pub fn party(&mut self, prefix: &str) -> Party<'_> {
        Party::new(self, prefix)
    }

    /// Registers a single handler for a method + path pair.
    pub fn handle(&mut self, method: Method, path: &str, handler: impl Handler) -> Result<(), RouteError> {
        Party::root(self).handle(method, path, handler)
    }

    /// Registers a chain: every unit but the last is middleware.
    ///
    /// Fails with [`RouteError::EmptyChain`] when `units` is empty.
    pub fn handle_chain(
        &mut self,
        method: Method,
        path: &str,
        units: Vec<BoxedHandler>,
    ) -> Result<(), RouteError> {
        Party::root(self).handle_chain(method, path, units)
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
        Party::root(self).any(path, handler)
    }

    /// Routes a controller's actions under `path`. See [`Controller`].
    pub fn controller(&mut self, path: &str, controller: impl Controller) -> Result<(), RouteError> {
        Party::root(self).controller(path, controller)
    }

    /// Registers the handler rendering `status`.
    pub fn on_error(&mut self, status: StatusCode, handler: impl Handler) {
        self.register_error(status, vec![handler.boxed()]);
    }

    /// Registers the chain rendering `status`, replacing any earlier one.
    pub fn register_error(&mut self, status: StatusCode, units: Vec<BoxedHandler>) {
        debug!(status = status.as_u16(), units = units.len(), "error handler registered");
        self.errors.register(status, units.into());
    }

    /// The chain that renders `status`. Never fails.
    pub fn error_chain(&self, status: StatusCode) -> Chain {
        self.errors.resolve(status)
    }

    pub(crate) fn insert(
        &mut self,
        subdomain: Option<&str>,
        method: Method,
        path: &str,
        chain: Chain,
    ) -> Result<(), RouteError> {
        let routes = match subdomain {
            Some(pattern) => self
                .subdomains
                .get_or_insert_with(Box::default)
                .routes_mut(pattern),
            None => &mut self.routes,
        };
        routes.insert(method, path, chain)?;
        debug!(%method, path, subdomain = subdomain.unwrap_or(""), "route registered");
        Ok(())
    }

    // ── Serving ───────────────────────────────────────────────────────────

    /// Resolves a request to a chain without running it.
    pub fn dispatch(&self, req: &Request) -> Dispatch {
        match self.lookup(req) {
            Some((chain, params)) => Dispatch { chain, params, matched: true },
            None => Dispatch {
                chain: self.errors.resolve(StatusCode::NOT_FOUND),
                params: Params::new(),
                matched: false,
            },
        }
    }

    fn lookup(&self, req: &Request) -> Option<(Chain, Params)> {
        let resolved = match (&self.subdomains, self.config.host()) {
            (Some(subdomains), Some(base)) => subdomains.resolve(req.host(), base),
            _ => None,
        };
        let (routes, captured) = match resolved {
            Some(resolved) => (resolved.routes, resolved.captured),
            None => (&self.routes, None),
        };

        let matched = routes.at(req.method(), req.path())?;
        let chain = matched.value.clone();
        let params = match captured {
            Some(subdomain) => std::iter::once((self.config.subdomain_param(), subdomain))
                .chain(matched.params.iter())
                .collect(),
            None => matched.params,
        };
        Some((chain, params))
    }

    /// Routes and runs one request, always producing exactly one response.
    ///
    /// Unmatched requests run the `404` chain. A unit that calls
    /// [`Context::emit_error`] or panics hands the request to the chain for
    /// that status (`500` for panics).
    pub fn serve(&self, req: Request) -> Response {
        let Dispatch { chain, params, matched } = self.dispatch(&req);
        trace!(method = %req.method(), host = req.host(), path = req.path(), matched, "dispatch");

        let mut ctx = Context::new(req, params);
        if !matched {
            self.run_error_chain(&mut ctx, StatusCode::NOT_FOUND, chain);
            return ctx.into_response();
        }

        if let Err(payload) = run_guarded(&mut ctx, chain) {
            error!(path = ctx.path(), "handler panicked: {}", panic_message(&*payload));
            ctx.emit_error(StatusCode::INTERNAL_SERVER_ERROR);
        }

        if let Some(status) = ctx.take_error() {
            let chain = self.errors.resolve(status);
            self.run_error_chain(&mut ctx, status, chain);
        }
        ctx.into_response()
    }

    fn run_error_chain(&self, ctx: &mut Context, status: StatusCode, chain: Chain) {
        ctx.reset_response(status);
        if let Err(payload) = run_guarded(ctx, chain) {
            error!(status = status.as_u16(), "error handler panicked: {}", panic_message(&*payload));
            ctx.reset_response(StatusCode::INTERNAL_SERVER_ERROR);
            if let Err(payload) = run_guarded(ctx, self.errors.fallback()) {
                error!("fallback error handler panicked: {}", panic_message(&*payload));
            }
        }
        if let Some(status) = ctx.take_error() {
            ctx.set_status(status);
        }
    }
}

impl Default for Mux {
    fn default() -> Self {
        Self::new()
    }
}

fn run_guarded(ctx: &mut Context, chain: Chain) -> Result<(), Box<dyn Any + Send>> {
    panic::catch_unwind(AssertUnwindSafe(|| ctx.run(chain)))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else {
        "non-string panic payload"
    }
}
