//! Per-request context handed to every unit of a chain.

use std::any::Any;
use std::cell::OnceCell;
use std::collections::HashMap;

use http::StatusCode;

use crate::handler::Chain;
use crate::method::Method;
use crate::params::{Params, parse_query};
use crate::request::Request;
use crate::response::Response;

/// The state one request carries through its handler chain.
///
/// A context is created fresh for every request and dropped when the
/// response is produced. Nothing in it is shared with other requests.
pub struct Context {
    request: Request,
    params: Params,
    url_params: OnceCell<Params>,
    form: OnceCell<Params>,
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
    response: Response,
    chain: Chain,
    pos: usize,
    error: Option<StatusCode>,
}

impl Context {
    pub(crate) fn new(request: Request, params: Params) -> Self {
        Self {
            request,
            params,
            url_params: OnceCell::new(),
            form: OnceCell::new(),
            values: HashMap::new(),
            response: Response::new(),
            chain: Vec::new().into(),
            pos: 0,
            error: None,
        }
    }

    // ── Chain control ─────────────────────────────────────────────────────

    // Runs `chain` from its first unit.
    pub(crate) fn run(&mut self, chain: Chain) {
        self.chain = chain;
        self.pos = 0;
        if let Some(unit) = self.chain.first().cloned() {
            unit.serve(self);
        }
    }

    /// Runs the next unit of the chain.
    ///
    /// A unit that never calls `next` stops the chain there. Does nothing
    /// once an error status has been emitted.
    pub fn next(&mut self) {
        if self.error.is_some() {
            return;
        }
        self.pos += 1;
        if let Some(unit) = self.chain.get(self.pos).cloned() {
            unit.serve(self);
        }
    }

    /// Aborts the rest of the chain and hands the request to the error chain
    /// registered for `status`.
    ///
    /// Whatever the chain has written so far is discarded. Inside an error
    /// chain this only sets the status.
    pub fn emit_error(&mut self, status: StatusCode) {
        self.error = Some(status);
        self.pos = self.chain.len();
    }

    /// Returns `true` once [`emit_error`](Self::emit_error) has been called.
    pub fn is_stopped(&self) -> bool {
        self.error.is_some()
    }

    pub(crate) fn take_error(&mut self) -> Option<StatusCode> {
        self.error.take()
    }

    // ── Request ───────────────────────────────────────────────────────────

    pub fn method(&self) -> Method { self.request.method() }
    pub fn host(&self) -> &str { self.request.host() }
    pub fn path(&self) -> &str { self.request.path() }
    pub fn body(&self) -> &[u8] { self.request.body() }
    pub fn header(&self, name: &str) -> Option<&str> { self.request.header(name) }
    pub fn request(&self) -> &Request { &self.request }

    /// Returns a path parameter captured by the matched route.
    ///
    /// For a route `/users/:id`, `ctx.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// All path parameters, in capture order.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns a query-string parameter.
    pub fn url_param(&self, name: &str) -> Option<&str> {
        self.url_params().get(name)
    }

    /// All query-string parameters, in query order.
    ///
    /// The raw query is parsed on first access and cached for the rest of
    /// the request.
    pub fn url_params(&self) -> &Params {
        self.url_params
            .get_or_init(|| parse_query(&self.request.raw_query))
    }

    /// Returns a field of an `application/x-www-form-urlencoded` body.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .get_or_init(|| {
                let is_form = self
                    .header("content-type")
                    .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
                if is_form {
                    url::form_urlencoded::parse(self.request.body()).collect()
                } else {
                    Params::new()
                }
            })
            .get(name)
    }

    // ── Request-scoped values ─────────────────────────────────────────────

    /// Stores a value for later units of this request's chain.
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// Returns a value stored by an earlier unit, if it has type `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref()
    }

    // ── Response sink ─────────────────────────────────────────────────────

    pub fn status(&self) -> StatusCode {
        self.response.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.response.status = status;
    }

    pub fn set_header(&mut self, name: &str, value: &str) {
        self.response.set_header(name, value);
    }

    /// Appends raw bytes to the response body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.response.body.extend_from_slice(bytes);
    }

    pub fn write_str(&mut self, s: &str) {
        self.write(s.as_bytes());
    }

    /// Sets the status and a `text/plain` body, replacing anything written.
    pub fn text(&mut self, status: StatusCode, body: impl Into<String>) {
        self.response.status = status;
        self.response.body = body.into().into_bytes();
        self.set_header("content-type", "text/plain; charset=utf-8");
    }

    pub(crate) fn reset_response(&mut self, status: StatusCode) {
        self.response.reset(status);
    }

    pub(crate) fn into_response(self) -> Response {
        self.response
    }
}
