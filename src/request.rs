//! Incoming request descriptor.

use crate::method::Method;

/// A decoded request, as handed to the mux by the transport.
///
/// `path` is already percent-decoded. `raw_query` is the text after `?`,
/// still encoded; it is parsed on demand by [`Context::url_params`].
///
/// [`Context::url_params`]: crate::Context::url_params
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) host: String,
    pub(crate) path: String,
    pub(crate) raw_query: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
}

impl Request {
    pub fn new(method: Method, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            host: host.into(),
            path: path.into(),
            raw_query: String::new(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Sets the raw query string (without the leading `?`).
    pub fn with_query(mut self, raw_query: impl Into<String>) -> Self {
        self.raw_query = raw_query.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn host(&self) -> &str { &self.host }
    pub fn path(&self) -> &str { &self.path }
    pub fn raw_query(&self) -> &str { &self.raw_query }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
