//! Outgoing response produced by one pass through the mux.
//!
//! Handlers never build a [`Response`] directly; they write through the
//! [`Context`](crate::Context) sink and the mux hands back the result.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;

/// An outgoing HTTP response.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Response {
    pub(crate) status: StatusCode,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
}

impl Response {
    pub(crate) fn new() -> Self {
        Self::with_status(StatusCode::OK)
    }

    pub(crate) fn with_status(status: StatusCode) -> Self {
        Self { status, headers: Vec::new(), body: Vec::new() }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as UTF-8 text, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    // Replaces a header, keeping names unique.
    pub(crate) fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    // Drops whatever the original chain wrote before an error chain runs.
    pub(crate) fn reset(&mut self, status: StatusCode) {
        self.status = status;
        self.headers.clear();
        self.body.clear();
    }

    /// Converts into a hyper-compatible response.
    ///
    /// Headers hyper rejects are skipped.
    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = self.status;

        let headers = res.headers_mut();
        for (name, value) in &self.headers {
            let (Ok(name), Ok(value)) = (
                http::HeaderName::from_bytes(name.as_bytes()),
                http::HeaderValue::from_str(value),
            ) else {
                tracing::warn!(header = %name, "dropping invalid response header");
                continue;
            };
            headers.append(name, value);
        }
        res
    }
}
