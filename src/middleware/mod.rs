//! Built-in middleware.
//!
//! Middleware is an ordinary chain unit that calls [`Context::next`]. Attach
//! it per route with [`Mux::handle_chain`](crate::Mux::handle_chain) or to a
//! whole group with [`Party::middleware`](crate::Party::middleware).

use std::time::Instant;

use tracing::{info, info_span};

use crate::context::Context;
use crate::handler::Handler;

/// Per-request span with method, host and path; logs status and latency once
/// the rest of the chain returns.
///
/// ```rust
/// use trellis::{Context, Mux, middleware};
///
/// let mut mux = Mux::new();
/// let mut api = mux.party("/api");
/// api.middleware(middleware::trace());
/// api.get("/ping", |ctx: &mut Context| ctx.write_str("pong")).unwrap();
/// ```
pub fn trace() -> Trace {
    Trace
}

/// See [`trace`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Handler for Trace {
    fn serve(&self, ctx: &mut Context) {
        let span = info_span!("request", method = %ctx.method(), host = ctx.host(), path = ctx.path());
        let _guard = span.enter();
        let start = Instant::now();

        ctx.next();

        info!(
            status = ctx.status().as_u16(),
            emitted = ctx.is_stopped(),
            latency = ?start.elapsed(),
            "request served"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Method, Mux, Request};

    #[test]
    fn passes_through() {
        let mut mux = Mux::new();
        mux.handle_chain(
            Method::Get,
            "/",
            vec![trace().boxed(), (|ctx: &mut Context| ctx.write_str("ok")).boxed()],
        )
        .unwrap();

        let res = mux.serve(Request::new(Method::Get, "localhost", "/"));
        assert_eq!(res.text(), "ok");
    }
}
