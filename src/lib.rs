//! # trellis
//!
//! An HTTP request router: method + host + path in, handler chain and
//! parameters out.
//!
//! ## The contract
//!
//! Registration and serving are two phases. Every route, party and error
//! handler is registered first; after that the mux is read-only and can be
//! shared by any number of concurrent requests without locks. Nothing is
//! registered while serving.
//!
//! - Segment-trie routing, one trie per method: static segments beat
//!   `:named` segments, which beat a trailing `*wildcard`
//! - Parties: path prefixes, subdomains (`api.`, `*.`) and shared middleware
//! - Middleware chains with [`Context::next`] and [`Context::emit_error`]
//! - Error chains per status code; panics in handlers become `500`
//! - Async I/O: tokio + hyper, graceful shutdown on SIGTERM / Ctrl-C
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use trellis::{Context, Mux, Server, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), trellis::Error> {
//!     let mut mux = Mux::new();
//!     mux.get("/users/:id", get_user)?;
//!     mux.get("/files/*path", get_file)?;
//!     mux.on_error(StatusCode::NOT_FOUND, |ctx: &mut Context| ctx.write_str("nothing here"));
//!
//!     Server::bind("0.0.0.0:3000")?.serve(mux).await
//! }
//!
//! fn get_user(ctx: &mut Context) {
//!     let id = ctx.param("id").unwrap_or_default().to_owned();
//!     ctx.write_str(&format!("user {id}"));
//! }
//!
//! fn get_file(ctx: &mut Context) {
//!     // `/files/a/b.txt` binds path = "/a/b.txt"
//!     let path = ctx.param("path").unwrap_or_default().to_owned();
//!     ctx.write_str(&path);
//! }
//! ```

mod config;
mod context;
mod controller;
mod error;
mod error_handlers;
mod handler;
mod method;
mod mux;
mod params;
mod party;
mod request;
mod response;
mod server;
mod subdomain;
mod tree;

pub mod middleware;

pub use config::Config;
pub use context::Context;
pub use controller::{Action, Controller, ID_PARAM};
pub use error::{Error, RouteError};
pub use handler::{BoxedHandler, Chain, Handler};
pub use method::Method;
pub use mux::{Dispatch, Mux};
pub use params::{Param, Params, ParamsIter};
pub use party::Party;
pub use request::Request;
pub use response::Response;
pub use server::Server;
pub use tree::{Match, Node};

pub use http::StatusCode;
