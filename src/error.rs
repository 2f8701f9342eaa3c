//! Unified error types.

use std::net::AddrParseError;

use thiserror::Error;

/// Errors that can occur when registering a route.
///
/// Request-time failures are never reported this way; they are resolved
/// into an error chain (see [`Mux::on_error`](crate::Mux::on_error)).
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum RouteError {
    /// The same method and segment structure is already registered.
    #[error("route `{path}` conflicts with a previously registered route")]
    Duplicate { path: String },

    /// A wildcard segment appears before the end of a route.
    #[error("wildcard segments are only allowed at the end of a route, found in `{path}`")]
    WildcardNotLast { path: String },

    /// Two different parameter names were registered at the same position.
    #[error("parameter `{name}` in `{path}` conflicts with `{existing}` at the same position")]
    ParamConflict {
        path: String,
        name: String,
        existing: String,
    },

    /// A `:` or `*` segment has no name.
    #[error("parameters must be registered with a name, found in `{path}`")]
    UnnamedParam { path: String },

    /// Routes are absolute.
    #[error("path `{path}` must begin with '/'")]
    MissingLeadingSlash { path: String },

    /// A chain needs at least its terminal handler.
    #[error("route `{path}` was registered without a handler")]
    EmptyChain { path: String },

    /// `*.` only matches as the whole subdomain; nested under or around a
    /// literal subdomain it could never be reached.
    #[error("subdomain `{subdomain}` of route `{path}` mixes `*.` with other labels")]
    NestedWildcardSubdomain { path: String, subdomain: String },
}

/// The error type returned by the crate's fallible operations.
///
/// Application-level errors (404, 500, etc.) are expressed as error chains,
/// not as `Error`s. This type surfaces registration and infrastructure
/// failures: an invalid route, binding to a port, or accepting a connection.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address: {0}")]
    Addr(#[from] AddrParseError),
}
