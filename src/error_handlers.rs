//! Error dispatch: status code → error chain.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;

use crate::context::Context;
use crate::handler::{BoxedHandler, Chain};

/// Maps status codes to the chains that render them.
///
/// Codes with no registered chain resolve to a built-in chain that leaves
/// the status in place and writes no body.
pub(crate) struct ErrorHandlers {
    chains: HashMap<StatusCode, Chain>,
    fallback: Chain,
}

impl ErrorHandlers {
    pub(crate) fn new() -> Self {
        let status_only: BoxedHandler = Arc::new(|_: &mut Context| {});
        Self {
            chains: HashMap::new(),
            fallback: vec![status_only].into(),
        }
    }

    pub(crate) fn register(&mut self, status: StatusCode, chain: Chain) {
        self.chains.insert(status, chain);
    }

    /// Never fails; unknown codes get the fallback chain.
    pub(crate) fn resolve(&self, status: StatusCode) -> Chain {
        self.chains
            .get(&status)
            .unwrap_or(&self.fallback)
            .clone()
    }

    pub(crate) fn fallback(&self) -> Chain {
        self.fallback.clone()
    }
}
