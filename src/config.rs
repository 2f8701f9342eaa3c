//! Router configuration.

/// Immutable settings handed to [`Mux::with_config`](crate::Mux::with_config).
///
/// Nothing here is process-wide: two muxes built from different configs can
/// serve side by side in one process.
///
/// ```rust
/// use trellis::{Config, Mux};
///
/// let mux = Mux::with_config(Config::default().with_host("localhost:8080"));
/// assert_eq!(mux.config().host(), Some("localhost:8080"));
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    host: Option<String>,
    subdomain_param: String,
}

impl Config {
    /// Sets the base host, including the port if clients send one.
    ///
    /// Subdomain parties are resolved by stripping this suffix from the
    /// request host. Without it, every request is routed against the root
    /// routes.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the name of the parameter bound by a wildcard (`*.`) subdomain
    /// party. Defaults to `"subdomain"`.
    pub fn with_subdomain_param(mut self, name: impl Into<String>) -> Self {
        self.subdomain_param = name.into();
        self
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn subdomain_param(&self) -> &str {
        &self.subdomain_param
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: None,
            subdomain_param: "subdomain".to_owned(),
        }
    }
}
