//! Server configuration.

use std::net::SocketAddr;

/// Service name reported by the health endpoint.
pub const DEFAULT_SERVICE_NAME: &str = "OurStory AI Backend";

/// Server configuration.
///
/// Built once at process entry and shared immutably with every handler.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Origins accepted by the allow-list check. `"*"` allows any origin.
    pub allowed_origins: Vec<String>,

    /// Name reported by the health endpoint.
    pub service_name: String,

    /// Signing secret reserved for future authentication. Accepted from the
    /// environment but not enforced anywhere yet.
    pub signing_secret: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8787".parse().unwrap(),
            allowed_origins: vec!["*".to_string()],
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            signing_secret: None,
        }
    }
}

impl ServerConfig {
    /// Create a new server config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the origin allow-list.
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// Set the service name.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Set the reserved signing secret.
    pub fn with_signing_secret(mut self, secret: Option<String>) -> Self {
        self.signing_secret = secret;
        self
    }

    /// Check a request's `Origin` header against the allow-list.
    ///
    /// A missing header is treated as the empty string, so it only passes
    /// when the wildcard is allowed.
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        let origin = origin.unwrap_or("");
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed == origin)
    }
}
