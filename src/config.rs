//! Server configuration.

use crate::scorer::Variant;

/// Port used when neither `--port` nor `PORT` is given.
pub const DEFAULT_PORT: u16 = 10000;

/// Largest accepted request body; base64 inflates images by a third.
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Options controlling the HTTP service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port to bind.
    pub port: u16,
    /// Heuristic check set used for every request.
    pub variant: Variant,
    /// Request body limit in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            variant: Variant::Minimal,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// `host:port` string to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_all_interfaces() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:10000");
        assert_eq!(config.variant, Variant::Minimal);
    }

    #[test]
    fn bind_addr_uses_overrides() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..ServerConfig::default()
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }
}
