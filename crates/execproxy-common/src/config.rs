use std::time::Duration;

/// Transport-agnostic proxy settings.
///
/// Constructed once at proxy startup on either side of the wire, optionally
/// replaced wholesale before the proxy starts serving or dialing, and
/// immutable thereafter for the lifetime of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Upper bound applied to every client call.
    pub default_timeout: Duration,
    /// Largest accepted request body in bytes. Enforced only by transports
    /// with unbounded message framing (the JSON-RPC server).
    pub max_request_size: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(5),
            max_request_size: 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProxyConfig::default();
        assert_eq!(config.default_timeout, Duration::from_secs(5));
        assert_eq!(config.max_request_size, 1024 * 1024);
    }
}
