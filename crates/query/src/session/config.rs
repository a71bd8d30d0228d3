use std::time::Duration;

use crate::net::protocol::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_QUERY_PORT};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: String,
    pub tcp_port: u16,
    /// Virtual server to select right after the handshake.
    pub udp_port: Option<u16>,
    pub connect_timeout: Duration,
    /// `None` blocks until the server answers.
    pub read_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            tcp_port: DEFAULT_QUERY_PORT,
            udp_port: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: None,
        }
    }
}
