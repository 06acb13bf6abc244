use crate::handler::{ErrorHandler, ThrowHandler};
use crate::request::HeaderSet;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long establishing the TCP connection may take.
    pub connect_timeout: Duration,
    /// Upper bound for every single read on the stream, a read that takes longer fails
    /// like a short read would.
    pub read_timeout: Option<Duration>,
    pub max_frame_size: Option<usize>,
    /// Checks Sec-WebSocket-Accept against the key that was sent, instead of only
    /// looking for the header name.
    pub verify_accept_key: bool,
    /// Headers merged on top of the default upgrade request headers.
    pub extra_headers: HeaderSet,
    pub error_handler: Arc<dyn ErrorHandler>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Some(Duration::from_secs(10)),
            max_frame_size: Some(16 << 20),
            verify_accept_key: false,
            extra_headers: HeaderSet::default(),
            error_handler: Arc::new(ThrowHandler),
        }
    }
}
