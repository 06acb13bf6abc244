use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use sha1::{Digest, Sha1};
use uuid::Uuid;

pub(crate) const UUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

pub(crate) fn generate_websocket_accept_value(key: &str) -> String {
    let mut sha1 = Sha1::new();
    sha1.update(key.as_bytes());
    sha1.update(UUID.as_bytes());
    BASE64_STANDARD.encode(sha1.finalize())
}

// A time-ordered v7 UUID never repeats across connections, and its 16 bytes are exactly
// the nonce size RFC 6455 asks for
pub(crate) fn generate_websocket_key() -> String {
    BASE64_STANDARD.encode(Uuid::now_v7().as_bytes())
}
