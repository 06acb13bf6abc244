use std::fmt;
use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;
use url::ParseError;

/// Which component of a frame header could not be read from the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPart {
    Base,
    Extension,
    Mask,
}

impl fmt::Display for HeaderPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeaderPart::Base => "header",
            HeaderPart::Extension => "extension",
            HeaderPart::Mask => "mask",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    // Connection Errors
    #[error("Cannot connect to socket `{host}`: {source}")]
    ConnectionError {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("Connection already closed")]
    ConnectionClosed,

    // Handshake Errors
    #[error("Unable to send upgrade header to websocket server `{host}`: {source}")]
    UpgradeRequestError {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("Server did not accept to upgrade connection to websocket (response was `{0}`)")]
    UpgradeResponseError(String),

    #[error("Sever didn't send a valid Sec-WebSocket-Accept key")]
    InvalidAcceptKey,

    // Framing Errors
    #[error("Cannot read {part} headers from websocket: {source}")]
    HeaderReadError {
        part: HeaderPart,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read frame data, got {received} of {expected} bytes: {source}")]
    PayloadReadError {
        expected: usize,
        received: usize,
        #[source]
        source: io::Error,
    },

    #[error("Frame payload of {0} bytes exceeds max_frame_size")]
    MaxFrameSize(usize),

    #[error("Frame payload length {0} is not supported, it must stay below 4 GiB")]
    UnsupportedPayloadLength(u64),

    #[error("Unable to write frame to websocket: {source}")]
    FrameWriteError {
        #[source]
        source: io::Error,
    },

    // General Errors
    #[error("{source}")]
    FromUtf8Error {
        #[from]
        source: FromUtf8Error,
    },

    #[error("{source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },

    // URL Errors
    #[error("{source}")]
    URLParseError {
        #[from]
        source: ParseError,
    },

    #[error("Invalid scheme in WebSocket URL")]
    InvalidSchemeURL,

    #[error("URL has no host")]
    URLNoHost,
}
