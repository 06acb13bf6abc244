//! Straightforward async Websockets client for Rust!
//!
//! This library implements the client side of the
//! [WebSocket Protocol RFC](https://datatracker.ietf.org/doc/html/rfc6455) over any duplex
//! byte stream, a tokio TcpStream being the usual one. It performs the upgrade handshake,
//! then writes masked frames, reads frames back, reassembles fragmented messages, answers
//! pings and handles close frames.
//!
//! Every failure goes through a single [`handler::ErrorHandler`], configured once per client,
//! which decides whether the failure reaches the caller or only gets logged.
//!
pub mod config;
pub mod connection;
pub mod error;
pub mod frame;
pub mod handler;
pub mod handshake;
pub mod read;
pub mod request;
mod utils;
pub mod write;
