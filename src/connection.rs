use crate::config::ClientConfig;
use crate::error::Error;
use crate::frame::OpCode;
use crate::handler::ErrorHandler;
use crate::read::FrameDecoder;
use crate::request::HeaderSet;
use crate::write::{send_pong_frame, write_frame};
use log::{debug, trace, warn};
use serde::Serialize;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};

/// A client connection after a successful upgrade handshake.
///
/// The connection is the only owner of the stream. Once a close frame is received or sent,
/// the stream is shut down and dropped, and every further read or write reports
/// [`Error::ConnectionClosed`] through the configured error handler.
pub struct WSConnection<S> {
    stream: Option<BufStream<S>>,
    headers: HeaderSet,
    handshake_response: Vec<u8>,
    decoder: FrameDecoder,
    error_handler: Arc<dyn ErrorHandler>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> WSConnection<S> {
    pub(crate) fn new(
        stream: Option<BufStream<S>>,
        headers: HeaderSet,
        handshake_response: Vec<u8>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            stream,
            headers,
            handshake_response,
            decoder: FrameDecoder::new(config.max_frame_size, config.read_timeout),
            error_handler: config.error_handler.clone(),
        }
    }

    /// Headers that were sent in the upgrade request.
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// The raw upgrade response, kept around for diagnostics.
    pub fn handshake_response(&self) -> &[u8] {
        &self.handshake_response
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    /// Sends `payload` as a single binary frame and returns the number of bytes written.
    /// The caller controls fragmentation through `final_fragment`.
    pub async fn write(&mut self, payload: &[u8], final_fragment: bool) -> Result<usize, Error> {
        self.write_frame(OpCode::Binary, payload, final_fragment).await
    }

    pub async fn write_text(&mut self, text: &str) -> Result<usize, Error> {
        self.write_frame(OpCode::Text, text.as_bytes(), true).await
    }

    // Serialized data goes out as a binary frame
    pub async fn write_json<T: Serialize + ?Sized>(&mut self, data: &T) -> Result<usize, Error> {
        match serde_json::to_vec(data) {
            Ok(payload) => self.write(&payload, true).await,
            Err(err) => {
                self.error_handler.handle(err.into())?;
                Ok(0)
            }
        }
    }

    pub async fn write_frame(
        &mut self,
        opcode: OpCode,
        payload: &[u8],
        final_fragment: bool,
    ) -> Result<usize, Error> {
        let Some(stream) = self.stream.as_mut() else {
            self.error_handler.handle(Error::ConnectionClosed)?;
            return Ok(0);
        };

        let result = write_frame(stream, opcode, payload, final_fragment).await;

        // Once a close frame is on its way the connection is done, even if the write failed
        if opcode == OpCode::Close {
            self.shutdown().await;
        }

        match result {
            Ok(written) => Ok(written),
            Err(err) => {
                self.error_handler.handle(err)?;
                Ok(0)
            }
        }
    }

    /// Sends a close frame and shuts the stream down.
    pub async fn close(&mut self) -> Result<(), Error> {
        debug!("closing connection");
        self.write_frame(OpCode::Close, &[], true).await?;
        Ok(())
    }

    /// Reads frames until a whole message is available and returns its payload.
    ///
    /// Fragmented messages are put back together here, pings are answered inline and a
    /// close frame closes the connection. Pong frames and unknown opcodes are skipped.
    /// If the error handler swallows a failure, the bytes gathered so far are returned.
    pub async fn read(&mut self) -> Result<Vec<u8>, Error> {
        let mut message = Vec::new();

        loop {
            let Some(stream) = self.stream.as_mut() else {
                self.error_handler.handle(Error::ConnectionClosed)?;
                return Ok(message);
            };

            let frame = match self.decoder.read_frame(stream).await {
                Ok(frame) => frame,
                Err(err) => {
                    // The rejected payload is still sitting in the stream, nothing after it
                    // can be decoded
                    if matches!(
                        err,
                        Error::MaxFrameSize(_) | Error::UnsupportedPayloadLength(_)
                    ) {
                        self.shutdown().await;
                    }
                    self.error_handler.handle(err)?;
                    return Ok(message);
                }
            };

            match frame.opcode {
                OpCode::Ping => {
                    // A ping never ends the message, whatever its final bit says
                    if let Err(err) = send_pong_frame(stream).await {
                        self.error_handler.handle(err)?;
                    }
                }
                OpCode::Close => {
                    debug!("received close frame, closing connection");
                    self.shutdown().await;
                    if frame.final_fragment {
                        return Ok(message);
                    }
                }
                opcode if opcode.is_data() => {
                    message.extend_from_slice(&frame.payload);
                    if frame.final_fragment {
                        return Ok(message);
                    }
                }
                OpCode::Pong => trace!("ignoring pong frame"),
                opcode => warn!("ignoring frame with opcode {:?}", opcode),
            }
        }
    }

    pub async fn read_text(&mut self) -> Result<String, Error> {
        let message = self.read().await?;
        match String::from_utf8(message) {
            Ok(text) => Ok(text),
            Err(err) => {
                self.error_handler.handle(err.into())?;
                Ok(String::new())
            }
        }
    }

    // Dropping the stream is what closes it, a failing shutdown changes nothing about that
    async fn shutdown(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(err) = stream.shutdown().await {
                debug!("error while shutting down stream: {}", err);
            }
        }
    }
}
