use crate::error::{Error, HeaderPart};
use crate::frame::{apply_mask, Frame, OpCode};
use log::trace;
use std::io;
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::{timeout, Duration};

// Payloads are read in chunks of this size, so memory grows with the bytes that actually
// arrive rather than with the length the peer announced
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Decodes one frame at a time from a byte stream.
///
/// The decoder holds no protocol state, only the limits applied to every read.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDecoder {
    pub max_frame_size: Option<usize>,
    pub read_timeout: Option<Duration>,
}

impl FrameDecoder {
    pub fn new(max_frame_size: Option<usize>, read_timeout: Option<Duration>) -> Self {
        Self {
            max_frame_size,
            read_timeout,
        }
    }

    pub async fn read_frame<R: AsyncRead + Unpin>(&self, reader: &mut R) -> Result<Frame, Error> {
        let mut header = [0u8; 2];
        self.read_header_part(reader, &mut header, HeaderPart::Base).await?;

        // The first bit in the first byte tells us whether this is the final fragment of a message
        let final_fragment = (header[0] & 0b10000000) != 0;
        // The opcode is the last 4 bits of the first byte
        let opcode = OpCode::from(header[0] & 0b00001111);

        // The first bit of the second byte is the "Mask bit", it tells us if the payload is masked
        let masked = (header[1] & 0b10000000) != 0;

        // The next 7 bits of the second byte hold the payload length, or announce an
        // extended length of 2 bytes (126) or 8 bytes (127)
        let mut length = (header[1] & 0b01111111) as usize;

        if length == 126 {
            let mut be_bytes = [0u8; 2];
            self.read_header_part(reader, &mut be_bytes, HeaderPart::Extension).await?;
            length = u16::from_be_bytes(be_bytes) as usize;
        } else if length == 127 {
            let mut be_bytes = [0u8; 8];
            self.read_header_part(reader, &mut be_bytes, HeaderPart::Extension).await?;
            let extended = u64::from_be_bytes(be_bytes);
            // Payloads of 4 GiB or more aren't supported, the high 32 bits must be zero
            if extended > u64::from(u32::MAX) {
                return Err(Error::UnsupportedPayloadLength(extended));
            }
            length = extended as usize;
        }

        if let Some(max_frame_size) = self.max_frame_size {
            if length > max_frame_size {
                return Err(Error::MaxFrameSize(length));
            }
        }

        let mask = if masked {
            let mut mask = [0u8; 4];
            self.read_header_part(reader, &mut mask, HeaderPart::Mask).await?;
            Some(mask)
        } else {
            None
        };

        let mut payload = self.read_payload(reader, length).await?;

        if let Some(mask) = mask {
            apply_mask(&mut payload, mask);
        }

        trace!(
            "read frame opcode={:?} final={} masked={} payload_len={}",
            opcode,
            final_fragment,
            masked,
            length
        );

        Ok(Frame {
            final_fragment,
            opcode,
            masked,
            mask,
            payload,
        })
    }

    async fn read_header_part<R: AsyncRead + Unpin>(
        &self,
        reader: &mut R,
        buf: &mut [u8],
        part: HeaderPart,
    ) -> Result<(), Error> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.timed_read(reader, &mut buf[filled..]).await {
                Ok(n) => filled += n,
                Err(source) => return Err(Error::HeaderReadError { part, source }),
            }
        }
        Ok(())
    }

    // A single read may return fewer bytes than requested, so keep reading until the
    // declared length is consumed
    async fn read_payload<R: AsyncRead + Unpin>(
        &self,
        reader: &mut R,
        length: usize,
    ) -> Result<Vec<u8>, Error> {
        let mut payload = Vec::with_capacity(length.min(READ_CHUNK_SIZE));
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        while payload.len() < length {
            let wanted = (length - payload.len()).min(READ_CHUNK_SIZE);
            match self.timed_read(reader, &mut chunk[..wanted]).await {
                Ok(n) => payload.extend_from_slice(&chunk[..n]),
                Err(source) => {
                    return Err(Error::PayloadReadError {
                        expected: length,
                        received: payload.len(),
                        source,
                    })
                }
            }
        }
        Ok(payload)
    }

    // Reading zero bytes into a non-empty buffer means the peer closed the stream
    async fn timed_read<R: AsyncRead + Unpin>(
        &self,
        reader: &mut R,
        buf: &mut [u8],
    ) -> io::Result<usize> {
        let n = match self.read_timeout {
            Some(duration) => match timeout(duration, reader.read(buf)).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(io::Error::new(
                        ErrorKind::TimedOut,
                        "Timed out reading from socket",
                    ))
                }
            },
            None => reader.read(buf).await?,
        };

        if n == 0 {
            return Err(io::Error::new(ErrorKind::UnexpectedEof, "stream closed"));
        }
        Ok(n)
    }
}

// Reads a single frame without any size limit or timeout
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Frame, Error> {
    FrameDecoder::default().read_frame(reader).await
}
