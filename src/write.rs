use crate::error::Error;
use crate::frame::{apply_mask, OpCode};
use bytes::{BufMut, BytesMut};
use log::trace;
use rand::Rng;
use tokio::io::{AsyncWrite, AsyncWriteExt};

const MASK_BIT: u8 = 0b1000_0000;

// Draws the masking key as a random u32 in [1, 0x7FFFFFFF], written big-endian
pub fn generate_mask() -> [u8; 4] {
    rand::rng().random_range(1..=0x7FFF_FFFFu32).to_be_bytes()
}

/// Builds a client frame ready to be sent, the payload always goes out masked.
///
/// The first byte holds the final fragment bit and the opcode. If final_fragment is true,
/// `(final_fragment as u8) << 7` gives 10000000, which is OR'ed with the opcode, so a final
/// text frame (0x1) ends up as 10000001.
/// According to the RFC, a payload length up to 125 fits in the second byte, up to 65535 it
/// is announced with 126 followed by a 16-bit length, and anything larger with 127 followed
/// by a 64-bit length. The MSB of the second byte is always set since the payload is masked.
pub fn encode_frame(
    opcode: OpCode,
    payload: &[u8],
    final_fragment: bool,
    mask: [u8; 4],
) -> BytesMut {
    let payload_len = payload.len();
    let mut buf = BytesMut::with_capacity(payload_len + 14);

    buf.put_u8((final_fragment as u8) << 7 | opcode.as_u8());

    if payload_len < 126 {
        buf.put_u8(MASK_BIT | payload_len as u8);
    } else if payload_len < 65536 {
        buf.put_u8(MASK_BIT | 126);
        buf.put_u16(payload_len as u16);
    } else {
        buf.put_u8(MASK_BIT | 127);
        buf.put_u64(payload_len as u64);
    }

    buf.put_slice(&mask);

    let start = buf.len();
    buf.put_slice(payload);
    apply_mask(&mut buf[start..], mask);

    buf
}

/// Encodes a frame with a fresh mask, writes it and flushes the writer.
/// Returns the number of bytes put on the wire.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    opcode: OpCode,
    payload: &[u8],
    final_fragment: bool,
) -> Result<usize, Error> {
    let frame = encode_frame(opcode, payload, final_fragment, generate_mask());

    writer
        .write_all(&frame)
        .await
        .map_err(|source| Error::FrameWriteError { source })?;
    writer
        .flush()
        .await
        .map_err(|source| Error::FrameWriteError { source })?;

    trace!(
        "wrote frame opcode={:?} final={} payload_len={}",
        opcode,
        final_fragment,
        payload.len()
    );

    Ok(frame.len())
}

// A pong with no payload: 0x8A 0x80 followed by the mask key
pub async fn send_pong_frame<W: AsyncWrite + Unpin>(writer: &mut W) -> Result<usize, Error> {
    write_frame(writer, OpCode::Pong, &[], true).await
}
