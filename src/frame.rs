#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    Continue,
    Text,
    Binary,
    Close,
    Ping,
    Pong,
    // Any other 4-bit value, the read loop skips these
    Reserved(u8),
}

impl OpCode {
    pub fn from(byte: u8) -> Self {
        match byte & 0b00001111 {
            0x0 => OpCode::Continue,
            0x1 => OpCode::Text,
            0x2 => OpCode::Binary,
            0x8 => OpCode::Close,
            0x9 => OpCode::Ping,
            0xA => OpCode::Pong,
            other => OpCode::Reserved(other),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            OpCode::Continue => 0x0,
            OpCode::Text => 0x1,
            OpCode::Binary => 0x2,
            OpCode::Close => 0x8,
            OpCode::Ping => 0x9,
            OpCode::Pong => 0xA,
            OpCode::Reserved(byte) => byte & 0b00001111,
        }
    }

    // Continuation, text and binary frames carry message bytes
    pub fn is_data(&self) -> bool {
        matches!(self, OpCode::Continue | OpCode::Text | OpCode::Binary)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub final_fragment: bool,
    pub opcode: OpCode,
    pub masked: bool,
    pub mask: Option<[u8; 4]>,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(final_fragment: bool, opcode: OpCode, payload: Vec<u8>) -> Self {
        Self {
            final_fragment,
            opcode,
            masked: false,
            mask: None,
            payload,
        }
    }
}

// The mask is applied using a simple bitwise XOR operation. Each byte of the payload data
// is XOR'd with the corresponding byte (modulo 4) of the 4-byte mask, so applying it twice
// gives back the original bytes.
pub fn apply_mask(payload: &mut [u8], mask: [u8; 4]) {
    for (i, byte) in payload.iter_mut().enumerate() {
        *byte ^= mask[i % 4];
    }
}
