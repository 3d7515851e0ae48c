use crate::bitbuf::BitBuffer;
use crate::error::{Result, StegError};
use serde::{Deserialize, Serialize};

/// How the end of an embedded message is marked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Framing {
    /// The message ends at the first control byte. No header, but the payload
    /// itself cannot contain control bytes.
    #[default]
    Terminator,
    /// A 32-bit big-endian byte count precedes the message
    LengthPrefixed,
}

/// Width of the length header written by [`Framing::LengthPrefixed`]
pub const LENGTH_HEADER_BITS: usize = 32;

impl std::str::FromStr for Framing {
    type Err = StegError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "terminator" => Ok(Self::Terminator),
            "length" | "length-prefixed" => Ok(Self::LengthPrefixed),
            _ => Err(StegError::UnsupportedFraming(s.to_string())),
        }
    }
}

impl Framing {
    /// Bytes of capacity consumed by framing
    pub fn overhead(&self) -> usize {
        match self {
            Self::Terminator => 0,
            Self::LengthPrefixed => LENGTH_HEADER_BITS / 8,
        }
    }

    /// Stage `payload` as the bit stream to embed
    pub fn encode(&self, payload: &[u8]) -> Result<BitBuffer> {
        let mut bits = BitBuffer::from_bytes(payload);
        if *self == Self::LengthPrefixed {
            let len = u32::try_from(payload.len()).map_err(|_| StegError::Width {
                value: payload.len() as u64,
                width: LENGTH_HEADER_BITS,
            })?;
            bits.prepend_int(len, LENGTH_HEADER_BITS)?;
        }
        Ok(bits)
    }

    /// Recover the message from the raw capacity-sized LSB stream.
    ///
    /// `max_payload` bounds what a length header may claim.
    pub fn decode(&self, raw: &[u8], max_payload: usize) -> Result<Vec<u8>> {
        match self {
            Self::Terminator => {
                let end = raw
                    .iter()
                    .position(|&b| is_terminator(b))
                    .unwrap_or(raw.len());
                Ok(raw[..end].to_vec())
            }
            Self::LengthPrefixed => {
                let mut bits = BitBuffer::from_bytes(raw);
                let len = bits.next_int(LENGTH_HEADER_BITS).map_err(|_| {
                    StegError::InvalidFrame("image too small for a length header".into())
                })? as usize;
                if len > max_payload {
                    return Err(StegError::InvalidFrame(format!(
                        "header claims {} bytes, image holds at most {}",
                        len, max_payload
                    )));
                }
                bits.next_bytes(len)
            }
        }
    }
}

/// Control characters end a terminator-framed message: C0 (`0x00-0x1F`),
/// DEL (`0x7F`) and C1 (`0x80-0x9F`).
///
/// Bytes `0xA0-0xFF` are not terminators; they are kept and rendered as the
/// matching Latin-1 characters by [`crate::codec::bytes_to_string`].
pub fn is_terminator(byte: u8) -> bool {
    char::from(byte).is_control()
}
