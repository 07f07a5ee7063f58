//! CFDP Length-Value (LV) encoding: a one-octet length followed by that many
//! value octets (CCSDS 727.0-B-5 §5.2.1).

use crate::error::{CodecError, Result};

/// Maximum value length an [`Lv`] can carry.
pub const LV_MAX_VALUE_LEN: usize = u8::MAX as usize;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Lv {
    value: Vec<u8>,
}

impl Lv {
    pub fn new(value: &[u8]) -> Result<Self> {
        if value.len() > LV_MAX_VALUE_LEN {
            return Err(CodecError::InvalidFieldLength {
                context: "LV value exceeds 255 octets",
            });
        }
        Ok(Self {
            value: value.to_vec(),
        })
    }

    pub fn empty() -> Self {
        Self { value: Vec::new() }
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn len_value(&self) -> u8 {
        self.value.len() as u8
    }

    /// Total packed length, including the length octet.
    pub fn packet_len(&self) -> usize {
        1 + self.value.len()
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.packet_len());
        buf.push(self.len_value());
        buf.extend_from_slice(&self.value);
        buf
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(CodecError::BytesTooShort {
                expected: 1,
                actual: 0,
            });
        }
        let len = data[0] as usize;
        if data.len() < 1 + len {
            return Err(CodecError::BytesTooShort {
                expected: 1 + len,
                actual: data.len(),
            });
        }
        Ok(Self {
            value: data[1..1 + len].to_vec(),
        })
    }
}
