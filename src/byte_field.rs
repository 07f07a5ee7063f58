//! Fixed-width, big-endian unsigned byte fields used for CFDP entity IDs,
//! transaction sequence numbers and destination IDs.

use crate::error::{CodecError, Result};
use byteorder::{BigEndian, ByteOrder};

/// A value paired with the byte width it is serialized in. Equality and
/// hashing compare `(len, value)`, mirroring the source library's behavior.
#[derive(Clone, Copy, Debug)]
pub struct UnsignedByteField {
    len: usize,
    value: u64,
}

impl UnsignedByteField {
    /// Build a field of the given byte length. `len` must be one of
    /// `{1, 2, 4, 8}` and `value` must fit in `len` bytes.
    pub fn new(len: usize, value: u64) -> Result<Self> {
        if !matches!(len, 1 | 2 | 4 | 8) {
            return Err(CodecError::InvalidFieldValue {
                field: "byte_field.len",
                value: len as u64,
            });
        }
        if len < 8 && value >= 1u64 << (8 * len) {
            return Err(CodecError::InvalidFieldValue {
                field: "byte_field.value",
                value,
            });
        }
        Ok(Self { len, value })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.len];
        match self.len {
            1 => buf[0] = self.value as u8,
            2 => BigEndian::write_u16(&mut buf, self.value as u16),
            4 => BigEndian::write_u32(&mut buf, self.value as u32),
            8 => BigEndian::write_u64(&mut buf, self.value),
            _ => unreachable!("validated in new()"),
        }
        buf
    }

    pub fn unpack(data: &[u8], len: usize) -> Result<Self> {
        if data.len() < len {
            return Err(CodecError::BytesTooShort {
                expected: len,
                actual: data.len(),
            });
        }
        let value = match len {
            1 => data[0] as u64,
            2 => BigEndian::read_u16(data) as u64,
            4 => BigEndian::read_u32(data) as u64,
            8 => BigEndian::read_u64(data),
            _ => {
                return Err(CodecError::InvalidFieldValue {
                    field: "byte_field.len",
                    value: len as u64,
                })
            }
        };
        Self::new(len, value)
    }
}

impl PartialEq for UnsignedByteField {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.value == other.value
    }
}
impl Eq for UnsignedByteField {}

impl std::hash::Hash for UnsignedByteField {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        self.value.hash(state);
    }
}

/// Narrow one-byte field constructor, mirroring the source library's
/// `ByteFieldU8` convenience type.
pub struct ByteFieldU8;
impl ByteFieldU8 {
    pub fn new(value: u8) -> UnsignedByteField {
        UnsignedByteField::new(1, value as u64).expect("u8 always fits in 1 byte")
    }
}

/// Narrow two-byte field constructor (`ByteFieldU16`).
pub struct ByteFieldU16;
impl ByteFieldU16 {
    pub fn new(value: u16) -> UnsignedByteField {
        UnsignedByteField::new(2, value as u64).expect("u16 always fits in 2 bytes")
    }
}

/// Narrow four-byte field constructor (`ByteFieldU32`).
pub struct ByteFieldU32;
impl ByteFieldU32 {
    pub fn new(value: u32) -> UnsignedByteField {
        UnsignedByteField::new(4, value as u64).expect("u32 always fits in 4 bytes")
    }
}

/// Narrow eight-byte field constructor (`ByteFieldU64`).
pub struct ByteFieldU64;
impl ByteFieldU64 {
    pub fn new(value: u64) -> UnsignedByteField {
        UnsignedByteField::new(8, value).expect("u64 always fits in 8 bytes")
    }
}

/// Picks the narrowest of `{1, 2, 4, 8}` bytes that can hold `value`.
pub struct ByteFieldGenerator;
impl ByteFieldGenerator {
    pub fn with_narrowest_width(value: u64) -> UnsignedByteField {
        let len = if value <= u8::MAX as u64 {
            1
        } else if value <= u16::MAX as u64 {
            2
        } else if value <= u32::MAX as u64 {
            4
        } else {
            8
        };
        UnsignedByteField::new(len, value).expect("width chosen to fit value")
    }
}
