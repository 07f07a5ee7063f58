//! Self-describing packet fields: a value paired with the byte width
//! ("parameter format code") it occupies on the wire.

use crate::error::{CodecError, Result};

/// Byte width of a [`PacketFieldEnum`]'s value, the PUS "parameter format
/// code" restricted to the widths this crate's verification fields use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PfcWidth {
    OneByte = 1,
    TwoBytes = 2,
    FourBytes = 4,
    EightBytes = 8,
}

impl PfcWidth {
    pub fn len(self) -> usize {
        self as usize
    }

    fn from_byte_len(len: usize) -> Result<Self> {
        Ok(match len {
            1 => Self::OneByte,
            2 => Self::TwoBytes,
            4 => Self::FourBytes,
            8 => Self::EightBytes,
            other => {
                return Err(CodecError::InvalidFieldValue {
                    field: "pfc_width",
                    value: other as u64,
                })
            }
        })
    }
}

/// An enumerated packet field: a PFC-tagged unsigned value, used for PUS
/// step IDs and failure-notice codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PacketFieldEnum {
    pfc: PfcWidth,
    value: u64,
}

impl PacketFieldEnum {
    pub fn new(pfc: PfcWidth, value: u64) -> Result<Self> {
        if pfc != PfcWidth::EightBytes && value >= 1u64 << (8 * pfc.len()) {
            return Err(CodecError::InvalidFieldValue {
                field: "packet_field_enum.value",
                value,
            });
        }
        Ok(Self { pfc, value })
    }

    pub fn pfc(&self) -> PfcWidth {
        self.pfc
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn packet_len(&self) -> usize {
        self.pfc.len()
    }

    pub fn pack(&self) -> Vec<u8> {
        let full = self.value.to_be_bytes();
        full[8 - self.pfc.len()..].to_vec()
    }

    pub fn unpack(data: &[u8], pfc: PfcWidth) -> Result<Self> {
        let len = pfc.len();
        if data.len() < len {
            return Err(CodecError::BytesTooShort {
                expected: len,
                actual: data.len(),
            });
        }
        let mut full = [0u8; 8];
        full[8 - len..].copy_from_slice(&data[..len]);
        Self::new(pfc, u64::from_be_bytes(full))
    }

    pub fn unpack_with_byte_len(data: &[u8], byte_len: usize) -> Result<Self> {
        Self::unpack(data, PfcWidth::from_byte_len(byte_len)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PfcWidth::OneByte, 0xAB)]
    #[case(PfcWidth::TwoBytes, 0xABCD)]
    #[case(PfcWidth::FourBytes, 0xDEAD_BEEF)]
    #[case(PfcWidth::EightBytes, 0x0102_0304_0506_0708)]
    fn roundtrip(#[case] pfc: PfcWidth, #[case] value: u64) {
        let field = PacketFieldEnum::new(pfc, value).unwrap();
        let packed = field.pack();
        assert_eq!(packed.len(), field.packet_len());
        assert_eq!(PacketFieldEnum::unpack(&packed, pfc).unwrap(), field);
    }

    #[test]
    fn rejects_value_too_large_for_pfc() {
        assert!(PacketFieldEnum::new(PfcWidth::OneByte, 256).is_err());
    }
}
