//! PUS-C telecommand packet codec (ECSS-E-ST-70-41C §7.4).

use crate::crc::crc16_ccitt_false;
use crate::error::{CodecError, Result};
use crate::spacepacket::{PacketType, SequenceFlags, SpHeader};

/// Fixed version nibble of a PUS-C secondary header.
pub const PUS_C_VERSION: u8 = 0b0010;
/// Octet length of the PUS-C TC secondary header.
pub const PUS_C_TC_SEC_HEADER_LEN: usize = 5;

/// PUS-C TC secondary header: version, acknowledgement flags, service,
/// subservice and a 16-bit source ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PusTcSecondaryHeader {
    pub ack_flags: u8,
    pub service: u8,
    pub subservice: u8,
    pub source_id: u16,
}

impl PusTcSecondaryHeader {
    pub fn new(ack_flags: u8, service: u8, subservice: u8, source_id: u16) -> Self {
        Self {
            ack_flags: ack_flags & 0x0F,
            service,
            subservice,
            source_id,
        }
    }

    pub fn pack(&self) -> [u8; PUS_C_TC_SEC_HEADER_LEN] {
        let mut buf = [0u8; PUS_C_TC_SEC_HEADER_LEN];
        buf[0] = PUS_C_VERSION << 4 | (self.ack_flags & 0x0F);
        buf[1] = self.service;
        buf[2] = self.subservice;
        buf[3..5].copy_from_slice(&self.source_id.to_be_bytes());
        buf
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() < PUS_C_TC_SEC_HEADER_LEN {
            return Err(CodecError::BytesTooShort {
                expected: PUS_C_TC_SEC_HEADER_LEN,
                actual: data.len(),
            });
        }
        let version = data[0] >> 4;
        if version != PUS_C_VERSION {
            return Err(CodecError::UnsupportedVersion {
                found: version,
                expected: PUS_C_VERSION,
            });
        }
        Ok(Self {
            ack_flags: data[0] & 0x0F,
            service: data[1],
            subservice: data[2],
            source_id: u16::from_be_bytes([data[3], data[4]]),
        })
    }
}

/// A PUS-C telecommand: `SpHeader | SecHeader | app_data | optional CRC-16`.
#[derive(Clone, Debug, PartialEq)]
pub struct PusTc {
    pub sp_header: SpHeader,
    pub sec_header: PusTcSecondaryHeader,
    pub app_data: Vec<u8>,
    pub has_crc: bool,
}

impl PusTc {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        service: u8,
        subservice: u8,
        apid: u16,
        seq_count: u16,
        app_data: Vec<u8>,
        source_id: u16,
        ack_flags: u8,
        has_crc: bool,
    ) -> Result<Self> {
        let sec_header = PusTcSecondaryHeader::new(ack_flags, service, subservice, source_id);
        let data_len = Self::data_len(app_data.len(), has_crc);
        let sp_header = SpHeader::new(
            PacketType::Tc,
            apid,
            seq_count,
            data_len as u16,
            true,
            SequenceFlags::Unsegmented,
            0,
        )?;
        Ok(Self {
            sp_header,
            sec_header,
            app_data,
            has_crc,
        })
    }

    fn data_len(app_data_len: usize, has_crc: bool) -> usize {
        PUS_C_TC_SEC_HEADER_LEN + app_data_len + if has_crc { 2 } else { 0 } - 1
    }

    pub fn packet_len(&self) -> usize {
        self.sp_header.packet_len()
    }

    /// Pack the wire form. If `recalc_crc` is set (or `has_crc` but the
    /// buffer carries no stored CRC yet), a fresh CRC-16 is computed over the
    /// header and secondary header and appended.
    pub fn pack(&self, recalc_crc: bool) -> Vec<u8> {
        let mut buf = self.sp_header.pack().to_vec();
        buf.extend(self.sec_header.pack());
        buf.extend_from_slice(&self.app_data);
        if self.has_crc && recalc_crc {
            generate_packet_crc_append(&mut buf);
        } else if self.has_crc {
            buf.extend_from_slice(&[0, 0]);
        }
        buf
    }

    pub fn unpack(data: &[u8], verify_crc: bool) -> Result<Self> {
        let sp_header = SpHeader::unpack(data)?;
        let total = sp_header.packet_len();
        if data.len() < total {
            return Err(CodecError::BytesTooShort {
                expected: total,
                actual: data.len(),
            });
        }
        let sec_header = PusTcSecondaryHeader::unpack(&data[6..])?;
        let has_crc = total >= 6 + PUS_C_TC_SEC_HEADER_LEN + 2;
        let app_data_end = if has_crc { total - 2 } else { total };
        let app_data = data[6 + PUS_C_TC_SEC_HEADER_LEN..app_data_end].to_vec();
        if has_crc && verify_crc {
            let computed = crc16_ccitt_false(&data[..total]);
            if computed != 0 {
                let expected = u16::from_be_bytes([data[total - 2], data[total - 1]]);
                return Err(CodecError::InvalidCrc16 { expected, computed });
            }
        }
        Ok(Self {
            sp_header,
            sec_header,
            app_data,
            has_crc,
        })
    }
}

/// Patch the trailing two octets of an already-assembled buffer with a
/// freshly computed CRC-16 CCITT-FALSE over the preceding bytes.
pub fn generate_packet_crc(buf: &mut [u8]) {
    let len = buf.len();
    let crc = crc16_ccitt_false(&buf[..len - 2]);
    buf[len - 2..].copy_from_slice(&crc.to_be_bytes());
}

fn generate_packet_crc_append(buf: &mut Vec<u8>) {
    let crc = crc16_ccitt_false(buf);
    buf.extend_from_slice(&crc.to_be_bytes());
}

/// Append a freshly computed CRC-16 CCITT-FALSE to a copy of `buf`.
pub fn generate_crc(buf: &[u8]) -> Vec<u8> {
    let mut out = buf.to_vec();
    generate_packet_crc_append(&mut out);
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn roundtrip_with_crc() {
        let tc = PusTc::new(17, 1, 0x42, 7, vec![1, 2, 3], 0, 0, true).unwrap();
        let packed = tc.pack(true);
        assert_eq!(packed.len(), tc.packet_len());
        let recovered = PusTc::unpack(&packed, true).unwrap();
        assert_eq!(recovered, tc);
    }

    #[test]
    fn roundtrip_without_crc() {
        let tc = PusTc::new(17, 1, 0x42, 7, vec![], 5, 0b1111, false).unwrap();
        let packed = tc.pack(true);
        let recovered = PusTc::unpack(&packed, true).unwrap();
        assert_eq!(recovered, tc);
    }

    #[test]
    fn rejects_corrupted_crc() {
        let tc = PusTc::new(17, 1, 0x42, 7, vec![1, 2, 3], 0, 0, true).unwrap();
        let mut packed = tc.pack(true);
        let last = packed.len() - 1;
        packed[last] ^= 0xFF;
        assert!(PusTc::unpack(&packed, true).is_err());
    }

    #[test]
    fn generate_crc_appends_verifiable_trailer() {
        let body = vec![1, 2, 3, 4];
        let with_crc = generate_crc(&body);
        assert_eq!(crc16_ccitt_false(&with_crc), 0);
    }

    #[test]
    fn generate_packet_crc_patches_in_place() {
        let mut buf = vec![1, 2, 3, 0, 0];
        generate_packet_crc(&mut buf);
        assert_eq!(crc16_ccitt_false(&buf), 0);
    }

    #[test]
    fn matches_concrete_wire_vector() {
        let tc = PusTc::new(17, 1, 0x01, 0x16, vec![], 0, 0b1111, true).unwrap();
        let packed = tc.pack(true);
        assert_eq!(
            packed,
            vec![0x18, 0x01, 0xc0, 0x16, 0x00, 0x06, 0x2f, 0x11, 0x01, 0x00, 0x00, 0xab, 0x62]
        );
    }
}
