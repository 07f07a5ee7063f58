//! PUS-A telecommand/telemetry secondary headers (ECSS-E-70-41A §E).
//!
//! PUS-A precedes PUS-C and differs in the secondary header layout: the
//! version nibble moves to make room for a secondary-header flag bit on TC,
//! the TC source ID shrinks to one octet and becomes optional (a
//! construction parameter, since its presence cannot be derived from the
//! version nibble alone), and TM drops the destination ID field entirely
//! while its message counter shrinks to one octet. Everything else (CRC
//! framing, primary header, app/source data) is shared with [`super::tc`]
//! and [`super::tm`].

use crate::crc::crc16_ccitt_false;
use crate::error::{CodecError, Result};
use crate::spacepacket::{PacketType, SequenceFlags, SpHeader};

/// Version nibble/field of a PUS-A secondary header.
pub const PUS_A_VERSION: u8 = 0b001;

/// PUS-A TC secondary header: secondary-header flag, version, acknowledgement
/// flags, service, subservice and an optional 8-bit source ID whose presence
/// is a construction parameter, not derivable from the packed bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PusATcSecondaryHeader {
    pub secondary_header_flag: bool,
    pub ack_flags: u8,
    pub service: u8,
    pub subservice: u8,
    pub source_id: Option<u8>,
}

impl PusATcSecondaryHeader {
    pub fn new(
        secondary_header_flag: bool,
        ack_flags: u8,
        service: u8,
        subservice: u8,
        source_id: Option<u8>,
    ) -> Self {
        Self {
            secondary_header_flag,
            ack_flags: ack_flags & 0x0F,
            service,
            subservice,
            source_id,
        }
    }

    /// Packed length: 3 octets, plus one more if a source ID was supplied.
    pub fn packet_len(&self) -> usize {
        3 + self.source_id.is_some() as usize
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.packet_len());
        buf.push(
            (self.secondary_header_flag as u8) << 7 | PUS_A_VERSION << 4 | (self.ack_flags & 0x0F),
        );
        buf.push(self.service);
        buf.push(self.subservice);
        if let Some(source_id) = self.source_id {
            buf.push(source_id);
        }
        buf
    }

    /// `has_source_id` is a managed parameter: PUS-A's optional source ID
    /// cannot be inferred from the header bytes alone.
    pub fn unpack(data: &[u8], has_source_id: bool) -> Result<Self> {
        let expected = 3 + has_source_id as usize;
        if data.len() < expected {
            return Err(CodecError::BytesTooShort {
                expected,
                actual: data.len(),
            });
        }
        let version = (data[0] & 0x70) >> 4;
        if version != PUS_A_VERSION {
            return Err(CodecError::UnsupportedVersion {
                found: version,
                expected: PUS_A_VERSION,
            });
        }
        Ok(Self {
            secondary_header_flag: data[0] & 0x80 != 0,
            ack_flags: data[0] & 0x0F,
            service: data[1],
            subservice: data[2],
            source_id: has_source_id.then(|| data[3]),
        })
    }
}

/// A PUS-A telecommand: `SpHeader | SecHeader | app_data | optional CRC-16`.
#[derive(Clone, Debug, PartialEq)]
pub struct PusATc {
    pub sp_header: SpHeader,
    pub sec_header: PusATcSecondaryHeader,
    pub app_data: Vec<u8>,
    pub has_crc: bool,
}

impl PusATc {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        service: u8,
        subservice: u8,
        apid: u16,
        seq_count: u16,
        app_data: Vec<u8>,
        source_id: Option<u8>,
        ack_flags: u8,
        has_crc: bool,
    ) -> Result<Self> {
        let sec_header = PusATcSecondaryHeader::new(true, ack_flags, service, subservice, source_id);
        let data_len =
            sec_header.packet_len() + app_data.len() + if has_crc { 2 } else { 0 } - 1;
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

    pub fn packet_len(&self) -> usize {
        self.sp_header.packet_len()
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = self.sp_header.pack().to_vec();
        buf.extend(self.sec_header.pack());
        buf.extend_from_slice(&self.app_data);
        if self.has_crc {
            let crc = crc16_ccitt_false(&buf);
            buf.extend_from_slice(&crc.to_be_bytes());
        }
        buf
    }

    /// `has_source_id` and `has_crc` are managed parameters this codec does
    /// not attempt to infer from the wire.
    pub fn unpack(data: &[u8], has_source_id: bool, has_crc: bool) -> Result<Self> {
        let sp_header = SpHeader::unpack(data)?;
        let total = sp_header.packet_len();
        if data.len() < total {
            return Err(CodecError::BytesTooShort {
                expected: total,
                actual: data.len(),
            });
        }
        let sec_header = PusATcSecondaryHeader::unpack(&data[6..], has_source_id)?;
        let app_data_start = 6 + sec_header.packet_len();
        let app_data_end = if has_crc { total - 2 } else { total };
        if app_data_end < app_data_start {
            return Err(CodecError::SrcDataTooShort {
                expected: app_data_start - 6,
                actual: total - 6,
            });
        }
        let app_data = data[app_data_start..app_data_end].to_vec();
        if has_crc {
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

/// Octet length of a PUS-A TM secondary header, excluding the timestamp.
pub const PUS_A_TM_SEC_HEADER_MIN_LEN: usize = 4;

/// PUS-A TM secondary header: version, service, subservice, an 8-bit message
/// counter and an opaque timestamp. Unlike PUS-C, PUS-A has no destination
/// ID field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PusATmSecondaryHeader {
    pub service: u8,
    pub subservice: u8,
    pub msg_counter: u8,
    pub timestamp: Vec<u8>,
}

impl PusATmSecondaryHeader {
    pub fn new(service: u8, subservice: u8, msg_counter: u8, timestamp: Vec<u8>) -> Self {
        Self {
            service,
            subservice,
            msg_counter,
            timestamp,
        }
    }

    pub fn packet_len(&self) -> usize {
        PUS_A_TM_SEC_HEADER_MIN_LEN + self.timestamp.len()
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.packet_len());
        buf.push(PUS_A_VERSION << 4);
        buf.push(self.service);
        buf.push(self.subservice);
        buf.push(self.msg_counter);
        buf.extend_from_slice(&self.timestamp);
        buf
    }

    pub fn unpack(data: &[u8], stamp_len: usize) -> Result<Self> {
        let expected = PUS_A_TM_SEC_HEADER_MIN_LEN + stamp_len;
        if data.len() < expected {
            return Err(CodecError::BytesTooShort {
                expected,
                actual: data.len(),
            });
        }
        let version = (data[0] & 0x70) >> 4;
        if version != PUS_A_VERSION {
            return Err(CodecError::UnsupportedVersion {
                found: version,
                expected: PUS_A_VERSION,
            });
        }
        Ok(Self {
            service: data[1],
            subservice: data[2],
            msg_counter: data[3],
            timestamp: data[4..4 + stamp_len].to_vec(),
        })
    }
}

/// A PUS-A telemetry packet: `SpHeader | SecHeader | source_data | optional CRC-16`.
#[derive(Clone, Debug, PartialEq)]
pub struct PusATm {
    pub sp_header: SpHeader,
    pub sec_header: PusATmSecondaryHeader,
    pub source_data: Vec<u8>,
    pub has_crc: bool,
}

impl PusATm {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        service: u8,
        subservice: u8,
        apid: u16,
        seq_count: u16,
        msg_counter: u8,
        timestamp: Vec<u8>,
        source_data: Vec<u8>,
        has_crc: bool,
    ) -> Result<Self> {
        let sec_header = PusATmSecondaryHeader::new(service, subservice, msg_counter, timestamp);
        let data_len =
            sec_header.packet_len() + source_data.len() + if has_crc { 2 } else { 0 } - 1;
        let sp_header = SpHeader::new(
            PacketType::Tm,
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
            source_data,
            has_crc,
        })
    }

    pub fn packet_len(&self) -> usize {
        self.sp_header.packet_len()
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = self.sp_header.pack().to_vec();
        buf.extend(self.sec_header.pack());
        buf.extend_from_slice(&self.source_data);
        if self.has_crc {
            let crc = crc16_ccitt_false(&buf);
            buf.extend_from_slice(&crc.to_be_bytes());
        }
        buf
    }

    /// `stamp_len` is a managed parameter: the timestamp's length is not
    /// self-describing in the wire format.
    pub fn unpack(data: &[u8], stamp_len: usize, has_crc: bool) -> Result<Self> {
        let sp_header = SpHeader::unpack(data)?;
        let total = sp_header.packet_len();
        if data.len() < total {
            return Err(CodecError::BytesTooShort {
                expected: total,
                actual: data.len(),
            });
        }
        let sec_header = PusATmSecondaryHeader::unpack(&data[6..], stamp_len)?;
        let src_data_start = 6 + sec_header.packet_len();
        let src_data_end = if has_crc { total - 2 } else { total };
        if src_data_end < src_data_start {
            return Err(CodecError::SrcDataTooShort {
                expected: src_data_start - 6,
                actual: total - 6,
            });
        }
        let source_data = data[src_data_start..src_data_end].to_vec();
        if has_crc {
            let computed = crc16_ccitt_false(&data[..total]);
            if computed != 0 {
                let expected = u16::from_be_bytes([data[total - 2], data[total - 1]]);
                return Err(CodecError::InvalidCrc16 { expected, computed });
            }
        }
        Ok(Self {
            sp_header,
            sec_header,
            source_data,
            has_crc,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tc_roundtrip_with_source_id() {
        let tc = PusATc::new(17, 1, 0x42, 7, vec![1, 2, 3], Some(9), 0b1111, true).unwrap();
        let packed = tc.pack();
        assert_eq!(packed.len(), tc.packet_len());
        let recovered = PusATc::unpack(&packed, true, true).unwrap();
        assert_eq!(recovered, tc);
    }

    #[test]
    fn tc_roundtrip_without_source_id() {
        let tc = PusATc::new(17, 1, 0x42, 7, vec![], None, 0b1111, false).unwrap();
        let packed = tc.pack();
        let recovered = PusATc::unpack(&packed, false, false).unwrap();
        assert_eq!(recovered, tc);
    }

    #[test]
    fn tc_sec_header_version_field_is_three_bits_wide() {
        let header = PusATcSecondaryHeader::new(true, 0b1111, 17, 1, Some(0xAB));
        let packed = header.pack();
        assert_eq!(packed[0], 0b1_001_1111);
        assert_eq!(packed[3], 0xAB);
    }

    #[test]
    fn tc_rejects_wrong_version() {
        let tc = PusATc::new(17, 1, 0x42, 7, vec![], Some(0), 0b1111, false).unwrap();
        let mut packed = tc.pack();
        packed[6] = (packed[6] & 0x8F) | (0b010 << 4);
        assert!(PusATc::unpack(&packed, true, false).is_err());
    }

    #[test]
    fn tm_roundtrip_with_timestamp_and_crc() {
        let tm = PusATm::new(17, 2, 0x42, 3, 9, vec![0xAA; 7], vec![1, 2, 3], true).unwrap();
        let packed = tm.pack();
        assert_eq!(packed.len(), tm.packet_len());
        let recovered = PusATm::unpack(&packed, 7, true).unwrap();
        assert_eq!(recovered, tm);
    }

    #[test]
    fn tm_has_no_destination_id_field() {
        let header = PusATmSecondaryHeader::new(17, 2, 200, vec![]);
        assert_eq!(header.packet_len(), PUS_A_TM_SEC_HEADER_MIN_LEN);
    }

    #[test]
    fn tm_message_counter_is_one_octet() {
        let header = PusATmSecondaryHeader::new(17, 2, 0xFF, vec![0x01]);
        let packed = header.pack();
        assert_eq!(packed[3], 0xFF);
        assert_eq!(packed.len(), 5);
    }
}
