//! PUS-C telemetry packet codec (ECSS-E-ST-70-41C §7.5).

use crate::crc::crc16_ccitt_false;
use crate::error::{CodecError, Result};
use crate::spacepacket::{PacketType, SequenceFlags, SpHeader};

/// Fixed version nibble of a PUS-C secondary header.
pub const PUS_C_VERSION: u8 = 0b0010;
/// Octet length of the PUS-C TM secondary header excluding the timestamp.
pub const PUS_C_TM_SEC_HEADER_MIN_LEN: usize = 7;

/// PUS-C TM secondary header: version, spacecraft time reference status,
/// service, subservice, message counter, destination ID and an opaque
/// timestamp whose length is a managed parameter this crate does not
/// interpret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PusTmSecondaryHeader {
    pub sc_time_ref_status: u8,
    pub service: u8,
    pub subservice: u8,
    pub msg_counter: u16,
    pub dest_id: u16,
    pub timestamp: Vec<u8>,
}

impl PusTmSecondaryHeader {
    pub fn new(
        sc_time_ref_status: u8,
        service: u8,
        subservice: u8,
        msg_counter: u16,
        dest_id: u16,
        timestamp: Vec<u8>,
    ) -> Self {
        Self {
            sc_time_ref_status: sc_time_ref_status & 0x0F,
            service,
            subservice,
            msg_counter,
            dest_id,
            timestamp,
        }
    }

    pub fn packet_len(&self) -> usize {
        PUS_C_TM_SEC_HEADER_MIN_LEN + self.timestamp.len()
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.packet_len());
        buf.push(PUS_C_VERSION << 4 | (self.sc_time_ref_status & 0x0F));
        buf.push(self.service);
        buf.push(self.subservice);
        buf.extend_from_slice(&self.msg_counter.to_be_bytes());
        buf.extend_from_slice(&self.dest_id.to_be_bytes());
        buf.extend_from_slice(&self.timestamp);
        buf
    }

    pub fn unpack(data: &[u8], stamp_len: usize) -> Result<Self> {
        if data.len() < PUS_C_TM_SEC_HEADER_MIN_LEN + stamp_len {
            return Err(CodecError::BytesTooShort {
                expected: PUS_C_TM_SEC_HEADER_MIN_LEN + stamp_len,
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
            sc_time_ref_status: data[0] & 0x0F,
            service: data[1],
            subservice: data[2],
            msg_counter: u16::from_be_bytes([data[3], data[4]]),
            dest_id: u16::from_be_bytes([data[5], data[6]]),
            timestamp: data[7..7 + stamp_len].to_vec(),
        })
    }
}

/// A PUS-C telemetry packet: `SpHeader | SecHeader | source_data | optional CRC-16`.
#[derive(Clone, Debug, PartialEq)]
pub struct PusTm {
    pub sp_header: SpHeader,
    pub sec_header: PusTmSecondaryHeader,
    pub source_data: Vec<u8>,
    pub has_crc: bool,
}

impl PusTm {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        service: u8,
        subservice: u8,
        apid: u16,
        seq_count: u16,
        msg_counter: u16,
        dest_id: u16,
        timestamp: Vec<u8>,
        source_data: Vec<u8>,
        has_crc: bool,
    ) -> Result<Self> {
        let sec_header = PusTmSecondaryHeader::new(0, service, subservice, msg_counter, dest_id, timestamp);
        let data_len = sec_header.packet_len() + source_data.len() + if has_crc { 2 } else { 0 } - 1;
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
        let sec_header = PusTmSecondaryHeader::unpack(&data[6..], stamp_len)?;
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
    fn roundtrip_with_crc() {
        let tm = PusTm::new(17, 2, 0x42, 3, 9, 0, vec![0xAA; 7], vec![1, 2, 3], true).unwrap();
        let packed = tm.pack();
        assert_eq!(packed.len(), tm.packet_len());
        let recovered = PusTm::unpack(&packed, 7, true).unwrap();
        assert_eq!(recovered, tm);
    }

    #[test]
    fn roundtrip_without_timestamp_or_crc() {
        let tm = PusTm::new(17, 2, 0x42, 3, 9, 0, vec![], vec![], false).unwrap();
        let packed = tm.pack();
        let recovered = PusTm::unpack(&packed, 0, false).unwrap();
        assert_eq!(recovered, tm);
    }

    #[test]
    fn rejects_corrupted_crc() {
        let tm = PusTm::new(17, 2, 0x42, 3, 9, 0, vec![0xAA; 7], vec![1, 2, 3], true).unwrap();
        let mut packed = tm.pack();
        let last = packed.len() - 1;
        packed[last] ^= 0xFF;
        assert!(PusTm::unpack(&packed, 7, true).is_err());
    }
}
