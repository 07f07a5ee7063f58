//! CCSDS Space Packet Protocol primary header (Blue Book 133.0-B-2).
//!
//! The six-octet primary header is the framing unit shared by every other
//! packet format in this crate (PUS TC/TM, CFDP PDUs carried inside a space
//! packet's data field, ...).

use crate::error::{CodecError, Result};
use byteorder::{BigEndian, ByteOrder};
use std::collections::VecDeque;

/// Octet length of the CCSDS space packet primary header.
pub const CCSDS_HEADER_LEN: usize = 6;
/// Maximum valid APID value (11 bits).
pub const MAX_APID: u16 = 0x7FF;
/// Maximum valid sequence count value (14 bits).
pub const MAX_SEQ_COUNT: u16 = 0x3FFF;
/// Mask applied to a raw 16-bit header0 value to extract the 13-bit packet ID.
const PACKET_ID_MASK: u16 = 0x1FFF;

/// Packet type: telemetry or telecommand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    Tm = 0,
    Tc = 1,
}

impl PacketType {
    fn from_bit(bit: u8) -> Self {
        if bit & 1 == 1 {
            Self::Tc
        } else {
            Self::Tm
        }
    }
}

/// Packet Sequence Control's two-bit sequence-flag sub-field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SequenceFlags {
    Continuation = 0b00,
    First = 0b01,
    Last = 0b10,
    Unsegmented = 0b11,
}

impl SequenceFlags {
    fn from_2bits(bits: u16) -> Self {
        match bits & 0b11 {
            0b00 => Self::Continuation,
            0b01 => Self::First,
            0b10 => Self::Last,
            _ => Self::Unsegmented,
        }
    }
}

/// The 13-bit composite `type | sec_header_flag | apid` identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PacketId {
    pub packet_type: PacketType,
    pub sec_header_flag: bool,
    pub apid: u16,
}

impl PacketId {
    pub fn new(packet_type: PacketType, sec_header_flag: bool, apid: u16) -> Result<Self> {
        if apid > MAX_APID {
            return Err(CodecError::InvalidFieldValue {
                field: "apid",
                value: apid as u64,
            });
        }
        Ok(Self {
            packet_type,
            sec_header_flag,
            apid,
        })
    }

    pub fn empty() -> Self {
        Self {
            packet_type: PacketType::Tm,
            sec_header_flag: false,
            apid: 0,
        }
    }

    /// Pack into the low 13 bits of a `u16`.
    pub fn raw(&self) -> u16 {
        (self.packet_type as u16) << 12 | (self.sec_header_flag as u16) << 11 | self.apid
    }

    /// Unpack from the low 13 bits of `raw` (any higher bits are ignored).
    pub fn from_raw(raw: u16) -> Self {
        let raw = raw & PACKET_ID_MASK;
        Self {
            packet_type: PacketType::from_bit(((raw >> 12) & 1) as u8),
            sec_header_flag: (raw >> 11) & 1 != 0,
            apid: raw & MAX_APID,
        }
    }
}

/// The 16-bit composite `seq_flags | seq_count` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PacketSeqCtrl {
    pub seq_flags: SequenceFlags,
    pub seq_count: u16,
}

impl PacketSeqCtrl {
    pub fn new(seq_flags: SequenceFlags, seq_count: u16) -> Result<Self> {
        if seq_count > MAX_SEQ_COUNT {
            return Err(CodecError::InvalidFieldValue {
                field: "seq_count",
                value: seq_count as u64,
            });
        }
        Ok(Self {
            seq_flags,
            seq_count,
        })
    }

    pub fn empty() -> Self {
        Self {
            seq_flags: SequenceFlags::Unsegmented,
            seq_count: 0,
        }
    }

    pub fn raw(&self) -> u16 {
        (self.seq_flags as u16) << 14 | self.seq_count
    }

    pub fn from_raw(raw: u16) -> Self {
        Self {
            seq_flags: SequenceFlags::from_2bits(raw >> 14),
            seq_count: raw & MAX_SEQ_COUNT,
        }
    }
}

/// The CCSDS space packet primary header, six octets, big-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpHeader {
    pub version: u8,
    pub packet_id: PacketId,
    pub psc: PacketSeqCtrl,
    /// "Octets in packet data field, minus one" per the standard.
    pub data_len: u16,
}

impl SpHeader {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        packet_type: PacketType,
        apid: u16,
        seq_count: u16,
        data_len: u16,
        sec_header_flag: bool,
        seq_flags: SequenceFlags,
        version: u8,
    ) -> Result<Self> {
        if version > 0b111 {
            return Err(CodecError::InvalidFieldValue {
                field: "version",
                value: version as u64,
            });
        }
        Ok(Self {
            version,
            packet_id: PacketId::new(packet_type, sec_header_flag, apid)?,
            psc: PacketSeqCtrl::new(seq_flags, seq_count)?,
            data_len,
        })
    }

    pub fn tc(apid: u16, seq_count: u16, data_len: u16) -> Result<Self> {
        Self::new(
            PacketType::Tc,
            apid,
            seq_count,
            data_len,
            true,
            SequenceFlags::Unsegmented,
            0,
        )
    }

    pub fn tm(apid: u16, seq_count: u16, data_len: u16) -> Result<Self> {
        Self::new(
            PacketType::Tm,
            apid,
            seq_count,
            data_len,
            true,
            SequenceFlags::Unsegmented,
            0,
        )
    }

    /// Full on-wire packet length: `6 + data_len + 1`.
    pub fn packet_len(&self) -> usize {
        CCSDS_HEADER_LEN + self.data_len as usize + 1
    }

    /// Set `data_len` so that [`Self::packet_len`] equals `total`.
    /// `total` must be at least 7 (a one-octet data field).
    pub fn set_data_len_from_total(&mut self, total: usize) -> Result<()> {
        if total < CCSDS_HEADER_LEN + 1 {
            return Err(CodecError::InvalidFieldLength {
                context: "space packet total length below minimum of 7",
            });
        }
        self.data_len = (total - CCSDS_HEADER_LEN - 1) as u16;
        Ok(())
    }

    pub fn pack(&self) -> [u8; CCSDS_HEADER_LEN] {
        let mut buf = [0u8; CCSDS_HEADER_LEN];
        let header0 = (self.version as u16) << 13 | self.packet_id.raw();
        BigEndian::write_u16(&mut buf[0..2], header0);
        BigEndian::write_u16(&mut buf[2..4], self.psc.raw());
        BigEndian::write_u16(&mut buf[4..6], self.data_len);
        buf
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() < CCSDS_HEADER_LEN {
            return Err(CodecError::BytesTooShort {
                expected: CCSDS_HEADER_LEN,
                actual: data.len(),
            });
        }
        let header0 = BigEndian::read_u16(&data[0..2]);
        let version = (header0 >> 13) as u8;
        let packet_id = PacketId::from_raw(header0);
        let psc = PacketSeqCtrl::from_raw(BigEndian::read_u16(&data[2..4]));
        let data_len = BigEndian::read_u16(&data[4..6]);
        Ok(Self {
            version,
            packet_id,
            psc,
            data_len,
        })
    }
}

/// Compute the total on-wire packet length (`6 + data_len + 1`) from a raw
/// `data_len` field value, without needing a full [`SpHeader`].
pub fn total_len_from_len_field(data_len_field: u16) -> usize {
    CCSDS_HEADER_LEN + data_len_field as usize + 1
}

/// Concatenate and scan `queue` for space packets whose packet ID (masked to
/// 13 bits) matches one of `ids`.
///
/// Drains every buffer in `queue` front-to-back, emits every complete packet
/// found, and re-queues any unmatched trailing bytes (whether they are a
/// short, unterminated header match or fewer than six leftover octets) so
/// that no data is ever silently dropped across calls. Returns the emitted
/// packets and a count of bytes skipped because they preceded the next
/// recognized packet ID.
pub fn parse_space_packets(
    queue: &mut VecDeque<Vec<u8>>,
    ids: &[PacketId],
) -> (Vec<Vec<u8>>, usize) {
    let ids_raw: Vec<u16> = ids.iter().map(|id| id.raw()).collect();
    let mut skipped = 0usize;
    let mut packets = Vec::new();

    if queue.is_empty() {
        return (packets, skipped);
    }
    let mut concatenated = Vec::new();
    while let Some(buf) = queue.pop_front() {
        concatenated.extend(buf);
    }
    if concatenated.len() < CCSDS_HEADER_LEN {
        if !concatenated.is_empty() {
            queue.push_back(concatenated);
        }
        return (packets, skipped);
    }

    let mut idx = 0usize;
    loop {
        if idx + CCSDS_HEADER_LEN > concatenated.len() {
            // Fewer than a full header's worth of bytes remain: always
            // re-queue rather than silently dropping them.
            if idx < concatenated.len() {
                queue.push_back(concatenated[idx..].to_vec());
            }
            break;
        }
        let current_packet_id = BigEndian::read_u16(&concatenated[idx..idx + 2]) & PACKET_ID_MASK;
        if ids_raw.contains(&current_packet_id) {
            let data_len_field = BigEndian::read_u16(&concatenated[idx + 4..idx + 6]);
            let total_len = total_len_from_len_field(data_len_field);
            if idx + total_len > concatenated.len() {
                // Matched a header but don't have the full packet yet.
                queue.push_back(concatenated[idx..].to_vec());
                break;
            }
            packets.push(concatenated[idx..idx + total_len].to_vec());
            idx += total_len;
        } else {
            idx += 1;
            skipped += 1;
        }
    }
    (packets, skipped)
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    fn sample_packet_id() -> PacketId {
        PacketId::new(PacketType::Tm, true, 0x11).unwrap()
    }

    #[rstest]
    #[case(PacketType::Tm, true, 0x11, SequenceFlags::Unsegmented, 1423)]
    #[case(PacketType::Tc, false, 0x7FF, SequenceFlags::First, 0)]
    #[case(PacketType::Tm, true, 0, SequenceFlags::Continuation, 0x3FFF)]
    fn header_roundtrip(
        #[case] packet_type: PacketType,
        #[case] sec_header_flag: bool,
        #[case] apid: u16,
        #[case] seq_flags: SequenceFlags,
        #[case] seq_count: u16,
    ) {
        let header = SpHeader::new(
            packet_type,
            apid,
            seq_count,
            99,
            sec_header_flag,
            seq_flags,
            0,
        )
        .unwrap();
        let packed = header.pack();
        let recovered = SpHeader::unpack(&packed).unwrap();
        assert_eq!(header, recovered);
    }

    #[test]
    fn packet_len_matches_data_len() {
        let header = SpHeader::tc(1, 0, 9).unwrap();
        assert_eq!(header.packet_len(), 6 + 9 + 1);
    }

    #[test]
    fn set_data_len_from_total_round_trips() {
        let mut header = SpHeader::tc(1, 0, 0).unwrap();
        header.set_data_len_from_total(42).unwrap();
        assert_eq!(header.packet_len(), 42);
    }

    #[test]
    fn set_data_len_from_total_rejects_too_small() {
        let mut header = SpHeader::tc(1, 0, 0).unwrap();
        assert!(header.set_data_len_from_total(6).is_err());
    }

    #[test]
    fn rejects_apid_out_of_range() {
        assert!(PacketId::new(PacketType::Tm, false, MAX_APID + 1).is_err());
    }

    #[test]
    fn rejects_seq_count_out_of_range() {
        assert!(PacketSeqCtrl::new(SequenceFlags::Unsegmented, MAX_SEQ_COUNT + 1).is_err());
    }

    #[test]
    fn rejects_short_buffer() {
        let header = SpHeader::tc(1, 0, 9).unwrap();
        let packed = header.pack();
        for n in 1..=CCSDS_HEADER_LEN {
            assert!(SpHeader::unpack(&packed[..CCSDS_HEADER_LEN - n]).is_err());
        }
    }

    fn sample_packet(apid: u16, seq_count: u16, payload: &[u8]) -> Vec<u8> {
        let mut header = SpHeader::tm(apid, seq_count, 0).unwrap();
        header.set_data_len_from_total(CCSDS_HEADER_LEN + payload.len()).unwrap();
        let mut buf = header.pack().to_vec();
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn parses_exact_back_to_back_packets() {
        let id = sample_packet_id();
        let p1 = sample_packet(id.apid, 0, b"hello");
        let p2 = sample_packet(id.apid, 1, b"world!");
        let mut queue = VecDeque::new();
        queue.push_back([p1.clone(), p2.clone()].concat());
        let (packets, skipped) = parse_space_packets(&mut queue, &[id]);
        assert_eq!(packets, vec![p1, p2]);
        assert_eq!(skipped, 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn skips_noise_before_valid_packet() {
        let id = sample_packet_id();
        let packet = sample_packet(id.apid, 0, b"payload!");
        let mut noisy = vec![0xAAu8; 8];
        noisy.extend_from_slice(&packet);
        let mut queue = VecDeque::new();
        queue.push_back(noisy);
        let (packets, skipped) = parse_space_packets(&mut queue, &[id]);
        assert_eq!(packets, vec![packet]);
        assert_eq!(skipped, 8);
    }

    #[test]
    fn requeues_split_packet_across_calls() {
        let id = sample_packet_id();
        let packet = sample_packet(id.apid, 0, b"0123456789");
        let mut queue = VecDeque::new();
        queue.push_back(packet[..10].to_vec());
        let (packets, skipped) = parse_space_packets(&mut queue, &[id]);
        assert!(packets.is_empty());
        assert_eq!(skipped, 0);
        assert_eq!(queue.len(), 1);

        queue.push_back(packet[10..].to_vec());
        let (packets, skipped) = parse_space_packets(&mut queue, &[id]);
        assert_eq!(packets, vec![packet]);
        assert_eq!(skipped, 0);
        assert!(queue.is_empty());
    }
}
