//! CFDP common PDU header (CCSDS 727.0-B-5 §5.1), 4 to 14 octets shared by
//! every directive and file-data PDU.

use crate::byte_field::UnsignedByteField;
use crate::crc::crc16_ccitt_false;
use crate::error::{CodecError, Result};

/// Fixed CFDP version nibble this crate reads and writes.
pub const CFDP_VERSION: u8 = 0b001;

/// Whether a PDU is a file-directive PDU or a file-data PDU.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PduType {
    FileDirective = 0,
    FileData = 1,
}

/// Direction a PDU travels: toward the file receiver or toward the sender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    TowardReceiver = 0,
    TowardSender = 1,
}

/// Acknowledged vs. unacknowledged CFDP transmission mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransmissionMode {
    Acknowledged = 0,
    Unacknowledged = 1,
}

/// Segmentation control: whether record boundaries are preserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SegmentationControl {
    NoRecordBoundaries = 0,
    WithRecordBoundaries = 1,
}

/// Width of an entity ID / transaction sequence number field, as encoded in
/// the 3-bit `len_minus_1` sub-fields of header octet 3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OctetLen {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
}

impl OctetLen {
    pub fn len(self) -> usize {
        self as usize
    }

    fn from_byte_len(len: usize) -> Result<Self> {
        Ok(match len {
            1 => Self::One,
            2 => Self::Two,
            4 => Self::Four,
            8 => Self::Eight,
            other => {
                return Err(CodecError::InvalidFieldValue {
                    field: "entity_id_len",
                    value: other as u64,
                })
            }
        })
    }

    fn minus_1_bits(self) -> u8 {
        (self.len() - 1) as u8
    }

    fn from_minus_1_bits(bits: u8) -> Result<Self> {
        Self::from_byte_len(bits as usize + 1)
    }
}

/// Whether a file-data PDU carries a segment-metadata sub-field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SegmentMetadataFlag(pub bool);

/// File-size-sensitive field width, selected by the common header's
/// large-file flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FssLen {
    Normal,
    Large,
}

impl FssLen {
    pub fn len(self) -> usize {
        match self {
            Self::Normal => 4,
            Self::Large => 8,
        }
    }

    pub fn from_large_file_flag(large: bool) -> Self {
        if large {
            Self::Large
        } else {
            Self::Normal
        }
    }
}

/// Per-transaction parameters shared by every PDU belonging to the same
/// CFDP transaction: entity IDs, transmission mode, CRC/file-size flags and
/// segmentation control. Passed explicitly to every PDU constructor — there
/// is no global/default configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PduConfig {
    pub source_entity_id: UnsignedByteField,
    pub dest_entity_id: UnsignedByteField,
    pub transaction_seq_num: UnsignedByteField,
    pub trans_mode: TransmissionMode,
    pub crc_flag: bool,
    pub large_file_flag: bool,
    pub seg_ctrl: SegmentationControl,
    pub seg_meta_flag: bool,
}

impl PduConfig {
    pub fn fss_len(&self) -> FssLen {
        FssLen::from_large_file_flag(self.large_file_flag)
    }
}

/// The CFDP common PDU header, 4 to 14 octets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PduHeader {
    pub pdu_type: PduType,
    pub direction: Direction,
    pub trans_mode: TransmissionMode,
    pub crc_flag: bool,
    pub large_file_flag: bool,
    pub pdu_data_field_len: u16,
    pub seg_ctrl: SegmentationControl,
    pub seg_meta_flag: bool,
    pub source_entity_id: UnsignedByteField,
    pub transaction_seq_num: UnsignedByteField,
    pub dest_entity_id: UnsignedByteField,
}

impl PduHeader {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pdu_type: PduType,
        direction: Direction,
        pdu_data_field_len: u16,
        config: &PduConfig,
    ) -> Result<Self> {
        if config.source_entity_id.len() != config.dest_entity_id.len() {
            return Err(CodecError::InvalidFieldLength {
                context: "CFDP source and destination entity ID widths must match",
            });
        }
        Ok(Self {
            pdu_type,
            direction,
            trans_mode: config.trans_mode,
            crc_flag: config.crc_flag,
            large_file_flag: config.large_file_flag,
            pdu_data_field_len,
            seg_ctrl: config.seg_ctrl,
            seg_meta_flag: config.seg_meta_flag,
            source_entity_id: config.source_entity_id.clone(),
            transaction_seq_num: config.transaction_seq_num.clone(),
            dest_entity_id: config.dest_entity_id.clone(),
        })
    }

    pub fn entity_id_len(&self) -> OctetLen {
        OctetLen::from_byte_len(self.source_entity_id.len()).expect("validated at construction")
    }

    pub fn seq_num_len(&self) -> OctetLen {
        OctetLen::from_byte_len(self.transaction_seq_num.len()).expect("validated at construction")
    }

    pub fn fss_len(&self) -> FssLen {
        FssLen::from_large_file_flag(self.large_file_flag)
    }

    /// Octet length of the common header itself.
    pub fn header_len(&self) -> usize {
        4 + 2 * self.entity_id_len().len() + self.seq_num_len().len()
    }

    /// Full PDU length: `header_len + pdu_data_field_len`.
    pub fn packet_len(&self) -> usize {
        self.header_len() + self.pdu_data_field_len as usize
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.header_len());
        let octet0 = CFDP_VERSION << 5
            | (self.pdu_type as u8) << 4
            | (self.direction as u8) << 3
            | (self.trans_mode as u8) << 2
            | (self.crc_flag as u8) << 1
            | self.large_file_flag as u8;
        buf.push(octet0);
        buf.extend_from_slice(&self.pdu_data_field_len.to_be_bytes());
        let octet3 = (self.seg_ctrl as u8) << 7
            | self.entity_id_len().minus_1_bits() << 4
            | (self.seg_meta_flag as u8) << 3
            | self.seq_num_len().minus_1_bits();
        buf.push(octet3);
        buf.extend(self.source_entity_id.pack());
        buf.extend(self.transaction_seq_num.pack());
        buf.extend(self.dest_entity_id.pack());
        buf
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(CodecError::BytesTooShort {
                expected: 4,
                actual: data.len(),
            });
        }
        let octet0 = data[0];
        let version = octet0 >> 5;
        if version != CFDP_VERSION {
            return Err(CodecError::UnsupportedVersion {
                found: version,
                expected: CFDP_VERSION,
            });
        }
        let pdu_type = if (octet0 >> 4) & 1 == 0 {
            PduType::FileDirective
        } else {
            PduType::FileData
        };
        let direction = if (octet0 >> 3) & 1 == 0 {
            Direction::TowardReceiver
        } else {
            Direction::TowardSender
        };
        let trans_mode = if (octet0 >> 2) & 1 == 0 {
            TransmissionMode::Acknowledged
        } else {
            TransmissionMode::Unacknowledged
        };
        let crc_flag = (octet0 >> 1) & 1 != 0;
        let large_file_flag = octet0 & 1 != 0;
        let pdu_data_field_len = u16::from_be_bytes([data[1], data[2]]);
        let octet3 = data[3];
        let seg_ctrl = if octet3 >> 7 == 0 {
            SegmentationControl::NoRecordBoundaries
        } else {
            SegmentationControl::WithRecordBoundaries
        };
        let entity_id_len = OctetLen::from_minus_1_bits((octet3 >> 4) & 0b111)?;
        let seg_meta_flag = (octet3 >> 3) & 1 != 0;
        let seq_num_len = OctetLen::from_minus_1_bits(octet3 & 0b111)?;

        let mut idx = 4;
        let read_field = |idx: &mut usize, len: OctetLen| -> Result<UnsignedByteField> {
            let len = len.len();
            if data.len() < *idx + len {
                return Err(CodecError::BytesTooShort {
                    expected: *idx + len,
                    actual: data.len(),
                });
            }
            let field = UnsignedByteField::unpack(&data[*idx..], len)?;
            *idx += len;
            Ok(field)
        };
        let source_entity_id = read_field(&mut idx, entity_id_len)?;
        let transaction_seq_num = read_field(&mut idx, seq_num_len)?;
        let dest_entity_id = read_field(&mut idx, entity_id_len)?;

        Ok(Self {
            pdu_type,
            direction,
            trans_mode,
            crc_flag,
            large_file_flag,
            pdu_data_field_len,
            seg_ctrl,
            seg_meta_flag,
            source_entity_id,
            transaction_seq_num,
            dest_entity_id,
        })
    }

    /// Verify `data` is at least [`Self::packet_len`] long, and (if
    /// `crc_flag` is set) that CRC-16 CCITT-FALSE over the whole PDU
    /// verifies to zero.
    #[cfg(feature = "crc")]
    pub fn verify_length_and_checksum(&self, data: &[u8]) -> Result<()> {
        let total = self.packet_len();
        if data.len() < total {
            return Err(CodecError::BytesTooShort {
                expected: total,
                actual: data.len(),
            });
        }
        if self.crc_flag {
            let computed = crc16_ccitt_false(&data[..total]);
            if computed != 0 {
                return Err(CodecError::InvalidCrc16 {
                    expected: 0,
                    computed,
                });
            }
        }
        Ok(())
    }

    /// Length-only fallback of [`Self::verify_length_and_checksum`] for
    /// builds without the `crc` feature; `crc_flag` cannot legitimately be
    /// set without it (see [`crate::cfdp::pdu::maybe_append_crc`]).
    #[cfg(not(feature = "crc"))]
    pub fn verify_length_and_checksum(&self, data: &[u8]) -> Result<()> {
        let total = self.packet_len();
        if data.len() < total {
            return Err(CodecError::BytesTooShort {
                expected: total,
                actual: data.len(),
            });
        }
        assert!(!self.crc_flag, "CRC flag set but the `crc` feature is disabled");
        Ok(())
    }
}

/// Pack a file-size-sensitive value into 4 or 8 big-endian octets per `len`.
pub fn pack_fss(value: u64, len: FssLen) -> Vec<u8> {
    match len {
        FssLen::Normal => (value as u32).to_be_bytes().to_vec(),
        FssLen::Large => value.to_be_bytes().to_vec(),
    }
}

/// Unpack a file-size-sensitive value from `data`, per `len`.
pub fn unpack_fss(data: &[u8], len: FssLen) -> Result<u64> {
    let width = len.len();
    if data.len() < width {
        return Err(CodecError::BytesTooShort {
            expected: width,
            actual: data.len(),
        });
    }
    Ok(match len {
        FssLen::Normal => u32::from_be_bytes(data[0..4].try_into().unwrap()) as u64,
        FssLen::Large => u64::from_be_bytes(data[0..8].try_into().unwrap()),
    })
}
