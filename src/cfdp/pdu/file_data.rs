//! File-Data PDU (CCSDS 727.0-B-5 §5.3): the only PDU type with
//! `pdu_type == FileData`. Carries no directive code.

use crate::cfdp::header::{pack_fss, unpack_fss, Direction, PduConfig, PduHeader, PduType};
use crate::cfdp::pdu::{crc_len, maybe_append_crc, parameter_field, RecordContinuationState};
use crate::error::{CodecError, Result};

/// Segment-boundary metadata, present only when the transaction config sets
/// `seg_meta_flag`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentMetadata {
    pub record_continuation_state: RecordContinuationState,
    pub metadata: Vec<u8>,
}

impl SegmentMetadata {
    const MAX_METADATA_LEN: usize = 0b0011_1111;

    pub fn new(record_continuation_state: RecordContinuationState, metadata: Vec<u8>) -> Result<Self> {
        if metadata.len() > Self::MAX_METADATA_LEN {
            return Err(CodecError::InvalidFieldLength {
                context: "segment metadata exceeds the 6-bit length field",
            });
        }
        Ok(Self {
            record_continuation_state,
            metadata,
        })
    }

    fn packet_len(&self) -> usize {
        1 + self.metadata.len()
    }

    fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.packet_len());
        buf.push((self.record_continuation_state as u8) << 6 | self.metadata.len() as u8);
        buf.extend_from_slice(&self.metadata);
        buf
    }

    fn unpack(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(CodecError::BytesTooShort { expected: 1, actual: 0 });
        }
        let record_continuation_state = RecordContinuationState::try_from_u8(data[0] >> 6);
        let len = (data[0] & 0x3F) as usize;
        if data.len() < 1 + len {
            return Err(CodecError::BytesTooShort {
                expected: 1 + len,
                actual: data.len(),
            });
        }
        Ok(Self {
            record_continuation_state,
            metadata: data[1..1 + len].to_vec(),
        })
    }
}

/// A segment of raw file content, placed at `offset` bytes into the file.
#[derive(Clone, Debug, PartialEq)]
pub struct FileDataPdu {
    pub pdu_header: PduHeader,
    pub segment_metadata: Option<SegmentMetadata>,
    pub offset: u64,
    pub file_data: Vec<u8>,
}

impl FileDataPdu {
    pub fn new(
        config: &PduConfig,
        segment_metadata: Option<SegmentMetadata>,
        offset: u64,
        file_data: Vec<u8>,
    ) -> Result<Self> {
        let segment_metadata = if config.seg_meta_flag { segment_metadata } else { None };
        let data_field_len = segment_metadata.as_ref().map(SegmentMetadata::packet_len).unwrap_or(0)
            + config.fss_len().len()
            + file_data.len()
            + crc_len(config.crc_flag);
        let pdu_header = PduHeader::new(PduType::FileData, Direction::TowardReceiver, data_field_len as u16, config)?;
        Ok(Self {
            pdu_header,
            segment_metadata,
            offset,
            file_data,
        })
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = self.pdu_header.pack();
        if let Some(segment_metadata) = &self.segment_metadata {
            buf.extend(segment_metadata.pack());
        }
        buf.extend(pack_fss(self.offset, self.pdu_header.fss_len()));
        buf.extend_from_slice(&self.file_data);
        maybe_append_crc(&mut buf, self.pdu_header.crc_flag);
        buf
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        let pdu_header = PduHeader::unpack(data)?;
        if pdu_header.pdu_type != PduType::FileData {
            return Err(CodecError::InvalidFieldValue {
                field: "pdu_type",
                value: 0,
            });
        }
        let field = parameter_field(&pdu_header, data)?;
        let fss_len = pdu_header.fss_len();
        let mut idx = 0;
        let segment_metadata = if pdu_header.seg_meta_flag {
            let segment_metadata = SegmentMetadata::unpack(&field[idx..])?;
            idx += segment_metadata.packet_len();
            Some(segment_metadata)
        } else {
            None
        };
        if field.len() < idx + fss_len.len() {
            return Err(CodecError::BytesTooShort {
                expected: pdu_header.header_len() + idx + fss_len.len(),
                actual: data.len(),
            });
        }
        let offset = unpack_fss(&field[idx..], fss_len)?;
        idx += fss_len.len();
        let file_data = field[idx..].to_vec();
        Ok(Self {
            pdu_header,
            segment_metadata,
            offset,
            file_data,
        })
    }
}

/// The largest file-data payload that fits a PDU of at most `max_packet_len`
/// octets, given a header and (optional) segment metadata overhead.
pub fn max_file_data_length(
    pdu_header: &PduHeader,
    segment_metadata_len: usize,
    max_packet_len: usize,
) -> usize {
    let fixed_len = pdu_header.header_len() + segment_metadata_len + pdu_header.fss_len().len();
    max_packet_len.saturating_sub(fixed_len)
}
