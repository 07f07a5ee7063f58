//! NAK PDU (CCSDS 727.0-B-5 §5.2.6): directive code 0x08.

use crate::cfdp::header::{pack_fss, unpack_fss, Direction, FssLen, PduConfig, PduHeader, PduType};
use crate::cfdp::pdu::{crc_len, maybe_append_crc, parameter_field, DirectiveCode};
use crate::error::{CodecError, Result};

/// A single gap in file or metadata delivery: `start_offset == end_offset == 0`
/// denotes a request for the Metadata PDU itself, per CCSDS 727.0-B-5 §5.2.6.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentRequest {
    pub start_offset: u64,
    pub end_offset: u64,
}

/// Requests retransmission of missing file-data segments (and optionally the
/// Metadata PDU) within `[start_of_scope, end_of_scope)`.
#[derive(Clone, Debug, PartialEq)]
pub struct NakPdu {
    pub pdu_header: PduHeader,
    pub start_of_scope: u64,
    pub end_of_scope: u64,
    pub segment_requests: Vec<SegmentRequest>,
}

impl NakPdu {
    pub fn new(
        config: &PduConfig,
        start_of_scope: u64,
        end_of_scope: u64,
        segment_requests: Vec<SegmentRequest>,
    ) -> Result<Self> {
        let fss_len = config.fss_len();
        let data_field_len = 1
            + 2 * fss_len.len()
            + segment_requests.len() * 2 * fss_len.len()
            + crc_len(config.crc_flag);
        let pdu_header = PduHeader::new(
            PduType::FileDirective,
            Direction::TowardSender,
            data_field_len as u16,
            config,
        )?;
        Ok(Self {
            pdu_header,
            start_of_scope,
            end_of_scope,
            segment_requests,
        })
    }

    pub fn pack(&self) -> Vec<u8> {
        let fss_len = self.pdu_header.fss_len();
        let mut buf = self.pdu_header.pack();
        buf.push(DirectiveCode::Nak as u8);
        buf.extend(pack_fss(self.start_of_scope, fss_len));
        buf.extend(pack_fss(self.end_of_scope, fss_len));
        for request in &self.segment_requests {
            buf.extend(pack_fss(request.start_offset, fss_len));
            buf.extend(pack_fss(request.end_offset, fss_len));
        }
        maybe_append_crc(&mut buf, self.pdu_header.crc_flag);
        buf
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        let pdu_header = PduHeader::unpack(data)?;
        let field = parameter_field(&pdu_header, data)?;
        let fss_len = pdu_header.fss_len();
        if field.len() < 1 + 2 * fss_len.len() {
            return Err(CodecError::BytesTooShort {
                expected: pdu_header.header_len() + 1 + 2 * fss_len.len(),
                actual: data.len(),
            });
        }
        let directive = DirectiveCode::try_from_u8(field[0])?;
        if directive != DirectiveCode::Nak {
            return Err(CodecError::InvalidDirectiveCode { value: field[0] });
        }
        let mut idx = 1;
        let start_of_scope = unpack_fss(&field[idx..], fss_len)?;
        idx += fss_len.len();
        let end_of_scope = unpack_fss(&field[idx..], fss_len)?;
        idx += fss_len.len();
        let pair_len = 2 * fss_len.len();
        let remaining = &field[idx..];
        if remaining.len() % pair_len != 0 {
            return Err(CodecError::InvalidFieldLength {
                context: "NAK segment request list length is not a multiple of the FSS pair width",
            });
        }
        let mut segment_requests = Vec::with_capacity(remaining.len() / pair_len);
        for chunk in remaining.chunks_exact(pair_len) {
            let start_offset = unpack_fss(chunk, fss_len)?;
            let end_offset = unpack_fss(&chunk[fss_len.len()..], fss_len)?;
            segment_requests.push(SegmentRequest { start_offset, end_offset });
        }
        Ok(Self {
            pdu_header,
            start_of_scope,
            end_of_scope,
            segment_requests,
        })
    }
}

/// The largest number of segment requests a NAK PDU can carry while keeping
/// its total packed length at or under `max_packet_len`.
pub fn max_seg_requests_for_max_packet_size(
    pdu_header: &PduHeader,
    max_packet_len: usize,
) -> usize {
    let fss_len: FssLen = pdu_header.fss_len();
    let fixed_len = pdu_header.header_len() + 1 + 2 * fss_len.len();
    if max_packet_len <= fixed_len {
        return 0;
    }
    (max_packet_len - fixed_len) / (2 * fss_len.len())
}
