//! Dispatches a raw buffer to the correct PDU decoder by inspecting the
//! common header's `pdu_type` and (for file-directive PDUs) the directive
//! code that immediately follows it.

use crate::cfdp::header::PduHeader;
use crate::cfdp::pdu::{
    AckPdu, DirectiveCode, EofPdu, FileDataPdu, FinishedPdu, KeepAlivePdu, MetadataPdu, NakPdu, PromptPdu,
};
use crate::error::{CodecError, Result};

/// Any decoded CFDP PDU.
#[derive(Clone, Debug, PartialEq)]
pub enum Pdu {
    Eof(EofPdu),
    Finished(FinishedPdu),
    Ack(AckPdu),
    Metadata(MetadataPdu),
    Nak(NakPdu),
    Prompt(PromptPdu),
    KeepAlive(KeepAlivePdu),
    FileData(FileDataPdu),
}

impl Pdu {
    pub fn pdu_header(&self) -> &PduHeader {
        match self {
            Self::Eof(p) => &p.pdu_header,
            Self::Finished(p) => &p.pdu_header,
            Self::Ack(p) => &p.pdu_header,
            Self::Metadata(p) => &p.pdu_header,
            Self::Nak(p) => &p.pdu_header,
            Self::Prompt(p) => &p.pdu_header,
            Self::KeepAlive(p) => &p.pdu_header,
            Self::FileData(p) => &p.pdu_header,
        }
    }

    pub fn pack(&self) -> Vec<u8> {
        match self {
            Self::Eof(p) => p.pack(),
            Self::Finished(p) => p.pack(),
            Self::Ack(p) => p.pack(),
            Self::Metadata(p) => p.pack(),
            Self::Nak(p) => p.pack(),
            Self::Prompt(p) => p.pack(),
            Self::KeepAlive(p) => p.pack(),
            Self::FileData(p) => p.pack(),
        }
    }
}

/// Stateless entry point for decoding a CFDP PDU without knowing its type in
/// advance.
pub struct PduFactory;

impl PduFactory {
    pub fn from_raw(data: &[u8]) -> Result<Pdu> {
        let pdu_header = PduHeader::unpack(data)?;
        if pdu_header.pdu_type == crate::cfdp::header::PduType::FileData {
            return Ok(Pdu::FileData(FileDataPdu::unpack(data)?));
        }
        let directive_byte = data
            .get(pdu_header.header_len())
            .copied()
            .ok_or(CodecError::BytesTooShort {
                expected: pdu_header.header_len() + 1,
                actual: data.len(),
            })?;
        Ok(match DirectiveCode::try_from_u8(directive_byte)? {
            DirectiveCode::Eof => Pdu::Eof(EofPdu::unpack(data)?),
            DirectiveCode::Finished => Pdu::Finished(FinishedPdu::unpack(data)?),
            DirectiveCode::Ack => Pdu::Ack(AckPdu::unpack(data)?),
            DirectiveCode::Metadata => Pdu::Metadata(MetadataPdu::unpack(data)?),
            DirectiveCode::Nak => Pdu::Nak(NakPdu::unpack(data)?),
            DirectiveCode::Prompt => Pdu::Prompt(PromptPdu::unpack(data)?),
            DirectiveCode::KeepAlive => Pdu::KeepAlive(KeepAlivePdu::unpack(data)?),
        })
    }
}
