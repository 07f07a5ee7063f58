//! Prompt PDU (CCSDS 727.0-B-5 §5.2.7): directive code 0x09.

use crate::cfdp::header::{Direction, PduConfig, PduHeader, PduType};
use crate::cfdp::pdu::{crc_len, maybe_append_crc, parameter_field, DirectiveCode, ResponseRequired};
use crate::error::{CodecError, Result};

const DATA_FIELD_LEN: usize = 2;

/// Asks the transaction's peer to issue either a NAK or a KeepAlive PDU.
#[derive(Clone, Debug, PartialEq)]
pub struct PromptPdu {
    pub pdu_header: PduHeader,
    pub response_required: ResponseRequired,
}

impl PromptPdu {
    pub fn new(config: &PduConfig, direction: Direction, response_required: ResponseRequired) -> Result<Self> {
        let data_field_len = DATA_FIELD_LEN + crc_len(config.crc_flag);
        let pdu_header = PduHeader::new(PduType::FileDirective, direction, data_field_len as u16, config)?;
        Ok(Self {
            pdu_header,
            response_required,
        })
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = self.pdu_header.pack();
        buf.push(DirectiveCode::Prompt as u8);
        buf.push((self.response_required as u8) << 7);
        maybe_append_crc(&mut buf, self.pdu_header.crc_flag);
        buf
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        let pdu_header = PduHeader::unpack(data)?;
        let field = parameter_field(&pdu_header, data)?;
        if field.len() < DATA_FIELD_LEN {
            return Err(CodecError::BytesTooShort {
                expected: pdu_header.header_len() + DATA_FIELD_LEN,
                actual: data.len(),
            });
        }
        let directive = DirectiveCode::try_from_u8(field[0])?;
        if directive != DirectiveCode::Prompt {
            return Err(CodecError::InvalidDirectiveCode { value: field[0] });
        }
        let response_required = if field[1] >> 7 == 0 {
            ResponseRequired::Nak
        } else {
            ResponseRequired::KeepAlive
        };
        Ok(Self {
            pdu_header,
            response_required,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::byte_field::ByteFieldU16;
    use crate::cfdp::header::{SegmentationControl, TransmissionMode};
    use rstest::rstest;

    fn sample_config() -> PduConfig {
        PduConfig {
            source_entity_id: ByteFieldU16::new(1),
            dest_entity_id: ByteFieldU16::new(2),
            transaction_seq_num: ByteFieldU16::new(9),
            trans_mode: TransmissionMode::Acknowledged,
            crc_flag: false,
            large_file_flag: false,
            seg_ctrl: SegmentationControl::NoRecordBoundaries,
            seg_meta_flag: false,
        }
    }

    #[rstest]
    #[case(ResponseRequired::Nak)]
    #[case(ResponseRequired::KeepAlive)]
    fn roundtrip(#[case] response_required: ResponseRequired) {
        let pdu = PromptPdu::new(&sample_config(), Direction::TowardReceiver, response_required).unwrap();
        let packed = pdu.pack();
        assert_eq!(packed.len(), pdu.pdu_header.packet_len());
        assert_eq!(PromptPdu::unpack(&packed).unwrap(), pdu);
    }

    #[test]
    fn crc_enabled_roundtrips() {
        let mut config = sample_config();
        config.crc_flag = true;
        let pdu = PromptPdu::new(&config, Direction::TowardReceiver, ResponseRequired::Nak).unwrap();
        let packed = pdu.pack();
        assert_eq!(packed.len(), pdu.pdu_header.packet_len());
        assert_eq!(crate::crc::crc16_ccitt_false(&packed), 0);
        assert_eq!(PromptPdu::unpack(&packed).unwrap(), pdu);
    }
}
