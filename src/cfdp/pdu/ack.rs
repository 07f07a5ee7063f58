//! ACK PDU (CCSDS 727.0-B-5 §5.2.4): directive code 0x06.

use crate::cfdp::header::{Direction, PduConfig, PduHeader, PduType};
use crate::cfdp::pdu::{crc_len, maybe_append_crc, parameter_field, ConditionCode, DirectiveCode, TransactionStatus};
use crate::error::{CodecError, Result};

/// Acknowledges receipt of either an EOF PDU or a Finished PDU.
#[derive(Clone, Debug, PartialEq)]
pub struct AckPdu {
    pub pdu_header: PduHeader,
    pub directive_code_acked: DirectiveCode,
    /// `0b0001` when acking a Finished PDU, `0b0000` when acking an EOF PDU.
    pub directive_subtype_acked: u8,
    pub condition_code: ConditionCode,
    pub transaction_status: TransactionStatus,
}

const DATA_FIELD_LEN: usize = 4;

impl AckPdu {
    /// The direction is forced to match the acked directive, per CCSDS
    /// 727.0-B-5 §5.2.4: an ACK of Finished travels toward the receiver's
    /// counterpart (the sender queried it), an ACK of EOF travels toward
    /// the sender.
    pub fn new(
        config: &PduConfig,
        directive_code_acked: DirectiveCode,
        condition_code: ConditionCode,
        transaction_status: TransactionStatus,
    ) -> Result<Self> {
        if !matches!(directive_code_acked, DirectiveCode::Eof | DirectiveCode::Finished) {
            return Err(CodecError::InvalidDirectiveCode {
                value: directive_code_acked as u8,
            });
        }
        let (direction, directive_subtype_acked) = if directive_code_acked == DirectiveCode::Finished {
            (Direction::TowardReceiver, 0b0001)
        } else {
            (Direction::TowardSender, 0b0000)
        };
        let data_field_len = DATA_FIELD_LEN + crc_len(config.crc_flag);
        let pdu_header = PduHeader::new(PduType::FileDirective, direction, data_field_len as u16, config)?;
        Ok(Self {
            pdu_header,
            directive_code_acked,
            directive_subtype_acked,
            condition_code,
            transaction_status,
        })
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = self.pdu_header.pack();
        buf.push(DirectiveCode::Ack as u8);
        buf.push((self.directive_code_acked as u8) << 4 | (self.directive_subtype_acked & 0x0F));
        buf.push((self.condition_code as u8) << 4);
        buf.push(self.transaction_status as u8 & 0b11);
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
        if directive != DirectiveCode::Ack {
            return Err(CodecError::InvalidDirectiveCode { value: field[0] });
        }
        let directive_code_acked = DirectiveCode::try_from_u8(field[1] >> 4)?;
        let directive_subtype_acked = field[1] & 0x0F;
        let condition_code = ConditionCode::try_from_u8(field[2] >> 4)?;
        let transaction_status = TransactionStatus::try_from_u8(field[3]);
        Ok(Self {
            pdu_header,
            directive_code_acked,
            directive_subtype_acked,
            condition_code,
            transaction_status,
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
    #[case(DirectiveCode::Eof)]
    #[case(DirectiveCode::Finished)]
    fn roundtrip(#[case] acked: DirectiveCode) {
        let pdu = AckPdu::new(&sample_config(), acked, ConditionCode::NoError, TransactionStatus::Active).unwrap();
        let packed = pdu.pack();
        assert_eq!(packed.len(), pdu.pdu_header.packet_len());
        assert_eq!(AckPdu::unpack(&packed).unwrap(), pdu);
    }

    #[test]
    fn rejects_acking_a_non_eof_non_finished_directive() {
        assert!(AckPdu::new(
            &sample_config(),
            DirectiveCode::Metadata,
            ConditionCode::NoError,
            TransactionStatus::Active,
        )
        .is_err());
    }

    #[test]
    fn acking_eof_packs_to_13_octets() {
        let config = PduConfig {
            source_entity_id: ByteFieldU16::new(1),
            dest_entity_id: ByteFieldU16::new(2),
            transaction_seq_num: crate::byte_field::ByteFieldU8::new(9),
            trans_mode: TransmissionMode::Acknowledged,
            crc_flag: false,
            large_file_flag: false,
            seg_ctrl: SegmentationControl::NoRecordBoundaries,
            seg_meta_flag: false,
        };
        let pdu = AckPdu::new(
            &config,
            DirectiveCode::Eof,
            ConditionCode::NoError,
            TransactionStatus::Terminated,
        )
        .unwrap();
        let packed = pdu.pack();
        assert_eq!(packed.len(), 13);
        assert_eq!(AckPdu::unpack(&packed).unwrap(), pdu);
    }

    #[test]
    fn crc_enabled_roundtrips() {
        let mut config = sample_config();
        config.crc_flag = true;
        let pdu = AckPdu::new(
            &config,
            DirectiveCode::Finished,
            ConditionCode::NoError,
            TransactionStatus::Terminated,
        )
        .unwrap();
        let packed = pdu.pack();
        assert_eq!(packed.len(), pdu.pdu_header.packet_len());
        assert_eq!(crate::crc::crc16_ccitt_false(&packed), 0);
        assert_eq!(AckPdu::unpack(&packed).unwrap(), pdu);
    }
}
