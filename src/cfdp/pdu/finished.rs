//! Finished PDU (CCSDS 727.0-B-5 §5.2.3): directive code 0x05.

use crate::cfdp::header::{Direction, PduConfig, PduHeader, PduType};
use crate::cfdp::pdu::{
    crc_len, maybe_append_crc, parameter_field, ConditionCode, DeliveryCode, DirectiveCode, FileStatus,
};
use crate::cfdp::tlv::{EntityIdTlv, FileStoreResponseTlv, Tlv, TlvType};
use crate::error::{CodecError, Result};

/// Reports the outcome of a file transfer: delivery and filestore-retention
/// status, any filestore responses that were run, and (on a fault) the
/// entity that raised it.
///
/// TLVs following the fixed fields must each be a filestore-response TLV,
/// except at most one trailing fault-location EntityId TLV. Any other TLV
/// type is rejected outright rather than silently reinterpreted.
#[derive(Clone, Debug, PartialEq)]
pub struct FinishedPdu {
    pub pdu_header: PduHeader,
    pub condition_code: ConditionCode,
    pub delivery_code: DeliveryCode,
    pub file_status: FileStatus,
    pub filestore_responses: Vec<FileStoreResponseTlv>,
    pub fault_location: Option<EntityIdTlv>,
}

impl FinishedPdu {
    pub fn new(
        config: &PduConfig,
        condition_code: ConditionCode,
        delivery_code: DeliveryCode,
        file_status: FileStatus,
        filestore_responses: Vec<FileStoreResponseTlv>,
        fault_location: Option<EntityIdTlv>,
    ) -> Result<Self> {
        let fault_location = if condition_code.allows_fault_location() {
            fault_location
        } else {
            None
        };
        let data_field_len = 2
            + filestore_responses
                .iter()
                .map(|r| Tlv::FilestoreResponse(r.clone()).packet_len())
                .sum::<usize>()
            + fault_location
                .as_ref()
                .map(|f| Tlv::EntityId(f.clone()).packet_len())
                .unwrap_or(0)
            + crc_len(config.crc_flag);
        let pdu_header = PduHeader::new(
            PduType::FileDirective,
            Direction::TowardSender,
            data_field_len as u16,
            config,
        )?;
        Ok(Self {
            pdu_header,
            condition_code,
            delivery_code,
            file_status,
            filestore_responses,
            fault_location,
        })
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = self.pdu_header.pack();
        buf.push(DirectiveCode::Finished as u8);
        buf.push(
            (self.condition_code as u8) << 4 | (self.delivery_code as u8) << 3 | (self.file_status as u8 & 0b11),
        );
        for response in &self.filestore_responses {
            buf.extend(Tlv::FilestoreResponse(response.clone()).pack());
        }
        if let Some(fault_location) = &self.fault_location {
            buf.extend(Tlv::EntityId(fault_location.clone()).pack());
        }
        maybe_append_crc(&mut buf, self.pdu_header.crc_flag);
        buf
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        let pdu_header = PduHeader::unpack(data)?;
        let field = parameter_field(&pdu_header, data)?;
        if field.len() < 2 {
            return Err(CodecError::BytesTooShort {
                expected: pdu_header.header_len() + 2,
                actual: data.len(),
            });
        }
        let directive = DirectiveCode::try_from_u8(field[0])?;
        if directive != DirectiveCode::Finished {
            return Err(CodecError::InvalidDirectiveCode { value: field[0] });
        }
        let condition_code = ConditionCode::try_from_u8(field[1] >> 4)?;
        let delivery_code = if (field[1] >> 3) & 1 == 0 {
            DeliveryCode::DataComplete
        } else {
            DeliveryCode::DataIncomplete
        };
        let file_status = FileStatus::try_from_u8(field[1])?;

        let mut idx = 2;
        let mut filestore_responses = Vec::new();
        let mut fault_location = None;
        while idx < field.len() {
            let tlv = Tlv::unpack(&field[idx..])?;
            idx += tlv.packet_len();
            match tlv {
                Tlv::FilestoreResponse(r) => filestore_responses.push(r),
                Tlv::EntityId(e) if idx == field.len() => fault_location = Some(e),
                other => {
                    return Err(CodecError::InvalidTlvType {
                        found: other.tlv_type().as_u8(),
                        expected: Some(TlvType::FilestoreResponse.as_u8()),
                    })
                }
            }
        }
        Ok(Self {
            pdu_header,
            condition_code,
            delivery_code,
            file_status,
            filestore_responses,
            fault_location,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::byte_field::ByteFieldU16;
    use crate::cfdp::header::{SegmentationControl, TransmissionMode};
    use crate::cfdp::lv::Lv;
    use crate::cfdp::tlv::FilestoreActionCode;

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

    fn sample_response() -> FileStoreResponseTlv {
        FileStoreResponseTlv {
            action_code: FilestoreActionCode::DeleteFile,
            status_code: 0,
            first_name: Lv::new(b"a.txt").unwrap(),
            second_name: None,
            filestore_message: Lv::empty(),
        }
    }

    #[test]
    fn roundtrip_with_responses_and_fault_location() {
        let pdu = FinishedPdu::new(
            &sample_config(),
            ConditionCode::FilestoreRejection,
            DeliveryCode::DataComplete,
            FileStatus::FileRetained,
            vec![sample_response()],
            Some(EntityIdTlv::new(ByteFieldU16::new(9))),
        )
        .unwrap();
        let packed = pdu.pack();
        assert_eq!(packed.len(), pdu.pdu_header.packet_len());
        assert_eq!(FinishedPdu::unpack(&packed).unwrap(), pdu);
    }

    #[test]
    fn no_error_condition_drops_fault_location() {
        let pdu = FinishedPdu::new(
            &sample_config(),
            ConditionCode::NoError,
            DeliveryCode::DataComplete,
            FileStatus::FileRetained,
            vec![],
            Some(EntityIdTlv::new(ByteFieldU16::new(9))),
        )
        .unwrap();
        assert!(pdu.fault_location.is_none());
    }

    #[test]
    fn rejects_unknown_tlv_type_instead_of_reinterpreting_it() {
        let pdu = FinishedPdu::new(
            &sample_config(),
            ConditionCode::NoError,
            DeliveryCode::DataComplete,
            FileStatus::FileRetained,
            vec![],
            None,
        )
        .unwrap();
        let mut packed = pdu.pack();
        packed.extend(Tlv::FlowLabel(crate::cfdp::tlv::FlowLabelTlv { data: vec![1, 2] }).pack());
        let header = PduHeader::unpack(&packed).unwrap();
        let new_len = (packed.len() - header.header_len()) as u16;
        packed[1] = (new_len.to_be_bytes())[0];
        packed[2] = (new_len.to_be_bytes())[1];
        assert!(FinishedPdu::unpack(&packed).is_err());
    }

    #[test]
    fn crc_enabled_roundtrips_with_responses() {
        let mut config = sample_config();
        config.crc_flag = true;
        let pdu = FinishedPdu::new(
            &config,
            ConditionCode::NoError,
            DeliveryCode::DataComplete,
            FileStatus::FileRetained,
            vec![sample_response()],
            None,
        )
        .unwrap();
        let packed = pdu.pack();
        assert_eq!(packed.len(), pdu.pdu_header.packet_len());
        assert_eq!(crate::crc::crc16_ccitt_false(&packed), 0);
        assert_eq!(FinishedPdu::unpack(&packed).unwrap(), pdu);
    }
}
