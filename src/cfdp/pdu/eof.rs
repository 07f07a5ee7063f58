//! EOF PDU (CCSDS 727.0-B-5 §5.2.2): directive code 0x04.

use crate::cfdp::header::{pack_fss, unpack_fss, FssLen, PduConfig, PduHeader};
use crate::cfdp::header::{Direction, PduType};
use crate::cfdp::pdu::{crc_len, maybe_append_crc, parameter_field, ConditionCode, DirectiveCode};
use crate::cfdp::tlv::{EntityIdTlv, Tlv};
use crate::error::{CodecError, Result};

/// Signals the end of a file transfer, carrying the condition code, the
/// whole-file checksum and the transmitted file size. `fault_location` is
/// populated when `condition_code` is a fault code per
/// [`ConditionCode::allows_fault_location`].
#[derive(Clone, Debug, PartialEq)]
pub struct EofPdu {
    pub pdu_header: PduHeader,
    pub condition_code: ConditionCode,
    pub checksum: u32,
    pub file_size: u64,
    pub fault_location: Option<EntityIdTlv>,
}

impl EofPdu {
    pub fn new(
        config: &PduConfig,
        condition_code: ConditionCode,
        checksum: u32,
        file_size: u64,
        fault_location: Option<EntityIdTlv>,
    ) -> Result<Self> {
        let fault_location = if condition_code.allows_fault_location() {
            fault_location
        } else {
            None
        };
        let data_field_len =
            Self::data_field_len(config.fss_len(), &fault_location) + crc_len(config.crc_flag);
        let pdu_header = PduHeader::new(
            PduType::FileDirective,
            Direction::TowardReceiver,
            data_field_len as u16,
            config,
        )?;
        Ok(Self {
            pdu_header,
            condition_code,
            checksum,
            file_size,
            fault_location,
        })
    }

    fn data_field_len(fss_len: FssLen, fault_location: &Option<EntityIdTlv>) -> usize {
        let tlv_len = fault_location
            .as_ref()
            .map(|tlv| Tlv::EntityId(tlv.clone()).packet_len())
            .unwrap_or(0);
        1 + 1 + 4 + fss_len.len() + tlv_len
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = self.pdu_header.pack();
        buf.push(DirectiveCode::Eof as u8);
        buf.push((self.condition_code as u8) << 4);
        buf.extend_from_slice(&self.checksum.to_be_bytes());
        buf.extend(pack_fss(self.file_size, self.pdu_header.fss_len()));
        if let Some(fault_location) = &self.fault_location {
            buf.extend(Tlv::EntityId(fault_location.clone()).pack());
        }
        maybe_append_crc(&mut buf, self.pdu_header.crc_flag);
        buf
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        let pdu_header = PduHeader::unpack(data)?;
        let header_len = pdu_header.header_len();
        let field = parameter_field(&pdu_header, data)?;
        if field.len() < 6 {
            return Err(CodecError::BytesTooShort {
                expected: header_len + 6,
                actual: data.len(),
            });
        }
        let directive = DirectiveCode::try_from_u8(field[0])?;
        if directive != DirectiveCode::Eof {
            return Err(CodecError::InvalidDirectiveCode { value: field[0] });
        }
        let condition_code = ConditionCode::try_from_u8(field[1] >> 4)?;
        let checksum = u32::from_be_bytes(field[2..6].try_into().unwrap());
        let fss_len = pdu_header.fss_len();
        let file_size = unpack_fss(&field[6..], fss_len)?;
        let mut idx = 6 + fss_len.len();
        let fault_location = if idx < field.len() {
            match Tlv::unpack(&field[idx..])? {
                Tlv::EntityId(tlv) => {
                    idx += Tlv::EntityId(tlv.clone()).packet_len();
                    Some(tlv)
                }
                other => {
                    return Err(CodecError::InvalidTlvType {
                        found: other.tlv_type().as_u8(),
                        expected: Some(crate::cfdp::tlv::TlvType::EntityId.as_u8()),
                    })
                }
            }
        } else {
            None
        };
        let _ = idx;
        Ok(Self {
            pdu_header,
            condition_code,
            checksum,
            file_size,
            fault_location,
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
    #[case(ConditionCode::NoError, None)]
    #[case(ConditionCode::FileChecksumFailure, Some(EntityIdTlv::new(ByteFieldU16::new(7))))]
    fn roundtrip(#[case] condition_code: ConditionCode, #[case] fault_location: Option<EntityIdTlv>) {
        let pdu = EofPdu::new(&sample_config(), condition_code, 0xDEAD_BEEF, 1024, fault_location).unwrap();
        let packed = pdu.pack();
        assert_eq!(packed.len(), pdu.pdu_header.packet_len());
        let recovered = EofPdu::unpack(&packed).unwrap();
        assert_eq!(recovered, pdu);
    }

    #[test]
    fn no_error_condition_drops_fault_location() {
        let pdu = EofPdu::new(
            &sample_config(),
            ConditionCode::NoError,
            0,
            0,
            Some(EntityIdTlv::new(ByteFieldU16::new(3))),
        )
        .unwrap();
        assert!(pdu.fault_location.is_none());
    }

    #[test]
    fn large_file_flag_widens_file_size_field() {
        let mut config = sample_config();
        config.large_file_flag = true;
        let pdu = EofPdu::new(&config, ConditionCode::NoError, 0, u64::MAX, None).unwrap();
        let packed = pdu.pack();
        let recovered = EofPdu::unpack(&packed).unwrap();
        assert_eq!(recovered.file_size, u64::MAX);
    }

    #[test]
    fn crc_enabled_roundtrips_and_detects_corruption() {
        let mut config = sample_config();
        config.crc_flag = true;
        let pdu = EofPdu::new(&config, ConditionCode::NoError, 0xAABBCCDD, 4096, None).unwrap();
        let packed = pdu.pack();
        assert_eq!(packed.len(), pdu.pdu_header.packet_len());
        assert_eq!(crate::crc::crc16_ccitt_false(&packed), 0);
        assert_eq!(EofPdu::unpack(&packed).unwrap(), pdu);

        let mut corrupted = packed.clone();
        let last = corrupted.len() - 1;
        corrupted[last] ^= 0xFF;
        assert!(matches!(
            EofPdu::unpack(&corrupted),
            Err(CodecError::InvalidCrc16 { .. })
        ));
    }
}
