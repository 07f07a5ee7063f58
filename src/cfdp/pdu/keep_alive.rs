//! KeepAlive PDU (CCSDS 727.0-B-5 §5.2.8): directive code 0x0C.

use crate::cfdp::header::{pack_fss, unpack_fss, Direction, PduConfig, PduHeader, PduType};
use crate::cfdp::pdu::{crc_len, maybe_append_crc, parameter_field, DirectiveCode};
use crate::error::{CodecError, Result};

/// Reports the sending entity's cumulative file-reception progress while a
/// transaction is otherwise idle.
#[derive(Clone, Debug, PartialEq)]
pub struct KeepAlivePdu {
    pub pdu_header: PduHeader,
    pub progress: u64,
}

impl KeepAlivePdu {
    pub fn new(config: &PduConfig, direction: Direction, progress: u64) -> Result<Self> {
        let data_field_len = 1 + config.fss_len().len() + crc_len(config.crc_flag);
        let pdu_header = PduHeader::new(PduType::FileDirective, direction, data_field_len as u16, config)?;
        Ok(Self { pdu_header, progress })
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = self.pdu_header.pack();
        buf.push(DirectiveCode::KeepAlive as u8);
        buf.extend(pack_fss(self.progress, self.pdu_header.fss_len()));
        maybe_append_crc(&mut buf, self.pdu_header.crc_flag);
        buf
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        let pdu_header = PduHeader::unpack(data)?;
        let field = parameter_field(&pdu_header, data)?;
        let fss_len = pdu_header.fss_len();
        if field.len() < 1 + fss_len.len() {
            return Err(CodecError::BytesTooShort {
                expected: pdu_header.header_len() + 1 + fss_len.len(),
                actual: data.len(),
            });
        }
        let directive = DirectiveCode::try_from_u8(field[0])?;
        if directive != DirectiveCode::KeepAlive {
            return Err(CodecError::InvalidDirectiveCode { value: field[0] });
        }
        let progress = unpack_fss(&field[1..], fss_len)?;
        Ok(Self { pdu_header, progress })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::byte_field::ByteFieldU16;
    use crate::cfdp::header::{SegmentationControl, TransmissionMode};

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

    #[test]
    fn roundtrip() {
        let pdu = KeepAlivePdu::new(&sample_config(), Direction::TowardSender, 12_345).unwrap();
        let packed = pdu.pack();
        assert_eq!(packed.len(), pdu.pdu_header.packet_len());
        assert_eq!(KeepAlivePdu::unpack(&packed).unwrap(), pdu);
    }

    #[test]
    fn crc_enabled_roundtrips() {
        let mut config = sample_config();
        config.crc_flag = true;
        let pdu = KeepAlivePdu::new(&config, Direction::TowardSender, 12_345).unwrap();
        let packed = pdu.pack();
        assert_eq!(packed.len(), pdu.pdu_header.packet_len());
        assert_eq!(crate::crc::crc16_ccitt_false(&packed), 0);
        assert_eq!(KeepAlivePdu::unpack(&packed).unwrap(), pdu);
    }
}
