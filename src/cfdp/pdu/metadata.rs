//! Metadata PDU (CCSDS 727.0-B-5 §5.2.5): directive code 0x07.

use crate::cfdp::header::{pack_fss, unpack_fss, Direction, PduConfig, PduHeader, PduType};
use crate::cfdp::lv::Lv;
use crate::cfdp::pdu::{crc_len, maybe_append_crc, parameter_field, DirectiveCode};
use crate::cfdp::tlv::Tlv;
use crate::error::{CodecError, Result};

/// Opens a CFDP transaction: file metadata, the source/destination file
/// names, and any filestore-request / message-to-user / fault-handler-
/// override / flow-label option TLVs.
#[derive(Clone, Debug, PartialEq)]
pub struct MetadataPdu {
    pub pdu_header: PduHeader,
    pub closure_requested: bool,
    /// 4-bit checksum algorithm identifier, CCSDS 727.0-B-5 Annex D.
    pub checksum_type: u8,
    pub file_size: u64,
    pub source_file_name: Lv,
    pub dest_file_name: Lv,
    pub options: Vec<Tlv>,
}

impl MetadataPdu {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &PduConfig,
        closure_requested: bool,
        checksum_type: u8,
        file_size: u64,
        source_file_name: Lv,
        dest_file_name: Lv,
        options: Vec<Tlv>,
    ) -> Result<Self> {
        let data_field_len = 1
            + config.fss_len().len()
            + source_file_name.packet_len()
            + dest_file_name.packet_len()
            + options.iter().map(Tlv::packet_len).sum::<usize>()
            + crc_len(config.crc_flag);
        let pdu_header = PduHeader::new(
            PduType::FileDirective,
            Direction::TowardReceiver,
            data_field_len as u16,
            config,
        )?;
        Ok(Self {
            pdu_header,
            closure_requested,
            checksum_type: checksum_type & 0x0F,
            file_size,
            source_file_name,
            dest_file_name,
            options,
        })
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = self.pdu_header.pack();
        buf.push(DirectiveCode::Metadata as u8);
        buf.push((self.closure_requested as u8) << 6 | (self.checksum_type & 0x0F));
        buf.extend(pack_fss(self.file_size, self.pdu_header.fss_len()));
        buf.extend(self.source_file_name.pack());
        buf.extend(self.dest_file_name.pack());
        for option in &self.options {
            buf.extend(option.pack());
        }
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
        if directive != DirectiveCode::Metadata {
            return Err(CodecError::InvalidDirectiveCode { value: field[0] });
        }
        let closure_requested = (field[1] >> 6) & 1 != 0;
        let checksum_type = field[1] & 0x0F;
        let mut idx = 2;
        let file_size = unpack_fss(&field[idx..], fss_len)?;
        idx += fss_len.len();
        let source_file_name = Lv::unpack(&field[idx..])?;
        idx += source_file_name.packet_len();
        let dest_file_name = Lv::unpack(&field[idx..])?;
        idx += dest_file_name.packet_len();
        let mut options = Vec::new();
        while idx < field.len() {
            let tlv = Tlv::unpack(&field[idx..])?;
            idx += tlv.packet_len();
            options.push(tlv);
        }
        Ok(Self {
            pdu_header,
            closure_requested,
            checksum_type,
            file_size,
            source_file_name,
            dest_file_name,
            options,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::byte_field::ByteFieldU16;
    use crate::cfdp::header::{SegmentationControl, TransmissionMode};
    use crate::cfdp::tlv::{FaultHandlerOverrideTlv, FileStoreRequestTlv, FilestoreActionCode, FlowLabelTlv};

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
    fn roundtrip_with_options() {
        let pdu = MetadataPdu::new(
            &sample_config(),
            true,
            0,
            4096,
            Lv::new(b"src.bin").unwrap(),
            Lv::new(b"dest.bin").unwrap(),
            vec![Tlv::FlowLabel(FlowLabelTlv { data: vec![0xAA] })],
        )
        .unwrap();
        let packed = pdu.pack();
        assert_eq!(packed.len(), pdu.pdu_header.packet_len());
        assert_eq!(MetadataPdu::unpack(&packed).unwrap(), pdu);
    }

    #[test]
    fn roundtrip_with_two_option_tlvs_matches_serialized_size() {
        let source_file_name = Lv::new(b"src.bin").unwrap();
        let dest_file_name = Lv::new(b"dest.bin").unwrap();
        let filestore_request = Tlv::FilestoreRequest(FileStoreRequestTlv::new(
            FilestoreActionCode::DeleteFile,
            Lv::new(b"a.txt").unwrap(),
            None,
        ));
        let fault_handler_override = Tlv::FaultHandlerOverride(FaultHandlerOverrideTlv::new(0x4, 0x2));
        let options = vec![filestore_request, fault_handler_override];
        let pdu = MetadataPdu::new(
            &sample_config(),
            true,
            0,
            4096,
            source_file_name.clone(),
            dest_file_name.clone(),
            options.clone(),
        )
        .unwrap();
        let packed = pdu.pack();
        // directive code (1) + closure/reserved/checksum-type byte (1) + FSS file size.
        let expected_len = pdu.pdu_header.header_len()
            + 1
            + 1
            + pdu.pdu_header.fss_len().len()
            + source_file_name.packet_len()
            + dest_file_name.packet_len()
            + options.iter().map(Tlv::packet_len).sum::<usize>();
        assert_eq!(packed.len(), expected_len);
        assert_eq!(packed.len(), pdu.pdu_header.packet_len());
        assert_eq!(MetadataPdu::unpack(&packed).unwrap(), pdu);
    }

    #[test]
    fn roundtrip_without_options() {
        let pdu = MetadataPdu::new(
            &sample_config(),
            false,
            0,
            0,
            Lv::empty(),
            Lv::empty(),
            vec![],
        )
        .unwrap();
        let packed = pdu.pack();
        assert_eq!(MetadataPdu::unpack(&packed).unwrap(), pdu);
    }

    #[test]
    fn crc_enabled_roundtrips_with_options() {
        let mut config = sample_config();
        config.crc_flag = true;
        let pdu = MetadataPdu::new(
            &config,
            true,
            0,
            4096,
            Lv::new(b"src.bin").unwrap(),
            Lv::new(b"dest.bin").unwrap(),
            vec![Tlv::FlowLabel(FlowLabelTlv { data: vec![0xAA] })],
        )
        .unwrap();
        let packed = pdu.pack();
        assert_eq!(packed.len(), pdu.pdu_header.packet_len());
        assert_eq!(crate::crc::crc16_ccitt_false(&packed), 0);
        assert_eq!(MetadataPdu::unpack(&packed).unwrap(), pdu);
    }
}
