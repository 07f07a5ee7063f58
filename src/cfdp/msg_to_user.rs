//! Reserved CFDP messages: Message-to-User TLVs whose value begins with the
//! ASCII marker `"cfdp"` followed by a one-octet message-type discriminator
//! (CCSDS 727.0-B-5 Annex E).

use crate::byte_field::UnsignedByteField;
use crate::cfdp::lv::Lv;
use crate::cfdp::tlv::{MessageToUserTlv, Tlv};
use crate::error::{CodecError, Result};

const CFDP_MARKER: &[u8; 4] = b"cfdp";

/// The reserved-message sub-types named by this spec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReservedMessageType {
    ProxyPutRequest = 0x00,
    ProxyTransmissionMode = 0x04,
    ProxyPutResponse = 0x07,
    ProxyPutCancel = 0x09,
    OriginatingTransactionId = 0x0A,
    ProxyClosureRequest = 0x0B,
    DirectoryListingRequest = 0x10,
    DirectoryListingResponse = 0x11,
    DirectoryListingOptions = 0x15,
}

impl ReservedMessageType {
    fn try_from_u8(value: u8) -> Result<Self> {
        Ok(match value {
            0x00 => Self::ProxyPutRequest,
            0x04 => Self::ProxyTransmissionMode,
            0x07 => Self::ProxyPutResponse,
            0x09 => Self::ProxyPutCancel,
            0x0A => Self::OriginatingTransactionId,
            0x0B => Self::ProxyClosureRequest,
            0x10 => Self::DirectoryListingRequest,
            0x11 => Self::DirectoryListingResponse,
            0x15 => Self::DirectoryListingOptions,
            other => {
                return Err(CodecError::InvalidTlvType {
                    found: other,
                    expected: None,
                })
            }
        })
    }
}

/// Directory-listing options: recursive descent / include-hidden flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DirListingOptions {
    pub recursive: bool,
    pub all: bool,
}

/// An enriched view over a [`MessageToUserTlv`] that exposes the reserved
/// CFDP proxy-operation, originating-transaction-id and directory-listing
/// sub-parameters. Decoding is lazy: each accessor returns `None` when the
/// message is not the matching sub-variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReservedCfdpMessage {
    pub message_type: ReservedMessageType,
    /// Payload bytes following the 5-octet `"cfdp"` + type-ID marker.
    data: Vec<u8>,
}

impl ReservedCfdpMessage {
    pub fn new(message_type: ReservedMessageType, data: Vec<u8>) -> Self {
        Self { message_type, data }
    }

    pub fn pack_message_to_user(&self) -> MessageToUserTlv {
        let mut buf = Vec::with_capacity(5 + self.data.len());
        buf.extend_from_slice(CFDP_MARKER);
        buf.push(self.message_type as u8);
        buf.extend_from_slice(&self.data);
        MessageToUserTlv { data: buf }
    }

    pub fn pack(&self) -> Tlv {
        Tlv::MessageToUser(self.pack_message_to_user())
    }

    pub fn is_cfdp_message(msg: &MessageToUserTlv) -> bool {
        msg.data.len() >= 5 && &msg.data[0..4] == CFDP_MARKER
    }

    pub fn unpack_from_msg(msg: &MessageToUserTlv) -> Result<Self> {
        if !Self::is_cfdp_message(msg) {
            return Err(CodecError::InvalidTlvType {
                found: msg.data.first().copied().unwrap_or(0),
                expected: None,
            });
        }
        Ok(Self {
            message_type: ReservedMessageType::try_from_u8(msg.data[4])?,
            data: msg.data[5..].to_vec(),
        })
    }

    pub fn proxy_put_request_params(&self) -> Option<(Lv, Lv)> {
        if self.message_type != ReservedMessageType::ProxyPutRequest {
            return None;
        }
        let source = Lv::unpack(&self.data).ok()?;
        let rest = &self.data[source.packet_len()..];
        let dest = Lv::unpack(rest).ok()?;
        Some((source, dest))
    }

    pub fn proxy_put_response_params(&self) -> Option<(u8, u8, u8)> {
        if self.message_type != ReservedMessageType::ProxyPutResponse || self.data.is_empty() {
            return None;
        }
        let byte = self.data[0];
        let condition_code = (byte >> 4) & 0x0F;
        let delivery_code = (byte >> 3) & 0x01;
        let file_status = byte & 0x03;
        Some((condition_code, delivery_code, file_status))
    }

    pub fn proxy_transmission_mode(&self) -> Option<u8> {
        if self.message_type != ReservedMessageType::ProxyTransmissionMode {
            return None;
        }
        self.data.first().copied()
    }

    pub fn proxy_closure_requested(&self) -> Option<bool> {
        if self.message_type != ReservedMessageType::ProxyClosureRequest {
            return None;
        }
        self.data.first().map(|b| *b != 0)
    }

    pub fn originating_transaction_id(&self) -> Option<(UnsignedByteField, UnsignedByteField)> {
        if self.message_type != ReservedMessageType::OriginatingTransactionId || self.data.is_empty() {
            return None;
        }
        let lens_byte = self.data[0];
        let source_len = ((lens_byte >> 4) & 0x0F) as usize + 1;
        let seq_len = (lens_byte & 0x0F) as usize + 1;
        let rest = &self.data[1..];
        if rest.len() < source_len + seq_len {
            return None;
        }
        let source_id = UnsignedByteField::unpack(rest, source_len).ok()?;
        let seq_num = UnsignedByteField::unpack(&rest[source_len..], seq_len).ok()?;
        Some((source_id, seq_num))
    }

    pub fn dir_listing_request_params(&self) -> Option<(Lv, Lv)> {
        if self.message_type != ReservedMessageType::DirectoryListingRequest {
            return None;
        }
        let dir_name = Lv::unpack(&self.data).ok()?;
        let rest = &self.data[dir_name.packet_len()..];
        let dir_file_name = Lv::unpack(rest).ok()?;
        Some((dir_name, dir_file_name))
    }

    pub fn dir_listing_response_params(&self) -> Option<(u8, Lv, Lv)> {
        if self.message_type != ReservedMessageType::DirectoryListingResponse || self.data.is_empty() {
            return None;
        }
        let response_code = self.data[0];
        let dir_name = Lv::unpack(&self.data[1..]).ok()?;
        let rest = &self.data[1 + dir_name.packet_len()..];
        let dir_file_name = Lv::unpack(rest).ok()?;
        Some((response_code, dir_name, dir_file_name))
    }

    pub fn dir_listing_options(&self) -> Option<DirListingOptions> {
        if self.message_type != ReservedMessageType::DirectoryListingOptions {
            return None;
        }
        let byte = *self.data.first()?;
        Some(DirListingOptions {
            recursive: byte & 0b01 != 0,
            all: byte & 0b10 != 0,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::byte_field::ByteFieldU16;

    #[test]
    fn proxy_put_request_roundtrip() {
        let source = Lv::new(b"a.txt").unwrap();
        let dest = Lv::new(b"b.txt").unwrap();
        let mut data = source.pack();
        data.extend(dest.pack());
        let reserved = ReservedCfdpMessage::new(ReservedMessageType::ProxyPutRequest, data);
        let msg = reserved.pack_message_to_user();
        let recovered = ReservedCfdpMessage::unpack_from_msg(&msg).unwrap();
        assert_eq!(recovered, reserved);
        let (got_source, got_dest) = recovered.proxy_put_request_params().unwrap();
        assert_eq!(got_source, source);
        assert_eq!(got_dest, dest);
    }

    #[test]
    fn non_cfdp_message_is_not_reserved() {
        let msg = MessageToUserTlv {
            data: b"nope!".to_vec(),
        };
        assert!(!ReservedCfdpMessage::is_cfdp_message(&msg));
        assert!(ReservedCfdpMessage::unpack_from_msg(&msg).is_err());
    }

    #[test]
    fn accessor_returns_none_for_mismatched_variant() {
        let reserved = ReservedCfdpMessage::new(ReservedMessageType::ProxyTransmissionMode, vec![1]);
        assert!(reserved.proxy_put_request_params().is_none());
        assert_eq!(reserved.proxy_transmission_mode(), Some(1));
    }

    #[test]
    fn originating_transaction_id_roundtrip() {
        let source_id = ByteFieldU16::new(0xABCD);
        let seq_num = crate::byte_field::ByteFieldU8::new(7);
        let lens_byte = ((source_id.len() - 1) << 4 | (seq_num.len() - 1)) as u8;
        let mut data = vec![lens_byte];
        data.extend(source_id.pack());
        data.extend(seq_num.pack());
        let reserved = ReservedCfdpMessage::new(ReservedMessageType::OriginatingTransactionId, data);
        let (got_source, got_seq) = reserved.originating_transaction_id().unwrap();
        assert_eq!(got_source, source_id);
        assert_eq!(got_seq, seq_num);
    }
}
