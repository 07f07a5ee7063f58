//! CFDP Type-Length-Value (TLV) option fields (CCSDS 727.0-B-5 §5.4) and the
//! reserved CFDP messages carried inside Message-to-User TLVs.

use crate::byte_field::UnsignedByteField;
use crate::cfdp::lv::Lv;
use crate::error::{CodecError, Result};

/// The six TLV type codes defined by CCSDS 727.0-B-5.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TlvType {
    FilestoreRequest = 0x00,
    FilestoreResponse = 0x01,
    MessageToUser = 0x02,
    FaultHandlerOverride = 0x04,
    FlowLabel = 0x05,
    EntityId = 0x06,
}

impl TlvType {
    pub fn try_from_u8(value: u8) -> Result<Self> {
        Ok(match value {
            0x00 => Self::FilestoreRequest,
            0x01 => Self::FilestoreResponse,
            0x02 => Self::MessageToUser,
            0x04 => Self::FaultHandlerOverride,
            0x05 => Self::FlowLabel,
            0x06 => Self::EntityId,
            other => {
                return Err(CodecError::InvalidTlvType {
                    found: other,
                    expected: None,
                })
            }
        })
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Filestore request/response action codes, CCSDS 727.0-B-5 Table 5-19.
/// `*_SNP` variants carry a second file name, `*_SNN`/`*_SMM` do not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FilestoreActionCode {
    CreateFile = 0b0000,
    DeleteFile = 0b0001,
    RenameFile = 0b0010,
    AppendFile = 0b0011,
    ReplaceFile = 0b0100,
    CreateDirectory = 0b0101,
    RemoveDirectory = 0b0110,
    DenyFile = 0b0111,
    DenyDirectory = 0b1000,
}

impl FilestoreActionCode {
    pub fn try_from_u8(value: u8) -> Result<Self> {
        Ok(match value & 0x0F {
            0b0000 => Self::CreateFile,
            0b0001 => Self::DeleteFile,
            0b0010 => Self::RenameFile,
            0b0011 => Self::AppendFile,
            0b0100 => Self::ReplaceFile,
            0b0101 => Self::CreateDirectory,
            0b0110 => Self::RemoveDirectory,
            0b0111 => Self::DenyFile,
            0b1000 => Self::DenyDirectory,
            other => {
                return Err(CodecError::InvalidFieldValue {
                    field: "filestore_action_code",
                    value: other as u64,
                })
            }
        })
    }

    /// Whether this action takes a second ("SNP") file name.
    pub fn has_second_name(self) -> bool {
        matches!(self, Self::RenameFile | Self::AppendFile | Self::ReplaceFile)
    }
}

/// `EntityId` TLV. Equality and hashing compare only the numeric value of
/// the wrapped [`UnsignedByteField`], not its byte width, matching the
/// source library's custom `__eq__`/`__hash__`.
#[derive(Clone, Debug)]
pub struct EntityIdTlv {
    pub id: UnsignedByteField,
}

impl PartialEq for EntityIdTlv {
    fn eq(&self, other: &Self) -> bool {
        self.id.value() == other.id.value()
    }
}
impl Eq for EntityIdTlv {}
impl std::hash::Hash for EntityIdTlv {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.value().hash(state);
    }
}

impl EntityIdTlv {
    pub fn new(id: UnsignedByteField) -> Self {
        Self { id }
    }

    fn pack_value(&self) -> Vec<u8> {
        self.id.pack()
    }

    fn unpack_value(data: &[u8]) -> Result<Self> {
        if !matches!(data.len(), 1 | 2 | 4 | 8) {
            return Err(CodecError::InvalidFieldLength {
                context: "entity ID TLV value length must be 1, 2, 4 or 8",
            });
        }
        Ok(Self {
            id: UnsignedByteField::unpack(data, data.len())?,
        })
    }
}

/// Opaque flow-label TLV value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FlowLabelTlv {
    pub data: Vec<u8>,
}

/// Fault handler override: condition code (4 bits) paired with a handler
/// action code (4 bits).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FaultHandlerOverrideTlv {
    pub condition_code: u8,
    pub handler_code: u8,
}

impl FaultHandlerOverrideTlv {
    pub fn new(condition_code: u8, handler_code: u8) -> Self {
        Self {
            condition_code: condition_code & 0x0F,
            handler_code: handler_code & 0x0F,
        }
    }

    fn pack_value(&self) -> Vec<u8> {
        vec![self.condition_code << 4 | self.handler_code]
    }

    fn unpack_value(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(CodecError::BytesTooShort {
                expected: 1,
                actual: 0,
            });
        }
        Ok(Self {
            condition_code: (data[0] >> 4) & 0x0F,
            handler_code: data[0] & 0x0F,
        })
    }
}

/// Filestore request TLV value: action code, first file name, optional
/// second file name (when the action code is one of the "SNP" variants).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStoreRequestTlv {
    pub action_code: FilestoreActionCode,
    pub first_name: Lv,
    pub second_name: Option<Lv>,
}

impl FileStoreRequestTlv {
    pub fn new(action_code: FilestoreActionCode, first_name: Lv, second_name: Option<Lv>) -> Self {
        let second_name = if action_code.has_second_name() {
            second_name
        } else {
            None
        };
        Self {
            action_code,
            first_name,
            second_name,
        }
    }

    fn pack_value(&self) -> Vec<u8> {
        let mut buf = vec![(self.action_code as u8) << 4];
        buf.extend(self.first_name.pack());
        if let Some(second) = &self.second_name {
            buf.extend(second.pack());
        }
        buf
    }

    fn unpack_value(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(CodecError::BytesTooShort {
                expected: 1,
                actual: 0,
            });
        }
        let action_code = FilestoreActionCode::try_from_u8(data[0] >> 4)?;
        let first_name = Lv::unpack(&data[1..])?;
        let mut idx = 1 + first_name.packet_len();
        let second_name = if action_code.has_second_name() {
            let second = Lv::unpack(&data[idx..])?;
            idx += second.packet_len();
            Some(second)
        } else {
            None
        };
        let _ = idx;
        Ok(Self {
            action_code,
            first_name,
            second_name,
        })
    }
}

/// Filestore response TLV value: action+status nibble pair, the echoed file
/// name(s), and an optional free-text filestore message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStoreResponseTlv {
    pub action_code: FilestoreActionCode,
    pub status_code: u8,
    pub first_name: Lv,
    pub second_name: Option<Lv>,
    pub filestore_message: Lv,
}

impl FileStoreResponseTlv {
    fn pack_value(&self) -> Vec<u8> {
        let mut buf = vec![(self.action_code as u8) << 4 | (self.status_code & 0x0F)];
        buf.extend(self.first_name.pack());
        if let Some(second) = &self.second_name {
            buf.extend(second.pack());
        }
        buf.extend(self.filestore_message.pack());
        buf
    }

    fn unpack_value(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(CodecError::BytesTooShort {
                expected: 1,
                actual: 0,
            });
        }
        let action_code = FilestoreActionCode::try_from_u8(data[0] >> 4)?;
        let status_code = data[0] & 0x0F;
        let first_name = Lv::unpack(&data[1..])?;
        let mut idx = 1 + first_name.packet_len();
        let second_name = if action_code.has_second_name() {
            let second = Lv::unpack(&data[idx..])?;
            idx += second.packet_len();
            Some(second)
        } else {
            None
        };
        let filestore_message = Lv::unpack(&data[idx..])?;
        Ok(Self {
            action_code,
            status_code,
            first_name,
            second_name,
            filestore_message,
        })
    }
}

/// Raw message-to-user TLV value; [`super::msg_to_user::ReservedCfdpMessage`]
/// provides typed access to the "cfdp"-prefixed sub-variants.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MessageToUserTlv {
    pub data: Vec<u8>,
}

/// A CFDP TLV. Re-modeled as a sum type (see the crate's design notes)
/// instead of the source library's abstract-base-plus-wrapper-classes
/// hierarchy.
#[derive(Clone, Debug, PartialEq)]
pub enum Tlv {
    FilestoreRequest(FileStoreRequestTlv),
    FilestoreResponse(FileStoreResponseTlv),
    MessageToUser(MessageToUserTlv),
    FaultHandlerOverride(FaultHandlerOverrideTlv),
    FlowLabel(FlowLabelTlv),
    EntityId(EntityIdTlv),
}

impl Tlv {
    pub fn tlv_type(&self) -> TlvType {
        match self {
            Self::FilestoreRequest(_) => TlvType::FilestoreRequest,
            Self::FilestoreResponse(_) => TlvType::FilestoreResponse,
            Self::MessageToUser(_) => TlvType::MessageToUser,
            Self::FaultHandlerOverride(_) => TlvType::FaultHandlerOverride,
            Self::FlowLabel(_) => TlvType::FlowLabel,
            Self::EntityId(_) => TlvType::EntityId,
        }
    }

    fn value_bytes(&self) -> Vec<u8> {
        match self {
            Self::FilestoreRequest(v) => v.pack_value(),
            Self::FilestoreResponse(v) => v.pack_value(),
            Self::MessageToUser(v) => v.data.clone(),
            Self::FaultHandlerOverride(v) => v.pack_value(),
            Self::FlowLabel(v) => v.data.clone(),
            Self::EntityId(v) => v.pack_value(),
        }
    }

    /// Total packed length: 1 type octet + 1 length octet + value.
    pub fn packet_len(&self) -> usize {
        2 + self.value_bytes().len()
    }

    pub fn pack(&self) -> Vec<u8> {
        let value = self.value_bytes();
        let mut buf = Vec::with_capacity(2 + value.len());
        buf.push(self.tlv_type().as_u8());
        buf.push(value.len() as u8);
        buf.extend(value);
        buf
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(CodecError::BytesTooShort {
                expected: 2,
                actual: data.len(),
            });
        }
        let tlv_type = TlvType::try_from_u8(data[0])?;
        let len = data[1] as usize;
        if data.len() < 2 + len {
            return Err(CodecError::BytesTooShort {
                expected: 2 + len,
                actual: data.len(),
            });
        }
        let value = &data[2..2 + len];
        Ok(match tlv_type {
            TlvType::FilestoreRequest => {
                Self::FilestoreRequest(FileStoreRequestTlv::unpack_value(value)?)
            }
            TlvType::FilestoreResponse => {
                Self::FilestoreResponse(FileStoreResponseTlv::unpack_value(value)?)
            }
            TlvType::MessageToUser => Self::MessageToUser(MessageToUserTlv {
                data: value.to_vec(),
            }),
            TlvType::FaultHandlerOverride => {
                Self::FaultHandlerOverride(FaultHandlerOverrideTlv::unpack_value(value)?)
            }
            TlvType::FlowLabel => Self::FlowLabel(FlowLabelTlv {
                data: value.to_vec(),
            }),
            TlvType::EntityId => Self::EntityId(EntityIdTlv::unpack_value(value)?),
        })
    }
}
