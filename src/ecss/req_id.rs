//! Request identification for PUS telecommands (CCSDS/ECSS E-70-41A §6.1).

use crate::spacepacket::{PacketId, PacketSeqCtrl, SpHeader};

/// Identifies a telecommand for verification tracking: the space packet's
/// `PacketId`, `PacketSeqCtrl`, and the 3-bit CCSDS version field, packed
/// into a 32-bit value used as the verificator's map key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId {
    pub version: u8,
    pub packet_id: PacketId,
    pub psc: PacketSeqCtrl,
}

impl RequestId {
    pub fn new(version: u8, packet_id: PacketId, psc: PacketSeqCtrl) -> Self {
        Self {
            version: version & 0b111,
            packet_id,
            psc,
        }
    }

    pub fn from_sp_header(sp_header: &SpHeader) -> Self {
        Self::new(sp_header.version, sp_header.packet_id, sp_header.psc)
    }

    /// Pack into the 32-bit form used as the verificator's dictionary key.
    pub fn as_u32(&self) -> u32 {
        (self.version as u32) << 29 | (self.packet_id.raw() as u32) << 16 | self.psc.raw() as u32
    }

    pub fn from_u32(raw: u32) -> Self {
        Self {
            version: ((raw >> 29) & 0b111) as u8,
            packet_id: PacketId::from_raw((raw >> 16) as u16),
            psc: PacketSeqCtrl::from_raw(raw as u16),
        }
    }
}
