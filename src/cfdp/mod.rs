//! CCSDS File Delivery Protocol (CFDP, CCSDS 727.0-B-5) PDU en/decoders.

pub mod header;
pub mod lv;
pub mod msg_to_user;
pub mod pdu;
pub mod tlv;

pub use header::{PduConfig, PduHeader};
pub use lv::Lv;
pub use msg_to_user::ReservedCfdpMessage;
pub use tlv::Tlv;
