//! CRC-16/CCITT-FALSE, the checksum shared by the space packet, CFDP and PUS
//! wire formats (poly 0x1021, init 0xFFFF, no reflection, no output XOR).
#![cfg(feature = "crc")]
#![cfg_attr(docsrs, doc(cfg(feature = "crc")))]

use crc::{Crc, CRC_16_IBM_3740};

/// The CCITT-FALSE CRC-16 algorithm used throughout this crate.
pub const CRC_CCITT_FALSE: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Compute the CRC-16 CCITT-FALSE checksum over `data`.
pub fn crc16_ccitt_false(data: &[u8]) -> u16 {
    CRC_CCITT_FALSE.checksum(data)
}

/// Verify that `data` (which is expected to end with its own CRC-16) checksums to zero.
pub fn verify_crc16_ccitt_false(data: &[u8]) -> bool {
    crc16_ccitt_false(data) == 0
}
