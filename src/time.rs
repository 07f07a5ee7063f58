//! CDS-Short timestamp adjunct (CCSDS 301.0-B-4 §3.3, "Compact Day Segmented").
//!
//! This crate treats the timestamp as opaque bytes embedded in a PUS TM
//! secondary header: it packs and unpacks the 7-octet CDS-Short encoding but
//! never interprets the P-field beyond the fixed constant it emits, and never
//! converts to or from wall-clock time.

use crate::error::{CodecError, Result};
use byteorder::{BigEndian, ByteOrder};

/// P-field value for a CDS-Short timestamp with a 2-octet day segment and no
/// microsecond resolution: `0b010_0_000_0`.
pub const CDS_SHORT_PFIELD: u8 = 0x40;

/// Wire length in octets of a CDS-Short timestamp.
pub const CDS_SHORT_LEN: usize = 7;

/// A CDS-Short (Compact Day Segmented) timestamp: P-field, CCSDS day count,
/// milliseconds of day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CdsShortTimestamp {
    pub ccsds_days: u16,
    pub ms_of_day: u32,
}

impl CdsShortTimestamp {
    pub fn new(ccsds_days: u16, ms_of_day: u32) -> Self {
        Self {
            ccsds_days,
            ms_of_day,
        }
    }

    /// Serialize to the 7-octet wire form: `p_field | ccsds_days (BE) | ms_of_day (BE)`.
    pub fn pack(&self) -> [u8; CDS_SHORT_LEN] {
        let mut buf = [0u8; CDS_SHORT_LEN];
        buf[0] = CDS_SHORT_PFIELD;
        BigEndian::write_u16(&mut buf[1..3], self.ccsds_days);
        BigEndian::write_u32(&mut buf[3..7], self.ms_of_day);
        buf
    }

    /// Parse a 7-octet CDS-Short timestamp. The P-field octet is read but not
    /// validated against [`CDS_SHORT_PFIELD`]; non-matching values are the
    /// caller's concern, not this crate's.
    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() < CDS_SHORT_LEN {
            return Err(CodecError::BytesTooShort {
                expected: CDS_SHORT_LEN,
                actual: data.len(),
            });
        }
        Ok(Self {
            ccsds_days: BigEndian::read_u16(&data[1..3]),
            ms_of_day: BigEndian::read_u32(&data[3..7]),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(19234, 43_199_999)]
    #[case(u16::MAX, u32::MAX)]
    fn roundtrip(#[case] days: u16, #[case] ms: u32) {
        let stamp = CdsShortTimestamp::new(days, ms);
        let packed = stamp.pack();
        assert_eq!(packed[0], CDS_SHORT_PFIELD);
        let recovered = CdsShortTimestamp::unpack(&packed).expect("unpack failed");
        assert_eq!(stamp, recovered);
    }

    #[test]
    fn rejects_short_input() {
        let stamp = CdsShortTimestamp::new(1, 2);
        let packed = stamp.pack();
        for n in 1..=CDS_SHORT_LEN {
            assert!(CdsShortTimestamp::unpack(&packed[..CDS_SHORT_LEN - n]).is_err());
        }
    }
}
