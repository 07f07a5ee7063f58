//! Sink/Stream framing for CCSDS space packets arriving on a byte stream that
//! may prefix each packet with a fixed synchronization marker.
//!
//! Unlike [`crate::spacepacket::parse_space_packets`], which demultiplexes a
//! batch of already-received buffers by `PacketId`, this codec is for the
//! single-producer case: one packet type arrives serially on a socket or
//! pipe, optionally preceded by a sync marker, and each decoded item is the
//! packet's raw bytes (header included) ready for [`crate::spacepacket::SpHeader::unpack`].

use crate::error::CodecError;
use crate::spacepacket::{total_len_from_len_field, SpHeader};
use bytes::{Buf, BytesMut};

#[derive(Clone, Copy, PartialEq, Eq)]
enum CodecState {
    Sync,
    Data,
}

#[cfg_attr(
    docsrs,
    doc(cfg(any(feature = "async-codec", feature = "tokio-codec")))
)]
/// A Sink/Stream codec for raw CCSDS space packets, each returned as its
/// full packed bytes (primary header included).
pub struct SpacePacketCodec {
    sync_marker: Box<[u8]>,
    state: CodecState,
}

impl SpacePacketCodec {
    /// Build a codec that scans for `sync_marker` before each packet. An
    /// empty marker disables scanning and reads packets back-to-back.
    pub fn new<T: AsRef<[u8]>>(sync_marker: T) -> Self {
        Self {
            sync_marker: sync_marker.as_ref().to_owned().into_boxed_slice(),
            state: CodecState::Sync,
        }
    }

    fn find_sync<B: AsRef<[u8]>>(&mut self, source: &B) -> Option<usize> {
        if self.sync_marker.is_empty() {
            return Some(0);
        }
        source
            .as_ref()
            .windows(self.sync_marker.len())
            .position(|window| window == &*self.sync_marker)
    }

    fn decode_helper(&mut self, buffer: &mut BytesMut) -> Result<Option<Vec<u8>>, CodecError> {
        if self.state == CodecState::Sync {
            if let Some(index) = self.find_sync(buffer) {
                buffer.advance(index + self.sync_marker.len());
                self.state = CodecState::Data;
            } else {
                let len = buffer.remaining();
                if len > self.sync_marker.len().saturating_sub(1) {
                    buffer.advance(len - (self.sync_marker.len().saturating_sub(1)));
                }
                return Ok(None);
            }
        }

        if buffer.remaining() < crate::spacepacket::CCSDS_HEADER_LEN + 1 {
            return Ok(None);
        }

        let data_len_field = u16::from_be_bytes(buffer.as_ref()[4..6].try_into().unwrap());
        let packet_length = total_len_from_len_field(data_len_field);

        if buffer.remaining() < packet_length {
            buffer.reserve(packet_length - buffer.remaining());
            return Ok(None);
        }

        let data = buffer.as_ref()[..packet_length].to_vec();
        buffer.advance(packet_length);
        self.state = CodecState::Sync;

        SpHeader::unpack(&data)?;
        Ok(Some(data))
    }
}

#[cfg(feature = "async-codec")]
mod non_tokio {
    use super::*;

    use asynchronous_codec::{Decoder, Encoder};

    impl Decoder for SpacePacketCodec {
        type Item = Vec<u8>;
        type Error = CodecError;

        fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
            self.decode_helper(src)
        }
    }

    impl Encoder for SpacePacketCodec {
        type Item = Vec<u8>;
        type Error = CodecError;

        fn encode(
            &mut self,
            item: Self::Item,
            dst: &mut asynchronous_codec::BytesMut,
        ) -> Result<(), Self::Error> {
            dst.reserve(item.len() + self.sync_marker.len());
            dst.extend(&*self.sync_marker);
            dst.extend(item);
            Ok(())
        }
    }
}

#[cfg(feature = "tokio-codec")]
mod tokio_codec {
    use tokio_util::codec::{Decoder, Encoder};

    use super::*;

    impl Decoder for SpacePacketCodec {
        type Item = Vec<u8>;
        type Error = CodecError;

        fn decode(&mut self, src: &mut bytes::BytesMut) -> Result<Option<Self::Item>, Self::Error> {
            self.decode_helper(src)
        }
    }

    impl Encoder<Vec<u8>> for SpacePacketCodec {
        type Error = CodecError;

        fn encode(&mut self, item: Vec<u8>, dst: &mut bytes::BytesMut) -> Result<(), Self::Error> {
            dst.reserve(item.len() + self.sync_marker.len());
            dst.extend(&*self.sync_marker);
            dst.extend(item);
            Ok(())
        }
    }
}

#[cfg(all(test, feature = "async-codec"))]
mod test {
    use super::*;

    use asynchronous_codec::Framed;
    use rstest::rstest;

    use futures::{executor, io::Cursor, SinkExt, TryStreamExt};

    fn sample_packet() -> Vec<u8> {
        let header = SpHeader::tc(17, 5000, 76).unwrap();
        let mut buf = header.pack().to_vec();
        buf.extend((0..77_u8).collect::<Vec<u8>>());
        buf
    }

    #[rstest]
    fn codec_no_sync() {
        let expected = sample_packet();

        let mut buf = vec![0_u8; 10];
        let buffer: Cursor<&mut Vec<u8>> = Cursor::new(&mut buf);

        let mut framed = Framed::new(buffer, SpacePacketCodec::new([]));
        executor::block_on(framed.send(expected.clone())).unwrap();

        let mut cursor = framed.into_inner();
        cursor.set_position(0);

        let mut framed = Framed::new(cursor, SpacePacketCodec::new([]));
        let recovered = executor::block_on(framed.try_next()).unwrap().unwrap();

        assert_eq!(expected, recovered)
    }

    #[rstest]
    fn codec_sync_with_leading_noise() {
        let expected = sample_packet();

        let mut buf = vec![0_u8; 10];
        let mut buffer: Cursor<&mut Vec<u8>> = Cursor::new(&mut buf);
        buffer.set_position(20);

        let mut framed = Framed::new(buffer, SpacePacketCodec::new([0xAA, 0xBB]));
        executor::block_on(framed.send(expected.clone())).unwrap();

        let mut cursor = framed.into_inner();
        cursor.set_position(0);
        cursor.get_mut()[..20].copy_from_slice((0_u8..20).collect::<Vec<u8>>().as_slice());
        cursor.set_position(0);

        let mut framed = Framed::new(cursor, SpacePacketCodec::new([0xAA, 0xBB]));
        let recovered = executor::block_on(framed.try_next()).unwrap().unwrap();

        assert_eq!(expected, recovered)
    }
}
