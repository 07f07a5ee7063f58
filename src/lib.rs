#![cfg_attr(docsrs, feature(doc_cfg))]
//! CCSDS/ECSS/CFDP spacecraft packet en/de-coders.
//!
//! This crate is a pure data-transformation layer over the wire formats used
//! across three spacecraft communication standards:
//!
//! - the CCSDS Space Packet Protocol primary header ([`spacepacket`]),
//!   the six-octet framing unit carried by essentially every other packet
//!   in the system;
//! - the ECSS Packet Utilization Standard (PUS) telecommand/telemetry
//!   codecs and the Service 1 request-verification state machine
//!   ([`ecss`]);
//! - the CCSDS File Delivery Protocol (CFDP) Protocol Data Units, their
//!   common header, and the LV/TLV option encodings that back them
//!   ([`cfdp`]).
//!
//! Every encoder/decoder here operates on caller-owned byte buffers: there
//! is no I/O, no logging, and no global configuration. Managed parameters
//! (entity ID widths, timestamp lengths, CRC/file-size flags, ...) are
//! passed explicitly at every call site.

/// Fixed-width, big-endian unsigned byte fields (entity IDs, transaction
/// sequence numbers) shared by the CFDP layer.
pub mod byte_field;

#[cfg(any(feature = "async-codec", feature = "tokio-codec"))]
#[cfg_attr(
    docsrs,
    doc(cfg(any(feature = "async-codec", feature = "tokio-codec")))
)]
/// Sink/Stream framing for a single CCSDS space-packet stream, with
/// asynchronous-codec and tokio-util::codec trait implementations.
pub mod codec;

#[cfg(feature = "crc")]
#[cfg_attr(docsrs, doc(cfg(feature = "crc")))]
/// CRC-16/CCITT-FALSE, the checksum shared by every packet format here.
pub mod crc;

/// The crate's single typed error enum and `Result` alias.
pub mod error;

/// CCSDS Space Packet Protocol primary header, packet-ID/PSC sub-values,
/// and the stream demultiplexer.
pub mod spacepacket;

/// CDS-Short timestamp adjunct embedded opaquely by PUS TM.
pub mod time;

/// ECSS PUS secondary headers, TC/TM codecs, Service 1 report builders and
/// the verificator state machine.
pub mod ecss;

/// CCSDS File Delivery Protocol: common header, LV/TLV option fields, and
/// the eight file-directive PDUs plus File-Data.
pub mod cfdp;

pub use error::{CodecError, Result};
