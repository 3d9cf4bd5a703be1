//! Pure decoding steps over byte windows.
//!
//! This module holds every piece of the decoder that does not own a document:
//! the base type catalog, header parsers, definition and data record decoders,
//! the definition table and the cyclic redundancy check. None of these perform
//! I/O or keep state between calls beyond what is passed in. See
//! [`crate::avec`] for the record stream that drives them over a whole
//! document.
//!
//! # Architecture
//!
//! A document is a fixed file header, a section of records, and a two byte
//! trailing check value. Each record starts with a one byte record header
//! ([`header::RecordHeader`]) which either introduces a definition record
//! ([`definition::Definition`]) binding a field layout to one of sixteen local
//! slots ([`table::DefinitionTable`]), or a data record whose payload is
//! decoded ([`data::decode_data`]) against the layout currently bound to its
//! slot.
//!
//! Implementers driving these steps by hand are responsible for:
//!
//! - Reading bytes from the correct place in the document. A bounded cursor is
//! provided in the [`source`] module.
//!
//! - Ending decoding once the specified number of record bytes have been read.
//!
//! - Applying cyclic redundancy checks. A helper function is provided in the
//! [`check`] module.

use thiserror::Error;

pub mod check;
pub mod data;
pub mod definition;
pub mod header;
pub mod source;
pub mod table;
pub mod types;

/// An error decoding a document.
///
/// Every variant except [`DecodeError::Checksum`] leaves the remainder of the
/// record section untrustworthy, so decoding stops at the first one.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Incorrect file type marker.
    #[error("Incorrect file type marker.")]
    Format,
    /// Unsupported header length.
    #[error("Unsupported header length ({0}).")]
    Header(u8),
    /// A field declared a base type outside the catalog.
    #[error("Unknown base type ({0:#04x}).")]
    UnknownBaseType(u8),
    /// A data record referenced a local slot with no definition bound.
    #[error("No definition bound to local message type {0}.")]
    UnboundLocalMessageType(u8),
    /// Fewer bytes remained than a record required.
    #[error("Record at offset {offset} needs {needed} bytes, found {available}.")]
    TruncatedRecord {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// A record extended past the declared end of the record section.
    #[error("Consumed {consumed} record bytes, but only {declared} were declared.")]
    FramingOverrun { consumed: usize, declared: usize },
    /// Found a compressed timestamp header before any absolute timestamp.
    #[error("Found a compressed timestamp header without a timestamp baseline.")]
    UnsupportedCompressedTimestamp,
    /// Calculated and found CRC values do not match.
    #[error("Calculated ({calculated}) and found ({found}) CRC values do not match.")]
    Checksum { found: u16, calculated: u16 },
    /// An error reading the document.
    #[cfg(feature = "std")]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
