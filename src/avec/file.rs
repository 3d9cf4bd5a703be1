//! Documents read from files and readers.
//!
//! _Requires Cargo feature `std`._

use std::{fs, io::Read, path::Path, vec::Vec};

use crate::sans::{DecodeError, header::FileHeader};

use super::{DecodeOptions, FromRecords, Records, publish};

/// A document held in memory, with its header already validated.
///
/// Each call to [`FitFile::records`] starts an independent decoding session;
/// the document bytes are shared read-only between them and released when the
/// `FitFile` is dropped.
#[derive(Debug, Clone)]
pub struct FitFile {
    bytes: Vec<u8>,
    header: FileHeader,
}

impl FitFile {
    /// Read a document from a path and validate its header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;

        tracing::debug!(path = %path.display(), len = bytes.len(), "read document");

        Self::from_bytes(bytes)
    }

    /// Read a document to its end from a reader and validate its header.
    pub fn from_reader(r: &mut impl Read) -> Result<Self, DecodeError> {
        let mut bytes = Vec::new();
        r.read_to_end(&mut bytes)?;

        Self::from_bytes(bytes)
    }

    /// Validate the header of a document already in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        let header = FileHeader::parse(&bytes)?;
        Ok(Self { bytes, header })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Read records with default options.
    pub fn records(&self) -> Records<'_> {
        self.records_with(DecodeOptions::default())
    }

    pub fn records_with(&self, options: DecodeOptions) -> Records<'_> {
        Records::from_parts(&self.bytes, self.header.clone(), options)
    }

    /// Decode every record, publishing data records to a receiver.
    pub fn decode(&self, options: DecodeOptions, o: &mut impl FromRecords) -> Result<(), DecodeError> {
        publish(self.records_with(options), o)
    }
}
