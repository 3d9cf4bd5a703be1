//! Document and record headers.

use tartan_bitfield::bitfield;
use zerocopy::FromBytes;

use super::{DecodeError, check::compute_crc};

/// File type marker found at bytes 8 to 11 of every document.
pub const MAGIC: [u8; 4] = *b".FIT";

/// Length of the fixed part of a document header. Short 8 byte headers still
/// span it, since the file type marker sits at bytes 8 to 11.
const FIXED_LEN: usize = 12;

#[repr(C)]
#[derive(FromBytes)]
struct RawFileHeader {
    header_size: u8,
    protocol_version: u8,
    profile_version: [u8; 2],
    data_size: [u8; 4],
    magic: [u8; 4],
}

/// A parsed document header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Header length as announced by the document: 14, or the short 8.
    pub header_size: u8,
    pub protocol_version: u8,
    pub profile_version: u16,
    /// Length of the record section, excluding both headers and the trailing
    /// check value.
    pub data_size: u32,
    pub magic: [u8; 4],
    /// Check value over the first twelve bytes, only carried by 14 byte
    /// headers.
    pub header_checksum: Option<u16>,
}

impl FileHeader {
    /// Parse a document header from the start of a document.
    ///
    /// Trailing bytes beyond the header are ignored.
    pub fn parse(r: &[u8]) -> Result<Self, DecodeError> {
        let fixed: [u8; FIXED_LEN] = r
            .get(..FIXED_LEN)
            .and_then(|r| r.try_into().ok())
            .ok_or(DecodeError::TruncatedRecord {
                offset: 0,
                needed: FIXED_LEN,
                available: r.len(),
            })?;

        let RawFileHeader {
            header_size,
            protocol_version,
            profile_version,
            data_size,
            magic,
        } = zerocopy::transmute!(fixed);

        if magic != MAGIC {
            Err(DecodeError::Format)?;
        }

        let header_checksum = match header_size {
            14 => {
                let crc = r.get(FIXED_LEN..14).ok_or(DecodeError::TruncatedRecord {
                    offset: FIXED_LEN,
                    needed: 2,
                    available: r.len() - FIXED_LEN,
                })?;
                Some(u16::from_le_bytes([crc[0], crc[1]]))
            }
            8 => None,
            _ => Err(DecodeError::Header(header_size))?,
        };

        Ok(Self {
            header_size,
            protocol_version,
            profile_version: u16::from_le_bytes(profile_version),
            data_size: u32::from_le_bytes(data_size),
            magic,
            header_checksum,
        })
    }

    /// Offset of the first record.
    ///
    /// Short headers still span the twelve bytes holding the file type marker.
    pub fn record_offset(&self) -> usize {
        (self.header_size as usize).max(FIXED_LEN)
    }

    /// Offset of the trailing check value.
    pub fn checksum_offset(&self) -> usize {
        self.record_offset() + self.data_size as usize
    }

    /// Compare the header check value against the header bytes.
    ///
    /// Returns `None` if the header carries no check value, or leaves it as
    /// zero (meaning it was never computed).
    pub fn verify_checksum(&self, r: &[u8]) -> Option<bool> {
        let found = self.header_checksum.filter(|c| *c != 0)?;
        let fixed = r.get(..FIXED_LEN)?;

        Some(compute_crc(0, fixed) == found)
    }
}

/// A decoded record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordHeader {
    Normal {
        is_definition: bool,
        /// Only ever set for definition records.
        has_developer_fields: bool,
        local_type: u8,
    },
    CompressedTimestamp {
        local_type: u8,
        time_offset: u8,
    },
}

impl RecordHeader {
    /// Decode a record header byte.
    pub fn decode(r: u8) -> Self {
        bitfield! {
            struct RawHeader(u8) {
                [7] is_compressed,
            }
        }

        if RawHeader(r).is_compressed() {
            bitfield! {
                struct CompressedHeader(u8) {
                    [0..5] time_offset: u8,
                    [5..7] local_message: u8,
                }
            }

            let header = CompressedHeader(r);

            Self::CompressedTimestamp {
                local_type: header.local_message(),
                time_offset: header.time_offset(),
            }
        } else {
            bitfield! {
                struct NormalHeader(u8) {
                    [0..4] local_message: u8,
                    [5] is_developer,
                    [6] is_definition,
                }
            }

            let header = NormalHeader(r);

            // The developer flag has no meaning on data records.
            Self::Normal {
                is_definition: header.is_definition(),
                has_developer_fields: header.is_definition() && header.is_developer(),
                local_type: header.local_message(),
            }
        }
    }

    pub fn local_type(&self) -> u8 {
        match *self {
            Self::Normal { local_type, .. } | Self::CompressedTimestamp { local_type, .. } => {
                local_type
            }
        }
    }
}
