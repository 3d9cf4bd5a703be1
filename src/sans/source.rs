//! Bounded cursor over document bytes.

use super::DecodeError;

/// Byte order of multi-byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Interpret a definition record's architecture byte.
    ///
    /// Only `1` selects big-endian; every other value is read as
    /// little-endian.
    pub fn from_architecture(architecture: u8) -> Self {
        if architecture == 1 {
            Self::Big
        } else {
            Self::Little
        }
    }

    /// Read an unsigned integer of up to eight bytes.
    pub fn read_uint(self, r: &[u8]) -> u64 {
        debug_assert!(r.len() <= 8);

        let fold = |acc: u64, b: &u8| (acc << 8) | *b as u64;

        match self {
            Self::Little => r.iter().rev().fold(0, fold),
            Self::Big => r.iter().fold(0, fold),
        }
    }

    pub fn read_u16(self, r: [u8; 2]) -> u16 {
        match self {
            Self::Little => u16::from_le_bytes(r),
            Self::Big => u16::from_be_bytes(r),
        }
    }
}

/// Read-only cursor over a document, tracking its offset from the start.
///
/// Every read either returns the requested bytes and advances, or fails with
/// [`DecodeError::TruncatedRecord`] without advancing.
#[derive(Debug, Clone)]
pub struct ByteSource<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Start reading at an offset, clamped to the end of the document.
    pub fn starting_at(bytes: &'a [u8], offset: usize) -> Self {
        Self {
            bytes,
            offset: offset.min(bytes.len()),
        }
    }

    /// Offset of the next unread byte from the start of the document.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    /// Every byte of the document, read or not.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Take an exact number of bytes, advancing the offset.
    pub fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut buf = [0; N];
        buf.copy_from_slice(self.take_slice(N)?);
        Ok(buf)
    }

    pub fn take_u8(&mut self) -> Result<u8, DecodeError> {
        let [b] = self.take::<1>()?;
        Ok(b)
    }

    pub fn take_u16(&mut self, endianness: Endianness) -> Result<u16, DecodeError> {
        Ok(endianness.read_u16(self.take()?))
    }

    /// Take a run of bytes, advancing the offset.
    pub fn take_slice(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let s = self.offset;

        let r = self
            .bytes
            .get(s..)
            .and_then(|r| r.get(..len))
            .ok_or(DecodeError::TruncatedRecord {
                offset: s,
                needed: len,
                available: self.remaining(),
            })?;

        self.offset += len;
        Ok(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_in_either_byte_order() {
        assert_eq!(Endianness::Little.read_uint(&[0x01, 0x02, 0x03]), 0x030201);
        assert_eq!(Endianness::Big.read_uint(&[0x01, 0x02, 0x03]), 0x010203);
        assert_eq!(Endianness::Big.read_u16([0x07, 0xE8]), 2024);
        assert_eq!(Endianness::Little.read_u16([0xE8, 0x07]), 2024);
    }

    #[test]
    fn failed_take_does_not_advance() {
        let mut source = ByteSource::new(&[1, 2, 3]);
        assert_eq!(source.take::<2>().unwrap(), [1, 2]);

        let err = source.take::<2>().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TruncatedRecord {
                offset: 2,
                needed: 2,
                available: 1
            }
        ));
        assert_eq!(source.offset(), 2);
        assert_eq!(source.take_u8().unwrap(), 3);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn starts_within_bounds() {
        let source = ByteSource::starting_at(&[1, 2, 3], 5);
        assert_eq!(source.offset(), 3);
        assert_eq!(source.remaining(), 0);

        let mut source = ByteSource::starting_at(&[1, 2, 3], 1);
        assert_eq!(source.take_u16(Endianness::Big).unwrap(), 0x0203);
        assert!(source.take_u8().is_err());
        assert_eq!(source.offset(), 3);
    }

    #[test]
    fn architecture_byte_selects_order() {
        assert_eq!(Endianness::from_architecture(0), Endianness::Little);
        assert_eq!(Endianness::from_architecture(1), Endianness::Big);
    }
}
