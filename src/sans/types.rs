//! Catalog of base types and decoded field values.

use alloc::vec::Vec;
use core::fmt;

use super::{DecodeError, source::Endianness};

/// A base type, identified by its byte in a field definition.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Enum = 0x00,
    Sint8 = 0x01,
    Uint8 = 0x02,
    Sint16 = 0x83,
    Uint16 = 0x84,
    Sint32 = 0x85,
    Uint32 = 0x86,
    String = 0x07,
    Float32 = 0x88,
    Float64 = 0x89,
    Uint8z = 0x0A,
    Uint16z = 0x8B,
    Uint32z = 0x8C,
    Byte = 0x0D,
    Sint64 = 0x8E,
    Uint64 = 0x8F,
    Uint64z = 0x90,
}

/// Layout and decoding of a single base type.
#[derive(Debug)]
pub struct BaseTypeInfo {
    pub base_type: BaseType,
    /// Size of one value in bytes.
    pub width: u8,
    pub signed: bool,
    pub float: bool,
    /// Raw bits marking a value as invalid.
    pub invalid: u64,
}

impl BaseTypeInfo {
    /// Decode one value of exactly `width` bytes, or `None` if it holds the
    /// invalid marker.
    pub fn decode(&self, r: &[u8], endianness: Endianness) -> Option<Scalar> {
        let bits = endianness.read_uint(r);

        if bits == self.invalid {
            return None;
        }

        let scalar = match (self.float, self.width) {
            (true, 4) => Scalar::F32(f32::from_bits(bits as u32)),
            (true, _) => Scalar::F64(f64::from_bits(bits)),
            (false, width) => Scalar::integer(bits, width, self.signed),
        };

        Some(scalar)
    }
}

macro_rules! base_type {
    ($base_type:ident, $width:literal, unsigned, $invalid:expr) => {
        base_type!(@ $base_type, $width, false, false, $invalid)
    };
    ($base_type:ident, $width:literal, signed, $invalid:expr) => {
        base_type!(@ $base_type, $width, true, false, $invalid)
    };
    ($base_type:ident, $width:literal, float, $invalid:expr) => {
        base_type!(@ $base_type, $width, true, true, $invalid)
    };
    (@ $base_type:ident, $width:literal, $signed:literal, $float:literal, $invalid:expr) => {
        BaseTypeInfo {
            base_type: BaseType::$base_type,
            width: $width,
            signed: $signed,
            float: $float,
            invalid: $invalid,
        }
    };
}

/// Indexed by the low five bits of the base type byte.
const BASE_TYPES: [BaseTypeInfo; 17] = [
    base_type!(Enum, 1, unsigned, 0xFF),
    base_type!(Sint8, 1, signed, 0x7F),
    base_type!(Uint8, 1, unsigned, 0xFF),
    base_type!(Sint16, 2, signed, 0x7FFF),
    base_type!(Uint16, 2, unsigned, 0xFFFF),
    base_type!(Sint32, 4, signed, 0x7FFF_FFFF),
    base_type!(Uint32, 4, unsigned, 0xFFFF_FFFF),
    base_type!(String, 1, unsigned, 0x00),
    base_type!(Float32, 4, float, 0xFFFF_FFFF),
    base_type!(Float64, 8, float, u64::MAX),
    base_type!(Uint8z, 1, unsigned, 0x00),
    base_type!(Uint16z, 2, unsigned, 0x0000),
    base_type!(Uint32z, 4, unsigned, 0x0000_0000),
    base_type!(Byte, 1, unsigned, 0xFF),
    base_type!(Sint64, 8, signed, 0x7FFF_FFFF_FFFF_FFFF),
    base_type!(Uint64, 8, unsigned, u64::MAX),
    base_type!(Uint64z, 8, unsigned, 0),
];

impl BaseType {
    /// Look up a base type from a field definition byte.
    ///
    /// Only the low five bits identify the type; the endian-ability flag in
    /// the high bit is ignored.
    pub fn from_byte(b: u8) -> Result<Self, DecodeError> {
        BASE_TYPES
            .get((b & 0x1F) as usize)
            .map(|info| info.base_type)
            .ok_or(DecodeError::UnknownBaseType(b))
    }

    pub fn info(self) -> &'static BaseTypeInfo {
        &BASE_TYPES[(self as u8 & 0x1F) as usize]
    }

    pub fn width(self) -> u8 {
        self.info().width
    }

    /// Whether fields of this type are always exposed as raw bytes.
    pub fn is_raw(self) -> bool {
        matches!(self, Self::String | Self::Byte)
    }
}

/// A single decoded value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),

    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),

    F32(f32),
    F64(f64),
}

impl Scalar {
    /// Interpret the low `width` bytes of raw bits as an integer.
    fn integer(bits: u64, width: u8, signed: bool) -> Self {
        match (width, signed) {
            (1, false) => Self::U8(bits as u8),
            (1, true) => Self::I8(bits as u8 as i8),
            (2, false) => Self::U16(bits as u16),
            (2, true) => Self::I16(bits as u16 as i16),
            (4, false) => Self::U32(bits as u32),
            (4, true) => Self::I32(bits as u32 as i32),
            (_, false) => Self::U64(bits),
            (_, true) => Self::I64(bits as i64),
        }
    }

    /// The value as an unsigned integer, if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::U8(x) => Some(x.into()),
            Self::U16(x) => Some(x.into()),
            Self::U32(x) => Some(x.into()),
            Self::U64(x) => Some(x),
            Self::I8(x) => x.try_into().ok(),
            Self::I16(x) => x.try_into().ok(),
            Self::I32(x) => x.try_into().ok(),
            Self::I64(x) => x.try_into().ok(),
            Self::F32(_) | Self::F64(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8(x) => write!(f, "{x}"),
            Self::U16(x) => write!(f, "{x}"),
            Self::U32(x) => write!(f, "{x}"),
            Self::U64(x) => write!(f, "{x}"),
            Self::I8(x) => write!(f, "{x}"),
            Self::I16(x) => write!(f, "{x}"),
            Self::I32(x) => write!(f, "{x}"),
            Self::I64(x) => write!(f, "{x}"),
            Self::F32(x) => write!(f, "{x}"),
            Self::F64(x) => write!(f, "{x}"),
        }
    }
}

/// A decoded field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single value holding its type's invalid marker.
    Invalid,
    Scalar(Scalar),
    /// Several values of one type. Elements holding the invalid marker are
    /// `None`.
    Array(Vec<Option<Scalar>>),
    /// Undecoded bytes, for strings, byte arrays, untyped developer fields and
    /// sizes that are not a multiple of their base type's width.
    ///
    /// String bytes are passed through as-is, including any null terminator
    /// and padding.
    Bytes(Vec<u8>),
}

impl Value {
    /// Decode the bytes of one field.
    pub fn decode(base_type: BaseType, endianness: Endianness, r: &[u8]) -> Self {
        let info = base_type.info();
        let width = info.width as usize;

        if base_type.is_raw() || r.is_empty() || r.len() % width != 0 {
            return Self::Bytes(r.to_vec());
        }

        if r.len() == width {
            match info.decode(r, endianness) {
                Some(x) => Self::Scalar(x),
                None => Self::Invalid,
            }
        } else {
            let elements = r
                .chunks_exact(width)
                .map(|r| info.decode(r, endianness))
                .collect();

            Self::Array(elements)
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(x) => Some(x),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }
}
