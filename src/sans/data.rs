//! Data records.

use alloc::vec::Vec;

use super::{
    DecodeError,
    definition::Definition,
    source::ByteSource,
    types::{BaseType, Value},
};

/// Supplies base types for developer fields.
///
/// Developer field types are declared by description records elsewhere in the
/// document, keyed by developer data index and field number. Implemented for
/// any `Fn(u8, u8) -> Option<BaseType>`.
pub trait DeveloperFieldResolver {
    /// Resolve the base type of a developer field, if known.
    fn resolve(&self, developer_data_index: u8, field: u8) -> Option<BaseType>;
}

impl<F> DeveloperFieldResolver for F
where
    F: Fn(u8, u8) -> Option<BaseType>,
{
    fn resolve(&self, developer_data_index: u8, field: u8) -> Option<BaseType> {
        self(developer_data_index, field)
    }
}

/// A decoded field of a data record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub number: u8,
    pub value: Value,
}

/// A decoded developer field of a data record.
///
/// Unless resolved to a base type, the value is [`Value::Bytes`].
#[derive(Debug, Clone, PartialEq)]
pub struct DeveloperFieldValue {
    pub developer_data_index: u8,
    pub number: u8,
    pub value: Value,
}

/// A decoded data record.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRecord {
    pub local_type: u8,
    pub global_message: u16,
    /// Fields in the order their definition declared them.
    pub fields: Vec<FieldValue>,
    pub developer_fields: Vec<DeveloperFieldValue>,
    /// Absolute timestamp of the record, either read from its registered
    /// timestamp field or reconstructed from a compressed timestamp header.
    pub timestamp: Option<u32>,
}

impl DataRecord {
    /// The first value decoded for a field number.
    pub fn field(&self, number: u8) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.number == number)
            .map(|f| &f.value)
    }
}

/// Decode the payload of a data record bound to `definition`, read from just
/// after its record header.
///
/// The payload must end at or before `end`, the offset of the end of the
/// record section.
pub fn decode_data(
    r: &mut ByteSource<'_>,
    end: usize,
    definition: &Definition,
    resolver: Option<&dyn DeveloperFieldResolver>,
) -> Result<DataRecord, DecodeError> {
    let offset = r.offset();
    let needed = definition.payload_width;
    let available = end.saturating_sub(offset).min(r.remaining());

    if available < needed {
        Err(DecodeError::TruncatedRecord {
            offset,
            needed,
            available,
        })?;
    }

    let mut payload = r.take_slice(needed)?;
    let endianness = definition.endianness;

    let mut take = |size: u8| {
        let (head, tail) = payload.split_at((size as usize).min(payload.len()));
        payload = tail;
        head
    };

    let fields = definition
        .fields
        .iter()
        .map(|field| FieldValue {
            number: field.number,
            value: Value::decode(field.base_type, endianness, take(field.size)),
        })
        .collect();

    let developer_fields = definition
        .developer_fields
        .iter()
        .map(|field| {
            let r = take(field.size);

            let base_type =
                resolver.and_then(|s| s.resolve(field.developer_data_index, field.number));

            let value = match base_type {
                Some(base_type) => Value::decode(base_type, endianness, r),
                None => Value::Bytes(r.to_vec()),
            };

            DeveloperFieldValue {
                developer_data_index: field.developer_data_index,
                number: field.number,
                value,
            }
        })
        .collect();

    Ok(DataRecord {
        local_type: definition.local_type,
        global_message: definition.global_message,
        fields,
        developer_fields,
        timestamp: None,
    })
}
