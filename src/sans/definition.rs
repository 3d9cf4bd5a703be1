//! Definition records.

use alloc::vec::Vec;

use zerocopy::FromBytes;

use super::{
    DecodeError,
    source::{ByteSource, Endianness},
    table::DefinitionTable,
    types::BaseType,
};

#[repr(C)]
#[derive(Debug, FromBytes)]
struct DefinitionMessage {
    _reserved: u8,
    architecture: u8,
    global_message: [u8; 2],
    fields_remaining: u8,
}

#[repr(C)]
#[derive(FromBytes)]
struct FieldHeader {
    field: u8,
    size: u8,
    base_type: u8,
}

/// Layout of one field in a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefinition {
    pub number: u8,
    /// Size of the field in bytes, possibly several values of its base type.
    pub size: u8,
    pub base_type: BaseType,
}

/// Layout of one developer field in a data record.
///
/// The base type is described by records outside the definition, keyed by
/// the developer data index and field number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeveloperFieldDefinition {
    pub number: u8,
    pub size: u8,
    pub developer_data_index: u8,
}

/// A decoded definition record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// The local slot this definition was declared for.
    pub local_type: u8,
    pub global_message: u16,
    pub endianness: Endianness,
    pub fields: Vec<FieldDefinition>,
    pub developer_fields: Vec<DeveloperFieldDefinition>,
    /// Length of every data record bound to this definition, excluding its
    /// record header.
    pub payload_width: usize,
}

impl Definition {
    /// Decode the body of a definition record, read from just after its
    /// record header.
    pub fn decode(
        r: &mut ByteSource<'_>,
        local_type: u8,
        has_developer_fields: bool,
    ) -> Result<Self, DecodeError> {
        let DefinitionMessage {
            architecture,
            global_message,
            fields_remaining,
            ..
        } = zerocopy::transmute!(r.take::<5>()?);

        let endianness = Endianness::from_architecture(architecture);
        let global_message = endianness.read_u16(global_message);

        let fields = (0..fields_remaining)
            .map(|_| {
                let FieldHeader {
                    field,
                    size,
                    base_type,
                } = zerocopy::transmute!(r.take::<3>()?);

                Ok(FieldDefinition {
                    number: field,
                    size,
                    base_type: BaseType::from_byte(base_type)?,
                })
            })
            .collect::<Result<Vec<_>, DecodeError>>()?;

        let developer_fields = if has_developer_fields {
            let fields_remaining = r.take_u8()?;

            (0..fields_remaining)
                .map(|_| {
                    let [number, size, developer_data_index] = r.take::<3>()?;

                    Ok(DeveloperFieldDefinition {
                        number,
                        size,
                        developer_data_index,
                    })
                })
                .collect::<Result<Vec<_>, DecodeError>>()?
        } else {
            Vec::new()
        };

        let payload_width = fields.iter().map(|f| f.size as usize).sum::<usize>()
            + developer_fields.iter().map(|f| f.size as usize).sum::<usize>();

        Ok(Self {
            local_type,
            global_message,
            endianness,
            fields,
            developer_fields,
            payload_width,
        })
    }
}

/// Decode a definition record and bind it to its local slot, replacing any
/// earlier binding.
pub fn decode_definition(
    r: &mut ByteSource<'_>,
    local_type: u8,
    has_developer_fields: bool,
    table: &mut DefinitionTable,
) -> Result<Definition, DecodeError> {
    let definition = Definition::decode(r, local_type, has_developer_fields)?;

    tracing::debug!(
        local_type,
        global_message = definition.global_message,
        fields = definition.fields.len(),
        developer_fields = definition.developer_fields.len(),
        payload_width = definition.payload_width,
        "installing definition"
    );

    table.install(definition.clone());
    Ok(definition)
}
