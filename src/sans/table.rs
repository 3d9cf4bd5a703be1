//! Bindings from local message types to definitions.

use super::{DecodeError, definition::Definition};

/// Number of local message types a record header can address.
pub const LOCAL_TYPES: usize = 16;

/// The definitions currently bound to each local message type.
///
/// Each decoding session owns one table, starting empty.
#[derive(Debug, Clone, Default)]
pub struct DefinitionTable {
    slots: [Option<Definition>; LOCAL_TYPES],
}

impl DefinitionTable {
    /// Bind a definition to the local type it was declared for, returning the
    /// definition it replaced.
    pub fn install(&mut self, definition: Definition) -> Option<Definition> {
        let slot = &mut self.slots[definition.local_type as usize % LOCAL_TYPES];
        slot.replace(definition)
    }

    pub fn get(&self, local_type: u8) -> Option<&Definition> {
        self.slots.get(local_type as usize)?.as_ref()
    }

    /// Look up the definition bound to a local type referenced by a data
    /// record.
    pub fn bound(&self, local_type: u8) -> Result<&Definition, DecodeError> {
        self.get(local_type)
            .ok_or(DecodeError::UnboundLocalMessageType(local_type))
    }
}
