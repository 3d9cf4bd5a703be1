//! Interfaces for decoding whole documents.
//!
//! [`records`] yields a lazy [`Records`] iterator over a document held in
//! memory. With Cargo feature `std`, [`FitFile`] opens and owns a document from
//! a path or reader. Decoding behaviour is configured through
//! [`DecodeOptions`].
//!
//! For push-style consumption, [`decode_slice`] publishes each data record to
//! a [`FromRecords`] receiver instead.
//!
//! # Example
//!
//! ```
//! use sprocket::{DecodeError, DecodeOptions, Record};
//!
//! fn print_records(data: &[u8]) -> Result<(), DecodeError> {
//!     let options = DecodeOptions::default().register_timestamp_field(20, 253);
//!
//!     for record in sprocket::avec::records(data, options)? {
//!         if let Record::Data(record) = record? {
//!             println!("{} at {:?}", record.global_message, record.timestamp);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

use alloc::{boxed::Box, collections::BTreeMap};
use core::fmt;

use crate::sans::{
    DecodeError,
    data::DeveloperFieldResolver,
    types::Value,
};

#[cfg(feature = "std")]
pub mod file;
pub mod stream;

#[cfg(feature = "std")]
pub use file::FitFile;
pub use stream::{Record, Records};

/// Configuration for a decoding session.
///
/// The defaults tolerate a mismatched trailing check value, reconstruct no
/// compressed timestamps, and leave developer fields as raw bytes.
#[derive(Default)]
pub struct DecodeOptions {
    strict: bool,
    timestamp_fields: BTreeMap<u16, u8>,
    resolver: Option<Box<dyn DeveloperFieldResolver + Send + Sync>>,
}

impl DecodeOptions {
    /// Treat a mismatched trailing check value as a decoding error.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Mark a field as holding the absolute timestamp of records with a global
    /// message number.
    ///
    /// Each valid value read from a registered field becomes the baseline for
    /// reconstructing compressed timestamp headers. A later registration for
    /// the same message replaces an earlier one.
    pub fn register_timestamp_field(mut self, global_message: u16, field: u8) -> Self {
        self.timestamp_fields.insert(global_message, field);
        self
    }

    /// Supply base types for developer fields.
    ///
    /// Closures must annotate their argument types.
    ///
    /// ```
    /// use sprocket::{DecodeOptions, sans::types::BaseType};
    ///
    /// let options = DecodeOptions::default().register_developer_field_resolver(
    ///     |index: u8, field: u8| (index == 0 && field == 1).then_some(BaseType::Uint16),
    /// );
    /// ```
    pub fn register_developer_field_resolver(
        mut self,
        resolver: impl DeveloperFieldResolver + Send + Sync + 'static,
    ) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The field registered as holding timestamps for a global message number.
    pub fn timestamp_field(&self, global_message: u16) -> Option<u8> {
        self.timestamp_fields.get(&global_message).copied()
    }

    pub fn resolver(&self) -> Option<&dyn DeveloperFieldResolver> {
        self.resolver
            .as_deref()
            .map(|r| r as &dyn DeveloperFieldResolver)
    }
}

impl fmt::Debug for DecodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeOptions")
            .field("strict", &self.strict)
            .field("timestamp_fields", &self.timestamp_fields)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

/// Read records from a document held in memory.
///
/// Fails immediately if the document header is invalid; all later errors are
/// yielded by the iterator.
pub fn records(r: &[u8], options: DecodeOptions) -> Result<Records<'_>, DecodeError> {
    Records::new(r, options)
}

/// Produce record receivers for a document.
pub trait FromRecords {
    /// Retrieve a receiver for a data record, if one exists.
    fn add_record(&mut self, global_message: u16) -> Option<&mut dyn FromRecord>;
}

/// Receive field values for a data record.
///
/// Fields holding the 'invalid' marker are skipped. Arrays, strings and
/// unresolved developer fields are published whole.
///
/// The default implementation of each method ignores received values.
#[allow(unused_variables)]
pub trait FromRecord {
    /// Add the absolute timestamp of the record, registered or reconstructed.
    fn add_timestamp(&mut self, timestamp: u32) {}
    /// Add a field value to the record.
    fn add_field(&mut self, field: u8, value: &Value) {}
    /// Add a developer field value to the record.
    fn add_developer_field(&mut self, developer_data_index: u8, field: u8, value: &Value) {}
}

/// Decode every record of a document, publishing data records to a receiver.
///
/// Returns the first error encountered. Records published before it remain
/// with the receiver.
pub fn decode_slice(
    r: &[u8],
    options: DecodeOptions,
    o: &mut impl FromRecords,
) -> Result<(), DecodeError> {
    publish(records(r, options)?, o)
}

pub(crate) fn publish(records: Records<'_>, o: &mut impl FromRecords) -> Result<(), DecodeError> {
    for record in records {
        let Record::Data(record) = record? else {
            continue;
        };

        // Shadow the document receiver with that of a single record.
        let Some(o) = o.add_record(record.global_message) else {
            continue;
        };

        if let Some(timestamp) = record.timestamp {
            o.add_timestamp(timestamp);
        }

        for field in record.fields.iter().filter(|f| !f.value.is_invalid()) {
            o.add_field(field.number, &field.value);
        }

        for field in &record.developer_fields {
            if !field.value.is_invalid() {
                o.add_developer_field(field.developer_data_index, field.number, &field.value);
            }
        }
    }

    Ok(())
}
