#![no_std]

//! A record-stream decoder for Garmin's Flexible and Interoperable Data
//! Transfer protocol.
//!
//! Sprocket turns the bytes of an activity file into a lazy sequence of typed
//! records: definition records describing field layouts, and data records
//! decoded against them. Message and field numbers are left uninterpreted;
//! mapping them to names and units belongs to a profile layered on top.
//!
//! Most users should begin with [`avec::records`] or, with the `std` feature,
//! [`avec::FitFile`]. The individual decoding steps are exposed in the
//! [`sans`] module for applications driving them by hand.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `std`: enable file and reader based documents (default).

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod avec;
pub mod sans;

#[cfg(feature = "std")]
pub use avec::FitFile;
pub use avec::{DecodeOptions, Record, Records};
pub use sans::DecodeError;
