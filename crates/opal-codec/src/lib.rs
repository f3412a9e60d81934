//! Record field codec for OPAL.
//!
//! Converts a record's user-defined fields into a canonical serialized byte
//! payload and back, excluding bookkeeping fields. The encoding is a JSON
//! object whose member order follows field insertion order, so encoding is
//! deterministic for a given field map and round-trips are byte-reproducible.
//!
//! # Modules
//!
//! - [`fields`] — [`FieldMap`], an insertion-ordered string-to-string map
//! - [`codec`] — [`RecordCodec`] with a configurable reserved-field set
//! - [`error`] — [`CodecError`]

pub mod codec;
pub mod error;
pub mod fields;

pub use codec::{RecordCodec, DEFAULT_RESERVED};
pub use error::CodecError;
pub use fields::FieldMap;
