//! Record persistence for OPAL: typed records over the ledger gateway.
//!
//! This crate is the application-facing layer. A [`Record`] is a plain value
//! object holding ordered string fields; a [`RecordStore`] maps it onto the
//! append-only ledger through the gateway, handling identifier generation,
//! codec encoding, reference attachment, and paginated history reads.
//!
//! Creation is a composite of independently committed steps; see
//! [`PartialCreate`] for how mid-flight failures are reported.

pub mod config;
pub mod error;
pub mod keygen;
pub mod outcome;
pub mod record;
pub mod store;

pub use config::StoreConfig;
pub use error::{RecordError, RecordResult};
pub use keygen::{KeyGenerator, DEFAULT_MAX_ATTEMPTS, MAX_KEY_LEN, MIN_KEY_LEN};
pub use outcome::{CreateOutcome, CreateRequest, CreateStep, PartialCreate};
pub use record::Record;
pub use store::{RecordStore, RecordVersion, RecordView, DEFAULT_LIMIT};
