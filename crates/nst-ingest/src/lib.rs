pub mod batch;
pub mod error;
pub mod timestamp;

pub use batch::{
    Batch, ENVELOPE_SCHEMA, Envelope, EnvelopeData, EventHeader, decode_envelope, decode_record,
    read_batch, read_batch_from,
};
pub use error::{IngestError, Result};
pub use timestamp::{normalize_timestamp, parse_registration_timestamp};
