//! Avro batch decoding.
//!
//! A batch is an Avro object container file. Every record wraps a `data`
//! record holding two strings, `hendelse` (event header) and
//! `naeringsspesifikasjon` (the specification body), each an embedded JSON
//! document decoded on its own.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;

use apache_avro::Reader;
use apache_avro::types::Value;
use nst_model::{AccountingEvent, Naeringsspesifikasjon, RawPayload};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::timestamp::parse_registration_timestamp;

/// Writer schema of the batch envelope.
pub const ENVELOPE_SCHEMA: &str = r#"
{
    "type": "record",
    "name": "Naeringsspesifikasjonhendelse",
    "fields": [
        {
            "name": "data",
            "type": {
                "type": "record",
                "name": "Data",
                "fields": [
                    { "name": "hendelse", "type": ["null", "string"], "default": null },
                    { "name": "naeringsspesifikasjon", "type": ["null", "string"], "default": null }
                ]
            }
        }
    ]
}
"#;

/// One container record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub data: EnvelopeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeData {
    pub hendelse: Option<String>,
    pub naeringsspesifikasjon: Option<String>,
}

impl Envelope {
    pub fn new(hendelse: impl Into<String>, naeringsspesifikasjon: impl Into<String>) -> Self {
        Self {
            data: EnvelopeData {
                hendelse: Some(hendelse.into()),
                naeringsspesifikasjon: Some(naeringsspesifikasjon.into()),
            },
        }
    }
}

/// Event header embedded as JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct EventHeader {
    pub registreringstidspunkt: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub sekvensnummer: i64,
}

fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(0),
        Some(serde_json::Value::Number(number)) => number
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid sequence number: {number}"))),
        Some(serde_json::Value::String(text)) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid sequence number: {text}"))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid sequence number: {other}"
        ))),
    }
}

/// Decoded batch contents.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub events: Vec<AccountingEvent>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Decode a batch file from disk.
pub fn read_batch(path: &Path) -> Result<Batch> {
    let file = File::open(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let started = Instant::now();
    let batch = read_batch_from(BufReader::new(file))?;
    info!(
        path = %path.display(),
        event_count = batch.len(),
        duration_ms = started.elapsed().as_millis(),
        "batch decoded"
    );
    Ok(batch)
}

/// Decode a batch from any reader holding an Avro object container.
pub fn read_batch_from<R: Read>(reader: R) -> Result<Batch> {
    let reader = Reader::new(reader)?;
    let mut events = Vec::new();
    for (position, value) in reader.enumerate() {
        let value = value?;
        events.push(decode_record(position, &value)?);
    }
    debug!(event_count = events.len(), "avro container read");
    Ok(Batch { events })
}

/// Decode one container record into an event.
pub fn decode_record(position: usize, value: &Value) -> Result<AccountingEvent> {
    let envelope: Envelope =
        apache_avro::from_value(value).map_err(|err| IngestError::Envelope {
            position,
            message: err.to_string(),
        })?;
    decode_envelope(position, envelope)
}

/// Decode the embedded JSON payloads of an envelope.
pub fn decode_envelope(position: usize, envelope: Envelope) -> Result<AccountingEvent> {
    let EnvelopeData {
        hendelse,
        naeringsspesifikasjon,
    } = envelope.data;
    let header_text = hendelse.ok_or_else(|| IngestError::Envelope {
        position,
        message: "missing hendelse".to_string(),
    })?;
    let specification_text = naeringsspesifikasjon.ok_or_else(|| IngestError::Envelope {
        position,
        message: "missing naeringsspesifikasjon".to_string(),
    })?;

    let header: EventHeader =
        serde_json::from_str(&header_text).map_err(|source| IngestError::Payload {
            position,
            field: "hendelse",
            source,
        })?;
    let specification: Naeringsspesifikasjon =
        serde_json::from_str(&specification_text).map_err(|source| IngestError::Payload {
            position,
            field: "naeringsspesifikasjon",
            source,
        })?;
    let registration_timestamp = parse_registration_timestamp(&header.registreringstidspunkt)?;

    Ok(AccountingEvent::new(
        specification,
        registration_timestamp,
        header.sekvensnummer,
        position,
    )
    .with_raw(RawPayload {
        header: header_text,
        specification: specification_text,
    }))
}
