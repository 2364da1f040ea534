use serde::Serialize;
use serde_json::{Map, Value};

pub const TIME_FIELD: &str = "time";
pub const PARTITION_KEY_FIELD: &str = "PartitionKey";
pub const ROW_KEY_FIELD: &str = "RowKey";

/// A record as supplied by the caller. Only `time` has a required shape;
/// everything else is opaque payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IngestRecord(Map<String, Value>);

impl IngestRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        IngestRecord(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

/// Storage key of an enriched record
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub partition: String,
    pub row: String,
}

/// A record ready to be written.
///
/// The key is assigned once by the enricher. The caller fields never carry
/// their own `PartitionKey` or `RowKey`, so the flattened JSON has no
/// duplicate keys.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnrichedRecord {
    #[serde(rename = "PartitionKey")]
    partition_key: String,
    #[serde(rename = "RowKey")]
    row_key: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl EnrichedRecord {
    pub(crate) fn new(key: RecordKey, mut fields: Map<String, Value>) -> Self {
        fields.remove(PARTITION_KEY_FIELD);
        fields.remove(ROW_KEY_FIELD);

        EnrichedRecord {
            partition_key: key.partition,
            row_key: key.row,
            fields,
        }
    }

    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    pub fn row_key(&self) -> &str {
        &self.row_key
    }

    pub fn key(&self) -> RecordKey {
        RecordKey {
            partition: self.partition_key.clone(),
            row: self.row_key.clone(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Canonical JSON encoding handed to the store
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
