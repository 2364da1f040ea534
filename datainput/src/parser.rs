use crate::errors::InvalidInputError;
use crate::record::IngestRecord;
use serde_json::Value;

/// Decodes a request body into a record. Structural check only: the body must
/// be a JSON object, its fields are not inspected.
pub fn parse_record(body: &[u8]) -> Result<IngestRecord, InvalidInputError> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(fields) => Ok(IngestRecord::new(fields)),
        _ => Err(InvalidInputError::NotAnObject),
    }
}
