use crate::errors::EnrichmentError;
use crate::record::{EnrichedRecord, IngestRecord, RecordKey, TIME_FIELD};
use chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeZone};
use serde_json::Value;
use uuid::Uuid;

/// Format of the `time` field as sent by the caller, e.g. `April 27, 2020 at 09:28PM`
pub const SOURCE_TIME_FORMAT: &str = "%B %d, %Y at %I:%M%p";

/// Format the `time` field is stored in. Not ISO on purpose: table stores
/// tend to detect ISO strings and convert them to native dates.
pub const STORED_TIME_FORMAT: &str = "%Y/%m/%d %H:%M";

/// Enriches a record using the current local time for the partition.
pub fn enrich(record: IngestRecord) -> Result<EnrichedRecord, EnrichmentError> {
    enrich_at(record, &Local::now())
}

/// Assigns the storage key and rewrites `time` into the stored format.
///
/// The partition is the year of `now`; the row is a fresh v4 UUID.
pub fn enrich_at<Tz: TimeZone>(
    record: IngestRecord,
    now: &DateTime<Tz>,
) -> Result<EnrichedRecord, EnrichmentError> {
    let key = RecordKey {
        partition: format!("{:04}", now.year()),
        row: Uuid::new_v4().to_string(),
    };

    let time = match record.get(TIME_FIELD) {
        None => return Err(EnrichmentError::MissingTime),
        Some(Value::String(time)) => reformat_time(time)?,
        Some(_) => return Err(EnrichmentError::TimeNotString),
    };

    let mut fields = record.into_fields();
    fields.insert(TIME_FIELD.into(), Value::String(time));

    Ok(EnrichedRecord::new(key, fields))
}

/// Full English month names, the only month spelling accepted in `time`
const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Converts a source-format timestamp into the stored format.
///
/// chrono matches a format space against any run of whitespace, including
/// none, and takes abbreviated names for `%B`. The token layout is checked
/// first so neither slips through.
pub fn reformat_time(value: &str) -> Result<String, EnrichmentError> {
    if !has_source_layout(value) {
        return Err(EnrichmentError::TimeLayout(value.to_string()));
    }

    let parsed = NaiveDateTime::parse_from_str(value, SOURCE_TIME_FORMAT).map_err(|source| {
        EnrichmentError::InvalidTime {
            value: value.to_string(),
            source,
        }
    })?;

    Ok(parsed.format(STORED_TIME_FORMAT).to_string())
}

/// `<Month> <day>, <year> at <clock>` with single spaces and a full month name
fn has_source_layout(value: &str) -> bool {
    let Some((date, clock)) = value.split_once(" at ") else {
        return false;
    };
    if clock.is_empty() || clock.contains(char::is_whitespace) {
        return false;
    }

    let tokens: Vec<&str> = date.split(' ').collect();
    let [month, day, year] = tokens.as_slice() else {
        return false;
    };

    MONTHS.iter().any(|name| name.eq_ignore_ascii_case(month))
        && day.strip_suffix(',').is_some_and(|d| !d.is_empty())
        && !year.is_empty()
}
