//! Per-record outcomes
//!
//! Result rows come back in more than one shape depending on the content
//! type and API version: `errors` may be a list, a single object or absent,
//! booleans may arrive as strings, and a missing id may be an empty string.
//! Everything is normalised into [`RecordResult`] while deserializing.

use serde::{Deserialize, Deserializer, Serialize};

/// Status code used when a record failed without any error detail
pub const UNKNOWN_STATUS_CODE: &str = "UNKNOWN_EXCEPTION";

/// Structured per-record error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordError {
    /// Offending field names
    pub fields: Vec<String>,
    /// Human-readable message
    pub message: String,
    /// Status token such as `INVALID_FIELD`
    pub status_code: String,
}

impl RecordError {
    fn missing_detail() -> Self {
        Self {
            fields: Vec::new(),
            message: "no error detail reported".to_string(),
            status_code: UNKNOWN_STATUS_CODE.to_string(),
        }
    }
}

/// Outcome of one submitted record
///
/// `error` is present exactly when `success` is false. A failed record never
/// carries an id. A successful record carries the id the service reported,
/// which is `None` only if the row left it out or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRecordResult")]
pub struct RecordResult {
    pub id: Option<String>,
    pub created: bool,
    pub success: bool,
    pub error: Option<RecordError>,
}

impl RecordResult {
    /// Successful outcome
    pub fn succeeded(id: impl Into<String>, created: bool) -> Self {
        Self {
            id: Some(id.into()),
            created,
            success: true,
            error: None,
        }
    }

    /// Failed outcome
    pub fn failed(error: RecordError) -> Self {
        Self {
            id: None,
            created: false,
            success: false,
            error: Some(error),
        }
    }
}

/// Ordered outcomes of one batch, one per submitted record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_id: String,
    pub items: Vec<RecordResult>,
}

impl BatchResult {
    pub fn new(batch_id: impl Into<String>, items: Vec<RecordResult>) -> Self {
        Self {
            batch_id: batch_id.into(),
            items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of failed records
    pub fn failure_count(&self) -> usize {
        self.items.iter().filter(|r| !r.success).count()
    }
}

/// A record outcome tagged with where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOutcome {
    /// Batch the record was submitted in
    pub batch_id: String,
    /// Zero-based position of the record within its batch
    pub position: usize,
    #[serde(flatten)]
    pub result: RecordResult,
}

impl RecordOutcome {
    pub fn is_success(&self) -> bool {
        self.result.success
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseBool {
    Bool(bool),
    Text(String),
}

fn loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LooseBool>::deserialize(deserializer)? {
        Some(LooseBool::Bool(b)) => Ok(b),
        Some(LooseBool::Text(s)) => match s.trim().to_lowercase().as_str() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a boolean, got {:?}",
                other
            ))),
        },
        None => Ok(false),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecordError {
    #[serde(default)]
    fields: Option<OneOrMany<String>>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status_code: Option<String>,
}

impl From<RawRecordError> for RecordError {
    fn from(raw: RawRecordError) -> Self {
        RecordError {
            fields: raw.fields.map(OneOrMany::into_vec).unwrap_or_default(),
            message: raw.message.unwrap_or_default(),
            status_code: raw
                .status_code
                .unwrap_or_else(|| UNKNOWN_STATUS_CODE.to_string()),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecordResult {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, deserialize_with = "loose_bool")]
    created: bool,
    #[serde(default, deserialize_with = "loose_bool")]
    success: bool,
    #[serde(default, alias = "error")]
    errors: Option<OneOrMany<RawRecordError>>,
}

impl From<RawRecordResult> for RecordResult {
    fn from(raw: RawRecordResult) -> Self {
        if raw.success {
            return RecordResult {
                id: raw.id.filter(|id| !id.is_empty()),
                created: raw.created,
                success: true,
                error: None,
            };
        }

        let error = raw
            .errors
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(RecordError::from)
            .unwrap_or_else(RecordError::missing_detail);

        RecordResult::failed(error)
    }
}
