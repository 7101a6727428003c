//! Image metadata records and result page decoding

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One discovered image candidate
///
/// Only `image_url` is needed downstream; the remaining fields are carried
/// through for callers that want the raw metadata. Missing keys and explicit
/// `null` values both decode to the field's default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageRecord {
    /// Label of the hosting site
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,

    /// Title, used to derive the output filename
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(deserialize_with = "null_as_default")]
    pub height: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub width: u32,

    /// Page the image was found on
    #[serde(rename = "url", deserialize_with = "null_as_default")]
    pub page_url: String,

    /// Direct link to the binary content
    #[serde(rename = "image", deserialize_with = "null_as_default")]
    pub image_url: String,

    #[serde(rename = "thumbnail", deserialize_with = "null_as_default")]
    pub thumbnail_url: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Result of decoding one results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// At least one usable record
    Records(Vec<ImageRecord>),

    /// Well-formed response carrying no records
    Exhausted,

    /// Body could not be decoded into a result list
    Malformed {
        /// Why decoding failed
        reason: String,
    },
}

impl PageOutcome {
    /// Number of records on the page
    pub fn len(&self) -> usize {
        match self {
            Self::Records(records) => records.len(),
            _ => 0,
        }
    }

    /// Returns true if the page holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the body could not be decoded
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    /// Consumes the outcome, yielding the records (empty unless `Records`)
    pub fn into_records(self) -> Vec<ImageRecord> {
        match self {
            Self::Records(records) => records,
            _ => Vec::new(),
        }
    }
}

/// Decodes a results endpoint body
///
/// The body is expected to be a JSON object with a `results` array. Entries
/// that fail to decode are dropped individually so one odd record does not
/// cost the whole page.
pub fn parse_results(body: &[u8]) -> PageOutcome {
    let value: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            return PageOutcome::Malformed {
                reason: format!("invalid JSON: {}", e),
            }
        }
    };

    let Some(results) = value.get("results").and_then(Value::as_array) else {
        return PageOutcome::Malformed {
            reason: "missing results array".to_string(),
        };
    };

    if results.is_empty() {
        return PageOutcome::Exhausted;
    }

    let records: Vec<ImageRecord> = results
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match ImageRecord::deserialize(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Skipping undecodable result #{}: {}", index, e);
                None
            }
        })
        .collect();

    if records.is_empty() {
        return PageOutcome::Malformed {
            reason: format!("none of the {} results could be decoded", results.len()),
        };
    }

    PageOutcome::Records(records)
}
