//! Input data model: named metric series and their samples.
//!
//! A trend export is a JSON array of objects shaped like
//! `{"name": "...", "values": {"item": [[ts, value], ...]}}`.

use std::cmp::Ordering;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ConvertError, Result};

/// A sample timestamp.
///
/// Identity is the textual form, so the JSON number `1` and the string `"1"`
/// address the same row. The integer reading is kept for numeric ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "RawTimestamp")]
pub struct Timestamp {
    text: String,
    integer: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Integer(i64),
    Number(serde_json::Number),
    Text(String),
}

impl From<RawTimestamp> for Timestamp {
    fn from(raw: RawTimestamp) -> Self {
        match raw {
            RawTimestamp::Integer(i) => Self {
                text: i.to_string(),
                integer: Some(i),
            },
            RawTimestamp::Number(n) => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    RawTimestamp::Integer(f as i64).into()
                }
                _ => Self::from_text(n.to_string()),
            },
            RawTimestamp::Text(s) => Self::from_text(s),
        }
    }
}

impl Timestamp {
    /// Builds a timestamp from its textual form.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let integer = text.parse().ok();
        Self { text, integer }
    }

    /// The text written into the timestamp column.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The integer value, if the text is a 64-bit integer.
    pub fn as_integer(&self) -> Option<i64> {
        self.integer
    }

    pub(crate) fn cmp_numeric(&self, other: &Self) -> Ordering {
        self.integer
            .cmp(&other.integer)
            .then_with(|| self.text.cmp(&other.text))
    }

    pub(crate) fn cmp_lexical(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        RawTimestamp::Integer(value).into()
    }
}

/// One `(timestamp, value)` observation, read from a 2-element array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "(Timestamp, Value)")]
pub struct Sample {
    pub timestamp: Timestamp,
    pub value: Value,
}

impl From<(Timestamp, Value)> for Sample {
    fn from((timestamp, value): (Timestamp, Value)) -> Self {
        Self { timestamp, value }
    }
}

impl Sample {
    pub fn new(timestamp: impl Into<Timestamp>, value: impl Into<Value>) -> Self {
        Self {
            timestamp: timestamp.into(),
            value: value.into(),
        }
    }
}

/// A named time series. Samples keep input order; they are neither sorted
/// nor deduplicated here.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub name: String,
    pub samples: Vec<Sample>,
}

impl MetricSeries {
    pub fn new(name: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }
}

#[derive(Deserialize)]
struct RawSeries {
    name: String,
    values: RawValues,
}

#[derive(Deserialize)]
struct RawValues {
    item: Vec<Sample>,
}

/// Maps a parsed JSON document onto metric series.
///
/// Fails with [`ConvertError::MalformedInput`] when the document is not an
/// array, or an element lacks a non-empty `name` or a `values.item` list of
/// 2-element samples.
pub fn parse_document(document: Value) -> Result<Vec<MetricSeries>> {
    let Value::Array(elements) = document else {
        return Err(ConvertError::malformed("top-level value is not an array"));
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(idx, element)| {
            let raw: RawSeries = serde_json::from_value(element)
                .map_err(|e| ConvertError::malformed(format!("element {idx}: {e}")))?;
            if raw.name.is_empty() {
                return Err(ConvertError::malformed(format!(
                    "element {idx}: empty `name`"
                )));
            }
            Ok(MetricSeries::new(raw.name, raw.values.item))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_trend_export() {
        let doc = json!([
            {"name": "A", "values": {"item": [[1, 10], [2, "x"]]}},
            {"name": "B", "values": {"item": []}}
        ]);
        let series = parse_document(doc).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "A");
        assert_eq!(series[0].samples[1], Sample::new(2i64, "x"));
        assert!(series[1].samples.is_empty());
    }

    #[test]
    fn string_and_number_timestamps_share_identity() {
        let doc = json!([{"name": "A", "values": {"item": [[1, 1], ["1", 2], ["0x", 3]]}}]);
        let series = parse_document(doc).unwrap();
        let ts: Vec<_> = series[0].samples.iter().map(|s| &s.timestamp).collect();

        assert_eq!(ts[0], ts[1]);
        assert_eq!(ts[2].as_integer(), None);
        assert_eq!(ts[2].as_str(), "0x");
    }

    #[test]
    fn integral_float_timestamps_match_integers() {
        let doc = json!([{"name": "A", "values": {"item": [[1, 1], [1.0, 2], [1.5, 3]]}}]);
        let series = parse_document(doc).unwrap();
        let ts: Vec<_> = series[0].samples.iter().map(|s| &s.timestamp).collect();

        assert_eq!(ts[0], ts[1]);
        assert_eq!(ts[1].as_str(), "1");
        assert_eq!(ts[2].as_str(), "1.5");
        assert_eq!(ts[2].as_integer(), None);
    }

    #[test]
    fn rejects_non_array_document() {
        let err = parse_document(json!({"name": "A"})).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedInput(_)));
    }

    #[test]
    fn rejects_missing_name_or_items() {
        for doc in [
            json!([{"values": {"item": []}}]),
            json!([{"name": "A", "values": {}}]),
            json!([{"name": "A", "values": {"item": 5}}]),
            json!([{"name": "", "values": {"item": []}}]),
        ] {
            let err = parse_document(doc).unwrap_err();
            assert!(matches!(err, ConvertError::MalformedInput(_)), "{err}");
        }
    }

    #[test]
    fn rejects_samples_that_are_not_pairs() {
        for sample in [
            json!([1]),
            json!([1, 2, 3]),
            json!([null, 2]),
            json!(7),
            json!({"timestamp": 1, "value": 2}),
        ] {
            let doc = json!([{"name": "A", "values": {"item": [sample]}}]);
            let err = parse_document(doc).unwrap_err();
            assert!(err.to_string().contains("element 0"), "{err}");
        }
    }
}
