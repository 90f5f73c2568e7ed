//! CSV serialization of a [`WideTable`].

use std::fs;
use std::io;

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use serde_json::Value;

use crate::config::{CsvConfig, CsvFormat, OutputEncoding};
use crate::error::{ConvertError, Result};
use crate::pivot::{ColumnId, ColumnSpec, WideRow, WideTable};

fn json_to_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        // Non-scalar metric values are written as compact JSON
        other => other.to_string(),
    }
}

fn record(row: &WideRow, columns: &ColumnSpec) -> Vec<String> {
    columns
        .columns()
        .iter()
        .map(|column| match &column.id {
            ColumnId::Timestamp => row.timestamp().as_str().to_string(),
            ColumnId::Metric(name) => row.get(name).map(json_to_string).unwrap_or_default(),
        })
        .collect()
}

/// Renders the header and all rows as CSV text.
pub fn render(table: &WideTable, columns: &ColumnSpec, format: &CsvFormat) -> io::Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(format.field_delimiter.as_byte())
        .terminator(format.record_delimiter.terminator())
        .from_writer(Vec::new());

    wtr.write_record(columns.titles())?;
    for row in table.rows() {
        wtr.write_record(record(row, columns))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| io::Error::other(e.to_string()))?;
    String::from_utf8(bytes).map_err(io::Error::other)
}

/// Encodes CSV text into the bytes written to disk.
///
/// `ascii` and `latin1` replace characters they cannot represent with `?`.
pub fn encode(text: &str, encoding: OutputEncoding) -> Vec<u8> {
    match encoding {
        OutputEncoding::Utf8 => text.as_bytes().to_vec(),
        OutputEncoding::Ascii => text
            .chars()
            .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
            .collect(),
        OutputEncoding::Latin1 => text
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect(),
        OutputEncoding::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        OutputEncoding::Base64 => STANDARD.encode(text).into_bytes(),
        OutputEncoding::Base64Url => URL_SAFE_NO_PAD.encode(text).into_bytes(),
    }
}

/// Writes `table` to `config.destination`, creating or truncating the file.
pub fn write(table: &WideTable, columns: &ColumnSpec, config: &CsvConfig) -> Result<()> {
    let failure = |source| ConvertError::WriteFailure {
        path: config.destination.clone(),
        source,
    };

    let text = render(table, columns, &config.format).map_err(failure)?;
    fs::write(&config.destination, encode(&text, config.format.encoding)).map_err(failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldDelimiter, RecordDelimiter};
    use crate::pivot::{TimestampOrder, build_wide_table};
    use crate::series::{MetricSeries, Sample};
    use serde_json::json;

    fn table(series: &[MetricSeries]) -> (WideTable, ColumnSpec) {
        build_wide_table(series, TimestampOrder::Auto).unwrap()
    }

    #[test]
    fn renders_default_dialect() {
        let (t, c) = table(&[
            MetricSeries::new("A", vec![Sample::new(1i64, 10), Sample::new(2i64, 20)]),
            MetricSeries::new("B", vec![Sample::new(1i64, 100)]),
        ]);
        let csv = render(&t, &c, &CsvFormat::default()).unwrap();
        assert_eq!(csv, "UNIX Timestamp;A;B\r\n1;10;100\r\n2;20;\r\n");
    }

    #[test]
    fn renders_comma_and_newline() {
        let format = CsvFormat {
            field_delimiter: FieldDelimiter::Comma,
            record_delimiter: RecordDelimiter::Lf,
            ..CsvFormat::default()
        };
        let (t, c) = table(&[MetricSeries::new(
            "x,y",
            vec![Sample::new(5i64, json!("a\"b")), Sample::new(6i64, json!(null))],
        )]);
        let csv = render(&t, &c, &format).unwrap();
        assert_eq!(csv, "UNIX Timestamp,\"x,y\"\n5,\"a\"\"b\"\n6,\n");
    }

    #[test]
    fn scalar_values_stringify() {
        let (t, c) = table(&[MetricSeries::new(
            "v",
            vec![
                Sample::new(1i64, json!(true)),
                Sample::new(2i64, json!(1.5)),
                Sample::new(3i64, json!([1, 2])),
            ],
        )]);
        let csv = render(&t, &c, &CsvFormat::default()).unwrap();
        assert_eq!(csv, "UNIX Timestamp;v\r\n1;true\r\n2;1.5\r\n3;[1,2]\r\n");
    }

    #[test]
    fn encodes_text() {
        assert_eq!(encode("é;a", OutputEncoding::Utf8), "é;a".as_bytes());
        assert_eq!(encode("é;a", OutputEncoding::Latin1), [0xE9, b';', b'a']);
        assert_eq!(encode("é€", OutputEncoding::Ascii), b"??");
        assert_eq!(encode("€", OutputEncoding::Latin1), b"?");
        assert_eq!(encode("A", OutputEncoding::Utf16Le), [b'A', 0]);
        assert_eq!(encode("ab?", OutputEncoding::Base64), b"YWI/");
        assert_eq!(encode("ab?", OutputEncoding::Base64Url), b"YWI_");
        assert_eq!(encode("a", OutputEncoding::Base64), b"YQ==");
        assert_eq!(encode("a", OutputEncoding::Base64Url), b"YQ");
    }

    #[test]
    fn write_failure_names_destination() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("missing").join("out.csv");
        let (t, c) = table(&[]);

        let err = write(&t, &c, &CsvConfig::new(CsvFormat::default(), &destination)).unwrap_err();
        assert!(matches!(err, ConvertError::WriteFailure { ref path, .. } if *path == destination));
    }
}
