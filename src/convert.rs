//! One conversion run: load a trend export, pivot it and write the CSV.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::config::{
    CsvConfig, CsvFormat, DEFAULT_ENCODING, DEFAULT_FIELD_DELIMITER, DEFAULT_RECORD_DELIMITER,
};
use crate::error::{ConvertError, Result};
use crate::pivot::{TimestampOrder, build_wide_table};
use crate::series::{MetricSeries, parse_document};
use crate::writer;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Metric names in order of first appearance in the input.
    pub metrics: Vec<String>,
    pub rows: usize,
    pub columns: usize,
}

/// Raw, unvalidated options of a single conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub encoding: String,
    pub field_delimiter: String,
    pub record_delimiter: String,
    pub timestamp_order: TimestampOrder,
}

impl Default for ConvertRequest {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            encoding: DEFAULT_ENCODING.to_string(),
            field_delimiter: DEFAULT_FIELD_DELIMITER.to_string(),
            record_delimiter: DEFAULT_RECORD_DELIMITER.to_string(),
            timestamp_order: TimestampOrder::default(),
        }
    }
}

impl ConvertRequest {
    /// A request with default delimiters and encoding.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: Some(input.into()),
            output: Some(output.into()),
            ..Self::default()
        }
    }

    /// Checks paths and options in the order a user would fix them.
    pub fn validate(&self) -> Result<(PathBuf, CsvConfig)> {
        let input = self.input.clone().ok_or(ConvertError::InputNotSpecified)?;
        if !input.exists() {
            return Err(ConvertError::InputNotFound(input));
        }
        let output = self.output.clone().ok_or(ConvertError::OutputNotSpecified)?;
        let format = CsvFormat::parse(
            &self.field_delimiter,
            &self.record_delimiter,
            &self.encoding,
        )?;
        Ok((input, CsvConfig::new(format, output)))
    }

    pub fn run(&self) -> Result<ConversionSummary> {
        let (input, config) = self.validate()?;
        convert_file(&input, &config, self.timestamp_order)
    }
}

/// Reads and types a trend export.
///
/// Zero-length files are rejected before any JSON parsing is attempted.
pub fn read_document(path: &Path) -> Result<Vec<MetricSeries>> {
    let content = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConvertError::InputNotFound(path.to_path_buf()),
        _ => ConvertError::InputUnreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;
    if content.is_empty() {
        return Err(ConvertError::InputEmpty(path.to_path_buf()));
    }

    let document: Value =
        serde_json::from_slice(&content).map_err(|source| ConvertError::InputNotValidJson {
            path: path.to_path_buf(),
            source,
        })?;
    parse_document(document)
}

/// Converts `input` into the file described by `config`.
pub fn convert_file(
    input: &Path,
    config: &CsvConfig,
    order: TimestampOrder,
) -> Result<ConversionSummary> {
    info!(input = %input.display(), "parsing JSON data");
    let series = read_document(input)?;

    let metrics: Vec<String> = series.iter().map(|s| s.name.clone()).collect();
    info!(
        "found {} trend items to parse: {}",
        metrics.len(),
        metrics.join(", ")
    );
    for (idx, s) in series.iter().enumerate() {
        debug!(
            "parsing {}/{}: {} ({} samples)",
            idx + 1,
            series.len(),
            s.name,
            s.samples.len()
        );
    }

    info!("sorting data by timestamp");
    let (table, columns) = build_wide_table(&series, order)?;
    info!(
        rows = table.len(),
        columns = columns.columns().len(),
        encoding = %config.format.encoding,
        "writing CSV file"
    );
    writer::write(&table, &columns, config)?;

    Ok(ConversionSummary {
        input: input.to_path_buf(),
        output: config.destination.clone(),
        metrics,
        rows: table.len(),
        columns: columns.columns().len(),
    })
}
