//! # trend2csv
//!
//! Converts a JSON trend export (an array of named metrics, each carrying
//! `[timestamp, value]` samples under `values.item`) into one wide CSV table:
//! a row per distinct timestamp, a column per metric.
//!
//! ```no_run
//! use trend2csv::ConvertRequest;
//!
//! let summary = ConvertRequest::new("export-data.json", "export-data.csv").run()?;
//! println!("{} rows", summary.rows);
//! # Ok::<(), trend2csv::ConvertError>(())
//! ```
//!
//! The `watch` module converts new files dropped into a directory.

pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod pivot;
pub mod series;
pub mod watch;
pub mod writer;

pub use config::{CsvConfig, CsvFormat, FieldDelimiter, OutputEncoding, RecordDelimiter};
pub use convert::{ConversionSummary, ConvertRequest, convert_file, read_document};
pub use error::{ConvertError, Result};
pub use pivot::{ColumnSpec, TimestampOrder, WideRow, WideTable, build_wide_table};
pub use series::{MetricSeries, Sample, Timestamp};
pub use watch::WatchConfig;
