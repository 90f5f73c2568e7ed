//! Command-line surface. Every option can also be set through a
//! `TREND2CSV_*` environment variable.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{CsvFormat, DEFAULT_ENCODING, DEFAULT_FIELD_DELIMITER, DEFAULT_RECORD_DELIMITER};
use crate::convert::ConvertRequest;
use crate::error::Result;
use crate::pivot::TimestampOrder;
use crate::watch::WatchConfig;

/// Convert a JSON trend export into a wide CSV table.
#[derive(Parser, Debug)]
#[command(author, version, about = "Convert JSON trend export data to CSV", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub convert: ConvertArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Watch a directory and convert every new .json file
    Watch(WatchArgs),
}

/// Delimiter, encoding and ordering options shared by both modes.
#[derive(Args, Debug, Clone)]
pub struct FormatArgs {
    /// File encoding (utf-8, ascii, base64, base64url, ucs2, utf16le, latin1)
    #[arg(short, long, env = "TREND2CSV_ENCODING", default_value = DEFAULT_ENCODING)]
    pub encoding: String,

    /// CSV field delimiter, only "," and ";" are supported
    #[arg(short = 'd', long, env = "TREND2CSV_FIELD_DELIMITER", default_value = DEFAULT_FIELD_DELIMITER)]
    pub field_delimiter: String,

    /// Record (line) delimiter, only "\r\n" and "\n" are supported
    #[arg(short = 'r', long, env = "TREND2CSV_RECORD_DELIMITER", default_value = DEFAULT_RECORD_DELIMITER)]
    pub record_delimiter: String,

    /// Row ordering: numeric when all timestamps are integers, or plain text
    #[arg(long, env = "TREND2CSV_TIMESTAMP_ORDER", value_enum, default_value_t = OrderArg::Auto)]
    pub timestamp_order: OrderArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderArg {
    Auto,
    Lexical,
}

impl From<OrderArg> for TimestampOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Auto => Self::Auto,
            OrderArg::Lexical => Self::Lexical,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Path to the input JSON file (export-data.json)
    #[arg(short, long, value_name = "INPUT_FILE")]
    pub input: Option<PathBuf>,

    /// Output CSV file path
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub format: FormatArgs,
}

impl ConvertArgs {
    pub fn request(&self) -> ConvertRequest {
        ConvertRequest {
            input: self.input.clone(),
            output: self.output.clone(),
            encoding: self.format.encoding.clone(),
            field_delimiter: self.format.field_delimiter.clone(),
            record_delimiter: self.format.record_delimiter.clone(),
            timestamp_order: self.format.timestamp_order.into(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Directory to watch for new JSON exports
    #[arg(long, env = "TREND2CSV_INPUT_DIR", default_value = "input")]
    pub input_dir: PathBuf,

    /// Directory the CSV files are written to
    #[arg(long, env = "TREND2CSV_OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Quiet period before a new file is converted (milliseconds)
    #[arg(long, env = "TREND2CSV_SETTLE_MS", default_value_t = 500)]
    pub settle_ms: u64,

    #[command(flatten)]
    pub format: FormatArgs,
}

impl WatchArgs {
    /// Validates the shared options once, before any file is seen.
    pub fn config(&self) -> Result<WatchConfig> {
        let format = CsvFormat::parse(
            &self.format.field_delimiter,
            &self.format.record_delimiter,
            &self.format.encoding,
        )?;
        Ok(WatchConfig {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            format,
            timestamp_order: self.format.timestamp_order.into(),
            settle: Duration::from_millis(self.settle_ms),
        })
    }
}
