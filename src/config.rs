//! CSV output configuration.
//!
//! Options arrive as the strings a user typed (`";"`, `"\r\n"` as a literal
//! escape, `"utf-8"`) and are validated into closed enums here.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConvertError;

pub const DEFAULT_ENCODING: &str = "utf-8";
pub const DEFAULT_FIELD_DELIMITER: &str = ";";
pub const DEFAULT_RECORD_DELIMITER: &str = "\\r\\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldDelimiter {
    Comma,
    #[default]
    Semicolon,
}

impl FieldDelimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Semicolon => b';',
        }
    }
}

impl FromStr for FieldDelimiter {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "," => Ok(Self::Comma),
            ";" => Ok(Self::Semicolon),
            other => Err(ConvertError::UnsupportedDelimiter(other.to_string())),
        }
    }
}

/// Record terminator. Parsed from the escaped spelling (`\r\n`, `\n`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordDelimiter {
    #[default]
    CrLf,
    Lf,
}

impl RecordDelimiter {
    pub(crate) fn terminator(self) -> csv::Terminator {
        match self {
            Self::CrLf => csv::Terminator::CRLF,
            Self::Lf => csv::Terminator::Any(b'\n'),
        }
    }
}

impl FromStr for RecordDelimiter {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "\\r\\n" => Ok(Self::CrLf),
            "\\n" => Ok(Self::Lf),
            other => Err(ConvertError::UnsupportedRecordDelimiter(other.to_string())),
        }
    }
}

/// Text encoding of the written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    #[default]
    Utf8,
    Ascii,
    Latin1,
    Utf16Le,
    Base64,
    Base64Url,
}

impl FromStr for OutputEncoding {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "ascii" => Ok(Self::Ascii),
            "latin1" | "binary" => Ok(Self::Latin1),
            "ucs2" | "ucs-2" | "utf16le" | "utf-16le" => Ok(Self::Utf16Le),
            "base64" => Ok(Self::Base64),
            "base64url" => Ok(Self::Base64Url),
            _ => Err(ConvertError::UnsupportedEncoding(s.to_string())),
        }
    }
}

impl fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Utf8 => "utf-8",
            Self::Ascii => "ascii",
            Self::Latin1 => "latin1",
            Self::Utf16Le => "utf16le",
            Self::Base64 => "base64",
            Self::Base64Url => "base64url",
        })
    }
}

/// Delimiters and encoding, shared by every file a watcher converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CsvFormat {
    pub field_delimiter: FieldDelimiter,
    pub record_delimiter: RecordDelimiter,
    pub encoding: OutputEncoding,
}

impl CsvFormat {
    /// Validates raw option strings, delimiters first.
    pub fn parse(
        field_delimiter: &str,
        record_delimiter: &str,
        encoding: &str,
    ) -> Result<Self, ConvertError> {
        Ok(Self {
            field_delimiter: field_delimiter.parse()?,
            record_delimiter: record_delimiter.parse()?,
            encoding: encoding.parse()?,
        })
    }
}

/// Everything the serializer needs to produce one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvConfig {
    pub format: CsvFormat,
    pub destination: PathBuf,
}

impl CsvConfig {
    pub fn new(format: CsvFormat, destination: impl Into<PathBuf>) -> Self {
        Self {
            format,
            destination: destination.into(),
        }
    }
}
