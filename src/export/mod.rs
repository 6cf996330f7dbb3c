pub mod office;

use crate::error::ExportError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column header used by the tabular formats
pub const LISTING_HEADER: &str = "Listing URL";

/// Title at the top of the document export
pub const DOCUMENT_TITLE: &str = "Kleinanzeigen Listing Links";

/// Download formats for a collected link list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Txt,
    Csv,
    Xlsx,
    Docx,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Txt,
        ExportFormat::Csv,
        ExportFormat::Xlsx,
        ExportFormat::Docx,
        ExportFormat::Json,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Docx => "docx",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Txt => "text/plain",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Json => "application/json",
        }
    }

    /// e.g. `kleinanzeigen_links.csv`
    pub fn default_file_name(self) -> String {
        format!("kleinanzeigen_links.{}", self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('.').to_ascii_lowercase();
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.extension() == wanted)
            .ok_or_else(|| format!("Unsupported file type: {}", s))
    }
}

/// Encode `links` in the requested format
pub fn export(links: &[String], format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Txt => Ok(encode_text(links)),
        ExportFormat::Csv => encode_csv(links),
        ExportFormat::Xlsx => office::encode_xlsx(links),
        ExportFormat::Docx => office::encode_docx(links),
        ExportFormat::Json => encode_json(links),
    }
}

/// One URL per line
pub fn encode_text(links: &[String]) -> Vec<u8> {
    let mut out = String::with_capacity(links.iter().map(|l| l.len() + 1).sum());
    for link in links {
        out.push_str(link);
        out.push('\n');
    }
    out.into_bytes()
}

/// Single column with a `Listing URL` header
pub fn encode_csv(links: &[String]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([LISTING_HEADER])?;
    for link in links {
        writer.write_record([link])?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

pub fn encode_json(links: &[String]) -> Result<Vec<u8>, ExportError> {
    Ok(serde_json::to_vec_pretty(links)?)
}
