//! Proposal intake from CSV exports or JSON feeds.

mod parser;

use std::io::Read;
use std::path::Path;

use crate::workflows::matching::Candidate;

#[derive(Debug)]
pub enum ProposalImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    InvalidDeadline { row: usize, value: String },
}

impl std::fmt::Display for ProposalImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProposalImportError::Io(err) => write!(f, "failed to read proposals: {}", err),
            ProposalImportError::Csv(err) => write!(f, "invalid proposal CSV data: {}", err),
            ProposalImportError::Json(err) => write!(f, "invalid proposal JSON data: {}", err),
            ProposalImportError::InvalidDeadline { row, value } => {
                write!(f, "row {} has an invalid deadline '{}'", row, value)
            }
        }
    }
}

impl std::error::Error for ProposalImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProposalImportError::Io(err) => Some(err),
            ProposalImportError::Csv(err) => Some(err),
            ProposalImportError::Json(err) => Some(err),
            ProposalImportError::InvalidDeadline { .. } => None,
        }
    }
}

impl From<std::io::Error> for ProposalImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ProposalImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<serde_json::Error> for ProposalImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalFormat {
    Csv,
    Json,
}

impl ProposalFormat {
    /// `.json` files are JSON; everything else is treated as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

pub struct ProposalImporter;

impl ProposalImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Candidate>, ProposalImportError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, ProposalFormat::from_path(path))
    }

    pub fn from_reader<R: Read>(
        reader: R,
        format: ProposalFormat,
    ) -> Result<Vec<Candidate>, ProposalImportError> {
        match format {
            ProposalFormat::Csv => parser::parse_csv(reader),
            ProposalFormat::Json => Ok(serde_json::from_reader(reader)?),
        }
    }
}
