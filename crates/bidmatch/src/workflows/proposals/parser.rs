use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::workflows::matching::{parse_deadline, Candidate, Requirements, DEFAULT_QUANTITY};

use super::ProposalImportError;

pub(crate) fn parse_csv<R: Read>(reader: R) -> Result<Vec<Candidate>, ProposalImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut candidates = Vec::new();

    for (index, record) in csv_reader.deserialize::<ProposalRow>().enumerate() {
        let row = record?;
        candidates.push(row.into_candidate(index + 1)?);
    }

    Ok(candidates)
}

#[derive(Debug, Deserialize)]
struct ProposalRow {
    id: String,
    title: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    deadline: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    quantity: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    requirements: Option<String>,
}

impl ProposalRow {
    fn into_candidate(self, row: usize) -> Result<Candidate, ProposalImportError> {
        let deadline =
            parse_deadline(&self.deadline).ok_or_else(|| ProposalImportError::InvalidDeadline {
                row,
                value: self.deadline.clone(),
            })?;

        Ok(Candidate {
            id: self.id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            requirements: split_requirements(self.requirements.as_deref()),
            deadline,
            quantity: parse_quantity(self.quantity.as_deref()),
        })
    }
}

fn split_requirements(raw: Option<&str>) -> Requirements {
    match raw {
        Some(text) if text.contains(';') => Requirements::List(
            text.split(';')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        Some(text) => Requirements::Text(text.to_string()),
        None => Requirements::default(),
    }
}

fn parse_quantity(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(DEFAULT_QUANTITY)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
