use std::io::Write;

use serde::{Deserialize, Serialize};

use super::domain::{DecisionResult, FactRecord};
use super::evaluation::PolicyEngine;

/// One entry of a batch input file: either bare facts or facts labelled with a document name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Labelled { document: String, facts: FactRecord },
    Bare(FactRecord),
}

/// Decision row written to a batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionRow {
    pub document: String,
    pub decision: &'static str,
    pub flags: String,
    pub reason: String,
}

impl DecisionRow {
    pub fn new(document: impl Into<String>, result: &DecisionResult) -> Self {
        Self {
            document: document.into(),
            decision: result.decision.label(),
            flags: result
                .flags
                .iter()
                .map(|flag| flag.code())
                .collect::<Vec<_>>()
                .join(";"),
            reason: result.reason.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchReportError {
    #[error("batch input is not a list of fact records: {0}")]
    Input(#[from] serde_json::Error),
    #[error("failed to write batch report: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush batch report: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses a JSON array of batch entries. Unlabelled entries are named `record-N` (1-based).
pub fn parse_batch(input: &[u8]) -> Result<Vec<(String, FactRecord)>, BatchReportError> {
    let entries: Vec<BatchEntry> = serde_json::from_slice(input)?;
    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            BatchEntry::Labelled { document, facts } => (document, facts),
            BatchEntry::Bare(facts) => (format!("record-{}", index + 1), facts),
        })
        .collect())
}

/// Evaluates every record independently, preserving input order.
pub fn evaluate_batch(
    engine: &PolicyEngine,
    records: &[(String, FactRecord)],
) -> Vec<DecisionRow> {
    records
        .iter()
        .map(|(document, facts)| DecisionRow::new(document.as_str(), &engine.evaluate(facts)))
        .collect()
}

/// Writes `document,decision,flags,reason` rows with a header line.
pub fn write_decision_csv<W: Write>(
    writer: W,
    rows: &[DecisionRow],
) -> Result<(), BatchReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
