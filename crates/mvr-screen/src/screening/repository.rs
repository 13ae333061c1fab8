use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Decision, FactRecord, ScreeningId, ViolationFlag};
use super::evaluation::EvaluationOutcome;

/// Audit record of one screened document: the facts it was judged on and the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningRecord {
    pub id: ScreeningId,
    pub document_name: String,
    pub received_at: DateTime<Utc>,
    pub facts: FactRecord,
    pub outcome: EvaluationOutcome,
}

impl ScreeningRecord {
    pub fn view(&self) -> ScreeningView {
        ScreeningView {
            screening_id: self.id.clone(),
            document_name: self.document_name.clone(),
            received_at: self.received_at,
            decision: self.outcome.result.decision,
            reason: self.outcome.result.reason.clone(),
            flags: self.outcome.result.flags.iter().copied().collect(),
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ScreeningRepository: Send + Sync {
    fn insert(&self, record: ScreeningRecord) -> Result<ScreeningRecord, RepositoryError>;
    fn fetch(&self, id: &ScreeningId) -> Result<Option<ScreeningRecord>, RepositoryError>;
    fn recent(&self, limit: usize) -> Result<Vec<ScreeningRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Presentation-ready view of a stored screening.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningView {
    pub screening_id: ScreeningId,
    pub document_name: String,
    pub received_at: DateTime<Utc>,
    pub decision: Decision,
    pub reason: String,
    pub flags: Vec<ViolationFlag>,
}
