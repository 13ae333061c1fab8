use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{DecisionResult, FactRecord, ScreeningId};
use super::evaluation::PolicyEngine;
use super::extraction::{ExtractionError, FactExtractor, SourceDocument};
use super::repository::{RepositoryError, ScreeningRecord, ScreeningRepository};

/// Service composing the fact extractor, the policy engine, and the audit repository.
pub struct ScreeningService<X, R> {
    extractor: Arc<X>,
    repository: Arc<R>,
    engine: Arc<PolicyEngine>,
}

static SCREENING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_screening_id() -> ScreeningId {
    let id = SCREENING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ScreeningId(format!("mvr-{id:06}"))
}

impl<X, R> ScreeningService<X, R>
where
    X: FactExtractor + 'static,
    R: ScreeningRepository + 'static,
{
    pub fn new(extractor: Arc<X>, repository: Arc<R>, engine: PolicyEngine) -> Self {
        Self {
            extractor,
            repository,
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    /// Evaluate facts that were extracted elsewhere. Nothing is stored.
    pub fn decide(&self, facts: &FactRecord) -> DecisionResult {
        let result = self.engine.evaluate(facts);
        info!(
            decision = %result.decision,
            flags = result.flags.len(),
            "fact record decided"
        );
        result
    }

    /// Extract, evaluate, and record a document.
    ///
    /// Errors mean no decision was produced; a REJECT is returned as a stored record.
    pub fn screen(
        &self,
        document: SourceDocument,
    ) -> Result<ScreeningRecord, ScreeningServiceError> {
        let facts = self.extractor.extract(&document).inspect_err(|err| {
            warn!(
                document = %document.name,
                error = %err,
                "fact extraction failed, no decision produced"
            );
        })?;

        let outcome = self.engine.assess(&facts);
        let record = ScreeningRecord {
            id: next_screening_id(),
            document_name: document.name,
            received_at: Utc::now(),
            facts,
            outcome,
        };

        let stored = self.repository.insert(record).inspect_err(|err| {
            warn!(error = %err, "screening decided but could not be recorded");
        })?;

        info!(
            screening_id = %stored.id.0,
            decision = %stored.outcome.result.decision,
            flags = stored.outcome.result.flags.len(),
            "screening decided"
        );
        Ok(stored)
    }

    /// Fetch a stored screening for API responses.
    pub fn get(&self, id: &ScreeningId) -> Result<ScreeningRecord, ScreeningServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<ScreeningRecord>, ScreeningServiceError> {
        Ok(self.repository.recent(limit)?)
    }
}

/// Error raised by the screening service. None of these are hiring decisions.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
