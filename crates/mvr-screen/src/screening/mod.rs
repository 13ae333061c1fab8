//! Motor vehicle record screening: fact records in, ACCEPT/REJECT decisions out.
//!
//! The policy engine is a pure function of the fact record and its rule table. Extraction,
//! storage, and HTTP transport sit around it behind traits so each piece can be exercised on
//! its own.

pub mod domain;
pub mod evaluation;
pub mod extraction;
pub mod matching;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Decision, DecisionResult, FactRecord, MajorIndicator, MajorIndicators, ScreeningId,
    ViolationEntry, ViolationFlag,
};
pub use evaluation::{
    EvaluationOutcome, PolicyEngine, PolicyRule, PolicyThresholds, ReasonTemplate, RuleHit,
    RuleSet, RuleSetError, RuleTrigger,
};
pub use extraction::{ExtractionError, FactExtractor, JsonFactExtractor, SourceDocument};
pub use matching::{count_matching_violations, normalize_text};
pub use report::{
    evaluate_batch, parse_batch, write_decision_csv, BatchEntry, BatchReportError, DecisionRow,
};
pub use repository::{RepositoryError, ScreeningRecord, ScreeningRepository, ScreeningView};
pub use router::screening_router;
pub use service::{ScreeningService, ScreeningServiceError};
