mod config;
mod policy;
mod rules;

pub use config::PolicyThresholds;
pub use policy::{ACCEPT_REASON, REASON_SEPARATOR, UNREADABLE_REASON};
pub use rules::{PolicyRule, ReasonTemplate, RuleSet, RuleSetError, RuleTrigger};

use super::domain::{DecisionResult, FactRecord, ViolationFlag};
use policy::{decide_outcome, insufficient_data};
use serde::{Deserialize, Serialize};

/// Stateless evaluator that applies a validated rule table to fact records.
///
/// The engine only holds its immutable table, so one instance can be shared across threads
/// and evaluations never observe each other.
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    rules: RuleSet,
}

impl PolicyEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Engine running the standard table with the given thresholds.
    pub fn standard(thresholds: &PolicyThresholds) -> Result<Self, RuleSetError> {
        RuleSet::standard(thresholds).map(Self::new)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn evaluate(&self, facts: &FactRecord) -> DecisionResult {
        self.assess(facts).result
    }

    /// Evaluates a record and keeps the per-rule trail next to the verdict.
    pub fn assess(&self, facts: &FactRecord) -> EvaluationOutcome {
        if facts.unreadable {
            return EvaluationOutcome {
                result: insufficient_data(),
                hits: Vec::new(),
            };
        }

        let hits = self.rules.evaluate(facts);
        let result = decide_outcome(&hits);

        EvaluationOutcome { result, hits }
    }
}

/// A rule that fired, allowing transparent audits of a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleHit {
    pub flag: ViolationFlag,
    pub clause: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<u32>,
}

/// Evaluation output describing the verdict and the rules behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub result: DecisionResult,
    pub hits: Vec<RuleHit>,
}
