use std::collections::BTreeSet;

use super::super::domain::{Decision, DecisionResult, ViolationFlag};
use super::RuleHit;

pub const REASON_SEPARATOR: &str = " | ";
pub const ACCEPT_REASON: &str = "No reject triggers found under current policy.";
pub const UNREADABLE_REASON: &str = "Document unreadable / insufficient data.";

/// Verdict for a record the extractor could not read.
pub(crate) fn insufficient_data() -> DecisionResult {
    DecisionResult {
        decision: Decision::Reject,
        reason: UNREADABLE_REASON.to_string(),
        flags: BTreeSet::from([ViolationFlag::InsufficientData]),
    }
}

/// Folds the triggered rules into one verdict. Any hit rejects.
pub(crate) fn decide_outcome(hits: &[RuleHit]) -> DecisionResult {
    if hits.is_empty() {
        return DecisionResult {
            decision: Decision::Accept,
            reason: ACCEPT_REASON.to_string(),
            flags: BTreeSet::new(),
        };
    }

    // A clause repeats only when the same flag rendered the same text twice.
    let mut emitted: Vec<(ViolationFlag, &str)> = Vec::with_capacity(hits.len());
    for hit in hits {
        let key = (hit.flag, hit.clause.as_str());
        if !emitted.contains(&key) {
            emitted.push(key);
        }
    }
    let clauses: Vec<&str> = emitted.iter().map(|(_, clause)| *clause).collect();

    DecisionResult {
        decision: Decision::Reject,
        reason: clauses.join(REASON_SEPARATOR),
        flags: hits.iter().map(|hit| hit.flag).collect(),
    }
}
