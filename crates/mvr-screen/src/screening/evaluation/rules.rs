use serde::{Deserialize, Serialize};
use tracing::debug;

use super::super::domain::{FactRecord, MajorIndicator, ViolationFlag};
use super::super::matching::{count_matching_violations, normalize_text};
use super::config::PolicyThresholds;
use super::RuleHit;

pub(crate) const UNINSPECTED_VEHICLE_PHRASE: &str = "uninspected vehicle";

/// Condition a rule checks against a fact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleTrigger {
    MedicalCertExpired,
    MissingEndorsements,
    Indicator { indicator: MajorIndicator },
    /// Free-text license status containing any of the listed statuses.
    LicenseStatusIn { statuses: Vec<String> },
    AccidentCount { threshold: u32 },
    /// Violations whose description contains `phrase`, counted against `threshold`.
    ViolationPattern { phrase: String, threshold: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Evidence {
    Present,
    Counted(u32),
}

impl Evidence {
    fn count(self) -> Option<u32> {
        match self {
            Evidence::Present => None,
            Evidence::Counted(count) => Some(count),
        }
    }
}

impl RuleTrigger {
    pub(crate) fn observe(&self, facts: &FactRecord) -> Option<Evidence> {
        match self {
            RuleTrigger::MedicalCertExpired => {
                facts.medical_cert_expired.then_some(Evidence::Present)
            }
            RuleTrigger::MissingEndorsements => {
                facts.missing_endorsements.then_some(Evidence::Present)
            }
            RuleTrigger::Indicator { indicator } => facts
                .major_indicators
                .get(*indicator)
                .then_some(Evidence::Present),
            RuleTrigger::LicenseStatusIn { statuses } => {
                let status = normalize_text(facts.license_status.as_deref().unwrap_or_default());
                if status.is_empty() {
                    return None;
                }
                statuses
                    .iter()
                    .map(|candidate| normalize_text(candidate))
                    .any(|candidate| !candidate.is_empty() && status.contains(&candidate))
                    .then_some(Evidence::Present)
            }
            RuleTrigger::AccidentCount { threshold } => {
                let count = facts.accident_count;
                (count >= *threshold).then_some(Evidence::Counted(count))
            }
            RuleTrigger::ViolationPattern { phrase, threshold } => {
                let matches = count_matching_violations(&facts.violations, phrase);
                let count = u32::try_from(matches).unwrap_or(u32::MAX);
                (count >= *threshold).then_some(Evidence::Counted(count))
            }
        }
    }

    pub fn threshold(&self) -> Option<u32> {
        match self {
            RuleTrigger::AccidentCount { threshold }
            | RuleTrigger::ViolationPattern { threshold, .. } => Some(*threshold),
            _ => None,
        }
    }
}

/// Reason clause with `{flag}`, `{count}`, and `{threshold}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReasonTemplate(String);

impl ReasonTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn render(&self, flag: ViolationFlag, evidence: Evidence, threshold: Option<u32>) -> String {
        let mut clause = self.0.replace("{flag}", flag.code());
        if let Some(count) = evidence.count() {
            clause = clause.replace("{count}", &count.to_string());
        }
        if let Some(threshold) = threshold {
            clause = clause.replace("{threshold}", &threshold.to_string());
        }
        clause
    }

    fn placeholders(&self) -> Result<Vec<&str>, ()> {
        let mut names = Vec::new();
        let mut rest = self.0.as_str();
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let end = after.find('}').ok_or(())?;
            names.push(&after[..end]);
            rest = &after[end + 1..];
        }
        Ok(names)
    }
}

/// One row of the policy table: a trigger, the flag it raises, and its reason clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub trigger: RuleTrigger,
    pub flag: ViolationFlag,
    pub reason: ReasonTemplate,
}

impl PolicyRule {
    pub fn new(trigger: RuleTrigger, flag: ViolationFlag, reason: impl Into<String>) -> Self {
        Self {
            trigger,
            flag,
            reason: ReasonTemplate::new(reason),
        }
    }
}

/// Structural defects in a rule table, reported when the table is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleSetError {
    #[error("rule table contains no rules")]
    Empty,
    #[error("{0} is reserved for unreadable records")]
    ReservedFlag(ViolationFlag),
    #[error("rule for {flag} must use a threshold of at least 1")]
    ZeroThreshold { flag: ViolationFlag },
    #[error("rule for {flag} has a blank match phrase")]
    BlankPhrase { flag: ViolationFlag },
    #[error("rule for {flag} lists no license statuses")]
    EmptyStatusList { flag: ViolationFlag },
    #[error("rule for {flag} has a blank reason")]
    BlankReason { flag: ViolationFlag },
    #[error("rule for {flag} has an unterminated placeholder in its reason")]
    MalformedTemplate { flag: ViolationFlag },
    #[error("rule for {flag} uses unknown placeholder '{{{placeholder}}}'")]
    UnknownPlaceholder {
        flag: ViolationFlag,
        placeholder: String,
    },
    #[error("rule for {flag} cannot fill '{{{placeholder}}}' because its trigger does not count")]
    PlaceholderUnavailable {
        flag: ViolationFlag,
        placeholder: String,
    },
    #[error("rule for {flag} repeats a trigger already in the table")]
    DuplicateTrigger { flag: ViolationFlag },
}

/// Ordered, validated policy table. Table order is the order reason clauses are emitted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PolicyRule>", into = "Vec<PolicyRule>")]
pub struct RuleSet {
    rules: Vec<PolicyRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<PolicyRule>) -> Result<Self, RuleSetError> {
        if rules.is_empty() {
            return Err(RuleSetError::Empty);
        }

        for (index, rule) in rules.iter().enumerate() {
            validate_rule(rule)?;
            if rules[..index]
                .iter()
                .any(|earlier| earlier.trigger == rule.trigger)
            {
                return Err(RuleSetError::DuplicateTrigger { flag: rule.flag });
            }
        }

        Ok(Self { rules })
    }

    /// The strict hiring policy: zero-tolerance indicators plus the repeated accident and
    /// uninspected-vehicle thresholds.
    pub fn standard(thresholds: &PolicyThresholds) -> Result<Self, RuleSetError> {
        Self::new(standard_rules(thresholds))
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn evaluate(&self, facts: &FactRecord) -> Vec<RuleHit> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let evidence = rule.trigger.observe(facts)?;
                let clause = rule
                    .reason
                    .render(rule.flag, evidence, rule.trigger.threshold());
                debug!(flag = rule.flag.code(), %clause, "policy rule triggered");
                Some(RuleHit {
                    flag: rule.flag,
                    clause,
                    observed: evidence.count(),
                })
            })
            .collect()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: standard_rules(&PolicyThresholds::default()),
        }
    }
}

impl TryFrom<Vec<PolicyRule>> for RuleSet {
    type Error = RuleSetError;

    fn try_from(rules: Vec<PolicyRule>) -> Result<Self, Self::Error> {
        Self::new(rules)
    }
}

impl From<RuleSet> for Vec<PolicyRule> {
    fn from(value: RuleSet) -> Self {
        value.rules
    }
}

fn validate_rule(rule: &PolicyRule) -> Result<(), RuleSetError> {
    let flag = rule.flag;
    if flag == ViolationFlag::InsufficientData {
        return Err(RuleSetError::ReservedFlag(flag));
    }

    match &rule.trigger {
        RuleTrigger::AccidentCount { threshold } if *threshold == 0 => {
            return Err(RuleSetError::ZeroThreshold { flag });
        }
        RuleTrigger::ViolationPattern { phrase, threshold } => {
            if *threshold == 0 {
                return Err(RuleSetError::ZeroThreshold { flag });
            }
            if normalize_text(phrase).is_empty() {
                return Err(RuleSetError::BlankPhrase { flag });
            }
        }
        RuleTrigger::LicenseStatusIn { statuses }
            if statuses.iter().all(|status| normalize_text(status).is_empty()) =>
        {
            return Err(RuleSetError::EmptyStatusList { flag });
        }
        _ => {}
    }

    if rule.reason.as_str().trim().is_empty() {
        return Err(RuleSetError::BlankReason { flag });
    }

    let counting = rule.trigger.threshold().is_some();
    let placeholders = rule
        .reason
        .placeholders()
        .map_err(|_| RuleSetError::MalformedTemplate { flag })?;
    for placeholder in placeholders {
        match placeholder {
            "flag" => {}
            "count" | "threshold" if counting => {}
            "count" | "threshold" => {
                return Err(RuleSetError::PlaceholderUnavailable {
                    flag,
                    placeholder: placeholder.to_string(),
                })
            }
            other => {
                return Err(RuleSetError::UnknownPlaceholder {
                    flag,
                    placeholder: other.to_string(),
                })
            }
        }
    }

    Ok(())
}

pub(crate) fn standard_rules(thresholds: &PolicyThresholds) -> Vec<PolicyRule> {
    let mut rules = vec![
        PolicyRule::new(
            RuleTrigger::MedicalCertExpired,
            ViolationFlag::ExpiredMedical,
            "Expired medical certificate.",
        ),
        PolicyRule::new(
            RuleTrigger::MissingEndorsements,
            ViolationFlag::MissingEndorsements,
            "Missing required CDL endorsements.",
        ),
        PolicyRule::new(
            RuleTrigger::Indicator {
                indicator: MajorIndicator::LicenseSuspendedNotReinstated,
            },
            ViolationFlag::LicenseSuspended,
            "License suspended (not reinstated).",
        ),
    ];

    rules.extend(
        MajorIndicator::ALL
            .into_iter()
            .filter(|indicator| *indicator != MajorIndicator::LicenseSuspendedNotReinstated)
            .map(|indicator| {
                PolicyRule::new(
                    RuleTrigger::Indicator { indicator },
                    indicator.flag(),
                    "Major violation indicator: {flag}.",
                )
            }),
    );

    rules.push(PolicyRule::new(
        RuleTrigger::AccidentCount {
            threshold: thresholds.accident_threshold,
        },
        ViolationFlag::Accidents2Plus,
        "Accident count is {count} (>={threshold}).",
    ));
    rules.push(PolicyRule::new(
        RuleTrigger::ViolationPattern {
            phrase: UNINSPECTED_VEHICLE_PHRASE.to_string(),
            threshold: thresholds.uninspected_vehicle_threshold,
        },
        ViolationFlag::UninspectedVehicle2Plus,
        "Operate uninspected vehicle count is {count} (>={threshold}).",
    ));

    rules
}
