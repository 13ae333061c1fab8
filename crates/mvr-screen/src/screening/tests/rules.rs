use std::collections::BTreeSet;

use serde_json::json;

use super::common::*;
use crate::screening::domain::{Decision, MajorIndicator, ViolationFlag};
use crate::screening::evaluation::{
    PolicyEngine, PolicyRule, PolicyThresholds, RuleSet, RuleSetError, RuleTrigger,
};

#[test]
fn standard_table_has_one_rule_per_flag() {
    let rules = RuleSet::standard(&thresholds()).expect("standard policy is valid");

    assert_eq!(rules.len(), 14);
    let flags: BTreeSet<ViolationFlag> = rules.rules().iter().map(|rule| rule.flag).collect();
    assert_eq!(flags.len(), rules.len());
    assert_eq!(RuleSet::default(), rules);
}

#[test]
fn zero_thresholds_fail_at_construction() {
    let error = RuleSet::standard(&PolicyThresholds {
        accident_threshold: 0,
        uninspected_vehicle_threshold: 2,
    })
    .expect_err("zero threshold rejected");

    assert_eq!(
        error,
        RuleSetError::ZeroThreshold {
            flag: ViolationFlag::Accidents2Plus
        }
    );
}

#[test]
fn structural_defects_are_reported() {
    assert_eq!(RuleSet::new(Vec::new()), Err(RuleSetError::Empty));

    let reserved = PolicyRule::new(
        RuleTrigger::MedicalCertExpired,
        ViolationFlag::InsufficientData,
        "Expired medical certificate.",
    );
    assert_eq!(
        RuleSet::new(vec![reserved]),
        Err(RuleSetError::ReservedFlag(ViolationFlag::InsufficientData))
    );

    let blank_phrase = PolicyRule::new(
        RuleTrigger::ViolationPattern {
            phrase: "   ".to_string(),
            threshold: 2,
        },
        ViolationFlag::UninspectedVehicle2Plus,
        "Count is {count}.",
    );
    assert_eq!(
        RuleSet::new(vec![blank_phrase]),
        Err(RuleSetError::BlankPhrase {
            flag: ViolationFlag::UninspectedVehicle2Plus
        })
    );

    let no_statuses = PolicyRule::new(
        RuleTrigger::LicenseStatusIn {
            statuses: vec![" ".to_string()],
        },
        ViolationFlag::LicenseSuspended,
        "License status not valid.",
    );
    assert!(matches!(
        RuleSet::new(vec![no_statuses]),
        Err(RuleSetError::EmptyStatusList { .. })
    ));

    let blank_reason = PolicyRule::new(
        RuleTrigger::MissingEndorsements,
        ViolationFlag::MissingEndorsements,
        "  ",
    );
    assert!(matches!(
        RuleSet::new(vec![blank_reason]),
        Err(RuleSetError::BlankReason { .. })
    ));
}

#[test]
fn template_placeholders_are_checked() {
    let count_on_boolean = PolicyRule::new(
        RuleTrigger::MedicalCertExpired,
        ViolationFlag::ExpiredMedical,
        "Expired medical certificate ({count}).",
    );
    assert_eq!(
        RuleSet::new(vec![count_on_boolean]),
        Err(RuleSetError::PlaceholderUnavailable {
            flag: ViolationFlag::ExpiredMedical,
            placeholder: "count".to_string(),
        })
    );

    let unknown = PolicyRule::new(
        RuleTrigger::AccidentCount { threshold: 2 },
        ViolationFlag::Accidents2Plus,
        "Accidents: {accidents}.",
    );
    assert!(matches!(
        RuleSet::new(vec![unknown]),
        Err(RuleSetError::UnknownPlaceholder { ref placeholder, .. }) if placeholder == "accidents"
    ));

    let unterminated = PolicyRule::new(
        RuleTrigger::AccidentCount { threshold: 2 },
        ViolationFlag::Accidents2Plus,
        "Accidents: {count",
    );
    assert!(matches!(
        RuleSet::new(vec![unterminated]),
        Err(RuleSetError::MalformedTemplate { .. })
    ));
}

#[test]
fn duplicate_triggers_are_rejected() {
    let rule = PolicyRule::new(
        RuleTrigger::Indicator {
            indicator: MajorIndicator::DuiDwi,
        },
        ViolationFlag::DuiDwi,
        "Major violation indicator: {flag}.",
    );

    assert_eq!(
        RuleSet::new(vec![rule.clone(), rule]),
        Err(RuleSetError::DuplicateTrigger {
            flag: ViolationFlag::DuiDwi
        })
    );
}

#[test]
fn related_rules_share_one_flag() {
    let rules = RuleSet::new(vec![
        PolicyRule::new(
            RuleTrigger::Indicator {
                indicator: MajorIndicator::LicenseSuspendedNotReinstated,
            },
            ViolationFlag::LicenseSuspended,
            "License suspended (not reinstated).",
        ),
        PolicyRule::new(
            RuleTrigger::LicenseStatusIn {
                statuses: vec!["suspended".to_string(), "revoked".to_string()],
            },
            ViolationFlag::LicenseSuspended,
            "License status reported as not valid.",
        ),
    ])
    .expect("valid table");
    let engine = PolicyEngine::new(rules);

    let mut record = clean_record();
    record.license_status = Some("  Revoked - pending hearing ".to_string());
    let result = engine.evaluate(&record);
    assert_eq!(result.flags, BTreeSet::from([ViolationFlag::LicenseSuspended]));
    assert_eq!(result.reason, "License status reported as not valid.");

    record
        .major_indicators
        .set(MajorIndicator::LicenseSuspendedNotReinstated, true);
    let result = engine.evaluate(&record);
    assert_eq!(result.flags.len(), 1);
    assert_eq!(
        result.reason,
        "License suspended (not reinstated). | License status reported as not valid."
    );

    record.license_status = Some("VALID".to_string());
    record
        .major_indicators
        .set(MajorIndicator::LicenseSuspendedNotReinstated, false);
    assert_eq!(engine.evaluate(&record).decision, Decision::Accept);
}

#[test]
fn shared_reason_text_keeps_one_clause_per_flag() {
    let rules = RuleSet::new(vec![
        PolicyRule::new(
            RuleTrigger::MedicalCertExpired,
            ViolationFlag::ExpiredMedical,
            "Rejected.",
        ),
        PolicyRule::new(
            RuleTrigger::MissingEndorsements,
            ViolationFlag::MissingEndorsements,
            "Rejected.",
        ),
    ])
    .expect("valid table");
    let engine = PolicyEngine::new(rules);

    let mut record = clean_record();
    record.medical_cert_expired = true;
    record.missing_endorsements = true;
    let result = engine.evaluate(&record);

    assert_eq!(
        result.flags,
        BTreeSet::from([
            ViolationFlag::ExpiredMedical,
            ViolationFlag::MissingEndorsements
        ])
    );
    assert_eq!(result.reason, "Rejected. | Rejected.");
}

#[test]
fn same_flag_and_text_is_stated_once() {
    let rules = RuleSet::new(vec![
        PolicyRule::new(
            RuleTrigger::Indicator {
                indicator: MajorIndicator::LicenseSuspendedNotReinstated,
            },
            ViolationFlag::LicenseSuspended,
            "License suspended.",
        ),
        PolicyRule::new(
            RuleTrigger::LicenseStatusIn {
                statuses: vec!["suspended".to_string()],
            },
            ViolationFlag::LicenseSuspended,
            "License suspended.",
        ),
    ])
    .expect("valid table");
    let engine = PolicyEngine::new(rules);

    let mut record = clean_record();
    record.license_status = Some("SUSPENDED".to_string());
    record
        .major_indicators
        .set(MajorIndicator::LicenseSuspendedNotReinstated, true);
    let result = engine.evaluate(&record);

    assert_eq!(result.flags, BTreeSet::from([ViolationFlag::LicenseSuspended]));
    assert_eq!(result.reason, "License suspended.");
}

#[test]
fn rule_tables_deserialize_with_validation() {
    let table = json!([
        {
            "trigger": { "kind": "accident_count", "threshold": 1 },
            "flag": "ACCIDENTS_2_PLUS",
            "reason": "Accident count is {count} (>={threshold})."
        },
        {
            "trigger": { "kind": "indicator", "indicator": "speeding_over_15" },
            "flag": "SPEEDING_OVER_15",
            "reason": "Major violation indicator: {flag}."
        }
    ]);
    let rules: RuleSet = serde_json::from_value(table).expect("table parses");
    assert_eq!(rules.len(), 2);

    let invalid = json!([
        {
            "trigger": { "kind": "violation_pattern", "phrase": "uninspected vehicle", "threshold": 0 },
            "flag": "UNINSPECTED_VEHICLE_2_PLUS",
            "reason": "Count is {count}."
        }
    ]);
    assert!(serde_json::from_value::<RuleSet>(invalid).is_err());

    let unknown_indicator = json!([
        {
            "trigger": { "kind": "indicator", "indicator": "jaywalking" },
            "flag": "DUI_DWI",
            "reason": "Major violation indicator: {flag}."
        }
    ]);
    assert!(serde_json::from_value::<RuleSet>(unknown_indicator).is_err());
}
