use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for screened documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreeningId(pub String);

impl ScreeningId {
    /// Numeric suffix of a sequence id such as `mvr-000042`.
    pub fn sequence(&self) -> Option<u64> {
        self.0.rsplit('-').next()?.parse().ok()
    }
}

/// Structured facts extracted from a motor vehicle record.
///
/// Every field is optional on the wire: absent booleans are `false`, an absent or null
/// accident count is `0`, and absent sequences are empty. Unknown keys are refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactRecord {
    #[serde(alias = "unreadable_pdf", deserialize_with = "null_as_default")]
    pub unreadable: bool,
    pub license_status: Option<String>,
    pub cdl_class: Option<String>,
    #[serde(
        alias = "missing_cdl_endorsements",
        deserialize_with = "null_as_default"
    )]
    pub missing_endorsements: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub medical_cert_expired: bool,
    #[serde(deserialize_with = "lenient_count")]
    pub accident_count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub violations: Vec<ViolationEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub major_indicators: MajorIndicators,
}

impl FactRecord {
    /// Record emitted when the extractor could not read the document with confidence.
    pub fn unreadable() -> Self {
        Self {
            unreadable: true,
            ..Self::default()
        }
    }
}

/// Single conviction or citation line from the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViolationEntry {
    pub incident_date: Option<String>,
    pub conviction_date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

impl ViolationEntry {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}

/// Zero-tolerance indicators reported by the extractor. The key set is closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MajorIndicators {
    #[serde(deserialize_with = "null_as_default")]
    pub speeding_over_15: bool,
    #[serde(
        alias = "tailgating_following_too_closely",
        alias = "tailgating",
        deserialize_with = "null_as_default"
    )]
    pub following_too_closely: bool,
    #[serde(alias = "texting_handheld_phone", deserialize_with = "null_as_default")]
    pub texting_handheld: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub reckless_careless: bool,
    #[serde(
        alias = "dui_dwi_alcohol_drugs",
        alias = "dui_or_dwi",
        deserialize_with = "null_as_default"
    )]
    pub dui_dwi: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub hit_and_run: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub felony_conviction: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub refused_test: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub failed_dot_drug_test_no_sap: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub license_suspended_not_reinstated: bool,
}

impl MajorIndicators {
    pub fn get(&self, indicator: MajorIndicator) -> bool {
        match indicator {
            MajorIndicator::SpeedingOver15 => self.speeding_over_15,
            MajorIndicator::FollowingTooClosely => self.following_too_closely,
            MajorIndicator::TextingHandheld => self.texting_handheld,
            MajorIndicator::RecklessCareless => self.reckless_careless,
            MajorIndicator::DuiDwi => self.dui_dwi,
            MajorIndicator::HitAndRun => self.hit_and_run,
            MajorIndicator::FelonyConviction => self.felony_conviction,
            MajorIndicator::RefusedTest => self.refused_test,
            MajorIndicator::FailedDotDrugTestNoSap => self.failed_dot_drug_test_no_sap,
            MajorIndicator::LicenseSuspendedNotReinstated => self.license_suspended_not_reinstated,
        }
    }

    pub fn set(&mut self, indicator: MajorIndicator, value: bool) {
        let slot = match indicator {
            MajorIndicator::SpeedingOver15 => &mut self.speeding_over_15,
            MajorIndicator::FollowingTooClosely => &mut self.following_too_closely,
            MajorIndicator::TextingHandheld => &mut self.texting_handheld,
            MajorIndicator::RecklessCareless => &mut self.reckless_careless,
            MajorIndicator::DuiDwi => &mut self.dui_dwi,
            MajorIndicator::HitAndRun => &mut self.hit_and_run,
            MajorIndicator::FelonyConviction => &mut self.felony_conviction,
            MajorIndicator::RefusedTest => &mut self.refused_test,
            MajorIndicator::FailedDotDrugTestNoSap => &mut self.failed_dot_drug_test_no_sap,
            MajorIndicator::LicenseSuspendedNotReinstated => {
                &mut self.license_suspended_not_reinstated
            }
        };
        *slot = value;
    }

    /// Indicators currently set, in declaration order.
    pub fn active(&self) -> impl Iterator<Item = MajorIndicator> + '_ {
        MajorIndicator::ALL
            .into_iter()
            .filter(move |indicator| self.get(*indicator))
    }
}

/// Closed enumeration of the indicator keys a fact record may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MajorIndicator {
    #[serde(rename = "speeding_over_15")]
    SpeedingOver15,
    FollowingTooClosely,
    TextingHandheld,
    RecklessCareless,
    DuiDwi,
    HitAndRun,
    FelonyConviction,
    RefusedTest,
    FailedDotDrugTestNoSap,
    LicenseSuspendedNotReinstated,
}

impl MajorIndicator {
    pub const ALL: [MajorIndicator; 10] = [
        MajorIndicator::SpeedingOver15,
        MajorIndicator::FollowingTooClosely,
        MajorIndicator::TextingHandheld,
        MajorIndicator::RecklessCareless,
        MajorIndicator::DuiDwi,
        MajorIndicator::HitAndRun,
        MajorIndicator::FelonyConviction,
        MajorIndicator::RefusedTest,
        MajorIndicator::FailedDotDrugTestNoSap,
        MajorIndicator::LicenseSuspendedNotReinstated,
    ];

    /// Flag raised when the indicator is set.
    pub const fn flag(self) -> ViolationFlag {
        match self {
            MajorIndicator::SpeedingOver15 => ViolationFlag::SpeedingOver15,
            MajorIndicator::FollowingTooClosely => ViolationFlag::FollowingTooClosely,
            MajorIndicator::TextingHandheld => ViolationFlag::TextingHandheldPhone,
            MajorIndicator::RecklessCareless => ViolationFlag::RecklessCareless,
            MajorIndicator::DuiDwi => ViolationFlag::DuiDwi,
            MajorIndicator::HitAndRun => ViolationFlag::HitAndRun,
            MajorIndicator::FelonyConviction => ViolationFlag::FelonyConviction,
            MajorIndicator::RefusedTest => ViolationFlag::RefusedTest,
            MajorIndicator::FailedDotDrugTestNoSap => ViolationFlag::FailedDotDrugTestNoSap,
            MajorIndicator::LicenseSuspendedNotReinstated => ViolationFlag::LicenseSuspended,
        }
    }
}

/// Closed flag vocabulary emitted alongside a decision.
///
/// Flags order by their code so a flag set serializes the same way regardless of the order
/// rules fired in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationFlag {
    InsufficientData,
    ExpiredMedical,
    MissingEndorsements,
    LicenseSuspended,
    #[serde(rename = "SPEEDING_OVER_15")]
    SpeedingOver15,
    FollowingTooClosely,
    TextingHandheldPhone,
    RecklessCareless,
    DuiDwi,
    HitAndRun,
    FelonyConviction,
    RefusedTest,
    FailedDotDrugTestNoSap,
    #[serde(rename = "ACCIDENTS_2_PLUS")]
    Accidents2Plus,
    #[serde(rename = "UNINSPECTED_VEHICLE_2_PLUS")]
    UninspectedVehicle2Plus,
}

impl ViolationFlag {
    pub const fn code(self) -> &'static str {
        match self {
            ViolationFlag::InsufficientData => "INSUFFICIENT_DATA",
            ViolationFlag::ExpiredMedical => "EXPIRED_MEDICAL",
            ViolationFlag::MissingEndorsements => "MISSING_ENDORSEMENTS",
            ViolationFlag::LicenseSuspended => "LICENSE_SUSPENDED",
            ViolationFlag::SpeedingOver15 => "SPEEDING_OVER_15",
            ViolationFlag::FollowingTooClosely => "FOLLOWING_TOO_CLOSELY",
            ViolationFlag::TextingHandheldPhone => "TEXTING_HANDHELD_PHONE",
            ViolationFlag::RecklessCareless => "RECKLESS_CARELESS",
            ViolationFlag::DuiDwi => "DUI_DWI",
            ViolationFlag::HitAndRun => "HIT_AND_RUN",
            ViolationFlag::FelonyConviction => "FELONY_CONVICTION",
            ViolationFlag::RefusedTest => "REFUSED_TEST",
            ViolationFlag::FailedDotDrugTestNoSap => "FAILED_DOT_DRUG_TEST_NO_SAP",
            ViolationFlag::Accidents2Plus => "ACCIDENTS_2_PLUS",
            ViolationFlag::UninspectedVehicle2Plus => "UNINSPECTED_VEHICLE_2_PLUS",
        }
    }
}

impl fmt::Display for ViolationFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Ord for ViolationFlag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.code().cmp(other.code())
    }
}

impl PartialOrd for ViolationFlag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Binary hiring verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub const fn label(self) -> &'static str {
        match self {
            Decision::Accept => "ACCEPT",
            Decision::Reject => "REJECT",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Verdict, justification, and flags produced for one fact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub decision: Decision,
    pub reason: String,
    pub flags: BTreeSet<ViolationFlag>,
}

impl DecisionResult {
    pub fn is_reject(&self) -> bool {
        self.decision == Decision::Reject
    }

    /// Comma separated flag codes, or `None` when no flag was raised.
    pub fn flag_summary(&self) -> String {
        if self.flags.is_empty() {
            "None".to_string()
        } else {
            self.flags
                .iter()
                .map(|flag| flag.code())
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

fn clamp_count(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

/// Accident counts arrive from an untrusted producer: null, negative, fractional, or numeric
/// strings are coerced to a non-negative integer.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawCount>::deserialize(deserializer)?;
    let count = match raw {
        None => 0,
        Some(RawCount::Integer(value)) => clamp_count(value),
        Some(RawCount::Decimal(value)) if value.is_finite() => clamp_count(value.trunc() as i64),
        Some(RawCount::Decimal(_)) => 0,
        Some(RawCount::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                0
            } else {
                let parsed = trimmed.parse::<i64>().map_err(|_| {
                    serde::de::Error::custom(format!(
                        "accident_count must be an integer, found '{trimmed}'"
                    ))
                })?;
                clamp_count(parsed)
            }
        }
    };
    Ok(count)
}
