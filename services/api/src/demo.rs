use crate::cli::PolicyArgs;
use crate::commands::render_decision;
use crate::infra::{policy_engine, resolve_thresholds, InMemoryScreeningRepository};
use clap::Args;
use mvr_screen::error::AppError;
use mvr_screen::screening::{
    FactRecord, JsonFactExtractor, MajorIndicator, PolicyThresholds, RuleTrigger,
    ScreeningService, SourceDocument, ViolationEntry,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the active rule table before the sample decisions.
    #[arg(long)]
    pub(crate) show_rules: bool,
    #[command(flatten)]
    pub(crate) policy: PolicyArgs,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { show_rules, policy } = args;

    let thresholds = resolve_thresholds(PolicyThresholds::default(), policy);
    let engine = policy_engine(&thresholds)?;

    println!("MVR screening demo");
    println!(
        "- accident threshold {} | uninspected vehicle threshold {}",
        thresholds.accident_threshold, thresholds.uninspected_vehicle_threshold
    );

    if show_rules {
        println!("\nPolicy table (evaluation order)");
        for (position, rule) in engine.rules().rules().iter().enumerate() {
            println!(
                "  {:>2}. {:<28} {}",
                position + 1,
                rule.flag.code(),
                describe_trigger(&rule.trigger)
            );
        }
    }

    let repository = Arc::new(InMemoryScreeningRepository::default());
    let service = ScreeningService::new(Arc::new(JsonFactExtractor), repository, engine);

    for (name, facts) in demo_records() {
        let body = serde_json::to_vec(&facts)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
        println!("\n{name}");
        match service.screen(SourceDocument::new(name, body)) {
            Ok(record) => {
                println!("  screening {}", record.id.0);
                for line in render_decision(&record.outcome).lines() {
                    println!("  {line}");
                }
            }
            Err(err) => println!("  No decision produced: {err}"),
        }
    }

    println!("\nEmpty upload");
    let record = service.screen(SourceDocument::new("empty.pdf", Vec::new()))?;
    for line in render_decision(&record.outcome).lines() {
        println!("  {line}");
    }

    Ok(())
}

fn describe_trigger(trigger: &RuleTrigger) -> String {
    match trigger {
        RuleTrigger::MedicalCertExpired => "medical certificate expired".to_string(),
        RuleTrigger::MissingEndorsements => "required CDL endorsements missing".to_string(),
        RuleTrigger::Indicator { indicator } => format!("indicator {indicator:?} set"),
        RuleTrigger::LicenseStatusIn { statuses } => {
            format!("license status in [{}]", statuses.join(", "))
        }
        RuleTrigger::AccidentCount { threshold } => format!("accidents >= {threshold}"),
        RuleTrigger::ViolationPattern { phrase, threshold } => {
            format!("'{phrase}' violations >= {threshold}")
        }
    }
}

fn demo_records() -> Vec<(&'static str, FactRecord)> {
    let clean = FactRecord {
        license_status: Some("VALID".to_string()),
        cdl_class: Some("A".to_string()),
        accident_count: 1,
        violations: vec![ViolationEntry {
            incident_date: Some("2024-04-18".to_string()),
            conviction_date: Some("2024-06-03".to_string()),
            description: "Speeding 6-10 MPH over limit".to_string(),
        }],
        ..FactRecord::default()
    };

    let expired_medical = FactRecord {
        medical_cert_expired: true,
        ..clean.clone()
    };

    let mut repeat_inspection = clean.clone();
    repeat_inspection.accident_count = 2;
    repeat_inspection.violations = vec![
        ViolationEntry::new("Operate Uninspected Vehicle"),
        ViolationEntry::new("UNINSPECTED  VEHICLE - CDL"),
    ];

    let mut major = clean.clone();
    major.major_indicators.set(MajorIndicator::DuiDwi, true);
    major
        .major_indicators
        .set(MajorIndicator::LicenseSuspendedNotReinstated, true);
    major.license_status = Some("SUSPENDED".to_string());

    vec![
        ("Clean record (one minor speeding)", clean),
        ("Expired medical certificate", expired_medical),
        ("Repeat accidents and inspections", repeat_inspection),
        ("DUI with suspended license", major),
    ]
}
