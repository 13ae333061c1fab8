use crate::cli::PolicyArgs;
use crate::infra::{policy_engine, resolve_thresholds};
use clap::Args;
use mvr_screen::config::AppConfig;
use mvr_screen::error::AppError;
use mvr_screen::screening::{
    evaluate_batch, parse_batch, write_decision_csv, Decision, DecisionRow, EvaluationOutcome,
    FactExtractor, FactRecord, JsonFactExtractor, SourceDocument,
};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Path to the extracted fact record (JSON)
    #[arg(long)]
    pub(crate) facts: PathBuf,
    /// Print the decision as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
    /// Echo the parsed fact record and the rules that fired
    #[arg(long)]
    pub(crate) show_facts: bool,
    #[command(flatten)]
    pub(crate) policy: PolicyArgs,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// JSON list of fact records, or of {"document", "facts"} entries
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// CSV destination (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) policy: PolicyArgs,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        facts,
        json,
        show_facts,
        policy,
    } = args;

    let config = AppConfig::load()?;
    let engine = policy_engine(&resolve_thresholds(config.policy, policy))?;

    let name = facts.display().to_string();
    let bytes = std::fs::read(&facts)?;
    let record = JsonFactExtractor.extract(&SourceDocument::new(name, bytes))?;
    let outcome = engine.assess(&record);

    if json {
        let rendered = serde_json::to_string_pretty(&outcome.result)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        println!("{rendered}");
    } else {
        print!("{}", render_decision(&outcome));
    }

    if show_facts {
        print!("{}", render_debug(&record, &outcome)?);
    }

    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        input,
        output,
        policy,
    } = args;

    let config = AppConfig::load()?;
    let engine = policy_engine(&resolve_thresholds(config.policy, policy))?;

    let bytes = std::fs::read(&input)?;
    let records = parse_batch(&bytes)?;
    let rows = evaluate_batch(&engine, &records);

    match output {
        Some(path) => {
            let file = BufWriter::new(File::create(&path)?);
            write_decision_csv(file, &rows)?;
            println!("{}", batch_summary(&rows, &path.display().to_string()));
        }
        None => write_decision_csv(io::stdout().lock(), &rows)?,
    }

    Ok(())
}

pub(crate) fn render_decision(outcome: &EvaluationOutcome) -> String {
    let result = &outcome.result;
    format!(
        "DECISION: {}\nREASON: {}\nFLAGS: {}\n",
        result.decision,
        result.reason,
        result.flag_summary()
    )
}

fn render_debug(record: &FactRecord, outcome: &EvaluationOutcome) -> Result<String, AppError> {
    let facts = serde_json::to_string_pretty(record)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    let mut rendered = format!("\nExtracted facts:\n{facts}\n");
    if outcome.hits.is_empty() {
        rendered.push_str("Rules fired: none\n");
    } else {
        rendered.push_str("Rules fired:\n");
        for hit in &outcome.hits {
            rendered.push_str(&format!("  - {}: {}\n", hit.flag, hit.clause));
        }
    }
    Ok(rendered)
}

pub(crate) fn batch_summary(rows: &[DecisionRow], destination: &str) -> String {
    let rejected = rows
        .iter()
        .filter(|row| row.decision == Decision::Reject.label())
        .count();
    format!(
        "Wrote {} decisions to {} ({} accepted, {} rejected)",
        rows.len(),
        destination,
        rows.len() - rejected,
        rejected
    )
}
