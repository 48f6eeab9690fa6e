use anyhow::{Context, Result};
use draft_recon::{
    format_fixed_precision, format_scaled_currency, AppConfig, MatchKind, Reconciliation,
    ReconciliationEngine, VERSION,
};
use serde::Serialize;
use std::env;
use std::path::Path;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// JSON summary: every report that succeeded, plus every group that failed.
#[derive(Debug, Serialize)]
struct SummaryOutput {
    reports: Vec<Reconciliation>,
    errors: Vec<GroupFailure>,
}

#[derive(Debug, Serialize)]
struct GroupFailure {
    group: String,
    error: String,
}

// draft-recon [config.toml] [GROUP] [--json]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("draft_recon=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    // A first positional argument ending in .toml is the config file
    let (config, group) = match positional.as_slice() {
        [path, rest @ ..] if path.ends_with(".toml") => {
            (AppConfig::from_path(Path::new(path.as_str()))?, rest.first())
        }
        [group, ..] => (AppConfig::default(), Some(group)),
        [] => (AppConfig::default(), None),
    };

    let engine = ReconciliationEngine::from_config(&config).context("Failed to build engine")?;

    match group {
        Some(group) => {
            let report = engine.reconcile(group)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        None => run_summary(&engine, &config, json)?,
    }

    Ok(())
}

fn run_summary(engine: &ReconciliationEngine, config: &AppConfig, json: bool) -> Result<()> {
    let available = engine.available_groups();

    if json {
        let summary = collect_summary(engine, &available);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("⚾ draft-recon {}", VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if available.is_empty() {
        println!("No prediction files found in {}", config.data_dir.display());
        return Ok(());
    }

    for code in &available {
        match engine.reconcile(code) {
            Ok(report) => println!("✓ {}", report.summary()),
            Err(e) => println!("✗ {}", e),
        }
    }

    Ok(())
}

fn collect_summary(engine: &ReconciliationEngine, codes: &[String]) -> SummaryOutput {
    let mut summary = SummaryOutput {
        reports: Vec::new(),
        errors: Vec::new(),
    };

    for code in codes {
        match engine.reconcile(code) {
            Ok(report) => summary.reports.push(report),
            Err(e) => {
                warn!(group = %code, error = %e, "group could not be reconciled");
                summary.errors.push(GroupFailure {
                    group: code.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    summary
}

fn print_report(report: &Reconciliation) {
    println!("⚾ {}", report.group.display_name());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{}", report.summary());

    println!("\n📋 Predictions");
    for result in &report.results {
        let actual = match (&result.outcome, result.match_kind) {
            (Some(o), MatchKind::Exact) => format!("round {} pick {}", o.sequence_major, o.pick_label()),
            (Some(o), _) => format!("~ {} (round {} pick {})", o.entity_name, o.sequence_major, o.pick_label()),
            (None, _) => "not drafted by this team".to_string(),
        };
        println!(
            "  {:<28} {:>10} {:>10}  {}",
            result.prediction.entity_name,
            format_fixed_precision(result.prediction.score),
            format_scaled_currency(result.projected_amount(&report.score_regime)),
            actual
        );
    }

    println!("\n🗂️  Rounds");
    for slot in report.rounds() {
        let model = match &slot.prediction {
            Some(p) => p.prediction.entity_name.clone(),
            None => "model not applied".to_string(),
        };
        for pick in &slot.picks {
            println!(
                "  {:<4} #{:<4} {:<28} {:>10}  {} {}",
                slot.round,
                pick.outcome.pick_label(),
                pick.outcome.entity_name,
                format_scaled_currency(pick.outcome.amount),
                if pick.predicted { "★" } else { " " },
                model
            );
        }
    }

    let amounts = report.outcome_amounts();
    println!(
        "\n💰 Signed total {} across {} picks ({} without amount)",
        format_scaled_currency(Some(amounts.sum)),
        amounts.count,
        amounts.unavailable
    );
}
