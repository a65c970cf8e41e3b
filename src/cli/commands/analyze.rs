//! Analyze Command
//!
//! Runs the full analysis over one environment snapshot and writes the
//! report as JSON.

use std::fs;
use std::path::Path;

use crate::cli::ui::{Output, severity_label, trust_label};
use crate::config::{Config, ConfigLoader};
use crate::report::{AnalysisReport, build_report};
use crate::snapshot::Snapshot;
use crate::types::severity::Severity;
use crate::types::{LensError, Result};

pub fn run(
    snapshot_path: &Path,
    output_path: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let scope = Snapshot::load(snapshot_path)?.into_scope();
    let report = build_report(&scope, &config);

    let json = if config.output.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };

    match output_path {
        Some(path) => {
            fs::write(path, &json).map_err(|e| LensError::io(path, e))?;
            print_summary(&report);
            Output::new().success(&format!("Report written to {}", path.display()));
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

fn print_summary(report: &AnalysisReport) {
    let out = Output::new();

    out.header("Analysis Summary");
    println!("  Entities:           {}", report.entity_count);
    println!("  Pipelines:          {}", report.pipelines.len());
    println!("  External endpoints: {}", report.external_endpoints.len());
    println!("  Cross-entity links: {}", report.cross_entity_links.len());
    println!("  Legacy workflows:   {}", report.migrations.len());

    let critical: Vec<_> = report
        .pipelines
        .iter()
        .flat_map(|p| p.performance_risks.iter().map(move |r| (p, r)))
        .filter(|(_, r)| r.severity == Severity::Critical)
        .collect();

    if !critical.is_empty() {
        out.section("Critical Risks");
        for (pipeline, risk) in critical {
            println!(
                "  [{}] {}/{}: {}",
                severity_label(risk.severity),
                pipeline.entity,
                pipeline.event,
                risk.reason
            );
        }
    }

    let untrusted: Vec<_> = report
        .external_endpoints
        .iter()
        .filter(|e| e.trust.rank() < 2)
        .collect();

    if !untrusted.is_empty() {
        out.section("External Endpoints");
        for endpoint in untrusted {
            println!(
                "  [{}] {} ({} reference{})",
                trust_label(endpoint.trust),
                endpoint.domain,
                endpoint.reference_count,
                if endpoint.reference_count == 1 { "" } else { "s" }
            );
        }
    }
}
