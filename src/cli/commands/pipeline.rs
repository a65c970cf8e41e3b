//! Pipeline Command
//!
//! Reconstructs and prints the ordered execution pipeline for one
//! (entity, event) pair from a snapshot.

use std::path::Path;

use crate::analysis::{apply_risk_analysis, build_pipeline};
use crate::cli::ui::{Output, severity_label};
use crate::config::ConfigLoader;
use crate::snapshot::Snapshot;
use crate::types::severity::EntityEvent;
use crate::types::{ExecutionPipeline, ExecutionStep, Result};

pub fn run(
    snapshot_path: &Path,
    entity: &str,
    event: EntityEvent,
    as_json: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let scope = Snapshot::load(snapshot_path)?.into_scope();

    let entity_lower = entity.to_ascii_lowercase();
    let Some(blueprint) = scope
        .blueprints
        .iter()
        .find(|b| b.entity.logical_name == entity_lower)
    else {
        Output::new().warning(&format!("No automation discovered for entity '{}'", entity));
        return Ok(());
    };

    let mut pipeline = build_pipeline(
        &blueprint.entity.logical_name,
        event,
        &blueprint.plugins,
        &blueprint.flows,
        &blueprint.business_rules,
    );
    apply_risk_analysis(&mut pipeline);

    if as_json {
        let json = if config.output.pretty {
            serde_json::to_string_pretty(&pipeline)?
        } else {
            serde_json::to_string(&pipeline)?
        };
        println!("{}", json);
    } else {
        print_pipeline(&pipeline);
    }

    Ok(())
}

fn print_pipeline(pipeline: &ExecutionPipeline) {
    let out = Output::new();

    out.header(&format!(
        "Execution Pipeline: {} / {}",
        pipeline.entity, pipeline.event
    ));
    println!(
        "  {} steps total, {} synchronous",
        pipeline.total_steps,
        pipeline.synchronous_step_count()
    );

    print_bucket(&out, "Client-Side", &pipeline.client_side);
    print_bucket(&out, "Pre-Validation (stage 10)", &pipeline.pre_validation);
    print_bucket(&out, "Pre-Operation (stage 20)", &pipeline.pre_operation);
    print_bucket(&out, "Main Operation (stage 30)", &pipeline.main_operation);
    print_bucket(&out, "Post-Operation (stage 40)", &pipeline.post_operation);
    print_bucket(&out, "Server-Side Async", &pipeline.server_side_async);

    if !pipeline.performance_risks.is_empty() {
        out.section("Performance Risks");
        for risk in &pipeline.performance_risks {
            println!("  [{}] {}", severity_label(risk.severity), risk.reason);
            println!("      → {}", risk.recommendation);
        }
    }
}

fn print_bucket(out: &Output, title: &str, steps: &[ExecutionStep]) {
    if steps.is_empty() {
        return;
    }
    out.section(&format!("{} ({})", title, steps.len()));
    for step in steps {
        let external = if step.has_external_call {
            "  [external call]"
        } else {
            ""
        };
        println!(
            "  {}. [{}] {}{}",
            step.position, step.kind, step.name, external
        );
    }
}
