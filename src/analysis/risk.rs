//! Pipeline Risk Analyzer
//!
//! Scans a completed execution pipeline for known risk patterns and emits
//! severity-ranked findings. Every rule is independently evaluable and
//! multiple rules may fire for one pipeline; output is stable-sorted by
//! descending severity weight, ties left in discovery order.
//!
//! Each emitted risk carries a representative step, typically the first one
//! that triggered the rule; a rule whose triggering bucket is otherwise
//! empty is skipped rather than emitted without a step.

use tracing::debug;

use crate::constants::risk as thresholds;
use crate::types::severity::{ExecutionMode, Severity, StepKind};
use crate::types::{ExecutionPipeline, ExecutionStep, PerformanceRisk};

/// Analyze a pipeline. Pure and deterministic: identical input yields
/// identical output.
pub fn analyze_pipeline(pipeline: &ExecutionPipeline) -> Vec<PerformanceRisk> {
    let mut risks = Vec::new();

    check_client_side_volume(pipeline, &mut risks);
    check_sync_external_calls(pipeline, &mut risks);
    check_bucket_volume(pipeline, &mut risks);
    check_pre_validation(pipeline, &mut risks);
    check_async_volume(pipeline, &mut risks);
    check_async_external_calls(pipeline, &mut risks);
    check_total_sync_volume(pipeline, &mut risks);
    check_dual_surface_external_calls(pipeline, &mut risks);
    check_flow_volume(pipeline, &mut risks);

    // Stable sort keeps discovery order within equal severities.
    risks.sort_by_key(|r| std::cmp::Reverse(r.severity.weight()));
    debug!(
        entity = pipeline.entity,
        event = %pipeline.event,
        count = risks.len(),
        "risk analysis complete"
    );
    risks
}

/// Run the analysis and populate `performance_risks`, the one field a
/// pipeline mutates after construction. Applied exactly once per pipeline.
pub fn apply_risk_analysis(pipeline: &mut ExecutionPipeline) {
    pipeline.performance_risks = analyze_pipeline(pipeline);
}

fn push(
    risks: &mut Vec<PerformanceRisk>,
    severity: Severity,
    step: Option<&ExecutionStep>,
    reason: String,
    recommendation: &str,
) {
    // No representative step means the triggering bucket is empty; skip.
    let Some(step) = step else { return };
    risks.push(PerformanceRisk {
        severity,
        step: step.clone(),
        reason,
        recommendation: recommendation.to_string(),
    });
}

/// Client-side step count: >5 Medium, >10 an additional High. The
/// thresholds are independent, not mutually exclusive.
fn check_client_side_volume(pipeline: &ExecutionPipeline, risks: &mut Vec<PerformanceRisk>) {
    let count = pipeline.client_side.len();
    let first = pipeline.client_side.first();
    if count > thresholds::CLIENT_STEPS_MEDIUM {
        push(
            risks,
            Severity::Medium,
            first,
            format!("{count} business rules evaluate on every form interaction"),
            "Consolidate overlapping business rules to reduce form latency",
        );
    }
    if count > thresholds::CLIENT_STEPS_HIGH {
        push(
            risks,
            Severity::High,
            first,
            format!("{count} client-side steps will noticeably delay form loads"),
            "Move non-interactive logic server-side or into async flows",
        );
    }
}

/// Any synchronous-mode step with an external call blocks the user
/// transaction until the remote endpoint answers.
fn check_sync_external_calls(pipeline: &ExecutionPipeline, risks: &mut Vec<PerformanceRisk>) {
    for bucket in pipeline.sync_buckets() {
        for step in bucket.iter() {
            if step.mode == ExecutionMode::Sync && step.has_external_call {
                push(
                    risks,
                    Severity::Critical,
                    Some(step),
                    format!(
                        "'{}' makes an external call that blocks the user transaction",
                        step.name
                    ),
                    "Move the external call to an asynchronous step or flow",
                );
            }
        }
    }
}

/// Staged bucket volume: >3 Medium, >5 an additional High, per bucket.
fn check_bucket_volume(pipeline: &ExecutionPipeline, risks: &mut Vec<PerformanceRisk>) {
    let named = [
        ("pre-validation", &pipeline.pre_validation),
        ("pre-operation", &pipeline.pre_operation),
        ("main-operation", &pipeline.main_operation),
        ("post-operation", &pipeline.post_operation),
    ];
    for (label, bucket) in named {
        let count = bucket.len();
        if count > thresholds::BUCKET_STEPS_MEDIUM {
            push(
                risks,
                Severity::Medium,
                bucket.first(),
                format!("{count} steps registered in the {label} stage"),
                "Review whether every step in this stage is still needed",
            );
        }
        if count > thresholds::BUCKET_STEPS_HIGH {
            push(
                risks,
                Severity::High,
                bucket.first(),
                format!("{count} steps in the {label} stage extend every transaction"),
                "Merge related plugin steps or move work to async",
            );
        }
    }
}

/// Validation should be minimal: pre-validation bucket >2 is Medium.
fn check_pre_validation(pipeline: &ExecutionPipeline, risks: &mut Vec<PerformanceRisk>) {
    let count = pipeline.pre_validation.len();
    if count > thresholds::PRE_VALIDATION_MEDIUM {
        push(
            risks,
            Severity::Medium,
            pipeline.pre_validation.first(),
            format!("{count} pre-validation steps; validation should be minimal"),
            "Keep pre-validation to lightweight checks only",
        );
    }
}

/// Async queue volume: >10 Medium, >20 an additional High.
fn check_async_volume(pipeline: &ExecutionPipeline, risks: &mut Vec<PerformanceRisk>) {
    let count = pipeline.server_side_async.len();
    let first = pipeline.server_side_async.first();
    if count > thresholds::ASYNC_STEPS_MEDIUM {
        push(
            risks,
            Severity::Medium,
            first,
            format!("{count} async steps queue on every {} event", pipeline.event),
            "Audit the async queue for redundant automation",
        );
    }
    if count > thresholds::ASYNC_STEPS_HIGH {
        push(
            risks,
            Severity::High,
            first,
            format!("{count} async steps risk queue backlog under load"),
            "Consolidate automation or batch the work",
        );
    }
}

/// More than 5 async steps with external calls is a Low-severity note.
fn check_async_external_calls(pipeline: &ExecutionPipeline, risks: &mut Vec<PerformanceRisk>) {
    let with_calls: Vec<&ExecutionStep> = pipeline
        .server_side_async
        .iter()
        .filter(|s| s.has_external_call)
        .collect();
    if with_calls.len() > thresholds::ASYNC_EXTERNAL_LOW {
        push(
            risks,
            Severity::Low,
            with_calls.first().copied(),
            format!(
                "{} async steps depend on external endpoints",
                with_calls.len()
            ),
            "Verify retry behavior for each external dependency",
        );
    }
}

/// Client plus all four sync buckets >10 is High: total synchronous
/// automation the user waits on.
fn check_total_sync_volume(pipeline: &ExecutionPipeline, risks: &mut Vec<PerformanceRisk>) {
    let count = pipeline.synchronous_step_count();
    if count > thresholds::TOTAL_SYNC_HIGH {
        let first = pipeline.all_steps().next();
        push(
            risks,
            Severity::High,
            first,
            format!("{count} total synchronous automation steps per {}", pipeline.event),
            "Reduce the synchronous surface; every step adds user-visible latency",
        );
    }
}

/// External calls on both the synchronous and asynchronous surfaces at
/// once is Critical: one endpoint outage degrades both paths.
fn check_dual_surface_external_calls(
    pipeline: &ExecutionPipeline,
    risks: &mut Vec<PerformanceRisk>,
) {
    let sync_with_call = pipeline
        .sync_buckets()
        .into_iter()
        .flatten()
        .find(|s| s.mode == ExecutionMode::Sync && s.has_external_call);
    let async_has_call = pipeline
        .server_side_async
        .iter()
        .any(|s| s.has_external_call);
    if let Some(step) = sync_with_call
        && async_has_call
    {
        push(
            risks,
            Severity::Critical,
            Some(step),
            "External calls in both sync and async automation for this event".to_string(),
            "Centralize external integration in one monitored async path",
        );
    }
}

/// Flow-typed steps anywhere in the pipeline totaling >5 is Medium.
fn check_flow_volume(pipeline: &ExecutionPipeline, risks: &mut Vec<PerformanceRisk>) {
    let flow_steps: Vec<&ExecutionStep> = pipeline
        .all_steps()
        .filter(|s| s.kind == StepKind::Flow)
        .collect();
    if flow_steps.len() > thresholds::FLOW_STEPS_MEDIUM {
        push(
            risks,
            Severity::Medium,
            flow_steps.first().copied(),
            format!("{} flows trigger on this event", flow_steps.len()),
            "Combine flows with shared triggers to reduce run volume",
        );
    }
}
