//! Execution Pipeline Types
//!
//! The reconstructed "what actually runs, in what order" model for one
//! (entity, event) pair. All value objects, built fresh per query;
//! `performance_risks` is the single field appended after construction,
//! exactly once, by the risk analyzer.

use serde::{Deserialize, Serialize};

use crate::types::severity::{EntityEvent, ExecutionMode, Severity, StepKind};

// =============================================================================
// Execution Step
// =============================================================================

/// One unit of automation inside a pipeline. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStep {
    /// 1-based, contiguous position within its bucket or list.
    pub position: usize,
    pub kind: StepKind,
    pub name: String,
    pub id: String,
    pub mode: ExecutionMode,
    /// Platform stage code, plugins only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<i64>,
    /// Execution order within the stage, plugins only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    pub has_external_call: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub external_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// =============================================================================
// Performance Risk
// =============================================================================

/// One finding emitted by the risk analyzer for a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceRisk {
    pub severity: Severity,
    /// Representative step, typically the first one that triggered the rule.
    pub step: ExecutionStep,
    pub reason: String,
    pub recommendation: String,
}

// =============================================================================
// Execution Pipeline
// =============================================================================

/// The full reconstruction for one (entity, event) pair: client-side steps,
/// four staged synchronous buckets, and the asynchronous queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPipeline {
    pub entity: String,
    pub event: EntityEvent,
    pub client_side: Vec<ExecutionStep>,
    pub pre_validation: Vec<ExecutionStep>,
    pub pre_operation: Vec<ExecutionStep>,
    pub main_operation: Vec<ExecutionStep>,
    pub post_operation: Vec<ExecutionStep>,
    pub server_side_async: Vec<ExecutionStep>,
    pub total_steps: usize,
    pub has_external_calls: bool,
    /// Empty immediately after pipeline construction; populated exactly once
    /// by the risk analyzer.
    pub performance_risks: Vec<PerformanceRisk>,
}

impl ExecutionPipeline {
    /// The four synchronous server-side buckets in execution order.
    pub fn sync_buckets(&self) -> [&Vec<ExecutionStep>; 4] {
        [
            &self.pre_validation,
            &self.pre_operation,
            &self.main_operation,
            &self.post_operation,
        ]
    }

    /// Every step in the pipeline, in bucket order.
    pub fn all_steps(&self) -> impl Iterator<Item = &ExecutionStep> {
        self.client_side
            .iter()
            .chain(self.pre_validation.iter())
            .chain(self.pre_operation.iter())
            .chain(self.main_operation.iter())
            .chain(self.post_operation.iter())
            .chain(self.server_side_async.iter())
    }

    /// Count of client-side plus all synchronous server-side steps.
    pub fn synchronous_step_count(&self) -> usize {
        self.client_side.len() + self.sync_buckets().iter().map(|b| b.len()).sum::<usize>()
    }
}
