pub mod artifact;
pub mod dependency;
pub mod error;
pub mod link;
pub mod migration;
pub mod pipeline;
pub mod severity;
pub mod utils;

pub use artifact::{
    BusinessRuleRecord, EntityBlueprint, EntityMetadata, FlowRecord, LegacyWorkflowRecord,
    PluginStepRecord, ScriptArtifact,
};
pub use dependency::{ExternalCall, ExternalCallSource, ExternalEndpoint, RiskFactor};
pub use error::{LensError, Result};
pub use link::{CrossEntityLink, DataverseAction};
pub use migration::{MigrationFeature, MigrationRecommendation};
pub use pipeline::{ExecutionPipeline, ExecutionStep, PerformanceRisk};
pub use severity::{
    AutomationKind, Complexity, Confidence, CrudOperation, EntityEvent, ExecutionMode, RunAsScope,
    Severity, StepKind, TriggerEvent, TriggerKind, TrustLevel,
};
pub use utils::{json_i64, json_path, json_string};
