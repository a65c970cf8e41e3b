//! Artifact Records
//!
//! Typed shapes of the automation artifacts handed over by the discovery
//! collaborator. Optional fields are resolved to their documented fallbacks
//! once, at record construction, not scattered across every consumer.

use serde::{Deserialize, Serialize};

use crate::parser::flow::FlowDefinition;
use crate::parser::script::ScriptAnalysis;
use crate::types::severity::ExecutionMode;

// =============================================================================
// Entity Metadata
// =============================================================================

/// A business-data table in the environment's data model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityMetadata {
    pub logical_name: String,
    pub display_name: String,
}

impl EntityMetadata {
    pub fn new(logical_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            display_name: display_name.into(),
        }
    }
}

// =============================================================================
// Plugin Steps
// =============================================================================

/// A registered sdkmessageprocessingstep: stage/rank-ordered server-side
/// logic bound to a database message on an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginStepRecord {
    pub id: String,
    /// Registered step name; may be absent in the raw registration.
    pub name: Option<String>,
    /// Fully qualified plugin type name, always present.
    pub type_name: String,
    pub entity: String,
    /// Database message (Create/Update/Delete), matched case-insensitively.
    pub message: String,
    /// Platform stage code: 10/20/30/40 for the staged buckets.
    pub stage: i64,
    /// Execution order within a stage.
    pub rank: i64,
    pub mode: ExecutionMode,
    pub description: Option<String>,
    /// Carried verbatim into the pipeline step. Discovery cannot inspect
    /// plugin assemblies, so this is false unless a collaborator with
    /// code-level knowledge supplied it.
    #[serde(default)]
    pub has_external_call: bool,
    #[serde(default)]
    pub external_urls: Vec<String>,
}

impl PluginStepRecord {
    /// Display name falls back to the plugin type name when the step was
    /// registered without one.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.type_name)
    }

    pub fn is_synchronous(&self) -> bool {
        self.mode == ExecutionMode::Sync
    }
}

// =============================================================================
// Flows
// =============================================================================

/// A cloud flow with its definition already parsed from clientdata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRecord {
    pub id: String,
    pub name: String,
    /// Owning entity for Dataverse-triggered flows; manual and scheduled
    /// flows carry none.
    pub entity: Option<String>,
    pub active: bool,
    /// True when the flow is scoped to run from the async queue rather than
    /// being modeled at the tail of the post-operation bucket.
    pub async_scoped: bool,
    pub definition: FlowDefinition,
}

// =============================================================================
// Business Rules
// =============================================================================

/// Client-side, form-bound logic that runs in the browser on every form
/// interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessRuleRecord {
    pub id: String,
    pub name: String,
    pub entity: String,
    pub active: bool,
    pub description: Option<String>,
}

// =============================================================================
// Legacy Workflows
// =============================================================================

/// A deprecated XAML-defined workflow predating flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyWorkflowRecord {
    pub id: String,
    pub name: String,
    /// Raw XAML markup of the workflow body.
    pub markup: String,
    /// Real-time workflows block the triggering transaction.
    pub realtime: bool,
    pub on_create: bool,
    pub on_update: bool,
    pub on_delete: bool,
}

impl LegacyWorkflowRecord {
    pub fn mode(&self) -> ExecutionMode {
        if self.realtime {
            ExecutionMode::Sync
        } else {
            ExecutionMode::Async
        }
    }
}

// =============================================================================
// Scripts
// =============================================================================

/// A JavaScript web resource with its heuristic analysis attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptArtifact {
    pub id: String,
    pub name: String,
    /// Entity whose forms load the script, when known.
    pub entity: Option<String>,
    pub analysis: ScriptAnalysis,
}

// =============================================================================
// Entity Blueprint
// =============================================================================

/// One entity's metadata bundled with all automation discovered on it.
/// Input shape for the cross-entity mapper and pipeline assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityBlueprint {
    pub entity: EntityMetadata,
    pub plugins: Vec<PluginStepRecord>,
    pub flows: Vec<FlowRecord>,
    pub business_rules: Vec<BusinessRuleRecord>,
}

impl EntityBlueprint {
    pub fn new(entity: EntityMetadata) -> Self {
        Self {
            entity,
            plugins: Vec::new(),
            flows: Vec::new(),
            business_rules: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_display_name_falls_back_to_type_name() {
        let step = PluginStepRecord {
            id: "s1".into(),
            name: None,
            type_name: "Contoso.Plugins.AccountSync".into(),
            entity: "account".into(),
            message: "Update".into(),
            stage: 20,
            rank: 1,
            mode: ExecutionMode::Sync,
            description: None,
            has_external_call: false,
            external_urls: Vec::new(),
        };
        assert_eq!(step.display_name(), "Contoso.Plugins.AccountSync");
    }

    #[test]
    fn realtime_workflow_maps_to_sync_mode() {
        let wf = LegacyWorkflowRecord {
            id: "w1".into(),
            name: "Escalate case".into(),
            markup: String::new(),
            realtime: true,
            on_create: true,
            on_update: false,
            on_delete: false,
        };
        assert_eq!(wf.mode(), ExecutionMode::Sync);
    }
}
