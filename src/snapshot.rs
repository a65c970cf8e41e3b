//! Environment Snapshot Loading
//!
//! The discovery collaborator (network retrieval, pagination, auth) is
//! external to this crate. Its hand-off format is one JSON snapshot
//! document containing the already-fetched artifact collections. Loading a
//! snapshot deserializes that document, runs the definition parsers over
//! raw clientdata/script/markup payloads, and applies fallback resolution
//! once so downstream components see fully-typed records.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::parser::{analyze_script, parse_flow_definition};
use crate::types::severity::ExecutionMode;
use crate::types::{
    BusinessRuleRecord, EntityBlueprint, EntityMetadata, FlowRecord, LegacyWorkflowRecord,
    LensError, PluginStepRecord, Result, ScriptArtifact,
};

// =============================================================================
// Raw Document Shapes
// =============================================================================

/// The on-disk snapshot document. Field codes follow the platform's own
/// conventions: plugin `mode` 0=synchronous 1=asynchronous with statecode
/// 0=enabled; flow/business-rule/workflow statecode 1=activated; workflow
/// `mode` 0=background 1=real-time.
#[derive(Debug, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub entities: Vec<RawEntity>,
    #[serde(default)]
    pub plugin_steps: Vec<RawPluginStep>,
    #[serde(default)]
    pub flows: Vec<RawFlow>,
    #[serde(default)]
    pub business_rules: Vec<RawBusinessRule>,
    #[serde(default)]
    pub scripts: Vec<RawScript>,
    #[serde(default)]
    pub workflows: Vec<RawWorkflow>,
}

#[derive(Debug, Deserialize)]
pub struct RawEntity {
    pub logical_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawPluginStep {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub type_name: String,
    pub entity: String,
    pub message: String,
    pub stage: i64,
    #[serde(default = "default_rank")]
    pub rank: i64,
    #[serde(default)]
    pub mode: i64,
    #[serde(default)]
    pub state: i64,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_rank() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct RawFlow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub state: i64,
    #[serde(default)]
    pub async_scoped: bool,
    #[serde(default)]
    pub clientdata: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawBusinessRule {
    pub id: String,
    pub name: String,
    pub entity: String,
    #[serde(default)]
    pub state: i64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawScript {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawWorkflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub markup: Option<String>,
    #[serde(default)]
    pub mode: i64,
    #[serde(default)]
    pub on_create: bool,
    #[serde(default)]
    pub on_update: bool,
    #[serde(default)]
    pub on_delete: bool,
}

// =============================================================================
// Typed Scope
// =============================================================================

/// Fully-typed analysis input produced from one snapshot: per-entity
/// blueprints plus the scope-wide collections.
#[derive(Debug)]
pub struct AnalysisScope {
    pub environment: Option<String>,
    pub blueprints: Vec<EntityBlueprint>,
    /// Every flow in scope, owning-entity or not; dependency aggregation
    /// covers all of them.
    pub flows: Vec<FlowRecord>,
    pub scripts: Vec<ScriptArtifact>,
    pub workflows: Vec<LegacyWorkflowRecord>,
}

impl Snapshot {
    /// Read and deserialize a snapshot document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| LensError::io(path, e))?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            entities = snapshot.entities.len(),
            plugins = snapshot.plugin_steps.len(),
            flows = snapshot.flows.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Run the definition parsers and assemble the typed analysis scope.
    pub fn into_scope(self) -> AnalysisScope {
        let flows: Vec<FlowRecord> = self
            .flows
            .into_iter()
            .map(|raw| {
                let definition =
                    parse_flow_definition(raw.clientdata.as_deref().unwrap_or(""), &raw.name);
                FlowRecord {
                    id: raw.id,
                    name: raw.name,
                    entity: raw.entity.map(|e| e.to_ascii_lowercase()),
                    active: raw.state == 1,
                    async_scoped: raw.async_scoped,
                    definition,
                }
            })
            .collect();

        let plugins: Vec<PluginStepRecord> = self
            .plugin_steps
            .into_iter()
            .filter(|raw| raw.state == 0)
            .map(|raw| PluginStepRecord {
                id: raw.id,
                name: raw.name,
                type_name: raw.type_name,
                entity: raw.entity.to_ascii_lowercase(),
                message: raw.message,
                stage: raw.stage,
                rank: raw.rank,
                mode: if raw.mode == 1 {
                    ExecutionMode::Async
                } else {
                    ExecutionMode::Sync
                },
                description: raw.description,
                has_external_call: false,
                external_urls: Vec::new(),
            })
            .collect();

        let business_rules: Vec<BusinessRuleRecord> = self
            .business_rules
            .into_iter()
            .map(|raw| BusinessRuleRecord {
                id: raw.id,
                name: raw.name,
                entity: raw.entity.to_ascii_lowercase(),
                active: raw.state == 1,
                description: raw.description,
            })
            .collect();

        let scripts: Vec<ScriptArtifact> = self
            .scripts
            .into_iter()
            .map(|raw| {
                let analysis = analyze_script(raw.content.as_deref().unwrap_or(""), &raw.name);
                ScriptArtifact {
                    id: raw.id,
                    name: raw.name,
                    entity: raw.entity.map(|e| e.to_ascii_lowercase()),
                    analysis,
                }
            })
            .collect();

        let workflows: Vec<LegacyWorkflowRecord> = self
            .workflows
            .into_iter()
            .map(|raw| LegacyWorkflowRecord {
                id: raw.id,
                name: raw.name,
                markup: raw.markup.unwrap_or_default(),
                realtime: raw.mode == 1,
                on_create: raw.on_create,
                on_update: raw.on_update,
                on_delete: raw.on_delete,
            })
            .collect();

        let mut blueprints: BTreeMap<String, EntityBlueprint> = self
            .entities
            .into_iter()
            .map(|raw| {
                let logical = raw.logical_name.to_ascii_lowercase();
                let display = raw.display_name.unwrap_or_else(|| logical.clone());
                (
                    logical.clone(),
                    EntityBlueprint::new(EntityMetadata::new(logical, display)),
                )
            })
            .collect();

        for plugin in plugins {
            blueprint_for(&mut blueprints, &plugin.entity).plugins.push(plugin);
        }
        for flow in &flows {
            if let Some(entity) = &flow.entity {
                blueprint_for(&mut blueprints, entity).flows.push(flow.clone());
            }
        }
        for rule in business_rules {
            blueprint_for(&mut blueprints, &rule.entity).business_rules.push(rule);
        }

        AnalysisScope {
            environment: self.environment,
            blueprints: blueprints.into_values().collect(),
            flows,
            scripts,
            workflows,
        }
    }
}

/// Look up an entity's blueprint, creating one when an artifact references
/// an entity metadata did not declare (display name falls back to the
/// logical name).
fn blueprint_for<'a>(
    blueprints: &'a mut BTreeMap<String, EntityBlueprint>,
    logical: &str,
) -> &'a mut EntityBlueprint {
    blueprints.entry(logical.to_string()).or_insert_with(|| {
        debug!(entity = logical, "artifact references undeclared entity");
        EntityBlueprint::new(EntityMetadata::new(logical, logical))
    })
}
