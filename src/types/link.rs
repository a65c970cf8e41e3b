//! Cross-Entity Types
//!
//! Extracted Dataverse actions and the directed links derived from them
//! when an automation's effects cross entity boundaries.

use serde::{Deserialize, Serialize};

use crate::types::severity::{AutomationKind, Confidence, CrudOperation};

/// An extracted fact inside a flow definition: one CRUD-ish operation with
/// its best-effort target entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataverseAction {
    pub operation: CrudOperation,
    /// Target entity, best-effort; `None` when no extraction tier matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    pub action_name: String,
    pub confidence: Confidence,
}

/// One declared relationship where automation on a source entity reads or
/// writes a target entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossEntityLink {
    pub source_entity: String,
    pub source_display_name: String,
    pub target_entity: String,
    pub target_display_name: String,
    pub automation_kind: AutomationKind,
    pub automation_name: String,
    pub automation_id: String,
    pub operation: CrudOperation,
    pub description: String,
    pub is_synchronous: bool,
    /// Flow-derived links carry the originating action's confidence;
    /// plugin-derived name-based links are always `Low`.
    pub confidence: Confidence,
}
