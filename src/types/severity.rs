//! Ordered Enumerations
//!
//! Severity, confidence, trust and complexity scales used across the
//! analysis components. Each scale carries its numeric rank in exactly one
//! place so sorting never re-derives the mapping.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Severity
// =============================================================================

/// Severity of a performance risk or endpoint risk factor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Numeric weight for descending-severity sorts (Critical first).
    pub fn weight(&self) -> u8 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "Critical"),
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

// =============================================================================
// Confidence
// =============================================================================

/// A heuristic's self-reported certainty about an extracted fact.
///
/// Low-confidence facts are carried through downstream consumers with the
/// tag intact so they can be filtered or visually distinguished, never
/// silently trusted equal to high-confidence facts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

// =============================================================================
// Trust
// =============================================================================

/// Allow-list based categorization of an external domain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrustLevel {
    Trusted,
    Known,
    Unknown,
}

impl TrustLevel {
    /// Sort rank: riskiest first (Unknown=0, Known=1, Trusted=2).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Known => 1,
            Self::Trusted => 2,
        }
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trusted => write!(f, "Trusted"),
            Self::Known => write!(f, "Known"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

// =============================================================================
// Complexity
// =============================================================================

/// Complexity tier for scripts and legacy-workflow migrations.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

// =============================================================================
// Step Classification
// =============================================================================

/// Discriminant for one unit of automation inside a pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    BusinessRule,
    Plugin,
    Flow,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusinessRule => write!(f, "Business Rule"),
            Self::Plugin => write!(f, "Plugin"),
            Self::Flow => write!(f, "Flow"),
        }
    }
}

/// Kind of artifact an extracted fact originates from. Broader than
/// [`StepKind`]: form scripts never appear as pipeline steps but do appear
/// as external-call sources.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AutomationKind {
    BusinessRule,
    Plugin,
    Flow,
    Script,
}

impl fmt::Display for AutomationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusinessRule => write!(f, "Business Rule"),
            Self::Plugin => write!(f, "Plugin"),
            Self::Flow => write!(f, "Flow"),
            Self::Script => write!(f, "Script"),
        }
    }
}

/// Where and how a step executes relative to the triggering transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Runs in the user's browser on form interaction.
    Client,
    /// Blocks the server-side transaction until it completes.
    Sync,
    /// Queued after the transaction commits.
    Async,
}

impl ExecutionMode {
    pub fn blocks_transaction(&self) -> bool {
        matches!(self, Self::Client | Self::Sync)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Sync => write!(f, "sync"),
            Self::Async => write!(f, "async"),
        }
    }
}

// =============================================================================
// Operations & Triggers
// =============================================================================

/// CRUD-ish operation detected in a flow action or guessed from plugin names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CrudOperation {
    Create,
    Update,
    Delete,
    Read,
    Get,
    List,
}

impl fmt::Display for CrudOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "Create"),
            Self::Update => write!(f, "Update"),
            Self::Delete => write!(f, "Delete"),
            Self::Read => write!(f, "Read"),
            Self::Get => write!(f, "Get"),
            Self::List => write!(f, "List"),
        }
    }
}

/// Classification of a flow's first declared trigger.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Dataverse,
    Manual,
    Scheduled,
    #[default]
    Other,
}

/// Dataverse sub-event a trigger fires on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    Create,
    Update,
    Delete,
    CreateOrUpdate,
}

impl TriggerEvent {
    /// Whether a flow with this trigger participates in a pipeline built for
    /// the given entity event. `Create` accepts `Create` or `CreateOrUpdate`,
    /// `Update` accepts `Update` or `CreateOrUpdate`, `Delete` accepts
    /// `Delete` only.
    pub fn matches_event(&self, event: EntityEvent) -> bool {
        match event {
            EntityEvent::Create => matches!(self, Self::Create | Self::CreateOrUpdate),
            EntityEvent::Update => matches!(self, Self::Update | Self::CreateOrUpdate),
            EntityEvent::Delete => matches!(self, Self::Delete),
        }
    }
}

/// The entity event a pipeline is reconstructed for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityEvent {
    Create,
    Update,
    Delete,
}

impl EntityEvent {
    pub fn as_message(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for EntityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_message())
    }
}

/// Security context a flow's Dataverse trigger is scoped to run as.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunAsScope {
    User,
    BusinessUnit,
    Organization,
    #[default]
    Unknown,
}
