//! Migration Advisory Types

use serde::{Deserialize, Serialize};

use crate::types::severity::Complexity;

/// One legacy-workflow feature detected in the markup, with its flow
/// migration path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationFeature {
    pub name: String,
    pub recommendation: String,
    pub migration_path: String,
}

/// Migration advisory for one legacy workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationRecommendation {
    pub workflow_id: String,
    pub workflow_name: String,
    pub complexity: Complexity,
    /// Effort range mapped from complexity, e.g. "4-8 hours".
    pub effort: String,
    /// Numbered step-by-step textual approach.
    pub approach: Vec<String>,
    pub challenges: Vec<String>,
    pub features: Vec<MigrationFeature>,
    /// Documentation reference for the migration tooling.
    pub documentation: String,
    /// Differs categorically for real-time vs background source workflows.
    pub advisory: String,
}
