//! External Dependency Types
//!
//! Detected outbound HTTP references and their deduplicated, risk-scored
//! cross-artifact view. Endpoint identity key = lower-cased domain.

use serde::{Deserialize, Serialize};

use crate::types::severity::{AutomationKind, Confidence, ExecutionMode, Severity, TrustLevel};

// =============================================================================
// External Call
// =============================================================================

/// One detected outbound HTTP reference inside a single artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalCall {
    pub url: String,
    /// Lower-cased host extracted from the URL.
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// The action or call site that contained the reference.
    pub source: String,
    /// How direct the evidence was: explicit URI+method vs a bare string
    /// match.
    pub confidence: Confidence,
}

// =============================================================================
// External Call Source
// =============================================================================

/// One artifact that references an external domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalCallSource {
    pub automation_kind: AutomationKind,
    pub name: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    pub mode: ExecutionMode,
    pub confidence: Confidence,
}

// =============================================================================
// Risk Factor
// =============================================================================

/// One independently triggered risk attached to an endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    pub severity: Severity,
    /// Short factor label, e.g. "Insecure protocol".
    pub factor: String,
    pub description: String,
    pub recommendation: String,
}

// =============================================================================
// External Endpoint
// =============================================================================

/// The deduplicated, cross-artifact view of one external domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalEndpoint {
    /// Canonical URL sample, first one seen for the domain.
    pub url: String,
    pub domain: String,
    /// Best protocol seen: https wins over http if both appear.
    pub protocol: String,
    pub trust: TrustLevel,
    /// Sorted most-severe first.
    pub risk_factors: Vec<RiskFactor>,
    pub sources: Vec<ExternalCallSource>,
    pub reference_count: usize,
}
