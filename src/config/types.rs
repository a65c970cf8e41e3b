//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/dvlens/) and project (.dvlens/) level
//! configuration.

use serde::{Deserialize, Serialize};

use crate::types::{LensError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Endpoint trust allow-list extensions
    pub domains: DomainConfig,

    /// Pipeline reconstruction settings
    pub analysis: AnalysisConfig,

    /// Report output settings
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            domains: DomainConfig::default(),
            analysis: AnalysisConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    /// Returns `LensError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        for domain in self.domains.trusted.iter().chain(&self.domains.known) {
            if domain.trim().is_empty() {
                return Err(LensError::Config(
                    "Domain allow-list entries must not be empty".to_string(),
                ));
            }
            if domain.contains("://") || domain.contains('/') {
                return Err(LensError::Config(format!(
                    "Domain allow-list entries must be bare hostnames, got '{}'",
                    domain
                )));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Domain Trust Configuration
// =============================================================================

/// Organization-specific additions to the built-in trust allow-lists.
/// Entries match by domain suffix, the same way the built-ins do.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    /// Extra domains classified as trusted (e.g. an org's own API gateway)
    pub trusted: Vec<String>,

    /// Extra domains classified as known third-party services
    pub known: Vec<String>,
}

// =============================================================================
// Analysis Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Emit pipelines for (entity, event) pairs with no automation at all.
    /// Off by default to keep reports focused.
    pub include_empty_pipelines: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            include_empty_pipelines: false,
        }
    }
}

// =============================================================================
// Output Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON reports
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_empty_domain_entry_rejected() {
        let mut config = Config::default();
        config.domains.trusted.push("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_url_shaped_domain_entry_rejected() {
        let mut config = Config::default();
        config.domains.known.push("https://api.example.com".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bare_hostname_accepted() {
        let mut config = Config::default();
        config.domains.trusted.push("gateway.contoso.com".to_string());
        assert!(config.validate().is_ok());
    }
}
