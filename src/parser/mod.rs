//! Definition Parsers
//!
//! Pure functions turning one artifact's raw serialized definition (a JSON
//! blob, an XAML-like markup document, or a script body) into a structured,
//! typed description with confidence-tagged extracted facts.
//!
//! ## Design Principles
//! - Extraction is a pipeline of independent, individually testable pattern
//!   matchers, each producing a confidence-tagged fact, not one monolithic
//!   parser
//! - Parsers never fail: malformed input yields a documented default/empty
//!   structure, logged at `warn` level
//! - Confidence travels with every extracted fact so downstream consumers
//!   can filter or distinguish low-confidence facts, never silently trust
//!   them equal to high-confidence ones

pub mod flow;
pub mod script;
pub mod workflow;

pub use flow::{FlowDefinition, parse_flow_definition};
pub use script::{ScriptAnalysis, analyze_script};
pub use workflow::{WorkflowStage, WorkflowStages, parse_workflow_stages};

/// Lower-cased host of a URL, best-effort.
///
/// Falls back to manual scheme stripping for strings the `url` crate
/// rejects, so bare regex matches still get a usable dedup key.
pub(crate) fn extract_domain(raw: &str) -> String {
    if let Ok(parsed) = url::Url::parse(raw)
        && let Some(host) = parsed.host_str()
    {
        return host.to_ascii_lowercase();
    }
    let stripped = raw
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    stripped
        .split(['/', '?', '#', ':'])
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain_lowercases_host() {
        assert_eq!(
            extract_domain("https://API.Example.com/v1/charge"),
            "api.example.com"
        );
    }

    #[test]
    fn test_extract_domain_fallback_without_scheme() {
        assert_eq!(extract_domain("api.example.com/v1"), "api.example.com");
        assert_eq!(extract_domain("api.example.com:8080/v1"), "api.example.com");
    }
}
