//! External Dependency Aggregator
//!
//! Collapses every external call referenced by any flow or script in the
//! analyzed scope into a deduplicated, risk-scored endpoint inventory.
//! Identity key is the lower-cased domain; the dedup map is local to one
//! aggregation call and discarded on return.

use std::collections::BTreeMap;
use tracing::debug;

use crate::constants::{domains, endpoint};
use crate::types::severity::{AutomationKind, ExecutionMode, Severity, TrustLevel};
use crate::types::{
    ExternalCall, ExternalCallSource, ExternalEndpoint, FlowRecord, RiskFactor, ScriptArtifact,
};

/// Aggregate all external calls across flows and scripts using the built-in
/// allow-lists only.
pub fn aggregate_endpoints(
    flows: &[FlowRecord],
    scripts: &[ScriptArtifact],
) -> Vec<ExternalEndpoint> {
    aggregate_endpoints_with(flows, scripts, &[], &[])
}

/// Aggregate with extra trusted/known domains appended to the built-in
/// allow-lists (from configuration).
pub fn aggregate_endpoints_with(
    flows: &[FlowRecord],
    scripts: &[ScriptArtifact],
    extra_trusted: &[String],
    extra_known: &[String],
) -> Vec<ExternalEndpoint> {
    let mut aggregator = EndpointAggregator::default();

    for flow in flows {
        for call in &flow.definition.external_calls {
            aggregator.record(
                call,
                ExternalCallSource {
                    automation_kind: AutomationKind::Flow,
                    name: flow.name.clone(),
                    id: flow.id.clone(),
                    entity: flow.entity.clone(),
                    // Flows are always asynchronous automation.
                    mode: ExecutionMode::Async,
                    confidence: call.confidence,
                },
            );
        }
    }
    for script in scripts {
        for call in &script.analysis.external_calls {
            aggregator.record(
                call,
                ExternalCallSource {
                    automation_kind: AutomationKind::Script,
                    name: script.name.clone(),
                    id: script.id.clone(),
                    entity: script.entity.clone(),
                    mode: ExecutionMode::Client,
                    confidence: call.confidence,
                },
            );
        }
    }

    aggregator.finish(extra_trusted, extra_known)
}

// =============================================================================
// Aggregation State
// =============================================================================

/// Dedup state for one aggregation call, keyed by lower-cased domain.
/// A BTreeMap keeps domain iteration deterministic before the final sort.
#[derive(Default)]
pub struct EndpointAggregator {
    entries: BTreeMap<String, EndpointEntry>,
}

struct EndpointEntry {
    url: String,
    protocol: String,
    sources: Vec<ExternalCallSource>,
    reference_count: usize,
}

impl EndpointAggregator {
    /// Record one call against its domain: insert a new entry or update the
    /// existing one (count, protocol upgrade, source append).
    pub fn record(&mut self, call: &ExternalCall, source: ExternalCallSource) {
        let domain = call.domain.to_ascii_lowercase();
        if domain.is_empty() {
            debug!(url = call.url, "call without extractable domain, skipping");
            return;
        }
        let protocol = infer_protocol(&call.url);

        let entry = self.entries.entry(domain).or_insert_with(|| EndpointEntry {
            url: call.url.clone(),
            protocol: protocol.to_string(),
            sources: Vec::new(),
            reference_count: 0,
        });
        entry.reference_count += 1;
        // https wins over http if both appear for the same domain.
        if protocol == "https" && entry.protocol != "https" {
            entry.protocol = "https".to_string();
            entry.url = call.url.clone();
        }
        entry.sources.push(source);
    }

    /// Classify, score and sort the collected endpoints. Consumes the state.
    pub fn finish(self, extra_trusted: &[String], extra_known: &[String]) -> Vec<ExternalEndpoint> {
        let mut endpoints: Vec<ExternalEndpoint> = self
            .entries
            .into_iter()
            .map(|(domain, entry)| {
                let trust = classify_trust(&domain, extra_trusted, extra_known);
                let risk_factors = endpoint_risk_factors(&entry, trust);
                ExternalEndpoint {
                    url: entry.url,
                    domain,
                    protocol: entry.protocol,
                    trust,
                    risk_factors,
                    sources: entry.sources,
                    reference_count: entry.reference_count,
                }
            })
            .collect();

        // Riskiest first: Unknown before Known before Trusted, then domain.
        endpoints.sort_by(|a, b| {
            a.trust
                .rank()
                .cmp(&b.trust.rank())
                .then_with(|| a.domain.cmp(&b.domain))
        });
        endpoints
    }
}

fn infer_protocol(url: &str) -> &'static str {
    if url.to_ascii_lowercase().starts_with("https://") {
        "https"
    } else {
        "http"
    }
}

// =============================================================================
// Trust Classification
// =============================================================================

/// Suffix match against the vendor allow-list, then the third-party
/// allow-list, else Unknown.
pub fn classify_trust(domain: &str, extra_trusted: &[String], extra_known: &[String]) -> TrustLevel {
    let domain = domain.to_ascii_lowercase();
    let matches = |allowed: &str| {
        let allowed = allowed.to_ascii_lowercase();
        domain == allowed || domain.ends_with(&format!(".{allowed}"))
    };
    if domains::TRUSTED.iter().any(|d| matches(d))
        || extra_trusted.iter().any(|d| matches(d))
    {
        TrustLevel::Trusted
    } else if domains::KNOWN.iter().any(|d| matches(d))
        || extra_known.iter().any(|d| matches(d))
    {
        TrustLevel::Known
    } else {
        TrustLevel::Unknown
    }
}

// =============================================================================
// Risk Factors
// =============================================================================

/// Each factor is optional and independently triggered; the result is
/// sorted most-severe first.
fn endpoint_risk_factors(entry: &EndpointEntry, trust: TrustLevel) -> Vec<RiskFactor> {
    let mut factors = Vec::new();

    if entry.protocol == "http" {
        factors.push(RiskFactor {
            severity: Severity::High,
            factor: "Insecure protocol".to_string(),
            description: "Endpoint is referenced over plain HTTP".to_string(),
            recommendation: "Switch the integration to HTTPS".to_string(),
        });
    }
    if entry
        .sources
        .iter()
        .any(|s| s.mode == ExecutionMode::Sync)
    {
        factors.push(RiskFactor {
            severity: Severity::Critical,
            factor: "Synchronous dependency".to_string(),
            description: "A synchronous automation blocks on this endpoint".to_string(),
            recommendation: "Move the call to an asynchronous step".to_string(),
        });
    }
    if entry
        .sources
        .iter()
        .any(|s| s.mode == ExecutionMode::Client)
    {
        factors.push(RiskFactor {
            severity: Severity::Medium,
            factor: "Client-side dependency".to_string(),
            description: "Form scripts call this endpoint from the browser".to_string(),
            recommendation: "Check CORS posture and failure handling in the form".to_string(),
        });
    }
    if trust == TrustLevel::Unknown {
        factors.push(RiskFactor {
            severity: Severity::Medium,
            factor: "Unknown domain".to_string(),
            description: "Domain is on neither the vendor nor the known-SaaS allow-list"
                .to_string(),
            recommendation: "Verify ownership and add the domain to configuration if legitimate"
                .to_string(),
        });
    }
    if entry.reference_count >= endpoint::HEAVY_REFERENCE_COUNT {
        factors.push(RiskFactor {
            severity: Severity::Low,
            factor: "Widely referenced".to_string(),
            description: format!(
                "{} separate references to this endpoint",
                entry.reference_count
            ),
            recommendation: "Consider a single shared integration point".to_string(),
        });
    }

    factors.sort_by_key(|f| std::cmp::Reverse(f.severity.weight()));
    factors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::flow::FlowDefinition;
    use crate::types::severity::Confidence;

    fn call(url: &str, confidence: Confidence) -> ExternalCall {
        ExternalCall {
            url: url.to_string(),
            domain: crate::parser::extract_domain(url),
            method: None,
            source: "action".to_string(),
            confidence,
        }
    }

    fn source(mode: ExecutionMode) -> ExternalCallSource {
        ExternalCallSource {
            automation_kind: AutomationKind::Flow,
            name: "Sync accounts".to_string(),
            id: "f1".to_string(),
            entity: Some("account".to_string()),
            mode,
            confidence: Confidence::High,
        }
    }

    fn flow_with_calls(id: &str, urls: &[&str]) -> FlowRecord {
        let calls: Vec<ExternalCall> =
            urls.iter().map(|u| call(u, Confidence::High)).collect();
        FlowRecord {
            id: id.to_string(),
            name: format!("flow {id}"),
            entity: Some("account".to_string()),
            active: true,
            async_scoped: false,
            definition: FlowDefinition {
                has_external_calls: !calls.is_empty(),
                external_calls: calls,
                ..FlowDefinition::default()
            },
        }
    }

    #[test]
    fn test_case_insensitive_merge_with_protocol_upgrade() {
        let flows = vec![flow_with_calls(
            "f1",
            &["http://api.example.com/y", "https://API.Example.com/x"],
        )];
        let endpoints = aggregate_endpoints(&flows, &[]);
        assert_eq!(endpoints.len(), 1);
        let ep = &endpoints[0];
        assert_eq!(ep.domain, "api.example.com");
        assert_eq!(ep.protocol, "https");
        assert_eq!(ep.reference_count, 2);
        assert_eq!(ep.sources.len(), 2);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let flows = vec![flow_with_calls("f1", &["https://api.stripe.com/v1"])];
        let first = aggregate_endpoints(&flows, &[]);
        let second = aggregate_endpoints(&flows, &[]);
        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].domain, second[0].domain);
        assert_eq!(first[0].reference_count, second[0].reference_count);
    }

    #[test]
    fn test_trust_classification() {
        assert_eq!(
            classify_trust("foo.crm.dynamics.com", &[], &[]),
            TrustLevel::Trusted
        );
        assert_eq!(classify_trust("api.stripe.com", &[], &[]), TrustLevel::Known);
        assert_eq!(
            classify_trust("random-saas.io", &[], &[]),
            TrustLevel::Unknown
        );
    }

    #[test]
    fn test_extra_domains_from_config() {
        let extra = vec!["internal-partner.io".to_string()];
        assert_eq!(
            classify_trust("api.internal-partner.io", &extra, &[]),
            TrustLevel::Trusted
        );
    }

    #[test]
    fn test_endpoints_sorted_riskiest_first() {
        let flows = vec![flow_with_calls(
            "f1",
            &[
                "https://foo.crm.dynamics.com/hook",
                "https://api.stripe.com/v1",
                "https://random-saas.io/api",
            ],
        )];
        let endpoints = aggregate_endpoints(&flows, &[]);
        let order: Vec<&str> = endpoints.iter().map(|e| e.domain.as_str()).collect();
        assert_eq!(
            order,
            ["random-saas.io", "api.stripe.com", "foo.crm.dynamics.com"]
        );
    }

    #[test]
    fn test_insecure_protocol_risk_factor() {
        let flows = vec![flow_with_calls("f1", &["http://api.example.com/y"])];
        let endpoints = aggregate_endpoints(&flows, &[]);
        assert!(
            endpoints[0]
                .risk_factors
                .iter()
                .any(|f| f.severity == Severity::High && f.factor == "Insecure protocol")
        );
    }

    #[test]
    fn test_sync_source_is_critical_and_sorted_first() {
        let mut agg = EndpointAggregator::default();
        agg.record(
            &call("http://api.example.com/x", Confidence::High),
            source(ExecutionMode::Sync),
        );
        let endpoints = agg.finish(&[], &[]);
        let factors = &endpoints[0].risk_factors;
        // Critical sync-source factor sorts above the High insecure-protocol
        // and Medium unknown-domain factors.
        assert_eq!(factors[0].severity, Severity::Critical);
        assert!(factors.windows(2).all(|w| w[0].severity.weight() >= w[1].severity.weight()));
    }

    #[test]
    fn test_script_sources_are_client_mode() {
        use crate::parser::script::ScriptAnalysis;
        let script = ScriptArtifact {
            id: "s1".to_string(),
            name: "billing.js".to_string(),
            entity: Some("invoice".to_string()),
            analysis: ScriptAnalysis {
                external_calls: vec![call("https://api.example.com/z", Confidence::High)],
                ..ScriptAnalysis::default()
            },
        };
        let endpoints = aggregate_endpoints(&[], &[script]);
        assert_eq!(endpoints[0].sources[0].mode, ExecutionMode::Client);
        assert!(
            endpoints[0]
                .risk_factors
                .iter()
                .any(|f| f.factor == "Client-side dependency")
        );
    }

    #[test]
    fn test_heavy_reference_count_low_factor() {
        let urls = ["https://api.example.com/a"; 5];
        let mut agg = EndpointAggregator::default();
        for u in urls {
            agg.record(&call(u, Confidence::Low), source(ExecutionMode::Async));
        }
        let endpoints = agg.finish(&[], &[]);
        assert_eq!(endpoints[0].reference_count, 5);
        assert!(
            endpoints[0]
                .risk_factors
                .iter()
                .any(|f| f.severity == Severity::Low && f.factor == "Widely referenced")
        );
    }
}
