//! Form Script Parser
//!
//! Heuristic analysis of JavaScript web-resource bodies: a non-comment line
//! count as a complexity proxy, external HTTP call detection via five
//! ordered regex passes, platform-API generation fingerprints, and named
//! front-end framework fingerprints feeding a weighted complexity tier.
//!
//! Detection is best-effort over semi-structured text; absence of a finding
//! is indistinguishable from a miss and is documented as such.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::constants::{internal_urls, script as thresholds};
use crate::parser::extract_domain;
use crate::types::severity::{Complexity, Confidence};
use crate::types::ExternalCall;

// =============================================================================
// Call-Site Patterns
// =============================================================================

/// `fetch("https://...")`
static FETCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"fetch\s*\(\s*["']([^"']+)["']"#).expect("fetch regex"));

/// `xhr.open("POST", "https://...")`
static XHR_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\.open\s*\(\s*["']([A-Za-z]+)["']\s*,\s*["']([^"']+)["']"#).expect("xhr regex")
});

/// `axios.post("https://...")`
static AXIOS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"axios\s*\.\s*(get|post|put|patch|delete|head)\s*\(\s*["']([^"']+)["']"#)
        .expect("axios regex")
});

/// `$.ajax({ url: "https://..." })`, `$.get("https://...")`
static AJAX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\$\.(?:ajax|get|post)\s*\(\s*(?:\{[^{}]*?url\s*:\s*)?["']([^"']+)["']"#)
        .expect("ajax regex")
});

/// Catch-all bare URL literal.
static SCRIPT_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>()]+"#).expect("bare url regex"));

/// Framework fingerprint registry: name plus case-insensitive keywords.
const FRAMEWORK_FINGERPRINTS: &[(&str, &[&str])] = &[
    ("jQuery", &["jquery", "$.ajax", "$.fn"]),
    ("React", &["react.createelement", "reactdom", "usestate("]),
    ("Angular", &["angular.module", "ng-controller"]),
    ("Vue", &["new vue(", "vue.component"]),
    ("lodash", &["lodash", "_.foreach", "_.map("]),
    ("moment", &["moment("]),
];

const LEGACY_API_MARKERS: &[&str] = &["xrm.page", "parent.xrm", "getglobalcontext"];
const MODERN_API_MARKERS: &[&str] = &["formcontext", "xrm.webapi", "getformcontext"];

// =============================================================================
// Parsed Shape
// =============================================================================

/// Structured description of one form script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptAnalysis {
    /// Naive non-comment, non-blank line count.
    pub line_count: usize,
    pub external_calls: Vec<ExternalCall>,
    pub uses_legacy_api: bool,
    pub uses_modern_api: bool,
    pub frameworks: Vec<String>,
    pub complexity: Complexity,
}

// =============================================================================
// Entry Point
// =============================================================================

/// Analyze decoded script text. Never fails; empty input yields the default
/// empty analysis.
pub fn analyze_script(source: &str, script_name: &str) -> ScriptAnalysis {
    if source.trim().is_empty() {
        return ScriptAnalysis::default();
    }

    let line_count = count_code_lines(source);
    let external_calls = detect_external_calls(source, script_name);
    let lowered = source.to_ascii_lowercase();

    let uses_legacy_api = LEGACY_API_MARKERS.iter().any(|m| lowered.contains(m));
    let uses_modern_api = MODERN_API_MARKERS.iter().any(|m| lowered.contains(m));

    let frameworks: Vec<String> = FRAMEWORK_FINGERPRINTS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(name, _)| name.to_string())
        .collect();

    let complexity = score_complexity(line_count, external_calls.len(), frameworks.len());

    ScriptAnalysis {
        line_count,
        external_calls,
        uses_legacy_api,
        uses_modern_api,
        frameworks,
        complexity,
    }
}

// =============================================================================
// Line Counting
// =============================================================================

/// Lines skipped if empty or starting with a comment marker. A naive proxy,
/// good enough for tier scoring.
fn count_code_lines(source: &str) -> usize {
    source
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            !trimmed.is_empty()
                && !trimmed.starts_with("//")
                && !trimmed.starts_with("/*")
                && !trimmed.starts_with('*')
        })
        .count()
}

// =============================================================================
// External Call Detection
// =============================================================================

/// Five independent, ordered passes; earlier passes carry stronger evidence.
/// De-duplicated by literal URL, internal-platform URLs discarded.
fn detect_external_calls(source: &str, script_name: &str) -> Vec<ExternalCall> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut calls = Vec::new();

    let mut push = |url: &str, method: Option<String>, confidence: Confidence, calls: &mut Vec<ExternalCall>| {
        if !is_external_url(url) || !seen.insert(url.to_string()) {
            return;
        }
        calls.push(ExternalCall {
            url: url.to_string(),
            domain: extract_domain(url),
            method,
            source: script_name.to_string(),
            confidence,
        });
    };

    for caps in FETCH_RE.captures_iter(source) {
        push(&caps[1], None, Confidence::High, &mut calls);
    }
    for caps in XHR_OPEN_RE.captures_iter(source) {
        let method = caps[1].to_ascii_uppercase();
        push(&caps[2], Some(method), Confidence::High, &mut calls);
    }
    for caps in AXIOS_RE.captures_iter(source) {
        let method = caps[1].to_ascii_uppercase();
        push(&caps[2], Some(method), Confidence::High, &mut calls);
    }
    for caps in AJAX_RE.captures_iter(source) {
        push(&caps[1], None, Confidence::Medium, &mut calls);
    }
    for m in SCRIPT_URL_RE.find_iter(source) {
        push(m.as_str(), None, Confidence::Low, &mut calls);
    }

    calls
}

/// Absolute URLs only, excluding the platform's own API surface.
fn is_external_url(url: &str) -> bool {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return false;
    }
    let lowered = url.to_ascii_lowercase();
    !internal_urls::PATTERNS.iter().any(|p| lowered.contains(p))
}

// =============================================================================
// Complexity Scoring
// =============================================================================

/// Weighted score over line count, external-call count and framework count.
fn score_complexity(lines: usize, calls: usize, frameworks: usize) -> Complexity {
    let mut score: u32 = 0;
    if lines > thresholds::LINES_HEAVY {
        score += 2;
    } else if lines > thresholds::LINES_MODERATE {
        score += 1;
    }
    if calls > thresholds::CALLS_HEAVY {
        score += 2;
    } else if calls > thresholds::CALLS_ANY {
        score += 1;
    }
    if frameworks > thresholds::FRAMEWORKS_MANY {
        score += 1;
    }

    if score >= thresholds::SCORE_HIGH {
        Complexity::High
    } else if score >= thresholds::SCORE_MEDIUM {
        Complexity::Medium
    } else {
        Complexity::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_script_defaults() {
        let analysis = analyze_script("", "empty.js");
        assert_eq!(analysis.line_count, 0);
        assert!(analysis.external_calls.is_empty());
        assert_eq!(analysis.complexity, Complexity::Low);
    }

    #[test]
    fn test_comment_lines_not_counted() {
        let src = "// header\n/* block */\n * continued\nvar a = 1;\n\nvar b = 2;\n";
        assert_eq!(count_code_lines(src), 2);
    }

    #[test]
    fn test_fetch_call_detected_with_high_confidence() {
        let src = r#"fetch("https://api.stripe.com/v1/charges").then(handle);"#;
        let analysis = analyze_script(src, "billing.js");
        assert_eq!(analysis.external_calls.len(), 1);
        let call = &analysis.external_calls[0];
        assert_eq!(call.domain, "api.stripe.com");
        assert_eq!(call.confidence, Confidence::High);
    }

    #[test]
    fn test_xhr_open_captures_method() {
        let src = r#"xhr.open("POST", "https://hooks.example.io/notify");"#;
        let call = &analyze_script(src, "s.js").external_calls[0];
        assert_eq!(call.method.as_deref(), Some("POST"));
        assert_eq!(call.domain, "hooks.example.io");
    }

    #[test]
    fn test_internal_platform_urls_discarded() {
        let src = r#"
            fetch("https://org.crm.dynamics.com/api/data/v9.2/accounts");
            Xrm.WebApi.retrieveRecord("account", id);
        "#;
        let analysis = analyze_script(src, "s.js");
        assert!(analysis.external_calls.is_empty());
        assert!(analysis.uses_modern_api);
    }

    #[test]
    fn test_duplicate_urls_deduplicated_first_pass_wins() {
        let src = r#"
            fetch("https://api.example.com/a");
            var doc = "https://api.example.com/a";
        "#;
        let analysis = analyze_script(src, "s.js");
        assert_eq!(analysis.external_calls.len(), 1);
        assert_eq!(analysis.external_calls[0].confidence, Confidence::High);
    }

    #[test]
    fn test_bare_url_low_confidence() {
        let src = r#"var endpoint = "https://api.example.com/webhook";"#;
        let call = &analyze_script(src, "s.js").external_calls[0];
        assert_eq!(call.confidence, Confidence::Low);
        assert!(call.method.is_none());
    }

    #[test]
    fn test_legacy_api_fingerprint() {
        let analysis = analyze_script("var name = Xrm.Page.getAttribute('name');", "s.js");
        assert!(analysis.uses_legacy_api);
        assert!(!analysis.uses_modern_api);
    }

    #[test]
    fn test_complexity_scoring_tiers() {
        // 0 points
        assert_eq!(score_complexity(100, 0, 0), Complexity::Low);
        // 1 (lines) + 1 (calls) = 2 -> Medium
        assert_eq!(score_complexity(300, 1, 0), Complexity::Medium);
        // 2 (lines) + 2 (calls) = 4 -> High
        assert_eq!(score_complexity(600, 4, 0), Complexity::High);
        // 2 (calls) + 1 (frameworks) = 3 -> Medium
        assert_eq!(score_complexity(50, 4, 2), Complexity::Medium);
    }

    #[test]
    fn test_legacy_ajax_call_is_medium_confidence() {
        let src = "$.ajax({ url: 'https://api.example.com/x' });";
        let analysis = analyze_script(src, "s.js");
        assert_eq!(analysis.external_calls.len(), 1);
        assert_eq!(analysis.external_calls[0].confidence, Confidence::Medium);
        assert_eq!(analysis.external_calls[0].method, None);
    }

    #[test]
    fn test_framework_fingerprints() {
        let src = "$.ajax({ url: 'https://api.example.com/x' }); var m = moment();";
        let analysis = analyze_script(src, "s.js");
        assert!(analysis.frameworks.contains(&"jQuery".to_string()));
        assert!(analysis.frameworks.contains(&"moment".to_string()));
    }
}
