//! Flow Definition Parser
//!
//! Extracts structured, confidence-tagged facts from a cloud flow's
//! `clientdata` JSON: trigger classification, the recursive action walk
//! (external HTTP calls, connector references), Dataverse CRUD actions with
//! best-effort target entities, and the run-as scope.
//!
//! The definition document is vendor-defined with no formal grammar, so
//! every extraction is heuristic. Malformed or empty input yields
//! [`FlowDefinition::default`] rather than an error.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::parser::extract_domain;
use crate::types::severity::{Confidence, CrudOperation, RunAsScope, TriggerEvent, TriggerKind};
use crate::types::utils::{json_i64, json_path, json_string};
use crate::types::{DataverseAction, ExternalCall};

/// OData-style collection segment, e.g. `/api/data/v9.2/accounts`.
static ODATA_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/api/data/v[0-9.]+/([a-z][a-z0-9_]*)").expect("odata path regex")
});

/// Bare absolute URL inside serialized action inputs.
static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'\\<>{}]+"#).expect("bare url regex"));

// =============================================================================
// Parsed Shape
// =============================================================================

/// Structured description of one flow definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowDefinition {
    pub trigger_kind: TriggerKind,
    /// Dataverse sub-event, present only for Dataverse triggers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_event: Option<TriggerEvent>,
    /// Total actions in the tree, nested and else-branch actions included.
    pub action_count: usize,
    /// Connector/connection references seen anywhere in the action tree.
    pub connectors: Vec<String>,
    pub external_calls: Vec<ExternalCall>,
    pub dataverse_actions: Vec<DataverseAction>,
    pub run_as: RunAsScope,
    pub has_external_calls: bool,
}

// =============================================================================
// Entry Point
// =============================================================================

/// Parse a flow's raw clientdata JSON. Never fails: malformed input returns
/// the default empty definition.
pub fn parse_flow_definition(raw: &str, flow_name: &str) -> FlowDefinition {
    if raw.trim().is_empty() {
        debug!(flow = flow_name, "empty flow definition, using default");
        return FlowDefinition::default();
    }

    let doc: Value = match serde_json::from_str(raw) {
        Ok(doc) => doc,
        Err(err) => {
            warn!(flow = flow_name, %err, "unparseable flow clientdata, using default");
            return FlowDefinition::default();
        }
    };

    // clientdata wraps the definition under properties.definition, but
    // exported definitions sometimes carry it at the top level.
    let definition = json_path(&doc, "properties.definition")
        .or_else(|| doc.get("definition"))
        .unwrap_or(&doc);

    let (trigger_kind, trigger_event, run_as) = parse_trigger(definition);

    let mut walk = ActionWalk::default();
    if let Some(actions) = definition.get("actions").and_then(|v| v.as_object()) {
        walk.visit_actions(actions);
    }

    let has_external_calls = !walk.external_calls.is_empty();
    FlowDefinition {
        trigger_kind,
        trigger_event,
        action_count: walk.action_count,
        connectors: walk.connectors,
        external_calls: walk.external_calls,
        dataverse_actions: walk.dataverse_actions,
        run_as,
        has_external_calls,
    }
}

// =============================================================================
// Trigger Classification
// =============================================================================

/// Classify the first declared trigger and extract its run-as scope.
fn parse_trigger(definition: &Value) -> (TriggerKind, Option<TriggerEvent>, RunAsScope) {
    let Some(triggers) = definition.get("triggers").and_then(|v| v.as_object()) else {
        return (TriggerKind::Other, None, RunAsScope::Unknown);
    };
    let Some((_, trigger)) = triggers.iter().next() else {
        return (TriggerKind::Other, None, RunAsScope::Unknown);
    };

    // Substring classification over the type identifier plus the connector
    // operation id; both carry the event wording for Dataverse triggers.
    let mut haystack = json_string(trigger, "type").unwrap_or_default();
    if let Some(kind) = json_string(trigger, "kind") {
        haystack.push(' ');
        haystack.push_str(&kind);
    }
    if let Some(op) = json_path(trigger, "inputs.host.operationId").and_then(|v| v.as_str()) {
        haystack.push(' ');
        haystack.push_str(op);
    }
    let haystack = haystack.to_ascii_lowercase();

    let kind = if haystack.contains("commondataservice")
        || haystack.contains("dataverse")
        || haystack.contains("openapiconnectionwebhook")
        || haystack.contains("subscribeon")
        || haystack.contains("subscribewebhook")
    {
        TriggerKind::Dataverse
    } else if haystack.contains("recurrence") {
        TriggerKind::Scheduled
    } else if haystack.contains("request") || haystack.contains("manual") || haystack.contains("button")
    {
        TriggerKind::Manual
    } else {
        TriggerKind::Other
    };

    let event = if kind == TriggerKind::Dataverse {
        infer_trigger_event(trigger, &haystack)
    } else {
        None
    };
    let run_as = if kind == TriggerKind::Dataverse {
        parse_run_as(trigger)
    } else {
        RunAsScope::Unknown
    };

    (kind, event, run_as)
}

/// Infer the Dataverse sub-event from substring matches on the trigger
/// identifier, falling back to the numeric subscription message code the
/// connector writes into the trigger parameters (1=Create, 2=Delete,
/// 3=Update, 4=CreateOrUpdate).
fn infer_trigger_event(trigger: &Value, haystack: &str) -> Option<TriggerEvent> {
    let has_create = haystack.contains("create");
    let has_update = haystack.contains("update");
    if has_create && has_update {
        return Some(TriggerEvent::CreateOrUpdate);
    }
    if has_create {
        return Some(TriggerEvent::Create);
    }
    if has_update {
        return Some(TriggerEvent::Update);
    }
    if haystack.contains("delete") {
        return Some(TriggerEvent::Delete);
    }

    let params = json_path(trigger, "inputs.parameters")?;
    match json_i64(params, "subscriptionRequest/message")? {
        1 => Some(TriggerEvent::Create),
        2 => Some(TriggerEvent::Delete),
        3 => Some(TriggerEvent::Update),
        4 => Some(TriggerEvent::CreateOrUpdate),
        _ => None,
    }
}

/// Run-as scope from the trigger's scope parameter, numeric (1=User,
/// 2/3=BusinessUnit, 4=Organization) or textual.
fn parse_run_as(trigger: &Value) -> RunAsScope {
    let Some(params) = json_path(trigger, "inputs.parameters") else {
        return RunAsScope::Unknown;
    };
    if let Some(code) = json_i64(params, "subscriptionRequest/scope") {
        return match code {
            1 => RunAsScope::User,
            2 | 3 => RunAsScope::BusinessUnit,
            4 => RunAsScope::Organization,
            _ => RunAsScope::Unknown,
        };
    }
    match json_string(params, "subscriptionRequest/scope")
        .unwrap_or_default()
        .to_ascii_lowercase()
        .as_str()
    {
        "user" => RunAsScope::User,
        "businessunit" => RunAsScope::BusinessUnit,
        "organization" => RunAsScope::Organization,
        _ => RunAsScope::Unknown,
    }
}

// =============================================================================
// Action Walk
// =============================================================================

/// Accumulator for the recursive walk over the action tree.
#[derive(Default)]
struct ActionWalk {
    action_count: usize,
    connectors: Vec<String>,
    external_calls: Vec<ExternalCall>,
    dataverse_actions: Vec<DataverseAction>,
}

impl ActionWalk {
    /// Visit every action in a map, recursing into nested `actions` and
    /// `else.actions` branches.
    fn visit_actions(&mut self, actions: &serde_json::Map<String, Value>) {
        for (name, action) in actions {
            self.action_count += 1;
            self.record_connector(action);
            if let Some(call) = detect_http_call(name, action) {
                self.external_calls.push(call);
            }
            if let Some(dv) = detect_dataverse_action(name, action) {
                self.dataverse_actions.push(dv);
            }

            if let Some(nested) = action.get("actions").and_then(|v| v.as_object()) {
                self.visit_actions(nested);
            }
            if let Some(else_actions) = json_path(action, "else.actions").and_then(|v| v.as_object())
            {
                self.visit_actions(else_actions);
            }
        }
    }

    fn record_connector(&mut self, action: &Value) {
        let Some(host) = json_path(action, "inputs.host") else {
            return;
        };
        let reference = json_string(host, "connectionName")
            .or_else(|| json_string(host, "apiId"))
            .or_else(|| json_path(host, "connection.referenceName").and_then(|v| v.as_str().map(String::from)));
        if let Some(reference) = reference
            && !self.connectors.contains(&reference)
        {
            self.connectors.push(reference);
        }
    }
}

/// Detect one HTTP-shaped action, at most one call per action.
///
/// Confidence: `High` for a direct HTTP action with explicit URI and method,
/// `Medium` for an OpenAPI-connection action whose path is an absolute URL,
/// `Low` for a bare URL found anywhere in the serialized inputs.
fn detect_http_call(action_name: &str, action: &Value) -> Option<ExternalCall> {
    let action_type = json_string(action, "type")
        .unwrap_or_default()
        .to_ascii_lowercase();

    if action_type == "http" {
        if let Some(uri) = json_path(action, "inputs.uri").and_then(|v| v.as_str()) {
            let method = json_path(action, "inputs.method")
                .and_then(|v| v.as_str())
                .map(|m| m.to_ascii_uppercase());
            let confidence = if method.is_some() {
                Confidence::High
            } else {
                Confidence::Medium
            };
            return Some(ExternalCall {
                url: uri.to_string(),
                domain: extract_domain(uri),
                method,
                source: action_name.to_string(),
                confidence,
            });
        }
    }

    if action_type.contains("apiconnection") {
        if let Some(path) = json_path(action, "inputs.path").and_then(|v| v.as_str())
            && path.starts_with("http")
        {
            let method = json_path(action, "inputs.method")
                .and_then(|v| v.as_str())
                .map(|m| m.to_ascii_uppercase());
            return Some(ExternalCall {
                url: path.to_string(),
                domain: extract_domain(path),
                method,
                source: action_name.to_string(),
                confidence: Confidence::Medium,
            });
        }
    }

    // Catch-all: a bare URL anywhere in the serialized inputs.
    let inputs = action.get("inputs")?;
    let serialized = inputs.to_string();
    let url = BARE_URL_RE.find(&serialized)?.as_str().trim_end_matches('\\');
    Some(ExternalCall {
        url: url.to_string(),
        domain: extract_domain(url),
        method: None,
        source: action_name.to_string(),
        confidence: Confidence::Low,
    })
}

/// Detect one Dataverse CRUD action from its operation id or action name.
fn detect_dataverse_action(action_name: &str, action: &Value) -> Option<DataverseAction> {
    let operation_id = json_path(action, "inputs.host.operationId")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let haystack = format!("{} {}", operation_id, action_name).to_ascii_lowercase();

    let operation = if haystack.contains("create") {
        CrudOperation::Create
    } else if haystack.contains("update") {
        CrudOperation::Update
    } else if haystack.contains("delete") {
        CrudOperation::Delete
    } else if haystack.contains("list") {
        CrudOperation::List
    } else if haystack.contains("get") {
        CrudOperation::Get
    } else {
        return None;
    };

    let (entity, confidence) = extract_target_entity(action_name, action);
    Some(DataverseAction {
        operation,
        entity,
        action_name: action_name.to_string(),
        confidence,
    })
}

/// Target-entity extraction, tried in priority order with confidence
/// lowered per tier: explicit `entityName` parameter (High), explicit
/// `entityLogicalName` parameter (High), OData path segment (Medium),
/// name-suffix heuristic (Low).
fn extract_target_entity(action_name: &str, action: &Value) -> (Option<String>, Confidence) {
    if let Some(params) = json_path(action, "inputs.parameters") {
        if let Some(name) = json_string(params, "entityName") {
            return (Some(name.to_ascii_lowercase()), Confidence::High);
        }
        if let Some(name) = json_string(params, "entityLogicalName") {
            return (Some(name.to_ascii_lowercase()), Confidence::High);
        }
    }

    if let Some(path) = json_path(action, "inputs.path").and_then(|v| v.as_str()) {
        let lowered = path.to_ascii_lowercase();
        if let Some(caps) = ODATA_PATH_RE.captures(&lowered) {
            return (Some(caps[1].to_string()), Confidence::Medium);
        }
    }

    // Weak heuristic: a trailing lowercase token after " - ", the naming
    // convention the designer applies to "Create record - contact" actions.
    if let Some((_, suffix)) = action_name.rsplit_once(" - ") {
        let candidate = suffix.trim();
        if !candidate.is_empty()
            && candidate
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return (Some(candidate.to_string()), Confidence::Low);
        }
    }

    (None, Confidence::Low)
}
