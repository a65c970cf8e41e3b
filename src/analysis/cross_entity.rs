//! Cross-Entity Mapper
//!
//! Derives the directed graph of automation whose effects cross entity
//! boundaries.
//!
//! Detection strength differs per artifact kind:
//! - Flows: extracted Dataverse actions name their target entity directly;
//!   links carry the action's confidence.
//! - Plugins: no code-level access exists, so links come from whole-word
//!   matches of another entity's logical name in the step name and
//!   description, with the operation guessed from keywords. Always tagged
//!   `Low` confidence and marked name-based in the description.
//! - Business rules: contribute no links. Lookup-field reference parsing is
//!   not implemented; a known gap, not a silent omission.

use std::collections::HashMap;
use tracing::debug;

use crate::types::severity::{AutomationKind, Confidence, CrudOperation};
use crate::types::{CrossEntityLink, EntityBlueprint, PluginStepRecord};

/// Map every cross-entity relationship declared by the blueprints'
/// automation. Output sorted by (source entity, target entity).
pub fn map_cross_entity(blueprints: &[EntityBlueprint]) -> Vec<CrossEntityLink> {
    // Display-name resolution across the whole scope.
    let display_names: HashMap<String, &str> = blueprints
        .iter()
        .map(|b| {
            (
                b.entity.logical_name.to_ascii_lowercase(),
                b.entity.display_name.as_str(),
            )
        })
        .collect();
    let known_entities: Vec<String> = display_names.keys().cloned().collect();

    let mut links = Vec::new();
    for blueprint in blueprints {
        let source = &blueprint.entity;

        for flow in &blueprint.flows {
            for action in &flow.definition.dataverse_actions {
                let Some(target) = &action.entity else { continue };
                if target.eq_ignore_ascii_case(&source.logical_name) {
                    continue;
                }
                links.push(CrossEntityLink {
                    source_entity: source.logical_name.clone(),
                    source_display_name: source.display_name.clone(),
                    target_entity: target.to_ascii_lowercase(),
                    target_display_name: resolve_display(&display_names, target),
                    automation_kind: AutomationKind::Flow,
                    automation_name: flow.name.clone(),
                    automation_id: flow.id.clone(),
                    operation: action.operation,
                    description: format!(
                        "Flow action '{}' performs {} on {}",
                        action.action_name, action.operation, target
                    ),
                    // Flows run from the async queue, never in-transaction.
                    is_synchronous: false,
                    confidence: action.confidence,
                });
            }
        }

        for plugin in &blueprint.plugins {
            for link in plugin_name_links(source.logical_name.as_str(), plugin, &known_entities) {
                let target_display = resolve_display(&display_names, &link.0);
                links.push(CrossEntityLink {
                    source_entity: source.logical_name.clone(),
                    source_display_name: source.display_name.clone(),
                    target_entity: link.0,
                    target_display_name: target_display,
                    automation_kind: AutomationKind::Plugin,
                    automation_name: plugin.display_name().to_string(),
                    automation_id: plugin.id.clone(),
                    operation: link.1,
                    description: format!(
                        "Name-based match: plugin '{}' mentions entity '{}'",
                        plugin.display_name(),
                        link.2
                    ),
                    is_synchronous: plugin.is_synchronous(),
                    confidence: Confidence::Low,
                });
            }
        }

        // Business rules: no link extraction. Parsing lookup-field
        // references out of rule definitions is unimplemented.
        if !blueprint.business_rules.is_empty() {
            debug!(
                entity = source.logical_name,
                rules = blueprint.business_rules.len(),
                "business rules skipped by cross-entity mapping (no lookup-field parsing)"
            );
        }
    }

    links.sort_by(|a, b| {
        a.source_entity
            .cmp(&b.source_entity)
            .then_with(|| a.target_entity.cmp(&b.target_entity))
    });
    links
}

fn resolve_display(names: &HashMap<String, &str>, logical: &str) -> String {
    names
        .get(&logical.to_ascii_lowercase())
        .map(|s| s.to_string())
        .unwrap_or_else(|| logical.to_string())
}

/// Whole-word scan of a plugin's name + description for other known
/// entities, yielding (target, guessed operation, matched word) tuples.
fn plugin_name_links(
    source: &str,
    plugin: &PluginStepRecord,
    known_entities: &[String],
) -> Vec<(String, CrudOperation, String)> {
    let haystack = format!(
        "{} {}",
        plugin.display_name(),
        plugin.description.as_deref().unwrap_or_default()
    )
    .to_ascii_lowercase();
    let operation = guess_operation(&haystack);

    known_entities
        .iter()
        .filter(|entity| !entity.eq_ignore_ascii_case(source))
        .filter(|entity| contains_word(&haystack, entity))
        .map(|entity| (entity.clone(), operation, entity.clone()))
        .collect()
}

/// Keyword-based operation guess; Update is the default when nothing
/// matches.
fn guess_operation(haystack: &str) -> CrudOperation {
    const CREATE: &[&str] = &["create", "insert", "add"];
    const UPDATE: &[&str] = &["update", "modify", "change", "sync"];
    const DELETE: &[&str] = &["delete", "remove"];

    if CREATE.iter().any(|k| haystack.contains(k)) {
        CrudOperation::Create
    } else if UPDATE.iter().any(|k| haystack.contains(k)) {
        CrudOperation::Update
    } else if DELETE.iter().any(|k| haystack.contains(k)) {
        CrudOperation::Delete
    } else {
        CrudOperation::Update
    }
}

/// Whole-word containment: the entity name must not be embedded inside a
/// longer identifier ("contact" should not match "contoso_contacts_tmp"
/// through the "contact" substring alone).
fn contains_word(haystack: &str, word: &str) -> bool {
    let mut start = 0;
    while let Some(idx) = haystack[start..].find(word) {
        let begin = start + idx;
        let end = begin + word.len();
        let before_ok = begin == 0
            || !haystack.as_bytes()[begin - 1].is_ascii_alphanumeric()
                && haystack.as_bytes()[begin - 1] != b'_';
        let after_ok = end == haystack.len()
            || !haystack.as_bytes()[end].is_ascii_alphanumeric()
                && haystack.as_bytes()[end] != b'_';
        if before_ok && after_ok {
            return true;
        }
        start = end;
    }
    false
}
