//! Legacy Workflow Markup Parser
//!
//! Scans XAML-like workflow markup for stage definitions. Used for
//! business-process-flow stage extraction; the migration advisor runs its
//! own feature-marker registry over the same markup.
//!
//! There is no XML parsing here on purpose: real exports carry vendor
//! namespaces and versioned schemas that a strict parser would choke on,
//! while the stage elements are reliably recognizable by tag and attribute
//! shape. Missing elements simply yield an empty result.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Element whose tag names a stage, attributes captured for inspection.
static STAGE_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<[a-z0-9:.]*stage(?:step)?\b([^>]*)>").expect("stage element regex")
});

static STAGE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:displayname|stagename|name)\s*=\s*"([^"]*)""#).expect("name attr regex")
});

static STAGE_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:primaryentity|entitylogicalname|entity)\s*=\s*"([^"]*)""#)
        .expect("entity attr regex")
});

/// One stage definition, ordered by first appearance in the markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStage {
    /// 1-based order of first appearance.
    pub order: usize,
    pub name: String,
    /// Stage-owning entity, when the element declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

/// All stages found in one markup document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowStages {
    pub stages: Vec<WorkflowStage>,
    /// True iff more than one distinct stage-owning entity is observed.
    pub crosses_entities: bool,
}

/// Extract stage definitions from workflow markup. Never fails; markup
/// without stage elements yields the empty default.
pub fn parse_workflow_stages(markup: &str) -> WorkflowStages {
    let mut stages = Vec::new();
    let mut entities: HashSet<String> = HashSet::new();

    for caps in STAGE_ELEMENT_RE.captures_iter(markup) {
        let attrs = &caps[1];
        let Some(name) = STAGE_NAME_RE.captures(attrs).map(|c| c[1].to_string()) else {
            continue;
        };
        let entity = STAGE_ENTITY_RE
            .captures(attrs)
            .map(|c| c[1].to_ascii_lowercase());
        if let Some(entity) = &entity {
            entities.insert(entity.clone());
        }
        stages.push(WorkflowStage {
            order: stages.len() + 1,
            name,
            entity,
        });
    }

    WorkflowStages {
        crosses_entities: entities.len() > 1,
        stages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_stage_elements_yields_empty() {
        let parsed = parse_workflow_stages("<Activity><Sequence /></Activity>");
        assert!(parsed.stages.is_empty());
        assert!(!parsed.crosses_entities);
    }

    #[test]
    fn test_stage_order_is_first_appearance() {
        let markup = r#"
            <mxswa:Workflow>
              <mcwb:Stage DisplayName="Qualify" PrimaryEntity="lead" />
              <mcwb:Stage DisplayName="Develop" PrimaryEntity="opportunity" />
              <mcwb:Stage DisplayName="Close" PrimaryEntity="opportunity" />
            </mxswa:Workflow>
        "#;
        let parsed = parse_workflow_stages(markup);
        assert_eq!(parsed.stages.len(), 3);
        assert_eq!(parsed.stages[0].name, "Qualify");
        assert_eq!(parsed.stages[0].order, 1);
        assert_eq!(parsed.stages[2].name, "Close");
        assert_eq!(parsed.stages[2].order, 3);
    }

    #[test]
    fn test_cross_entity_flag_requires_two_distinct_entities() {
        let single = r#"
            <Stage Name="A" Entity="account" />
            <Stage Name="B" Entity="Account" />
        "#;
        assert!(!parse_workflow_stages(single).crosses_entities);

        let multi = r#"
            <Stage Name="A" Entity="lead" />
            <Stage Name="B" Entity="opportunity" />
        "#;
        assert!(parse_workflow_stages(multi).crosses_entities);
    }

    #[test]
    fn test_stage_without_name_skipped() {
        let markup = r#"<Stage Entity="account" /><Stage Name="Kept" />"#;
        let parsed = parse_workflow_stages(markup);
        assert_eq!(parsed.stages.len(), 1);
        assert_eq!(parsed.stages[0].name, "Kept");
    }
}
