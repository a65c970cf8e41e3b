//! Legacy Workflow Migration Advisor
//!
//! Scores a legacy XAML workflow for migration to cloud flows using a fixed,
//! ordered registry of markup feature markers, then maps the detected
//! feature set to a complexity tier, an effort range, a numbered migration
//! approach and per-feature recommendations.

use crate::parser::parse_workflow_stages;
use crate::types::severity::Complexity;
use crate::types::{LegacyWorkflowRecord, MigrationFeature, MigrationRecommendation};

// =============================================================================
// Feature Registry
// =============================================================================

/// How a detected feature influences the complexity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeatureWeight {
    /// Structural blockers: no direct flow equivalent exists.
    Blocking,
    /// Coordination features that need redesign (waits, child workflows).
    Heavy,
    /// Branching/stage features that add up.
    Branching,
    /// Plain operations with a direct flow action.
    Simple,
}

/// One markup feature marker. Matching is case-insensitive substring over
/// the raw XAML; classic workflow exports carry these activity names
/// verbatim.
struct FeatureDef {
    name: &'static str,
    markers: &'static [&'static str],
    weight: FeatureWeight,
    recommendation: &'static str,
    migration_path: &'static str,
}

/// Fixed, ordered feature registry. Order is the report order.
const FEATURE_REGISTRY: &[FeatureDef] = &[
    FeatureDef {
        name: "Field Update",
        markers: &["setentityproperty", "updateentity"],
        weight: FeatureWeight::Simple,
        recommendation: "Use the Update a row action",
        migration_path: "Dataverse connector: Update a row",
    },
    FeatureDef {
        name: "Wait Condition",
        markers: &["waitactivity", "parallelwaitactivity", "timeout"],
        weight: FeatureWeight::Heavy,
        recommendation: "Redesign waits as Delay or Delay until actions",
        migration_path: "Built-in Delay action, or a scheduled follow-up flow",
    },
    FeatureDef {
        name: "Child Workflow",
        markers: &["startchildworkflow", "childworkflow"],
        weight: FeatureWeight::Heavy,
        recommendation: "Invoke a child flow and pass context explicitly",
        migration_path: "Run a Child Flow action (solution-aware flows only)",
    },
    FeatureDef {
        name: "Custom Activity",
        markers: &["customactivity", "codeactivity"],
        weight: FeatureWeight::Blocking,
        recommendation: "Rewrite the custom activity as a custom connector or Dataverse plugin",
        migration_path: "Custom connector, or keep the logic in a plugin step",
    },
    FeatureDef {
        name: "Send Email",
        markers: &["sendemail", "sendemailactivity"],
        weight: FeatureWeight::Simple,
        recommendation: "Use the Send an email notification action",
        migration_path: "Dataverse connector: Perform a bound action (SendEmail)",
    },
    FeatureDef {
        name: "Create Record",
        markers: &["createentity", "create record"],
        weight: FeatureWeight::Simple,
        recommendation: "Use the Add a new row action",
        migration_path: "Dataverse connector: Add a new row",
    },
    FeatureDef {
        name: "Conditional Branch",
        markers: &["conditionbranchactivity", "conditionsequence", "<if "],
        weight: FeatureWeight::Branching,
        recommendation: "Model branches with Condition or Switch controls",
        migration_path: "Built-in Condition / Switch controls",
    },
    FeatureDef {
        name: "Assign Record",
        markers: &["assignentity", "assignactivity"],
        weight: FeatureWeight::Simple,
        recommendation: "Update the owner column directly",
        migration_path: "Dataverse connector: Update a row (ownerid)",
    },
    FeatureDef {
        name: "Status Change",
        markers: &["setstate", "setstateactivity"],
        weight: FeatureWeight::Simple,
        recommendation: "Update the status and status-reason columns",
        migration_path: "Dataverse connector: Update a row (statecode/statuscode)",
    },
    FeatureDef {
        name: "Stage Change",
        markers: &["setprocessstage", "stagestep"],
        weight: FeatureWeight::Branching,
        recommendation: "Drive business-process-flow stages via the BPF entity",
        migration_path: "Update the BPF instance row (activestageid)",
    },
    FeatureDef {
        name: "Deprecated Feature",
        markers: &["deprecated"],
        weight: FeatureWeight::Blocking,
        recommendation: "Replace the deprecated feature before migrating",
        migration_path: "No direct equivalent; redesign required",
    },
];

const DOCUMENTATION_URL: &str =
    "https://learn.microsoft.com/power-automate/replace-classic-workflows";

// =============================================================================
// Entry Point
// =============================================================================

/// Produce a migration recommendation for one legacy workflow. Infallible:
/// markup with no recognizable features scores as basic operations.
pub fn advise_migration(workflow: &LegacyWorkflowRecord) -> MigrationRecommendation {
    let lowered = workflow.markup.to_ascii_lowercase();

    let detected: Vec<&FeatureDef> = FEATURE_REGISTRY
        .iter()
        .filter(|def| def.markers.iter().any(|m| lowered.contains(m)))
        .collect();

    let features: Vec<MigrationFeature> = if detected.is_empty() {
        vec![MigrationFeature {
            name: "Basic Operations".to_string(),
            recommendation: "Recreate the workflow directly as a cloud flow".to_string(),
            migration_path: "Dataverse connector standard actions".to_string(),
        }]
    } else {
        detected
            .iter()
            .map(|def| MigrationFeature {
                name: def.name.to_string(),
                recommendation: def.recommendation.to_string(),
                migration_path: def.migration_path.to_string(),
            })
            .collect()
    };

    let complexity = score_complexity(&detected, workflow.realtime);
    let effort = effort_for(complexity);
    let mut challenges = collect_challenges(&detected, workflow.realtime);
    let stages = parse_workflow_stages(&workflow.markup);
    if stages.crosses_entities {
        challenges.push(format!(
            "Stages span multiple entities ({} stages): split into one flow per \
             entity with explicit hand-offs",
            stages.stages.len()
        ));
    }
    let approach = build_approach(workflow, &features);
    let advisory = advisory_for(workflow);

    MigrationRecommendation {
        workflow_id: workflow.id.clone(),
        workflow_name: workflow.name.clone(),
        complexity,
        effort: effort.to_string(),
        approach,
        challenges,
        features,
        documentation: DOCUMENTATION_URL.to_string(),
        advisory,
    }
}

// =============================================================================
// Scoring
// =============================================================================

/// Complexity: Critical for any blocking feature; High for heavy features
/// or a real-time source workflow; Medium when at least two branching
/// features appear among more than three detected features; else Low.
fn score_complexity(detected: &[&FeatureDef], realtime: bool) -> Complexity {
    if detected.iter().any(|d| d.weight == FeatureWeight::Blocking) {
        return Complexity::Critical;
    }
    if realtime || detected.iter().any(|d| d.weight == FeatureWeight::Heavy) {
        return Complexity::High;
    }
    let branching = detected
        .iter()
        .filter(|d| d.weight == FeatureWeight::Branching)
        .count();
    if branching >= 2 && detected.len() > 3 {
        return Complexity::Medium;
    }
    Complexity::Low
}

/// Fixed effort lookup per complexity tier.
fn effort_for(complexity: Complexity) -> &'static str {
    match complexity {
        Complexity::Critical => "1+ weeks",
        Complexity::High => "1-2 days",
        Complexity::Medium => "4-8 hours",
        Complexity::Low => "1-2 hours",
    }
}

fn collect_challenges(detected: &[&FeatureDef], realtime: bool) -> Vec<String> {
    let mut challenges = Vec::new();
    if realtime {
        challenges.push(
            "Real-time execution: cloud flows cannot block the triggering transaction".to_string(),
        );
    }
    for def in detected {
        match def.weight {
            FeatureWeight::Blocking => challenges.push(format!(
                "{}: no direct flow equivalent, redesign required",
                def.name
            )),
            FeatureWeight::Heavy => challenges.push(format!(
                "{}: needs restructuring around flow scheduling semantics",
                def.name
            )),
            _ => {}
        }
    }
    challenges
}

fn build_approach(
    workflow: &LegacyWorkflowRecord,
    features: &[MigrationFeature],
) -> Vec<String> {
    let trigger = trigger_summary(workflow);
    let mut approach = vec![
        format!("1. Create a new automated cloud flow triggered on {trigger}"),
        "2. Reproduce the trigger filters and scope from the workflow properties".to_string(),
    ];
    for (i, feature) in features.iter().enumerate() {
        approach.push(format!(
            "{}. {}: {}",
            i + 3,
            feature.name,
            feature.migration_path
        ));
    }
    approach.push(format!(
        "{}. Run both side by side, compare outcomes, then deactivate the workflow",
        features.len() + 3
    ));
    approach
}

fn trigger_summary(workflow: &LegacyWorkflowRecord) -> String {
    let mut events = Vec::new();
    if workflow.on_create {
        events.push("create");
    }
    if workflow.on_update {
        events.push("update");
    }
    if workflow.on_delete {
        events.push("delete");
    }
    if events.is_empty() {
        "manual invocation".to_string()
    } else {
        events.join("/")
    }
}

/// Advisory differs categorically by source synchronicity: real-time
/// workflows have no faithful asynchronous equivalent.
fn advisory_for(workflow: &LegacyWorkflowRecord) -> String {
    if workflow.realtime {
        format!(
            "'{}' is a real-time workflow. Cloud flows run asynchronously; there is no \
             faithful equivalent for logic that must block the transaction. Validation \
             logic belongs in a synchronous plugin instead.",
            workflow.name
        )
    } else {
        format!(
            "'{}' is a background workflow and maps to an automated cloud flow with \
             equivalent semantics.",
            workflow.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow(markup: &str, realtime: bool) -> LegacyWorkflowRecord {
        LegacyWorkflowRecord {
            id: "w1".to_string(),
            name: "Escalate overdue invoices".to_string(),
            markup: markup.to_string(),
            realtime,
            on_create: false,
            on_update: true,
            on_delete: false,
        }
    }

    #[test]
    fn test_no_features_yields_basic_operations_low() {
        let rec = advise_migration(&workflow("<Activity><Sequence /></Activity>", false));
        assert_eq!(rec.features.len(), 1);
        assert_eq!(rec.features[0].name, "Basic Operations");
        assert_eq!(rec.complexity, Complexity::Low);
        assert_eq!(rec.effort, "1-2 hours");
    }

    #[test]
    fn test_custom_activity_always_critical() {
        // Custom activity dominates regardless of what else is present.
        let markup = r#"
            <mxswa:ActivityReference AssemblyQualifiedName="Contoso.CustomActivity" />
            <SetEntityProperty Attribute="name" />
            <SendEmailActivity />
        "#;
        let rec = advise_migration(&workflow(markup, false));
        assert_eq!(rec.complexity, Complexity::Critical);
        assert_eq!(rec.effort, "1+ weeks");
        assert!(rec.features.iter().any(|f| f.name == "Custom Activity"));
    }

    #[test]
    fn test_wait_condition_is_high() {
        let rec = advise_migration(&workflow("<WaitActivity Duration=\"P1D\" />", false));
        assert_eq!(rec.complexity, Complexity::High);
        assert_eq!(rec.effort, "1-2 days");
    }

    #[test]
    fn test_realtime_source_is_at_least_high() {
        let rec = advise_migration(&workflow("<SetEntityProperty />", true));
        assert_eq!(rec.complexity, Complexity::High);
        assert!(rec.advisory.contains("no"));
        assert!(rec.advisory.contains("real-time"));
    }

    #[test]
    fn test_background_advisory_differs_from_realtime() {
        let sync = advise_migration(&workflow("<SetEntityProperty />", true));
        let background = advise_migration(&workflow("<SetEntityProperty />", false));
        assert_ne!(sync.advisory, background.advisory);
        assert!(background.advisory.contains("background"));
    }

    #[test]
    fn test_branching_features_reach_medium() {
        // Two branching features among more than three detected features.
        let markup = r#"
            <ConditionBranchActivity />
            <SetProcessStage />
            <SetEntityProperty />
            <SendEmailActivity />
        "#;
        let rec = advise_migration(&workflow(markup, false));
        assert_eq!(rec.complexity, Complexity::Medium);
        assert_eq!(rec.effort, "4-8 hours");
    }

    #[test]
    fn test_approach_steps_are_numbered() {
        let rec = advise_migration(&workflow("<SetEntityProperty />", false));
        assert!(rec.approach.first().unwrap().starts_with("1."));
        assert!(
            rec.approach
                .last()
                .unwrap()
                .contains("deactivate the workflow")
        );
        assert!(rec.approach.first().unwrap().contains("update"));
    }

    #[test]
    fn test_multi_entity_stages_flagged_as_challenge() {
        let markup = r#"
            <StageStep DisplayName="Qualify" EntityLogicalName="lead" />
            <StageStep DisplayName="Close" EntityLogicalName="opportunity" />
        "#;
        let rec = advise_migration(&workflow(markup, false));
        assert!(
            rec.challenges
                .iter()
                .any(|c| c.contains("span multiple entities"))
        );
    }

    #[test]
    fn test_deprecated_marker_is_critical() {
        let rec = advise_migration(&workflow("<!-- deprecated: uses 2011 endpoint -->", false));
        assert_eq!(rec.complexity, Complexity::Critical);
    }
}
