//! Analysis Report Assembly
//!
//! Ties the analysis components together over one loaded scope: a pipeline
//! per (entity, triggering event) pair, scope-wide endpoint and cross-entity
//! views, and a migration recommendation per legacy workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::{
    advise_migration, aggregate_endpoints_with, apply_risk_analysis, build_pipeline,
    map_cross_entity,
};
use crate::config::Config;
use crate::snapshot::AnalysisScope;
use crate::types::severity::EntityEvent;
use crate::types::{
    CrossEntityLink, ExecutionPipeline, ExternalEndpoint, MigrationRecommendation,
};

/// The three database events a pipeline is reconstructed for.
const PIPELINE_EVENTS: [EntityEvent; 3] =
    [EntityEvent::Create, EntityEvent::Update, EntityEvent::Delete];

/// Complete analysis output for one environment snapshot. Serializes with
/// snake_case keys throughout, matching every nested type.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub environment: Option<String>,
    pub entity_count: usize,
    pub pipelines: Vec<ExecutionPipeline>,
    pub external_endpoints: Vec<ExternalEndpoint>,
    pub cross_entity_links: Vec<CrossEntityLink>,
    pub migrations: Vec<MigrationRecommendation>,
}

/// Run every analysis component over the scope and assemble the report.
pub fn build_report(scope: &AnalysisScope, config: &Config) -> AnalysisReport {
    let mut pipelines = Vec::new();
    for blueprint in &scope.blueprints {
        for event in PIPELINE_EVENTS {
            let mut pipeline = build_pipeline(
                &blueprint.entity.logical_name,
                event,
                &blueprint.plugins,
                &blueprint.flows,
                &blueprint.business_rules,
            );
            if pipeline.total_steps == 0 && !config.analysis.include_empty_pipelines {
                continue;
            }
            apply_risk_analysis(&mut pipeline);
            pipelines.push(pipeline);
        }
    }

    let external_endpoints = aggregate_endpoints_with(
        &scope.flows,
        &scope.scripts,
        &config.domains.trusted,
        &config.domains.known,
    );
    let cross_entity_links = map_cross_entity(&scope.blueprints);
    let migrations = scope.workflows.iter().map(advise_migration).collect();

    let report = AnalysisReport {
        generated_at: Utc::now(),
        environment: scope.environment.clone(),
        entity_count: scope.blueprints.len(),
        pipelines,
        external_endpoints,
        cross_entity_links,
        migrations,
    };

    info!(
        pipelines = report.pipelines.len(),
        endpoints = report.external_endpoints.len(),
        links = report.cross_entity_links.len(),
        migrations = report.migrations.len(),
        "analysis report assembled"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::flow::FlowDefinition;
    use crate::types::severity::{ExecutionMode, Severity, TriggerEvent, TriggerKind};
    use crate::types::{
        BusinessRuleRecord, EntityBlueprint, EntityMetadata, FlowRecord, LegacyWorkflowRecord,
        PluginStepRecord,
    };

    fn plugin(entity: &str, message: &str, stage: i64, external: bool) -> PluginStepRecord {
        PluginStepRecord {
            id: format!("p-{entity}-{message}-{stage}"),
            name: Some(format!("{entity} {message} step")),
            type_name: "Contoso.Plugins.Step".into(),
            entity: entity.into(),
            message: message.into(),
            stage,
            rank: 1,
            mode: ExecutionMode::Sync,
            description: None,
            has_external_call: external,
            external_urls: if external {
                vec!["https://api.example.com/hook".into()]
            } else {
                Vec::new()
            },
        }
    }

    fn scope_with_account_automation() -> AnalysisScope {
        let mut account =
            EntityBlueprint::new(EntityMetadata::new("account", "Account"));
        account.plugins.push(plugin("account", "Update", 20, true));
        account.business_rules.push(BusinessRuleRecord {
            id: "b1".into(),
            name: "Require phone".into(),
            entity: "account".into(),
            active: true,
            description: None,
        });
        let flow = FlowRecord {
            id: "f1".into(),
            name: "Notify billing".into(),
            entity: Some("account".into()),
            active: true,
            async_scoped: true,
            definition: FlowDefinition {
                trigger_kind: TriggerKind::Dataverse,
                trigger_event: Some(TriggerEvent::Update),
                action_count: 2,
                ..FlowDefinition::default()
            },
        };
        account.flows.push(flow.clone());

        AnalysisScope {
            environment: Some("https://org.crm.dynamics.com".into()),
            blueprints: vec![account],
            flows: vec![flow],
            scripts: Vec::new(),
            workflows: vec![LegacyWorkflowRecord {
                id: "w1".into(),
                name: "Old escalation".into(),
                markup: "<SetEntityProperty/>".into(),
                realtime: false,
                on_create: true,
                on_update: false,
                on_delete: false,
            }],
        }
    }

    #[test]
    fn test_report_emits_one_pipeline_per_entity_event_with_automation() {
        let scope = scope_with_account_automation();
        let report = build_report(&scope, &Config::default());

        // Update carries the plugin, rule, and flow; Create/Delete carry just
        // the business rule (rules run on every form interaction).
        assert_eq!(report.pipelines.len(), 3);
        let update = report
            .pipelines
            .iter()
            .find(|p| p.event == EntityEvent::Update)
            .unwrap();
        assert_eq!(update.pre_operation.len(), 1);
        assert!(update.has_external_calls);
        assert!(
            update
                .performance_risks
                .iter()
                .any(|r| r.severity == Severity::Critical)
        );
    }

    #[test]
    fn test_empty_pipelines_skipped_by_default() {
        let scope = AnalysisScope {
            environment: None,
            blueprints: vec![EntityBlueprint::new(EntityMetadata::new(
                "contact", "Contact",
            ))],
            flows: Vec::new(),
            scripts: Vec::new(),
            workflows: Vec::new(),
        };
        let report = build_report(&scope, &Config::default());
        assert!(report.pipelines.is_empty());

        let mut config = Config::default();
        config.analysis.include_empty_pipelines = true;
        let report = build_report(&scope, &config);
        assert_eq!(report.pipelines.len(), 3);
    }

    #[test]
    fn test_report_serializes_with_snake_case_keys() {
        let scope = scope_with_account_automation();
        let report = build_report(&scope, &Config::default());
        let value = serde_json::to_value(&report).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("generated_at"));
        assert!(object.contains_key("external_endpoints"));
        assert!(object.contains_key("cross_entity_links"));
        // Nested pipeline keys share the convention.
        let pipeline = value["pipelines"][0].as_object().unwrap();
        assert!(pipeline.contains_key("total_steps"));
    }

    #[test]
    fn test_report_covers_endpoints_and_migrations() {
        let scope = scope_with_account_automation();
        let report = build_report(&scope, &Config::default());

        assert_eq!(report.entity_count, 1);
        assert_eq!(report.migrations.len(), 1);
        assert_eq!(report.migrations[0].workflow_name, "Old escalation");
        // Plugin-side external flags never reach the endpoint inventory;
        // only flow and script calls do, and this scope's flow makes none.
        assert!(report.external_endpoints.is_empty());
    }
}
