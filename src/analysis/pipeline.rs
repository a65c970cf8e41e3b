//! Pipeline Builder
//!
//! Reconstructs the ordered, staged execution pipeline for one
//! (entity, event) pair from the entity's plugin steps, flows and business
//! rules.
//!
//! Ordering rules:
//! 1. Client-side steps are the active business rules in discovery order.
//! 2. Synchronous plugins sort by stage then rank and bucket by stage code
//!    (10/20/30/40); unrecognized stage codes are dropped from the staged
//!    buckets. Each bucket renumbers 1..n independently.
//! 3. Active, non-async-scoped flows append to the post-operation bucket
//!    (flows run after the main operation completes) and share its
//!    renumbering.
//! 4. Asynchronous plugins, then async-scoped flows, form the async list,
//!    numbered 1..n across both.
//!
//! All inputs are filtered defensively; there are no error conditions.

use tracing::debug;

use crate::constants::stage;
use crate::types::severity::{EntityEvent, ExecutionMode, StepKind};
use crate::types::{
    BusinessRuleRecord, ExecutionPipeline, ExecutionStep, FlowRecord, PluginStepRecord,
};

/// Build the execution pipeline for one (entity, event) pair.
pub fn build_pipeline(
    entity: &str,
    event: EntityEvent,
    plugins: &[PluginStepRecord],
    flows: &[FlowRecord],
    business_rules: &[BusinessRuleRecord],
) -> ExecutionPipeline {
    // Business rules run client-side on every form interaction, so all
    // active rules for the entity participate regardless of event.
    let client_side: Vec<ExecutionStep> = business_rules
        .iter()
        .filter(|rule| rule.active && rule.entity.eq_ignore_ascii_case(entity))
        .enumerate()
        .map(|(i, rule)| business_rule_step(rule, i + 1))
        .collect();

    let mut matching_plugins: Vec<&PluginStepRecord> = plugins
        .iter()
        .filter(|p| {
            p.entity.eq_ignore_ascii_case(entity) && p.message.eq_ignore_ascii_case(event.as_message())
        })
        .collect();
    matching_plugins.sort_by_key(|p| (p.stage, p.rank));

    let mut pre_validation = Vec::new();
    let mut pre_operation = Vec::new();
    let mut main_operation = Vec::new();
    let mut post_operation = Vec::new();
    let mut async_steps = Vec::new();

    for plugin in &matching_plugins {
        if !plugin.is_synchronous() {
            async_steps.push(plugin_step(plugin, 0));
            continue;
        }
        let bucket = match plugin.stage {
            stage::PRE_VALIDATION => &mut pre_validation,
            stage::PRE_OPERATION => &mut pre_operation,
            stage::MAIN_OPERATION => &mut main_operation,
            stage::POST_OPERATION => &mut post_operation,
            other => {
                debug!(
                    plugin = plugin.display_name(),
                    stage = other,
                    "unrecognized stage code, dropping from staged buckets"
                );
                continue;
            }
        };
        bucket.push(plugin_step(plugin, bucket.len() + 1));
    }

    let matching_flows: Vec<&FlowRecord> = flows
        .iter()
        .filter(|f| {
            f.active
                && f.entity
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(entity))
                && f.definition
                    .trigger_event
                    .is_some_and(|t| t.matches_event(event))
        })
        .collect();

    // Flows run after the main operation completes; non-async-scoped ones
    // are modeled at the tail of the post-operation bucket.
    for flow in matching_flows.iter().filter(|f| !f.async_scoped) {
        post_operation.push(flow_step(flow, post_operation.len() + 1));
    }
    for flow in matching_flows.iter().filter(|f| f.async_scoped) {
        async_steps.push(flow_step(flow, 0));
    }
    for (i, step) in async_steps.iter_mut().enumerate() {
        step.position = i + 1;
    }

    let buckets = [
        &client_side,
        &pre_validation,
        &pre_operation,
        &main_operation,
        &post_operation,
        &async_steps,
    ];
    let total_steps = buckets.iter().map(|b| b.len()).sum();
    let has_external_calls = buckets
        .iter()
        .any(|b| b.iter().any(|s| s.has_external_call));

    ExecutionPipeline {
        entity: entity.to_string(),
        event,
        client_side,
        pre_validation,
        pre_operation,
        main_operation,
        post_operation,
        server_side_async: async_steps,
        total_steps,
        has_external_calls,
        performance_risks: Vec::new(),
    }
}

fn business_rule_step(rule: &BusinessRuleRecord, position: usize) -> ExecutionStep {
    ExecutionStep {
        position,
        kind: StepKind::BusinessRule,
        name: rule.name.clone(),
        id: rule.id.clone(),
        mode: ExecutionMode::Client,
        stage: None,
        rank: None,
        has_external_call: false,
        external_urls: Vec::new(),
        description: rule.description.clone(),
    }
}

fn plugin_step(plugin: &PluginStepRecord, position: usize) -> ExecutionStep {
    ExecutionStep {
        position,
        kind: StepKind::Plugin,
        name: plugin.display_name().to_string(),
        id: plugin.id.clone(),
        mode: plugin.mode,
        stage: Some(plugin.stage),
        rank: Some(plugin.rank),
        has_external_call: plugin.has_external_call,
        external_urls: plugin.external_urls.clone(),
        description: plugin.description.clone(),
    }
}

fn flow_step(flow: &FlowRecord, position: usize) -> ExecutionStep {
    ExecutionStep {
        position,
        kind: StepKind::Flow,
        name: flow.name.clone(),
        id: flow.id.clone(),
        mode: ExecutionMode::Async,
        stage: None,
        rank: None,
        // Carried verbatim from the parsed definition.
        has_external_call: flow.definition.has_external_calls,
        external_urls: flow
            .definition
            .external_calls
            .iter()
            .map(|c| c.url.clone())
            .collect(),
        description: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::flow::FlowDefinition;
    use crate::types::severity::{Confidence, TriggerEvent};
    use crate::types::ExternalCall;
    use proptest::prelude::*;

    fn plugin(id: &str, stage: i64, rank: i64, mode: ExecutionMode) -> PluginStepRecord {
        PluginStepRecord {
            id: id.to_string(),
            name: Some(format!("step {id}")),
            type_name: "Contoso.Plugins.Test".into(),
            entity: "account".into(),
            message: "Update".into(),
            stage,
            rank,
            mode,
            description: None,
            has_external_call: false,
            external_urls: Vec::new(),
        }
    }

    fn rule(id: &str, active: bool) -> BusinessRuleRecord {
        BusinessRuleRecord {
            id: id.to_string(),
            name: format!("rule {id}"),
            entity: "account".into(),
            active,
            description: None,
        }
    }

    fn flow(id: &str, trigger: TriggerEvent, async_scoped: bool) -> FlowRecord {
        FlowRecord {
            id: id.to_string(),
            name: format!("flow {id}"),
            entity: Some("account".into()),
            active: true,
            async_scoped,
            definition: FlowDefinition {
                trigger_event: Some(trigger),
                ..FlowDefinition::default()
            },
        }
    }

    #[test]
    fn test_stage_codes_map_to_buckets() {
        let plugins = vec![
            plugin("pv", 10, 1, ExecutionMode::Sync),
            plugin("pre", 20, 1, ExecutionMode::Sync),
            plugin("main", 30, 1, ExecutionMode::Sync),
            plugin("post", 40, 1, ExecutionMode::Sync),
        ];
        let p = build_pipeline("account", EntityEvent::Update, &plugins, &[], &[]);
        assert_eq!(p.pre_validation[0].id, "pv");
        assert_eq!(p.pre_operation[0].id, "pre");
        assert_eq!(p.main_operation[0].id, "main");
        assert_eq!(p.post_operation[0].id, "post");
    }

    #[test]
    fn test_unrecognized_stage_dropped() {
        let plugins = vec![plugin("odd", 25, 1, ExecutionMode::Sync)];
        let p = build_pipeline("account", EntityEvent::Update, &plugins, &[], &[]);
        assert_eq!(p.total_steps, 0);
        assert!(p.sync_buckets().iter().all(|b| b.is_empty()));
    }

    #[test]
    fn test_rank_orders_within_stage() {
        let plugins = vec![
            plugin("second", 20, 2, ExecutionMode::Sync),
            plugin("first", 20, 1, ExecutionMode::Sync),
        ];
        let p = build_pipeline("account", EntityEvent::Update, &plugins, &[], &[]);
        assert_eq!(p.pre_operation[0].id, "first");
        assert_eq!(p.pre_operation[0].position, 1);
        assert_eq!(p.pre_operation[1].id, "second");
        assert_eq!(p.pre_operation[1].position, 2);
    }

    #[test]
    fn test_message_match_is_case_insensitive() {
        let mut step = plugin("p", 20, 1, ExecutionMode::Sync);
        step.message = "update".into();
        let p = build_pipeline("account", EntityEvent::Update, &[step], &[], &[]);
        assert_eq!(p.pre_operation.len(), 1);
    }

    #[test]
    fn test_inactive_business_rules_excluded() {
        let rules = vec![rule("a", true), rule("b", false), rule("c", true)];
        let p = build_pipeline("account", EntityEvent::Update, &[], &[], &rules);
        assert_eq!(p.client_side.len(), 2);
        assert_eq!(p.client_side[0].position, 1);
        assert_eq!(p.client_side[1].position, 2);
    }

    #[test]
    fn test_flows_append_to_post_operation_after_plugins() {
        let plugins = vec![plugin("post", 40, 1, ExecutionMode::Sync)];
        let flows = vec![flow("f1", TriggerEvent::Update, false)];
        let p = build_pipeline("account", EntityEvent::Update, &plugins, &flows, &[]);
        assert_eq!(p.post_operation.len(), 2);
        assert_eq!(p.post_operation[0].id, "post");
        assert_eq!(p.post_operation[1].id, "f1");
        assert_eq!(p.post_operation[1].position, 2);
    }

    #[test]
    fn test_create_or_update_trigger_matches_create_and_update() {
        let flows = vec![flow("f", TriggerEvent::CreateOrUpdate, false)];
        for event in [EntityEvent::Create, EntityEvent::Update] {
            let p = build_pipeline("account", event, &[], &flows, &[]);
            assert_eq!(p.post_operation.len(), 1, "event {event}");
        }
        let p = build_pipeline("account", EntityEvent::Delete, &[], &flows, &[]);
        assert!(p.post_operation.is_empty());
    }

    #[test]
    fn test_async_list_orders_plugins_before_flows() {
        let plugins = vec![plugin("ap", 40, 1, ExecutionMode::Async)];
        let flows = vec![flow("af", TriggerEvent::Update, true)];
        let p = build_pipeline("account", EntityEvent::Update, &plugins, &flows, &[]);
        assert_eq!(p.server_side_async.len(), 2);
        assert_eq!(p.server_side_async[0].id, "ap");
        assert_eq!(p.server_side_async[0].position, 1);
        assert_eq!(p.server_side_async[1].id, "af");
        assert_eq!(p.server_side_async[1].position, 2);
    }

    #[test]
    fn test_flow_carries_external_call_flag_verbatim() {
        let mut f = flow("f", TriggerEvent::Update, false);
        f.definition.external_calls.push(ExternalCall {
            url: "https://api.example.com/x".into(),
            domain: "api.example.com".into(),
            method: None,
            source: "Notify".into(),
            confidence: Confidence::High,
        });
        f.definition.has_external_calls = true;
        let p = build_pipeline("account", EntityEvent::Update, &[], &[f], &[]);
        assert!(p.has_external_calls);
        assert_eq!(p.post_operation[0].external_urls.len(), 1);
    }

    proptest! {
        /// total_steps always equals the sum of every bucket and list.
        #[test]
        fn prop_total_steps_accounts_for_every_bucket(
            stages in proptest::collection::vec((0i64..6, 1i64..5, proptest::bool::ANY), 0..24),
            rule_count in 0usize..6,
        ) {
            let plugins: Vec<PluginStepRecord> = stages
                .iter()
                .enumerate()
                .map(|(i, (stage_idx, rank, is_async))| {
                    let mode = if *is_async { ExecutionMode::Async } else { ExecutionMode::Sync };
                    // index 5 yields an unrecognized stage code on purpose
                    plugin(&format!("p{i}"), stage_idx * 10, *rank, mode)
                })
                .collect();
            let rules: Vec<BusinessRuleRecord> =
                (0..rule_count).map(|i| rule(&format!("r{i}"), true)).collect();

            let p = build_pipeline("account", EntityEvent::Update, &plugins, &[], &rules);
            let expected = p.client_side.len()
                + p.pre_validation.len()
                + p.pre_operation.len()
                + p.main_operation.len()
                + p.post_operation.len()
                + p.server_side_async.len();
            prop_assert_eq!(p.total_steps, expected);
        }

        /// has_external_calls is true iff some step carries the flag.
        #[test]
        fn prop_external_flag_matches_steps(flagged in proptest::bool::ANY) {
            let mut f = flow("f", TriggerEvent::Update, false);
            f.definition.has_external_calls = flagged;
            let p = build_pipeline("account", EntityEvent::Update, &[], &[f], &[]);
            prop_assert_eq!(p.has_external_calls, p.all_steps().any(|s| s.has_external_call));
            prop_assert_eq!(p.has_external_calls, flagged);
        }
    }
}
