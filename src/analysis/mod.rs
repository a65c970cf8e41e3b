//! Automation Topology Analysis
//!
//! The pure, synchronous core: pipeline reconstruction, risk scoring,
//! external-dependency aggregation, cross-entity mapping and migration
//! advice. Every function here is a deterministic transformation over
//! already-materialized collections; no I/O, no shared state, safe to call
//! concurrently across independent (entity, event) pairs.

pub mod cross_entity;
pub mod dependencies;
pub mod migration;
pub mod pipeline;
pub mod risk;

pub use cross_entity::map_cross_entity;
pub use dependencies::{aggregate_endpoints, aggregate_endpoints_with};
pub use migration::advise_migration;
pub use pipeline::build_pipeline;
pub use risk::{analyze_pipeline, apply_risk_analysis};
