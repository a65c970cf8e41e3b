//! DvLens - Automation Topology & Risk Analyzer for Dataverse
//!
//! Reconstructs the ordered execution pipeline of automation layered onto
//! Dataverse entities (plugins, cloud flows, business rules, scripts, legacy
//! workflows) and surfaces the risks hidden in it: synchronous external
//! calls, overloaded stages, untrusted endpoint dependencies, cross-entity
//! cascades, and deprecated workflows that need migration.
//!
//! ## Core Components
//!
//! - **Definition Parsers**: heuristic extraction from flow clientdata JSON,
//!   form-script JavaScript, and legacy-workflow XAML markup, with every
//!   fact tagged with a confidence level
//! - **Pipeline Builder**: stage-then-rank ordering across client-side,
//!   staged synchronous, and asynchronous execution phases
//! - **Risk Analyzer**: severity-ranked performance findings per pipeline
//! - **Dependency Aggregator**: deduplicated external endpoint inventory
//!   with allow-list trust classification
//! - **Cross-Entity Mapper**: entity-to-entity automation links from flow
//!   actions and plugin naming
//! - **Migration Advisor**: per-workflow modernization recommendations
//!
//! ## Quick Start
//!
//! ```ignore
//! use dvlens::config::Config;
//! use dvlens::report::build_report;
//! use dvlens::snapshot::Snapshot;
//!
//! let scope = Snapshot::load(Path::new("snapshot.json"))?.into_scope();
//! let report = build_report(&scope, &Config::default());
//! ```
//!
//! ## Modules
//!
//! - [`parser`]: flow/script/workflow definition parsers
//! - [`analysis`]: pipeline, risk, dependency, cross-entity, migration
//! - [`snapshot`]: environment snapshot loading
//! - [`report`]: full-report assembly
//! - [`config`]: layered configuration

pub mod analysis;
pub mod cli;
pub mod config;
pub mod constants;
pub mod parser;
pub mod report;
pub mod snapshot;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{LensError, Result};

// Analysis
pub use analysis::{
    advise_migration, aggregate_endpoints, aggregate_endpoints_with, analyze_pipeline,
    apply_risk_analysis, build_pipeline, map_cross_entity,
};

// Parsers
pub use parser::{analyze_script, parse_flow_definition, parse_workflow_stages};

// Snapshot & Report
pub use report::{AnalysisReport, build_report};
pub use snapshot::{AnalysisScope, Snapshot};
