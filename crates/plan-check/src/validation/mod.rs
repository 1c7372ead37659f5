//! Floor-plan validation: geometry kernel, auditors, rule catalog, engine and scoring.

pub mod config;
pub mod domain;
pub mod engine;
pub mod geometry;
pub mod identifiers;
pub mod layers;
pub mod rooms;
pub mod rules;
pub mod scoring;

pub use config::ValidationConfig;
pub use domain::{
    AreaCategory, Finding, ReviewStatus, Room, RoomFunction, RuleCategory, RuleCode, Severity,
};
pub use engine::{FindingSummary, RuleEngine, ValidationResult};
pub use geometry::{Point, Polygon};
pub use layers::{EntityPolicy, LayerRequirement, LayerSchema};
pub use rules::{Rule, RuleCatalog, RuleContext, RuleEntry, RuleFailure};
pub use scoring::{aggregate_scores, ScoringPolicy};
