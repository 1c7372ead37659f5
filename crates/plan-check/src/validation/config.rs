use super::domain::RuleCode;
use super::geometry::DEFAULT_EPSILON;
use super::layers::{EntityPolicy, LayerSchema};
use super::scoring::ScoringPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tunable thresholds for a validation run. The defaults mirror the BBL CAD guideline and are
/// expected to be confirmed by the domain owners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub epsilon: f64,
    /// Drawing units per metre (drawings are kept in millimetres).
    pub units_per_meter: f64,
    pub min_room_area_m2: f64,
    pub min_text_height: f64,
    /// Relative deviation tolerated between drawn and listed room areas.
    pub area_tolerance: f64,
    pub required_font: String,
    pub scoring: ScoringPolicy,
    pub disabled_rules: BTreeSet<RuleCode>,
    pub layer_schema: LayerSchema,
    pub entity_policy: EntityPolicy,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            units_per_meter: 1000.0,
            min_room_area_m2: 1.0,
            min_text_height: 2.5,
            area_tolerance: 0.02,
            required_font: "arial".to_string(),
            scoring: ScoringPolicy::default(),
            disabled_rules: BTreeSet::new(),
            layer_schema: LayerSchema::bbl(),
            entity_policy: EntityPolicy::bbl(),
        }
    }
}

impl ValidationConfig {
    pub fn is_enabled(&self, code: RuleCode) -> bool {
        !self.disabled_rules.contains(&code)
    }

    /// Converts squared drawing units into square metres.
    pub fn to_square_meters(&self, area: f64) -> f64 {
        if self.units_per_meter > 0.0 {
            area / (self.units_per_meter * self.units_per_meter)
        } else {
            area
        }
    }
}
