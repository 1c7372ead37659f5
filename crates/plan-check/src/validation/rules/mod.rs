//! Rule catalog: every check the engine can run, keyed by [`RuleCode`].

mod aoid;
mod entity;
mod geometry;
mod layer;
mod text;

use super::config::ValidationConfig;
use super::domain::{Finding, RuleCategory, RuleCode, Severity};
use super::identifiers::AoidOccurrence;
use super::rooms::{self, RoomOutline};
use crate::drawing::{Drawing, Entity, Polyline};
use crate::room_list::RoomList;
use crate::validation::geometry::Polygon;
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Signature shared by all checks: a pure function over the run context.
pub type CheckFn = fn(&RuleContext<'_>) -> Result<Vec<Finding>, RuleFailure>;

#[derive(Clone, Copy)]
pub enum RuleCheck {
    /// Reported by intake when an input cannot be read; never run as a check.
    Intake,
    Run(CheckFn),
}

impl std::fmt::Debug for RuleCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleCheck::Intake => f.write_str("Intake"),
            RuleCheck::Run(_) => f.write_str("Run(..)"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RuleFailure {
    #[error("entity {handle} has non-finite coordinates")]
    NonFiniteGeometry { handle: String },
    #[error("rule could not be evaluated: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub code: RuleCode,
    pub name: &'static str,
    pub category: RuleCategory,
    /// Severity of the findings the check normally produces.
    pub severity: Severity,
    pub description: &'static str,
    pub check: RuleCheck,
}

impl Rule {
    pub(crate) const fn new(
        code: RuleCode,
        name: &'static str,
        category: RuleCategory,
        severity: Severity,
        description: &'static str,
        check: CheckFn,
    ) -> Self {
        Self {
            code,
            name,
            category,
            severity,
            description,
            check: RuleCheck::Run(check),
        }
    }

    const fn intake(code: RuleCode, name: &'static str, description: &'static str) -> Self {
        Self {
            code,
            name,
            category: RuleCategory::Input,
            severity: Severity::Error,
            description,
            check: RuleCheck::Intake,
        }
    }
}

/// Read-only inputs shared by every check of one run. Derived data (AOID placements, room
/// outlines) is computed once up front.
pub struct RuleContext<'a> {
    pub drawing: &'a Drawing,
    pub room_list: &'a RoomList,
    pub config: &'a ValidationConfig,
    pub aoids: Vec<AoidOccurrence>,
    pub outlines: Vec<RoomOutline>,
}

impl<'a> RuleContext<'a> {
    pub fn new(drawing: &'a Drawing, room_list: &'a RoomList, config: &'a ValidationConfig) -> Self {
        let aoids = rooms::aoid_occurrences(drawing);
        let outlines = rooms::outlines(drawing, &aoids, config);
        Self {
            drawing,
            room_list,
            config,
            aoids,
            outlines,
        }
    }

    pub fn room_polygons(&self) -> Vec<&Polygon> {
        self.outlines.iter().map(|outline| &outline.polygon).collect()
    }
}

/// Polygon of a polyline, rejecting coordinates the geometry kernel cannot reason about.
fn finite_polygon(entity: &Entity, polyline: &Polyline) -> Result<Polygon, RuleFailure> {
    let polygon = polyline.polygon();
    if polygon.is_finite() {
        Ok(polygon)
    } else {
        Err(RuleFailure::NonFiniteGeometry {
            handle: entity.handle.clone(),
        })
    }
}

/// Serializable catalog row for documentation and reporting tools.
#[derive(Debug, Clone, Serialize)]
pub struct RuleEntry {
    pub code: RuleCode,
    pub name: &'static str,
    pub category: RuleCategory,
    pub category_label: &'static str,
    pub severity: Severity,
    pub description: &'static str,
}

#[derive(Debug, Clone)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

impl RuleCatalog {
    /// Rules are kept in category order; the relative order inside a category is preserved.
    pub fn new(mut rules: Vec<Rule>) -> Self {
        rules.sort_by_key(|rule| rule.category);
        Self { rules }
    }

    /// Process-wide catalog with every built-in rule.
    pub fn standard() -> Arc<RuleCatalog> {
        static CATALOG: OnceLock<Arc<RuleCatalog>> = OnceLock::new();
        CATALOG
            .get_or_init(|| Arc::new(RuleCatalog::new(builtin_rules())))
            .clone()
    }

    pub fn get(&self, code: RuleCode) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.code == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn entries(&self) -> Vec<RuleEntry> {
        self.rules
            .iter()
            .map(|rule| RuleEntry {
                code: rule.code,
                name: rule.name,
                category: rule.category,
                category_label: rule.category.label(),
                severity: rule.severity,
                description: rule.description,
            })
            .collect()
    }
}

fn builtin_rules() -> Vec<Rule> {
    let mut rules = layer::rules();
    rules.extend(geometry::rules());
    rules.extend(entity::rules());
    rules.extend(text::rules());
    rules.extend(aoid::rules());
    rules.push(Rule::intake(
        RuleCode::Input001,
        "Zeichnung lesbar",
        "Prüft, ob die Zeichnung (DWG/JSON-Export) gelesen werden kann",
    ));
    rules.push(Rule::intake(
        RuleCode::Input002,
        "Raumliste lesbar",
        "Prüft, ob die Excel-Raumliste gelesen werden kann",
    ));
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_covers_every_code_once() {
        let catalog = RuleCatalog::standard();
        assert_eq!(catalog.len(), RuleCode::all().len());
        for code in RuleCode::all() {
            assert_eq!(
                catalog.iter().filter(|rule| rule.code == code).count(),
                1,
                "{code} must be listed exactly once"
            );
        }
    }

    #[test]
    fn catalog_follows_category_order() {
        let catalog = RuleCatalog::standard();
        let categories: Vec<_> = catalog.iter().map(|rule| rule.category).collect();
        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);
        assert_eq!(
            catalog.iter().next().map(|rule| rule.code),
            Some(RuleCode::Layer001)
        );
    }

    #[test]
    fn only_input_rules_are_intake() {
        for rule in RuleCatalog::standard().iter() {
            let intake = matches!(rule.check, RuleCheck::Intake);
            assert_eq!(intake, rule.category == RuleCategory::Input, "{}", rule.code);
        }
    }

    #[test]
    fn entries_serialize_with_stable_codes() {
        let entries = RuleCatalog::standard().entries();
        let json = serde_json::to_value(&entries).expect("entries serialize");
        assert_eq!(json[0]["code"], "LAYER_001");
        assert_eq!(json[0]["name"], "Pflichtlayer vorhanden");
        assert_eq!(json[0]["category"], "layer");
    }

    #[test]
    fn catalog_is_shared() {
        assert!(Arc::ptr_eq(&RuleCatalog::standard(), &RuleCatalog::standard()));
    }
}
