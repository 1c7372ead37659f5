//! Layer and entity auditing against the required layer schema.
//!
//! Findings come out in a stable order: required-layer order for missing layers and color
//! mismatches, observed-layer order for undeclared layers, drawing order for entities.

use super::domain::{Finding, RuleCode};
use crate::drawing::{Entity, LayerObservation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRequirement {
    pub name: String,
    /// ACI color the layer must carry, when prescribed.
    pub color: Option<i16>,
    /// Entity kinds permitted on the layer; empty means unrestricted.
    #[serde(default)]
    pub allowed_entities: Vec<String>,
}

impl LayerRequirement {
    fn new(name: &str, color: i16, allowed: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            color: Some(color),
            allowed_entities: allowed.iter().map(|kind| kind.to_string()).collect(),
        }
    }

    pub fn allows(&self, kind: &str) -> bool {
        self.allowed_entities.is_empty()
            || self
                .allowed_entities
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(kind))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSchema {
    pub required: Vec<LayerRequirement>,
    /// Layers tolerated without being required (`0`, `Defpoints`).
    pub system_layers: Vec<String>,
    /// Layers that may carry TEXT/MTEXT entities.
    pub text_layers: Vec<String>,
}

const DRAWING_ENTITIES: &[&str] = &["LWPOLYLINE", "LINE", "ARC", "CIRCLE", "INSERT"];

impl LayerSchema {
    /// Layer structure prescribed by the BBL CAD guideline.
    pub fn bbl() -> Self {
        let architecture: Vec<&str> = DRAWING_ENTITIES
            .iter()
            .copied()
            .chain(std::iter::once("HATCH"))
            .collect();

        let required = vec![
            LayerRequirement::new("A_ARCHITEKTUR", 253, &architecture),
            LayerRequirement::new("A_ELEKTRO", 253, DRAWING_ENTITIES),
            LayerRequirement::new("A_HEIZUNG-KUEHLUNG", 253, DRAWING_ENTITIES),
            LayerRequirement::new("A_LUEFTUNG", 253, DRAWING_ENTITIES),
            LayerRequirement::new("A_SANITAER", 253, DRAWING_ENTITIES),
            LayerRequirement::new("A_SCHRAFFUR", 253, &["HATCH"]),
            LayerRequirement::new("V_ACHSEN", 8, &["LINE", "TEXT", "DIMENSION"]),
            LayerRequirement::new("V_BEMASSUNG", 40, &["DIMENSION", "TEXT"]),
            LayerRequirement::new("V_PLANLAYOUT", 7, &["LINE", "LWPOLYLINE", "TEXT", "MTEXT"]),
            LayerRequirement::new("V_REFERENZPUNKT", 1, &["POINT", "INSERT"]),
            LayerRequirement::new("V_TEXT", 7, &["TEXT", "MTEXT"]),
            LayerRequirement::new("R_AOID", 30, &["TEXT", "MTEXT"]),
            LayerRequirement::new("R_RAUMPOLYGON", 3, &["LWPOLYLINE"]),
            LayerRequirement::new("R_RAUMPOLYGON-ABZUG", 1, &["LWPOLYLINE"]),
            LayerRequirement::new("R_GESCHOSSPOLYGON", 4, &["LWPOLYLINE"]),
        ];

        Self {
            required,
            system_layers: vec!["0".to_string(), "Defpoints".to_string()],
            text_layers: ["V_PLANLAYOUT", "V_ACHSEN", "V_TEXT", "R_AOID"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }

    pub fn requirement(&self, name: &str) -> Option<&LayerRequirement> {
        self.required.iter().find(|layer| layer.name == name)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.requirement(name).is_some() || self.system_layers.iter().any(|layer| layer == name)
    }

    pub fn allows_text_on(&self, layer: &str) -> bool {
        self.text_layers.iter().any(|allowed| allowed == layer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPolicy {
    pub forbidden: Vec<String>,
    /// Embedded OLE objects, reported under their own code.
    pub ole: Vec<String>,
}

impl EntityPolicy {
    pub fn bbl() -> Self {
        Self {
            forbidden: ["SPLINE", "ELLIPSE", "MLINE", "MULTILINE"]
                .iter()
                .map(|kind| kind.to_string())
                .collect(),
            ole: ["OLE2FRAME", "OLEFRAME"]
                .iter()
                .map(|kind| kind.to_string())
                .collect(),
        }
    }

    pub fn is_forbidden(&self, kind: &str) -> bool {
        self.forbidden.iter().any(|entry| entry.eq_ignore_ascii_case(kind))
    }

    pub fn is_ole(&self, kind: &str) -> bool {
        self.ole.iter().any(|entry| entry.eq_ignore_ascii_case(kind))
    }
}

pub fn missing_layers(observed: &[LayerObservation], schema: &LayerSchema) -> Vec<Finding> {
    schema
        .required
        .iter()
        .filter(|required| !observed.iter().any(|layer| layer.name == required.name))
        .map(|required| {
            Finding::error(
                RuleCode::Layer001,
                format!("Required layer \"{}\" is missing", required.name),
            )
            .on_layer(required.name.clone())
        })
        .collect()
}

pub fn color_mismatches(observed: &[LayerObservation], schema: &LayerSchema) -> Vec<Finding> {
    schema
        .required
        .iter()
        .filter_map(|required| {
            let expected = required.color?;
            let layer = observed.iter().find(|layer| layer.name == required.name)?;
            (layer.color != expected).then(|| {
                Finding::warning(
                    RuleCode::Layer002,
                    format!(
                        "Layer color mismatch: \"{}\" has color {}, expected {}",
                        layer.name, layer.color, expected
                    ),
                )
                .on_layer(layer.name.clone())
            })
        })
        .collect()
}

pub fn unexpected_layers(observed: &[LayerObservation], schema: &LayerSchema) -> Vec<Finding> {
    observed
        .iter()
        .filter(|layer| !schema.is_declared(&layer.name))
        .map(|layer| {
            Finding::warning(
                RuleCode::Layer003,
                format!(
                    "Unexpected layer \"{}\" found ({} entities)",
                    layer.name, layer.entity_count
                ),
            )
            .on_layer(layer.name.clone())
        })
        .collect()
}

pub fn forbidden_entities(entities: &[Entity], policy: &EntityPolicy) -> Vec<Finding> {
    entities
        .iter()
        .filter(|entity| policy.is_forbidden(&entity.kind))
        .map(|entity| {
            Finding::error(
                RuleCode::Entity001,
                format!(
                    "Forbidden entity type {} found on layer \"{}\"",
                    entity.kind, entity.layer
                ),
            )
            .at(entity.anchor())
            .on_layer(entity.layer.clone())
            .for_handle(entity.handle.clone())
        })
        .collect()
}

pub fn ole_objects(entities: &[Entity], policy: &EntityPolicy) -> Vec<Finding> {
    entities
        .iter()
        .filter(|entity| policy.is_ole(&entity.kind))
        .map(|entity| {
            Finding::error(
                RuleCode::Entity002,
                format!(
                    "Embedded OLE object ({}) found on layer \"{}\"",
                    entity.kind, entity.layer
                ),
            )
            .at(entity.anchor())
            .on_layer(entity.layer.clone())
            .for_handle(entity.handle.clone())
        })
        .collect()
}

/// Entities whose kind is not permitted on their (required) layer. Kinds already reported as
/// forbidden or OLE are skipped.
pub fn misplaced_entities(
    entities: &[Entity],
    schema: &LayerSchema,
    policy: &EntityPolicy,
) -> Vec<Finding> {
    entities
        .iter()
        .filter(|entity| !policy.is_forbidden(&entity.kind) && !policy.is_ole(&entity.kind))
        .filter_map(|entity| {
            let requirement = schema.requirement(&entity.layer)?;
            (!requirement.allows(&entity.kind)).then(|| {
                Finding::warning(
                    RuleCode::Entity003,
                    format!(
                        "Entity type {} is not allowed on layer \"{}\"",
                        entity.kind, entity.layer
                    ),
                )
                .at(entity.anchor())
                .on_layer(entity.layer.clone())
                .for_handle(entity.handle.clone())
            })
        })
        .collect()
}

/// Full audit in reporting order.
pub fn audit(
    observed: &[LayerObservation],
    entities: &[Entity],
    schema: &LayerSchema,
    policy: &EntityPolicy,
) -> Vec<Finding> {
    let mut findings = missing_layers(observed, schema);
    findings.extend(color_mismatches(observed, schema));
    findings.extend(unexpected_layers(observed, schema));
    findings.extend(forbidden_entities(entities, policy));
    findings.extend(ole_objects(entities, policy));
    findings.extend(misplaced_entities(entities, schema, policy));
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::{Shape, BYLAYER};
    use crate::validation::domain::Severity;

    fn observed(name: &str, color: i16) -> LayerObservation {
        LayerObservation {
            name: name.to_string(),
            color,
            entity_count: 0,
        }
    }

    fn complete_layers(schema: &LayerSchema) -> Vec<LayerObservation> {
        schema
            .required
            .iter()
            .map(|layer| observed(&layer.name, layer.color.unwrap_or(7)))
            .collect()
    }

    fn entity(handle: &str, kind: &str, layer: &str) -> Entity {
        Entity {
            handle: handle.to_string(),
            kind: kind.to_string(),
            layer: layer.to_string(),
            color: BYLAYER,
            shape: Shape::Other { anchor: None },
        }
    }

    #[test]
    fn bbl_schema_lists_fifteen_layers() {
        let schema = LayerSchema::bbl();
        assert_eq!(schema.required.len(), 15);
        assert!(schema.is_declared("0"));
        assert!(schema.is_declared("Defpoints"));
        assert!(!schema.is_declared("Temp_Construction"));
    }

    #[test]
    fn complete_layer_set_is_clean() {
        let schema = LayerSchema::bbl();
        let layers = complete_layers(&schema);
        assert!(audit(&layers, &[], &schema, &EntityPolicy::bbl()).is_empty());
    }

    #[test]
    fn missing_layers_follow_schema_order() {
        let schema = LayerSchema::bbl();
        let layers = vec![observed("R_RAUMPOLYGON", 3), observed("A_ARCHITEKTUR", 253)];

        let findings = missing_layers(&layers, &schema);

        assert_eq!(findings.len(), 13);
        assert!(findings.iter().all(|f| f.severity == Severity::Error));
        assert_eq!(findings[0].layer.as_deref(), Some("A_ELEKTRO"));
        assert_eq!(findings[12].layer.as_deref(), Some("R_GESCHOSSPOLYGON"));
        assert!(findings[0].message.contains("A_ELEKTRO"));
    }

    #[test]
    fn color_mismatch_is_a_warning() {
        let schema = LayerSchema::bbl();
        let mut layers = complete_layers(&schema);
        let text = layers
            .iter_mut()
            .find(|layer| layer.name == "V_TEXT")
            .expect("text layer");
        text.color = 3;

        let findings = color_mismatches(&layers, &schema);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, RuleCode::Layer002);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert!(findings[0].message.contains("expected 7"));
    }

    #[test]
    fn undeclared_layers_follow_observed_order() {
        let schema = LayerSchema::bbl();
        let mut layers = complete_layers(&schema);
        layers.push(observed("Temp_Construction", 1));
        layers.insert(0, observed("Möblierung", 8));

        let findings = unexpected_layers(&layers, &schema);

        let names: Vec<_> = findings
            .iter()
            .filter_map(|finding| finding.layer.as_deref())
            .collect();
        assert_eq!(names, vec!["Möblierung", "Temp_Construction"]);
    }

    #[test]
    fn forbidden_and_ole_entities_use_separate_codes() {
        let policy = EntityPolicy::bbl();
        let entities = vec![
            entity("1A7", "SPLINE", "A_ARCHITEKTUR"),
            entity("1A8", "OLE2FRAME", "V_PLANLAYOUT"),
            entity("1A9", "LINE", "A_ARCHITEKTUR"),
        ];

        let forbidden = forbidden_entities(&entities, &policy);
        let ole = ole_objects(&entities, &policy);

        assert_eq!(forbidden.len(), 1);
        assert_eq!(forbidden[0].code, RuleCode::Entity001);
        assert_eq!(forbidden[0].handle.as_deref(), Some("1A7"));
        assert!(forbidden[0].message.contains("SPLINE"));
        assert_eq!(ole.len(), 1);
        assert_eq!(ole[0].code, RuleCode::Entity002);
    }

    #[test]
    fn entity_kinds_are_checked_against_layer() {
        let schema = LayerSchema::bbl();
        let policy = EntityPolicy::bbl();
        let entities = vec![
            entity("2B1", "LINE", "R_RAUMPOLYGON"),
            entity("2B2", "LWPOLYLINE", "R_RAUMPOLYGON"),
            entity("2B3", "SPLINE", "R_RAUMPOLYGON"),
            entity("2B4", "CIRCLE", "Temp_Construction"),
        ];

        let findings = misplaced_entities(&entities, &schema, &policy);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].handle.as_deref(), Some("2B1"));
    }
}
