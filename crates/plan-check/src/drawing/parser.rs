use super::{
    DrawingImportError, Drawing, Entity, Layer, Polyline, Shape, TextLabel, TextStyle, BYLAYER,
};
use crate::validation::geometry::Point;
use serde::Deserialize;
use std::collections::HashMap;

const MODEL_SPACE: &str = "*Model_Space";

/// Polyline closure bits: 512 on LWPOLYLINE rows written by `dwgread`, 1 on POLYLINE rows and
/// on simplified exports that carry the DXF group 70 value.
const CLOSED_FLAGS: u32 = 1 | 512;

#[derive(Debug, Deserialize)]
pub(super) struct DwgExport {
    #[serde(default)]
    tables: DwgTables,
    #[serde(default)]
    blocks: HashMap<String, DwgBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct DwgTables {
    #[serde(rename = "LAYER", default)]
    layers: Vec<LayerRow>,
    #[serde(rename = "STYLE", default)]
    styles: Vec<StyleRow>,
}

#[derive(Debug, Deserialize)]
struct LayerRow {
    name: String,
    #[serde(default = "default_layer_color")]
    color: i16,
}

#[derive(Debug, Deserialize)]
struct StyleRow {
    name: String,
    #[serde(default)]
    font_file: String,
}

#[derive(Debug, Default, Deserialize)]
struct DwgBlock {
    #[serde(default)]
    entities: Vec<EntityRow>,
}

#[derive(Debug, Deserialize)]
struct EntityRow {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    handle: String,
    #[serde(default = "default_layer")]
    layer: String,
    #[serde(default = "default_entity_color")]
    color: i16,
    #[serde(default)]
    flag: u32,
    #[serde(default)]
    const_width: f64,
    #[serde(default)]
    points: Vec<PointRow>,
    #[serde(default)]
    insertion_point: Option<PointRow>,
    #[serde(default)]
    height: f64,
    #[serde(default)]
    text_value: String,
    #[serde(default = "default_style")]
    style: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct PointRow {
    x: f64,
    y: f64,
    #[serde(default)]
    z: f64,
}

impl From<PointRow> for Point {
    fn from(row: PointRow) -> Self {
        Point::with_z(row.x, row.y, row.z)
    }
}

fn default_layer_color() -> i16 {
    7
}

fn default_entity_color() -> i16 {
    BYLAYER
}

fn default_layer() -> String {
    "0".to_string()
}

fn default_style() -> String {
    "Standard".to_string()
}

pub(super) fn into_drawing(export: DwgExport) -> Result<Drawing, DrawingImportError> {
    let DwgExport { tables, mut blocks } = export;
    let model_space = blocks
        .remove(MODEL_SPACE)
        .ok_or(DrawingImportError::MissingModelSpace)?;

    let layers = tables
        .layers
        .into_iter()
        .map(|row| Layer {
            name: row.name,
            color: row.color,
        })
        .collect();

    let text_styles = tables
        .styles
        .into_iter()
        .map(|row| TextStyle {
            name: row.name,
            font_file: row.font_file,
        })
        .collect();

    let entities = model_space.entities.into_iter().map(into_entity).collect();

    Ok(Drawing {
        layers,
        text_styles,
        entities,
    })
}

fn into_entity(row: EntityRow) -> Entity {
    let kind = row.kind.trim().to_ascii_uppercase();
    let shape = match kind.as_str() {
        "LWPOLYLINE" | "POLYLINE" => Shape::Polyline(Polyline {
            closed: row.flag & CLOSED_FLAGS != 0,
            width: row.const_width,
            points: row.points.into_iter().map(Point::from).collect(),
        }),
        "TEXT" | "MTEXT" => Shape::Text(TextLabel {
            value: row.text_value.trim().to_string(),
            insertion: row
                .insertion_point
                .map(Point::from)
                .unwrap_or(Point::new(0.0, 0.0)),
            height: row.height,
            style: row.style,
        }),
        _ => Shape::Other {
            anchor: row
                .insertion_point
                .or_else(|| row.points.first().copied())
                .map(Point::from),
        },
    };

    Entity {
        handle: row.handle,
        kind,
        layer: row.layer,
        color: row.color,
        shape,
    }
}

#[cfg(test)]
mod tests {
    use super::super::DrawingImporter;
    use super::*;
    use serde_json::json;

    fn export() -> serde_json::Value {
        json!({
            "header": { "version": "AC1027" },
            "tables": {
                "LAYER": [
                    { "type": "LAYER", "name": "0", "color": 7, "flag": 0 },
                    { "type": "LAYER", "name": "R_RAUMPOLYGON", "color": 3, "flag": 0 }
                ],
                "STYLE": [ { "name": "Standard", "font_file": "arial.ttf" } ]
            },
            "blocks": {
                "*Model_Space": {
                    "entities": [
                        {
                            "type": "LWPOLYLINE",
                            "handle": "1A3",
                            "layer": "R_RAUMPOLYGON",
                            "flag": 1,
                            "points": [
                                { "x": 0.0, "y": 0.0 },
                                { "x": 5000.0, "y": 0.0 },
                                { "x": 5000.0, "y": 4000.0 },
                                { "x": 0.0, "y": 4000.0 }
                            ]
                        },
                        {
                            "type": "text",
                            "handle": "1A5",
                            "layer": "R_AOID",
                            "insertion_point": { "x": 2500.0, "y": 2000.0, "z": 0.0 },
                            "height": 100.0,
                            "text_value": " 2011.DM.04.045 "
                        },
                        { "type": "SPLINE", "handle": "1A7", "layer": "A_ARCHITEKTUR" }
                    ]
                }
            },
            "objects": []
        })
    }

    #[test]
    fn imports_layers_styles_and_entities() {
        let drawing = DrawingImporter::from_value(export()).expect("export parses");

        assert_eq!(drawing.layers.len(), 2);
        assert_eq!(drawing.text_styles[0].font_file, "arial.ttf");
        assert_eq!(drawing.entities.len(), 3);

        let polyline = drawing.entities[0].as_polyline().expect("polyline");
        assert!(polyline.closed);
        assert_eq!(polyline.polygon().len(), 5);

        let text = drawing.entities[1].as_text().expect("text");
        assert_eq!(drawing.entities[1].kind, "TEXT");
        assert_eq!(text.value, "2011.DM.04.045");
        assert_eq!(text.style, "Standard");
        assert_eq!(drawing.entities[1].color, BYLAYER);

        assert_eq!(drawing.entities[2].kind, "SPLINE");
        assert_eq!(drawing.entities[2].anchor(), None);
    }

    #[test]
    fn dwgread_closure_bit_closes_polylines() {
        let drawing = DrawingImporter::from_value(json!({
            "blocks": {
                "*Model_Space": {
                    "entities": [
                        {
                            "type": "LWPOLYLINE",
                            "handle": "2B0",
                            "layer": "R_RAUMPOLYGON",
                            "flag": 512,
                            "points": [
                                { "x": 0.0, "y": 0.0 },
                                { "x": 10.0, "y": 0.0 },
                                { "x": 10.0, "y": 10.0 }
                            ]
                        },
                        {
                            "type": "LWPOLYLINE",
                            "handle": "2B1",
                            "layer": "R_RAUMPOLYGON",
                            "flag": 4,
                            "points": [ { "x": 0.0, "y": 0.0 }, { "x": 10.0, "y": 0.0 } ]
                        }
                    ]
                }
            }
        }))
        .expect("export parses");

        assert!(drawing.entities[0].as_polyline().expect("polyline").closed);
        assert!(!drawing.entities[1].as_polyline().expect("polyline").closed);
    }

    #[test]
    fn counts_entities_per_layer() {
        let drawing = DrawingImporter::from_value(export()).expect("export parses");
        let observations = drawing.layer_observations();
        assert_eq!(observations[0].entity_count, 0);
        assert_eq!(observations[1].entity_count, 1);
    }

    #[test]
    fn rejects_exports_without_model_space() {
        let err = DrawingImporter::from_value(json!({ "tables": {}, "blocks": {} }))
            .expect_err("model space required");
        assert!(matches!(err, DrawingImportError::MissingModelSpace));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = DrawingImporter::from_reader("{ not json".as_bytes()).expect_err("invalid json");
        assert!(matches!(err, DrawingImportError::Json(_)));
        assert!(err.to_string().contains("invalid drawing JSON"));
    }
}
