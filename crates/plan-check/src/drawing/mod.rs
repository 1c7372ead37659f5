//! Parsed drawing model and the LibreDWG JSON importer feeding it.

mod parser;

use crate::validation::geometry::{Point, Polygon, DEFAULT_EPSILON};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Color index meaning "inherit from layer".
pub const BYLAYER: i16 = 256;

pub const ROOM_POLYGON_LAYER: &str = "R_RAUMPOLYGON";
pub const ROOM_DEDUCTION_LAYER: &str = "R_RAUMPOLYGON-ABZUG";
pub const FLOOR_POLYGON_LAYER: &str = "R_GESCHOSSPOLYGON";
pub const AOID_LAYER: &str = "R_AOID";

/// Layers whose polylines describe area outlines and must be clean polygons.
pub const OUTLINE_LAYERS: [&str; 3] = [ROOM_POLYGON_LAYER, ROOM_DEDUCTION_LAYER, FLOOR_POLYGON_LAYER];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub text_styles: Vec<TextStyle>,
    pub entities: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub color: i16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    pub name: String,
    pub font_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub handle: String,
    /// DXF entity type name, upper case (`LWPOLYLINE`, `TEXT`, `SPLINE`, ...).
    pub kind: String,
    pub layer: String,
    #[serde(default = "bylayer")]
    pub color: i16,
    pub shape: Shape,
}

fn bylayer() -> i16 {
    BYLAYER
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Polyline(Polyline),
    Text(TextLabel),
    Other { anchor: Option<Point> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    /// Closed flag as stored on the entity.
    pub closed: bool,
    #[serde(default)]
    pub width: f64,
    pub points: Vec<Point>,
}

impl Polyline {
    /// Boundary polygon; a flagged-closed polyline gets its closing vertex appended.
    pub fn polygon(&self) -> Polygon {
        let mut points = self.points.clone();
        if self.closed {
            if let (Some(first), Some(last)) = (points.first().copied(), points.last()) {
                let repeated = (first.x - last.x).abs() <= DEFAULT_EPSILON
                    && (first.y - last.y).abs() <= DEFAULT_EPSILON
                    && (first.z - last.z).abs() <= DEFAULT_EPSILON;
                if !repeated {
                    points.push(first);
                }
            }
        }
        Polygon::new(points)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub value: String,
    pub insertion: Point,
    pub height: f64,
    pub style: String,
}

impl Entity {
    pub fn anchor(&self) -> Option<Point> {
        match &self.shape {
            Shape::Polyline(polyline) => polyline.points.first().copied(),
            Shape::Text(text) => Some(text.insertion),
            Shape::Other { anchor } => *anchor,
        }
    }

    pub fn as_polyline(&self) -> Option<&Polyline> {
        match &self.shape {
            Shape::Polyline(polyline) => Some(polyline),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextLabel> {
        match &self.shape {
            Shape::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Layer as seen by the auditor: declared color plus how many entities sit on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerObservation {
    pub name: String,
    pub color: i16,
    pub entity_count: usize,
}

impl Drawing {
    pub fn layer_observations(&self) -> Vec<LayerObservation> {
        self.layers
            .iter()
            .map(|layer| LayerObservation {
                name: layer.name.clone(),
                color: layer.color,
                entity_count: self
                    .entities
                    .iter()
                    .filter(|entity| entity.layer == layer.name)
                    .count(),
            })
            .collect()
    }

    pub fn polylines(&self) -> impl Iterator<Item = (&Entity, &Polyline)> {
        self.entities
            .iter()
            .filter_map(|entity| entity.as_polyline().map(|polyline| (entity, polyline)))
    }

    pub fn polylines_on<'a>(
        &'a self,
        layer: &'a str,
    ) -> impl Iterator<Item = (&'a Entity, &'a Polyline)> + 'a {
        self.polylines().filter(move |(entity, _)| entity.layer == layer)
    }

    pub fn texts(&self) -> impl Iterator<Item = (&Entity, &TextLabel)> {
        self.entities
            .iter()
            .filter_map(|entity| entity.as_text().map(|text| (entity, text)))
    }

    pub fn text_style(&self, name: &str) -> Option<&TextStyle> {
        self.text_styles
            .iter()
            .find(|style| style.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug)]
pub enum DrawingImportError {
    Io(std::io::Error),
    Json(serde_json::Error),
    MissingModelSpace,
}

impl std::fmt::Display for DrawingImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawingImportError::Io(err) => write!(f, "failed to read drawing export: {}", err),
            DrawingImportError::Json(err) => write!(f, "invalid drawing JSON: {}", err),
            DrawingImportError::MissingModelSpace => {
                write!(f, "drawing export contains no model space block")
            }
        }
    }
}

impl std::error::Error for DrawingImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DrawingImportError::Io(err) => Some(err),
            DrawingImportError::Json(err) => Some(err),
            DrawingImportError::MissingModelSpace => None,
        }
    }
}

impl From<std::io::Error> for DrawingImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for DrawingImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Reads the JSON produced by `dwgread -O JSON` into a [`Drawing`].
pub struct DrawingImporter;

impl DrawingImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Drawing, DrawingImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Drawing, DrawingImportError> {
        let export = serde_json::from_reader(reader)?;
        parser::into_drawing(export)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Drawing, DrawingImportError> {
        let export = serde_json::from_value(value)?;
        parser::into_drawing(export)
    }
}
