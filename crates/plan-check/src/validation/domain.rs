use serde::{Deserialize, Serialize};
use std::fmt;

use super::geometry::{Point, Polygon};

/// Severity attached to every finding. Ordered so that `Error` is the worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Three-band status shared by rooms, documents and projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Ok,
    Warning,
    Error,
}

impl ReviewStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    pub(crate) const fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Info => Self::Ok,
            Severity::Warning => Self::Warning,
            Severity::Error => Self::Error,
        }
    }
}

/// Grouping used by the rule catalog; catalog order follows this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Layer,
    Geometry,
    Entity,
    Text,
    Aoid,
    Input,
}

impl RuleCategory {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Layer,
            Self::Geometry,
            Self::Entity,
            Self::Text,
            Self::Aoid,
            Self::Input,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Layer => "Layer",
            Self::Geometry => "Geometrie",
            Self::Entity => "Entität",
            Self::Text => "Text",
            Self::Aoid => "AOID",
            Self::Input => "Eingabe",
        }
    }
}

/// Stable catalog key of a rule. Findings can only carry codes listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleCode {
    #[serde(rename = "LAYER_001")]
    Layer001,
    #[serde(rename = "LAYER_002")]
    Layer002,
    #[serde(rename = "LAYER_003")]
    Layer003,
    #[serde(rename = "GEOM_001")]
    Geom001,
    #[serde(rename = "GEOM_002")]
    Geom002,
    #[serde(rename = "GEOM_003")]
    Geom003,
    #[serde(rename = "GEOM_004")]
    Geom004,
    #[serde(rename = "GEOM_005")]
    Geom005,
    #[serde(rename = "GEOM_006")]
    Geom006,
    #[serde(rename = "GEOM_007")]
    Geom007,
    #[serde(rename = "ENTITY_001")]
    Entity001,
    #[serde(rename = "ENTITY_002")]
    Entity002,
    #[serde(rename = "ENTITY_003")]
    Entity003,
    #[serde(rename = "TEXT_001")]
    Text001,
    #[serde(rename = "TEXT_002")]
    Text002,
    #[serde(rename = "TEXT_003")]
    Text003,
    #[serde(rename = "TEXT_004")]
    Text004,
    #[serde(rename = "AOID_001")]
    Aoid001,
    #[serde(rename = "AOID_002")]
    Aoid002,
    #[serde(rename = "AOID_003")]
    Aoid003,
    #[serde(rename = "AOID_004")]
    Aoid004,
    #[serde(rename = "AOID_005")]
    Aoid005,
    #[serde(rename = "INPUT_001")]
    Input001,
    #[serde(rename = "INPUT_002")]
    Input002,
}

impl RuleCode {
    pub const fn all() -> [Self; 24] {
        [
            Self::Layer001,
            Self::Layer002,
            Self::Layer003,
            Self::Geom001,
            Self::Geom002,
            Self::Geom003,
            Self::Geom004,
            Self::Geom005,
            Self::Geom006,
            Self::Geom007,
            Self::Entity001,
            Self::Entity002,
            Self::Entity003,
            Self::Text001,
            Self::Text002,
            Self::Text003,
            Self::Text004,
            Self::Aoid001,
            Self::Aoid002,
            Self::Aoid003,
            Self::Aoid004,
            Self::Aoid005,
            Self::Input001,
            Self::Input002,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Layer001 => "LAYER_001",
            Self::Layer002 => "LAYER_002",
            Self::Layer003 => "LAYER_003",
            Self::Geom001 => "GEOM_001",
            Self::Geom002 => "GEOM_002",
            Self::Geom003 => "GEOM_003",
            Self::Geom004 => "GEOM_004",
            Self::Geom005 => "GEOM_005",
            Self::Geom006 => "GEOM_006",
            Self::Geom007 => "GEOM_007",
            Self::Entity001 => "ENTITY_001",
            Self::Entity002 => "ENTITY_002",
            Self::Entity003 => "ENTITY_003",
            Self::Text001 => "TEXT_001",
            Self::Text002 => "TEXT_002",
            Self::Text003 => "TEXT_003",
            Self::Text004 => "TEXT_004",
            Self::Aoid001 => "AOID_001",
            Self::Aoid002 => "AOID_002",
            Self::Aoid003 => "AOID_003",
            Self::Aoid004 => "AOID_004",
            Self::Aoid005 => "AOID_005",
            Self::Input001 => "INPUT_001",
            Self::Input002 => "INPUT_002",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim().to_ascii_uppercase().replace('-', "_");
        Self::all().into_iter().find(|code| code.as_str() == wanted)
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported issue produced by a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub code: RuleCode,
    pub severity: Severity,
    pub message: String,
    pub location: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

impl Finding {
    pub fn new(code: RuleCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            location: None,
            layer: None,
            handle: None,
        }
    }

    pub fn error(code: RuleCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    pub fn warning(code: RuleCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    pub fn info(code: RuleCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Info, message)
    }

    pub fn at(mut self, location: Option<Point>) -> Self {
        self.location = location;
        self
    }

    pub fn on_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn for_handle(mut self, handle: impl Into<String>) -> Self {
        let handle = handle.into();
        self.handle = if handle.is_empty() { None } else { Some(handle) };
        self
    }
}

/// Function of a room as declared in the room list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomFunction {
    Office,
    Conference,
    Meeting,
    Storage,
    Wc,
    Hall,
    Circulation,
    Technical,
    #[default]
    Unknown,
}

impl RoomFunction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Conference => "conference",
            Self::Meeting => "meeting",
            Self::Storage => "storage",
            Self::Wc => "WC",
            Self::Hall => "hall",
            Self::Circulation => "circulation",
            Self::Technical => "technical",
            Self::Unknown => "unknown",
        }
    }
}

/// SIA 416 area classification carried by room-list entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AreaCategory {
    Bgf,
    Ngf,
    Hnf,
    Nnf,
    Vf,
    Ff,
    Kf,
}

impl AreaCategory {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BGF" | "GF" => Some(Self::Bgf),
            "NGF" => Some(Self::Ngf),
            "HNF" => Some(Self::Hnf),
            "NNF" => Some(Self::Nnf),
            "VF" => Some(Self::Vf),
            "FF" => Some(Self::Ff),
            "KF" => Some(Self::Kf),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bgf => "Bruttogeschossfläche",
            Self::Ngf => "Nettogeschossfläche",
            Self::Hnf => "Hauptnutzfläche",
            Self::Nnf => "Nebennutzfläche",
            Self::Vf => "Verkehrsfläche",
            Self::Ff => "Funktionsfläche",
            Self::Kf => "Konstruktionsfläche",
        }
    }
}

/// Room derived from a closed room polygon and the AOID placed inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub aoid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    pub polygon: Polygon,
    pub function: RoomFunction,
    pub area_m2: f64,
    pub status: ReviewStatus,
}
