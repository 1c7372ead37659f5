use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::drawing::DrawingImporter;
use crate::room_list::{RoomList, RoomListImporter};
use crate::validation::{
    aggregate_scores, ReviewStatus, RuleEngine, ScoringPolicy, ValidationResult,
};

/// Identifier wrapper for projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

/// Identifier wrapper for uploaded floor-plan documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub String);

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    /// SIA 112 phase, e.g. `"53"`.
    pub sia_phase: String,
    #[serde(default)]
    pub project_number: Option<String>,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub location: String,
    pub sia_phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_number: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Location taken from a project name of the form `"Bern, Verwaltungsgebäude Liebefeld"`.
pub fn location_from_name(name: &str) -> String {
    name.split(',').next().unwrap_or_default().trim().to_string()
}

/// Request payload for uploading a drawing (LibreDWG JSON export) with its optional room list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub name: String,
    pub created_by: String,
    pub drawing: serde_json::Value,
    #[serde(default)]
    pub room_list_csv: Option<String>,
}

/// Raw inputs kept with a document so it can be validated again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInputs {
    pub drawing: serde_json::Value,
    #[serde(default)]
    pub room_list_csv: Option<String>,
}

impl DocumentInputs {
    /// Imports both inputs and runs the engine. A missing room list counts as an empty one.
    pub fn validate(&self, engine: &RuleEngine) -> ValidationResult {
        let drawing = DrawingImporter::from_value(self.drawing.clone());
        let room_list = match &self.room_list_csv {
            Some(csv) => RoomListImporter::from_reader(csv.as_bytes()),
            None => Ok(RoomList::default()),
        };
        engine.validate_input(drawing, room_list)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Processing,
    Validated,
    /// An input could not be read; the result carries the blocking finding.
    Failed,
}

impl DocumentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentStatus::Processing => "processing",
            DocumentStatus::Validated => "validated",
            DocumentStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub project_id: ProjectId,
    pub name: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: DocumentStatus,
    pub inputs: DocumentInputs,
    pub result: Option<ValidationResult>,
}

impl DocumentRecord {
    /// Score of the latest result; documents still processing have none.
    pub fn score(&self) -> Option<u8> {
        match self.status {
            DocumentStatus::Processing => None,
            DocumentStatus::Validated | DocumentStatus::Failed => {
                self.result.as_ref().map(|result| result.score)
            }
        }
    }

    pub fn summary_view(&self) -> DocumentSummaryView {
        DocumentSummaryView {
            document_id: self.id.clone(),
            name: self.name.clone(),
            status: self.status.label(),
            score: self.score(),
            review_status: self
                .result
                .as_ref()
                .filter(|_| self.status != DocumentStatus::Processing)
                .map(|result| result.status.label()),
            created_by: self.created_by.clone(),
            updated_at: self.updated_at,
        }
    }

    pub fn view(&self) -> DocumentView {
        DocumentView {
            project_id: self.project_id.clone(),
            summary: self.summary_view(),
            created_at: self.created_at,
            result: self.result.clone(),
        }
    }
}

/// Document row as listed inside a project.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummaryView {
    pub document_id: DocumentId,
    pub name: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_status: Option<&'static str>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
}

/// Full document response including the latest validation result.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub project_id: ProjectId,
    #[serde(flatten)]
    pub summary: DocumentSummaryView,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ValidationResult>,
}

/// Project with its documents and aggregated score.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub document_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
    pub documents: Vec<DocumentSummaryView>,
}

impl ProjectSummary {
    pub fn build(project: Project, documents: &[DocumentRecord], scoring: &ScoringPolicy) -> Self {
        let score = project_score(documents);
        Self {
            project,
            document_count: documents.len(),
            score,
            status: score.map(|score| scoring.classify(score)),
            documents: documents.iter().map(DocumentRecord::summary_view).collect(),
        }
    }
}

/// Rounded mean over documents that are not processing; `None` when there are none.
pub fn project_score(documents: &[DocumentRecord]) -> Option<u8> {
    aggregate_scores(documents.iter().map(DocumentRecord::score))
}
