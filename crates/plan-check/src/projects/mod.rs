//! Projects and uploaded floor-plan documents, with validation runs tracked per document.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    location_from_name, project_score, DocumentId, DocumentInputs, DocumentRecord,
    DocumentStatus, DocumentSummaryView, DocumentView, NewDocument, NewProject, Project, ProjectId,
    ProjectSummary,
};
pub use repository::{ProjectRepository, RepositoryError};
pub use router::project_router;
pub use service::{ServiceError, ValidationOutcome, ValidationService, ValidationTicket};
