use super::domain::{DocumentId, DocumentRecord, Project, ProjectId};

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ProjectRepository: Send + Sync {
    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError>;
    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError>;
    fn insert_document(&self, record: DocumentRecord) -> Result<DocumentRecord, RepositoryError>;
    fn update_document(&self, record: DocumentRecord) -> Result<(), RepositoryError>;
    fn fetch_document(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, RepositoryError>;
    /// Documents of a project in upload order.
    fn documents_for(&self, project_id: &ProjectId) -> Result<Vec<DocumentRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
