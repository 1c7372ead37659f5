use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info};

use super::domain::{
    location_from_name, DocumentId, DocumentInputs, DocumentRecord, DocumentStatus, NewDocument,
    NewProject, Project, ProjectId, ProjectSummary,
};
use super::repository::{ProjectRepository, RepositoryError};
use crate::validation::{RuleEngine, ValidationResult};

/// Service storing projects and documents and running validations against them.
///
/// Every validation run takes a ticket. Only the newest ticket of a document may store its
/// result, so the run started last wins even when an older run finishes later.
pub struct ValidationService<R> {
    repository: Arc<R>,
    engine: Arc<RuleEngine>,
    generations: Mutex<HashMap<DocumentId, u64>>,
}

static PROJECT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static DOCUMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_project_id() -> ProjectId {
    let id = PROJECT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProjectId(format!("prj-{id:06}"))
}

fn next_document_id() -> DocumentId {
    let id = DOCUMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DocumentId(format!("doc-{id:06}"))
}

/// Permission to store one validation result for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationTicket {
    pub document_id: DocumentId,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Applied(DocumentRecord),
    /// A newer run was started; this result was discarded.
    Superseded { ticket: ValidationTicket, latest: u64 },
}

impl<R> ValidationService<R>
where
    R: ProjectRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: RuleEngine) -> Self {
        Self {
            repository,
            engine: Arc::new(engine),
            generations: Mutex::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn create_project(&self, request: NewProject) -> Result<Project, ServiceError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidRequest("project name is required".to_string()));
        }
        if request.sia_phase.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("SIA phase is required".to_string()));
        }

        let location = request
            .location
            .filter(|location| !location.trim().is_empty())
            .unwrap_or_else(|| location_from_name(name));
        let project = Project {
            id: next_project_id(),
            name: name.to_string(),
            location,
            sia_phase: request.sia_phase.trim().to_string(),
            project_number: request.project_number,
            created_by: request.created_by,
            created_at: Utc::now(),
        };

        Ok(self.repository.insert_project(project)?)
    }

    pub fn project(&self, project_id: &ProjectId) -> Result<ProjectSummary, ServiceError> {
        let project = self
            .repository
            .fetch_project(project_id)?
            .ok_or(RepositoryError::NotFound)?;
        let documents = self.repository.documents_for(project_id)?;
        Ok(ProjectSummary::build(
            project,
            &documents,
            &self.engine.config().scoring,
        ))
    }

    /// Store a new document and validate it right away.
    pub fn upload_document(
        &self,
        project_id: &ProjectId,
        request: NewDocument,
    ) -> Result<DocumentRecord, ServiceError> {
        if request.name.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("document name is required".to_string()));
        }
        self.repository
            .fetch_project(project_id)?
            .ok_or(RepositoryError::NotFound)?;

        let now = Utc::now();
        let record = DocumentRecord {
            id: next_document_id(),
            project_id: project_id.clone(),
            name: request.name.trim().to_string(),
            created_by: request.created_by,
            created_at: now,
            updated_at: now,
            status: DocumentStatus::Processing,
            inputs: DocumentInputs {
                drawing: request.drawing,
                room_list_csv: request.room_list_csv,
            },
            result: None,
        };
        let stored = self.repository.insert_document(record)?;
        self.validate_document(&stored.id)
    }

    pub fn document(&self, document_id: &DocumentId) -> Result<DocumentRecord, ServiceError> {
        let record = self
            .repository
            .fetch_document(document_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Run a full validation and return the document as stored afterwards.
    pub fn validate_document(
        &self,
        document_id: &DocumentId,
    ) -> Result<DocumentRecord, ServiceError> {
        let (ticket, inputs) = self.begin(document_id)?;
        let result = self.evaluate(&inputs);
        match self.complete(ticket, result)? {
            ValidationOutcome::Applied(record) => Ok(record),
            ValidationOutcome::Superseded { .. } => self.document(document_id),
        }
    }

    /// Issue a ticket for a new run and mark the document as processing.
    pub fn begin(
        &self,
        document_id: &DocumentId,
    ) -> Result<(ValidationTicket, DocumentInputs), ServiceError> {
        // The read and the Processing write stay under the registry lock, as in `complete`.
        let mut generations = self.lock_generations()?;
        let mut record = self.document(document_id)?;
        let latest = generations.entry(document_id.clone()).or_insert(0);
        *latest += 1;
        let generation = *latest;

        record.status = DocumentStatus::Processing;
        record.updated_at = Utc::now();
        let inputs = record.inputs.clone();
        self.repository.update_document(record)?;
        drop(generations);

        debug!(document = %document_id.0, generation, "validation started");
        Ok((
            ValidationTicket {
                document_id: document_id.clone(),
                generation,
            },
            inputs,
        ))
    }

    /// Parse the stored inputs and run the engine. Unreadable inputs become a blocked result.
    pub fn evaluate(&self, inputs: &DocumentInputs) -> ValidationResult {
        inputs.validate(&self.engine)
    }

    /// Store the result if the ticket is still the newest for its document.
    pub fn complete(
        &self,
        ticket: ValidationTicket,
        result: ValidationResult,
    ) -> Result<ValidationOutcome, ServiceError> {
        let generations = self.lock_generations()?;
        let latest = generations
            .get(&ticket.document_id)
            .copied()
            .unwrap_or_default();
        if latest != ticket.generation {
            info!(
                document = %ticket.document_id.0,
                generation = ticket.generation,
                latest,
                "discarding superseded validation result"
            );
            return Ok(ValidationOutcome::Superseded { ticket, latest });
        }

        let mut record = self.document(&ticket.document_id)?;
        record.status = if result.blocked {
            DocumentStatus::Failed
        } else {
            DocumentStatus::Validated
        };
        record.updated_at = Utc::now();
        record.result = Some(result);
        self.repository.update_document(record.clone())?;
        drop(generations);

        debug!(
            document = %ticket.document_id.0,
            generation = ticket.generation,
            status = record.status.label(),
            "validation result stored"
        );
        Ok(ValidationOutcome::Applied(record))
    }

    fn lock_generations(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<DocumentId, u64>>, ServiceError> {
        self.generations.lock().map_err(|_| {
            ServiceError::Repository(RepositoryError::Unavailable(
                "generation registry poisoned".to_string(),
            ))
        })
    }
}

/// Error raised by the validation service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
