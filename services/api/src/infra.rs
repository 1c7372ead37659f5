use metrics_exporter_prometheus::PrometheusHandle;
use plan_check::projects::{
    DocumentId, DocumentRecord, Project, ProjectId, ProjectRepository, RepositoryError,
};
use plan_check::validation::RuleEngine;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) engine: Arc<RuleEngine>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProjectRepository {
    projects: Arc<Mutex<HashMap<ProjectId, Project>>>,
    documents: Arc<Mutex<Vec<DocumentRecord>>>,
}

impl ProjectRepository for InMemoryProjectRepository {
    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError> {
        let mut guard = self.projects.lock().expect("repository mutex poisoned");
        if guard.contains_key(&project.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let guard = self.projects.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn insert_document(&self, record: DocumentRecord) -> Result<DocumentRecord, RepositoryError> {
        let mut guard = self.documents.lock().expect("repository mutex poisoned");
        if guard.iter().any(|stored| stored.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn update_document(&self, record: DocumentRecord) -> Result<(), RepositoryError> {
        let mut guard = self.documents.lock().expect("repository mutex poisoned");
        match guard.iter_mut().find(|stored| stored.id == record.id) {
            Some(stored) => {
                *stored = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_document(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, RepositoryError> {
        let guard = self.documents.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn documents_for(&self, project_id: &ProjectId) -> Result<Vec<DocumentRecord>, RepositoryError> {
        let guard = self.documents.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.project_id == project_id)
            .cloned()
            .collect())
    }
}
