use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use serde_json::{json, Value};

use crate::projects::domain::{
    DocumentId, DocumentRecord, DocumentStatus, NewDocument, NewProject, Project, ProjectId,
};
use crate::projects::repository::{ProjectRepository, RepositoryError};
use crate::projects::{project_router, ValidationService};
use crate::validation::{LayerSchema, RuleEngine, ValidationConfig};

pub(super) fn new_project() -> NewProject {
    NewProject {
        name: "Bern, Verwaltungsgebäude Liebefeld".to_string(),
        location: None,
        sia_phase: "53".to_string(),
        project_number: Some("BBL-2022-014".to_string()),
        created_by: "max.muster@bbl.admin.ch".to_string(),
    }
}

/// LibreDWG-style export with every required layer and one 5 x 4 m room per AOID.
pub(super) fn drawing_json(aoids: &[&str]) -> Value {
    let layers: Vec<Value> = LayerSchema::bbl()
        .required
        .iter()
        .map(|layer| json!({ "name": layer.name, "color": layer.color.unwrap_or(7) }))
        .chain(std::iter::once(json!({ "name": "0", "color": 7 })))
        .collect();

    let mut entities = Vec::new();
    for (index, aoid) in aoids.iter().enumerate() {
        let x = index as f64 * 6000.0;
        entities.push(json!({
            "type": "LWPOLYLINE",
            "handle": format!("R{index}"),
            "layer": "R_RAUMPOLYGON",
            "flag": 1,
            "const_width": 0.0,
            "points": [
                { "x": x, "y": 0.0 },
                { "x": x + 5000.0, "y": 0.0 },
                { "x": x + 5000.0, "y": 4000.0 },
                { "x": x, "y": 4000.0 }
            ]
        }));
        entities.push(json!({
            "type": "TEXT",
            "handle": format!("T{index}"),
            "layer": "R_AOID",
            "insertion_point": { "x": x + 2500.0, "y": 2000.0 },
            "height": 100.0,
            "text_value": aoid,
            "style": "Standard"
        }));
    }

    json!({
        "tables": {
            "LAYER": layers,
            "STYLE": [{ "name": "Standard", "font_file": "arial.ttf" }]
        },
        "blocks": { "*Model_Space": { "entities": entities } }
    })
}

pub(super) fn new_document(aoids: &[&str], room_list_csv: Option<&str>) -> NewDocument {
    NewDocument {
        name: "Erdgeschoss (EG).dwg".to_string(),
        created_by: "anna.mueller@bbl.admin.ch".to_string(),
        drawing: drawing_json(aoids),
        room_list_csv: room_list_csv.map(str::to_string),
    }
}

pub(super) fn build_service() -> (ValidationService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = ValidationService::new(
        repository.clone(),
        RuleEngine::new(ValidationConfig::default()),
    );
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    projects: Arc<Mutex<HashMap<ProjectId, Project>>>,
    documents: Arc<Mutex<Vec<DocumentRecord>>>,
}

impl ProjectRepository for MemoryRepository {
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
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn update_document(&self, record: DocumentRecord) -> Result<(), RepositoryError> {
        let mut guard = self.documents.lock().expect("repository mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => {
                *existing = record;
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

/// Memory repository that stalls the next `Processing` write after signalling it has started.
#[derive(Default)]
pub(super) struct StallingRepository {
    inner: MemoryRepository,
    armed: AtomicBool,
    entered: Mutex<Option<Sender<()>>>,
}

impl StallingRepository {
    pub(super) fn stall_next_processing_write(&self) -> Receiver<()> {
        let (sender, receiver) = mpsc::channel();
        *self.entered.lock().expect("stall mutex poisoned") = Some(sender);
        self.armed.store(true, Ordering::SeqCst);
        receiver
    }
}

impl ProjectRepository for StallingRepository {
    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError> {
        self.inner.insert_project(project)
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        self.inner.fetch_project(id)
    }

    fn insert_document(&self, record: DocumentRecord) -> Result<DocumentRecord, RepositoryError> {
        self.inner.insert_document(record)
    }

    fn update_document(&self, record: DocumentRecord) -> Result<(), RepositoryError> {
        if record.status == DocumentStatus::Processing && self.armed.swap(false, Ordering::SeqCst) {
            if let Some(entered) = self.entered.lock().expect("stall mutex poisoned").take() {
                let _ = entered.send(());
            }
            std::thread::sleep(Duration::from_millis(100));
        }
        self.inner.update_document(record)
    }

    fn fetch_document(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, RepositoryError> {
        self.inner.fetch_document(id)
    }

    fn documents_for(&self, project_id: &ProjectId) -> Result<Vec<DocumentRecord>, RepositoryError> {
        self.inner.documents_for(project_id)
    }
}

pub(super) struct UnavailableRepository;

impl ProjectRepository for UnavailableRepository {
    fn insert_project(&self, _project: Project) -> Result<Project, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_project(&self, _id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_document(&self, _record: DocumentRecord) -> Result<DocumentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_document(&self, _record: DocumentRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_document(&self, _id: &DocumentId) -> Result<Option<DocumentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn documents_for(&self, _project_id: &ProjectId) -> Result<Vec<DocumentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: ValidationService<MemoryRepository>) -> axum::Router {
    project_router(Arc::new(service))
}
