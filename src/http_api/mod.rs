use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::{
    AssignmentMap, Inventory, InventoryError, InventoryStore, Machinery, PersistenceError,
    Personnel, Resource, ResourceCategory, ResourceReport, Task, UsageAction, UsageEntry,
    UsageFilter, optimizer,
};

pub type SharedStore = Arc<dyn InventoryStore + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    inventory: Arc<RwLock<Inventory>>,
    store: Option<SharedStore>,
}

impl AppState {
    /// In-memory state; changes are not written anywhere.
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inventory: Arc::new(RwLock::new(inventory)),
            store: None,
        }
    }

    /// State that saves the whole inventory to `store` after every change.
    pub fn with_store(inventory: Inventory, store: SharedStore) -> Self {
        Self {
            inventory: Arc::new(RwLock::new(inventory)),
            store: Some(store),
        }
    }

    fn inventory(&self) -> Arc<RwLock<Inventory>> {
        self.inventory.clone()
    }

    fn persist(&self, inventory: &Inventory) -> Result<(), ApiError> {
        if let Some(store) = &self.store {
            store.save_inventory(inventory).map_err(|err| {
                error!(error = %err, "failed to save inventory");
                ApiError::from(err)
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Storage(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }
}

impl From<InventoryError> for ApiError {
    fn from(value: InventoryError) -> Self {
        match value {
            InventoryError::MachineryNotFound(_) | InventoryError::PersonnelNotFound(_) => {
                ApiError::NotFound(value.to_string())
            }
            InventoryError::DuplicateId(_) => ApiError::Conflict(value.to_string()),
            InventoryError::Invalid(_) => ApiError::Invalid(value.to_string()),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        ApiError::Storage(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Storage(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct NewMachinery {
    name: String,
    #[serde(rename = "type")]
    machine_type: String,
    #[serde(default)]
    last_maintenance_date: Option<String>,
    #[serde(default)]
    purchase_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewPersonnel {
    name: String,
    role: String,
    department: String,
    #[serde(default)]
    skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AssignPayload {
    task: String,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResourceQuery {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    available: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    resource_id: Option<String>,
    #[serde(default)]
    action: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OptimizePayload {
    tasks: Vec<Task>,
    /// Mark the chosen machines as in use.
    #[serde(default)]
    apply: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub assignments: AssignmentMap,
    pub unassigned: Vec<String>,
    #[serde(default)]
    pub rejected: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ResolvePayload {
    assignments: AssignmentMap,
    #[serde(default)]
    priorities: HashMap<String, i32>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/resources", get(list_resources))
        .route("/machinery", get(list_machinery).post(create_machinery))
        .route("/machinery/:id", get(get_machinery))
        .route("/machinery/:id/assign", post(assign_machinery))
        .route("/machinery/:id/release", post(release_machinery))
        .route("/machinery/:id/maintenance", post(record_maintenance))
        .route("/personnel", get(list_personnel).post(create_personnel))
        .route("/personnel/:id/assign", post(assign_personnel))
        .route("/personnel/:id/release", post(release_personnel))
        .route("/report", get(report))
        .route("/history", get(history))
        .route("/optimize", post(optimize))
        .route("/resolve", post(resolve))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_resources(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> Result<Json<Vec<Resource>>, ApiError> {
    let category = match query.category.as_deref() {
        Some(raw) => Some(
            raw.parse::<ResourceCategory>()
                .map_err(|err| ApiError::invalid(err.to_string()))?,
        ),
        None => None,
    };
    let inventory = state.inventory();
    let guard = inventory.read();
    let resources = guard
        .resources()
        .iter()
        .filter(|r| query.kind.as_deref().is_none_or(|kind| r.kind() == kind))
        .filter(|r| category.is_none_or(|c| r.category() == c))
        .filter(|r| query.available.is_none_or(|a| r.is_available() == a))
        .cloned()
        .collect();
    Ok(Json(resources))
}

async fn list_machinery(State(state): State<AppState>) -> Json<Vec<Machinery>> {
    let inventory = state.inventory();
    let machinery = inventory.read().machinery().cloned().collect();
    Json(machinery)
}

async fn get_machinery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Machinery>, ApiError> {
    let inventory = state.inventory();
    let found = inventory.read().get_machinery(&id).cloned();
    found
        .map(Json)
        .ok_or_else(|| InventoryError::MachineryNotFound(id).into())
}

async fn create_machinery(
    State(state): State<AppState>,
    Json(payload): Json<NewMachinery>,
) -> Result<(StatusCode, Json<Machinery>), ApiError> {
    let mut machine = Machinery::new(payload.name, payload.machine_type);
    machine.last_maintenance_date = payload.last_maintenance_date;
    machine.purchase_date = payload.purchase_date;
    let inventory = state.inventory();
    let mut guard = inventory.write();
    let created = guard.register_machinery(machine)?;
    state.persist(&guard)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn assign_machinery(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AssignPayload>,
) -> Result<Json<Machinery>, ApiError> {
    let inventory = state.inventory();
    let mut guard = inventory.write();
    if !guard.assign_machinery(&id, &payload.task, payload.location.as_deref())? {
        return Err(ApiError::conflict(format!("machinery {id} is not available")));
    }
    state.persist(&guard)?;
    current_machinery(&guard, &id)
}

async fn release_machinery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Machinery>, ApiError> {
    let inventory = state.inventory();
    let mut guard = inventory.write();
    if !guard.release_machinery(&id)? {
        return Err(ApiError::conflict(format!("machinery {id} is not in use")));
    }
    state.persist(&guard)?;
    current_machinery(&guard, &id)
}

async fn record_maintenance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Machinery>, ApiError> {
    let inventory = state.inventory();
    let mut guard = inventory.write();
    guard.record_maintenance(&id)?;
    state.persist(&guard)?;
    current_machinery(&guard, &id)
}

fn current_machinery(inventory: &Inventory, id: &str) -> Result<Json<Machinery>, ApiError> {
    inventory
        .get_machinery(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| InventoryError::MachineryNotFound(id.to_string()).into())
}

async fn list_personnel(State(state): State<AppState>) -> Json<Vec<Personnel>> {
    let inventory = state.inventory();
    let personnel = inventory.read().personnel().cloned().collect();
    Json(personnel)
}

async fn create_personnel(
    State(state): State<AppState>,
    Json(payload): Json<NewPersonnel>,
) -> Result<(StatusCode, Json<Personnel>), ApiError> {
    let person =
        Personnel::new(payload.name, payload.role, payload.department).with_skills(payload.skills);
    let inventory = state.inventory();
    let mut guard = inventory.write();
    let created = guard.register_personnel(person)?;
    state.persist(&guard)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn assign_personnel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AssignPayload>,
) -> Result<Json<Personnel>, ApiError> {
    let inventory = state.inventory();
    let mut guard = inventory.write();
    if !guard.assign_personnel(&id, &payload.task, payload.location.as_deref())? {
        return Err(ApiError::conflict(format!("personnel {id} is not available")));
    }
    state.persist(&guard)?;
    current_personnel(&guard, &id)
}

async fn release_personnel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Personnel>, ApiError> {
    let inventory = state.inventory();
    let mut guard = inventory.write();
    if !guard.release_personnel(&id)? {
        return Err(ApiError::conflict(format!("personnel {id} is not assigned")));
    }
    state.persist(&guard)?;
    current_personnel(&guard, &id)
}

fn current_personnel(inventory: &Inventory, id: &str) -> Result<Json<Personnel>, ApiError> {
    inventory
        .get_personnel(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| InventoryError::PersonnelNotFound(id.to_string()).into())
}

async fn report(State(state): State<AppState>) -> Json<ResourceReport> {
    let inventory = state.inventory();
    let report = inventory.read().report();
    Json(report)
}

async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<UsageEntry>>, ApiError> {
    let mut filter = UsageFilter {
        resource_id: query.resource_id,
        ..UsageFilter::default()
    };
    if let Some(raw) = query.category.as_deref() {
        filter.resource_category = Some(
            raw.parse::<ResourceCategory>()
                .map_err(|err| ApiError::invalid(err.to_string()))?,
        );
    }
    if let Some(raw) = query.action.as_deref() {
        filter.action = Some(
            raw.parse::<UsageAction>()
                .map_err(|err| ApiError::invalid(err.to_string()))?,
        );
    }
    let inventory = state.inventory();
    let entries = inventory
        .read()
        .usage_history(&filter)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(entries))
}

async fn optimize(
    State(state): State<AppState>,
    Json(payload): Json<OptimizePayload>,
) -> Result<Json<OptimizeResponse>, ApiError> {
    let inventory = state.inventory();
    let mut guard = inventory.write();
    let available = guard.available_machinery();
    let assignments = optimizer::optimize_assignment(&available, &payload.tasks);
    let rejected = if payload.apply {
        let rejected = guard.apply_assignments(&assignments, &payload.tasks);
        state.persist(&guard)?;
        rejected
    } else {
        Vec::new()
    };
    let unassigned = payload
        .tasks
        .iter()
        .filter(|t| !assignments.contains_key(&t.id))
        .map(|t| t.id.clone())
        .collect();
    Ok(Json(OptimizeResponse {
        assignments,
        unassigned,
        rejected,
    }))
}

async fn resolve(Json(payload): Json<ResolvePayload>) -> Json<AssignmentMap> {
    Json(optimizer::resolve_conflicts(
        &payload.assignments,
        &payload.priorities,
    ))
}
