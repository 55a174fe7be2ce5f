use std::sync::Arc;

use axum::{extract::{Path, Query, State}, routing::{get, post}, Json, Router};
use chrono::{Local, NaiveDate};
use http::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    application::{task_service::TaskService, theme::ThemePreference},
    domain::{
        query::{Controls, PageContext, SortKey, StatusFilter},
        store::KeyValueStore,
        task::{format_due_date, Confirmation, CreateTask, EditTask, Task, TaskId},
    },
    http::types::ApiError,
};

pub struct AppState<S: TaskService, K: KeyValueStore> {
    pub service: S,
    pub theme: Arc<ThemePreference<K>>,
}

impl<S: TaskService, K: KeyValueStore> AppState<S, K> {
    pub fn new(service: S, theme: ThemePreference<K>) -> Self { Self { service, theme: Arc::new(theme) } }
}

impl<S: TaskService + Clone, K: KeyValueStore> Clone for AppState<S, K> {
    fn clone(&self) -> Self { Self { service: self.service.clone(), theme: Arc::clone(&self.theme) } }
}

pub fn router<S: TaskService + Clone, K: KeyValueStore>(state: AppState<S, K>) -> Router {
    Router::new()
        .route("/tasks", post(add_task::<S, K>).get(view_tasks::<S, K>).delete(clear_tasks::<S, K>))
        .route("/tasks/:id", get(get_task::<S, K>).put(edit_task::<S, K>).delete(delete_task::<S, K>))
        .route("/tasks/:id/toggle", post(toggle_task::<S, K>))
        .route("/theme", get(get_theme::<S, K>))
        .route("/theme/toggle", post(toggle_theme::<S, K>))
        .with_state(state)
}

#[derive(Deserialize)]
struct ViewParams {
    page: Option<PageContext>,
    q: Option<String>,
    status: Option<StatusFilter>,
    sort: Option<SortKey>,
}

async fn view_tasks<S: TaskService, K: KeyValueStore>(State(state): State<AppState<S, K>>, Query(params): Query<ViewParams>) -> Result<Json<Value>, ApiError> {
    let page = params.page.unwrap_or_default();
    let controls = Controls {
        search_query: params.q.unwrap_or_default(),
        status_filter: params.status.unwrap_or_default(),
        sort_key: params.sort.unwrap_or_default(),
    };
    let view = state.service.view(page, &controls).await.map_err(ApiError::internal)?;
    let today = today();
    Ok(Json(json!({
        "items": view.tasks.iter().map(|t| task_json(t, today)).collect::<Vec<_>>(),
        "stats": {
            "total": view.stats.total,
            "pending": view.stats.pending,
            "completed": view.stats.completed,
            "label": view.stats.to_string(),
        },
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBody {
    #[serde(default)]
    title: String,
    description: Option<String>,
    due_date: Option<String>,
    priority: Option<String>,
}

async fn add_task<S: TaskService, K: KeyValueStore>(State(state): State<AppState<S, K>>, Json(body): Json<CreateBody>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = CreateTask { title: body.title, description: body.description, due_date: body.due_date, priority: body.priority };
    match state.service.add(input).await.map_err(ApiError::internal)? {
        Some(task) => Ok((StatusCode::CREATED, Json(task_json(&task, today())))),
        None => Err(ApiError::new(StatusCode::BAD_REQUEST, "Please enter a task title.")),
    }
}

async fn get_task<S: TaskService, K: KeyValueStore>(State(state): State<AppState<S, K>>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let task = state.service.get(TaskId(id)).await.map_err(ApiError::internal)?;
    task.map(|t| Json(task_json(&t, today()))).ok_or_else(ApiError::not_found)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditBody {
    title: Option<String>,
    description: Option<String>,
    due_date: Option<String>,
    priority: Option<String>,
}

async fn edit_task<S: TaskService, K: KeyValueStore>(State(state): State<AppState<S, K>>, Path(id): Path<String>, Json(body): Json<EditBody>) -> Result<Json<Value>, ApiError> {
    if body.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "A non-empty title is required to edit a task."));
    }
    let input = EditTask { title: body.title, description: body.description, due_date: body.due_date, priority: body.priority };
    let updated = state.service.edit(TaskId(id), input).await.map_err(ApiError::internal)?;
    updated.map(|t| Json(task_json(&t, today()))).ok_or_else(ApiError::not_found)
}

async fn toggle_task<S: TaskService, K: KeyValueStore>(State(state): State<AppState<S, K>>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let toggled = state.service.toggle_complete(TaskId(id)).await.map_err(ApiError::internal)?;
    toggled.map(|t| Json(task_json(&t, today()))).ok_or_else(ApiError::not_found)
}

#[derive(Deserialize)]
struct ConfirmParams {
    #[serde(default)]
    confirm: bool,
}

fn confirmation_required() -> ApiError { ApiError::new(StatusCode::CONFLICT, "Confirmation required: repeat with ?confirm=true") }

async fn delete_task<S: TaskService, K: KeyValueStore>(State(state): State<AppState<S, K>>, Path(id): Path<String>, Query(params): Query<ConfirmParams>) -> Result<StatusCode, ApiError> {
    if !params.confirm { return Err(confirmation_required()); }
    let deleted = state.service.delete(TaskId(id), Confirmation::Accepted).await.map_err(ApiError::internal)?;
    if deleted { Ok(StatusCode::NO_CONTENT) } else { Err(ApiError::not_found()) }
}

async fn clear_tasks<S: TaskService, K: KeyValueStore>(State(state): State<AppState<S, K>>, Query(params): Query<ConfirmParams>) -> Result<StatusCode, ApiError> {
    if !params.confirm { return Err(confirmation_required()); }
    state.service.clear_all(Confirmation::from(params.confirm)).await.map_err(ApiError::internal)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_theme<S: TaskService, K: KeyValueStore>(State(state): State<AppState<S, K>>) -> Result<Json<Value>, ApiError> {
    let theme = state.theme.load().await.map_err(ApiError::internal)?;
    Ok(Json(json!({ "theme": theme, "label": theme.label() })))
}

async fn toggle_theme<S: TaskService, K: KeyValueStore>(State(state): State<AppState<S, K>>) -> Result<Json<Value>, ApiError> {
    let theme = state.theme.toggle().await.map_err(ApiError::internal)?;
    Ok(Json(json!({ "theme": theme, "label": theme.label() })))
}

fn today() -> NaiveDate { Local::now().date_naive() }

fn task_json(t: &Task, today: NaiveDate) -> Value {
    json!({
        "id": t.id,
        "title": t.title,
        "description": t.description,
        "dueDate": t.due_date,
        "dueLabel": format_due_date(t.due_date.as_deref()),
        "overdue": t.is_overdue(today),
        "priority": t.priority,
        "priorityLabel": t.priority.label(),
        "completed": t.completed,
        "status": t.status_label(),
        "createdAt": t.created_at,
    })
}
