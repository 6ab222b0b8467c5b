//! JSON HTTP API over the store.
//!
//! `now` is taken from the host clock once per request; nothing in a request body can
//! influence deadlines or completion times.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use cadence_core::{
    EngineError, MAX_TREND_DAYS, Priority, RecurrencePattern, WindowType, parse_tags,
};
use cadence_dashboard::{
    TaskCard, daily_view, home_view, monthly_view, task_card, trend_series, weekly_view,
};
use cadence_store::{NewTask, RecurrenceInput, StatusFilter, Store, StoreError, TaskEdit};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub const USER_HEADER: &str = "x-cadence-user";

/// Resolves the calling user. Session and login handling live outside this service.
pub trait AuthProvider: Send + Sync {
    fn identify(&self, headers: &HeaderMap, store: &Store) -> Result<u64, ApiError>;
}

/// Trusts a username passed in the `X-Cadence-User` header (for use behind an auth proxy).
pub struct HeaderAuth;

impl AuthProvider for HeaderAuth {
    fn identify(&self, headers: &HeaderMap, store: &Store) -> Result<u64, ApiError> {
        let name = headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Unauthorized(format!("missing {USER_HEADER} header")))?;
        store
            .user_by_name(name)
            .map(|u| u.id)
            .map_err(|_| ApiError::Unauthorized(format!("unknown user '{name}'")))
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<Store>>,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            auth: Arc::new(HeaderAuth),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Store(StoreError::Engine(e))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::AccessDenied) => StatusCode::FORBIDDEN,
            ApiError::Store(StoreError::Duplicate(_)) => StatusCode::CONFLICT,
            ApiError::Store(StoreError::Engine(EngineError::Validation(_))) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store(StoreError::Engine(EngineError::InvalidState(_))) => {
                StatusCode::CONFLICT
            }
            ApiError::Store(StoreError::Io { .. } | StoreError::Serde { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Unauthorized(m) => m.clone(),
            ApiError::Store(StoreError::Engine(EngineError::Validation(m)))
            | ApiError::Store(StoreError::Engine(EngineError::InvalidState(m))) => m.clone(),
            ApiError::Store(e @ (StoreError::Io { .. } | StoreError::Serde { .. })) => {
                error!(error = %e, "store failure");
                "internal error".to_string()
            }
            ApiError::Store(e) => e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_client_error() {
            warn!(status = status.as_u16(), error = %message, "request rejected");
        }
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", get(get_task).patch(edit_task))
        .route("/tasks/{id}/complete", post(complete))
        .route("/tasks/{id}/uncomplete", post(uncomplete))
        .route("/tasks/{id}/archive", post(archive))
        .route("/dashboard", get(dashboard_home))
        .route("/dashboard/daily", get(dashboard_daily))
        .route("/dashboard/weekly", get(dashboard_weekly))
        .route("/dashboard/monthly", get(dashboard_monthly))
        .route("/api/trend-data", get(trend_data))
        .with_state(state)
}

pub async fn serve(store: Store, bind: &str) -> anyhow::Result<()> {
    if let Some(path) = store.path() {
        info!(store = %path.display(), "serving store");
    }
    let app = router(AppState::new(store));
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("cadence API listening on {}", bind);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "build": env!("CADENCE_BUILD_SHA") }))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    status: Option<String>,
}

async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<TaskCard>>, ApiError> {
    let now = Utc::now();
    let store = state.store.lock().await;
    let uid = state.auth.identify(&headers, &store)?;
    let filter: StatusFilter = match params.status.as_deref() {
        Some(s) => s.parse()?,
        None => StatusFilter::default(),
    };
    let tz = store.user(uid)?.tz()?;

    let cards = store
        .list_tasks(uid, filter, now)
        .into_iter()
        .map(|t| task_card(t, now, tz))
        .collect();
    Ok(Json(cards))
}

#[derive(Debug, Deserialize)]
struct RecurrenceBody {
    pattern: String,
    #[serde(default)]
    interval: Option<u32>,
}

/// Raw form fields; tokens are parsed here so bad values become 400s with a message.
#[derive(Debug, Deserialize)]
struct CreateTaskBody {
    title: String,
    #[serde(default)]
    description: Option<String>,
    window_type: String,
    #[serde(default)]
    window_value: Option<i64>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    tags: Option<String>,
    #[serde(default)]
    recurrence: Option<RecurrenceBody>,
}

impl CreateTaskBody {
    fn into_new_task(self) -> Result<NewTask, EngineError> {
        let window: WindowType = self.window_type.parse()?;
        let mut new = NewTask::new(self.title, window);
        if window == WindowType::Custom {
            new.window_value = self.window_value;
        }
        if let Some(p) = self.priority {
            new = new.with_priority(p.parse::<Priority>()?);
        }
        if let Some(tags) = self.tags {
            new = new.with_tags(parse_tags(&tags));
        }
        if let Some(d) = self.description {
            new = new.with_description(d);
        }
        if let Some(r) = self.recurrence {
            new.recurrence = Some(RecurrenceInput {
                pattern: r.pattern.parse::<RecurrencePattern>()?,
                interval: r.interval.unwrap_or(1),
            });
        }
        Ok(new)
    }
}

async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateTaskBody>,
) -> Result<(StatusCode, Json<TaskCard>), ApiError> {
    let now = Utc::now();
    let mut store = state.store.lock().await;
    let uid = state.auth.identify(&headers, &store)?;
    let new = body.into_new_task()?;
    let tz = store.user(uid)?.tz()?;
    let task = store.create_task(uid, new, now)?;
    Ok((StatusCode::CREATED, Json(task_card(&task, now, tz))))
}

async fn get_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<TaskCard>, ApiError> {
    let now = Utc::now();
    let store = state.store.lock().await;
    let uid = state.auth.identify(&headers, &store)?;
    let tz = store.user(uid)?.tz()?;
    let task = store.task_for(uid, id)?;
    Ok(Json(task_card(task, now, tz)))
}

#[derive(Debug, Deserialize)]
struct EditBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    tags: Option<String>,
}

async fn edit_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<EditBody>,
) -> Result<Json<TaskCard>, ApiError> {
    let now = Utc::now();
    let mut store = state.store.lock().await;
    let uid = state.auth.identify(&headers, &store)?;
    let edit = TaskEdit {
        title: body.title,
        description: body.description,
        priority: body.priority.map(|p| p.parse::<Priority>()).transpose()?,
        tags: body.tags.map(|t| parse_tags(&t)),
    };
    let tz = store.user(uid)?.tz()?;
    let task = store.update_task(uid, id, edit)?;
    Ok(Json(task_card(&task, now, tz)))
}

async fn complete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let now = Utc::now();
    let mut store = state.store.lock().await;
    let uid = state.auth.identify(&headers, &store)?;
    let out = store.complete_task(uid, id, now)?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Task \"{}\" completed!", out.task.title),
        "completion_quality": out.task.completion_quality,
        "next_task_id": out.next_instance.as_ref().map(|t| t.id),
        "achievements": out.new_achievements.iter().map(|a| a.name).collect::<Vec<_>>(),
    })))
}

async fn uncomplete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let now = Utc::now();
    let mut store = state.store.lock().await;
    let uid = state.auth.identify(&headers, &store)?;
    let task = store.reopen_task(uid, id, now)?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Task \"{}\" marked as active", task.title),
        "status": task.status(now),
    })))
}

async fn archive(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let mut store = state.store.lock().await;
    let uid = state.auth.identify(&headers, &store)?;
    let task = store.archive_task(uid, id)?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Task \"{}\" archived.", task.title),
    })))
}

async fn dashboard_home(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let now = Utc::now();
    let mut store = state.store.lock().await;
    let uid = state.auth.identify(&headers, &store)?;
    store.refresh_streak(uid, now)?;
    let view = home_view(store.user(uid)?, &store.tasks_of(uid), now)?;
    Ok(Json(json!(view)))
}

async fn dashboard_daily(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let now = Utc::now();
    let store = state.store.lock().await;
    let uid = state.auth.identify(&headers, &store)?;
    let view = daily_view(store.user(uid)?, &store.tasks_of(uid), now)?;
    Ok(Json(json!(view)))
}

async fn dashboard_weekly(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let now = Utc::now();
    let store = state.store.lock().await;
    let uid = state.auth.identify(&headers, &store)?;
    let view = weekly_view(store.user(uid)?, &store.tasks_of(uid), now)?;
    Ok(Json(json!(view)))
}

async fn dashboard_monthly(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let now = Utc::now();
    let store = state.store.lock().await;
    let uid = state.auth.identify(&headers, &store)?;
    let view = monthly_view(store.user(uid)?, &store.tasks_of(uid), now)?;
    Ok(Json(json!(view)))
}

#[derive(Debug, Deserialize)]
struct TrendParams {
    days: Option<u32>,
}

async fn trend_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<TrendParams>,
) -> Result<Json<Value>, ApiError> {
    let now = Utc::now();
    let days = params.days.unwrap_or(7).min(MAX_TREND_DAYS);
    let store = state.store.lock().await;
    let uid = state.auth.identify(&headers, &store)?;
    let series = trend_series(store.user(uid)?, &store.tasks_of(uid), days, now)?;
    Ok(Json(json!(series)))
}
