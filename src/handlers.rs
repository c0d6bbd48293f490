use crate::errors::AppError;
use crate::export::{build_csv, export_filename};
use crate::models::{
    AddStudentRequest, ClearRosterRequest, DEFAULT_GROUP, DeleteStudentRequest, LoginRequest,
    LoginResponse, RosterKey, RosterQuery, RosterResponse, Status, StatusUpdateRequest,
    StudentRecord, is_valid_group,
};
use crate::roster;
use crate::session;
use crate::state::AppState;
use crate::stats::tally;
use crate::storage::{persist_data, roster_key};
use crate::ui;
use axum::{
    Form, Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{Local, NaiveDate, Utc};
use std::sync::atomic::Ordering;

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<RosterQuery>,
) -> Result<Html<String>, AppError> {
    if !state.authenticated.load(Ordering::SeqCst) {
        return Ok(Html(ui::render_login(None)));
    }

    let key = resolve_key(query.date, query.group)?;
    let data = state.data.lock().await;
    let current = data
        .rosters
        .get(&roster_key(&key.date, &key.group))
        .cloned()
        .unwrap_or_default();
    let counts = tally(&current);
    Ok(Html(ui::render_index(&key.date, &key.group, &current, &counts)))
}

pub async fn login(State(state): State<AppState>, Form(payload): Form<LoginRequest>) -> Response {
    if session::verify(&payload.password, &state.passphrase) {
        state.authenticated.store(true, Ordering::SeqCst);
        Redirect::to("/").into_response()
    } else {
        Html(ui::render_login(Some("Wrong password"))).into_response()
    }
}

pub async fn api_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if !session::verify(&payload.password, &state.passphrase) {
        return Err(AppError::unauthorized("wrong password"));
    }

    state.authenticated.store(true, Ordering::SeqCst);
    Ok(Json(LoginResponse {
        authenticated: true,
    }))
}

pub async fn add_student(
    State(state): State<AppState>,
    Form(payload): Form<AddStudentRequest>,
) -> Result<Redirect, AppError> {
    require_login(&state)?;
    let key = resolve_key(payload.date, payload.group)?;
    apply_add(&state, &key, &payload.name).await?;
    Ok(redirect_to(&key))
}

pub async fn api_add_student(
    State(state): State<AppState>,
    Json(payload): Json<AddStudentRequest>,
) -> Result<Json<RosterResponse>, AppError> {
    require_login(&state)?;
    let key = resolve_key(payload.date, payload.group)?;
    Ok(Json(apply_add(&state, &key, &payload.name).await?))
}

pub async fn set_status(
    State(state): State<AppState>,
    Form(payload): Form<StatusUpdateRequest>,
) -> Result<Redirect, AppError> {
    require_login(&state)?;
    let key = resolve_key(payload.date, payload.group)?;
    let status = parse_status(&payload.status)?;
    apply_set_status(&state, &key, payload.id, status).await?;
    Ok(redirect_to(&key))
}

pub async fn api_set_status(
    State(state): State<AppState>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<RosterResponse>, AppError> {
    require_login(&state)?;
    let key = resolve_key(payload.date, payload.group)?;
    let status = parse_status(&payload.status)?;
    Ok(Json(apply_set_status(&state, &key, payload.id, status).await?))
}

pub async fn delete_student(
    State(state): State<AppState>,
    Form(payload): Form<DeleteStudentRequest>,
) -> Result<Redirect, AppError> {
    require_login(&state)?;
    let key = resolve_key(payload.date, payload.group)?;
    apply_delete(&state, &key, payload.id).await?;
    Ok(redirect_to(&key))
}

pub async fn api_delete_student(
    State(state): State<AppState>,
    Json(payload): Json<DeleteStudentRequest>,
) -> Result<Json<RosterResponse>, AppError> {
    require_login(&state)?;
    let key = resolve_key(payload.date, payload.group)?;
    Ok(Json(apply_delete(&state, &key, payload.id).await?))
}

pub async fn clear_roster(
    State(state): State<AppState>,
    Form(payload): Form<ClearRosterRequest>,
) -> Result<Redirect, AppError> {
    require_login(&state)?;
    let key = resolve_key(payload.date, payload.group)?;
    apply_clear(&state, &key, payload.confirm).await?;
    Ok(redirect_to(&key))
}

pub async fn api_clear_roster(
    State(state): State<AppState>,
    Json(payload): Json<ClearRosterRequest>,
) -> Result<Json<RosterResponse>, AppError> {
    require_login(&state)?;
    let key = resolve_key(payload.date, payload.group)?;
    Ok(Json(apply_clear(&state, &key, payload.confirm).await?))
}

pub async fn api_roster(
    State(state): State<AppState>,
    Query(query): Query<RosterQuery>,
) -> Result<Json<RosterResponse>, AppError> {
    require_login(&state)?;
    let key = resolve_key(query.date, query.group)?;
    let data = state.data.lock().await;
    let current = data
        .rosters
        .get(&roster_key(&key.date, &key.group))
        .cloned()
        .unwrap_or_default();
    Ok(Json(to_roster_response(&key, current)))
}

pub async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<RosterQuery>,
) -> Result<Response, AppError> {
    require_login(&state)?;
    let key = resolve_key(query.date, query.group)?;
    let data = state.data.lock().await;
    let current = data
        .rosters
        .get(&roster_key(&key.date, &key.group))
        .cloned()
        .unwrap_or_default();
    drop(data);

    if current.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let filename = export_filename(&key.date, &key.group);
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, build_csv(&current)).into_response())
}

async fn apply_add(
    state: &AppState,
    key: &RosterKey,
    name: &str,
) -> Result<RosterResponse, AppError> {
    let mut data = state.data.lock().await;
    let (snapshot, changed) = {
        let current = data
            .rosters
            .entry(roster_key(&key.date, &key.group))
            .or_default();
        let changed = roster::add_student(current, name, Utc::now().timestamp_millis());
        (current.clone(), changed)
    };
    if changed {
        persist_data(&state.data_path, &data).await?;
    }
    Ok(to_roster_response(key, snapshot))
}

async fn apply_set_status(
    state: &AppState,
    key: &RosterKey,
    id: i64,
    status: Status,
) -> Result<RosterResponse, AppError> {
    let mut data = state.data.lock().await;
    let (snapshot, changed) = {
        let current = data
            .rosters
            .entry(roster_key(&key.date, &key.group))
            .or_default();
        let changed = roster::update_status(current, id, status);
        (current.clone(), changed)
    };
    if changed {
        persist_data(&state.data_path, &data).await?;
    }
    Ok(to_roster_response(key, snapshot))
}

async fn apply_delete(
    state: &AppState,
    key: &RosterKey,
    id: i64,
) -> Result<RosterResponse, AppError> {
    let mut data = state.data.lock().await;
    let (snapshot, changed) = {
        let current = data
            .rosters
            .entry(roster_key(&key.date, &key.group))
            .or_default();
        let changed = roster::delete_student(current, id);
        (current.clone(), changed)
    };
    if changed {
        persist_data(&state.data_path, &data).await?;
    }
    Ok(to_roster_response(key, snapshot))
}

async fn apply_clear(
    state: &AppState,
    key: &RosterKey,
    confirm: bool,
) -> Result<RosterResponse, AppError> {
    if !confirm {
        return Err(AppError::bad_request("clearing the roster needs confirm=true"));
    }

    let mut data = state.data.lock().await;
    data.rosters.insert(roster_key(&key.date, &key.group), Vec::new());
    persist_data(&state.data_path, &data).await?;
    Ok(to_roster_response(key, Vec::new()))
}

fn require_login(state: &AppState) -> Result<(), AppError> {
    if state.authenticated.load(Ordering::SeqCst) {
        Ok(())
    } else {
        Err(AppError::unauthorized("login required"))
    }
}

fn resolve_key(date: Option<String>, group: Option<String>) -> Result<RosterKey, AppError> {
    let date = match date.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()) {
        Some(d) => NaiveDate::parse_from_str(&d, "%Y-%m-%d")
            .map_err(|_| AppError::bad_request("date must be YYYY-MM-DD"))?
            .to_string(),
        None => today_string(),
    };

    let group = group
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| DEFAULT_GROUP.to_string());
    if !is_valid_group(&group) {
        return Err(AppError::bad_request("unknown group"));
    }

    Ok(RosterKey { date, group })
}

fn parse_status(value: &str) -> Result<Status, AppError> {
    Status::parse(value).ok_or_else(|| AppError::bad_request("status must be Present, Absent or Late"))
}

fn to_roster_response(key: &RosterKey, students: Vec<StudentRecord>) -> RosterResponse {
    RosterResponse {
        summary: tally(&students),
        date: key.date.clone(),
        group: key.group.clone(),
        students,
    }
}

fn redirect_to(key: &RosterKey) -> Redirect {
    Redirect::to(&format!("/?date={}&group={}", key.date, key.group))
}

fn today_string() -> String {
    Local::now().date_naive().to_string()
}
