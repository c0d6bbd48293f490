use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", post(handlers::login))
        .route("/students/add", post(handlers::add_student))
        .route("/students/status", post(handlers::set_status))
        .route("/students/delete", post(handlers::delete_student))
        .route("/roster/clear", post(handlers::clear_roster))
        .route("/export", get(handlers::export_csv))
        .route("/api/login", post(handlers::api_login))
        .route("/api/roster", get(handlers::api_roster))
        .route("/api/students", post(handlers::api_add_student))
        .route("/api/students/status", post(handlers::api_set_status))
        .route("/api/students/delete", post(handlers::api_delete_student))
        .route("/api/roster/clear", post(handlers::api_clear_roster))
        .with_state(state)
}
