use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::services::ServeDir;
use uuid::Uuid;

use crate::error::SubmitError;
use crate::report::ReportView;
use crate::session::SessionPhase;
use crate::state::AppState;
use crate::submission::{self, AudioUpload, SubmissionForm, MAX_UPLOAD_BYTES};

pub fn create_routes(state: AppState) -> Router<AppState> {
    let web_dir = state.config.system.web_dir.clone();

    Router::new()
        // Health check
        .route("/api/health", get(health_check))
        // Session lifecycle
        .route("/api/session", post(create_session))
        .route("/api/session/:session_id", get(session_state))
        // Submission endpoint
        .route(
            "/api/evaluate",
            post(evaluate).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // The practice form itself
        .fallback_service(ServeDir::new(web_dir))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "webhook": state.config.webhook.url,
    }))
}

async fn create_session(State(state): State<AppState>) -> Json<Value> {
    let session_id = state.create_session();
    Json(json!({ "session_id": session_id }))
}

async fn session_state(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let session = state.sessions.get(&session_id).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Unknown session"})),
        )
    })?;

    let mut body = json!({
        "phase": session.phase().label(),
        "updated_at": session.changed_at().to_rfc3339(),
    });
    match session.phase() {
        SessionPhase::Complete(report) => {
            body["result"] =
                serde_json::to_value(ReportView::from_report(report)).unwrap_or(Value::Null);
        }
        SessionPhase::Failed(message) => {
            body["error"] = json!(message);
        }
        SessionPhase::Idle | SessionPhase::Submitting => {}
    }

    Ok(Json(body))
}

async fn evaluate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let form = read_form(&mut multipart)
        .await
        .map_err(|message| (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))))?;

    // Submissions without a session field still work; they just get a
    // fresh session, which the response hands back.
    let session_id = form
        .session
        .as_deref()
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .unwrap_or_else(|| state.create_session());

    match submission::submit(&state, session_id, form).await {
        Ok(view) => Ok(Json(json!({
            "session_id": session_id,
            "result": view,
        }))),
        Err(err) => {
            let status = match &err {
                SubmitError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                SubmitError::Busy => StatusCode::CONFLICT,
                SubmitError::Webhook(_) => StatusCode::BAD_GATEWAY,
            };
            Err((
                status,
                Json(json!({
                    "session_id": session_id,
                    "error": err.user_message(),
                })),
            ))
        }
    }
}

async fn read_form(multipart: &mut Multipart) -> Result<SubmissionForm, String> {
    let mut form = SubmissionForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Malformed upload: {}", e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Failed to read audio field: {}", e))?;
                form.audio = Some(AudioUpload {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "question" => {
                form.question = Some(read_text(field).await?);
            }
            "level" => {
                form.level = Some(read_text(field).await?);
            }
            "session" => {
                form.session = Some(read_text(field).await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, String> {
    field
        .text()
        .await
        .map_err(|e| format!("Failed to read form field: {}", e))
}
