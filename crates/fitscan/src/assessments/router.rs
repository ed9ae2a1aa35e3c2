use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{AnswerSet, AssessmentId, OptionId};
use super::input::SessionAction;
use super::report::PatientDetails;
use super::repository::{RepositoryError, SessionId, SessionRepository};
use super::service::{AssessmentService, AssessmentServiceError};
use crate::assistant::HealthAssistant;

/// Router builder exposing the catalog, scoring, report, and session endpoints.
pub fn assessment_router<R>(service: Arc<AssessmentService<R>>) -> Router
where
    R: SessionRepository + 'static,
{
    Router::new()
        .route("/api/v1/categories", get(categories_handler::<R>))
        .route("/api/v1/assessments", get(catalog_handler::<R>))
        .route(
            "/api/v1/assessments/:assessment_id",
            get(assessment_handler::<R>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/score",
            post(score_handler::<R>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/report",
            post(report_handler::<R>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/sessions",
            post(start_session_handler::<R>),
        )
        .route("/api/v1/sessions/:session_id", get(session_handler::<R>))
        .route(
            "/api/v1/sessions/:session_id/actions",
            post(session_action_handler::<R>),
        )
        .route("/api/v1/assistant", post(assistant_handler))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub answers: AnswerSet,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub answers: AnswerSet,
    #[serde(default)]
    pub patient: Option<PatientDetails>,
    #[serde(default)]
    pub generated_on: Option<NaiveDate>,
}

/// Wire form of a session action; `key` goes through the keyboard mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRequest {
    Select { option_id: OptionId },
    SelectNth { index: usize },
    Key { key: String },
    Advance,
    Retreat,
    Cancel,
}

impl ActionRequest {
    pub fn into_action(self) -> Option<SessionAction> {
        match self {
            ActionRequest::Select { option_id } => Some(SessionAction::Select { option_id }),
            ActionRequest::SelectNth { index } => Some(SessionAction::SelectNth { index }),
            ActionRequest::Key { key } => SessionAction::from_key(&key),
            ActionRequest::Advance => Some(SessionAction::Advance),
            ActionRequest::Retreat => Some(SessionAction::Retreat),
            ActionRequest::Cancel => Some(SessionAction::Cancel),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    pub message: String,
}

pub(crate) async fn categories_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
) -> Response
where
    R: SessionRepository + 'static,
{
    let categories = service.catalog().categories().to_vec();
    (StatusCode::OK, Json(json!({ "categories": categories }))).into_response()
}

pub(crate) async fn catalog_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Query(query): Query<CatalogQuery>,
) -> Response
where
    R: SessionRepository + 'static,
{
    let assessments = service
        .catalog()
        .filter(query.category.as_deref(), query.q.as_deref());
    (StatusCode::OK, Json(json!({ "assessments": assessments }))).into_response()
}

pub(crate) async fn assessment_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.assessment(&AssessmentId(assessment_id)) {
        Ok(assessment) => (StatusCode::OK, Json(assessment.as_ref().clone())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn score_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(assessment_id): Path<String>,
    Json(request): Json<ScoreRequest>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.score(&AssessmentId(assessment_id), &request.answers) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn report_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(assessment_id): Path<String>,
    Json(request): Json<ReportRequest>,
) -> Response
where
    R: SessionRepository + 'static,
{
    let ReportRequest {
        answers,
        patient,
        generated_on,
    } = request;

    match service.report(
        &AssessmentId(assessment_id),
        &answers,
        patient.as_ref(),
        generated_on,
    ) {
        Ok(report) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, report.content_type.to_string())],
            report.body,
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn start_session_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.start(&AssessmentId(assessment_id)) {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn session_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.view(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn session_action_handler<R>(
    State(service): State<Arc<AssessmentService<R>>>,
    Path(session_id): Path<String>,
    Json(request): Json<ActionRequest>,
) -> Response
where
    R: SessionRepository + 'static,
{
    let session_id = SessionId(session_id);
    let result = match request.into_action() {
        Some(action) => service.act(&session_id, action),
        None => service.view(&session_id),
    };

    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn assistant_handler(Json(request): Json<AssistantRequest>) -> Response {
    match HealthAssistant.reply(&request.message) {
        Some(reply) => (StatusCode::OK, Json(json!({ "reply": reply }))).into_response(),
        None => {
            let payload = json!({ "error": "message must not be empty" });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
    }
}

fn error_response(err: AssessmentServiceError) -> Response {
    let status = match &err {
        AssessmentServiceError::UnknownAssessment(_)
        | AssessmentServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AssessmentServiceError::Repository(RepositoryError::Unavailable(_))
        | AssessmentServiceError::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AssessmentServiceError::Patient(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };

    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
