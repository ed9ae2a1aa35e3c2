//! End-to-end scenarios over the built-in catalog, driven through the public service facade
//! and HTTP router.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use fitscan::assessments::{
        AssessmentCatalog, AssessmentService, QuizSession, RepositoryError, SessionId,
        SessionRepository,
    };

    #[derive(Default)]
    pub(super) struct MemoryRepository {
        sessions: Mutex<HashMap<SessionId, QuizSession>>,
    }

    impl MemoryRepository {
        pub(super) fn len(&self) -> usize {
            self.sessions.lock().expect("repository mutex poisoned").len()
        }
    }

    impl SessionRepository for MemoryRepository {
        fn insert(&self, id: SessionId, session: QuizSession) -> Result<(), RepositoryError> {
            let mut guard = self.sessions.lock().expect("repository mutex poisoned");
            if guard.contains_key(&id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(id, session);
            Ok(())
        }

        fn fetch(&self, id: &SessionId) -> Result<Option<QuizSession>, RepositoryError> {
            let guard = self.sessions.lock().expect("repository mutex poisoned");
            Ok(guard.get(id).cloned())
        }

        fn modify<T, F>(&self, id: &SessionId, apply: F) -> Result<T, RepositoryError>
        where
            F: FnOnce(&mut QuizSession) -> T,
        {
            let mut guard = self.sessions.lock().expect("repository mutex poisoned");
            let session = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
            Ok(apply(session))
        }

        fn remove(&self, id: &SessionId) -> Result<Option<QuizSession>, RepositoryError> {
            let mut guard = self.sessions.lock().expect("repository mutex poisoned");
            Ok(guard.remove(id))
        }
    }

    pub(super) fn build_service() -> (AssessmentService<MemoryRepository>, Arc<MemoryRepository>) {
        let catalog = Arc::new(AssessmentCatalog::builtin().expect("builtin catalog loads"));
        let repository = Arc::new(MemoryRepository::default());
        (AssessmentService::new(catalog, repository.clone()), repository)
    }
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::build_service;
use fitscan::assessments::report::render_text;
use fitscan::assessments::{
    assessment_router, AnswerSet, AssessmentId, OptionId, RiskTier, SessionAction, SessionStatus,
};

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[test]
fn diabetes_risk_uses_lower_thresholds_and_specific_advice() {
    let (service, _) = build_service();
    let diabetes = AssessmentId::from("diabetes-checker");
    let answers: AnswerSet = [
        ("age", "c"),
        ("weight", "c"),
        ("family_history", "c"),
        ("thirst_urination", "b"),
        ("exercise", "a"),
    ]
    .into_iter()
    .collect();

    let outcome = service.score(&diabetes, &answers).expect("scores");

    assert_eq!(outcome.total_score, 7);
    assert_eq!(outcome.max_score, 30);
    assert_eq!(outcome.percentage, 23);
    assert_eq!(outcome.risk_tier, RiskTier::Moderate);
    assert_eq!(outcome.recommendation.title, "Moderate Diabetes Risk");
    assert_eq!(outcome.recommendation.suggestions.len(), 4);

    let view = service.result_view(&diabetes, &answers).expect("view");
    let text = render_text(&view, None);
    assert!(text.starts_with("Diabetes Risk Assessment Results"));
    assert!(text.contains("Score: 7 / 30 (23% of maximum score)"));
    assert!(text.contains("Not answered"));
}

fn diabetes_answers_totalling(total: u32) -> AnswerSet {
    let ids = [
        "age",
        "weight",
        "family_history",
        "thirst_urination",
        "exercise",
        "diet",
        "fatigue",
        "vision_changes",
        "wounds_healing",
        "blood_pressure",
    ];
    let mut remaining = total;
    ids.into_iter()
        .map(|id| {
            let weight = remaining.min(3);
            remaining -= weight;
            let letter = ["a", "b", "c", "d"][weight as usize];
            (id, letter)
        })
        .collect()
}

#[test]
fn diabetes_tiers_break_above_twenty_and_seventy_percent() {
    let (service, _) = build_service();
    let diabetes = AssessmentId::from("diabetes-checker");

    for (total, percentage, tier) in [
        (6, 20, RiskTier::Low),
        (7, 23, RiskTier::Moderate),
        (21, 70, RiskTier::Moderate),
        (22, 73, RiskTier::High),
    ] {
        let outcome = service
            .score(&diabetes, &diabetes_answers_totalling(total))
            .expect("scores");
        assert_eq!(outcome.total_score, total);
        assert_eq!(outcome.percentage, percentage);
        assert_eq!(outcome.risk_tier, tier, "{total}/30");
    }
}

#[test]
fn service_sessions_walk_the_heart_attack_checker() {
    let (service, repository) = build_service();
    let assessment = AssessmentId::from("heart-attack-checker");
    let session_id = service.start(&assessment).expect("starts").session_id;

    let mut last = None;
    for _ in 0..8 {
        service
            .act(
                &session_id,
                SessionAction::Select {
                    option_id: OptionId::from("a"),
                },
            )
            .expect("select applies");
        last = Some(service.act(&session_id, SessionAction::Advance).expect("advance applies"));
    }

    let finished = last.expect("advanced at least once");
    assert_eq!(finished.status, SessionStatus::Completed);
    let outcome = finished.outcome.expect("scored");
    assert_eq!(outcome.percentage, 0);
    assert_eq!(outcome.risk_tier, RiskTier::Low);
    assert_eq!(repository.len(), 0);
}

#[tokio::test]
async fn anxiety_checker_reaches_high_risk_over_http() {
    let (service, repository) = build_service();
    let router = assessment_router(Arc::new(service));

    let response = router
        .clone()
        .oneshot(
            Request::get("/api/v1/assessments?q=anxiety")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");
    let listing = json_body(response).await;
    assert_eq!(listing["assessments"].as_array().map(Vec::len), Some(1));
    assert_eq!(listing["assessments"][0]["id"], "anxiety-checker");

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/assessments/anxiety-checker/sessions",
            json!({}),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let started = json_body(response).await;
    let total = started["total_questions"].as_u64().expect("question count");
    let actions_uri = format!(
        "/api/v1/sessions/{}/actions",
        started["session_id"].as_str().expect("session id")
    );

    let mut view = Value::Null;
    for _ in 0..total {
        for key in ["4", "Enter"] {
            let response = router
                .clone()
                .oneshot(post_json(&actions_uri, json!({ "action": "key", "key": key })))
                .await
                .expect("route executes");
            assert_eq!(response.status(), StatusCode::OK);
            view = json_body(response).await;
        }
    }

    assert_eq!(view["status"], "completed");
    assert_eq!(view["outcome"]["percentage"], 100);
    assert_eq!(view["outcome"]["risk_tier"], "high");
    assert_eq!(repository.len(), 0);
}

#[tokio::test]
async fn digestive_category_lists_three_assessments() {
    let (service, _) = build_service();
    let router = assessment_router(Arc::new(service));

    let response = router
        .oneshot(
            Request::get("/api/v1/assessments?category=Digestive")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    let payload = json_body(response).await;
    let ids: Vec<&str> = payload["assessments"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|summary| summary["id"].as_str())
        .collect();
    assert_eq!(
        ids,
        vec!["ibs-checker", "food-poisoning-checker", "gastroenteritis-checker"]
    );
}
