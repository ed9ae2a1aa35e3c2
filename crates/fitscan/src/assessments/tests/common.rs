use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::assessments::catalog::AssessmentCatalog;
use crate::assessments::domain::{
    AnswerOption, AnswerSet, Assessment, AssessmentId, Difficulty, OptionId, Question, QuestionId,
};
use crate::assessments::repository::{RepositoryError, SessionId, SessionRepository};
use crate::assessments::service::AssessmentService;
use crate::assessments::session::QuizSession;

/// Question whose options are lettered `a`, `b`, `c`... in the order of `weights`.
pub(super) fn weighted_question(id: &str, weights: &[u32]) -> Question {
    Question {
        id: QuestionId::from(id),
        prompt: format!("Prompt for {id}?"),
        options: weights
            .iter()
            .enumerate()
            .map(|(index, weight)| AnswerOption {
                id: option_letter(index),
                label: format!("Option weighted {weight}"),
                weight: *weight,
            })
            .collect(),
    }
}

pub(super) fn option_letter(index: usize) -> OptionId {
    let letter = (b'a' + index as u8) as char;
    OptionId(letter.to_string())
}

pub(super) fn assessment(id: &str, questions: Vec<Question>) -> Assessment {
    Assessment {
        id: AssessmentId::from(id),
        title: format!("{id} title"),
        description: "Fixture assessment".to_string(),
        category: "General Health".to_string(),
        difficulty: Difficulty::Easy,
        estimated_duration: "1 min".to_string(),
        icon: String::new(),
        risk_thresholds: None,
        recommendations: None,
        questions,
    }
}

/// Two questions, each weighted {0, 1, 2, 3}.
pub(super) fn two_question_assessment() -> Assessment {
    assessment(
        "two-step",
        vec![
            weighted_question("q1", &[0, 1, 2, 3]),
            weighted_question("q2", &[0, 1, 2, 3]),
        ],
    )
}

/// One question whose options all weigh nothing.
pub(super) fn zero_weight_assessment() -> Assessment {
    assessment("flat", vec![weighted_question("only", &[0, 0, 0])])
}

pub(super) fn answers(pairs: &[(&str, &str)]) -> AnswerSet {
    pairs.iter().copied().collect()
}

pub(super) fn catalog() -> Arc<AssessmentCatalog> {
    Arc::new(
        AssessmentCatalog::from_assessments(
            vec!["General Health".to_string()],
            vec![two_question_assessment(), zero_weight_assessment()],
        )
        .expect("fixture catalog is valid"),
    )
}

pub(super) fn session() -> QuizSession {
    QuizSession::new(Arc::new(two_question_assessment()))
}

pub(super) fn build_service() -> (AssessmentService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = AssessmentService::new(catalog(), repository.clone());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) sessions: Arc<Mutex<HashMap<SessionId, QuizSession>>>,
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

pub(super) struct UnavailableRepository;

impl SessionRepository for UnavailableRepository {
    fn insert(&self, _id: SessionId, _session: QuizSession) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("session store offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<QuizSession>, RepositoryError> {
        Err(RepositoryError::Unavailable("session store offline".to_string()))
    }

    fn modify<T, F>(&self, _id: &SessionId, _apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut QuizSession) -> T,
    {
        Err(RepositoryError::Unavailable("session store offline".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<Option<QuizSession>, RepositoryError> {
        Err(RepositoryError::Unavailable("session store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
