use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AnswerOption, AssessmentId, OptionId, QuestionId};
use super::scoring::AssessmentOutcome;
use super::session::{QuizSession, SessionStatus, Transition};

/// Identifier wrapper for live quiz sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Storage for sessions that are still being driven by a caller.
///
/// `modify` must give the closure exclusive access to the session so that transitions on
/// one session never interleave. Separate sessions share nothing.
pub trait SessionRepository: Send + Sync {
    fn insert(&self, id: SessionId, session: QuizSession) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<QuizSession>, RepositoryError>;
    fn modify<T, F>(&self, id: &SessionId, apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut QuizSession) -> T;
    fn remove(&self, id: &SessionId) -> Result<Option<QuizSession>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Serializable snapshot of a session for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub assessment_id: AssessmentId,
    pub assessment_title: String,
    pub status: SessionStatus,
    pub status_label: &'static str,
    pub started_at: DateTime<Utc>,
    pub total_questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_index: Option<usize>,
    pub progress_percent: u8,
    pub answered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<AssessmentOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition: Option<Transition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

/// Current question with the option the user has selected, if any.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub question_id: QuestionId,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<OptionId>,
    pub is_first: bool,
    pub is_last: bool,
}

impl SessionView {
    pub fn new(id: &SessionId, session: &QuizSession, last: Option<Transition>) -> Self {
        let assessment = session.assessment();
        let total_questions = assessment.question_count();
        let question = session.current_question().map(|question| QuestionView {
            question_id: question.id.clone(),
            prompt: question.prompt.clone(),
            options: question.options.clone(),
            selected_option: session.selected_option().cloned(),
            is_first: session.current_index() == Some(0),
            is_last: session.current_index().map(|index| index + 1) == Some(total_questions),
        });
        let note = match last {
            Some(Transition::Ignored(reason)) => Some(reason.describe()),
            _ => None,
        };

        Self {
            session_id: id.clone(),
            assessment_id: assessment.id.clone(),
            assessment_title: assessment.title.clone(),
            status: session.status(),
            status_label: session.status().label(),
            started_at: session.started_at(),
            total_questions,
            current_index: session.current_index(),
            progress_percent: session.progress_percent(),
            answered: session.answers().map(|answers| answers.len()).unwrap_or(0),
            question,
            outcome: session.outcome().cloned(),
            last_transition: last,
            note,
        }
    }
}
