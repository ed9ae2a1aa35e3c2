use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use super::catalog::AssessmentCatalog;
use super::domain::{AnswerSet, Assessment, AssessmentId};
use super::input::SessionAction;
use super::report::{
    render_printable, PatientDetails, PatientDetailsError, PrintableReport, ReportError,
    ResultView,
};
use super::repository::{RepositoryError, SessionId, SessionRepository, SessionView};
use super::scoring::{AssessmentOutcome, ScoringEngine};
use super::session::QuizSession;

/// Service composing the catalog, session storage, and scoring engine.
pub struct AssessmentService<R> {
    catalog: Arc<AssessmentCatalog>,
    repository: Arc<R>,
    engine: ScoringEngine,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("session-{id:06}"))
}

impl<R> AssessmentService<R>
where
    R: SessionRepository + 'static,
{
    pub fn new(catalog: Arc<AssessmentCatalog>, repository: Arc<R>) -> Self {
        Self::with_engine(catalog, repository, ScoringEngine::default())
    }

    pub fn with_engine(
        catalog: Arc<AssessmentCatalog>,
        repository: Arc<R>,
        engine: ScoringEngine,
    ) -> Self {
        Self {
            catalog,
            repository,
            engine,
        }
    }

    pub fn catalog(&self) -> &AssessmentCatalog {
        &self.catalog
    }

    pub fn assessment(
        &self,
        assessment_id: &AssessmentId,
    ) -> Result<Arc<Assessment>, AssessmentServiceError> {
        self.catalog
            .get(assessment_id)
            .ok_or_else(|| AssessmentServiceError::UnknownAssessment(assessment_id.clone()))
    }

    /// Begin a new attempt positioned on the first question.
    pub fn start(
        &self,
        assessment_id: &AssessmentId,
    ) -> Result<SessionView, AssessmentServiceError> {
        let assessment = self.assessment(assessment_id)?;
        let session = QuizSession::with_engine(assessment, self.engine);
        let session_id = next_session_id();
        let view = SessionView::new(&session_id, &session, None);

        self.repository.insert(session_id.clone(), session)?;
        info!(session_id = %session_id.0, assessment_id = %assessment_id, "quiz session started");
        Ok(view)
    }

    pub fn view(&self, session_id: &SessionId) -> Result<SessionView, AssessmentServiceError> {
        let session = self
            .repository
            .fetch(session_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(SessionView::new(session_id, &session, None))
    }

    /// Apply one action. Sessions reaching a terminal state are dropped from storage and
    /// the returned view is the last one available for them.
    pub fn act(
        &self,
        session_id: &SessionId,
        action: SessionAction,
    ) -> Result<SessionView, AssessmentServiceError> {
        let (view, terminal) = self.repository.modify(session_id, |session| {
            let transition = session.apply(action);
            (
                SessionView::new(session_id, session, Some(transition)),
                session.is_terminal(),
            )
        })?;

        if terminal {
            self.repository.remove(session_id)?;
            info!(session_id = %session_id.0, status = view.status_label, "quiz session closed");
        }

        Ok(view)
    }

    /// Score a complete or partial answer set without a session.
    pub fn score(
        &self,
        assessment_id: &AssessmentId,
        answers: &AnswerSet,
    ) -> Result<AssessmentOutcome, AssessmentServiceError> {
        let assessment = self.assessment(assessment_id)?;
        Ok(self.engine.outcome(&assessment, answers))
    }

    pub fn result_view(
        &self,
        assessment_id: &AssessmentId,
        answers: &AnswerSet,
    ) -> Result<ResultView, AssessmentServiceError> {
        let assessment = self.assessment(assessment_id)?;
        let outcome = self.engine.outcome(&assessment, answers);
        Ok(ResultView::build(&assessment, answers, &outcome))
    }

    /// Printable report; patient details, when given, must be complete.
    pub fn report(
        &self,
        assessment_id: &AssessmentId,
        answers: &AnswerSet,
        patient: Option<&PatientDetails>,
        generated_on: Option<NaiveDate>,
    ) -> Result<PrintableReport, AssessmentServiceError> {
        if let Some(patient) = patient {
            patient.validate()?;
        }
        let view = self.result_view(assessment_id, answers)?;
        let generated_on = generated_on.unwrap_or_else(|| Utc::now().date_naive());
        Ok(render_printable(&view, patient, generated_on)?)
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error("assessment '{0}' not found")]
    UnknownAssessment(AssessmentId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Patient(#[from] PatientDetailsError),
    #[error(transparent)]
    Report(#[from] ReportError),
}
