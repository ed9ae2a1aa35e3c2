//! Health assessment catalog, scoring, and quiz sessions.
//!
//! Assessments are static data loaded once at startup. Each attempt runs as a
//! [`QuizSession`] held by a [`SessionRepository`] until it completes or is cancelled,
//! and the final answers are scored by the [`ScoringEngine`].

pub mod catalog;
pub mod domain;
pub mod input;
mod recommendations;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use catalog::{AssessmentCatalog, CatalogError};
pub use domain::{
    AnswerOption, AnswerSet, Assessment, AssessmentId, AssessmentSummary, Difficulty, OptionId,
    Question, QuestionId, Recommendation, RecommendationSet, RiskTier,
};
pub use input::SessionAction;
pub use report::{PatientDetails, PatientDetailsError, PrintableReport, ReportError, ResultView};
pub use repository::{QuestionView, RepositoryError, SessionId, SessionRepository, SessionView};
pub use router::assessment_router;
pub use scoring::{
    classify, AssessmentOutcome, ResponseBreakdown, RiskThresholdPolicy, RiskThresholds,
    ScoreResult, ScoringEngine,
};
pub use service::{AssessmentService, AssessmentServiceError};
pub use session::{IgnoredReason, QuizSession, SessionState, SessionStatus, Transition};
