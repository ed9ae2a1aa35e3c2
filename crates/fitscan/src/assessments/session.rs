use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::domain::{AnswerSet, Assessment, OptionId, Question};
use super::input::SessionAction;
use super::scoring::{AssessmentOutcome, ScoringEngine};

/// Lifecycle of one quiz attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    InProgress {
        current_index: usize,
        answers: AnswerSet,
    },
    Completed {
        answers: AnswerSet,
        outcome: AssessmentOutcome,
    },
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Result of feeding an action to a session. Rejected actions leave it untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "reason", rename_all = "snake_case")]
pub enum Transition {
    Applied,
    Ignored(IgnoredReason),
}

impl Transition {
    pub fn is_applied(self) -> bool {
        matches!(self, Transition::Applied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredReason {
    SessionClosed,
    NoCurrentQuestion,
    UnknownOption,
    AnswerRequired,
    AtFirstQuestion,
}

impl IgnoredReason {
    pub const fn describe(self) -> &'static str {
        match self {
            Self::SessionClosed => "session already finished",
            Self::NoCurrentQuestion => "no question at the current position",
            Self::UnknownOption => "option does not belong to the current question",
            Self::AnswerRequired => "select an option before continuing",
            Self::AtFirstQuestion => "already at the first question",
        }
    }
}

/// Drives a single attempt through an assessment, one question at a time.
///
/// Precondition violations are reported as [`Transition::Ignored`] and never change state.
/// Completing the last question scores the answers immediately.
#[derive(Debug, Clone)]
pub struct QuizSession {
    assessment: Arc<Assessment>,
    engine: ScoringEngine,
    started_at: DateTime<Utc>,
    state: SessionState,
}

impl QuizSession {
    pub fn new(assessment: Arc<Assessment>) -> Self {
        Self::with_engine(assessment, ScoringEngine::default())
    }

    pub fn with_engine(assessment: Arc<Assessment>, engine: ScoringEngine) -> Self {
        Self {
            assessment,
            engine,
            started_at: Utc::now(),
            state: SessionState::InProgress {
                current_index: 0,
                answers: AnswerSet::new(),
            },
        }
    }

    pub fn assessment(&self) -> &Assessment {
        &self.assessment
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        match self.state {
            SessionState::InProgress { .. } => SessionStatus::InProgress,
            SessionState::Completed { .. } => SessionStatus::Completed,
            SessionState::Cancelled => SessionStatus::Cancelled,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, SessionState::InProgress { .. })
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            SessionState::InProgress { current_index, .. } => Some(current_index),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index()
            .and_then(|index| self.assessment.question(index))
    }

    /// Option shown as selected on the current question, restored from earlier answers.
    pub fn selected_option(&self) -> Option<&OptionId> {
        match &self.state {
            SessionState::InProgress {
                current_index,
                answers,
            } => self
                .assessment
                .question(*current_index)
                .and_then(|question| answers.get(&question.id)),
            _ => None,
        }
    }

    /// Recorded answers; empty once cancelled.
    pub fn answers(&self) -> Option<&AnswerSet> {
        match &self.state {
            SessionState::InProgress { answers, .. } | SessionState::Completed { answers, .. } => {
                Some(answers)
            }
            SessionState::Cancelled => None,
        }
    }

    pub fn outcome(&self) -> Option<&AssessmentOutcome> {
        match &self.state {
            SessionState::Completed { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// `round(100 * (current_index + 1) / total)` while in progress.
    pub fn progress_percent(&self) -> u8 {
        match self.state {
            SessionState::InProgress { current_index, .. } => {
                let total = self.assessment.question_count();
                if total == 0 {
                    return 0;
                }
                let ratio = (current_index + 1) as f64 / total as f64;
                (ratio * 100.0).round().clamp(0.0, 100.0) as u8
            }
            SessionState::Completed { .. } => 100,
            SessionState::Cancelled => 0,
        }
    }

    pub fn apply(&mut self, action: SessionAction) -> Transition {
        match action {
            SessionAction::Select { option_id } => self.select_option(&option_id),
            SessionAction::SelectNth { index } => self.select_nth(index),
            SessionAction::Advance => self.advance(),
            SessionAction::Retreat => self.retreat(),
            SessionAction::Cancel => self.cancel(),
        }
    }

    /// Record (or overwrite) the answer for the current question.
    pub fn select_option(&mut self, option_id: &OptionId) -> Transition {
        let SessionState::InProgress {
            current_index,
            answers,
        } = &mut self.state
        else {
            return ignored(&self.assessment, IgnoredReason::SessionClosed);
        };
        let Some(question) = self.assessment.question(*current_index) else {
            return ignored(&self.assessment, IgnoredReason::NoCurrentQuestion);
        };
        if question.option(option_id).is_none() {
            return ignored(&self.assessment, IgnoredReason::UnknownOption);
        }

        answers.record(question.id.clone(), option_id.clone());
        Transition::Applied
    }

    /// Select the `position`-th option (one-based) of the current question.
    pub fn select_nth(&mut self, position: usize) -> Transition {
        let option_id = self
            .current_question()
            .and_then(|question| position.checked_sub(1).and_then(|i| question.option_at(i)))
            .map(|option| option.id.clone());

        match option_id {
            Some(option_id) => self.select_option(&option_id),
            None if self.is_terminal() => ignored(&self.assessment, IgnoredReason::SessionClosed),
            None if self.current_question().is_none() => {
                ignored(&self.assessment, IgnoredReason::NoCurrentQuestion)
            }
            None => ignored(&self.assessment, IgnoredReason::UnknownOption),
        }
    }

    /// Move forward; on the last question this completes and scores the session.
    pub fn advance(&mut self) -> Transition {
        let SessionState::InProgress {
            current_index,
            answers,
        } = &mut self.state
        else {
            return ignored(&self.assessment, IgnoredReason::SessionClosed);
        };
        let Some(question) = self.assessment.question(*current_index) else {
            return ignored(&self.assessment, IgnoredReason::NoCurrentQuestion);
        };
        if !answers.contains(&question.id) {
            return ignored(&self.assessment, IgnoredReason::AnswerRequired);
        }

        if *current_index + 1 < self.assessment.question_count() {
            *current_index += 1;
            return Transition::Applied;
        }

        let answers = std::mem::take(answers);
        let outcome = self.engine.outcome(&self.assessment, &answers);
        info!(
            assessment_id = %self.assessment.id,
            total_score = outcome.total_score,
            max_score = outcome.max_score,
            percentage = outcome.percentage,
            risk_tier = outcome.risk_tier.label(),
            "quiz session completed"
        );
        self.state = SessionState::Completed { answers, outcome };
        Transition::Applied
    }

    /// Step back one question; the earlier answer stays recorded and selected.
    pub fn retreat(&mut self) -> Transition {
        let SessionState::InProgress { current_index, .. } = &mut self.state else {
            return ignored(&self.assessment, IgnoredReason::SessionClosed);
        };
        if *current_index == 0 {
            return ignored(&self.assessment, IgnoredReason::AtFirstQuestion);
        }

        *current_index -= 1;
        Transition::Applied
    }

    /// Abandon the attempt, discarding every recorded answer.
    pub fn cancel(&mut self) -> Transition {
        if self.is_terminal() {
            return ignored(&self.assessment, IgnoredReason::SessionClosed);
        }

        info!(assessment_id = %self.assessment.id, "quiz session cancelled");
        self.state = SessionState::Cancelled;
        Transition::Applied
    }
}

fn ignored(assessment: &Assessment, reason: IgnoredReason) -> Transition {
    debug!(
        assessment_id = %assessment.id,
        reason = reason.describe(),
        "session transition ignored"
    );
    Transition::Ignored(reason)
}
