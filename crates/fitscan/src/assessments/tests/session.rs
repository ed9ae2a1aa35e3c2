use std::sync::Arc;

use super::common::*;
use crate::assessments::catalog::AssessmentCatalog;
use crate::assessments::domain::{OptionId, RiskTier};
use crate::assessments::input::SessionAction;
use crate::assessments::session::{
    IgnoredReason, QuizSession, SessionState, SessionStatus, Transition,
};

fn select(session: &mut QuizSession, option: &str) -> Transition {
    session.select_option(&OptionId::from(option))
}

#[test]
fn completing_every_question_scores_the_session() {
    let catalog = AssessmentCatalog::builtin().expect("builtin catalog");

    for assessment in catalog.assessments() {
        let mut session = QuizSession::new(Arc::clone(assessment));
        let total = assessment.question_count();

        for step in 0..total {
            assert_eq!(session.current_index(), Some(step));
            assert_eq!(session.select_nth(1), Transition::Applied);
            assert_eq!(session.advance(), Transition::Applied);
        }

        assert_eq!(session.status(), SessionStatus::Completed, "{}", assessment.id);
        let answers = session.answers().expect("completed sessions keep answers");
        assert_eq!(answers.len(), total);
        assert!(session.outcome().is_some());
        assert_eq!(session.progress_percent(), 100);
    }
}

#[test]
fn completed_session_carries_scenario_outcome() {
    let mut session = session();
    select(&mut session, "d");
    session.advance();
    select(&mut session, "b");
    session.advance();

    let outcome = session.outcome().expect("scored on completion");
    assert_eq!(outcome.total_score, 4);
    assert_eq!(outcome.max_score, 6);
    assert_eq!(outcome.percentage, 67);
    assert_eq!(outcome.risk_tier, RiskTier::Moderate);
}

#[test]
fn cancelling_discards_answers_without_scoring() {
    let mut session = session();
    select(&mut session, "c");

    assert_eq!(session.cancel(), Transition::Applied);
    assert_eq!(session.state(), &SessionState::Cancelled);
    assert!(session.answers().is_none());
    assert!(session.outcome().is_none());
    assert_eq!(session.progress_percent(), 0);
}

#[test]
fn advancing_last_question_without_answer_is_rejected() {
    let mut session = session();
    select(&mut session, "a");
    session.advance();

    assert_eq!(
        session.advance(),
        Transition::Ignored(IgnoredReason::AnswerRequired)
    );
    assert_eq!(session.current_index(), Some(1));
    assert_eq!(session.status(), SessionStatus::InProgress);
}

#[test]
fn retreat_then_advance_preserves_answers() {
    let mut session = session();
    select(&mut session, "c");
    session.advance();
    select(&mut session, "b");
    let before = session.answers().cloned();

    assert_eq!(session.retreat(), Transition::Applied);
    assert_eq!(session.current_index(), Some(0));
    assert_eq!(session.selected_option(), Some(&OptionId::from("c")));

    select(&mut session, "c");
    assert_eq!(session.advance(), Transition::Applied);
    assert_eq!(session.current_index(), Some(1));
    assert_eq!(session.answers().cloned(), before);
    assert_eq!(session.selected_option(), Some(&OptionId::from("b")));
}

#[test]
fn reselecting_overwrites_in_place() {
    let mut session = session();
    select(&mut session, "a");
    select(&mut session, "d");

    assert_eq!(session.current_index(), Some(0));
    assert_eq!(session.answers().map(|answers| answers.len()), Some(1));
    assert_eq!(session.selected_option(), Some(&OptionId::from("d")));
}

#[test]
fn rejected_actions_leave_state_untouched() {
    let mut session = session();
    let snapshot = session.state().clone();

    assert_eq!(
        session.retreat(),
        Transition::Ignored(IgnoredReason::AtFirstQuestion)
    );
    assert_eq!(
        select(&mut session, "z"),
        Transition::Ignored(IgnoredReason::UnknownOption)
    );
    assert_eq!(
        session.select_nth(5),
        Transition::Ignored(IgnoredReason::UnknownOption)
    );
    assert_eq!(
        session.select_nth(0),
        Transition::Ignored(IgnoredReason::UnknownOption)
    );
    assert_eq!(session.state(), &snapshot);
}

#[test]
fn terminal_sessions_ignore_further_actions() {
    let mut session = session();
    session.cancel();

    for action in [
        SessionAction::Advance,
        SessionAction::Retreat,
        SessionAction::Cancel,
        SessionAction::SelectNth { index: 1 },
        SessionAction::Select {
            option_id: OptionId::from("a"),
        },
    ] {
        assert_eq!(
            session.apply(action),
            Transition::Ignored(IgnoredReason::SessionClosed)
        );
    }
    assert_eq!(session.status(), SessionStatus::Cancelled);
}

#[test]
fn progress_tracks_position() {
    let mut session = session();
    assert_eq!(session.progress_percent(), 50);

    select(&mut session, "a");
    session.advance();
    assert_eq!(session.progress_percent(), 100);
}

#[test]
fn keyboard_drives_a_full_attempt() {
    let mut session = session();

    for key in ["4", "Enter", "2", "ArrowLeft", "ArrowRight", "ArrowRight"] {
        let action = SessionAction::from_key(key).expect("mapped key");
        assert!(session.apply(action).is_applied(), "key {key}");
    }

    let outcome = session.outcome().expect("completed");
    assert_eq!(outcome.total_score, 4);
}

#[test]
fn escape_cancels_mid_quiz() {
    let mut session = session();
    session.apply(SessionAction::SelectNth { index: 2 });
    session.apply(SessionAction::Advance);

    let action = SessionAction::from_key("Escape").expect("mapped key");
    assert_eq!(session.apply(action), Transition::Applied);
    assert_eq!(session.status(), SessionStatus::Cancelled);
}
