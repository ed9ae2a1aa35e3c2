use crate::infra::{load_catalog, parse_date};
use chrono::{Local, NaiveDate};
use clap::Args;
use fitscan::assessments::report::render_text;
use fitscan::assessments::{
    Assessment, AssessmentCatalog, AssessmentId, OptionId, PatientDetails, PatientDetailsError,
    Question, QuizSession, ResultView, SessionAction, SessionStatus, Transition,
};
use fitscan::assistant::HealthAssistant;
use fitscan::config::AppConfig;
use fitscan::error::AppError;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogListArgs {
    /// Only list assessments in this category (case-insensitive)
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Only list assessments whose title or description contains this text
    #[arg(long)]
    pub(crate) search: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct CatalogShowArgs {
    /// Assessment identifier, e.g. `asthma-checker`
    pub(crate) assessment: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct PatientArgs {
    #[arg(long = "patient-name")]
    pub(crate) name: Option<String>,
    #[arg(long = "patient-age")]
    pub(crate) age: Option<String>,
    #[arg(long = "patient-sex")]
    pub(crate) sex: Option<String>,
    #[arg(long = "patient-contact")]
    pub(crate) contact_number: Option<String>,
    #[arg(long = "patient-dob")]
    pub(crate) date_of_birth: Option<String>,
}

impl PatientArgs {
    /// `None` when no patient flag was given; otherwise every field must be filled in.
    pub(crate) fn into_details(self) -> Result<Option<PatientDetails>, PatientDetailsError> {
        if self.name.is_none()
            && self.age.is_none()
            && self.sex.is_none()
            && self.contact_number.is_none()
            && self.date_of_birth.is_none()
        {
            return Ok(None);
        }

        let details = PatientDetails {
            name: self.name.unwrap_or_default(),
            age: self.age.unwrap_or_default(),
            sex: self.sex.unwrap_or_default(),
            contact_number: self.contact_number.unwrap_or_default(),
            date_of_birth: self.date_of_birth.unwrap_or_default(),
        };
        details.validate()?;
        Ok(Some(details))
    }
}

#[derive(Args, Debug)]
pub(crate) struct TakeArgs {
    /// Assessment identifier, e.g. `asthma-checker`
    pub(crate) assessment: String,
    #[command(flatten)]
    pub(crate) patient: PatientArgs,
    /// Date printed on the report (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) report_date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Assessment to run the scripted answers against
    #[arg(long, default_value = "heart-disease-checker")]
    pub(crate) assessment: String,
}

#[derive(Args, Debug)]
pub(crate) struct AskArgs {
    /// Question for the assistant
    #[arg(required = true, num_args = 1..)]
    pub(crate) message: Vec<String>,
}

pub(crate) fn run_catalog_list(
    args: CatalogListArgs,
    config: &AppConfig,
) -> Result<(), AppError> {
    let catalog = configured_catalog(config)?;
    let summaries = catalog.filter(args.category.as_deref(), args.search.as_deref());

    if summaries.is_empty() {
        println!("No assessments match the given filters.");
        return Ok(());
    }

    println!("{} assessment(s)", summaries.len());
    for summary in summaries {
        println!(
            "  {:<26} {:<34} {:<18} {:<8} {:>2} questions, {}",
            summary.id.as_str(),
            summary.title,
            summary.category,
            summary.difficulty_label,
            summary.question_count,
            summary.estimated_duration
        );
    }
    Ok(())
}

pub(crate) fn run_catalog_show(
    args: CatalogShowArgs,
    config: &AppConfig,
) -> Result<(), AppError> {
    let catalog = configured_catalog(config)?;
    let assessment = find_assessment(&catalog, &args.assessment)?;

    println!("{} ({})", assessment.title, assessment.id);
    println!("{}", assessment.description);
    println!(
        "Category: {} | Difficulty: {} | Duration: {}",
        assessment.category,
        assessment.difficulty.label(),
        assessment.estimated_duration
    );
    if let Some(thresholds) = &assessment.risk_thresholds {
        println!(
            "Risk thresholds: moderate from {}%, high from {}%",
            thresholds.moderate_from, thresholds.high_from
        );
    }

    for (index, question) in assessment.questions.iter().enumerate() {
        println!("\n{}. {}", index + 1, question.prompt);
        for (position, option) in question.options.iter().enumerate() {
            println!("   [{}] {} (weight {})", position + 1, option.label, option.weight);
        }
    }
    Ok(())
}

pub(crate) fn run_take(args: TakeArgs, config: &AppConfig) -> Result<(), AppError> {
    let TakeArgs {
        assessment,
        patient,
        report_date,
    } = args;

    let patient = patient.into_details().map_err(invalid_input)?;
    let catalog = configured_catalog(config)?;
    let assessment = find_assessment(&catalog, &assessment)?;
    let report_date = report_date.unwrap_or_else(|| Local::now().date_naive());

    println!("{}", assessment.title);
    println!("Keys: 1-9 select, Enter/n next, p previous, q quit.\n");

    let mut session = QuizSession::new(assessment);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    drive_session(&mut session, stdin.lock(), &mut stdout)?;

    match result_view(&session) {
        Some(view) => {
            println!("\nReport date: {}", report_date.format("%Y-%m-%d"));
            print!("{}", render_text(&view, patient.as_ref()));
        }
        None => println!("\nAssessment cancelled; no answers were kept."),
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs, config: &AppConfig) -> Result<(), AppError> {
    let catalog = configured_catalog(config)?;
    let assessment = find_assessment(&catalog, &args.assessment)?;

    println!("FitScan scripted assessment: {}", assessment.title);
    let session = scripted_session(assessment, |position, question, option| {
        println!(
            "  Q{} {} -> {} (weight {})",
            position + 1,
            question.prompt,
            option,
            question.option(option).map(|o| o.weight).unwrap_or(0)
        );
    });

    if let Some(view) = result_view(&session) {
        println!();
        print!("{}", render_text(&view, None));
    }
    Ok(())
}

pub(crate) fn run_ask(args: AskArgs) -> Result<(), AppError> {
    let assistant = HealthAssistant;
    let message = args.message.join(" ");
    let reply = assistant
        .reply(&message)
        .unwrap_or_else(|| assistant.greeting());
    println!("{reply}");
    Ok(())
}

/// Terminal input to session action. Blank lines count as Enter.
pub(crate) fn parse_command(line: &str) -> Option<SessionAction> {
    let trimmed = line.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" | "n" | "next" => Some(SessionAction::Advance),
        "p" | "prev" | "previous" => Some(SessionAction::Retreat),
        "q" | "quit" => Some(SessionAction::Cancel),
        _ => SessionAction::from_key(trimmed),
    }
}

/// Feed input lines to the session until it finishes. Running out of input cancels it.
pub(crate) fn drive_session<I, W>(
    session: &mut QuizSession,
    input: I,
    output: &mut W,
) -> io::Result<()>
where
    I: BufRead,
    W: Write,
{
    render_question(session, output)?;

    for line in input.lines() {
        let line = line?;
        let Some(action) = parse_command(&line) else {
            writeln!(
                output,
                "Unrecognised input '{}'. Use 1-9, n, p or q.",
                line.trim()
            )?;
            continue;
        };

        match session.apply(action) {
            Transition::Applied if session.is_terminal() => break,
            Transition::Applied => render_question(session, output)?,
            Transition::Ignored(reason) => writeln!(output, "  {}", reason.describe())?,
        }
    }

    if !session.is_terminal() {
        session.cancel();
    }
    Ok(())
}

fn render_question<W: Write>(session: &QuizSession, output: &mut W) -> io::Result<()> {
    let (Some(index), Some(question)) = (session.current_index(), session.current_question())
    else {
        return Ok(());
    };
    let selected = session.selected_option();

    writeln!(
        output,
        "\nQuestion {} of {} ({}%)",
        index + 1,
        session.assessment().question_count(),
        session.progress_percent()
    )?;
    writeln!(output, "{}", question.prompt)?;
    for (position, option) in question.options.iter().enumerate() {
        let marker = if selected == Some(&option.id) { '*' } else { ' ' };
        writeln!(output, " {marker}[{}] {}", position + 1, option.label)?;
    }
    Ok(())
}

/// Completes `assessment` choosing the heaviest option on even-numbered positions and the
/// first option elsewhere.
pub(crate) fn scripted_session<F>(assessment: Arc<Assessment>, mut on_answer: F) -> QuizSession
where
    F: FnMut(usize, &Question, &OptionId),
{
    let mut session = QuizSession::new(assessment);

    while let (Some(position), Some(question)) =
        (session.current_index(), session.current_question())
    {
        let choice = if position % 2 == 0 {
            question.options.iter().max_by_key(|option| option.weight)
        } else {
            question.options.first()
        };
        let Some(option_id) = choice.map(|option| option.id.clone()) else {
            break;
        };
        on_answer(position, question, &option_id);

        session.select_option(&option_id);
        if !session.advance().is_applied() {
            break;
        }
    }

    session
}

fn result_view(session: &QuizSession) -> Option<ResultView> {
    if session.status() != SessionStatus::Completed {
        return None;
    }
    let answers = session.answers()?;
    let outcome = session.outcome()?;
    Some(ResultView::build(session.assessment(), answers, outcome))
}

fn configured_catalog(config: &AppConfig) -> Result<AssessmentCatalog, AppError> {
    Ok(load_catalog(&config.catalog)?)
}

fn find_assessment(catalog: &AssessmentCatalog, id: &str) -> Result<Arc<Assessment>, AppError> {
    catalog
        .get(&AssessmentId::from(id))
        .ok_or_else(|| invalid_input(format!("assessment '{id}' not found")))
}

fn invalid_input(err: impl ToString) -> AppError {
    AppError::InvalidInput(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitscan::assessments::RiskTier;
    use std::io::Cursor;

    fn assessment(id: &str) -> Arc<Assessment> {
        AssessmentCatalog::builtin()
            .expect("builtin catalog")
            .get(&AssessmentId::from(id))
            .expect("assessment present")
    }

    #[test]
    fn terminal_commands_map_to_actions() {
        assert_eq!(parse_command("3"), Some(SessionAction::SelectNth { index: 3 }));
        assert_eq!(parse_command(""), Some(SessionAction::Advance));
        assert_eq!(parse_command(" N "), Some(SessionAction::Advance));
        assert_eq!(parse_command("p"), Some(SessionAction::Retreat));
        assert_eq!(parse_command("quit"), Some(SessionAction::Cancel));
        assert_eq!(parse_command("ArrowLeft"), Some(SessionAction::Retreat));
        assert_eq!(parse_command("maybe"), None);
    }

    #[test]
    fn keyed_input_completes_a_quiz() {
        let assessment = assessment("covid-checker");
        let script = "2\n\n".repeat(assessment.question_count());
        let mut session = QuizSession::new(assessment);
        let mut output = Vec::new();

        drive_session(&mut session, Cursor::new(script), &mut output).expect("drives");

        assert_eq!(session.status(), SessionStatus::Completed);
        let view = result_view(&session).expect("result available");
        assert_eq!(view.total_score, 9);
        let transcript = String::from_utf8(output).expect("utf-8");
        assert!(transcript.contains("Question 1 of 9"));
    }

    #[test]
    fn exhausted_input_cancels_the_session() {
        let mut session = QuizSession::new(assessment("asthma-checker"));
        let mut output = Vec::new();

        drive_session(&mut session, Cursor::new("1\nnext\nhuh\n\n"), &mut output)
            .expect("drives");

        assert_eq!(session.status(), SessionStatus::Cancelled);
        assert!(result_view(&session).is_none());
        let transcript = String::from_utf8(output).expect("utf-8");
        assert!(transcript.contains("Unrecognised input 'huh'"));
        assert!(transcript.contains("select an option before continuing"));
    }

    #[test]
    fn scripted_demo_alternates_heaviest_and_first_options() {
        let mut answered = 0;
        let session = scripted_session(assessment("heart-disease-checker"), |_, _, _| {
            answered += 1
        });

        assert_eq!(answered, 10);
        let outcome = session.outcome().expect("completed");
        assert_eq!(outcome.total_score, 15);
        assert_eq!(outcome.percentage, 50);
        assert_eq!(outcome.risk_tier, RiskTier::Moderate);
    }

    #[test]
    fn partial_patient_flags_are_rejected() {
        let args = PatientArgs {
            name: Some("Jo".to_string()),
            ..PatientArgs::default()
        };
        let err = args.into_details().expect_err("incomplete");
        assert_eq!(
            err.missing,
            vec!["age", "sex", "contact_number", "date_of_birth"]
        );
        assert_eq!(PatientArgs::default().into_details(), Ok(None));
    }

    #[test]
    fn unknown_assessments_are_invalid_input() {
        let catalog = AssessmentCatalog::builtin().expect("builtin catalog");
        match find_assessment(&catalog, "x") {
            Err(err @ AppError::InvalidInput(_)) => {
                assert_eq!(err.to_string(), "invalid input: assessment 'x' not found")
            }
            other => panic!("expected invalid input, got {other:?}"),
        }
    }
}
