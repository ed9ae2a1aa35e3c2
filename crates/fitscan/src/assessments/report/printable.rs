use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;
use tera::{Context, Tera};

use super::views::{PatientDetails, ResultView};

const DISCLAIMER: &str = "This assessment is for informational purposes only and should not \
replace professional medical advice, diagnosis, or treatment. Always consult with a qualified \
healthcare provider for proper diagnosis and treatment. If you are experiencing a medical \
emergency, call your local emergency services immediately.";

const FOOTER: &str = "Generated by FitScan Health Assessment Platform";

/// Registered with an `.html` suffix so Tera autoescapes every interpolation.
const REPORT_TEMPLATE_NAME: &str = "report.html";
const REPORT_TEMPLATE: &str = include_str!("../../../data/report.html.tera");

/// Rendered report body plus the media type to serve it with.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintableReport {
    pub content_type: mime::Mime,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report template parse error: {0}")]
    TemplateParse(String),
    #[error("report rendering failed: {0}")]
    TemplateRender(String),
    #[error("report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<tera::Error> for ReportError {
    fn from(err: tera::Error) -> Self {
        ReportError::TemplateRender(err.to_string())
    }
}

#[derive(Serialize)]
struct ReportContext<'a> {
    view: &'a ResultView,
    patient: Option<&'a PatientDetails>,
    generated_on: String,
    disclaimer: &'static str,
    footer: &'static str,
}

/// Standalone HTML document suitable for printing.
pub fn render_printable(
    view: &ResultView,
    patient: Option<&PatientDetails>,
    generated_on: NaiveDate,
) -> Result<PrintableReport, ReportError> {
    let mut tera = Tera::default();
    tera.add_raw_template(REPORT_TEMPLATE_NAME, REPORT_TEMPLATE)
        .map_err(|err| ReportError::TemplateParse(err.to_string()))?;

    let value = serde_json::to_value(ReportContext {
        view,
        patient,
        generated_on: generated_on.format("%Y-%m-%d").to_string(),
        disclaimer: DISCLAIMER,
        footer: FOOTER,
    })?;
    let context =
        Context::from_value(value).map_err(|err| ReportError::TemplateRender(err.to_string()))?;

    let body = tera.render(REPORT_TEMPLATE_NAME, &context)?;
    Ok(PrintableReport {
        content_type: mime::TEXT_HTML_UTF_8,
        body,
    })
}

/// Plain-text rendering for terminals.
pub fn render_text(view: &ResultView, patient: Option<&PatientDetails>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} Results", view.assessment_title);
    let _ = writeln!(out, "{} Risk Level: {}", view.risk_label, view.risk_description);
    let _ = writeln!(out, "Score: {}", view.score_line());

    if let Some(patient) = patient {
        let _ = writeln!(
            out,
            "Patient: {} | Age {} | Sex {} | DOB {} | Contact {}",
            patient.name, patient.age, patient.sex, patient.date_of_birth, patient.contact_number
        );
    }

    let _ = writeln!(out, "\n{}", view.recommendation.title);
    let _ = writeln!(out, "{}", view.recommendation.advice);
    for suggestion in &view.recommendation.suggestions {
        let _ = writeln!(out, "- {}", suggestion);
    }

    let _ = writeln!(out, "\nResponses");
    for (position, response) in view.responses.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} -> {} ({}/{})",
            position + 1,
            response.prompt,
            response.selected_label.as_deref().unwrap_or("Not answered"),
            response.weight,
            response.max_weight
        );
    }

    let _ = writeln!(out, "\n{}", DISCLAIMER);
    out
}
