use serde::{Deserialize, Serialize};

use super::super::domain::{AnswerSet, Assessment, AssessmentId, Recommendation, RiskTier};
use super::super::scoring::{breakdown, AssessmentOutcome, ResponseBreakdown};

/// Identifying details printed on a report. Presentation only; never fed into scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDetails {
    pub name: String,
    pub age: String,
    pub sex: String,
    pub contact_number: String,
    pub date_of_birth: String,
}

impl PatientDetails {
    /// Every field is required; blank values are reported together.
    pub fn validate(&self) -> Result<(), PatientDetailsError> {
        let missing: Vec<&'static str> = [
            ("name", &self.name),
            ("age", &self.age),
            ("sex", &self.sex),
            ("contact_number", &self.contact_number),
            ("date_of_birth", &self.date_of_birth),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PatientDetailsError { missing })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("patient details incomplete: missing {}", .missing.join(", "))]
pub struct PatientDetailsError {
    pub missing: Vec<&'static str>,
}

/// Everything the presenter needs to render a result, flattened for display.
#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub assessment_id: AssessmentId,
    pub assessment_title: String,
    pub category: String,
    pub total_score: u32,
    pub max_score: u32,
    pub percentage: u8,
    pub risk_tier: RiskTier,
    pub risk_label: &'static str,
    pub risk_description: &'static str,
    pub recommendation: Recommendation,
    pub responses: Vec<ResponseBreakdown>,
}

impl ResultView {
    pub fn build(assessment: &Assessment, answers: &AnswerSet, outcome: &AssessmentOutcome) -> Self {
        Self {
            assessment_id: outcome.assessment_id.clone(),
            assessment_title: assessment.title.clone(),
            category: assessment.category.clone(),
            total_score: outcome.total_score,
            max_score: outcome.max_score,
            percentage: outcome.percentage,
            risk_tier: outcome.risk_tier,
            risk_label: outcome.risk_tier.label(),
            risk_description: outcome.risk_tier.description(),
            recommendation: outcome.recommendation.clone(),
            responses: breakdown(assessment, answers),
        }
    }

    pub fn score_line(&self) -> String {
        format!(
            "{} / {} ({}% of maximum score)",
            self.total_score, self.max_score, self.percentage
        )
    }
}
