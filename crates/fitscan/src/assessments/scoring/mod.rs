mod classifier;

pub use classifier::{classify, RiskThresholdPolicy, RiskThresholds};

use serde::{Deserialize, Serialize};

use super::domain::{
    AnswerSet, Assessment, AssessmentId, OptionId, QuestionId, Recommendation, RiskTier,
};

/// Totals derived from an assessment and an answer set. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total_score: u32,
    pub max_score: u32,
    pub percentage: u8,
    pub risk_tier: RiskTier,
}

/// Record handed to the report presenter once a quiz completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentOutcome {
    pub assessment_id: AssessmentId,
    pub total_score: u32,
    pub max_score: u32,
    pub percentage: u8,
    pub risk_tier: RiskTier,
    pub recommendation: Recommendation,
}

impl AssessmentOutcome {
    pub fn score(&self) -> ScoreResult {
        ScoreResult {
            total_score: self.total_score,
            max_score: self.max_score,
            percentage: self.percentage,
            risk_tier: self.risk_tier,
        }
    }
}

/// Per-question contribution, kept for transparent reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseBreakdown {
    pub question_id: QuestionId,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<OptionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_label: Option<String>,
    pub weight: u32,
    pub max_weight: u32,
}

/// Stateless scorer. The configured thresholds apply to assessments without an override.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoringEngine {
    default_thresholds: RiskThresholds,
}

impl ScoringEngine {
    pub fn new(default_thresholds: RiskThresholds) -> Self {
        Self { default_thresholds }
    }

    pub fn score(&self, assessment: &Assessment, answers: &AnswerSet) -> ScoreResult {
        let total_score = total_score(assessment, answers);
        let max_score = max_score(assessment);
        let percentage = percentage(total_score, max_score);
        let thresholds = assessment
            .risk_thresholds
            .unwrap_or(self.default_thresholds);
        let risk_tier = classify(f64::from(percentage), Some(&thresholds));

        ScoreResult {
            total_score,
            max_score,
            percentage,
            risk_tier,
        }
    }

    pub fn outcome(&self, assessment: &Assessment, answers: &AnswerSet) -> AssessmentOutcome {
        let result = self.score(assessment, answers);
        AssessmentOutcome {
            assessment_id: assessment.id.clone(),
            total_score: result.total_score,
            max_score: result.max_score,
            percentage: result.percentage,
            risk_tier: result.risk_tier,
            recommendation: assessment.recommendation(result.risk_tier),
        }
    }
}

/// Per-question view of an answer set, in question order.
pub fn breakdown(assessment: &Assessment, answers: &AnswerSet) -> Vec<ResponseBreakdown> {
    assessment
        .questions
        .iter()
        .map(|question| {
            let selected = answers
                .get(&question.id)
                .and_then(|option_id| question.option(option_id));
            ResponseBreakdown {
                question_id: question.id.clone(),
                prompt: question.prompt.clone(),
                selected_option: selected.map(|option| option.id.clone()),
                selected_label: selected.map(|option| option.label.clone()),
                weight: selected.map(|option| option.weight).unwrap_or(0),
                max_weight: question.max_weight(),
            }
        })
        .collect()
}

/// Score with the standard 40/70 thresholds.
pub fn score(assessment: &Assessment, answers: &AnswerSet) -> ScoreResult {
    ScoringEngine::default().score(assessment, answers)
}

/// Sum of selected weights. Unanswered questions and unknown option ids contribute nothing.
pub fn total_score(assessment: &Assessment, answers: &AnswerSet) -> u32 {
    assessment
        .questions
        .iter()
        .filter_map(|question| {
            answers
                .get(&question.id)
                .and_then(|option_id| question.option(option_id))
        })
        .fold(0u32, |sum, option| sum.saturating_add(option.weight))
}

/// Best achievable total, independent of any answers.
pub fn max_score(assessment: &Assessment) -> u32 {
    assessment
        .questions
        .iter()
        .fold(0u32, |sum, question| sum.saturating_add(question.max_weight()))
}

/// `round(100 * total / max)`, zero when `max` is zero.
pub fn percentage(total_score: u32, max_score: u32) -> u8 {
    if max_score == 0 {
        return 0;
    }
    let ratio = f64::from(total_score) / f64::from(max_score);
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}
