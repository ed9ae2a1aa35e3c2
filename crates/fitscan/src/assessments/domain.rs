use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::recommendations;
use super::scoring::RiskThresholds;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Catalog-wide slug identifying an assessment (e.g. `diabetes-checker`).
    AssessmentId
);
string_id!(
    /// Identifier unique within one assessment; keys the answer set.
    QuestionId
);
string_id!(
    /// Identifier unique within one question.
    OptionId
);

/// Display-only effort rating shown on catalog cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Advanced,
}

impl Difficulty {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Advanced => "Advanced",
        }
    }
}

/// Discrete classification of a percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Moderate, RiskTier::High];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Low => "Few or mild symptoms",
            Self::Moderate => "Some concerning symptoms",
            Self::High => "Significant symptoms detected",
        }
    }
}

/// Advice shown alongside a result for one risk tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub advice: String,
    pub suggestions: Vec<String>,
}

/// Per-assessment advice. Every tier is mandatory so lookups cannot miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub low: Recommendation,
    pub moderate: Recommendation,
    pub high: Recommendation,
}

impl RecommendationSet {
    pub fn for_tier(&self, tier: RiskTier) -> &Recommendation {
        match tier {
            RiskTier::Low => &self.low,
            RiskTier::Moderate => &self.moderate,
            RiskTier::High => &self.high,
        }
    }
}

/// One selectable answer and the weight it contributes when chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: OptionId,
    pub label: String,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn option(&self, id: &OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|option| &option.id == id)
    }

    /// Zero-based positional lookup.
    pub fn option_at(&self, index: usize) -> Option<&AnswerOption> {
        self.options.get(index)
    }

    /// Highest weight among the options, zero when there are none.
    pub fn max_weight(&self) -> u32 {
        self.options
            .iter()
            .map(|option| option.weight)
            .max()
            .unwrap_or(0)
    }
}

/// A catalog entry: metadata plus the ordered questions driving a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub estimated_duration: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_thresholds: Option<RiskThresholds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<RecommendationSet>,
    pub questions: Vec<Question>,
}

impl Assessment {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Tier advice, falling back to the generic set when the assessment has none.
    pub fn recommendation(&self, tier: RiskTier) -> Recommendation {
        match &self.recommendations {
            Some(set) => set.for_tier(tier).clone(),
            None => recommendations::default_recommendation(tier),
        }
    }

    pub fn summary(&self) -> AssessmentSummary {
        AssessmentSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            difficulty: self.difficulty,
            difficulty_label: self.difficulty.label(),
            estimated_duration: self.estimated_duration.clone(),
            icon: self.icon.clone(),
            question_count: self.questions.len(),
        }
    }
}

/// Catalog card view without the question bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentSummary {
    pub id: AssessmentId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub difficulty_label: &'static str,
    pub estimated_duration: String,
    pub icon: String,
    pub question_count: usize,
}

/// Selected option per question for one attempt. May be partial while a quiz runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<QuestionId, OptionId>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record or overwrite the answer for `question`.
    pub fn record(&mut self, question: QuestionId, option: OptionId) {
        self.0.insert(question, option);
    }

    pub fn get(&self, question: &QuestionId) -> Option<&OptionId> {
        self.0.get(question)
    }

    pub fn contains(&self, question: &QuestionId) -> bool {
        self.0.contains_key(question)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &OptionId)> {
        self.0.iter()
    }
}

impl<Q, O> FromIterator<(Q, O)> for AnswerSet
where
    Q: Into<QuestionId>,
    O: Into<OptionId>,
{
    fn from_iter<I: IntoIterator<Item = (Q, O)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(question, option)| (question.into(), option.into()))
                .collect(),
        )
    }
}
