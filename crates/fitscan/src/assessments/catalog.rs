use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use super::domain::{Assessment, AssessmentId, AssessmentSummary};

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Empty,
    DuplicateAssessment(AssessmentId),
    NoQuestions(AssessmentId),
    DuplicateQuestion {
        assessment: AssessmentId,
        question: String,
    },
    NoOptions {
        assessment: AssessmentId,
        question: String,
    },
    DuplicateOption {
        assessment: AssessmentId,
        question: String,
        option: String,
    },
    InvalidThresholds(AssessmentId),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(err) => write!(f, "failed to read assessment catalog: {}", err),
            CatalogError::Json(err) => write!(f, "invalid assessment catalog JSON: {}", err),
            CatalogError::Empty => write!(f, "assessment catalog contains no assessments"),
            CatalogError::DuplicateAssessment(id) => {
                write!(f, "assessment id '{}' appears more than once", id)
            }
            CatalogError::NoQuestions(id) => write!(f, "assessment '{}' has no questions", id),
            CatalogError::DuplicateQuestion {
                assessment,
                question,
            } => write!(
                f,
                "assessment '{}' repeats question id '{}'",
                assessment, question
            ),
            CatalogError::NoOptions {
                assessment,
                question,
            } => write!(
                f,
                "question '{}' in assessment '{}' has no options",
                question, assessment
            ),
            CatalogError::DuplicateOption {
                assessment,
                question,
                option,
            } => write!(
                f,
                "question '{}' in assessment '{}' repeats option id '{}'",
                question, assessment, option
            ),
            CatalogError::InvalidThresholds(id) => write!(
                f,
                "assessment '{}' declares risk thresholds outside 0..=100 or out of order",
                id
            ),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(err) => Some(err),
            CatalogError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    categories: Vec<String>,
    assessments: Vec<Assessment>,
}

/// Immutable, validated set of assessments shared across sessions.
#[derive(Debug, Clone)]
pub struct AssessmentCatalog {
    categories: Vec<String>,
    assessments: Vec<Arc<Assessment>>,
}

impl AssessmentCatalog {
    /// The catalog compiled into the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_reader(BUILTIN_CATALOG.as_bytes())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_reader(reader)?;
        Self::from_assessments(document.categories, document.assessments)
    }

    /// Validate and index assessments. Categories used by assessments but missing from
    /// `categories` are appended in first-seen order.
    pub fn from_assessments(
        categories: Vec<String>,
        assessments: Vec<Assessment>,
    ) -> Result<Self, CatalogError> {
        if assessments.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for assessment in &assessments {
            if !seen.insert(assessment.id.clone()) {
                return Err(CatalogError::DuplicateAssessment(assessment.id.clone()));
            }
            validate_assessment(assessment)?;
        }

        let mut categories = categories;
        for assessment in &assessments {
            if !categories.iter().any(|c| c == &assessment.category) {
                categories.push(assessment.category.clone());
            }
        }

        info!(
            assessments = assessments.len(),
            categories = categories.len(),
            "assessment catalog loaded"
        );

        Ok(Self {
            categories,
            assessments: assessments.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn get(&self, id: &AssessmentId) -> Option<Arc<Assessment>> {
        self.assessments
            .iter()
            .find(|assessment| &assessment.id == id)
            .cloned()
    }

    pub fn assessments(&self) -> &[Arc<Assessment>] {
        &self.assessments
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.assessments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assessments.is_empty()
    }

    /// Catalog cards matching an optional category and an optional free-text query.
    pub fn filter(&self, category: Option<&str>, query: Option<&str>) -> Vec<AssessmentSummary> {
        let category = category.map(str::trim).filter(|value| !value.is_empty());
        let query = query
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty());

        self.assessments
            .iter()
            .filter(|assessment| {
                category
                    .map(|category| assessment.category.eq_ignore_ascii_case(category))
                    .unwrap_or(true)
            })
            .filter(|assessment| match &query {
                Some(query) => {
                    assessment.title.to_lowercase().contains(query)
                        || assessment.description.to_lowercase().contains(query)
                }
                None => true,
            })
            .map(|assessment| assessment.summary())
            .collect()
    }
}

fn validate_assessment(assessment: &Assessment) -> Result<(), CatalogError> {
    if assessment.questions.is_empty() {
        return Err(CatalogError::NoQuestions(assessment.id.clone()));
    }

    if let Some(thresholds) = &assessment.risk_thresholds {
        if !thresholds.is_valid() {
            return Err(CatalogError::InvalidThresholds(assessment.id.clone()));
        }
    }

    let mut question_ids = HashSet::new();
    for question in &assessment.questions {
        if !question_ids.insert(&question.id) {
            return Err(CatalogError::DuplicateQuestion {
                assessment: assessment.id.clone(),
                question: question.id.to_string(),
            });
        }
        if question.options.is_empty() {
            return Err(CatalogError::NoOptions {
                assessment: assessment.id.clone(),
                question: question.id.to_string(),
            });
        }

        let mut option_ids = HashSet::new();
        for option in &question.options {
            if !option_ids.insert(&option.id) {
                return Err(CatalogError::DuplicateOption {
                    assessment: assessment.id.clone(),
                    question: question.id.to_string(),
                    option: option.id.to_string(),
                });
            }
        }
    }

    Ok(())
}
