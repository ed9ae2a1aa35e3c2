//! Generic advice used when an assessment ships without its own recommendation set.

use super::domain::{Recommendation, RiskTier};

pub fn default_recommendation(tier: RiskTier) -> Recommendation {
    match tier {
        RiskTier::Low => recommendation(
            "Low Risk",
            "Your symptoms appear to be minimal. Continue monitoring your health.",
            &[
                "Continue maintaining healthy habits",
                "Schedule regular check-ups with your healthcare provider",
                "Stay aware of any changes in your symptoms",
            ],
        ),
        RiskTier::Moderate => recommendation(
            "Moderate Risk",
            "Your symptoms suggest you should consult with a healthcare provider.",
            &[
                "Schedule an appointment with your healthcare provider",
                "Track your symptoms daily",
                "Implement recommended lifestyle changes",
            ],
        ),
        RiskTier::High => recommendation(
            "High Risk",
            "Your symptoms are concerning and require medical evaluation.",
            &[
                "Seek medical attention promptly",
                "Contact your healthcare provider today",
                "Do not ignore these symptoms",
            ],
        ),
    }
}

fn recommendation(title: &str, advice: &str, suggestions: &[&str]) -> Recommendation {
    Recommendation {
        title: title.to_string(),
        advice: advice.to_string(),
        suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
    }
}
