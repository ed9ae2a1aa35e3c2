use serde::Deserialize;

use super::domain::OptionId;

/// Discrete user intent delivered to a [`QuizSession`](super::session::QuizSession).
///
/// How the action was produced (click, key press, transcribed speech) is irrelevant to
/// the session; adapters only need to deliver them one at a time and in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionAction {
    Select { option_id: OptionId },
    /// One-based position of the option on the current question.
    SelectNth { index: usize },
    Advance,
    Retreat,
    Cancel,
}

impl SessionAction {
    /// Keyboard mapping: `1`-`9` pick an option, arrows/Enter navigate, Escape cancels.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" | "Enter" => Some(Self::Advance),
            "ArrowLeft" => Some(Self::Retreat),
            "Escape" => Some(Self::Cancel),
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(digit @ '1'..='9'), None) => Some(Self::SelectNth {
                        index: digit as usize - '0' as usize,
                    }),
                    _ => None,
                }
            }
        }
    }
}
