use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Text shown for option E when the question bank left it blank.
///
/// Every question carries an escape hatch so students are never forced to
/// guess; the service scores it as unanswered.
pub const UNSURE_OPTION_TEXT: &str = "I am not sure about the answer.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("option letter must be one of A-E, got {found:?}")]
pub struct ParseOptionLetterError {
    found: String,
}

/// One of the five choice letters a student can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
    E,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 5] = [
        OptionLetter::A,
        OptionLetter::B,
        OptionLetter::C,
        OptionLetter::D,
        OptionLetter::E,
    ];

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            OptionLetter::A => 'A',
            OptionLetter::B => 'B',
            OptionLetter::C => 'C',
            OptionLetter::D => 'D',
            OptionLetter::E => 'E',
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for OptionLetter {
    type Err = ParseOptionLetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(OptionLetter::A),
            "B" | "b" => Ok(OptionLetter::B),
            "C" | "c" => Ok(OptionLetter::C),
            "D" | "d" => Ok(OptionLetter::D),
            "E" | "e" => Ok(OptionLetter::E),
            other => Err(ParseOptionLetterError {
                found: other.to_string(),
            }),
        }
    }
}

/// A multiple-choice question as served by the question bank.
///
/// Options A-D come from the bank and may individually be blank (blank
/// options are simply not offered). Option E is optional in the bank and
/// falls back to the synthetic unsure choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    option_a: String,
    option_b: String,
    option_c: String,
    option_d: String,
    option_e: Option<String>,
}

impl Question {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        option_a: impl Into<String>,
        option_b: impl Into<String>,
        option_c: impl Into<String>,
        option_d: impl Into<String>,
        option_e: Option<String>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            option_a: option_a.into(),
            option_b: option_b.into(),
            option_c: option_c.into(),
            option_d: option_d.into(),
            option_e: option_e.filter(|text| !text.trim().is_empty()),
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Resolves the display text for a letter.
    ///
    /// Returns `None` for a bank option left blank; option E always
    /// resolves, falling back to [`UNSURE_OPTION_TEXT`].
    #[must_use]
    pub fn option_text(&self, letter: OptionLetter) -> Option<&str> {
        let text = match letter {
            OptionLetter::A => self.option_a.as_str(),
            OptionLetter::B => self.option_b.as_str(),
            OptionLetter::C => self.option_c.as_str(),
            OptionLetter::D => self.option_d.as_str(),
            OptionLetter::E => return Some(self.option_e.as_deref().unwrap_or(UNSURE_OPTION_TEXT)),
        };
        if text.trim().is_empty() { None } else { Some(text) }
    }

    /// The letters a student may actually choose for this question.
    #[must_use]
    pub fn available_options(&self) -> Vec<OptionLetter> {
        OptionLetter::ALL
            .into_iter()
            .filter(|letter| self.option_text(*letter).is_some())
            .collect()
    }

    #[must_use]
    pub fn is_available(&self, letter: OptionLetter) -> bool {
        self.option_text(letter).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank_question(option_e: Option<&str>) -> Question {
        Question::new(
            QuestionId::new("q1"),
            "What is 2 + 2?",
            "3",
            "4",
            "5",
            "22",
            option_e.map(str::to_string),
        )
    }

    #[test]
    fn option_e_falls_back_to_unsure_text() {
        let question = bank_question(None);
        assert_eq!(
            question.option_text(OptionLetter::E),
            Some(UNSURE_OPTION_TEXT)
        );
        assert!(question.is_available(OptionLetter::E));
    }

    #[test]
    fn explicit_option_e_is_kept() {
        let question = bank_question(Some("None of the above"));
        assert_eq!(
            question.option_text(OptionLetter::E),
            Some("None of the above")
        );
    }

    #[test]
    fn blank_bank_options_are_unavailable() {
        let question = Question::new(
            QuestionId::new("q2"),
            "True or false?",
            "True",
            "False",
            "",
            "  ",
            None,
        );
        assert_eq!(
            question.available_options(),
            vec![OptionLetter::A, OptionLetter::B, OptionLetter::E]
        );
        assert!(!question.is_available(OptionLetter::C));
    }

    #[test]
    fn letters_parse_case_insensitively() {
        assert_eq!("c".parse::<OptionLetter>().unwrap(), OptionLetter::C);
        assert!("F".parse::<OptionLetter>().is_err());
    }
}
