use async_trait::async_trait;
use serde::Deserialize;

use crate::engine::context::PipelineContext;
use crate::errors::PipelineError;
use crate::traits::{ComponentLocation, EventProcessor};

/// Target case for `ChangeTextCaseProcessor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    Upper,
    Lower,
    Proper,
    Title,
}

impl std::str::FromStr for CaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upper" => Ok(CaseType::Upper),
            "lower" => Ok(CaseType::Lower),
            "proper" => Ok(CaseType::Proper),
            "title" => Ok(CaseType::Title),
            other => Err(format!("Unknown case type: {}", other)),
        }
    }
}

/// Converts text events to a different case
pub struct ChangeTextCaseProcessor {
    case: CaseType,
    location: ComponentLocation,
}

impl ChangeTextCaseProcessor {
    pub fn new(case: CaseType, location: impl Into<ComponentLocation>) -> Self {
        Self {
            case,
            location: location.into(),
        }
    }

    pub fn upper(location: impl Into<ComponentLocation>) -> Self {
        Self::new(CaseType::Upper, location)
    }

    pub fn lower(location: impl Into<ComponentLocation>) -> Self {
        Self::new(CaseType::Lower, location)
    }

    pub fn case(&self) -> CaseType {
        self.case
    }

    pub fn convert(&self, input: &str) -> String {
        match self.case {
            CaseType::Upper => input.to_uppercase(),
            CaseType::Lower => input.to_lowercase(),
            CaseType::Proper => input
                .split_whitespace()
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" "),
            // Like proper case, but small words after the first stay lowercase
            CaseType::Title => input
                .split_whitespace()
                .enumerate()
                .map(|(i, word)| {
                    let lower_word = word.to_lowercase();
                    if i > 0 && is_minor_word(&lower_word) {
                        lower_word
                    } else {
                        capitalize(word)
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

fn is_minor_word(word: &str) -> bool {
    matches!(
        word,
        "a" | "an" | "the" | "and" | "or" | "but" | "in" | "on" | "at" | "to" | "for" | "of" | "with" | "by"
    )
}

#[async_trait]
impl EventProcessor<String> for ChangeTextCaseProcessor {
    async fn process(&self, event: String, _context: &PipelineContext) -> Result<String, PipelineError> {
        Ok(self.convert(&event))
    }

    fn location(&self) -> &ComponentLocation {
        &self.location
    }
}
