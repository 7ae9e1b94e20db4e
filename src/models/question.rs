// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Fixed enumeration of question types.
///
/// Stored as plain text in the 'questions' table; rows carry the string and
/// grading/generation parse it back through [`QuestionType::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// One correct choice expected.
    SingleChoice,
    /// Zero or more correct choices; graded as an exact set match.
    MultiChoice,
    /// Open answer, never auto-graded.
    FreeText,
    /// Two choices expected; the first choice's flag is the truth value.
    TrueFalse,
}

impl QuestionType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "single_choice" => Some(Self::SingleChoice),
            "multi_choice" => Some(Self::MultiChoice),
            "free_text" => Some(Self::FreeText),
            "true_false" => Some(Self::TrueFalse),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleChoice => "single_choice",
            Self::MultiChoice => "multi_choice",
            Self::FreeText => "free_text",
            Self::TrueFalse => "true_false",
        }
    }

    pub fn is_autograded(&self) -> bool {
        !matches!(self, Self::FreeText)
    }
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub text: String,
    /// One of the [`QuestionType`] strings.
    #[serde(rename = "type")]
    pub question_type: String,
    /// Quiz-local ordering index. Not required unique; ties break by id.
    #[serde(rename = "order")]
    pub ord: i32,
}

/// Represents the 'choices' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
    #[serde(rename = "order")]
    pub ord: i32,
}

/// A question together with its choices, as loaded for grading or display.
#[derive(Debug, Clone)]
pub struct QuestionWithChoices {
    pub question: Question,
    pub choices: Vec<Choice>,
}

/// Student-facing choice DTO: hides the `is_correct` flag.
#[derive(Debug, Serialize)]
pub struct PublicChoice {
    pub id: i64,
    pub text: String,
    #[serde(rename = "order")]
    pub ord: i32,
}

/// Student-facing question DTO.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: String,
    #[serde(rename = "order")]
    pub ord: i32,
    pub choices: Vec<PublicChoice>,
}

impl From<QuestionWithChoices> for PublicQuestion {
    fn from(qwc: QuestionWithChoices) -> Self {
        Self {
            id: qwc.question.id,
            text: qwc.question.text,
            question_type: qwc.question.question_type,
            ord: qwc.question.ord,
            choices: qwc
                .choices
                .into_iter()
                .map(|c| PublicChoice {
                    id: c.id,
                    text: c.text,
                    ord: c.ord,
                })
                .collect(),
        }
    }
}

/// DTO for one choice inside a quiz create/edit payload.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChoicePayload {
    #[validate(length(min = 1, max = 500))]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default, rename = "order")]
    pub ord: i32,
}

/// DTO for one question inside a quiz create/edit payload.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionPayload {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: String,
    #[serde(default, rename = "order")]
    pub ord: i32,
    #[validate(nested)]
    #[serde(default)]
    pub choices: Vec<CreateChoicePayload>,
}

/// A generated question not yet attached to any quiz.
///
/// Becomes real Question/Choice rows only when the quiz-authoring caller
/// persists it through the create/edit endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(rename = "order")]
    pub ord: i32,
    pub choices: Vec<DraftChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftChoice {
    pub text: String,
    pub is_correct: bool,
    #[serde(rename = "order")]
    pub ord: i32,
}
