// src/models/attempt.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::grading::AnswerValue;

/// Represents the 'attempts' table in the database.
/// One learner's recorded outcome for one quiz, unique per (user, quiz);
/// re-submission overwrites the row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    /// Count of correctly answered autograded questions.
    pub score: i32,
    /// Count of autograded questions in the quiz at submission time.
    pub total_questions: i32,
    pub percentage: i32,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for submitting a quiz attempt.
///
/// Keys follow the form "question_<id>"; the value shape depends on the
/// question type (single id, id list, free text, bool-like).
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub answers: HashMap<String, AnswerValue>,
}

/// Grading summary returned to the learner after a submission.
#[derive(Debug, Serialize)]
pub struct GradeSummary {
    pub quiz_id: i64,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub percentage: i32,
    /// Display form, e.g. "3/5".
    pub score: String,
}
