// src/handlers/quiz.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::AppError,
    grading::{self, GradeOutcome},
    models::{
        attempt::{Attempt, GradeSummary, SubmitQuizRequest},
        question::{Choice, Question, QuestionWithChoices},
        quiz::{Quiz, QuizDetailResponse, QuizSummary},
    },
    utils::jwt::Claims,
};

#[derive(Debug, Deserialize)]
pub struct ListQuizzesParams {
    pub class_id: Option<i64>,
}

/// Lists quizzes with their question counts, optionally filtered by class.
pub async fn list_quizzes(
    State(pool): State<PgPool>,
    Query(params): Query<ListQuizzesParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT q.id, q.title, q.description, q.class_id, q.complete_by, q.created_at, \
         COUNT(s.id) AS question_count \
         FROM quizzes q LEFT JOIN questions s ON s.quiz_id = q.id",
    );

    if let Some(class_id) = params.class_id {
        builder.push(" WHERE q.class_id = ");
        builder.push_bind(class_id);
    }

    builder.push(" GROUP BY q.id ORDER BY q.created_at DESC");

    let quizzes: Vec<QuizSummary> = builder
        .build_query_as()
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list quizzes: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(quizzes))
}

/// Retrieves one quiz with its full question tree.
///
/// Correct-answer flags are stripped by the DTO so students cannot read
/// them out of the payload.
pub async fn get_quiz(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = fetch_quiz(&pool, quiz_id).await?;
    let questions = load_questions(&pool, quiz_id).await?;

    Ok(Json(QuizDetailResponse {
        quiz,
        questions: questions.into_iter().map(Into::into).collect(),
    }))
}

/// Submits a learner's answers for a quiz.
///
/// * Loads the quiz's question/choice snapshot.
/// * Grades the answer map (free-text questions never auto-score).
/// * Records the attempt: one row per (learner, quiz), last write wins.
pub async fn submit_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    fetch_quiz(&pool, quiz_id).await?;

    let questions = load_questions(&pool, quiz_id).await?;
    let outcome = grading::grade(&questions, &req.answers);

    let user_id = claims.sub.parse::<i64>().unwrap_or(0);
    let attempt = record_attempt(&pool, user_id, quiz_id, outcome).await?;

    tracing::info!(
        "Graded quiz {} for user {}: {}/{} ({}%)",
        quiz_id,
        user_id,
        attempt.score,
        attempt.total_questions,
        attempt.percentage
    );

    Ok(Json(GradeSummary {
        quiz_id,
        total_questions: outcome.total,
        correct_answers: outcome.correct,
        percentage: outcome.percentage,
        score: format!("{}/{}", outcome.correct, outcome.total),
    }))
}

/// Returns the calling learner's recorded attempt for a quiz.
pub async fn get_my_attempt(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let attempt = sqlx::query_as::<_, Attempt>(
        r#"
        SELECT id, user_id, quiz_id, score, total_questions, percentage, completed_at
        FROM attempts
        WHERE user_id = $1 AND quiz_id = $2
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound(
        "No attempt recorded for this quiz".to_string(),
    ))?;

    Ok(Json(attempt))
}

/// Creates or refreshes the single attempt row for (learner, quiz).
///
/// The upsert is atomic on the composite unique key, so two simultaneous
/// submissions serialize on the row instead of producing duplicates; a raw
/// 23505 from any other insert path still surfaces as 409 via AppError.
pub async fn record_attempt(
    pool: &PgPool,
    user_id: i64,
    quiz_id: i64,
    outcome: GradeOutcome,
) -> Result<Attempt, AppError> {
    let attempt = sqlx::query_as::<_, Attempt>(
        r#"
        INSERT INTO attempts (user_id, quiz_id, score, total_questions, percentage)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id, quiz_id) DO UPDATE SET
            score = EXCLUDED.score,
            total_questions = EXCLUDED.total_questions,
            percentage = EXCLUDED.percentage,
            completed_at = NOW()
        RETURNING id, user_id, quiz_id, score, total_questions, percentage, completed_at
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .bind(outcome.correct)
    .bind(outcome.total)
    .bind(outcome.percentage)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upsert attempt: {:?}", e);
        AppError::from(e)
    })?;

    Ok(attempt)
}

pub(crate) async fn fetch_quiz(pool: &PgPool, quiz_id: i64) -> Result<Quiz, AppError> {
    sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, title, description, class_id, complete_by, created_at
        FROM quizzes
        WHERE id = $1
        "#,
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))
}

/// Loads a quiz's questions with their choices, both in display order.
pub(crate) async fn load_questions(
    pool: &PgPool,
    quiz_id: i64,
) -> Result<Vec<QuestionWithChoices>, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, quiz_id, text, question_type, ord
        FROM questions
        WHERE quiz_id = $1
        ORDER BY ord, id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    let ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
    let choices = if ids.is_empty() {
        Vec::new()
    } else {
        sqlx::query_as::<_, Choice>(
            r#"
            SELECT id, question_id, text, is_correct, ord
            FROM choices
            WHERE question_id = ANY($1)
            ORDER BY ord, id
            "#,
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?
    };

    let mut by_question: HashMap<i64, Vec<Choice>> = HashMap::new();
    for choice in choices {
        by_question.entry(choice.question_id).or_default().push(choice);
    }

    Ok(questions
        .into_iter()
        .map(|question| {
            let choices = by_question.remove(&question.id).unwrap_or_default();
            QuestionWithChoices { question, choices }
        })
        .collect())
}
