// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, Transaction};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        class::CreateClassRequest,
        question::{CreateQuestionPayload, QuestionType},
        quiz::CreateQuizRequest,
    },
    utils::html::clean_html,
};

/// Creates a new class.
/// Admin only.
pub async fn create_class(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateClassRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO classes (name, description)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(&payload.name)
    .bind(clean_html(&payload.description))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
            AppError::Conflict(format!("Class '{}' already exists", payload.name))
        } else {
            tracing::error!("Failed to create class: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Creates a quiz together with its whole question/choice tree.
/// Admin only. The tree is committed in one transaction.
pub async fn create_quiz(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    validate_question_types(&payload.questions)?;

    let mut tx = pool.begin().await?;

    let quiz_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO quizzes (title, description, class_id, complete_by)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(clean_html(&payload.title))
    .bind(clean_html(&payload.description))
    .bind(payload.class_id)
    .bind(payload.complete_by)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create quiz: {:?}", e);
        AppError::from(e)
    })?;

    insert_questions(&mut tx, quiz_id, &payload.questions).await?;

    tx.commit().await?;

    tracing::info!(
        "Created quiz {} with {} questions",
        quiz_id,
        payload.questions.len()
    );

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": quiz_id}))))
}

/// Replaces a quiz and its entire question subtree.
/// Admin only. Existing questions and choices are discarded and recreated
/// from the payload, all in one transaction.
pub async fn update_quiz(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    validate_question_types(&payload.questions)?;

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE quizzes
        SET title = $1, description = $2, class_id = $3, complete_by = $4
        WHERE id = $5
        "#,
    )
    .bind(clean_html(&payload.title))
    .bind(clean_html(&payload.description))
    .bind(payload.class_id)
    .bind(payload.complete_by)
    .bind(quiz_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    // Wholesale replace: choices go with their questions via cascade.
    sqlx::query("DELETE FROM questions WHERE quiz_id = $1")
        .bind(quiz_id)
        .execute(&mut *tx)
        .await?;

    insert_questions(&mut tx, quiz_id, &payload.questions).await?;

    tx.commit().await?;

    tracing::info!(
        "Replaced quiz {} with {} questions",
        quiz_id,
        payload.questions.len()
    );

    Ok(StatusCode::OK)
}

/// Deletes a quiz by ID; questions, choices and attempts cascade.
/// Admin only.
pub async fn delete_quiz(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
        .bind(quiz_id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete quiz: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn validate_question_types(questions: &[CreateQuestionPayload]) -> Result<(), AppError> {
    for q in questions {
        if QuestionType::parse(&q.question_type).is_none() {
            return Err(AppError::BadRequest(format!(
                "Unknown question type '{}'",
                q.question_type
            )));
        }
    }
    Ok(())
}

async fn insert_questions(
    tx: &mut Transaction<'_, Postgres>,
    quiz_id: i64,
    questions: &[CreateQuestionPayload],
) -> Result<(), AppError> {
    for question in questions {
        let question_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO questions (quiz_id, text, question_type, ord)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(quiz_id)
        .bind(clean_html(&question.text))
        .bind(&question.question_type)
        .bind(question.ord)
        .fetch_one(&mut **tx)
        .await?;

        for choice in &question.choices {
            sqlx::query(
                r#"
                INSERT INTO choices (question_id, text, is_correct, ord)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(question_id)
            .bind(clean_html(&choice.text))
            .bind(choice.is_correct)
            .bind(choice.ord)
            .execute(&mut **tx)
            .await?;
        }
    }
    Ok(())
}
