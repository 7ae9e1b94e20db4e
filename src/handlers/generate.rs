// src/handlers/generate.rs

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    generation::{self, DraftCounts, ai::TextCompletion, extract},
    state::AppState,
};

/// Generates question drafts from an uploaded document.
/// Admin only.
///
/// Multipart fields: `file` (the document) plus optional `mcq_count`,
/// `tf_count` and `text_count`. Drafts are returned to the quiz-creation
/// form; nothing is persisted here.
pub async fn generate_questions(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut counts = DraftCounts {
        mcq: 0,
        tf: 0,
        text: 5,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((filename, bytes));
            }
            "mcq_count" => counts.mcq = parse_count(&name, field.text().await)?,
            "tf_count" => counts.tf = parse_count(&name, field.text().await)?,
            "text_count" => counts.text = parse_count(&name, field.text().await)?,
            _ => {}
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| AppError::BadRequest("Missing file upload".to_string()))?;

    let text = extract::extract_text(&filename, &bytes)?;
    let sentences = extract::split_sentences(&text);
    if sentences.is_empty() {
        return Err(AppError::BadRequest(
            "Document has insufficient readable text".to_string(),
        ));
    }

    let client = state.ai.as_deref().map(|c| c as &dyn TextCompletion);
    let drafts = generation::generate_drafts(client, &text, &sentences, counts).await;

    tracing::info!(
        "Generated {} question drafts from '{}' ({} candidate sentences)",
        drafts.len(),
        filename,
        sentences.len()
    );

    Ok(Json(serde_json::json!({
        "count": drafts.len(),
        "drafts": drafts,
    })))
}

fn parse_count(
    name: &str,
    text: Result<String, axum::extract::multipart::MultipartError>,
) -> Result<usize, AppError> {
    text.map_err(|e| AppError::BadRequest(e.to_string()))?
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("'{name}' must be a non-negative integer")))
}
