// src/generation/mod.rs
//
// Document-to-question pipeline: decode an upload into plain text, split it
// into candidate sentences, then produce question drafts either heuristically
// or through the configured text-generation service.

pub mod ai;
pub mod extract;
pub mod heuristic;

pub use heuristic::DraftCounts;

use crate::models::question::QuestionDraft;

/// Produces question drafts, delegating to the AI service when one is
/// configured. Delegation failures never surface to the caller; the
/// heuristic path covers them.
pub async fn generate_drafts(
    client: Option<&dyn ai::TextCompletion>,
    full_text: &str,
    sentences: &[String],
    counts: DraftCounts,
) -> Vec<QuestionDraft> {
    match client {
        Some(client) => ai::generate_with_delegate(client, full_text, sentences, counts).await,
        None => heuristic::generate(sentences, counts),
    }
}
