// src/generation/ai.rs

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::generation::heuristic::{self, DraftCounts};
use crate::models::question::{DraftChoice, QuestionDraft, QuestionType};

/// Only this many leading characters of the extracted text are sent out.
const PROMPT_TEXT_BUDGET: usize = 4000;
/// Bound on the blocking external call; a timeout is treated like any other
/// delegation failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_COMPLETION_TOKENS: u32 = 2048;

#[derive(Debug)]
pub struct CompletionError(pub String);

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for CompletionError {}

/// The generative-text capability. The production implementation talks to a
/// configured HTTP service; tests substitute an in-memory one.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    content: String,
}

/// HTTP client for the external text-generation service.
pub struct AiTextClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl AiTextClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl TextCompletion for AiTextClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = format!("{}/completion", self.base_url);

        let mut request = self.http.post(&url).json(&CompletionRequest {
            prompt,
            n_predict: MAX_COMPLETION_TOKENS,
            temperature: 0.7,
            stream: false,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| CompletionError(e.to_string()))?;

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError(e.to_string()))?;

        Ok(body.content)
    }
}

/// One question object as the service is asked to emit it.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    text: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    choices: Vec<RawChoice>,
}

#[derive(Debug, Deserialize)]
struct RawChoice {
    text: String,
    #[serde(default)]
    is_correct: bool,
}

fn build_prompt(excerpt: &str, counts: DraftCounts) -> String {
    format!(
        r#"You are an exam question designer. Read the source text below and write quiz questions for it.

## Source text:
{}

## Requested questions:
- exactly {} multiple-choice questions (type "mcq"): 4 choices each, exactly one with "is_correct": true
- exactly {} true/false questions (type "true_false"): two choices "True" and "False", exactly one with "is_correct": true
- exactly {} open questions (type "text"): no choices

## Output format:
A single JSON array of objects, each shaped as
{{"text": "...", "type": "mcq" | "true_false" | "text", "choices": [{{"text": "...", "is_correct": true}}]}}

Output only the JSON array, no other text."#,
        excerpt, counts.mcq, counts.tf, counts.text
    )
}

/// Strips a Markdown code fence the service may have wrapped around the JSON.
fn strip_code_fence(content: &str) -> &str {
    let content = content.trim();
    let content = content
        .strip_prefix("```json")
        .or_else(|| content.strip_prefix("```"))
        .unwrap_or(content);
    content.strip_suffix("```").unwrap_or(content).trim()
}

/// Maps the service's type label onto the fixed enumeration, tolerating the
/// common spellings.
fn parse_kind(raw: &str) -> Option<QuestionType> {
    match raw
        .trim()
        .to_ascii_lowercase()
        .replace(['-', ' ', '/'], "_")
        .as_str()
    {
        "mcq" | "single_choice" | "multiple_choice" | "choice" => Some(QuestionType::SingleChoice),
        "multi_choice" | "checkbox" | "multiple_select" => Some(QuestionType::MultiChoice),
        "true_false" | "truefalse" | "tf" | "boolean" => Some(QuestionType::TrueFalse),
        "text" | "free_text" | "open" | "short_answer" => Some(QuestionType::FreeText),
        _ => None,
    }
}

/// Generates drafts through the external service, falling back to the
/// heuristic generator for any failure or per-type shortfall.
///
/// Accepted items keep the service's emission order; heuristic fills are
/// appended after them and the whole list is renumbered contiguously.
pub async fn generate_with_delegate(
    client: &dyn TextCompletion,
    full_text: &str,
    sentences: &[String],
    counts: DraftCounts,
) -> Vec<QuestionDraft> {
    let excerpt: String = full_text.chars().take(PROMPT_TEXT_BUDGET).collect();
    let prompt = build_prompt(&excerpt, counts);

    let content = match client.complete(&prompt).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("AI service unavailable, using heuristic generator: {}", e);
            return heuristic::generate(sentences, counts);
        }
    };

    let raw: Vec<RawQuestion> = match serde_json::from_str(strip_code_fence(&content)) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Unparseable AI response, using heuristic generator: {}", e);
            return heuristic::generate(sentences, counts);
        }
    };

    let mut remaining = counts;
    let mut drafts = Vec::new();

    for item in raw {
        let Some(kind) = parse_kind(&item.kind) else {
            continue;
        };
        match kind {
            QuestionType::SingleChoice | QuestionType::MultiChoice => {
                if remaining.mcq == 0 {
                    continue;
                }
                // A choice question needs real choices and a marked answer.
                if item.choices.len() < 2 || !item.choices.iter().any(|c| c.is_correct) {
                    continue;
                }
                remaining.mcq -= 1;
                drafts.push(QuestionDraft {
                    text: item.text,
                    question_type: kind,
                    ord: 0,
                    choices: item
                        .choices
                        .into_iter()
                        .enumerate()
                        .map(|(i, c)| DraftChoice {
                            text: c.text,
                            is_correct: c.is_correct,
                            ord: i as i32,
                        })
                        .collect(),
                });
            }
            QuestionType::TrueFalse => {
                if remaining.tf == 0 {
                    continue;
                }
                remaining.tf -= 1;
                let choices = if item.choices.len() < 2 {
                    // Repair with the canonical pair; respect an explicit
                    // "false is correct" if the item carried one.
                    let false_marked = item.choices.iter().any(|c| {
                        c.is_correct && c.text.trim().to_ascii_lowercase().starts_with('f')
                    });
                    heuristic::true_false_pair(!false_marked)
                } else {
                    item.choices
                        .into_iter()
                        .take(2)
                        .enumerate()
                        .map(|(i, c)| DraftChoice {
                            text: c.text,
                            is_correct: c.is_correct,
                            ord: i as i32,
                        })
                        .collect()
                };
                drafts.push(QuestionDraft {
                    text: item.text,
                    question_type: QuestionType::TrueFalse,
                    ord: 0,
                    choices,
                });
            }
            QuestionType::FreeText => {
                if remaining.text == 0 {
                    continue;
                }
                remaining.text -= 1;
                drafts.push(QuestionDraft {
                    text: item.text,
                    question_type: QuestionType::FreeText,
                    ord: 0,
                    choices: Vec::new(),
                });
            }
        }
    }

    if !remaining.is_empty() {
        tracing::info!(
            "AI response left a shortfall (mcq={}, tf={}, text={}), filling heuristically",
            remaining.mcq,
            remaining.tf,
            remaining.text
        );
        drafts.extend(heuristic::generate(sentences, remaining));
    }

    heuristic::renumber(&mut drafts);
    drafts
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(&'static str);

    #[async_trait]
    impl TextCompletion for Canned {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            Ok(self.0.to_string())
        }
    }

    struct Unavailable;

    #[async_trait]
    impl TextCompletion for Unavailable {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            Err(CompletionError("connection refused".to_string()))
        }
    }

    fn sentences(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("Fallback sentence {i} with enough characters."))
            .collect()
    }

    #[tokio::test]
    async fn service_failure_falls_back_to_full_heuristic() {
        let counts = DraftCounts {
            mcq: 1,
            tf: 1,
            text: 1,
        };
        let drafts = generate_with_delegate(&Unavailable, "irrelevant", &sentences(5), counts).await;

        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0].question_type, QuestionType::SingleChoice);
        assert_eq!(drafts[1].question_type, QuestionType::TrueFalse);
        assert_eq!(drafts[2].question_type, QuestionType::FreeText);
    }

    #[tokio::test]
    async fn malformed_response_falls_back_to_full_heuristic() {
        let counts = DraftCounts {
            mcq: 0,
            tf: 0,
            text: 2,
        };
        let drafts =
            generate_with_delegate(&Canned("I would love to help!"), "text", &sentences(4), counts)
                .await;

        assert_eq!(drafts.len(), 2);
        assert!(drafts.iter().all(|d| d.question_type == QuestionType::FreeText));
    }

    #[tokio::test]
    async fn fenced_json_is_accepted_and_quotas_enforced() {
        let content = r#"```json
[
  {"text": "Q1?", "type": "mcq", "choices": [
    {"text": "right", "is_correct": true},
    {"text": "wrong a"}, {"text": "wrong b"}, {"text": "wrong c"}
  ]},
  {"text": "Q2?", "type": "mcq", "choices": [
    {"text": "right", "is_correct": true}, {"text": "wrong"}
  ]},
  {"text": "Open question", "type": "text"}
]
```"#;
        let counts = DraftCounts {
            mcq: 1,
            tf: 0,
            text: 1,
        };
        let drafts =
            generate_with_delegate(&Canned(content), "text", &sentences(3), counts).await;

        // The second MCQ overflows its quota and is dropped.
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].text, "Q1?");
        assert_eq!(drafts[0].question_type, QuestionType::SingleChoice);
        assert_eq!(drafts[1].text, "Open question");
        assert_eq!(
            drafts.iter().map(|d| d.ord).collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[tokio::test]
    async fn true_false_items_are_repaired_with_canonical_pair() {
        let content = r#"[{"text": "The sky is green.", "type": "true_false"}]"#;
        let counts = DraftCounts {
            mcq: 0,
            tf: 1,
            text: 0,
        };
        let drafts = generate_with_delegate(&Canned(content), "text", &sentences(2), counts).await;

        assert_eq!(drafts.len(), 1);
        let choices = &drafts[0].choices;
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0].text, "True");
        assert_eq!(choices[1].text, "False");
        assert!(choices[0].is_correct);
        assert!(!choices[1].is_correct);
    }

    #[tokio::test]
    async fn shortfall_is_filled_from_the_heuristic_pool() {
        // Service returns one of the two requested MCQs and nothing else.
        let content = r#"[{"text": "Only one", "type": "mcq", "choices": [
            {"text": "yes", "is_correct": true}, {"text": "no"}
        ]}]"#;
        let counts = DraftCounts {
            mcq: 2,
            tf: 1,
            text: 0,
        };
        let drafts = generate_with_delegate(&Canned(content), "text", &sentences(6), counts).await;

        assert_eq!(drafts.len(), 3);
        // Accepted item first, heuristic fills appended after.
        assert_eq!(drafts[0].text, "Only one");
        assert_eq!(drafts[1].question_type, QuestionType::SingleChoice);
        assert_eq!(drafts[1].text, heuristic::MCQ_PROMPT);
        assert_eq!(drafts[2].question_type, QuestionType::TrueFalse);
        assert_eq!(
            drafts.iter().map(|d| d.ord).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[tokio::test]
    async fn items_with_unusable_choice_sets_are_skipped_then_backfilled() {
        // MCQ with no marked answer cannot be graded; it is skipped and the
        // quota is filled heuristically.
        let content = r#"[{"text": "Broken", "type": "mcq", "choices": [
            {"text": "a"}, {"text": "b"}
        ]}]"#;
        let counts = DraftCounts {
            mcq: 1,
            tf: 0,
            text: 0,
        };
        let drafts = generate_with_delegate(&Canned(content), "text", &sentences(4), counts).await;

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].text, heuristic::MCQ_PROMPT);
    }
}
