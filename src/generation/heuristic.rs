// src/generation/heuristic.rs

use crate::models::question::{DraftChoice, QuestionDraft, QuestionType};

pub const MCQ_PROMPT: &str = "Which of the following statements is supported by the text?";

/// Pads MCQ drafts when the sentence pool cannot supply three distractors.
const GENERIC_DISTRACTORS: [&str; 3] = [
    "None of the above statements appears in the text.",
    "The text does not take a position on this.",
    "This statement contradicts the source material.",
];

/// Choice text longer than this is cut and given an ellipsis.
const CHOICE_TEXT_LIMIT: usize = 140;

/// Requested number of drafts per question type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DraftCounts {
    pub mcq: usize,
    pub tf: usize,
    pub text: usize,
}

impl DraftCounts {
    pub fn is_empty(&self) -> bool {
        self.mcq == 0 && self.tf == 0 && self.text == 0
    }
}

/// Generates drafts from candidate sentences without AI delegation.
///
/// Sentence pools are disjoint slices: text drafts consume the first
/// `text` sentences, MCQ drafts the next `mcq`, true/false the `tf` after
/// that. Running out of sentences yields fewer drafts, never an error.
/// Output order is MCQ, then true/false, then text, renumbered 0..n-1.
pub fn generate(sentences: &[String], counts: DraftCounts) -> Vec<QuestionDraft> {
    let text_pool = &sentences[..counts.text.min(sentences.len())];
    let rest = &sentences[text_pool.len()..];
    let mcq_pool = &rest[..counts.mcq.min(rest.len())];
    let rest = &rest[mcq_pool.len()..];
    let tf_pool = &rest[..counts.tf.min(rest.len())];

    let mut drafts = Vec::new();
    drafts.extend(mcq_drafts(mcq_pool, counts.mcq));
    drafts.extend(tf_drafts(tf_pool, counts.tf));
    drafts.extend(text_drafts(text_pool, counts.text));
    renumber(&mut drafts);
    drafts
}

/// Rewrites ordering indices to a contiguous 0..n-1 run.
pub fn renumber(drafts: &mut [QuestionDraft]) {
    for (i, draft) in drafts.iter_mut().enumerate() {
        draft.ord = i as i32;
    }
}

fn mcq_drafts(pool: &[String], requested: usize) -> Vec<QuestionDraft> {
    let slots = requested.min(pool.len());
    let mut drafts = Vec::with_capacity(slots);

    for slot in 0..slots {
        let idx = slot % pool.len();
        let correct = &pool[idx];

        // Scan forward circularly for distractors, skipping duplicates of
        // the correct sentence.
        let mut distractors: Vec<&str> = Vec::new();
        for offset in 1..pool.len() {
            let candidate = &pool[(idx + offset) % pool.len()];
            if candidate == correct {
                continue;
            }
            distractors.push(candidate);
            if distractors.len() == 3 {
                break;
            }
        }
        let mut pad = GENERIC_DISTRACTORS.iter().copied();
        while distractors.len() < 3 {
            // The generic pool has exactly as many entries as slots to fill.
            distractors.push(pad.next().unwrap());
        }

        let mut choices = vec![DraftChoice {
            text: clamp_choice(correct),
            is_correct: true,
            ord: 0,
        }];
        choices.extend(distractors.into_iter().enumerate().map(|(i, text)| {
            DraftChoice {
                text: clamp_choice(text),
                is_correct: false,
                ord: i as i32 + 1,
            }
        }));

        drafts.push(QuestionDraft {
            text: MCQ_PROMPT.to_string(),
            question_type: QuestionType::SingleChoice,
            ord: 0,
            choices,
        });
    }

    drafts
}

fn tf_drafts(pool: &[String], requested: usize) -> Vec<QuestionDraft> {
    let slots = requested.min(pool.len());
    let mut drafts = Vec::with_capacity(slots);

    for slot in 0..slots {
        let statement = &pool[slot % pool.len()];
        // Even slots assert the statement as true, odd slots as false.
        let asserted_true = slot % 2 == 0;

        drafts.push(QuestionDraft {
            text: format!("True or False: {statement}"),
            question_type: QuestionType::TrueFalse,
            ord: 0,
            choices: true_false_pair(asserted_true),
        });
    }

    drafts
}

fn text_drafts(pool: &[String], requested: usize) -> Vec<QuestionDraft> {
    pool.iter()
        .filter(|s| !s.trim().is_empty())
        .take(requested)
        .map(|sentence| QuestionDraft {
            text: format!("Explain in your own words: {sentence}"),
            question_type: QuestionType::FreeText,
            ord: 0,
            choices: Vec::new(),
        })
        .collect()
}

/// The canonical two-choice pair for a true/false question.
pub fn true_false_pair(true_is_correct: bool) -> Vec<DraftChoice> {
    vec![
        DraftChoice {
            text: "True".to_string(),
            is_correct: true_is_correct,
            ord: 0,
        },
        DraftChoice {
            text: "False".to_string(),
            is_correct: !true_is_correct,
            ord: 1,
        },
    ]
}

fn clamp_choice(text: &str) -> String {
    if text.chars().count() > CHOICE_TEXT_LIMIT {
        let mut out: String = text.chars().take(CHOICE_TEXT_LIMIT).collect();
        out.push('…');
        out
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("Sentence number {i} is long enough to survive."))
            .collect()
    }

    #[test]
    fn mixed_request_produces_contiguous_typed_groups() {
        let drafts = generate(
            &sentences(10),
            DraftCounts {
                mcq: 2,
                tf: 1,
                text: 0,
            },
        );

        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0].question_type, QuestionType::SingleChoice);
        assert_eq!(drafts[1].question_type, QuestionType::SingleChoice);
        assert_eq!(drafts[2].question_type, QuestionType::TrueFalse);
        assert_eq!(
            drafts.iter().map(|d| d.ord).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        for mcq in &drafts[..2] {
            assert_eq!(mcq.text, MCQ_PROMPT);
            assert_eq!(mcq.choices.len(), 4);
            assert_eq!(mcq.choices.iter().filter(|c| c.is_correct).count(), 1);
            assert!(mcq.choices[0].is_correct);
        }
        let tf = &drafts[2];
        assert_eq!(tf.choices.len(), 2);
        assert_eq!(tf.choices.iter().filter(|c| c.is_correct).count(), 1);
    }

    #[test]
    fn pools_do_not_overlap() {
        let pool = sentences(6);
        let drafts = generate(
            &pool,
            DraftCounts {
                mcq: 2,
                tf: 2,
                text: 2,
            },
        );

        // Text drafts take the first two sentences, MCQ the next two,
        // true/false the two after that.
        let texts: Vec<&str> = drafts
            .iter()
            .filter(|d| d.question_type == QuestionType::FreeText)
            .map(|d| d.text.as_str())
            .collect();
        assert!(texts[0].contains("number 0"));
        assert!(texts[1].contains("number 1"));

        let mcq_correct: Vec<&str> = drafts
            .iter()
            .filter(|d| d.question_type == QuestionType::SingleChoice)
            .map(|d| d.choices[0].text.as_str())
            .collect();
        assert!(mcq_correct[0].contains("number 2"));
        assert!(mcq_correct[1].contains("number 3"));

        let tf_texts: Vec<&str> = drafts
            .iter()
            .filter(|d| d.question_type == QuestionType::TrueFalse)
            .map(|d| d.text.as_str())
            .collect();
        assert!(tf_texts[0].contains("number 4"));
        assert!(tf_texts[1].contains("number 5"));
    }

    #[test]
    fn true_false_alternates_by_slot_parity() {
        let drafts = generate(
            &sentences(4),
            DraftCounts {
                mcq: 0,
                tf: 4,
                text: 0,
            },
        );
        let truth: Vec<bool> = drafts
            .iter()
            .map(|d| d.choices.iter().find(|c| c.text == "True").unwrap().is_correct)
            .collect();
        assert_eq!(truth, vec![true, false, true, false]);
    }

    #[test]
    fn running_out_of_sentences_yields_fewer_drafts() {
        let drafts = generate(
            &sentences(3),
            DraftCounts {
                mcq: 5,
                tf: 5,
                text: 2,
            },
        );
        // Two text drafts, one MCQ from the single remaining sentence, no
        // sentences left for true/false.
        assert_eq!(
            drafts
                .iter()
                .filter(|d| d.question_type == QuestionType::FreeText)
                .count(),
            2
        );
        assert_eq!(
            drafts
                .iter()
                .filter(|d| d.question_type == QuestionType::SingleChoice)
                .count(),
            1
        );
        assert_eq!(
            drafts
                .iter()
                .filter(|d| d.question_type == QuestionType::TrueFalse)
                .count(),
            0
        );
    }

    #[test]
    fn lone_mcq_sentence_is_padded_with_generic_distractors() {
        let drafts = generate(
            &sentences(1),
            DraftCounts {
                mcq: 1,
                tf: 0,
                text: 0,
            },
        );
        assert_eq!(drafts.len(), 1);
        let choices = &drafts[0].choices;
        assert_eq!(choices.len(), 4);
        assert!(choices[0].is_correct);
        for generic in &choices[1..] {
            assert!(GENERIC_DISTRACTORS.contains(&generic.text.as_str()));
        }
    }

    #[test]
    fn long_choice_text_is_truncated_with_ellipsis() {
        let long = vec!["x".repeat(200) + " and that was a very long sentence indeed"];
        let drafts = generate(
            &long,
            DraftCounts {
                mcq: 1,
                tf: 0,
                text: 0,
            },
        );
        let correct = &drafts[0].choices[0];
        assert_eq!(correct.text.chars().count(), 141);
        assert!(correct.text.ends_with('…'));
    }

    #[test]
    fn empty_sentence_list_yields_no_drafts() {
        let drafts = generate(
            &[],
            DraftCounts {
                mcq: 3,
                tf: 3,
                text: 3,
            },
        );
        assert!(drafts.is_empty());
    }
}
