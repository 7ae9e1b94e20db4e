// src/grading.rs

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::models::question::{Choice, QuestionType, QuestionWithChoices};

/// A learner's response for one question, as it arrives on the wire.
///
/// The same logical field carries a single choice id, a list of ids, free
/// text, or a bool-like value depending on the question type; the variants
/// keep that shape explicit instead of passing raw JSON through.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<AnswerValue>),
}

impl AnswerValue {
    /// Single choice id: an integer, or a string holding one.
    fn as_choice_id(&self) -> Option<i64> {
        match self {
            AnswerValue::Int(n) => Some(*n),
            AnswerValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Set of choice ids from a list answer. Non-id elements are dropped;
    /// non-list answers are `None` (graded as incorrect).
    fn as_choice_ids(&self) -> Option<HashSet<i64>> {
        match self {
            AnswerValue::List(items) => {
                Some(items.iter().filter_map(AnswerValue::as_choice_id).collect())
            }
            _ => None,
        }
    }

    /// Bool coercion: "true"/"1"/"yes" (case-insensitive) are true and any
    /// other string is false; numeric zero is false, nonzero true; lists are
    /// never true.
    fn as_bool(&self) -> bool {
        match self {
            AnswerValue::Bool(b) => *b,
            AnswerValue::Int(n) => *n != 0,
            AnswerValue::Float(f) => *f != 0.0,
            AnswerValue::Text(s) => {
                matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
            }
            AnswerValue::List(_) => false,
        }
    }
}

/// Result of grading one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeOutcome {
    pub correct: i32,
    pub total: i32,
    pub percentage: i32,
}

/// The key under which a question's answer is submitted.
pub fn answer_key(question_id: i64) -> String {
    format!("question_{}", question_id)
}

/// Grades a submission against a quiz's loaded question set.
///
/// Pure function: free-text questions are excluded from both counts, bad
/// learner input never errors (it just earns no credit), and the percentage
/// rounds half away from zero (5 of 8 -> 63).
pub fn grade(
    questions: &[QuestionWithChoices],
    answers: &HashMap<String, AnswerValue>,
) -> GradeOutcome {
    let mut correct = 0i32;
    let mut total = 0i32;

    for qwc in questions {
        let Some(kind) = QuestionType::parse(&qwc.question.question_type) else {
            continue;
        };
        if !kind.is_autograded() {
            continue;
        }
        total += 1;

        let answer = answers.get(&answer_key(qwc.question.id));
        if is_credited(kind, &qwc.choices, answer) {
            correct += 1;
        }
    }

    let percentage = if total > 0 {
        (f64::from(correct) / f64::from(total) * 100.0).round() as i32
    } else {
        0
    };

    GradeOutcome {
        correct,
        total,
        percentage,
    }
}

fn is_credited(kind: QuestionType, choices: &[Choice], answer: Option<&AnswerValue>) -> bool {
    match kind {
        QuestionType::SingleChoice => {
            let Some(id) = answer.and_then(AnswerValue::as_choice_id) else {
                return false;
            };
            choices.iter().any(|c| c.id == id && c.is_correct)
        }
        QuestionType::MultiChoice => {
            let Some(selected) = answer.and_then(AnswerValue::as_choice_ids) else {
                return false;
            };
            let own_ids: HashSet<i64> = choices.iter().map(|c| c.id).collect();
            let selected: HashSet<i64> = selected.intersection(&own_ids).copied().collect();
            let correct_ids: HashSet<i64> = choices
                .iter()
                .filter(|c| c.is_correct)
                .map(|c| c.id)
                .collect();
            selected == correct_ids
        }
        QuestionType::TrueFalse => {
            // Truth value lives on the first choice by ordering index.
            let Some(first) = choices.iter().min_by_key(|c| (c.ord, c.id)) else {
                return false;
            };
            let Some(answer) = answer else {
                return false;
            };
            answer.as_bool() == first.is_correct
        }
        QuestionType::FreeText => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Question;

    fn question(id: i64, question_type: &str, choices: Vec<Choice>) -> QuestionWithChoices {
        QuestionWithChoices {
            question: Question {
                id,
                quiz_id: 1,
                text: format!("question {id}"),
                question_type: question_type.to_string(),
                ord: id as i32,
            },
            choices,
        }
    }

    fn choice(id: i64, question_id: i64, is_correct: bool, ord: i32) -> Choice {
        Choice {
            id,
            question_id,
            text: format!("choice {id}"),
            is_correct,
            ord,
        }
    }

    fn answers(pairs: Vec<(i64, AnswerValue)>) -> HashMap<String, AnswerValue> {
        pairs
            .into_iter()
            .map(|(id, v)| (answer_key(id), v))
            .collect()
    }

    #[test]
    fn single_choice_correct_id_earns_credit() {
        let q = question(
            1,
            "single_choice",
            vec![
                choice(10, 1, true, 0),
                choice(11, 1, false, 1),
                choice(12, 1, false, 2),
                choice(13, 1, false, 3),
            ],
        );
        let out = grade(&[q], &answers(vec![(1, AnswerValue::Int(10))]));
        assert_eq!(
            out,
            GradeOutcome {
                correct: 1,
                total: 1,
                percentage: 100
            }
        );
    }

    #[test]
    fn single_choice_accepts_string_form_of_id() {
        let q = question(
            1,
            "single_choice",
            vec![choice(10, 1, true, 0), choice(11, 1, false, 1)],
        );
        let out = grade(
            &[q],
            &answers(vec![(1, AnswerValue::Text("10".to_string()))]),
        );
        assert_eq!(out.correct, 1);
    }

    #[test]
    fn single_choice_wrong_foreign_or_missing_ids_earn_nothing() {
        let q = || {
            question(
                1,
                "single_choice",
                vec![choice(10, 1, true, 0), choice(11, 1, false, 1)],
            )
        };

        // Wrong choice.
        assert_eq!(
            grade(&[q()], &answers(vec![(1, AnswerValue::Int(11))])).correct,
            0
        );
        // Id belonging to no choice of this question.
        assert_eq!(
            grade(&[q()], &answers(vec![(1, AnswerValue::Int(999))])).correct,
            0
        );
        // Unparseable answer.
        assert_eq!(
            grade(
                &[q()],
                &answers(vec![(1, AnswerValue::Text("banana".to_string()))])
            )
            .correct,
            0
        );
        // Missing answer is incorrect, not an error.
        let out = grade(&[q()], &HashMap::new());
        assert_eq!(
            out,
            GradeOutcome {
                correct: 0,
                total: 1,
                percentage: 0
            }
        );
    }

    #[test]
    fn multi_choice_requires_exact_set_match() {
        let q = || {
            question(
                2,
                "multi_choice",
                vec![
                    choice(20, 2, true, 0),  // A
                    choice(21, 2, false, 1), // B
                    choice(22, 2, true, 2),  // C
                ],
            )
        };
        let list = |ids: &[i64]| AnswerValue::List(ids.iter().map(|&i| AnswerValue::Int(i)).collect());

        // Exact match is credited.
        assert_eq!(grade(&[q()], &answers(vec![(2, list(&[20, 22]))])).correct, 1);
        // Superset (extra incorrect choice) is not.
        assert_eq!(
            grade(&[q()], &answers(vec![(2, list(&[20, 21, 22]))])).correct,
            0
        );
        // Subset is not.
        assert_eq!(grade(&[q()], &answers(vec![(2, list(&[20]))])).correct, 0);
        // Ids from other questions do not resolve and cannot spoil the match.
        assert_eq!(
            grade(&[q()], &answers(vec![(2, list(&[20, 22, 999]))])).correct,
            1
        );
        // Non-collection answer is incorrect.
        assert_eq!(
            grade(&[q()], &answers(vec![(2, AnswerValue::Int(20))])).correct,
            0
        );
    }

    #[test]
    fn true_false_bool_coercion_forms_are_equivalent() {
        let q = || {
            question(
                3,
                "true_false",
                vec![choice(30, 3, true, 0), choice(31, 3, false, 1)],
            )
        };

        for truthy in [
            AnswerValue::Bool(true),
            AnswerValue::Int(1),
            AnswerValue::Int(-7),
            AnswerValue::Text("true".to_string()),
            AnswerValue::Text("True".to_string()),
            AnswerValue::Text("YES".to_string()),
            AnswerValue::Text("1".to_string()),
        ] {
            assert_eq!(
                grade(&[q()], &answers(vec![(3, truthy.clone())])).correct,
                1,
                "{truthy:?} should coerce to true"
            );
        }

        for falsy in [
            AnswerValue::Bool(false),
            AnswerValue::Int(0),
            AnswerValue::Text("false".to_string()),
            AnswerValue::Text("no".to_string()),
            AnswerValue::Text("anything else".to_string()),
            AnswerValue::List(vec![]),
        ] {
            assert_eq!(
                grade(&[q()], &answers(vec![(3, falsy.clone())])).correct,
                0,
                "{falsy:?} should coerce to false"
            );
        }
    }

    #[test]
    fn true_false_with_zero_choices_is_never_correct() {
        let q = question(3, "true_false", vec![]);
        let out = grade(&[q], &answers(vec![(3, AnswerValue::Bool(true))]));
        assert_eq!(out.correct, 0);
        assert_eq!(out.total, 1);
    }

    #[test]
    fn free_text_is_excluded_from_totals() {
        let free = question(4, "free_text", vec![]);
        let single = question(
            5,
            "single_choice",
            vec![choice(50, 5, true, 0), choice(51, 5, false, 1)],
        );
        let out = grade(
            &[free, single],
            &answers(vec![
                (4, AnswerValue::Text("a thoughtful essay".to_string())),
                (5, AnswerValue::Int(50)),
            ]),
        );
        assert_eq!(
            out,
            GradeOutcome {
                correct: 1,
                total: 1,
                percentage: 100
            }
        );
    }

    #[test]
    fn empty_quiz_grades_to_zero_percentage() {
        let out = grade(&[], &HashMap::new());
        assert_eq!(
            out,
            GradeOutcome {
                correct: 0,
                total: 0,
                percentage: 0
            }
        );
    }

    #[test]
    fn percentage_rounds_half_away_from_zero() {
        // 5 of 8 = 62.5 -> 63.
        let questions: Vec<QuestionWithChoices> = (1..=8)
            .map(|id| {
                question(
                    id,
                    "single_choice",
                    vec![choice(id * 10, id, true, 0), choice(id * 10 + 1, id, false, 1)],
                )
            })
            .collect();
        let submitted = answers(
            (1..=5)
                .map(|id| (id, AnswerValue::Int(id * 10)))
                .collect::<Vec<_>>(),
        );
        let out = grade(&questions, &submitted);
        assert_eq!(out.correct, 5);
        assert_eq!(out.total, 8);
        assert_eq!(out.percentage, 63);
    }
}
