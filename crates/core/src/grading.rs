//! Per-variant answer grading.
//!
//! Every strategy is a pure function of the submitted text and the stored
//! reference answer. Blank submissions never reach a strategy: [`grade`]
//! rejects them with [`GradingError::MissingAnswer`].

use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::{PoolKind, Question, QuestionBody, Submission};

/// Share of reference blanks that must be matched for a fill-blank answer to pass.
pub const FILL_BLANK_PASS_RATIO: f64 = 0.8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GradingError {
    #[error("no answer was submitted")]
    MissingAnswer,
    #[error("a {shape} answer does not fit a {pool} question")]
    Mismatch { pool: PoolKind, shape: &'static str },
}

/// Outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graded {
    pub is_correct: bool,
    /// Submission in the normalized form the strategy compared.
    pub submitted: String,
    /// Stored reference answer.
    pub reference: String,
}

/// Grades `submission` against `question` with the strategy for its variant.
///
/// # Errors
///
/// Returns `GradingError::MissingAnswer` for blank submissions and
/// `GradingError::Mismatch` when the submission shape cannot answer the variant.
pub fn grade(question: &Question, submission: &Submission) -> Result<Graded, GradingError> {
    if submission.is_blank() {
        return Err(GradingError::MissingAnswer);
    }
    let mismatch = || GradingError::Mismatch {
        pool: question.pool_kind(),
        shape: submission.shape(),
    };
    let reference = question.reference_answer();

    let (is_correct, submitted) = match (question.body(), submission) {
        (QuestionBody::SingleChoice { .. }, Submission::Text(text)) => {
            let submitted = normalize_letter(text);
            (grade_single_choice(&submitted, reference), submitted)
        }
        (QuestionBody::SingleChoice { .. }, Submission::Letters(keys)) => {
            let submitted: String = keys.iter().map(|k| k.as_char()).collect();
            (grade_single_choice(&submitted, reference), submitted)
        }
        (QuestionBody::MultiChoice { .. }, Submission::Letters(keys)) => {
            let set: BTreeSet<char> = keys.iter().map(|k| k.as_char()).collect();
            (grade_multi_choice(&set, reference), set.into_iter().collect())
        }
        (QuestionBody::MultiChoice { .. }, Submission::Text(text)) => {
            let set = parse_letter_set(text);
            if set.is_empty() {
                return Err(GradingError::MissingAnswer);
            }
            (grade_multi_choice(&set, reference), set.into_iter().collect())
        }
        (QuestionBody::FillBlank { .. }, Submission::Text(text)) => {
            (grade_fill_blank(text, reference), text.trim().to_string())
        }
        (QuestionBody::TrueFalse { .. }, Submission::Verdict(verdict)) => {
            let token = verdict.token();
            (grade_true_false(token, reference), token.to_string())
        }
        (QuestionBody::TrueFalse { .. }, Submission::Text(text)) => {
            (grade_true_false(text, reference), text.trim().to_string())
        }
        (QuestionBody::LookupEntry { .. }, Submission::Text(text)) => {
            (grade_lookup(text, reference), text.trim().to_string())
        }
        _ => return Err(mismatch()),
    };

    Ok(Graded {
        is_correct,
        submitted,
        reference: reference.to_string(),
    })
}

/// Single choice: equal letters, ignoring case and whitespace.
#[must_use]
pub fn grade_single_choice(submitted: &str, reference: &str) -> bool {
    normalize_letter(submitted) == normalize_letter(reference)
}

/// Multi choice: the checked set must equal the reference set exactly.
#[must_use]
pub fn grade_multi_choice(submitted: &BTreeSet<char>, reference: &str) -> bool {
    *submitted == parse_letter_set(reference)
}

/// Fill blank: lenient containment match per blank with an 80% pass mark.
///
/// Each submitted part counts once if it contains, or is contained in, any
/// reference part. The same reference part may satisfy several submitted parts.
#[must_use]
pub fn grade_fill_blank(submitted: &str, reference: &str) -> bool {
    let reference_parts: Vec<String> = split_blanks(reference).collect();
    let matched = split_blanks(submitted)
        .filter(|part| {
            reference_parts
                .iter()
                .any(|r| r.contains(part.as_str()) || part.contains(r.as_str()))
        })
        .count();

    #[allow(clippy::cast_precision_loss)]
    let threshold = reference_parts.len() as f64 * FILL_BLANK_PASS_RATIO;
    #[allow(clippy::cast_precision_loss)]
    let matched = matched as f64;
    matched >= threshold
}

/// True/false: the trimmed token must equal the stored token.
#[must_use]
pub fn grade_true_false(submitted: &str, reference: &str) -> bool {
    submitted.trim() == reference.trim()
}

/// Free-text lookup: the submission must appear inside the reference answer.
#[must_use]
pub fn grade_lookup(submitted: &str, reference: &str) -> bool {
    let submitted = submitted.trim().to_lowercase();
    let reference = reference.trim().to_lowercase();
    reference.contains(&submitted)
}

fn normalize_letter(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Letters of a stored multi-choice answer such as `"A, C"` or `"ac"`.
#[must_use]
pub fn parse_letter_set(raw: &str) -> BTreeSet<char> {
    raw.trim()
        .chars()
        .filter(|c| *c != ',' && *c != ' ')
        .flat_map(char::to_uppercase)
        .collect()
}

fn split_blanks(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.trim().split('|').map(|part| part.trim().to_lowercase())
}
