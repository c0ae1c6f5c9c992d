use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Substring of a choice row's type label that marks a multi-select question.
pub const MULTI_CHOICE_MARKER: &str = "多选";

/// Type label assumed for choice rows that carry none.
pub const DEFAULT_CHOICE_LABEL: &str = "单选题";

//
// ─── POOL KIND ─────────────────────────────────────────────────────────────────
//

/// Which pool of the bank a question (and a session) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Choice,
    Fill,
    Judge,
    /// Free-text entries used by search and custom review.
    Lookup,
}

impl PoolKind {
    /// Pools that can be drawn for a scored practice session.
    pub const PRACTICE: [PoolKind; 3] = [PoolKind::Choice, PoolKind::Fill, PoolKind::Judge];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            PoolKind::Choice => "choice",
            PoolKind::Fill => "fill",
            PoolKind::Judge => "judge",
            PoolKind::Lookup => "lookup",
        }
    }

    /// Display label shown to the user.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PoolKind::Choice => "选择题",
            PoolKind::Fill => "填空题",
            PoolKind::Judge => "判断题",
            PoolKind::Lookup => "自定义题目",
        }
    }

    /// Whether correct answers in this pool add to a session score.
    #[must_use]
    pub fn is_scored(self) -> bool {
        !matches!(self, PoolKind::Lookup)
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown question pool: {0}")]
pub struct UnknownPoolKind(pub String);

impl FromStr for PoolKind {
    type Err = UnknownPoolKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "choice" => Ok(PoolKind::Choice),
            "fill" => Ok(PoolKind::Fill),
            "judge" => Ok(PoolKind::Judge),
            "lookup" => Ok(PoolKind::Lookup),
            other => Err(UnknownPoolKind(other.to_string())),
        }
    }
}

//
// ─── CHOICE OPTIONS ────────────────────────────────────────────────────────────
//

/// Option slot of a choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChoiceKey {
    A,
    B,
    C,
    D,
}

impl ChoiceKey {
    pub const ALL: [ChoiceKey; 4] = [ChoiceKey::A, ChoiceKey::B, ChoiceKey::C, ChoiceKey::D];

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            ChoiceKey::A => 'A',
            ChoiceKey::B => 'B',
            ChoiceKey::C => 'C',
            ChoiceKey::D => 'D',
        }
    }

    /// Parses a letter, ignoring case.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(ChoiceKey::A),
            'B' => Some(ChoiceKey::B),
            'C' => Some(ChoiceKey::C),
            'D' => Some(ChoiceKey::D),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        match self {
            ChoiceKey::A => 0,
            ChoiceKey::B => 1,
            ChoiceKey::C => 2,
            ChoiceKey::D => 3,
        }
    }
}

/// Sparse A–D option texts. Absent or blank options are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOptions([Option<String>; 4]);

impl ChoiceOptions {
    #[must_use]
    pub fn new(
        a: Option<String>,
        b: Option<String>,
        c: Option<String>,
        d: Option<String>,
    ) -> Self {
        Self([a, b, c, d].map(|opt| opt.and_then(|text| clean_cell(&text))))
    }

    #[must_use]
    pub fn get(&self, key: ChoiceKey) -> Option<&str> {
        self.0[key.slot()].as_deref()
    }

    /// Present options in A–D order.
    pub fn iter(&self) -> impl Iterator<Item = (ChoiceKey, &str)> + '_ {
        ChoiceKey::ALL
            .into_iter()
            .filter_map(|key| self.get(key).map(|text| (key, text)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//
// ─── VERDICT ───────────────────────────────────────────────────────────────────
//

/// One of the two literal tokens a true/false question accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    True,
    False,
}

impl Verdict {
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Verdict::True => "对",
            Verdict::False => "错",
        }
    }

    /// Parses the stored token; only the exact literals are accepted.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "对" => Some(Verdict::True),
            "错" => Some(Verdict::False),
            _ => None,
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Variant-specific part of a question. Reference answers are kept as stored;
/// a missing answer is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum QuestionBody {
    SingleChoice { options: ChoiceOptions, answer: String },
    MultiChoice { options: ChoiceOptions, answer: String },
    /// One acceptable string per blank, joined by `|`.
    FillBlank { answer: String },
    TrueFalse { answer: String },
    LookupEntry { answer: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    stem: String,
    body: QuestionBody,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, stem: impl Into<String>, body: QuestionBody) -> Self {
        Self {
            id,
            stem: stem.into(),
            body,
        }
    }

    /// Builds a choice question; the type label decides single vs multi select.
    #[must_use]
    pub fn choice(
        id: QuestionId,
        stem: impl Into<String>,
        options: ChoiceOptions,
        answer: Option<String>,
        type_label: Option<&str>,
    ) -> Self {
        let answer = answer.unwrap_or_default().trim().to_string();
        let label = type_label.unwrap_or(DEFAULT_CHOICE_LABEL);
        let body = if label.contains(MULTI_CHOICE_MARKER) {
            QuestionBody::MultiChoice { options, answer }
        } else {
            QuestionBody::SingleChoice { options, answer }
        };
        Self::new(id, stem, body)
    }

    #[must_use]
    pub fn fill_blank(id: QuestionId, stem: impl Into<String>, answer: Option<String>) -> Self {
        let answer = answer.unwrap_or_default().trim().to_string();
        Self::new(id, stem, QuestionBody::FillBlank { answer })
    }

    #[must_use]
    pub fn true_false(id: QuestionId, stem: impl Into<String>, answer: Option<String>) -> Self {
        let answer = answer.unwrap_or_default().trim().to_string();
        Self::new(id, stem, QuestionBody::TrueFalse { answer })
    }

    #[must_use]
    pub fn lookup(id: QuestionId, stem: impl Into<String>, answer: Option<String>) -> Self {
        let answer = answer.unwrap_or_default();
        Self::new(id, stem, QuestionBody::LookupEntry { answer })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    #[must_use]
    pub fn body(&self) -> &QuestionBody {
        &self.body
    }

    /// The stored reference answer.
    #[must_use]
    pub fn reference_answer(&self) -> &str {
        match &self.body {
            QuestionBody::SingleChoice { answer, .. }
            | QuestionBody::MultiChoice { answer, .. }
            | QuestionBody::FillBlank { answer }
            | QuestionBody::TrueFalse { answer }
            | QuestionBody::LookupEntry { answer } => answer,
        }
    }

    #[must_use]
    pub fn options(&self) -> Option<&ChoiceOptions> {
        match &self.body {
            QuestionBody::SingleChoice { options, .. } | QuestionBody::MultiChoice { options, .. } => {
                Some(options)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn pool_kind(&self) -> PoolKind {
        match self.body {
            QuestionBody::SingleChoice { .. } | QuestionBody::MultiChoice { .. } => PoolKind::Choice,
            QuestionBody::FillBlank { .. } => PoolKind::Fill,
            QuestionBody::TrueFalse { .. } => PoolKind::Judge,
            QuestionBody::LookupEntry { .. } => PoolKind::Lookup,
        }
    }

    #[must_use]
    pub fn is_multi_choice(&self) -> bool {
        matches!(self.body, QuestionBody::MultiChoice { .. })
    }

    /// Label describing the variant, e.g. for a badge next to the stem.
    #[must_use]
    pub fn variant_label(&self) -> &'static str {
        match self.body {
            QuestionBody::SingleChoice { .. } => "单选题",
            QuestionBody::MultiChoice { .. } => "多选题",
            QuestionBody::FillBlank { .. } => "填空题",
            QuestionBody::TrueFalse { .. } => "判断题",
            QuestionBody::LookupEntry { .. } => "问答题",
        }
    }

    /// Number of blanks a fill-blank question expects; 1 for other variants.
    #[must_use]
    pub fn blank_count(&self) -> usize {
        match &self.body {
            QuestionBody::FillBlank { answer } => answer.split('|').count(),
            _ => 1,
        }
    }
}

/// Normalizes a raw table cell: trims it and maps blank or `nan` cells to `None`.
#[must_use]
pub fn clean_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
