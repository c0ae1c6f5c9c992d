use std::collections::BTreeSet;

use crate::model::question::{ChoiceKey, Verdict};

/// A raw answer for the current question, as the presentation layer captured it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Nothing selected or typed.
    Blank,
    /// Typed text: a letter, a letter list, blanks joined by `|`, a token or free text.
    Text(String),
    /// Checked option boxes.
    Letters(BTreeSet<ChoiceKey>),
    /// A picked true/false button.
    Verdict(Verdict),
}

impl Submission {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn letters(keys: impl IntoIterator<Item = ChoiceKey>) -> Self {
        Self::Letters(keys.into_iter().collect())
    }

    /// True when nothing usable was submitted.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Submission::Blank => true,
            Submission::Text(text) => text.trim().is_empty(),
            Submission::Letters(keys) => keys.is_empty(),
            Submission::Verdict(_) => false,
        }
    }

    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            Submission::Blank => "blank",
            Submission::Text(_) => "text",
            Submission::Letters(_) => "letters",
            Submission::Verdict(_) => "verdict",
        }
    }
}

impl From<&str> for Submission {
    fn from(value: &str) -> Self {
        Submission::text(value)
    }
}

impl From<Verdict> for Submission {
    fn from(value: Verdict) -> Self {
        Submission::Verdict(value)
    }
}
