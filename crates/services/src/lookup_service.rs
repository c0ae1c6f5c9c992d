use std::sync::Arc;

use tiku_core::matching::close_matches;
use tiku_core::model::{Question, QuestionBank, QuestionId};
use tracing::debug;

/// Most fuzzy matches returned when no stem contains the keyword.
pub const FUZZY_LIMIT: usize = 3;
/// Minimum similarity for a fuzzy match.
pub const FUZZY_CUTOFF: f64 = 0.2;

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupHit {
    pub id: QuestionId,
    pub stem: String,
    pub answer: String,
    /// True when found by similarity rather than substring.
    pub fuzzy: bool,
}

impl LookupHit {
    fn from_entry(entry: &Question, fuzzy: bool) -> Self {
        Self {
            id: entry.id(),
            stem: entry.stem().to_string(),
            answer: entry.reference_answer().to_string(),
            fuzzy,
        }
    }
}

/// Keyword search over the lookup entries of a bank.
#[derive(Clone)]
pub struct LookupService {
    bank: Arc<QuestionBank>,
}

impl LookupService {
    #[must_use]
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self { bank }
    }

    /// Entries whose stem contains `keyword`, in bank order. Without any,
    /// up to [`FUZZY_LIMIT`] similar stems, best first. A blank keyword finds
    /// nothing.
    #[must_use]
    pub fn search(&self, keyword: &str) -> Vec<LookupHit> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Vec::new();
        }
        let entries = self.bank.lookup_entries();

        let exact: Vec<LookupHit> = entries
            .iter()
            .filter(|entry| entry.stem().contains(keyword))
            .map(|entry| LookupHit::from_entry(entry, false))
            .collect();
        if !exact.is_empty() {
            debug!(keyword, hits = exact.len(), "substring search");
            return exact;
        }

        let stems = close_matches(
            keyword,
            entries.iter().map(Question::stem),
            FUZZY_LIMIT,
            FUZZY_CUTOFF,
        );
        debug!(keyword, hits = stems.len(), "fuzzy search");
        stems
            .into_iter()
            .filter_map(|stem| entries.iter().find(|entry| entry.stem() == stem))
            .map(|entry| LookupHit::from_entry(entry, true))
            .collect()
    }

    /// Reference answer for an exact stem, if the bank has one.
    #[must_use]
    pub fn answer_for(&self, stem: &str) -> Option<&str> {
        self.bank.lookup_answer(stem.trim())
    }
}
