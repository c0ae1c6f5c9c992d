use std::collections::{BTreeMap, HashMap};

use crate::model::ids::QuestionId;
use crate::model::question::{ChoiceOptions, PoolKind, Question, QuestionBody, clean_cell};

/// Immutable in-memory snapshot of every question a data source supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    lookup: Vec<Question>,
    pools: BTreeMap<PoolKind, Vec<Question>>,
}

impl QuestionBank {
    #[must_use]
    pub fn builder() -> QuestionBankBuilder {
        QuestionBankBuilder::default()
    }

    /// Questions of one pool in bank order. `PoolKind::Lookup` yields the lookup entries.
    #[must_use]
    pub fn pool(&self, kind: PoolKind) -> &[Question] {
        match kind {
            PoolKind::Lookup => &self.lookup,
            other => self.pools.get(&other).map_or(&[], Vec::as_slice),
        }
    }

    #[must_use]
    pub fn pool_size(&self, kind: PoolKind) -> usize {
        self.pool(kind).len()
    }

    /// Lookup entries, the free-text stem → answer table.
    #[must_use]
    pub fn lookup_entries(&self) -> &[Question] {
        &self.lookup
    }

    /// Reference answer of the lookup entry with exactly this stem.
    #[must_use]
    pub fn lookup_answer(&self, stem: &str) -> Option<&str> {
        self.lookup
            .iter()
            .find(|q| q.stem() == stem)
            .map(Question::reference_answer)
    }

    #[must_use]
    pub fn find(&self, id: QuestionId) -> Option<&Question> {
        self.lookup
            .iter()
            .chain(self.pools.values().flatten())
            .find(|q| q.id() == id)
    }

    /// Total number of questions across all pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lookup.len() + self.pools.values().map(Vec::len).sum::<usize>()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Assigns ids in insertion order while a bank is being loaded.
///
/// Rows whose stem is blank are dropped; the push methods return `None` for them.
#[derive(Debug, Default)]
pub struct QuestionBankBuilder {
    next_id: u64,
    lookup: Vec<Question>,
    lookup_by_stem: HashMap<String, usize>,
    pools: BTreeMap<PoolKind, Vec<Question>>,
}

impl QuestionBankBuilder {
    fn allocate(&mut self) -> QuestionId {
        self.next_id += 1;
        QuestionId::new(self.next_id)
    }

    /// Adds a lookup entry. A repeated stem keeps its first position and takes
    /// the latest answer.
    pub fn push_lookup(&mut self, stem: &str, answer: Option<String>) -> Option<QuestionId> {
        let stem = clean_cell(stem)?;
        let answer = answer.and_then(|a| clean_cell(&a));
        if let Some(&pos) = self.lookup_by_stem.get(&stem) {
            let existing = &self.lookup[pos];
            let id = existing.id();
            self.lookup[pos] = Question::lookup(id, stem, answer);
            return Some(id);
        }
        let id = self.allocate();
        self.lookup_by_stem.insert(stem.clone(), self.lookup.len());
        self.lookup.push(Question::lookup(id, stem, answer));
        Some(id)
    }

    pub fn push_choice(
        &mut self,
        stem: &str,
        options: ChoiceOptions,
        answer: Option<String>,
        type_label: Option<&str>,
    ) -> Option<QuestionId> {
        let stem = clean_cell(stem)?;
        let answer = answer.and_then(|a| clean_cell(&a));
        let label = type_label.and_then(clean_cell);
        let id = self.allocate();
        let question = Question::choice(id, stem, options, answer, label.as_deref());
        self.push_pool(question);
        Some(id)
    }

    pub fn push_fill(&mut self, stem: &str, answer: Option<String>) -> Option<QuestionId> {
        let stem = clean_cell(stem)?;
        let answer = answer.and_then(|a| clean_cell(&a));
        let id = self.allocate();
        self.push_pool(Question::fill_blank(id, stem, answer));
        Some(id)
    }

    pub fn push_judge(&mut self, stem: &str, answer: Option<String>) -> Option<QuestionId> {
        let stem = clean_cell(stem)?;
        let answer = answer.and_then(|a| clean_cell(&a));
        let id = self.allocate();
        self.push_pool(Question::true_false(id, stem, answer));
        Some(id)
    }

    fn push_pool(&mut self, question: Question) {
        debug_assert!(!matches!(question.body(), QuestionBody::LookupEntry { .. }));
        self.pools
            .entry(question.pool_kind())
            .or_default()
            .push(question);
    }

    #[must_use]
    pub fn build(self) -> QuestionBank {
        QuestionBank {
            lookup: self.lookup,
            pools: self.pools,
        }
    }
}
