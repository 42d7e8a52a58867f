use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::pool::LetterPool;

/// Everything a searcher needs besides the bigram table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    pub words: Vec<String>,
    /// One "must use" flag per word
    pub word_constraints: Vec<bool>,
    pub min_len: usize,
    /// `None` (or zero) means the whole pool
    pub max_len: Option<usize>,
    pub use_stats: bool,
    /// Abandon a subtree as soon as one pair scores below the table average
    pub greedy_stats_pruning: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            words: Vec::new(),
            word_constraints: Vec::new(),
            min_len: 3,
            max_len: None,
            use_stats: true,
            greedy_stats_pruning: true,
        }
    }
}

/// A validated configuration: the pool plus the effective length range.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchLayout {
    pub pool: LetterPool,
    pub min_len: usize,
    pub max_len: usize,
    pub use_stats: bool,
    pub greedy_stats_pruning: bool,
}

impl SearchConfig {
    pub fn new(words: Vec<String>, word_constraints: Vec<bool>) -> Self {
        Self {
            words,
            word_constraints,
            ..Self::default()
        }
    }

    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    pub fn with_max_len(mut self, max_len: Option<usize>) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn with_stats(mut self, use_stats: bool) -> Self {
        self.use_stats = use_stats;
        self
    }

    pub fn with_greedy_pruning(mut self, greedy: bool) -> Self {
        self.greedy_stats_pruning = greedy;
        self
    }

    pub fn validate(&self) -> Result<SearchLayout> {
        if self.words.is_empty() {
            return Err(SearchError::invalid_config("provide at least 1 word"));
        }
        if self.words.len() != self.word_constraints.len() {
            return Err(SearchError::invalid_config(format!(
                "number of words ({}) should equal number of constraints ({})",
                self.words.len(),
                self.word_constraints.len()
            )));
        }

        let pool = LetterPool::new(&self.words, &self.word_constraints);
        let mandatory = pool.mandatory_count();

        let mut min_len = self.min_len.max(1);
        if min_len < mandatory {
            info!(
                "raising minimum length from {} to {} to fit every mandatory word",
                min_len, mandatory
            );
            min_len = mandatory;
        }

        let max_len = match self.max_len {
            None | Some(0) => pool.len(),
            Some(max) => max,
        };
        if min_len > max_len {
            return Err(SearchError::invalid_config(format!(
                "minimum length ({min_len}) cannot be greater than maximum length ({max_len})"
            )));
        }
        if min_len > pool.len() {
            return Err(SearchError::invalid_config(format!(
                "minimum length ({min_len}) cannot be greater than the number of letters available ({})",
                pool.len()
            )));
        }

        Ok(SearchLayout {
            max_len: max_len.min(pool.len()),
            pool,
            min_len,
            use_stats: self.use_stats,
            greedy_stats_pruning: self.greedy_stats_pruning,
        })
    }
}
