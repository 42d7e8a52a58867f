//! Messages exchanged with whatever hosts the search.

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::searcher::{Candidate, Progress};

/// Starts a search. Everything except the id mirrors [`SearchConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub search_id: u64,
    pub words: Vec<String>,
    #[serde(default)]
    pub min_len: Option<usize>,
    #[serde(default)]
    pub max_len: Option<usize>,
    pub word_constraints: Vec<bool>,
    #[serde(default)]
    pub use_stats: bool,
    #[serde(default)]
    pub greedy_stats_pruning: bool,
}

impl SearchRequest {
    /// A missing minimum length becomes 0 and is raised during validation.
    pub fn config(&self) -> SearchConfig {
        SearchConfig {
            words: self.words.clone(),
            word_constraints: self.word_constraints.clone(),
            min_len: self.min_len.unwrap_or(0),
            max_len: self.max_len,
            use_stats: self.use_stats,
            greedy_stats_pruning: self.greedy_stats_pruning,
        }
    }
}

/// Partial results after one slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchUpdate {
    pub search_id: u64,
    pub results: Vec<Candidate>,
    pub progress: Progress,
    /// Set once the enumerator has run out of candidates
    pub finished: bool,
}

impl SearchUpdate {
    pub fn is_complete(&self) -> bool {
        self.finished
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_id: Option<u64>,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Update(SearchUpdate),
    Error(SearchFailure),
}

impl Response {
    pub fn failure(search_id: Option<u64>, err: &SearchError) -> Self {
        Response::Error(SearchFailure {
            search_id,
            error: err.to_string(),
        })
    }

    pub fn search_id(&self) -> Option<u64> {
        match self {
            Response::Update(update) => Some(update.search_id),
            Response::Error(failure) => failure.search_id,
        }
    }
}
