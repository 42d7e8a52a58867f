use std::sync::Arc;

use crate::bigram::BigramModel;
use crate::combinatorics::CombinationCounter;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::results::ResultSet;
use crate::searcher::{Candidate, Progress, Searcher};

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Best first
    pub results: Vec<Candidate>,
    pub progress: Progress,
    /// Candidates produced by the enumerator, kept or not
    pub scanned: u64,
}

/// Run a search to exhaustion without slicing and keep the best `capacity`
/// candidates.
pub fn search_to_completion(
    config: &SearchConfig,
    model: Option<Arc<BigramModel>>,
    capacity: usize,
) -> Result<SearchOutcome> {
    let mut searcher = Searcher::new(config, model)?;
    let mut results = ResultSet::new(capacity);
    while let Some(candidate) = searcher.next_candidate()? {
        results.add(candidate);
    }
    let mut counter = CombinationCounter::new();
    Ok(SearchOutcome {
        progress: searcher.progress(&mut counter),
        scanned: searcher.emitted(),
        results: results.into_vec(),
    })
}
