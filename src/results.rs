use hashbrown::HashSet;

use crate::searcher::Candidate;
use crate::sorted::sorted_index_by_key;

/// The best candidates seen so far, best first, unique by word.
///
/// Two position vectors spelling the same word count as one result; the
/// first one found is kept.
#[derive(Debug, Clone)]
pub struct ResultSet {
    capacity: usize,
    results: Vec<Candidate>,
    seen: HashSet<String>,
}

impl ResultSet {
    pub fn new(capacity: usize) -> Self {
        ResultSet {
            capacity,
            results: Vec::with_capacity(capacity.min(1024) + 1),
            seen: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.results.len() >= self.capacity
    }

    pub fn results(&self) -> &[Candidate] {
        &self.results
    }

    pub fn into_vec(self) -> Vec<Candidate> {
        self.results
    }

    pub fn worst_score(&self) -> Option<f64> {
        self.results.last().map(|c| c.score)
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.seen.contains(word)
    }

    /// Returns whether the candidate was kept.
    pub fn add(&mut self, candidate: Candidate) -> bool {
        if self.capacity == 0 || self.contains_word(&candidate.word) {
            return false;
        }
        if self.is_full() && matches!(self.worst_score(), Some(worst) if candidate.score <= worst) {
            return false;
        }

        let idx = sorted_index_by_key(&self.results, &candidate, |c| -c.score);
        self.seen.insert(candidate.word.clone());
        self.results.insert(idx, candidate);

        if self.results.len() > self.capacity {
            if let Some(evicted) = self.results.pop() {
                self.seen.remove(&evicted.word);
            }
        }
        true
    }
}
