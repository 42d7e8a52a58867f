use std::sync::Arc;

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::bigram::BigramModel;
use crate::combinatorics::CombinationCounter;
use crate::config::{SearchConfig, SearchLayout};
use crate::constraints::{backtrack, WordConstraints};
use crate::error::{Result, SearchError};
use crate::pool::{LetterPool, Positions};

/// Score of every candidate when statistics are disabled.
pub const UNSCORED: f64 = f64::NEG_INFINITY;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub word: String,
    pub positions: Positions,
    pub score: f64,
}

/// How far a search has walked through every length-valid vector.
/// `searched + remaining == total`, up to float rounding on very large pools.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub searched: f64,
    pub remaining: f64,
    pub total: f64,
}

/// Depth-first enumeration of increasing index vectors over the letter pool.
///
/// The search space is a tree whose root is the empty vector; the children of
/// a node append one index greater than its last one. Candidates come out in
/// pre-order, each derived only from the previous one (`last_pos`), so the
/// search can be suspended and resumed between any two calls to
/// [`next_candidate`](Self::next_candidate).
#[derive(Debug, Clone)]
pub struct Searcher {
    layout: SearchLayout,
    model: Option<Arc<BigramModel>>,
    last_pos: Positions,
    emitted: u64,
    exhausted: bool,
}

impl Searcher {
    /// `model` is required when the configuration asks for statistics.
    pub fn new(config: &SearchConfig, model: Option<Arc<BigramModel>>) -> Result<Self> {
        let layout = config.validate()?;
        if layout.use_stats && model.is_none() {
            return Err(SearchError::invalid_config(
                "statistics were requested but no bigram table was supplied",
            ));
        }
        debug!(
            "searcher over {} letters, lengths {}..={}, {} mandatory words",
            layout.pool.len(),
            layout.min_len,
            layout.max_len,
            layout.pool.mandatory_count()
        );
        Ok(Searcher {
            layout,
            model,
            last_pos: Positions::new(),
            emitted: 0,
            exhausted: false,
        })
    }

    pub fn pool(&self) -> &LetterPool {
        &self.layout.pool
    }

    pub fn min_len(&self) -> usize {
        self.layout.min_len
    }

    pub fn max_len(&self) -> usize {
        self.layout.max_len
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// The most recently emitted vector, empty before the first candidate.
    pub fn last_pos(&self) -> &[usize] {
        &self.last_pos
    }

    /// Resume from a previously emitted vector.
    pub fn set_cursor(&mut self, pos: &[usize]) {
        self.last_pos = Positions::from_slice(pos);
        self.exhausted = false;
    }

    /// Append `by` consecutive pointers after the last one.
    /// Leaves `pos` untouched and returns `false` when that would leave the pool
    /// or the vector is already at the maximum length.
    fn extend(&self, pos: &mut Positions, by: usize) -> bool {
        let Some(&last) = pos.last() else {
            return false;
        };
        if pos.len() >= self.layout.max_len || last + by >= self.layout.pool.len() {
            return false;
        }
        pos.extend((1..=by).map(|step| last + step));
        true
    }

    /// Descend one level if possible, otherwise step to the next sibling.
    /// The result may be invalid; [`validate`](Self::validate) repairs it.
    pub fn successor(&self, last: &[usize]) -> Positions {
        let mut next = Positions::from_slice(last);
        if !self.extend(&mut next, 1) {
            if let Some(tail) = next.last_mut() {
                *tail += 1;
            }
        }
        next
    }

    /// Turn `pos` into the first vector at or after it (in search order) that
    /// satisfies the length, word and statistics rules.
    ///
    /// Returns the vector with its score, or `None` once the search space is
    /// exhausted.
    pub fn validate(&self, mut pos: Positions) -> Result<Option<(Positions, f64)>> {
        let pool_len = self.layout.pool.len();
        let constraints = WordConstraints::new(&self.layout);

        loop {
            let Some(&last) = pos.last() else {
                return Ok(None);
            };

            if last >= pool_len {
                match backtrack(pos) {
                    Some(next) => pos = next,
                    None => return Ok(None),
                }
                continue;
            }

            if pos.len() < self.layout.min_len {
                let by = self.layout.min_len - pos.len();
                if !self.extend(&mut pos, by) {
                    match backtrack(pos) {
                        Some(next) => pos = next,
                        None => return Ok(None),
                    }
                }
                continue;
            }

            if constraints.mandatory_count() > 0 {
                match constraints.enforce(pos) {
                    Some((changed, next)) => {
                        pos = next;
                        if changed {
                            continue;
                        }
                    }
                    None => return Ok(None),
                }
            }

            let Some(model) = self.scoring_model() else {
                return Ok(Some((pos, UNSCORED)));
            };

            match self.score(model, &pos)? {
                Verdict::Accept(total) => return Ok(Some((pos, total))),
                Verdict::WeakPair(idx) => {
                    trace!("pruning below weak pair at {} in {:?}", idx, pos);
                    pos.truncate(idx + 2);
                    pos[idx + 1] += 1;
                }
                Verdict::BelowAverage => {
                    if let Some(tail) = pos.last_mut() {
                        *tail += 1;
                    }
                }
            }
        }
    }

    fn scoring_model(&self) -> Option<&BigramModel> {
        if self.layout.use_stats {
            self.model.as_deref()
        } else {
            None
        }
    }

    fn score(&self, model: &BigramModel, pos: &[usize]) -> Result<Verdict> {
        let pool = &self.layout.pool;
        let average = model.average();
        let mut total = 0.0;

        for (idx, pair) in pos.windows(2).enumerate() {
            let (first, second) = (pool.letter(pair[0]), pool.letter(pair[1]));
            let value = model.log_value(first, second);
            if value.is_nan() {
                return Err(SearchError::corrupt_statistics(first, second));
            }
            if self.layout.greedy_stats_pruning && value < average {
                return Ok(Verdict::WeakPair(idx));
            }
            total += value;
        }

        if total < pos.len() as f64 * average {
            Ok(Verdict::BelowAverage)
        } else {
            Ok(Verdict::Accept(total))
        }
    }

    /// The first candidate: `[0, 1, .., min_len - 1]` repaired by validation.
    pub fn initial_candidate(&self) -> Result<Option<(Positions, f64)>> {
        self.validate((0..self.layout.min_len).collect())
    }

    /// The candidate following the cursor.
    pub fn next_valid_candidate(&self) -> Result<Option<(Positions, f64)>> {
        self.validate(self.successor(&self.last_pos))
    }

    /// Advance the cursor and return the next candidate, or `None` when the
    /// search is exhausted. Repeated calls after exhaustion keep returning
    /// `None`.
    pub fn next_candidate(&mut self) -> Result<Option<Candidate>> {
        let next = if self.last_pos.is_empty() {
            self.initial_candidate()?
        } else {
            self.next_valid_candidate()?
        };

        match next {
            Some((positions, score)) => {
                debug_assert!(self.layout.pool.covers_mandatory(&positions));
                self.last_pos = positions.clone();
                self.emitted += 1;
                Ok(Some(Candidate {
                    word: self.layout.pool.spell(&positions),
                    positions,
                    score,
                }))
            }
            None => {
                if !self.exhausted {
                    info!("search exhausted after {} candidates", self.emitted);
                    self.exhausted = true;
                }
                let pool_len = self.layout.pool.len();
                self.last_pos = (pool_len - self.layout.min_len..pool_len).collect();
                Ok(None)
            }
        }
    }

    /// Progress snapshot derived from the cursor alone.
    pub fn progress(&self, counter: &mut CombinationCounter) -> Progress {
        let total = counter.count_range(
            self.layout.pool.len(),
            self.layout.min_len,
            self.layout.max_len,
        );
        let searched = self.rank(&self.last_pos, counter).min(total);
        Progress {
            searched,
            remaining: (total - searched).max(0.0),
            total,
        }
    }

    /// Number of length-valid vectors visited up to and including `pos` in
    /// search order. Zero for the empty vector.
    pub fn rank(&self, pos: &[usize], counter: &mut CombinationCounter) -> f64 {
        if pos.is_empty() {
            return 0.0;
        }
        let pool_len = self.layout.pool.len();
        let (min_len, max_len) = (self.layout.min_len, self.layout.max_len);

        // ancestors come before their descendants
        let mut rank = (1..pos.len())
            .filter(|&len| len >= min_len && len <= max_len)
            .count() as f64;

        // whole subtrees of every smaller sibling along the path
        for (level, &value) in pos.iter().enumerate() {
            let depth = level + 1;
            if depth > max_len {
                break;
            }
            let lowest = if level == 0 { 0 } else { pos[level - 1] + 1 };
            for sibling in lowest..value.min(pool_len) {
                let subtree = counter.count_range(
                    pool_len - 1 - sibling,
                    min_len.saturating_sub(depth),
                    max_len - depth,
                );
                rank += subtree;
            }
        }

        if pos.len() >= min_len && pos.len() <= max_len {
            rank += 1.0;
        }
        rank
    }
}

enum Verdict {
    Accept(f64),
    /// Index of the first pair scoring below the table average
    WeakPair(usize),
    BelowAverage,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn plain(list: &[&str], min_len: usize, max_len: Option<usize>) -> Searcher {
        let config = SearchConfig::new(words(list), vec![true; list.len()])
            .with_min_len(min_len)
            .with_max_len(max_len)
            .with_stats(false);
        Searcher::new(&config, None).unwrap()
    }

    fn next_after(searcher: &mut Searcher, cursor: &[usize]) -> Option<Vec<usize>> {
        searcher.set_cursor(cursor);
        searcher
            .next_valid_candidate()
            .unwrap()
            .map(|(pos, _)| pos.to_vec())
    }

    #[test]
    fn next_valid_positions() {
        let mut s = plain(&["cat", "dog"], 2, None);
        assert_eq!(next_after(&mut s, &[0, 1]), Some(vec![0, 1, 2, 3]));
        assert_eq!(next_after(&mut s, &[2, 3, 4, 5]), Some(vec![2, 3, 5]));
        assert_eq!(next_after(&mut s, &[2, 5]), None);

        let mut s = plain(&["cat", "dog"], 2, Some(2));
        assert_eq!(next_after(&mut s, &[0, 1]), Some(vec![0, 3]));
        assert_eq!(next_after(&mut s, &[1, 3]), Some(vec![1, 4]));
        assert_eq!(next_after(&mut s, &[2, 5]), None);

        let mut s = plain(&["cat", "dog"], 3, None);
        assert_eq!(next_after(&mut s, &[0, 1, 3]), Some(vec![0, 1, 3, 4]));

        let mut s = plain(&["cute", "dog"], 3, None);
        assert_eq!(next_after(&mut s, &[0, 1, 3]), Some(vec![0, 1, 3, 4]));

        let mut s = plain(&["cat", "dog", "mouse"], 3, None);
        assert_eq!(next_after(&mut s, &[0, 5, 10]), Some(vec![1, 2, 3, 4, 5, 6]));
        assert_eq!(next_after(&mut s, &[0, 4, 5]), Some(vec![0, 4, 5, 6]));
        assert_eq!(next_after(&mut s, &[0, 4]), Some(vec![0, 4, 5, 6]));
    }

    #[test]
    fn initial_positions() {
        let s = plain(&["a", "b", "c", "d"], 4, None);
        let (pos, score) = s.initial_candidate().unwrap().unwrap();
        assert_eq!(pos.as_slice(), &[0, 1, 2, 3]);
        assert_eq!(score, UNSCORED);

        let s = plain(&["abc", "def", "ghi", "jkl"], 2, None);
        let (pos, _) = s.initial_candidate().unwrap().unwrap();
        assert_eq!(pos.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn stats_require_a_model() {
        let config = SearchConfig::new(words(&["cat"]), vec![false]).with_min_len(1);
        let err = Searcher::new(&config, None).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn exhaustion_is_idempotent() {
        let config = SearchConfig::new(words(&["ab", "c"]), vec![false, false])
            .with_min_len(2)
            .with_stats(false);
        let mut s = Searcher::new(&config, None).unwrap();
        let mut seen = Vec::new();
        while let Some(c) = s.next_candidate().unwrap() {
            seen.push(c.word);
        }
        assert_eq!(seen, vec!["ab", "abc", "ac", "bc"]);
        assert_eq!(s.last_pos(), &[1, 2]);
        assert!(s.next_candidate().unwrap().is_none());
        assert!(s.next_candidate().unwrap().is_none());
        assert_eq!(s.emitted(), 4);
    }

    #[test]
    fn optional_words_enumerate_everything() {
        let config = SearchConfig::new(words(&["abc"]), vec![false])
            .with_min_len(1)
            .with_stats(false);
        let mut s = Searcher::new(&config, None).unwrap();
        let mut seen = Vec::new();
        while let Some(c) = s.next_candidate().unwrap() {
            seen.push(c.positions.to_vec());
        }
        assert_eq!(
            seen,
            vec![
                vec![0],
                vec![0, 1],
                vec![0, 1, 2],
                vec![0, 2],
                vec![1],
                vec![1, 2],
                vec![2],
            ]
        );
    }

    fn stats_searcher(model: BigramModel, greedy: bool) -> Searcher {
        let config = SearchConfig::new(words(&["ab", "c"]), vec![false, false])
            .with_min_len(2)
            .with_greedy_pruning(greedy);
        Searcher::new(&config, Some(Arc::new(model))).unwrap()
    }

    fn drain(s: &mut Searcher) -> Vec<(String, f64)> {
        let mut out = Vec::new();
        while let Some(c) = s.next_candidate().unwrap() {
            out.push((c.word, c.score));
        }
        out
    }

    #[test]
    fn greedy_pruning_skips_weak_subtrees() {
        // "ab" is weak, so nothing starting with a-then-b survives
        let model = BigramModel::new(-1.0)
            .with_pair('a', 'b', -5.0)
            .with_pair('a', 'c', -0.5)
            .with_pair('b', 'c', -0.25);
        let mut s = stats_searcher(model, true);
        assert_eq!(
            drain(&mut s),
            vec![("ac".to_string(), -0.5), ("bc".to_string(), -0.25)]
        );
    }

    #[test]
    fn without_greedy_the_total_decides() {
        // "ab" is below the average but its total clears 2 * -1.0
        let model = BigramModel::new(-1.0)
            .with_pair('a', 'b', -1.5)
            .with_pair('a', 'c', -0.5)
            .with_pair('b', 'c', 0.5);
        let mut s = stats_searcher(model.clone(), false);
        assert_eq!(
            drain(&mut s),
            vec![
                ("ab".to_string(), -1.5),
                ("abc".to_string(), -1.0),
                ("ac".to_string(), -0.5),
                ("bc".to_string(), 0.5),
            ]
        );

        let mut s = stats_searcher(model, true);
        assert_eq!(
            drain(&mut s),
            vec![("ac".to_string(), -0.5), ("bc".to_string(), 0.5)]
        );
    }

    #[test]
    fn below_average_total_skips_subtree() {
        let model = BigramModel::new(-1.0)
            .with_pair('a', 'b', -2.5)
            .with_pair('a', 'c', -0.5)
            .with_pair('b', 'c', 0.5);
        let mut s = stats_searcher(model, false);
        assert_eq!(
            drain(&mut s),
            vec![("ac".to_string(), -0.5), ("bc".to_string(), 0.5)]
        );
    }

    #[test]
    fn corrupt_values_are_reported() {
        let model = BigramModel::new(-1.0).with_pair('a', 'b', f64::NAN);
        let mut s = stats_searcher(model, true);
        let err = s.next_candidate().unwrap_err();
        assert_eq!(
            err,
            SearchError::CorruptStatistics {
                pair: "ab".to_string()
            }
        );
    }

    #[test]
    fn progress_of_pool_five() {
        let config = SearchConfig::new(words(&["abcde"]), vec![false])
            .with_min_len(3)
            .with_max_len(Some(5))
            .with_stats(false);
        let mut s = Searcher::new(&config, None).unwrap();
        let mut counter = CombinationCounter::new();

        assert_eq!(
            s.progress(&mut counter),
            Progress {
                searched: 0.0,
                remaining: 16.0,
                total: 16.0
            }
        );

        let mut previous = 0.0;
        while s.next_candidate().unwrap().is_some() {
            let progress = s.progress(&mut counter);
            assert_eq!(progress.searched + progress.remaining, progress.total);
            assert_eq!(progress.searched, previous + 1.0);
            previous = progress.searched;
        }
        assert_eq!(previous, 16.0);
        assert_eq!(s.progress(&mut counter).remaining, 0.0);
    }

    #[test]
    fn progress_on_a_seventy_letter_pool() {
        let long = format!("a{}", "b".repeat(69));
        let config = SearchConfig::new(vec![long], vec![false])
            .with_min_len(3)
            .with_stats(false);
        let mut s = Searcher::new(&config, None).unwrap();
        let mut counter = CombinationCounter::new();

        let total = s.progress(&mut counter).total;
        assert!(total > u64::MAX as f64);

        // every vector starting at 0 lies behind this cursor
        s.set_cursor(&[1, 2, 3]);
        let progress = s.progress(&mut counter);
        let share = progress.searched / progress.total;
        assert!(share > 0.45 && share < 0.55, "share was {share}");
        assert!(progress.remaining > 0.0);
    }

    #[test]
    fn progress_counts_skipped_vectors() {
        let mut s = plain(&["cat", "dog"], 2, None);
        let mut counter = CombinationCounter::new();
        s.next_candidate().unwrap();
        assert_eq!(s.last_pos(), &[0, 1, 2, 3]);
        // [0, 1] and [0, 1, 2] precede the first accepted vector
        assert_eq!(s.progress(&mut counter).searched, 3.0);
    }
}
