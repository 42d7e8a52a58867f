use hashbrown::HashMap;

/// Counts strictly increasing index sequences over a letter pool.
///
/// Sub-counts recur heavily across progress calculations, so every `(n, k)`
/// pair is memoized for the lifetime of the counter. Values are pure functions
/// of their key and are never invalidated.
///
/// Counts are `f64`: a pool of 64 letters already has more subsets than a
/// `u64` holds. They are exact up to 2^53 and approximate beyond that.
#[derive(Debug, Default, Clone)]
pub struct CombinationCounter {
    memo: HashMap<(usize, usize), f64>,
}

impl CombinationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of strictly increasing length-`k` sequences drawn from `n` letters.
    pub fn count_fixed(&mut self, n: usize, k: usize) -> f64 {
        if k == 0 || k == n {
            return 1.0;
        }
        if k > n {
            return 0.0;
        }
        if k == 1 {
            return n as f64;
        }
        if let Some(&hit) = self.memo.get(&(n, k)) {
            return hit;
        }
        let count = self.count_fixed(n - 1, k - 1) + self.count_fixed(n - 1, k);
        self.memo.insert((n, k), count);
        count
    }

    /// Sum of [`count_fixed`](Self::count_fixed) for every length in
    /// `min_len..=max_len`, capped at `n`. Zero when the range is empty.
    pub fn count_range(&mut self, n: usize, min_len: usize, max_len: usize) -> f64 {
        let upper = max_len.min(n);
        if min_len > upper {
            return 0.0;
        }
        (min_len..=upper).map(|k| self.count_fixed(n, k)).sum()
    }

    #[cfg(test)]
    fn cached_entries(&self) -> usize {
        self.memo.len()
    }
}
