use crate::config::SearchLayout;
use crate::pool::{Positions, WordSegment};

/// Walks the mandatory words in input order, skipping optional ones.
/// Once every mandatory word is claimed the cursor sits past the last word
/// with an unbounded end.
#[derive(Debug, Clone, Copy)]
struct MandatoryCursor<'a> {
    segments: &'a [WordSegment],
    pool_len: usize,
    active: Option<usize>,
    claimed: usize,
}

impl<'a> MandatoryCursor<'a> {
    fn new(segments: &'a [WordSegment], pool_len: usize) -> Self {
        let mut cursor = MandatoryCursor {
            segments,
            pool_len,
            active: None,
            claimed: 0,
        };
        cursor.advance();
        cursor
    }

    /// Claim the active word (if any) and move to the next mandatory one.
    fn advance(&mut self) {
        let next = match self.active {
            Some(word) => {
                self.claimed += 1;
                word + 1
            }
            None => 0,
        };
        let word = (next..self.segments.len())
            .find(|&idx| self.segments[idx].mandatory)
            .unwrap_or(self.segments.len());
        self.active = Some(word);
    }

    fn word(&self) -> usize {
        self.active.unwrap_or(0)
    }

    fn is_done(&self) -> bool {
        self.word() >= self.segments.len()
    }

    fn offset(&self) -> usize {
        self.segments
            .get(self.word())
            .map_or(self.pool_len, |s| s.offset)
    }

    fn end(&self) -> usize {
        self.segments.get(self.word()).map_or(usize::MAX, |s| s.end())
    }
}

/// Checks and repairs candidates against the "every mandatory word is used"
/// rule.
#[derive(Debug, Clone, Copy)]
pub struct WordConstraints<'a> {
    segments: &'a [WordSegment],
    mandatory: usize,
    pool_len: usize,
    max_len: usize,
}

impl<'a> WordConstraints<'a> {
    pub fn new(layout: &'a SearchLayout) -> Self {
        WordConstraints {
            segments: layout.pool.segments(),
            mandatory: layout.pool.mandatory_count(),
            pool_len: layout.pool.len(),
            max_len: layout.max_len,
        }
    }

    pub fn mandatory_count(&self) -> usize {
        self.mandatory
    }

    /// Returns `Some((changed, positions))` where `positions` is `pos` itself
    /// or the nearest vector after it (in search order) that can still use
    /// every mandatory word, and `changed` says whether it differs from the
    /// input. `None` means no later vector can satisfy the constraints.
    ///
    /// When the remaining pointer budget equals the number of unclaimed words,
    /// each remaining pointer is pinned to the first letter of its word.
    pub fn enforce(&self, mut pos: Positions) -> Option<(bool, Positions)> {
        let mut backtracked = false;

        'restart: loop {
            while *pos.last()? >= self.pool_len {
                pos = backtrack(pos)?;
            }

            let last = *pos.last()?;
            // every slot the vector could ever fill from here
            let max_pointers = self.max_len.min(pos.len() + self.pool_len - 1 - last);
            let mut cursor = MandatoryCursor::new(self.segments, self.pool_len);
            let mut changed = false;

            for slot in 0..max_pointers {
                if cursor.is_done() {
                    break;
                }

                // the active word was jumped over
                if slot < pos.len() && pos[slot] >= cursor.end() {
                    if slot == 0 {
                        return None;
                    }
                    pos.truncate(slot);
                    pos[slot - 1] += 1;
                    backtracked = true;
                    continue 'restart;
                }

                let remaining_slots = max_pointers - slot;
                let remaining_words = self.mandatory - cursor.claimed;

                if remaining_slots < remaining_words {
                    return None;
                }

                if remaining_slots > remaining_words {
                    if slot >= pos.len() {
                        let next = pos[slot - 1] + 1;
                        pos.push(next);
                        changed = true;
                    }
                    if pos[slot] >= cursor.offset() {
                        cursor.advance();
                    }
                    continue;
                }

                // exactly one slot per unclaimed word
                let offset = cursor.offset();
                if slot >= pos.len() {
                    pos.push(offset);
                    changed = true;
                } else if pos[slot] < offset {
                    pos[slot] = offset;
                    changed = true;
                }
                cursor.advance();
            }

            return Some((backtracked || changed, pos));
        }
    }
}

/// Drop the last pointer and move the new last pointer to its next value.
/// `None` once the vector is empty.
pub fn backtrack(mut pos: Positions) -> Option<Positions> {
    pos.pop();
    let last = pos.last_mut()?;
    *last += 1;
    Some(pos)
}
