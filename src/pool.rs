use smallvec::SmallVec;

/// Strictly increasing letter pool indices describing one candidate.
pub type Positions = SmallVec<[usize; 16]>;

/// The index range one input word occupies in the letter pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSegment {
    pub offset: usize,
    pub len: usize,
    /// Every accepted candidate must pick at least one letter of this word
    pub mandatory: bool,
}

impl WordSegment {
    /// Exclusive end of the segment.
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    pub const fn contains(&self, index: usize) -> bool {
        index >= self.offset && index < self.end()
    }
}

/// Letters of every input word concatenated in input order.
/// Segments partition the pool exactly and never change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterPool {
    letters: Vec<char>,
    segments: Vec<WordSegment>,
}

impl LetterPool {
    /// `mandatory` is matched to `words` by position; missing flags count as optional.
    pub fn new(words: &[String], mandatory: &[bool]) -> Self {
        let mut letters = Vec::new();
        let mut segments = Vec::with_capacity(words.len());
        for (idx, word) in words.iter().enumerate() {
            let offset = letters.len();
            letters.extend(word.chars());
            segments.push(WordSegment {
                offset,
                len: letters.len() - offset,
                mandatory: mandatory.get(idx).copied().unwrap_or(false),
            });
        }
        LetterPool { letters, segments }
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn letter(&self, index: usize) -> char {
        self.letters[index]
    }

    pub fn segments(&self) -> &[WordSegment] {
        &self.segments
    }

    pub fn mandatory_count(&self) -> usize {
        self.segments.iter().filter(|s| s.mandatory).count()
    }

    /// Concatenate the letters at `positions`.
    pub fn spell(&self, positions: &[usize]) -> String {
        positions.iter().map(|&i| self.letters[i]).collect()
    }

    /// Whether every mandatory segment holds at least one of `positions`.
    pub fn covers_mandatory(&self, positions: &[usize]) -> bool {
        self.segments
            .iter()
            .filter(|s| s.mandatory)
            .all(|s| positions.iter().any(|&p| s.contains(p)))
    }
}
