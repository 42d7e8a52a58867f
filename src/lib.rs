pub mod api;
pub mod bigram;
pub mod combinatorics;
pub mod config;
pub mod constraints;
pub mod error;
pub mod pool;
pub mod protocol;
pub mod results;
pub mod scheduler;
pub mod searcher;
pub mod sorted;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use api::{search_to_completion, SearchOutcome};
pub use bigram::{BigramModel, BigramTable};
pub use combinatorics::CombinationCounter;
pub use config::{SearchConfig, SearchLayout};
pub use constraints::WordConstraints;
pub use error::{Result, SearchError};
pub use pool::{LetterPool, Positions, WordSegment};
pub use protocol::{Response, SearchFailure, SearchRequest, SearchUpdate};
pub use results::ResultSet;
pub use scheduler::{Scheduler, SchedulerConfig, SearchJob, SliceBudget};
pub use searcher::{Candidate, Progress, Searcher, UNSCORED};
