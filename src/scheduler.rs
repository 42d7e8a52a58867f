//! Anytime scheduling of searches.
//!
//! A [`SearchJob`] advances one search for a bounded slice and reports what it
//! has so far. The [`Scheduler`] runs jobs on a worker thread, one slice at a
//! time, and abandons a job as soon as a newer request supersedes it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};

use crate::bigram::BigramModel;
use crate::combinatorics::CombinationCounter;
use crate::error::Result;
use crate::protocol::{Response, SearchRequest, SearchUpdate};
use crate::results::ResultSet;
use crate::searcher::Searcher;

/// How much work one slice may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceBudget {
    /// Stop once this much wall-clock time has passed.
    Time(Duration),
    /// Stop after this many candidates. Needs no clock, which suits hosts
    /// without a monotonic timer.
    Candidates(usize),
}

struct SliceClock {
    budget: SliceBudget,
    started: Option<Instant>,
    scanned: usize,
}

impl SliceClock {
    fn start(budget: SliceBudget) -> Self {
        let started = match budget {
            SliceBudget::Time(_) => Some(Instant::now()),
            SliceBudget::Candidates(_) => None,
        };
        SliceClock {
            budget,
            started,
            scanned: 0,
        }
    }

    fn expired(&self) -> bool {
        match (self.budget, self.started) {
            (SliceBudget::Time(limit), Some(started)) => started.elapsed() >= limit,
            (SliceBudget::Candidates(limit), _) => self.scanned >= limit,
            _ => true,
        }
    }
}

/// One search: its enumerator and the best results found so far.
#[derive(Debug)]
pub struct SearchJob {
    search_id: u64,
    searcher: Searcher,
    results: ResultSet,
    finished: bool,
    slices: u64,
}

impl SearchJob {
    pub fn new(
        request: &SearchRequest,
        model: Option<Arc<BigramModel>>,
        capacity: usize,
    ) -> Result<Self> {
        let searcher = Searcher::new(&request.config(), model)?;
        Ok(SearchJob {
            search_id: request.search_id,
            searcher,
            results: ResultSet::new(capacity),
            finished: false,
            slices: 0,
        })
    }

    pub fn search_id(&self) -> u64 {
        self.search_id
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Pull candidates until the budget runs out or the search is exhausted,
    /// then report the current results.
    pub fn run_slice(
        &mut self,
        budget: SliceBudget,
        counter: &mut CombinationCounter,
    ) -> Result<SearchUpdate> {
        let mut clock = SliceClock::start(budget);
        while !self.finished && !clock.expired() {
            match self.searcher.next_candidate()? {
                Some(candidate) => {
                    self.results.add(candidate);
                    clock.scanned += 1;
                }
                None => self.finished = true,
            }
        }
        self.slices += 1;
        trace!(
            "search {} slice {}: {} candidates, {} kept",
            self.search_id,
            self.slices,
            clock.scanned,
            self.results.len()
        );
        Ok(self.update(counter))
    }

    pub fn update(&self, counter: &mut CombinationCounter) -> SearchUpdate {
        SearchUpdate {
            search_id: self.search_id,
            results: self.results.results().to_vec(),
            progress: self.searcher.progress(counter),
            finished: self.finished,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Length of one slice
    pub slice: Duration,
    /// Idle time between slices, during which new requests are picked up
    pub pause: Duration,
    /// Results kept per search
    pub result_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            slice: Duration::from_millis(200),
            pause: Duration::from_millis(200),
            result_capacity: 500,
        }
    }
}

impl SchedulerConfig {
    pub fn with_slice(mut self, slice: Duration) -> Self {
        self.slice = slice;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_result_capacity(mut self, capacity: usize) -> Self {
        self.result_capacity = capacity;
        self
    }
}

enum Command {
    Start {
        generation: u64,
        request: SearchRequest,
    },
    Stop,
}

/// Runs searches on a background thread and streams [`Response`]s back.
///
/// Every submission bumps a generation token. A job remembers the token it was
/// started with, and a slice whose token is stale does nothing, so at most one
/// search makes progress at a time.
pub struct Scheduler {
    commands: Option<Sender<Command>>,
    generation: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn spawn(
        config: SchedulerConfig,
        model: Option<Arc<BigramModel>>,
    ) -> (Scheduler, Receiver<Response>) {
        let (command_tx, command_rx) = mpsc::channel();
        let (response_tx, response_rx) = mpsc::channel();
        let generation = Arc::new(AtomicU64::new(0));

        let worker = Worker {
            config,
            model,
            generation: Arc::clone(&generation),
            commands: command_rx,
            responses: response_tx,
            counter: CombinationCounter::new(),
        };
        let handle = thread::spawn(move || worker.run());

        let scheduler = Scheduler {
            commands: Some(command_tx),
            generation,
            worker: Some(handle),
        };
        (scheduler, response_rx)
    }

    /// Start `request`, superseding any running search, or stop the current
    /// search when `None`. Returns `false` if the worker has gone away.
    pub fn submit(&self, request: Option<SearchRequest>) -> bool {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let command = match request {
            Some(request) => Command::Start {
                generation,
                request,
            },
            None => Command::Stop,
        };
        self.commands
            .as_ref()
            .map_or(false, |tx| tx.send(command).is_ok())
    }

    pub fn start(&self, request: SearchRequest) -> bool {
        self.submit(Some(request))
    }

    pub fn stop(&self) -> bool {
        self.submit(None)
    }
}

/// Dropping the scheduler stops the current search and blocks until the
/// worker exits, which takes at most one slice.
impl Drop for Scheduler {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.commands.take();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("search worker panicked");
            }
        }
    }
}

struct ActiveJob {
    generation: u64,
    job: SearchJob,
}

struct Worker {
    config: SchedulerConfig,
    model: Option<Arc<BigramModel>>,
    generation: Arc<AtomicU64>,
    commands: Receiver<Command>,
    responses: Sender<Response>,
    counter: CombinationCounter,
}

impl Worker {
    fn run(mut self) {
        let mut active: Option<ActiveJob> = None;
        loop {
            // idle workers block; busy ones pause between slices
            let command = if active.is_some() {
                match self.commands.recv_timeout(self.config.pause) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            } else {
                match self.commands.recv() {
                    Ok(command) => Some(command),
                    Err(_) => return,
                }
            };

            if let Some(command) = command {
                match self.handle(command) {
                    Some(next) => active = next,
                    None => return,
                }
                continue;
            }

            let Some(current) = active.as_mut() else {
                continue;
            };
            if current.generation != self.generation.load(Ordering::SeqCst) {
                debug!("search {} superseded", current.job.search_id());
                active = None;
                continue;
            }

            let search_id = current.job.search_id();
            let response = match current
                .job
                .run_slice(SliceBudget::Time(self.config.slice), &mut self.counter)
            {
                Ok(update) => {
                    if current.job.is_finished() {
                        info!("search {} finished", search_id);
                        active = None;
                    }
                    Response::Update(update)
                }
                Err(err) => {
                    warn!("search {} failed: {}", search_id, err);
                    active = None;
                    Response::failure(Some(search_id), &err)
                }
            };
            if self.responses.send(response).is_err() {
                return;
            }
        }
    }

    /// The job to run next, or `None` when the host stopped listening.
    fn handle(&mut self, command: Command) -> Option<Option<ActiveJob>> {
        match command {
            Command::Stop => {
                debug!("stopping current search");
                Some(None)
            }
            Command::Start {
                generation,
                request,
            } => {
                if generation != self.generation.load(Ordering::SeqCst) {
                    debug!("search {} superseded before it started", request.search_id);
                    return Some(None);
                }
                debug!(
                    "starting search {} over {:?}",
                    request.search_id, request.words
                );
                match SearchJob::new(
                    &request,
                    self.model.clone(),
                    self.config.result_capacity,
                ) {
                    Ok(job) => Some(Some(ActiveJob { generation, job })),
                    Err(err) => {
                        warn!("search {} rejected: {}", request.search_id, err);
                        let response = Response::failure(Some(request.search_id), &err);
                        self.responses.send(response).ok()?;
                        Some(None)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(search_id: u64, words: &[&str], min_len: usize) -> SearchRequest {
        SearchRequest {
            search_id,
            words: words.iter().map(|s| s.to_string()).collect(),
            min_len: Some(min_len),
            max_len: None,
            word_constraints: vec![false; words.len()],
            use_stats: false,
            greedy_stats_pruning: false,
        }
    }

    #[test]
    fn candidate_budget_bounds_a_slice() {
        let mut job = SearchJob::new(&request(1, &["abcd"], 1), None, 100).unwrap();
        let mut counter = CombinationCounter::new();

        let update = job.run_slice(SliceBudget::Candidates(3), &mut counter).unwrap();
        assert_eq!(update.search_id, 1);
        assert_eq!(update.results.len(), 3);
        assert_eq!(update.progress.searched, 3.0);
        assert_eq!(update.progress.total, 15.0);
        assert!(!job.is_finished());
        assert!(!update.is_complete());

        let update = job.run_slice(SliceBudget::Candidates(100), &mut counter).unwrap();
        assert!(job.is_finished());
        assert_eq!(update.results.len(), 15);
        assert!(update.is_complete());
    }

    #[test]
    fn time_budget_runs_to_exhaustion() {
        let mut job = SearchJob::new(&request(2, &["ab", "cd"], 2), None, 3).unwrap();
        let mut counter = CombinationCounter::new();
        let update = job
            .run_slice(SliceBudget::Time(Duration::from_secs(5)), &mut counter)
            .unwrap();
        assert!(job.is_finished());
        assert_eq!(update.results.len(), 3);
        assert_eq!(update.progress.remaining, 0.0);
        assert!(update.finished);
    }

    #[test]
    fn slice_after_exhaustion_is_a_no_op() {
        let mut job = SearchJob::new(&request(3, &["ab"], 1), None, 10).unwrap();
        let mut counter = CombinationCounter::new();
        job.run_slice(SliceBudget::Candidates(10), &mut counter).unwrap();
        let emitted = job.searcher().emitted();
        let update = job.run_slice(SliceBudget::Candidates(10), &mut counter).unwrap();
        assert_eq!(job.searcher().emitted(), emitted);
        assert_eq!(update.progress.searched, update.progress.total);
    }

    #[test]
    fn large_pool_is_not_complete_after_one_slice() {
        let long = format!("a{}", "b".repeat(69));
        let mut job = SearchJob::new(&request(5, &[long.as_str()], 3), None, 10).unwrap();
        let mut counter = CombinationCounter::new();

        let update = job.run_slice(SliceBudget::Candidates(1), &mut counter).unwrap();
        assert!(!job.is_finished());
        assert!(!update.is_complete());
        assert!(update.progress.remaining > 0.0);
        assert!(update.progress.searched < update.progress.total);
    }

    #[test]
    fn bad_request_fails_at_construction() {
        let mut bad = request(4, &["ab"], 1);
        bad.word_constraints.clear();
        let err = SearchJob::new(&bad, None, 10).unwrap_err();
        assert!(err.is_config_error());
    }
}
