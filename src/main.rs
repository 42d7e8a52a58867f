use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use letter_search::{BigramModel, Response, Scheduler, SchedulerConfig, SearchRequest};

const DISPLAY: usize = 10;

/// Search the letters of some words for the most word-like subsequences.
#[derive(Parser, Debug)]
#[clap(name = "letter-search", version)]
struct Options {
    /// Bigram table in JSON; without it candidates are unscored
    #[clap(long, value_name = "FILE")]
    stats: Option<PathBuf>,
    /// Shortest candidate
    #[clap(long = "min", value_name = "N")]
    min_len: Option<usize>,
    /// Longest candidate
    #[clap(long = "max", value_name = "N")]
    max_len: Option<usize>,
    /// Word every candidate must use a letter of; placed before the optional words
    #[clap(long, value_name = "WORD")]
    require: Vec<String>,
    /// Optional words
    #[clap(name = "WORDS", required_unless_present = "require")]
    words: Vec<String>,
}

impl Options {
    fn request(self, use_stats: bool) -> SearchRequest {
        let mut word_constraints = vec![true; self.require.len()];
        word_constraints.resize(self.require.len() + self.words.len(), false);
        let mut words = self.require;
        words.extend(self.words);
        SearchRequest {
            search_id: 1,
            words,
            min_len: self.min_len,
            max_len: self.max_len,
            word_constraints,
            use_stats,
            greedy_stats_pruning: true,
        }
    }
}

fn run(options: Options) -> Result<(), Box<dyn Error>> {
    let model = match &options.stats {
        Some(path) => Some(Arc::new(BigramModel::from_json(&fs::read_to_string(path)?)?)),
        None => None,
    };
    let use_stats = model.is_some();

    let config = SchedulerConfig::default().with_pause(Duration::from_millis(20));
    let (scheduler, responses) = Scheduler::spawn(config, model);
    scheduler.start(options.request(use_stats));

    for response in responses.iter() {
        match response {
            Response::Update(update) => {
                let progress = update.progress;
                let percent = if progress.total == 0.0 {
                    100.0
                } else {
                    progress.searched * 100.0 / progress.total
                };
                println!(
                    "searched {:.0} of {:.0} ({:.1}%), {} results",
                    progress.searched,
                    progress.total,
                    percent,
                    update.results.len()
                );
                if update.is_complete() {
                    for (idx, candidate) in update.results.iter().take(DISPLAY).enumerate() {
                        println!("{:>3}. {:<20} {:.3}", idx + 1, candidate.word, candidate.score);
                    }
                    if update.results.len() > DISPLAY {
                        println!("... {} more result(s) omitted", update.results.len() - DISPLAY);
                    }
                    break;
                }
            }
            Response::Error(failure) => return Err(failure.error.into()),
        }
    }

    drop(scheduler);
    Ok(())
}

fn main() {
    env_logger::init();
    let options = Options::parse();
    if let Err(err) = run(options) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
