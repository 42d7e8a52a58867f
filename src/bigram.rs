use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// JSON shape of a bigram table: two-letter keys mapped to log-probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BigramTable {
    pub average: f64,
    pub logits: BTreeMap<String, f64>,
}

/// Log-probability of each ordered letter pair plus the baseline average.
///
/// Pairs missing from the table are impossible transitions and score
/// `f64::NEG_INFINITY`.
#[derive(Debug, Clone, PartialEq)]
pub struct BigramModel {
    logits: HashMap<(char, char), f64>,
    average: f64,
}

impl BigramModel {
    pub fn new(average: f64) -> Self {
        BigramModel {
            logits: HashMap::new(),
            average,
        }
    }

    pub fn with_pair(mut self, first: char, second: char, log_value: f64) -> Self {
        self.insert(first, second, log_value);
        self
    }

    pub fn insert(&mut self, first: char, second: char, log_value: f64) {
        self.logits.insert((first, second), log_value);
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn len(&self) -> usize {
        self.logits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logits.is_empty()
    }

    pub fn log_value(&self, first: char, second: char) -> f64 {
        self.logits
            .get(&(first, second))
            .copied()
            .unwrap_or(f64::NEG_INFINITY)
    }

    pub fn from_table(table: BigramTable) -> Result<Self> {
        if !table.average.is_finite() {
            return Err(SearchError::statistics(format!(
                "average log value must be finite, got {}",
                table.average
            )));
        }
        let mut model = BigramModel::new(table.average);
        for (key, value) in table.logits {
            let mut chars = key.chars();
            match (chars.next(), chars.next(), chars.next()) {
                (Some(first), Some(second), None) => model.insert(first, second, value),
                _ => {
                    return Err(SearchError::statistics(format!(
                        "bigram key {key:?} must be exactly two letters"
                    )))
                }
            }
        }
        Ok(model)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let table: BigramTable = serde_json::from_str(json)?;
        Self::from_table(table)
    }
}
