use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// How an edge's observed returns are folded into the value used for selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionType {
    /// Mean of every return backed up through the edge.
    #[default]
    Avg,
    /// Best single return backed up through the edge.
    Max,
}

impl FromStr for SelectionType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "avg" => Ok(SelectionType::Avg),
            "max" => Ok(SelectionType::Max),
            other => Err(format!(
                "invalid selection type '{other}'; expected one of: avg, max"
            )),
        }
    }
}

impl fmt::Display for SelectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionType::Avg => write!(f, "avg"),
            SelectionType::Max => write!(f, "max"),
        }
    }
}

/// Running statistics of one action edge.
#[derive(Debug, Clone, Copy)]
pub struct EdgeStats {
    visits: u64,
    value_sum: f64,
    best: f64,
}

impl EdgeStats {
    pub fn new() -> Self {
        EdgeStats {
            visits: 0,
            value_sum: 0.0,
            best: f64::NEG_INFINITY,
        }
    }

    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// Record one backed-up return.
    pub fn record(&mut self, total_return: f64) {
        self.visits += 1;
        self.value_sum += total_return;
        if total_return > self.best {
            self.best = total_return;
        }
    }

    pub fn is_unvisited(&self) -> bool {
        self.visits == 0
    }

    /// Mean return, 0 when unvisited.
    pub fn q(&self) -> f64 {
        if self.is_unvisited() {
            0.0
        } else {
            self.value_sum / self.visits as f64
        }
    }

    /// Best return seen so far, 0 when unvisited.
    pub fn best(&self) -> f64 {
        if self.is_unvisited() { 0.0 } else { self.best }
    }

    /// Exploitation term for the given selection rule.
    pub fn value(&self, selection: SelectionType) -> f64 {
        match selection {
            SelectionType::Avg => self.q(),
            SelectionType::Max => self.best(),
        }
    }
}
