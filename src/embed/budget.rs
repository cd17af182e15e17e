//! Daily usage budget for the embedding collaborator.
//!
//! The budget is an explicit object handed to the embedder, so separate runs
//! (or tests) can use separate budgets. Counters reset when the UTC day
//! changes and can optionally be persisted to a JSON file between runs.

use crate::error::{ReelcutError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

const SECONDS_PER_DAY: u64 = 86_400;

/// Counters for one UTC day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSnapshot {
    /// Days since the Unix epoch.
    pub day: u64,
    pub requests: u32,
    pub inputs: u64,
}

pub struct UsageBudget {
    daily_request_limit: Option<u32>,
    state: Mutex<BudgetSnapshot>,
    path: Option<PathBuf>,
    clock: fn() -> u64,
}

fn current_day() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() / SECONDS_PER_DAY)
        .unwrap_or(0)
}

impl UsageBudget {
    /// In-memory budget. `None` means unlimited but still counted.
    pub fn new(daily_request_limit: Option<u32>) -> Self {
        Self {
            daily_request_limit,
            state: Mutex::new(BudgetSnapshot {
                day: current_day(),
                ..Default::default()
            }),
            path: None,
            clock: current_day,
        }
    }

    /// Budget backed by a JSON file. A missing or unreadable file starts the
    /// day from zero.
    pub fn load(path: &Path, daily_request_limit: Option<u32>) -> Result<Self> {
        let mut budget = Self::new(daily_request_limit);
        budget.path = Some(path.to_path_buf());

        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            match serde_json::from_str::<BudgetSnapshot>(&contents) {
                Ok(snapshot) => {
                    let mut state = budget.lock_state();
                    if snapshot.day == state.day {
                        *state = snapshot;
                    }
                }
                Err(e) => warn!("Ignoring unreadable budget file {}: {}", path.display(), e),
            }
        }

        debug!("Usage budget loaded: {:?}", budget.snapshot());
        Ok(budget)
    }

    #[cfg(test)]
    fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self.lock_state().day = clock();
        self
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, BudgetSnapshot> {
        // Counters stay meaningful even if another holder panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reserve one request carrying `inputs` texts.
    pub fn try_acquire(&self, inputs: usize) -> Result<()> {
        let today = (self.clock)();
        let mut state = self.lock_state();

        if state.day != today {
            info!("New usage day, resetting embedding counters");
            *state = BudgetSnapshot {
                day: today,
                ..Default::default()
            };
        }

        if let Some(limit) = self.daily_request_limit {
            if state.requests >= limit {
                return Err(ReelcutError::BudgetExhausted(format!(
                    "{} of {} daily embedding requests used",
                    state.requests, limit
                )));
            }
        }

        state.requests += 1;
        state.inputs += inputs as u64;
        Ok(())
    }

    /// Requests left today, or `None` when unlimited.
    pub fn remaining(&self) -> Option<u32> {
        let snapshot = self.snapshot();
        self.daily_request_limit
            .map(|limit| limit.saturating_sub(snapshot.requests))
    }

    pub fn snapshot(&self) -> BudgetSnapshot {
        let today = (self.clock)();
        let state = *self.lock_state();
        if state.day == today {
            state
        } else {
            BudgetSnapshot {
                day: today,
                ..Default::default()
            }
        }
    }

    /// Write counters back to the backing file, if any.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
