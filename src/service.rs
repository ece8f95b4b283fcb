use crate::config::KalenderConfig;
use crate::model::{CompetitionEvent, CycleReport, RegistrationStatus};
use crate::pipeline::{CancelToken, fetch_all};
use anyhow::Result;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The published side of the extractor.
///
/// Record list, loading flag and last failure live behind one lock, so a
/// reader never observes the result of one cycle combined with the flags of
/// another. The record collection is replaced only when a cycle fully
/// succeeds; a failed cycle keeps the stale-but-valid list and records the
/// error for display.
pub struct Kalender {
    config: KalenderConfig,
    shared: Mutex<Shared>,
}

#[derive(Default)]
struct Shared {
    events: Vec<CompetitionEvent>,
    in_progress: bool,
    last_error: Option<String>,
}

impl Kalender {
    pub fn new(config: KalenderConfig) -> Self {
        Self {
            config,
            shared: Mutex::new(Shared::default()),
        }
    }

    /// Run one extraction cycle to completion.
    pub fn refresh(&self) -> Result<CycleReport> {
        self.refresh_with(&CancelToken::new())
    }

    /// Like [`refresh`](Self::refresh), with a caller-owned cancellation
    /// token. A cancelled cycle publishes nothing.
    pub fn refresh_with(&self, cancel: &CancelToken) -> Result<CycleReport> {
        self.lock().in_progress = true;

        match fetch_all(&self.config, cancel) {
            Ok(outcome) => {
                let mut shared = self.lock();
                shared.events = outcome.events;
                shared.last_error = None;
                shared.in_progress = false;
                Ok(outcome.report)
            }
            Err(err) => {
                let mut shared = self.lock();
                shared.last_error = Some(format!("{err:#}"));
                shared.in_progress = false;
                Err(err)
            }
        }
    }

    /// The full sorted, deduplicated record list from the last good cycle.
    pub fn events(&self) -> Vec<CompetitionEvent> {
        self.lock().events.clone()
    }

    /// Distinct non-empty category values present in the published list.
    pub fn categories(&self) -> BTreeSet<String> {
        self.lock()
            .events
            .iter()
            .map(|event| event.category.clone())
            .filter(|category| !category.is_empty())
            .collect()
    }

    /// Pure predicate over the published list; no side effects.
    pub fn filter(
        &self,
        category: Option<&str>,
        status: Option<RegistrationStatus>,
    ) -> Vec<CompetitionEvent> {
        self.lock()
            .events
            .iter()
            .filter(|event| {
                category.is_none_or(|c| event.category == c)
                    && status.is_none_or(|s| event.status == s)
            })
            .cloned()
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().in_progress
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
