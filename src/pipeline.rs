use crate::config::KalenderConfig;
use crate::fetch::{build_client, fetch_endpoint};
use crate::model::{CompetitionEvent, CycleReport};
use crate::parser::parse_document;
use anyhow::{Result, bail};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Cooperative cancellation for an in-flight extraction cycle. Checked
/// before each endpoint fetch; a request already in flight is bounded by the
/// per-request timeout instead.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub events: Vec<CompetitionEvent>,
    pub report: CycleReport,
}

/// Walk the endpoint list in order and return the first endpoint's records
/// that parse to anything at all. Fetch failures, undecodable bodies and
/// zero-record parses all fall through to the next endpoint; only running
/// out of endpoints is an error.
pub fn fetch_all(config: &KalenderConfig, cancel: &CancelToken) -> Result<ExtractionOutcome> {
    let client = build_client(&config.fetch)?;
    let mut report = CycleReport::default();

    for endpoint in &config.endpoints {
        if cancel.is_cancelled() {
            bail!("extraction cancelled");
        }

        let name = endpoint.describe();
        report.endpoints_tried += 1;

        let doc = match fetch_endpoint(&client, endpoint, &config.fetch) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(endpoint = %name, error = %format!("{err:#}"), "endpoint failed; falling through");
                continue;
            }
        };

        let parsed = parse_document(&doc.body, &config.parse);
        if parsed.events.is_empty() {
            info!(endpoint = %name, candidates = parsed.candidates, "no records parsed; falling through");
            continue;
        }

        let events = finalize(parsed.events);
        info!(
            endpoint = %name,
            candidates = parsed.candidates,
            records = events.len(),
            "endpoint accepted; remaining endpoints skipped"
        );

        report.winning_endpoint = Some(name);
        report.candidates_seen = parsed.candidates;
        report.records_published = events.len();
        return Ok(ExtractionOutcome { events, report });
    }

    bail!("no competition data found on any endpoint")
}

/// Merge candidates into the final list: duplicates by `(date, type)`
/// identity are dropped (first occurrence kept), then everything is sorted
/// ascending by date.
pub fn finalize(candidates: Vec<CompetitionEvent>) -> Vec<CompetitionEvent> {
    let mut seen = HashSet::new();
    let mut events: Vec<CompetitionEvent> = candidates
        .into_iter()
        .filter(|event| seen.insert(event.id.clone()))
        .collect();

    events.sort_by_key(|event| event.date);
    events
}
