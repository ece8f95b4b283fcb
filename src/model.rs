use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;

/// Registration state as shown on the Orweja calendar.
///
/// Unrecognized or absent status text always resolves to `NotYetAvailable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Open,
    NotYetAvailable,
    Closed,
}

impl RegistrationStatus {
    /// The Dutch label the source site uses for this state.
    pub fn label(&self) -> &'static str {
        match self {
            RegistrationStatus::Open => "Inschrijven",
            RegistrationStatus::NotYetAvailable => "Nog niet beschikbaar",
            RegistrationStatus::Closed => "Gesloten",
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "open" | "inschrijven" => Ok(RegistrationStatus::Open),
            "closed" | "gesloten" => Ok(RegistrationStatus::Closed),
            "pending" | "nog-niet-beschikbaar" => Ok(RegistrationStatus::NotYetAvailable),
            other => Err(format!(
                "unknown status {other}; expected open, closed or pending"
            )),
        }
    }
}

/// One row of the competition calendar.
///
/// Instances are immutable once constructed; a fetch cycle replaces the whole
/// published collection, never individual records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionEvent {
    pub id: String,
    pub date: NaiveDate,
    pub event_type: String,
    pub category: String,
    pub organizer: String,
    pub location: String,
    pub notes: String,
    pub status: RegistrationStatus,
}

impl CompetitionEvent {
    /// Deterministic identity derived from `(date, type)`.
    ///
    /// The same logical event fetched twice, even from different endpoints,
    /// collapses to one id. Two events sharing a date and type at different
    /// locations conflate as well; that is the calendar's own identity notion.
    pub fn identity(date: NaiveDate, event_type: &str) -> String {
        let material = format!(
            "{}|{}",
            date.format("%Y-%m-%d"),
            event_type.trim().to_lowercase()
        );
        let digest = Sha256::digest(material.as_bytes());
        hex::encode(digest)[..24].to_string()
    }

    pub fn new(
        date: NaiveDate,
        event_type: String,
        category: String,
        organizer: String,
        location: String,
        notes: String,
        status: RegistrationStatus,
    ) -> Self {
        Self {
            id: Self::identity(date, &event_type),
            date,
            event_type,
            category,
            organizer,
            location,
            notes,
            status,
        }
    }
}

/// User-annotated projection of a [`CompetitionEvent`], owned by the
/// presentation layer and persisted through [`crate::store::CompletedStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedEntry {
    pub event_id: String,
    pub date: NaiveDate,
    pub event_type: String,
    pub category: String,
    pub location: String,
    pub notes: String,
    pub ranking: Option<u32>,
}

impl CompletedEntry {
    pub fn from_event(event: &CompetitionEvent, notes: String, ranking: Option<u32>) -> Self {
        Self {
            event_id: event.id.clone(),
            date: event.date,
            event_type: event.event_type.clone(),
            category: event.category.clone(),
            location: event.location.clone(),
            notes,
            ranking,
        }
    }
}

/// Summary of one extraction cycle, for logging and diagnostics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub endpoints_tried: usize,
    pub winning_endpoint: Option<String>,
    pub candidates_seen: usize,
    pub records_published: usize,
}
