use crate::config::{ParseConfig, ParsePolicy};
use crate::dates::{self, DateLocale};
use crate::heuristics::{self, FieldKind};
use crate::model::CompetitionEvent;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// A tentative record extracted by one strategy, before date normalization
/// and status classification.
#[derive(Debug, Clone, Default)]
pub struct Candidate {
    pub date_text: String,
    pub type_text: String,
    pub category: String,
    pub organizer: String,
    pub location: String,
    pub notes: String,
    pub status_text: String,
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub events: Vec<CompetitionEvent>,
    /// Raw candidates across all strategies that ran, including ones that
    /// failed finalization.
    pub candidates: usize,
}

/// Run the markup strategies over one fetched document.
///
/// Strategies run in fixed priority order table, list, free-text. Under the
/// `union` policy all three run and their finalized records are combined;
/// under `first_success` later strategies only run when earlier ones yielded
/// nothing. Per-record failures are dropped silently; nothing here is fatal.
pub fn parse_document(html: &str, cfg: &ParseConfig) -> ParseOutcome {
    let doc = Html::parse_document(html);
    let container = find_container(&doc, &cfg.container_selectors);

    let mut outcome = ParseOutcome::default();
    run_strategy(&mut outcome, "table", table_strategy(container, cfg), cfg);
    if cfg.policy == ParsePolicy::Union || outcome.events.is_empty() {
        run_strategy(&mut outcome, "list", list_strategy(container, cfg), cfg);
    }
    if cfg.policy == ParsePolicy::Union || outcome.events.is_empty() {
        run_strategy(&mut outcome, "free_text", free_text_strategy(container), cfg);
    }

    outcome
}

fn run_strategy(
    outcome: &mut ParseOutcome,
    name: &str,
    candidates: Vec<Candidate>,
    cfg: &ParseConfig,
) {
    outcome.candidates += candidates.len();
    let mut yielded = 0usize;
    for candidate in candidates {
        if let Some(event) = finalize_candidate(candidate, cfg.date_locale) {
            outcome.events.push(event);
            yielded += 1;
        }
    }
    debug!(strategy = name, records = yielded, "strategy finished");
}

/// Locate the subtree presumed to hold the listing content: first element
/// matching any candidate selector, in order, else the whole document.
fn find_container<'a>(doc: &'a Html, selectors: &[String]) -> ElementRef<'a> {
    for selector_text in selectors {
        match Selector::parse(selector_text) {
            Ok(selector) => {
                if let Some(element) = doc.select(&selector).next() {
                    return element;
                }
            }
            Err(err) => {
                warn!(selector = %selector_text, error = ?err, "invalid container selector; skipping");
            }
        }
    }

    doc.root_element()
}

/// Column indexes resolved from a table's header row.
#[derive(Debug, Clone, Copy, Default)]
struct ColumnMap {
    date: Option<usize>,
    event_type: Option<usize>,
    category: Option<usize>,
    organizer: Option<usize>,
    location: Option<usize>,
    status: Option<usize>,
    notes: Option<usize>,
}

impl ColumnMap {
    /// A table is only worth reading when at least a date-like and a
    /// type-like column were recognized.
    fn is_usable(&self) -> bool {
        self.date.is_some() && self.event_type.is_some()
    }

    /// The calendar's long-standing dense layout: six ordered columns with
    /// no usable header text.
    fn positional() -> Self {
        Self {
            date: Some(0),
            event_type: Some(1),
            category: Some(2),
            organizer: Some(3),
            location: Some(4),
            status: Some(5),
            notes: None,
        }
    }

    fn claim(&mut self, kind: FieldKind, index: usize) {
        let slot = match kind {
            FieldKind::Date => &mut self.date,
            FieldKind::Type => &mut self.event_type,
            FieldKind::Category => &mut self.category,
            FieldKind::Organizer => &mut self.organizer,
            FieldKind::Location => &mut self.location,
            FieldKind::Status => &mut self.status,
            FieldKind::Notes => &mut self.notes,
        };
        if slot.is_none() {
            *slot = Some(index);
        }
    }
}

fn resolve_columns(headers: &[String]) -> ColumnMap {
    let mut map = ColumnMap::default();
    for (index, header) in headers.iter().enumerate() {
        if let Some(kind) = heuristics::classify_header(header) {
            map.claim(kind, index);
        }
    }
    map
}

/// Resolve columns from the shapes of the first data row's cells, for
/// header-less markup that does not match the dense layout.
fn shape_columns(cells: &[String]) -> ColumnMap {
    let mut map = ColumnMap::default();
    for (index, cell) in cells.iter().enumerate() {
        map.claim(heuristics::classify_cell(cell), index);
    }
    map
}

fn table_strategy(container: ElementRef<'_>, cfg: &ParseConfig) -> Vec<Candidate> {
    let table_sel = Selector::parse("table").expect("table selector must parse");
    let row_sel = Selector::parse("tr").expect("tr selector must parse");
    let header_cell_sel = Selector::parse("th, td").expect("header cell selector must parse");
    let th_sel = Selector::parse("th").expect("th selector must parse");
    let td_sel = Selector::parse("td").expect("td selector must parse");

    let mut out = Vec::new();

    for table in container.select(&table_sel) {
        let rows: Vec<ElementRef<'_>> = table.select(&row_sel).collect();
        let Some(first_row) = rows.first() else {
            continue;
        };

        let headers: Vec<String> = first_row.select(&header_cell_sel).map(element_text).collect();
        if headers.len() < cfg.min_columns {
            debug!(columns = headers.len(), "table narrower than minimum; skipping");
            continue;
        }

        let resolved = resolve_columns(&headers);
        let (columns, data_rows) = if resolved.is_usable() {
            (resolved, &rows[1..])
        } else if first_row.select(&th_sel).next().is_none() {
            // No recognizable header row. Six or more columns is the
            // calendar's dense ordered layout; anything narrower gets its
            // columns classified by cell shape. Either way every row is data.
            let columns = if headers.len() >= 6 {
                ColumnMap::positional()
            } else {
                shape_columns(&headers)
            };
            if !columns.is_usable() {
                debug!(cells = ?headers, "headerless table has no date/type shaped cells; skipping");
                continue;
            }
            (columns, &rows[..])
        } else {
            debug!(headers = ?headers, "no date/type columns resolved; skipping table");
            continue;
        };

        for row in data_rows {
            let cells: Vec<String> = row.select(&td_sel).map(element_text).collect();
            if cells.is_empty() {
                continue;
            }

            let cell = |index: Option<usize>| -> String {
                index.and_then(|i| cells.get(i)).cloned().unwrap_or_default()
            };

            out.push(Candidate {
                date_text: cell(columns.date),
                type_text: cell(columns.event_type),
                category: cell(columns.category),
                organizer: cell(columns.organizer),
                location: cell(columns.location),
                notes: cell(columns.notes),
                status_text: cell(columns.status),
            });
        }
    }

    out
}

const DATE_SELECTORS: &[&str] = &[".datum", ".date", "time", ".event-date"];
const TYPE_SELECTORS: &[&str] = &[".type", ".titel", ".title", "h3", "h4"];
const CATEGORY_SELECTORS: &[&str] = &[".categorie", ".category", ".klasse"];
const ORGANIZER_SELECTORS: &[&str] = &[".organisator", ".organizer", ".vereniging"];
const LOCATION_SELECTORS: &[&str] = &[".locatie", ".location", ".plaats"];
const STATUS_SELECTORS: &[&str] = &[".status", ".inschrijving"];
const NOTES_SELECTORS: &[&str] = &[".opmerking", ".notes"];

fn list_strategy(container: ElementRef<'_>, cfg: &ParseConfig) -> Vec<Candidate> {
    let mut out = Vec::new();

    for selector_text in &cfg.item_selectors {
        let selector = match Selector::parse(selector_text) {
            Ok(selector) => selector,
            Err(err) => {
                warn!(selector = %selector_text, error = ?err, "invalid item selector; skipping");
                continue;
            }
        };

        for item in container.select(&selector) {
            out.push(Candidate {
                date_text: first_text(item, DATE_SELECTORS),
                type_text: first_text(item, TYPE_SELECTORS),
                category: first_text(item, CATEGORY_SELECTORS),
                organizer: first_text(item, ORGANIZER_SELECTORS),
                location: first_text(item, LOCATION_SELECTORS),
                notes: first_text(item, NOTES_SELECTORS),
                status_text: first_text(item, STATUS_SELECTORS),
            });
        }
    }

    out
}

/// Last-resort scan over arbitrary elements: any element whose direct text
/// carries a date-like token becomes a candidate, with the remainder split
/// on separator punctuation into type, location, category and status
/// positionally. A missing status part classifies to the default.
fn free_text_strategy(container: ElementRef<'_>) -> Vec<Candidate> {
    let mut out = Vec::new();

    for node in container.descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };

        let own = own_text(&element);
        let Some((start, end)) = dates::date_token(&own) else {
            continue;
        };

        let date_text = own[start..end].to_string();
        let remainder = format!("{} {}", &own[..start], &own[end..]);
        let parts: Vec<&str> = remainder
            .split([',', ';', '|', '\u{2022}'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        let part = |index: usize| parts.get(index).map(|p| p.to_string()).unwrap_or_default();

        out.push(Candidate {
            date_text,
            type_text: part(0),
            location: part(1),
            category: part(2),
            organizer: String::new(),
            notes: String::new(),
            status_text: part(3),
        });
    }

    out
}

/// Finalize one candidate: the date must normalize, the status always
/// classifies, and a candidate whose type, category and location are all
/// empty is rejected. Failures are silent by contract.
pub fn finalize_candidate(candidate: Candidate, locale: DateLocale) -> Option<CompetitionEvent> {
    let Some(date) = dates::normalize(&candidate.date_text, locale) else {
        debug!(date_text = %candidate.date_text, "candidate date did not normalize; dropping");
        return None;
    };

    let event_type = candidate.type_text.trim().to_string();
    let category = candidate.category.trim().to_string();
    let location = candidate.location.trim().to_string();

    if event_type.is_empty() && category.is_empty() && location.is_empty() {
        debug!("candidate has no type, category or location; dropping");
        return None;
    }

    Some(CompetitionEvent::new(
        date,
        event_type,
        category,
        candidate.organizer.trim().to_string(),
        location,
        candidate.notes.trim().to_string(),
        heuristics::classify_status(&candidate.status_text),
    ))
}

/// Full text of an element with internal whitespace collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text belonging directly to this element, excluding descendant elements.
/// Keeps the free-text scan from re-reporting a date once per ancestor.
fn own_text(element: &ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text().map(|text| text.text.to_string()))
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(item: ElementRef<'_>, selectors: &[&str]) -> String {
    for selector_text in selectors {
        let Ok(selector) = Selector::parse(selector_text) else {
            continue;
        };
        if let Some(element) = item.select(&selector).next() {
            let text = element_text(element);
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}
