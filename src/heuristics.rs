use crate::dates;
use crate::model::RegistrationStatus;

/// Semantic role of a cell or sub-element within one calendar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Date,
    Type,
    Category,
    Organizer,
    Location,
    Status,
    Notes,
}

/// Header synonym lists, matched in declared order; the first list whose
/// tokens appear as a substring of the header wins. The tokens follow the
/// source site's Dutch column names, with English fallbacks for the
/// occasional restyled layout.
const HEADER_SYNONYMS: &[(FieldKind, &[&str])] = &[
    (FieldKind::Date, &["datum", "dag", "date"]),
    (FieldKind::Type, &["type", "soort", "wedstrijd", "discipline"]),
    (FieldKind::Category, &["categorie", "klasse", "category"]),
    (
        FieldKind::Organizer,
        &["organisator", "organisatie", "vereniging", "organizer"],
    ),
    (FieldKind::Location, &["locatie", "plaats", "location"]),
    (
        FieldKind::Notes,
        &["opmerking", "bijzonderheden", "notes"],
    ),
    (FieldKind::Status, &["status", "inschrijv"]),
];

const OPEN_KEYWORDS: &[&str] = &["inschrijven", "open"];
const CLOSED_KEYWORDS: &[&str] = &["gesloten", "vol"];

/// Cells longer than this are presumed to be the free-form event type when
/// no better shape matches.
const TYPE_LENGTH_THRESHOLD: usize = 16;

/// Classify a declared table header into a field.
pub fn classify_header(header: &str) -> Option<FieldKind> {
    let header = header.to_lowercase();
    for (kind, tokens) in HEADER_SYNONYMS {
        if tokens.iter().any(|token| header.contains(token)) {
            return Some(*kind);
        }
    }
    None
}

/// Content-shape fallback for markup with no usable headers.
///
/// Best-effort by design: it may misclassify, and the caller treats the
/// result as a hint rather than a fact.
pub fn classify_cell(text: &str) -> FieldKind {
    let trimmed = text.trim();

    if dates::looks_like_date(trimmed) {
        return FieldKind::Date;
    }

    let lowered = trimmed.to_lowercase();
    if OPEN_KEYWORDS.iter().any(|k| lowered.contains(k))
        || CLOSED_KEYWORDS.iter().any(|k| lowered.contains(k))
    {
        return FieldKind::Status;
    }

    if trimmed.contains(',') {
        return FieldKind::Location;
    }

    if trimmed.chars().count() > TYPE_LENGTH_THRESHOLD {
        return FieldKind::Type;
    }

    FieldKind::Category
}

/// Map free-text registration-status wording to a status value.
///
/// Case-insensitive substring match, fixed priority Open > Closed; anything
/// unrecognized (including empty text) is `NotYetAvailable`. Total for any
/// input.
pub fn classify_status(text: &str) -> RegistrationStatus {
    let lowered = text.to_lowercase();

    if OPEN_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return RegistrationStatus::Open;
    }
    if CLOSED_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return RegistrationStatus::Closed;
    }

    RegistrationStatus::NotYetAvailable
}
