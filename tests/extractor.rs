use chrono::NaiveDate;
use orweja_kalender::config::{ParseConfig, ParsePolicy};
use orweja_kalender::dates::{self, DateLocale, NUMERIC_FORMATS};
use orweja_kalender::heuristics::{FieldKind, classify_cell, classify_header, classify_status};
use orweja_kalender::model::{CompetitionEvent, RegistrationStatus};
use orweja_kalender::parser::parse_document;
use orweja_kalender::pipeline::finalize;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

#[test]
fn numeric_formats_round_trip() {
    let expected = date(2025, 5, 12);
    for format in NUMERIC_FORMATS {
        let rendered = expected.format(format).to_string();
        assert_eq!(
            dates::normalize(&rendered, DateLocale::Nl),
            Some(expected),
            "format {format} did not round-trip via {rendered}"
        );
    }
}

#[test]
fn normalize_reads_dutch_month_names() {
    assert_eq!(
        dates::normalize("12 mei 2025", DateLocale::Nl),
        Some(date(2025, 5, 12))
    );
    assert_eq!(
        dates::normalize("3 okt 2025", DateLocale::Nl),
        Some(date(2025, 10, 3))
    );
    assert_eq!(
        dates::normalize("May 12 is not day-first", DateLocale::Nl),
        None
    );
}

#[test]
fn normalize_tolerates_surrounding_text_and_whitespace() {
    assert_eq!(
        dates::normalize("Datum:   12-05-2025  (zaterdag)", DateLocale::Nl),
        Some(date(2025, 5, 12))
    );
    assert_eq!(dates::normalize("", DateLocale::Nl), None);
    assert_eq!(dates::normalize("not-a-date", DateLocale::Nl), None);
}

#[test]
fn status_classification_is_total() {
    assert_eq!(classify_status("Inschrijven"), RegistrationStatus::Open);
    assert_eq!(classify_status("INSCHRIJVING GEOPEND"), RegistrationStatus::Open);
    assert_eq!(classify_status("Gesloten"), RegistrationStatus::Closed);
    assert_eq!(classify_status("vol"), RegistrationStatus::Closed);
    assert_eq!(
        classify_status("Nog niet beschikbaar"),
        RegistrationStatus::NotYetAvailable
    );
    assert_eq!(classify_status(""), RegistrationStatus::NotYetAvailable);
    assert_eq!(classify_status("???"), RegistrationStatus::NotYetAvailable);
}

#[test]
fn header_synonyms_resolve_fields() {
    assert_eq!(classify_header("Datum"), Some(FieldKind::Date));
    assert_eq!(classify_header("Wedstrijdtype"), Some(FieldKind::Type));
    assert_eq!(classify_header("Categorie"), Some(FieldKind::Category));
    assert_eq!(classify_header("Organisator"), Some(FieldKind::Organizer));
    assert_eq!(classify_header("Locatie"), Some(FieldKind::Location));
    assert_eq!(classify_header("Status"), Some(FieldKind::Status));
    assert_eq!(classify_header("Prijs"), None);
}

#[test]
fn cell_shape_fallback_follows_priority() {
    assert_eq!(classify_cell("12-05-2025"), FieldKind::Date);
    assert_eq!(classify_cell("Inschrijven"), FieldKind::Status);
    assert_eq!(classify_cell("Amsterdam, Noord-Holland"), FieldKind::Location);
    assert_eq!(
        classify_cell("Internationale apporteerwedstrijd"),
        FieldKind::Type
    );
    assert_eq!(classify_cell("B"), FieldKind::Category);
}

const CALENDAR_TABLE: &str = r#"
<html><body><div class="content">
<table>
  <tr><th>Datum</th><th>Type</th><th>Categorie</th><th>Organisator</th><th>Locatie</th><th>Status</th></tr>
  <tr><td>12-05-2025</td><td>Veldwedstrijd</td><td>A</td><td>Club X</td><td>Amsterdam</td><td>Inschrijven</td></tr>
</table>
</div></body></html>
"#;

#[test]
fn table_strategy_extracts_headed_calendar_row() {
    let outcome = parse_document(CALENDAR_TABLE, &ParseConfig::default());
    assert_eq!(outcome.events.len(), 1);

    let event = &outcome.events[0];
    assert_eq!(event.date, date(2025, 5, 12));
    assert_eq!(event.event_type, "Veldwedstrijd");
    assert_eq!(event.category, "A");
    assert_eq!(event.organizer, "Club X");
    assert_eq!(event.location, "Amsterdam");
    assert_eq!(event.status, RegistrationStatus::Open);
}

#[test]
fn table_strategy_reads_reordered_columns_by_header() {
    let html = r#"
    <html><body><table>
      <tr><th>Locatie</th><th>Status</th><th>Datum</th><th>Soort wedstrijd</th></tr>
      <tr><td>Utrecht</td><td>Gesloten</td><td>01-06-2025</td><td>Jachthondenproef</td></tr>
    </table></body></html>
    "#;

    let outcome = parse_document(html, &ParseConfig::default());
    assert_eq!(outcome.events.len(), 1);
    assert_eq!(outcome.events[0].location, "Utrecht");
    assert_eq!(outcome.events[0].event_type, "Jachthondenproef");
    assert_eq!(outcome.events[0].status, RegistrationStatus::Closed);
}

#[test]
fn table_without_date_and_type_columns_yields_nothing() {
    let html = r#"
    <html><body><table>
      <tr><th>Naam</th><th>Prijs</th></tr>
      <tr><td>Clubdag</td><td>Gratis</td></tr>
    </table></body></html>
    "#;

    let outcome = parse_document(html, &ParseConfig::default());
    assert!(outcome.events.is_empty());
}

#[test]
fn headerless_dense_table_uses_positional_layout() {
    let html = r#"
    <html><body><table>
      <tr><td>12-05-2025</td><td>Veldwedstrijd</td><td>A</td><td>Club X</td><td>Amsterdam</td><td>Inschrijven</td></tr>
      <tr><td>13-05-2025</td><td>MAP</td><td>B</td><td>Club Y</td><td>Zwolle</td><td>Gesloten</td></tr>
    </table></body></html>
    "#;

    let outcome = parse_document(html, &ParseConfig::default());
    assert_eq!(outcome.events.len(), 2);
    assert_eq!(outcome.events[0].organizer, "Club X");
    assert_eq!(outcome.events[1].status, RegistrationStatus::Closed);
}

#[test]
fn headerless_narrow_table_classifies_cells_by_shape() {
    let html = r#"
    <html><body><table>
      <tr><td>12-05-2025</td><td>Internationale apporteerwedstrijd</td><td>Amsterdam, Noord-Holland</td><td>Inschrijven</td></tr>
    </table></body></html>
    "#;

    let outcome = parse_document(html, &ParseConfig::default());
    assert_eq!(outcome.events.len(), 1);

    let event = &outcome.events[0];
    assert_eq!(event.date, date(2025, 5, 12));
    assert_eq!(event.event_type, "Internationale apporteerwedstrijd");
    assert_eq!(event.location, "Amsterdam, Noord-Holland");
    assert_eq!(event.status, RegistrationStatus::Open);
}

#[test]
fn headerless_table_without_usable_shapes_yields_nothing() {
    let html = r#"
    <html><body><table>
      <tr><td>Clubdag</td><td>Gratis</td></tr>
    </table></body></html>
    "#;

    let outcome = parse_document(html, &ParseConfig::default());
    assert!(outcome.events.is_empty());
}

#[test]
fn malformed_date_row_is_dropped_silently() {
    let html = r#"
    <html><body><table>
      <tr><th>Datum</th><th>Type</th><th>Locatie</th></tr>
      <tr><td>not-a-date</td><td>Veldwedstrijd</td><td>Amsterdam</td></tr>
      <tr><td>12-05-2025</td><td>MAP</td><td>Zwolle</td></tr>
    </table></body></html>
    "#;

    let outcome = parse_document(html, &ParseConfig::default());
    assert_eq!(outcome.events.len(), 1);
    assert_eq!(outcome.events[0].event_type, "MAP");
}

#[test]
fn list_strategy_reads_event_items() {
    let html = r#"
    <html><body><div class="content"><ul>
      <li class="event">
        <span class="datum">03-08-2025</span>
        <span class="titel">Apporteerwedstrijd</span>
        <span class="locatie">Utrecht</span>
        <span class="status">Gesloten</span>
      </li>
    </ul></div></body></html>
    "#;

    let outcome = parse_document(html, &ParseConfig::default());
    assert_eq!(outcome.events.len(), 1);

    let event = &outcome.events[0];
    assert_eq!(event.date, date(2025, 8, 3));
    assert_eq!(event.event_type, "Apporteerwedstrijd");
    assert_eq!(event.location, "Utrecht");
    assert_eq!(event.category, "");
    assert_eq!(event.status, RegistrationStatus::Closed);
}

#[test]
fn free_text_strategy_splits_on_separators() {
    let html = r#"
    <html><body><div class="content">
      <p>12-05-2025 | Apporteerwedstrijd | Utrecht | B | Inschrijven</p>
    </div></body></html>
    "#;

    let outcome = parse_document(html, &ParseConfig::default());
    assert_eq!(outcome.events.len(), 1);

    let event = &outcome.events[0];
    assert_eq!(event.date, date(2025, 5, 12));
    assert_eq!(event.event_type, "Apporteerwedstrijd");
    assert_eq!(event.location, "Utrecht");
    assert_eq!(event.category, "B");
    assert_eq!(event.status, RegistrationStatus::Open);
}

#[test]
fn free_text_without_status_part_defaults_to_pending() {
    // "Volendam" must not read as "vol"; only a fourth part carries status.
    let html = r#"
    <html><body><div class="content">
      <p>12-05-2025 | Jachthondenproef | Volendam</p>
    </div></body></html>
    "#;

    let outcome = parse_document(html, &ParseConfig::default());
    assert_eq!(outcome.events.len(), 1);

    let event = &outcome.events[0];
    assert_eq!(event.event_type, "Jachthondenproef");
    assert_eq!(event.location, "Volendam");
    assert_eq!(event.status, RegistrationStatus::NotYetAvailable);
}

#[test]
fn first_success_policy_stops_after_table_strategy() {
    let html = r#"
    <html><body><div class="content">
      <table>
        <tr><th>Datum</th><th>Type</th></tr>
        <tr><td>12-05-2025</td><td>Veldwedstrijd</td></tr>
      </table>
      <p>01-06-2025 | Jachthondenproef | Utrecht</p>
    </div></body></html>
    "#;

    let first_success = ParseConfig {
        policy: ParsePolicy::FirstSuccess,
        ..ParseConfig::default()
    };
    let outcome = parse_document(html, &first_success);
    assert_eq!(outcome.events.len(), 1);
    assert_eq!(outcome.events[0].event_type, "Veldwedstrijd");

    let union = ParseConfig::default();
    let merged = finalize(parse_document(html, &union).events);
    assert_eq!(merged.len(), 2);
}

#[test]
fn finalize_deduplicates_by_date_and_type() {
    let a = CompetitionEvent::new(
        date(2025, 5, 12),
        "Veldwedstrijd".into(),
        "A".into(),
        "Club X".into(),
        "Amsterdam".into(),
        String::new(),
        RegistrationStatus::Open,
    );
    let b = CompetitionEvent::new(
        date(2025, 5, 12),
        "veldwedstrijd".into(),
        "B".into(),
        "Club Y".into(),
        "Zwolle".into(),
        String::new(),
        RegistrationStatus::Closed,
    );

    assert_eq!(a.id, b.id);
    let merged = finalize(vec![a, b]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].location, "Amsterdam");
}

#[test]
fn finalize_sorts_chronologically() {
    let mk = |d: NaiveDate, t: &str| {
        CompetitionEvent::new(
            d,
            t.into(),
            String::new(),
            String::new(),
            "Ergens".into(),
            String::new(),
            RegistrationStatus::NotYetAvailable,
        )
    };

    let merged = finalize(vec![
        mk(date(2025, 9, 1), "C"),
        mk(date(2025, 3, 1), "A"),
        mk(date(2025, 6, 1), "B"),
    ]);

    for pair in merged.windows(2) {
        assert!(pair[0].date <= pair[1].date);
    }
    assert_eq!(merged[0].event_type, "A");
}
