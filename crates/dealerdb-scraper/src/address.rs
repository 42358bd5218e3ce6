//! Parsing and back-filling of free-form German address text.

use std::sync::LazyLock;

use regex::Regex;

use dealerdb_core::Address;

static POSTAL_CITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{5})\s*(.+)").expect("valid regex"));

static POSTAL_CITY_ANYWHERE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{5})\s+([A-ZÄÖÜ][a-zäöüß]+(?:\s+[A-ZÄÖÜ][a-zäöüß]+)*)").expect("valid regex"));

static STREET_PHRASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-ZÄÖÜ][a-zäöüß]+(?:straße|strasse|weg|allee|platz|ring|gasse)\s*\d+[a-z]?)")
        .expect("valid regex")
});

/// Split a raw address string into street, postal code, and city.
///
/// Comma-structured text is the common case ("Hauptstraße 1, 10115
/// Berlin"): the first segment is the street, the last segment carries
/// postal code and city. Without commas, postal/city and street-like
/// phrases are fished out of the whole text. Fields that stay empty are
/// filled by [`backfill`] afterwards.
#[must_use]
pub fn parse_address(raw: &str, search_postal: &str) -> Address {
    let mut street = String::new();
    let mut postal_code = String::new();
    let mut city = String::new();

    let segments: Vec<&str> = raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
    if segments.len() >= 2 {
        street = segments[0].to_string();
        if let Some(caps) = POSTAL_CITY_RE.captures(segments[segments.len() - 1]) {
            postal_code = caps[1].to_string();
            city = caps[2].trim().to_string();
        }
    }

    if postal_code.is_empty() {
        if let Some(caps) = POSTAL_CITY_ANYWHERE_RE.captures(raw) {
            postal_code = caps[1].to_string();
            city = caps[2].trim().to_string();
        }
    }
    if street.is_empty() {
        if let Some(caps) = STREET_PHRASE_RE.captures(raw) {
            street = caps[1].trim().to_string();
        }
    }

    backfill(Address {
        street,
        city,
        postal_code,
        country: String::from("Germany"),
    }, search_postal)
}

/// Fill remaining gaps so no candidate leaves with an empty address field.
/// A postal-code-only record still anchors to the searched area.
fn backfill(mut address: Address, search_postal: &str) -> Address {
    if address.postal_code.is_empty() {
        address.postal_code = search_postal.to_string();
    }
    if address.city.is_empty() {
        address.city = format!("Area {}", address.postal_code);
    }
    if address.street.is_empty() {
        address.street = address.city.clone();
    }
    address
}
