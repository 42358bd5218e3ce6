//! Seat Germany dealer search.

use dealerdb_core::Manufacturer;

use super::SourceProfile;
use crate::automation::Locator;

pub(super) fn profile() -> SourceProfile {
    SourceProfile {
        manufacturer: Manufacturer::Seat,
        entry_url: "https://www.seat.de/kontakt/haendlersuche",
        consent_accepts: vec![
            Locator::css("#onetrust-accept-btn-handler"),
            Locator::button_text("Alle akzeptieren"),
            Locator::button_text("Akzeptieren"),
        ],
        consent_overlays: vec![
            Locator::css("#onetrust-consent-sdk"),
            Locator::css(".cookie-consent"),
        ],
        search_inputs: vec![
            Locator::css("main input[placeholder*='PLZ']"),
            Locator::css("main input[placeholder*='Postleitzahl']"),
            Locator::css("main input[type='text']"),
            Locator::css("input[type='text']"),
        ],
        submit_buttons: vec![
            Locator::button_text("Suchen"),
            Locator::button_text("Suche"),
        ],
        own_domains: &["seat.de", "seat.com"],
    }
}
