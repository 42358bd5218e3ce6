//! KIA Germany dealer search.
//!
//! Single-page app behind a OneTrust consent layer. The page's header
//! carries its own sitewide search input, which must never receive the
//! postal code; the ranked input list scopes to main content first and
//! excludes `#header_search_input` everywhere.

use dealerdb_core::Manufacturer;

use super::SourceProfile;
use crate::automation::Locator;

pub(super) fn profile() -> SourceProfile {
    SourceProfile {
        manufacturer: Manufacturer::Kia,
        entry_url: "https://www.kia.com/de/haendlersuche/#/",
        consent_accepts: vec![
            Locator::css("#onetrust-accept-btn-handler"),
            Locator::button_text("Alle akzeptieren"),
            Locator::button_text("Akzeptieren"),
        ],
        consent_overlays: vec![
            Locator::css("#onetrust-consent-sdk"),
            Locator::css("#onetrust-banner-sdk"),
        ],
        search_inputs: vec![
            Locator::css("main input[type='text']:not(#header_search_input)"),
            Locator::css("main input[type='search']:not(#header_search_input)"),
            Locator::css("input[placeholder*='PLZ']:not(#header_search_input)"),
            Locator::css("input[type='text']:not(#header_search_input)"),
        ],
        submit_buttons: vec![
            Locator::button_text("SUCHE"),
            Locator::button_text("Suchen"),
        ],
        own_domains: &["kia.com", "kia.de"],
    }
}
