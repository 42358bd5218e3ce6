//! Per-manufacturer dealer-search adapters.
//!
//! Each manufacturer ships a [`SourceProfile`] describing its search page:
//! entry URL, consent controls, search input, submit controls, and the
//! domains to exclude from website extraction. The drive sequence itself
//! is shared: [`discover_source`] runs the same interaction flow against
//! every profile.

mod kia;
mod opel;
mod seat;

use std::time::Duration;

use dealerdb_core::{Contact, DealerCandidate, Manufacturer};

use crate::address::parse_address;
use crate::automation::{AutomationEngine, Locator, PageSession, ScrollTarget};
use crate::extract::{extract_dealer_blocks, RawDealerBlock};
use crate::geocode::Geocoder;

/// Below this many candidates a page likely lazy-loads more results, so
/// one extra scroll-and-extract cycle runs before giving up.
const MIN_EXPECTED_CANDIDATES: usize = 5;

/// How one manufacturer's dealer-search page is driven.
pub struct SourceProfile {
    pub manufacturer: Manufacturer,
    pub entry_url: &'static str,
    /// Consent-accept controls, most specific first. Clicking any one of
    /// them ends consent handling.
    pub consent_accepts: Vec<Locator>,
    /// Overlay containers to hide when no accept control can be clicked.
    pub consent_overlays: Vec<Locator>,
    /// Search-input candidates, main-content-scoped first. The last entry
    /// is the unconditional fallback.
    pub search_inputs: Vec<Locator>,
    /// Labeled submit controls; when none is visible the postal code is
    /// confirmed with the Enter key instead.
    pub submit_buttons: Vec<Locator>,
    /// Domains owned by the source itself, excluded when extracting a
    /// dealer's own website link.
    pub own_domains: &'static [&'static str],
}

/// Deadlines and pauses for one adapter run.
#[derive(Debug, Clone, Copy)]
pub struct StepTimeouts {
    pub navigation: Duration,
    pub step: Duration,
    /// Pause after navigation for client-side rendering to settle.
    pub settle: Duration,
    /// Pause after submitting the search for results to arrive.
    pub results_wait: Duration,
    /// Pause on each scroll stop for lazy-loaded content.
    pub scroll_pause: Duration,
}

impl StepTimeouts {
    #[must_use]
    pub fn new(navigation: Duration, step: Duration) -> Self {
        Self {
            navigation,
            step,
            settle: Duration::from_secs(3),
            results_wait: Duration::from_secs(4),
            scroll_pause: Duration::from_secs(1),
        }
    }
}

/// The profile driving a given manufacturer's dealer search.
#[must_use]
pub fn profile_for(manufacturer: Manufacturer) -> SourceProfile {
    match manufacturer {
        Manufacturer::Kia => kia::profile(),
        Manufacturer::Seat => seat::profile(),
        Manufacturer::Opel => opel::profile(),
    }
}

/// Run one manufacturer's dealer search for a postal code.
///
/// Never errors to its caller: any failure is logged and degrades to an
/// empty contribution, so one broken source cannot sink a multi-source
/// run. The rendering session is released before enrichment starts, on
/// success and failure alike.
pub async fn discover_source<E: AutomationEngine>(
    engine: &E,
    geocoder: &Geocoder,
    profile: &SourceProfile,
    postal_code: &str,
    timeouts: &StepTimeouts,
) -> Vec<DealerCandidate> {
    let manufacturer = profile.manufacturer;
    tracing::info!(%manufacturer, postal_code, "starting dealer search");

    let session = match engine.launch().await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(%manufacturer, error = %e, "could not launch rendering session");
            return Vec::new();
        }
    };

    let blocks = match capture_blocks(&session, profile, postal_code, timeouts).await {
        Ok(blocks) => blocks,
        Err(e) => {
            tracing::warn!(%manufacturer, error = %e, "dealer search aborted");
            Vec::new()
        }
    };
    session.close().await;

    let mut candidates = Vec::with_capacity(blocks.len());
    for block in blocks {
        candidates.push(enrich(block, manufacturer, postal_code, geocoder).await);
    }
    tracing::info!(
        %manufacturer,
        postal_code,
        count = candidates.len(),
        "dealer search finished"
    );
    candidates
}

/// Drive the page and return raw dealer blocks from its rendered markup.
async fn capture_blocks<S: PageSession>(
    session: &S,
    profile: &SourceProfile,
    postal_code: &str,
    timeouts: &StepTimeouts,
) -> Result<Vec<RawDealerBlock>, crate::automation::AutomationError> {
    session.navigate(profile.entry_url, timeouts.navigation).await?;
    tokio::time::sleep(timeouts.settle).await;

    dismiss_consent(session, profile, timeouts).await;

    let input = locate_search_input(session, profile, timeouts).await;
    session.fill(&input, postal_code).await?;
    submit_search(session, profile, &input, timeouts).await?;
    tokio::time::sleep(timeouts.results_wait).await;

    let mut blocks = scroll_and_extract(session, profile, timeouts).await?;
    if blocks.len() < MIN_EXPECTED_CANDIDATES {
        let more = scroll_and_extract(session, profile, timeouts).await?;
        merge_blocks(&mut blocks, more);
    }
    Ok(blocks)
}

/// Click the first visible accept control; when none responds, hide the
/// overlay containers outright so they cannot intercept later clicks.
/// A page without an overlay is the good case, not an error.
async fn dismiss_consent<S: PageSession>(
    session: &S,
    profile: &SourceProfile,
    timeouts: &StepTimeouts,
) {
    for accept in &profile.consent_accepts {
        if session.is_visible(accept, timeouts.step).await
            && session.click(accept, true).await.is_ok()
        {
            tracing::debug!(locator = %accept, "consent accepted");
            return;
        }
    }
    for overlay in &profile.consent_overlays {
        if let Err(e) = session.hide(overlay).await {
            tracing::debug!(locator = %overlay, error = %e, "could not hide overlay");
        }
    }
}

/// First visible ranked input wins; the last entry is used unconditionally
/// so a slow page still gets one fill attempt.
async fn locate_search_input<S: PageSession>(
    session: &S,
    profile: &SourceProfile,
    timeouts: &StepTimeouts,
) -> Locator {
    for input in &profile.search_inputs[..profile.search_inputs.len() - 1] {
        if session.is_visible(input, timeouts.step).await {
            return input.clone();
        }
    }
    profile
        .search_inputs
        .last()
        .cloned()
        .unwrap_or_else(|| Locator::css("input[type='text']"))
}

async fn submit_search<S: PageSession>(
    session: &S,
    profile: &SourceProfile,
    input: &Locator,
    timeouts: &StepTimeouts,
) -> Result<(), crate::automation::AutomationError> {
    for button in &profile.submit_buttons {
        if session.is_visible(button, timeouts.step).await {
            // Forced click: result overlays routinely sit on top of the
            // submit button.
            session.click(button, true).await?;
            return Ok(());
        }
    }
    session.press_enter(input).await
}

/// One scroll-down/scroll-up pass to trigger lazy loading, then a full
/// DOM snapshot through the extractor.
async fn scroll_and_extract<S: PageSession>(
    session: &S,
    profile: &SourceProfile,
    timeouts: &StepTimeouts,
) -> Result<Vec<RawDealerBlock>, crate::automation::AutomationError> {
    session.scroll_to(ScrollTarget::Bottom).await?;
    tokio::time::sleep(timeouts.scroll_pause).await;
    session.scroll_to(ScrollTarget::Top).await?;
    tokio::time::sleep(timeouts.scroll_pause).await;

    let html = session.content().await?;
    Ok(extract_dealer_blocks(&html, profile.own_domains))
}

/// Merge a second extraction pass into the first, keeping the earlier
/// block when names collide.
fn merge_blocks(blocks: &mut Vec<RawDealerBlock>, more: Vec<RawDealerBlock>) {
    for block in more {
        let name = block.name.to_lowercase();
        if !blocks.iter().any(|b| b.name.to_lowercase() == name) {
            blocks.push(block);
        }
    }
}

/// Turn a raw block into a candidate: parse and back-fill the address,
/// then attach coordinates when the geocoder has any.
async fn enrich(
    block: RawDealerBlock,
    manufacturer: Manufacturer,
    postal_code: &str,
    geocoder: &Geocoder,
) -> DealerCandidate {
    let raw_address = if block.address_text.is_empty() {
        block.block_text.as_str()
    } else {
        block.address_text.as_str()
    };
    let address = parse_address(raw_address, postal_code);

    let coordinates = geocoder
        .resolve(&address.street, &address.city, &address.postal_code)
        .await;
    if coordinates.is_none() {
        tracing::debug!(name = %block.name, "candidate kept without coordinates");
    }

    DealerCandidate {
        name: block.name,
        manufacturer,
        address,
        coordinates,
        contact: Contact {
            phone: block.phone,
            email: block.email,
            website: block.website,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::automation::fake::FakeEngine;

    fn fast_timeouts() -> StepTimeouts {
        StepTimeouts::new(Duration::from_secs(30), Duration::from_secs(5))
    }

    fn offline_geocoder() -> Geocoder {
        // Nothing listens here, so every enrichment attempt yields None.
        Geocoder::new(
            "http://127.0.0.1:9",
            "dealerdb-test/0.1",
            Duration::from_secs(1),
        )
        .unwrap()
    }

    fn dealer_page() -> String {
        "<html><body>\n\
         <div class=\"dealer-card\">\n\
           <h3>Autohaus Schmidt GmbH</h3>\n\
           <p>Hauptstraße 1, 10115 Berlin</p>\n\
           <p>Telefon: +49 30 1234567</p>\n\
         </div>\n\
         </body></html>"
            .to_string()
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_paths_still_produce_candidates() {
        // The fake session reports nothing visible, which forces the
        // last-ranked input and the Enter-key submit fallback.
        let engine = FakeEngine::default();
        engine.serve("kia.com", &dealer_page());

        let geocoder = offline_geocoder();
        let profile = profile_for(Manufacturer::Kia);
        let candidates =
            discover_source(&engine, &geocoder, &profile, "10115", &fast_timeouts()).await;

        assert_eq!(candidates.len(), 1);
        let candidate = &candidates[0];
        assert_eq!(candidate.name, "Autohaus Schmidt GmbH");
        assert_eq!(candidate.manufacturer, Manufacturer::Kia);
        assert_eq!(candidate.address.street, "Hauptstraße 1");
        assert_eq!(candidate.address.postal_code, "10115");
        assert_eq!(candidate.address.city, "Berlin");
        assert!(candidate.coordinates.is_none());
        assert_eq!(engine.launch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn navigation_failure_degrades_to_empty() {
        let engine = FakeEngine::default();
        engine.fail_navigation_containing("seat.de");

        let geocoder = offline_geocoder();
        let profile = profile_for(Manufacturer::Seat);
        let candidates =
            discover_source(&engine, &geocoder, &profile, "10115", &fast_timeouts()).await;

        assert!(candidates.is_empty());
        assert_eq!(engine.launch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sparse_page_triggers_second_extraction_pass_without_duplicates() {
        // One dealer is below the lazy-load threshold; the retry pass
        // re-extracts the same page and the name merge must not double it.
        let engine = FakeEngine::default();
        engine.serve("opel.de", &dealer_page());

        let geocoder = offline_geocoder();
        let profile = profile_for(Manufacturer::Opel);
        let candidates =
            discover_source(&engine, &geocoder, &profile, "10115", &fast_timeouts()).await;

        assert_eq!(candidates.len(), 1);
    }
}
