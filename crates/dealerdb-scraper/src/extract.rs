//! Heuristic dealer-record extraction from rendered markup.
//!
//! The manufacturer sites expose no stable schema; dealer entries are
//! recognized by shape. An element qualifies as a dealer block when it
//! carries a 5-digit postal code plus at least one of a phone-shaped
//! substring, a `"text, 12345 City"` address shape, or a legal-entity
//! name suffix. Everything here is a pure function over an HTML snapshot,
//! so it can be fixture-tested without a browser.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Elements with less text than this are menu items and labels, not
/// dealer cards.
const MIN_BLOCK_CHARS: usize = 40;
/// A qualifying block must carry more than a bare postal code line.
const MIN_CANDIDATE_CHARS: usize = 50;
const MIN_NAME_CHARS: usize = 3;
const MAX_NAME_LINE_CHARS: usize = 100;

/// Markers of cookie banners, footers, and page chrome that match the
/// postal/phone heuristics but are never dealer entries.
const BOILERPLATE_MARKERS: [&str; 5] =
    ["Cookie", "Datenschutz", "Impressum", "Navigation", "Menu"];

static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{5})\b").expect("valid regex"));

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\d{1,4}[\s-]?\(?\d{1,4}\)?[\s-]?\d{1,4}[\s-]?\d{1,4}[\s-]?\d{1,4}")
        .expect("valid regex")
});

static ADDRESS_SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-ZÄÖÜ][a-zäöüß]+(?:\s+[A-ZÄÖÜ][a-zäöüß]+)*,\s*\d{5}").expect("valid regex")
});

/// Legal-entity suffixes and generic dealer-naming tokens.
static COMPANY_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:GmbH|AG|KG|OHG|e\.\s?K\.|Autohaus|Center|Händler)").expect("valid regex")
});

static NAME_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[A-ZÄÖÜ][a-zäöüß]+").expect("valid regex"));

static LEADING_ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("valid regex"));

/// Address candidates, most specific first: full street + postal + city,
/// then short street + postal + city, then bare postal + city.
static ADDRESS_EXTRACT_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(
            r"([A-ZÄÖÜ][a-zäöüß\s]+(?:\d+[a-z]?)?(?:\s+[A-ZÄÖÜ][a-zäöüß]+)*,\s*\d{5}\s+[A-ZÄÖÜ][a-zäöüß\s]+)",
        )
        .expect("valid regex"),
        Regex::new(r"([A-ZÄÖÜ][a-zäöüß\s]+,\s*\d{5}\s+[A-ZÄÖÜ][a-zäöüß]+)").expect("valid regex"),
        Regex::new(r"(\d{5}\s+[A-ZÄÖÜ][a-zäöüß\s]+)").expect("valid regex"),
    ]
});

static NON_PHONE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\d+\s()-]").expect("valid regex"));

static HEADING_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h2, h3, h4, h5, strong, [class*='name'], [class*='title']")
        .expect("valid selector")
});

static MAILTO_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href^='mailto:']").expect("valid selector"));

static HTTP_LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href^='http']").expect("valid selector"));

/// A dealer entry as matched on the page, before address parsing and
/// enrichment.
#[derive(Debug, Clone)]
pub struct RawDealerBlock {
    pub name: String,
    /// The address-shaped substring, may be empty when only the fallback
    /// patterns fire during parsing.
    pub address_text: String,
    /// Full text of the matched block, kept for fallback address parsing.
    pub block_text: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    /// The 5-digit code found in the block.
    pub postal_code: String,
}

/// Scan a rendered document for dealer-shaped content blocks.
///
/// Walks every element in document order, applies the shape heuristics,
/// and deduplicates by case-insensitive name — the first match wins and
/// later duplicates are dropped, since a repeated name is a restatement
/// (summary card after detail card), not new information.
///
/// `own_domains` filters the source's own links out of website extraction.
#[must_use]
pub fn extract_dealer_blocks(html: &str, own_domains: &[&str]) -> Vec<RawDealerBlock> {
    let document = Html::parse_document(html);
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut blocks = Vec::new();

    for element in document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
    {
        let tag = element.value().name();
        if tag == "script" || tag == "style" {
            continue;
        }

        let text = element_text(element);
        if text.chars().count() < MIN_BLOCK_CHARS {
            continue;
        }
        if BOILERPLATE_MARKERS.iter().any(|m| text.contains(m)) {
            continue;
        }

        // Strongest cheap discriminator: no postal code, no dealer.
        let Some(postal) = POSTAL_CODE_RE
            .captures(&text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
        else {
            continue;
        };

        let has_phone = PHONE_RE.is_match(&text);
        let has_address = ADDRESS_SHAPE_RE.is_match(&text);
        let has_company_name = COMPANY_NAME_RE.is_match(&text);
        if !(has_phone || has_address || has_company_name)
            || text.chars().count() <= MIN_CANDIDATE_CHARS
        {
            continue;
        }

        let Some(name) = extract_name(element, &text) else {
            continue;
        };
        let lowered = name.to_lowercase();
        if seen_names.contains(&lowered) {
            continue;
        }
        seen_names.insert(lowered);

        let address_text = ADDRESS_EXTRACT_RES
            .iter()
            .find_map(|re| re.captures(&text))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        // The phone pattern also matches a bare postal code, so keep only
        // matches with enough digits to be a dialable number.
        let phone = PHONE_RE
            .find_iter(&text)
            .map(|m| {
                NON_PHONE_CHARS_RE
                    .replace_all(m.as_str(), "")
                    .trim()
                    .to_string()
            })
            .find(|p| p.chars().filter(|c| c.is_ascii_digit()).count() >= 6);

        let email = element
            .select(&MAILTO_SELECTOR)
            .filter_map(|a| a.value().attr("href"))
            .map(|href| href.trim_start_matches("mailto:").to_string())
            .find(|addr| !addr.is_empty());

        let website = element
            .select(&HTTP_LINK_SELECTOR)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| !own_domains.iter().any(|domain| href.contains(domain)))
            .map(str::to_string);

        blocks.push(RawDealerBlock {
            name,
            address_text,
            block_text: text,
            phone,
            email,
            website,
            postal_code: postal,
        });
    }

    blocks
}

/// Text content of an element, one trimmed text node per line.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefer a heading-like sub-element for the name; otherwise take the
/// first line of the block that looks name-shaped. Leading ordinal
/// numbering ("1. Autohaus …") from result lists is stripped.
fn extract_name(element: ElementRef<'_>, text: &str) -> Option<String> {
    let mut name = element
        .select(&HEADING_SELECTOR)
        .map(|heading| element_text(heading))
        .find(|t| t.chars().count() >= MIN_NAME_CHARS)
        .unwrap_or_default();

    if name.chars().count() < MIN_NAME_CHARS {
        name = text
            .lines()
            .map(str::trim)
            .filter(|line| {
                let len = line.chars().count();
                len > 5 && len < MAX_NAME_LINE_CHARS && NAME_LINE_RE.is_match(line)
            })
            .map(str::to_string)
            .next()
            .unwrap_or_default();
    }

    let name = LEADING_ORDINAL_RE.replace(&name, "").trim().to_string();
    if name.chars().count() < MIN_NAME_CHARS {
        None
    } else {
        Some(name)
    }
}
