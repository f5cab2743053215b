//! Field extraction from one listing container.
//!
//! Every field is an ordered list of strategies tried until the first one
//! yields a non-empty value. No selector is guaranteed present in
//! third-party markup; a container without any recognizable name produces
//! no record at all.

use regex::Regex;
use scraper::{ElementRef, Html};

use crate::containers::{locate_containers, sel, text_of};
use crate::types::BusinessRecord;

/// One extraction attempt: a container goes in, a trimmed value or nothing
/// comes out.
type Strategy = for<'a> fn(ElementRef<'a>) -> Option<String>;

const NAME_STRATEGIES: &[Strategy] = &[name_itemprop, name_styled_heading, name_any_heading];
const PHONE_STRATEGIES: &[Strategy] = &[phone_itemprop_tel, phone_any_tel];
const INSTAGRAM_STRATEGIES: &[Strategy] = &[instagram_itemprop, instagram_any_link];
const DESCRIPTION_STRATEGIES: &[Strategy] = &[
    description_itemprop,
    description_styled,
    description_first_paragraph,
];
const ADDRESS_STRATEGIES: &[Strategy] = &[
    address_itemprop,
    address_element,
    address_labeled_paragraph,
];
const EMAIL_STRATEGIES: &[Strategy] = &[email_mailto, email_itemprop, email_in_text];

/// Address paragraphs are recognized by a label token in either script.
const ADDRESS_LABELS: [&str; 2] = ["آدرس", "Address"];

/// Parses a whole page and extracts one record per located container.
///
/// Parsing happens entirely inside this function so the non-`Send` DOM
/// types never cross an await point in async callers.
#[must_use]
pub fn extract_businesses(html: &str) -> Vec<BusinessRecord> {
    let document = Html::parse_document(html);
    locate_containers(&document)
        .into_iter()
        .filter_map(extract_business)
        .collect()
}

/// Extracts a best-effort record from one container, or `None` when no
/// name is found.
#[must_use]
pub fn extract_business(container: ElementRef<'_>) -> Option<BusinessRecord> {
    let name = first_match(container, NAME_STRATEGIES)?;
    Some(BusinessRecord {
        name,
        phone_number: first_match(container, PHONE_STRATEGIES),
        instagram: first_match(container, INSTAGRAM_STRATEGIES)
            .map(|raw| instagram_handle(&raw)),
        address: first_match(container, ADDRESS_STRATEGIES),
        email: first_match(container, EMAIL_STRATEGIES),
        description: first_match(container, DESCRIPTION_STRATEGIES),
    })
}

fn first_match(container: ElementRef<'_>, strategies: &[Strategy]) -> Option<String> {
    strategies.iter().find_map(|strategy| strategy(container))
}

// ---------------------------------------------------------------------------
// Name
// ---------------------------------------------------------------------------

fn name_itemprop(container: ElementRef<'_>) -> Option<String> {
    select_text(container, "[itemprop='name']")
}

fn name_styled_heading(container: ElementRef<'_>) -> Option<String> {
    select_text(container, ".business-name, .listing-title")
}

fn name_any_heading(container: ElementRef<'_>) -> Option<String> {
    select_text(container, "h1, h2, h3")
}

// ---------------------------------------------------------------------------
// Phone
// ---------------------------------------------------------------------------

fn phone_itemprop_tel(container: ElementRef<'_>) -> Option<String> {
    select_href(
        container,
        "a[itemprop='telephone'][href^='tel:'], [itemprop='telephone'] a[href^='tel:']",
    )
    .map(|href| strip_scheme(&href, "tel:"))
}

fn phone_any_tel(container: ElementRef<'_>) -> Option<String> {
    select_href(container, "a[href^='tel:']").map(|href| strip_scheme(&href, "tel:"))
}

// ---------------------------------------------------------------------------
// Instagram
// ---------------------------------------------------------------------------

fn instagram_itemprop(container: ElementRef<'_>) -> Option<String> {
    select_href(
        container,
        "a[itemprop='sameAs'][href*='instagram.com'], [itemprop='sameAs'] a[href*='instagram.com']",
    )
}

fn instagram_any_link(container: ElementRef<'_>) -> Option<String> {
    select_href(container, "a[href*='instagram.com']")
}

/// Derives an `@handle` from an instagram profile URL: the path segment
/// after `instagram.com/`, stopping at the next `/` or `?`. Values that do
/// not look like a profile URL pass through unchanged.
fn instagram_handle(value: &str) -> String {
    let Some(idx) = value.find("instagram.com/") else {
        return value.to_string();
    };
    let rest = &value[idx + "instagram.com/".len()..];
    let handle: String = rest.chars().take_while(|c| *c != '/' && *c != '?').collect();
    if handle.is_empty() {
        value.to_string()
    } else {
        format!("@{handle}")
    }
}

// ---------------------------------------------------------------------------
// Description
// ---------------------------------------------------------------------------

fn description_itemprop(container: ElementRef<'_>) -> Option<String> {
    select_text(container, "[itemprop='description']")
}

fn description_styled(container: ElementRef<'_>) -> Option<String> {
    select_text(container, ".business-description, .listing-subtitle")
}

fn description_first_paragraph(container: ElementRef<'_>) -> Option<String> {
    select_text(container, "p")
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

fn address_itemprop(container: ElementRef<'_>) -> Option<String> {
    select_text(container, "[itemprop='address']")
}

fn address_element(container: ElementRef<'_>) -> Option<String> {
    select_text(container, "address")
}

fn address_labeled_paragraph(container: ElementRef<'_>) -> Option<String> {
    let paragraphs = sel("p")?;
    container
        .select(&paragraphs)
        .find_map(|p| strip_address_label(&text_of(p)))
}

/// Strips a recognized address label (and a trailing colon) from a
/// paragraph's text. Returns `None` when no label is present or nothing
/// follows it.
fn strip_address_label(text: &str) -> Option<String> {
    for label in ADDRESS_LABELS {
        if let Some(pos) = text.find(label) {
            let after = text[pos + label.len()..]
                .trim_start_matches([':', '：'])
                .trim();
            if after.is_empty() {
                return None;
            }
            return Some(after.to_string());
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Email
// ---------------------------------------------------------------------------

fn email_mailto(container: ElementRef<'_>) -> Option<String> {
    let href = select_href(container, "a[href^='mailto:']")?;
    let addr = strip_scheme(&href, "mailto:");
    // mailto targets may carry ?subject=... parameters.
    let addr = addr.split('?').next().unwrap_or(&addr).trim();
    if addr.is_empty() {
        None
    } else {
        Some(addr.to_string())
    }
}

fn email_itemprop(container: ElementRef<'_>) -> Option<String> {
    select_text(container, "[itemprop='email']")
}

fn email_in_text(container: ElementRef<'_>) -> Option<String> {
    let re = Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
        .expect("valid email regex");
    let text = container.text().collect::<String>();
    re.find(&text).map(|m| m.as_str().to_string())
}

// ---------------------------------------------------------------------------
// Selection helpers
// ---------------------------------------------------------------------------

fn select_text(container: ElementRef<'_>, selector: &str) -> Option<String> {
    let s = sel(selector)?;
    container
        .select(&s)
        .next()
        .map(text_of)
        .filter(|t| !t.is_empty())
}

fn select_href(container: ElementRef<'_>, selector: &str) -> Option<String> {
    let s = sel(selector)?;
    container
        .select(&s)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
}

fn strip_scheme(href: &str, scheme: &str) -> String {
    href.strip_prefix(scheme).unwrap_or(href).trim().to_string()
}
