//! Container discovery: which subtrees of a listing page describe one
//! business each.
//!
//! The heuristics run in priority order over arbitrary third-party markup
//! and none of them is authoritative — a container that turns out not to
//! hold a business simply yields no record downstream.

use scraper::{ElementRef, Html, Selector};

/// Structured markup, semantic tags, and listing classes commonly used by
/// directory pages. The whole union is tried at once; any match wins.
const CONTAINER_SELECTORS: &str = "[itemtype*='schema.org/LocalBusiness'], \
     [itemtype*='schema.org/Organization'], \
     article, \
     .business-card, .listing-item, .directory-item, .business, .listing";

/// Returns the ordered set of elements hypothesized to each describe one
/// business listing.
///
/// 1. Structured-data / `article` / known listing-class elements.
/// 2. Direct children of `<body>` that carry both a structured name field
///    and a `tel:` link — a proxy for "this subtree describes a business."
/// 3. The whole `<body>` as a single container (single-business pages).
#[must_use]
pub fn locate_containers(document: &Html) -> Vec<ElementRef<'_>> {
    if let Some(selector) = sel(CONTAINER_SELECTORS) {
        let found: Vec<ElementRef<'_>> = document.select(&selector).collect();
        if !found.is_empty() {
            return found;
        }
    }

    if let (Some(children), Some(name), Some(tel)) = (
        sel("body > *"),
        sel("[itemprop='name']"),
        sel("a[href^='tel:']"),
    ) {
        let found: Vec<ElementRef<'_>> = document
            .select(&children)
            .filter(|el| el.select(&name).next().is_some() && el.select(&tel).next().is_some())
            .collect();
        if !found.is_empty() {
            return found;
        }
    }

    sel("body")
        .and_then(|s| document.select(&s).next())
        .into_iter()
        .collect()
}

/// Parses a CSS selector, treating malformed selectors as "no match" rather
/// than a hard failure.
pub(crate) fn sel(selector: &str) -> Option<Selector> {
    Selector::parse(selector).ok()
}

/// Collects and trims an element's visible text.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
