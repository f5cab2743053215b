//! Pagination discovery over unknown page structures.
//!
//! Listing sites disagree on how they mark their pagination controls: some
//! expose an explicit last-page link, some only a run of numbered links,
//! and Persian-language sites render the numbers with Extended
//! Arabic-Indic digits. The resolver walks a priority list and never
//! returns less than 1.

use scraper::{ElementRef, Html};

use crate::containers::{sel, text_of};
use crate::digits::normalize_eastern_digits;

/// Parses a page and returns the highest page number reachable from its
/// pagination markup, defaulting to 1.
///
/// Parsing happens entirely inside this function so the non-`Send` DOM
/// types never cross an await point in async callers.
#[must_use]
pub fn count_pages(html: &str) -> usize {
    resolve_total_pages(&Html::parse_document(html))
}

/// Resolution order:
/// 1. No pagination nav found → 1.
/// 2. A last-page link: its `page` query parameter, else its visible text
///    after digit normalization, else 1.
/// 3. The maximum `page` query parameter over all links in the nav, else 1.
#[must_use]
pub fn resolve_total_pages(document: &Html) -> usize {
    let Some(nav) = find_pagination_nav(document) else {
        return 1;
    };

    if let Some(last) = find_last_page_link(nav) {
        return last_link_page_number(last);
    }

    max_page_param(nav)
}

/// Locates the pagination navigation element: a `nav` whose `aria-label`
/// carries a localized "page" token, else the first element with a known
/// pagination class.
fn find_pagination_nav(document: &Html) -> Option<ElementRef<'_>> {
    if let Some(labeled_nav) = sel("nav[aria-label]") {
        for nav in document.select(&labeled_nav) {
            if let Some(label) = nav.value().attr("aria-label") {
                if label.to_lowercase().contains("page") || label.contains("صفحه") {
                    return Some(nav);
                }
            }
        }
    }

    sel(".pagination, .pager, .page-numbers").and_then(|s| document.select(&s).next())
}

fn find_last_page_link(nav: ElementRef<'_>) -> Option<ElementRef<'_>> {
    sel("a[rel='last'], a.last-page, a.last").and_then(|s| nav.select(&s).next())
}

/// Page number carried by an explicit last-page link. The URL's `page`
/// query parameter is authoritative; the link text (digit-normalized) is
/// the fallback.
fn last_link_page_number(link: ElementRef<'_>) -> usize {
    if let Some(href) = link.value().attr("href") {
        if let Some(page) = extract_query_param(href, "page").and_then(|v| v.parse::<usize>().ok())
        {
            return page.max(1);
        }
    }

    normalize_eastern_digits(&text_of(link))
        .trim()
        .parse::<usize>()
        .map_or(1, |page| page.max(1))
}

/// Highest `page` query parameter across every link in the nav.
fn max_page_param(nav: ElementRef<'_>) -> usize {
    let Some(links) = sel("a[href]") else {
        return 1;
    };

    nav.select(&links)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| extract_query_param(href, "page"))
        .filter_map(|value| value.parse::<usize>().ok())
        .max()
        .map_or(1, |page| page.max(1))
}

/// Extracts the value of a named query parameter from a URL string.
///
/// Works on relative hrefs too — only the part after `?` is inspected.
fn extract_query_param(url: &str, param: &str) -> Option<String> {
    let query_start = url.find('?')? + 1;
    let query = &url[query_start..];

    let needle = format!("{param}=");
    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix(needle.as_str()) {
            // Trim any fragment anchor that might trail the value.
            let value = value.split('#').next().unwrap_or(value);
            if !value.is_empty() {
                return Some(value.to_owned());
            }
        }
    }
    None
}
