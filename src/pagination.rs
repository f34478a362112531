//! This modules defines the common functionality for paging data.

use maud::{Markup, html};
use serde::Deserialize;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum transactions to display per page when not specified in a request.
    pub default_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 20,
            max_pages: 5,
        }
    }
}

/// The `page` and `per_page` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// The page number to display. Starts from 1.
    pub page: Option<u64>,
    /// The maximum number of items to display per page.
    pub per_page: Option<u64>,
}

/// A resolved page of `item_count` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// The current page, clamped to `1..=page_count`.
    pub number: u64,
    pub per_page: u64,
    /// The number of pages, at least one even when there are no items.
    pub page_count: u64,
}

impl Page {
    /// Resolve `query` against `config`, replacing missing or zero values with defaults.
    pub fn new(query: &PageQuery, config: &PaginationConfig, item_count: u64) -> Self {
        let per_page = query
            .per_page
            .filter(|&per_page| per_page > 0)
            .unwrap_or(config.default_page_size)
            .max(1);
        let page_count = item_count.div_ceil(per_page).max(1);
        let number = query
            .page
            .unwrap_or(config.default_page)
            .clamp(1, page_count);

        Self {
            number,
            per_page,
            page_count,
        }
    }

    /// The SQL `LIMIT` for this page.
    pub fn limit(&self) -> u64 {
        self.per_page
    }

    /// The SQL `OFFSET` for this page.
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let half = max_pages / 2;
    let as_indicator = |page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    };

    let window = if page_count <= max_pages {
        1..=page_count
    } else if curr_page <= half {
        1..=max_pages
    } else if curr_page > page_count - half {
        (page_count - max_pages + 1)..=page_count
    } else {
        (curr_page - half)..=(curr_page + half)
    };

    let mut indicators = Vec::new();

    if curr_page > 1 {
        indicators.push(PaginationIndicator::BackButton(curr_page - 1));
    }

    if page_count > max_pages && curr_page > half + 1 {
        indicators.push(PaginationIndicator::Page(1));
        indicators.push(PaginationIndicator::Ellipsis);
    }

    indicators.extend(window.map(as_indicator));

    if page_count > max_pages && curr_page < page_count - half {
        indicators.push(PaginationIndicator::Ellipsis);
        indicators.push(PaginationIndicator::Page(page_count));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

/// Render the indicators as links to `route` with `page` and `per_page` query parameters.
pub fn pagination_view(indicators: &[PaginationIndicator], route: &str, per_page: u64) -> Markup {
    let href = |page: u64| format!("{route}?page={page}&per_page={per_page}");
    let link_style = "block px-3 py-2 rounded-sm text-blue-600 hover:underline";

    html! {
        nav class="pagination flex justify-center"
        {
            ul class="pagination flex gap-2 items-center p-0 m-0"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::Page(page) => {
                                a href=(href(*page)) class=(link_style) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                p
                                    aria-current="page"
                                    class="block px-3 py-2 rounded-sm font-bold text-black dark:text-white"
                                { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class="px-3 py-2" { "..." }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(href(*page)) role="button" class=(link_style) { "Next" }
                            }
                            PaginationIndicator::BackButton(page) => {
                                a href=(href(*page)) role="button" class=(link_style) { "Back" }
                            }
                        }
                    }
                }
            }
        }
    }
}
