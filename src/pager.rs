//! Cursor pagination over the listing endpoint.
//!
//! The server pages by a compound `(minPrice, id)` cursor. A zero field is
//! left out of the query, so `(0, 0)` asks for the first page. The price
//! filter rides on the same field: the first page of a filtered listing
//! starts at `cursorMinPrice = filter`.
use crate::model::{Cursor, Page, PriceFilter};
use anyhow::Context;
use reqwest::Url;

/// A fully-resolved listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// View category, e.g. `hotel`.
    pub category: String,
    /// Items per page.
    pub size: u32,
    /// Cursor actually sent to the server.
    pub cursor: Cursor,
}

impl PageRequest {
    /// Query parameters in wire order; zero cursor fields are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("category", self.category.clone()),
            ("size", self.size.to_string()),
        ];
        if self.cursor.min_price != 0 {
            pairs.push(("cursorMinPrice", self.cursor.min_price.to_string()));
        }
        if self.cursor.id != 0 {
            pairs.push(("cursorId", self.cursor.id.to_string()));
        }
        pairs
    }

    /// `{base}/api/accommodation?{query}`.
    pub fn url(&self, base: &str) -> anyhow::Result<Url> {
        let endpoint = format!("{}/api/accommodation", base.trim_end_matches('/'));
        Url::parse_with_params(&endpoint, self.query_pairs())
            .with_context(|| format!("build listing url from {base}"))
    }
}

/// Stateless request builder and cursor arithmetic.
#[derive(Debug, Clone, Copy)]
pub struct CursorPager {
    page_size: u32,
}

impl CursorPager {
    /// A pager requesting `page_size` items per page.
    pub fn new(page_size: u32) -> Self {
        Self { page_size }
    }

    /// Items per page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Build the request for `cursor` under `filter`.
    pub fn next_request(&self, cursor: Cursor, filter: PriceFilter, category: &str) -> PageRequest {
        let cursor = if cursor.is_first() {
            Cursor {
                min_price: filter.min_price(),
                id: 0,
            }
        } else {
            cursor
        };

        PageRequest {
            category: category.to_string(),
            size: self.page_size,
            cursor,
        }
    }

    /// Cursor for the page after `page`, or `None` once the server says
    /// there is nothing more.
    pub fn advance(page: &Page) -> Option<Cursor> {
        if !page.has_more {
            return None;
        }
        Some(Cursor {
            min_price: page.next_cursor_min_price,
            id: page.next_cursor_id,
        })
    }
}
