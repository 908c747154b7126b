//! Ordered page cache keyed by `(category, filter)`.
use crate::model::{ListingItem, Page, PriceFilter};
use std::collections::HashMap;

/// Cache key: one infinite-scroll sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// View category.
    pub category: String,
    /// Active price filter.
    pub filter: PriceFilter,
}

impl CacheKey {
    /// Key for `category` under `filter`.
    pub fn new(category: impl Into<String>, filter: PriceFilter) -> Self {
        Self {
            category: category.into(),
            filter,
        }
    }
}

/// Pages per key, append-only while scrolling.
///
/// Items are neither reordered nor deduplicated across pages.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<CacheKey, Vec<Page>>,
}

impl ResultCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages fetched so far for `key`, oldest first.
    pub fn pages(&self, key: &CacheKey) -> &[Page] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every item for `key`, in page order.
    pub fn items<'a>(&'a self, key: &CacheKey) -> impl Iterator<Item = &'a ListingItem> + 'a {
        self.pages(key).iter().flat_map(|p| p.items.iter())
    }

    /// Append the next page.
    pub fn push(&mut self, key: &CacheKey, page: Page) {
        self.entries.entry(key.clone()).or_default().push(page);
    }

    /// Replace everything stored under `key`.
    pub fn replace(&mut self, key: CacheKey, pages: Vec<Page>) {
        self.entries.insert(key, pages);
    }

    /// Drop `key` entirely.
    pub fn remove(&mut self, key: &CacheKey) -> Option<Vec<Page>> {
        self.entries.remove(key)
    }

    /// Filters with pages cached under `category`.
    pub fn filters<'a>(&'a self, category: &'a str) -> impl Iterator<Item = PriceFilter> + 'a {
        self.entries
            .keys()
            .filter(move |k| k.category == category)
            .map(|k| k.filter)
    }

    /// True if nothing has been fetched for `key`.
    pub fn is_empty(&self, key: &CacheKey) -> bool {
        self.pages(key).is_empty()
    }
}
