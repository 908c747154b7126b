//! Orchestrator for the listing view:
//! 1) rehydrate a category from its snapshot (or start cold),
//! 2) page through the listing one cursor at a time, at most one fetch per key,
//! 3) snapshot on navigation away and replay the scroll offset on return.
use crate::{
    cache::{CacheKey, ResultCache},
    config::FeedConfig,
    error::FeedError,
    hooks::Viewport,
    model::{AccommodationDetail, Cursor, ListingItem, Page, PriceFilter, StayDates},
    pager::CursorPager,
    restorer::SessionRestorer,
    source::ListingSource,
    store::StateStore,
};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

/// Lifecycle of one category's view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewPhase {
    /// Nothing fetched yet.
    #[default]
    Cold,
    /// First page in flight.
    Loading,
    /// Pages on screen.
    Loaded,
    /// Snapshot pages applied; scroll replay still pending.
    RestoringCache,
}

/// Result of a page trigger that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and appended.
    Appended {
        /// Items in the new page.
        items: usize,
        /// Whether the server has more.
        has_more: bool,
    },
    /// A fetch for this key is already running; this trigger collapsed into it.
    InFlight,
    /// The last page has been seen.
    Exhausted,
    /// The response arrived after its key was abandoned.
    Discarded,
    /// The sentinel is not fully visible.
    NotVisible,
}

struct KeyState {
    next: Option<Cursor>,
    in_flight: bool,
    generation: u64,
}

#[derive(Default)]
struct CategoryView {
    filter: PriceFilter,
    phase: ViewPhase,
}

#[derive(Default)]
struct FeedState {
    cache: ResultCache,
    keys: HashMap<CacheKey, KeyState>,
    views: HashMap<String, CategoryView>,
    next_generation: u64,
}

impl FeedState {
    fn fresh_key(&mut self, key: CacheKey, next: Option<Cursor>) {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.keys.insert(
            key,
            KeyState {
                next,
                in_flight: false,
                generation,
            },
        );
    }

    fn reset_key(&mut self, key: CacheKey) {
        self.cache.remove(&key);
        self.fresh_key(key, Some(Cursor::FIRST));
    }
}

/// Core engine. `S` = session store, `F` = listing source.
pub struct ListingFeed<S, F> {
    restorer: SessionRestorer<S>,
    source: F,
    pager: CursorPager,
    state: Mutex<FeedState>,
}

impl<S, F> ListingFeed<S, F>
where
    S: StateStore + 'static,
    F: ListingSource + 'static,
{
    /// Create a feed over a session store and a listing source.
    pub fn new(store: S, source: F, config: &FeedConfig) -> Self {
        Self {
            restorer: SessionRestorer::new(store),
            source,
            pager: CursorPager::new(config.page_size),
            state: Mutex::new(FeedState::default()),
        }
    }

    /// The snapshot restorer.
    pub fn restorer(&self) -> &SessionRestorer<S> {
        &self.restorer
    }

    /// The listing source.
    pub fn source(&self) -> &F {
        &self.source
    }

    /// (Re)enter the listing view for `category`.
    ///
    /// With a stored snapshot the filter and pages are applied before this
    /// returns and the phase is [`ViewPhase::RestoringCache`]; entering again
    /// before [`Self::finish_render`] leaves that view as it is. Without one,
    /// or when the store fails, the view starts [`ViewPhase::Cold`] with
    /// the default filter.
    #[tracing::instrument(skip(self))]
    pub async fn enter(&self, category: &str) -> ViewPhase {
        // restored pages are already applied and waiting for their scroll replay
        if self.restorer.is_awaiting_scroll(category)
            || self.phase(category) == ViewPhase::RestoringCache
        {
            return ViewPhase::RestoringCache;
        }

        let snapshot = match self.restorer.restore(category).await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Skipping restoration, session storage unavailable: {:#}", e);
                None
            }
        };

        let mut state = self.lock();
        match snapshot {
            Some(snapshot) => {
                let key = CacheKey::new(category, snapshot.filter);
                let next = match snapshot.pages.last() {
                    Some(last) => CursorPager::advance(last),
                    None => Some(Cursor::FIRST),
                };
                tracing::info!(
                    pages = snapshot.pages.len(),
                    filter = %snapshot.filter,
                    "Restoring cached pages"
                );

                let stale = Self::active_key(&state, category);
                state.cache.remove(&stale);
                state.keys.remove(&stale);

                // filter first: the cache is keyed by it
                state.views.insert(
                    category.to_string(),
                    CategoryView {
                        filter: snapshot.filter,
                        phase: ViewPhase::RestoringCache,
                    },
                );
                state.cache.replace(key.clone(), snapshot.pages);
                state.fresh_key(key, next);

                ViewPhase::RestoringCache
            }
            None => {
                tracing::info!("Starting cold");
                let stale = Self::active_key(&state, category);
                state.cache.remove(&stale);
                state.keys.remove(&stale);

                let filter = PriceFilter::default();
                state
                    .views
                    .insert(category.to_string(), CategoryView::default());
                state.reset_key(CacheKey::new(category, filter));

                ViewPhase::Cold
            }
        }
    }

    /// Current phase of `category`.
    pub fn phase(&self, category: &str) -> ViewPhase {
        self.lock()
            .views
            .get(category)
            .map(|v| v.phase)
            .unwrap_or_default()
    }

    /// Active filter of `category`.
    pub fn filter(&self, category: &str) -> PriceFilter {
        self.lock()
            .views
            .get(category)
            .map(|v| v.filter)
            .unwrap_or_default()
    }

    /// Pages cached for `category` under its active filter.
    pub fn pages(&self, category: &str) -> Vec<Page> {
        let state = self.lock();
        let key = Self::active_key(&state, category);
        state.cache.pages(&key).to_vec()
    }

    /// Items for `category` under its active filter, in page order.
    pub fn items(&self, category: &str) -> Vec<ListingItem> {
        let state = self.lock();
        let key = Self::active_key(&state, category);
        let items = state.cache.items(&key).cloned().collect();
        items
    }

    /// Filters that currently hold cached pages for `category`.
    pub fn cached_filters(&self, category: &str) -> Vec<PriceFilter> {
        let state = self.lock();
        let filters = state.cache.filters(category).collect();
        filters
    }

    /// Switch `category` to `filter`.
    ///
    /// The previous key's pages are dropped and the new key starts over
    /// from the first page.
    #[tracing::instrument(skip(self))]
    pub fn set_filter(&self, category: &str, filter: PriceFilter) {
        let mut state = self.lock();
        let old = Self::active_key(&state, category);
        if old.filter == filter && state.keys.contains_key(&old) {
            return;
        }

        state.cache.remove(&old);
        state.keys.remove(&old);

        let view = state.views.entry(category.to_string()).or_default();
        view.filter = filter;
        view.phase = ViewPhase::Cold;
        state.reset_key(CacheKey::new(category, filter));

        tracing::info!(from = %old.filter, to = %filter, "Filter changed");
    }

    /// Sentinel visibility callback; only a fully visible sentinel
    /// (`ratio >= 1.0`) loads the next page.
    pub async fn on_sentinel(
        &self,
        category: &str,
        visibility_ratio: f64,
    ) -> Result<LoadOutcome, FeedError> {
        if visibility_ratio < 1.0 {
            return Ok(LoadOutcome::NotVisible);
        }
        self.load_more(category).await
    }

    /// Fetch the next page of `category` under its active filter.
    ///
    /// # Errors
    /// Network and decoding failures are returned as-is; the cursor is left
    /// where it was so the same page is requested again next time.
    #[tracing::instrument(skip(self))]
    pub async fn load_more(&self, category: &str) -> Result<LoadOutcome, FeedError> {
        let (key, request, generation, prev_phase) = {
            let mut state = self.lock();
            let key = Self::active_key(&state, category);
            if !state.keys.contains_key(&key) {
                state.fresh_key(key.clone(), Some(Cursor::FIRST));
            }

            let Some(ks) = state.keys.get_mut(&key) else {
                return Ok(LoadOutcome::Discarded);
            };
            if ks.in_flight {
                tracing::debug!("Fetch already in flight");
                return Ok(LoadOutcome::InFlight);
            }
            let Some(cursor) = ks.next else {
                return Ok(LoadOutcome::Exhausted);
            };
            ks.in_flight = true;
            let generation = ks.generation;

            let view = state.views.entry(category.to_string()).or_default();
            let prev_phase = view.phase;
            if view.phase == ViewPhase::Cold {
                view.phase = ViewPhase::Loading;
            }

            let request = self.pager.next_request(cursor, key.filter, category);
            (key, request, generation, prev_phase)
        };

        tracing::debug!(?request, "Requesting page");
        let result = self.source.fetch_page(&request).await;

        let mut state = self.lock();
        let live = matches!(state.keys.get(&key), Some(ks) if ks.generation == generation);
        if !live {
            tracing::debug!(filter = %key.filter, "Dropping response for abandoned key");
            return Ok(LoadOutcome::Discarded);
        }
        if let Some(ks) = state.keys.get_mut(&key) {
            ks.in_flight = false;
        }

        match result {
            Ok(page) => {
                let next = CursorPager::advance(&page);
                let outcome = LoadOutcome::Appended {
                    items: page.items.len(),
                    has_more: page.has_more,
                };
                if let Some(ks) = state.keys.get_mut(&key) {
                    ks.next = next;
                }
                state.cache.push(&key, page);

                if let Some(view) = state.views.get_mut(category) {
                    if view.filter == key.filter && view.phase == ViewPhase::Loading {
                        view.phase = ViewPhase::Loaded;
                    }
                }
                if next.is_none() {
                    tracing::info!("Reached last page");
                }

                Ok(outcome)
            }
            Err(e) => {
                tracing::error!("Loading page {:?}", e);
                if let Some(view) = state.views.get_mut(category) {
                    if view.filter == key.filter && view.phase == ViewPhase::Loading {
                        view.phase = prev_phase;
                    }
                }
                Err(e)
            }
        }
    }

    /// Snapshot `category` as the user leaves for a detail view.
    ///
    /// # Errors
    /// [`FeedError::StorageUnavailable`] when the store rejects the write.
    /// In-memory state is untouched either way.
    #[tracing::instrument(skip(self))]
    pub async fn navigate_away(&self, category: &str, scroll_offset_px: u32) -> Result<(), FeedError> {
        let (pages, filter) = {
            let state = self.lock();
            let key = Self::active_key(&state, category);
            (state.cache.pages(&key).to_vec(), key.filter)
        };

        self.restorer
            .snapshot(category, &pages, scroll_offset_px, filter)
            .await
            .map_err(|e| {
                tracing::warn!("Saving snapshot: {:#}", e);
                FeedError::StorageUnavailable(e)
            })
    }

    /// Signal that the first render with restored data is done.
    ///
    /// Only acts in [`ViewPhase::RestoringCache`]: moves `viewport` to the
    /// stored offset, clears the snapshot and returns the offset.
    #[tracing::instrument(skip(self, viewport))]
    pub async fn finish_render<V: Viewport>(&self, category: &str, viewport: &mut V) -> Option<u32> {
        if self.phase(category) != ViewPhase::RestoringCache {
            return None;
        }

        let offset = match self.restorer.replay_scroll(category).await {
            Ok(o) => o,
            Err(e) => {
                tracing::warn!("Skipping scroll replay, session storage unavailable: {:#}", e);
                None
            }
        };

        if let Some(offset) = offset {
            tracing::info!(offset, "Replaying scroll position");
            viewport.scroll_to(offset);
        }

        let mut state = self.lock();
        let key = Self::active_key(&state, category);
        let phase = if state.cache.is_empty(&key) {
            ViewPhase::Cold
        } else {
            ViewPhase::Loaded
        };
        if let Some(view) = state.views.get_mut(category) {
            view.phase = phase;
        }

        offset
    }

    /// Fetch the detail object behind a listing card.
    pub async fn detail(&self, id: u64, dates: &StayDates) -> Result<AccommodationDetail, FeedError> {
        self.source.fetch_detail(id, dates).await
    }

    fn active_key(state: &FeedState, category: &str) -> CacheKey {
        let filter = state
            .views
            .get(category)
            .map(|v| v.filter)
            .unwrap_or_default();
        CacheKey::new(category, filter)
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
