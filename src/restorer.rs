//! One-shot restoration of listing state across a detail-view round trip.
//!
//! Three keys per category:
//! - `accommodationsState-{category}`: `{"pages":[...]}`
//! - `scrollPosition-{category}`: decimal pixel offset
//! - `selectedMinPrice-{category}`: decimal filter value
//!
//! [`SessionRestorer::restore`] hands back pages and filter at once but
//! keeps the scroll offset until [`SessionRestorer::replay_scroll`], which
//! then deletes everything for the category.
use crate::{
    model::{Page, PriceFilter},
    store::StateStore,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, sync::Mutex};

/// Persisted copy of one category's view state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestorationSnapshot {
    /// Cached pages for the filter that was active.
    pub pages: Vec<Page>,
    /// Vertical scroll offset in pixels.
    pub scroll_offset_px: u32,
    /// Filter that was active.
    pub filter: PriceFilter,
}

#[derive(Serialize, Deserialize)]
struct CachedState {
    pages: Vec<Page>,
}

/// Store key for the cached pages of `category`.
pub fn state_key(category: &str) -> String {
    format!("accommodationsState-{category}")
}

/// Store key for the scroll offset of `category`.
pub fn scroll_key(category: &str) -> String {
    format!("scrollPosition-{category}")
}

/// Store key for the selected filter of `category`.
pub fn filter_key(category: &str) -> String {
    format!("selectedMinPrice-{category}")
}

/// Snapshot writer and one-shot reader over a [`StateStore`].
pub struct SessionRestorer<S> {
    store: S,
    awaiting_scroll: Mutex<HashSet<String>>,
}

impl<S: StateStore> SessionRestorer<S> {
    /// Wrap `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            awaiting_scroll: Mutex::new(HashSet::new()),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist `pages`, `scroll_offset_px` and `filter` for `category`.
    ///
    /// Call once, when navigation away starts.
    pub async fn snapshot(
        &self,
        category: &str,
        pages: &[Page],
        scroll_offset_px: u32,
        filter: PriceFilter,
    ) -> anyhow::Result<()> {
        let state = serde_json::to_string(&CachedState {
            pages: pages.to_vec(),
        })
        .context("encode cached pages")?;

        // the state key goes last: restore treats its presence as a complete entry
        let written = async {
            self.store
                .set(&filter_key(category), &filter.min_price().to_string())
                .await?;
            self.store
                .set(&scroll_key(category), &scroll_offset_px.to_string())
                .await?;
            self.store.set(&state_key(category), &state).await
        }
        .await;

        if let Err(e) = written {
            if let Err(clear_err) = self.clear(category).await {
                tracing::warn!(category, "Clearing partial snapshot: {:#}", clear_err);
            }
            return Err(e);
        }

        // a fresh snapshot supersedes a restore that never replayed
        self.awaiting().remove(category);

        tracing::debug!(category, pages = pages.len(), scroll_offset_px, %filter, "Saved snapshot");
        Ok(())
    }

    /// Read the snapshot for `category`, if one is waiting.
    ///
    /// Nothing is deleted yet: the entry stays in the store until
    /// [`Self::replay_scroll`], and a second call before the replay returns
    /// `None`.
    pub async fn restore(&self, category: &str) -> anyhow::Result<Option<RestorationSnapshot>> {
        if self.awaiting().contains(category) {
            return Ok(None);
        }

        let Some(raw_state) = self.store.get(&state_key(category)).await? else {
            return Ok(None);
        };

        let decoded = decode_snapshot(
            &raw_state,
            self.store.get(&filter_key(category)).await?.as_deref(),
            self.store.get(&scroll_key(category)).await?.as_deref(),
        );

        let snapshot = match decoded {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(category, "Discarding unreadable snapshot: {:#}", e);
                self.clear(category).await?;
                return Ok(None);
            }
        };

        self.awaiting().insert(category.to_string());

        tracing::debug!(category, pages = snapshot.pages.len(), filter = %snapshot.filter, "Restored snapshot");
        Ok(Some(snapshot))
    }

    /// Stored scroll offset for `category`, consumed along with the rest
    /// of the snapshot.
    ///
    /// Returns `None` unless [`Self::restore`] handed out data for this
    /// category first.
    pub async fn replay_scroll(&self, category: &str) -> anyhow::Result<Option<u32>> {
        if !self.awaiting().contains(category) {
            return Ok(None);
        }

        let offset = self
            .store
            .get(&scroll_key(category))
            .await?
            .and_then(|raw| raw.trim().parse::<u32>().ok());

        self.clear(category).await?;
        self.awaiting().remove(category);

        Ok(offset)
    }

    /// True between a successful [`Self::restore`] and its replay.
    pub fn is_awaiting_scroll(&self, category: &str) -> bool {
        self.awaiting().contains(category)
    }

    async fn clear(&self, category: &str) -> anyhow::Result<()> {
        self.store.delete(&scroll_key(category)).await?;
        self.store.delete(&state_key(category)).await?;
        self.store.delete(&filter_key(category)).await?;
        Ok(())
    }

    fn awaiting(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.awaiting_scroll
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }
}

fn decode_snapshot(
    raw_state: &str,
    raw_filter: Option<&str>,
    raw_scroll: Option<&str>,
) -> anyhow::Result<RestorationSnapshot> {
    let state: CachedState = serde_json::from_str(raw_state).context("decode cached pages")?;

    let raw_filter = raw_filter.context("selected min price missing")?;
    let value: u64 = raw_filter
        .trim()
        .parse()
        .context("decode selected min price")?;
    let filter = PriceFilter::try_from(value)?;

    let scroll_offset_px = raw_scroll
        .context("scroll position missing")?
        .trim()
        .parse()
        .context("decode scroll position")?;

    Ok(RestorationSnapshot {
        pages: state.pages,
        scroll_offset_px,
        filter,
    })
}
