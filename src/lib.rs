#![forbid(unsafe_code)]
#![deny(missing_docs)]
//! stay-feed: infinite-scroll accommodation listings with one-shot session
//! restoration.
//!
//! ## What you implement
//! - [`ListingSource`]: fetch listing pages and detail objects (or use
//!   [`HttpListingSource`]).
//! - [`StateStore`]: a tab-scoped key-value store (or use [`MemoryStore`],
//!   or `SqliteStore` for a file).
//! - [`Viewport`]: move the scroll container when a stored offset is replayed.
//!
//! ## What the feed does
//! - Pages through `/api/accommodation` by a `(minPrice, id)` cursor, one
//!   fetch per `(category, filter)` at a time, stopping at the last page.
//! - Snapshots cached pages, scroll offset and filter when the user leaves
//!   for a detail view.
//! - On return, applies filter and pages before the first render, replays
//!   the scroll offset once, then forgets the snapshot.
//!
//! ## Minimal usage
//! ```rust,ignore
//! use stay_feed::prelude::*;
//!
//! struct Window { y: u32 }
//! impl Viewport for Window {
//!     fn scroll_to(&mut self, offset_px: u32) { self.y = offset_px; }
//! }
//!
//! async fn run() -> anyhow::Result<()> {
//!     let config = FeedConfig::default();
//!     let feed = ListingFeed::new(MemoryStore::new(), HttpListingSource::new(&config)?, &config);
//!
//!     if feed.enter("hotel").await == ViewPhase::Cold {
//!         feed.load_more("hotel").await?;
//!     }
//!     let mut window = Window { y: 0 };
//!     feed.finish_render("hotel", &mut window).await;
//!
//!     // sentinel fully visible
//!     feed.on_sentinel("hotel", 1.0).await?;
//!
//!     // user opens a card
//!     feed.navigate_away("hotel", window.y).await.ok();
//!     Ok(())
//! }
//! ```
/// Listing view engine: pagination, filter changes, snapshot and restore.
pub mod engine;

/// Cursor arithmetic and request building.
pub mod pager;

/// Ordered page cache keyed by category and filter.
pub mod cache;

/// One-shot session snapshot and restore.
pub mod restorer;

/// Listing source trait.
pub mod source;

/// `reqwest` implementation of the listing source.
pub mod http_source;

/// Viewport callback.
pub mod hooks;

/// Client configuration and route classification.
pub mod config;

/// Error taxonomy.
pub mod error;

/// Wire and domain types.
pub mod model;

/// Persistence layer (trait, in-memory and SQLite implementations).
pub mod store;

// Public re-exports
pub use config::{FeedConfig, RouteAccess};
pub use engine::{ListingFeed, LoadOutcome, ViewPhase};
pub use error::FeedError;
pub use hooks::Viewport;
pub use http_source::HttpListingSource;
pub use model::{AccommodationDetail, Cursor, ListingItem, Page, PriceFilter, StayDates};
pub use source::ListingSource;
#[cfg(feature = "store-sqlite")]
pub use store::SqliteStore;
pub use store::{MemoryStore, StateStore};

/// Convenience prelude for end users.
pub mod prelude {
    pub use crate::{
        FeedConfig, FeedError, HttpListingSource, ListingFeed, ListingSource, LoadOutcome,
        MemoryStore, PriceFilter, StateStore, ViewPhase, Viewport,
    };
}
