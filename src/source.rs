//! Abstraction over the booking API (HTTP in production, fakes in tests).
use crate::{
    error::FeedError,
    model::{AccommodationDetail, Page, StayDates},
    pager::PageRequest,
};
use async_trait::async_trait;

/// Network provider for listing pages and detail objects.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch one listing page.
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, FeedError>;

    /// Fetch the detail object of accommodation `id` for `dates`.
    async fn fetch_detail(
        &self,
        id: u64,
        dates: &StayDates,
    ) -> Result<AccommodationDetail, FeedError>;
}
