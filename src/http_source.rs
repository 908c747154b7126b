//! `reqwest`-backed [`ListingSource`].
use crate::{
    config::FeedConfig,
    error::FeedError,
    model::{AccommodationDetail, Page, StayDates},
    pager::PageRequest,
    source::ListingSource,
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;

/// Talks to `{base_url}/api/accommodation`.
pub struct HttpListingSource {
    req_client: reqwest::Client,
    base_url: String,
}

impl HttpListingSource {
    /// Build a client from `config`; cookies are kept when
    /// `with_credentials` is set.
    pub fn new(config: &FeedConfig) -> anyhow::Result<Self> {
        let req_client = reqwest::Client::builder()
            .cookie_store(config.with_credentials)
            .build()
            .context("build reqwest client")?;

        Ok(Self {
            req_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `{base}/api/accommodation/{id}?checkInDate=..&checkOutDate=..`.
    pub fn detail_url(&self, id: u64, dates: &StayDates) -> anyhow::Result<Url> {
        let endpoint = format!("{}/api/accommodation/{id}", self.base_url);
        Url::parse_with_params(
            &endpoint,
            [
                ("checkInDate", dates.check_in.as_str()),
                ("checkOutDate", dates.check_out.as_str()),
            ],
        )
        .with_context(|| format!("build detail url for {id}"))
    }

    async fn get_json<D: DeserializeOwned>(&self, url: Url) -> Result<D, FeedError> {
        let resp = self.req_client.get(url).send().await.map_err(|e| {
            tracing::error!("Sending Request: {:?}", e);
            FeedError::Network(e.to_string())
        })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::error!("Non Success Response: {:?}", status);
            return Err(FeedError::Network(format!("status {status}")));
        }

        let raw_content = resp.bytes().await.map_err(|e| {
            tracing::error!("Getting response Bytes: {:?}", e);
            FeedError::Network(e.to_string())
        })?;

        serde_json::from_slice(&raw_content).map_err(|e| {
            tracing::error!("Deserializing Response {:?}", e);
            FeedError::MalformedResponse(e.to_string())
        })
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    #[tracing::instrument(skip(self), fields(category = %request.category))]
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, FeedError> {
        let url = request
            .url(&self.base_url)
            .map_err(|e| FeedError::Network(format!("{e:#}")))?;
        tracing::debug!(%url, "Loading Page");

        self.get_json(url).await
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_detail(
        &self,
        id: u64,
        dates: &StayDates,
    ) -> Result<AccommodationDetail, FeedError> {
        let url = self
            .detail_url(id, dates)
            .map_err(|e| FeedError::Network(format!("{e:#}")))?;
        tracing::debug!(%url, "Loading Detail");

        self.get_json(url).await
    }
}
