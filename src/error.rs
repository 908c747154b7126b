//! Error taxonomy surfaced to the view layer.

/// Failures a feed operation can report.
///
/// `Network` and `MalformedResponse` never advance pagination state.
/// `StorageUnavailable` is reported by the restorer and only ever degrades
/// restoration; the feed logs it and keeps fetching.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The request could not be sent, or the server answered non-2xx.
    #[error("network failure: {0}")]
    Network(String),

    /// The body did not match the expected JSON shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The session store could not be read or written.
    #[error("session storage unavailable")]
    StorageUnavailable(#[source] anyhow::Error),
}
