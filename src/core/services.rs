use crate::core::{AlpacaError, Page};

/// Boxed future returned by [`PageSource::fetch_page`].
pub type PageFuture<'a, T> =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<Page<T>, AlpacaError>> + Send + 'a>>;

/// Something that can fetch one page of records given a continuation token.
///
/// This is the seam between the pagination engine and the network: the HTTP
/// implementation lives in `core::net`, and tests can drive the engine with a
/// scripted source instead.
pub trait PageSource: Send + Sync {
    /// The record type produced per page.
    type Item: Send;

    /// Fetches one page.
    ///
    /// # Arguments
    /// * `page_token` - The continuation token from the previous page, `None` for the first.
    /// * `limit` - Maximum number of records the page may hold.
    fn fetch_page<'a>(&'a self, page_token: Option<&'a str>, limit: usize) -> PageFuture<'a, Self::Item>;
}
