//! One HTTP round trip per page.

use url::Url;

use crate::core::client::RetryConfig;
use crate::core::params::{Endpoint, QueryFilter};
use crate::core::services::PageFuture;
use crate::core::{AlpacaClient, AlpacaError, Page, PageSource};

type Decoder<I> = fn(&str, &str) -> Result<Page<I>, AlpacaError>;

/// A `PageSource` backed by one REST endpoint with fixed query parameters.
///
/// Owns everything it needs, so it can be moved into a spawned task.
pub(crate) struct EndpointSource<I> {
    client: AlpacaClient,
    url: Url,
    params: Vec<(&'static str, String)>,
    key: &'static str,
    retry_override: Option<RetryConfig>,
    decode: Decoder<I>,
}

impl<I> EndpointSource<I> {
    /// Validates `filter` against `endpoint` and resolves the request URL.
    ///
    /// All argument errors surface here, before any request is made.
    pub(crate) fn new(
        client: &AlpacaClient,
        endpoint: Endpoint,
        filter: &QueryFilter,
        retry_override: Option<RetryConfig>,
        decode: Decoder<I>,
    ) -> Result<Self, AlpacaError> {
        let params = filter.to_params(&endpoint)?;
        let symbol = filter.symbols.first().map(String::as_str);
        let segments = endpoint.segments(symbol)?;

        // Appended segment by segment so the symbol is percent-encoded and the
        // base path is kept whether or not it ends with `/`.
        let base = client.base_data();
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| AlpacaError::invalid(format!("`{base}` cannot be used as a base URL")))?
            .pop_if_empty()
            .extend(segments);
        Ok(Self {
            client: client.clone(),
            url,
            params,
            key: endpoint.kind.key(),
            retry_override,
            decode,
        })
    }

    fn page_url(&self, page_token: Option<&str>, limit: usize) -> Url {
        let mut url = self.url.clone();
        {
            let mut qp = url.query_pairs_mut();
            for (k, v) in &self.params {
                qp.append_pair(k, v);
            }
            qp.append_pair("limit", &limit.to_string());
            if let Some(token) = page_token {
                qp.append_pair("page_token", token);
            }
        }
        url
    }

    async fn fetch(&self, page_token: Option<&str>, limit: usize) -> Result<Page<I>, AlpacaError> {
        let url = self.page_url(page_token, limit);
        let req = self
            .client
            .http()
            .get(url.clone())
            .header("accept", "application/json");
        let resp = self
            .client
            .send_with_retry(req, self.retry_override.as_ref())
            .await?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(AlpacaError::RateLimited {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AlpacaError::Server {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }

        let body = resp.text().await?;
        (self.decode)(&body, self.key)
    }
}

impl<I: Send> PageSource for EndpointSource<I> {
    type Item = I;

    fn fetch_page<'a>(&'a self, page_token: Option<&'a str>, limit: usize) -> PageFuture<'a, I> {
        Box::pin(self.fetch(page_token, limit))
    }
}
