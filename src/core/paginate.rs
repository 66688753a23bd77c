//! Cursor-following pagination.
//!
//! Turns a [`PageSource`] (one page per call) into the complete logical
//! sequence, either as a stream of pages or collected into one `Vec`.

use futures::{Stream, TryStreamExt, stream};

use crate::core::{AlpacaError, PageSource};

/// One response worth of records plus the continuation token, if more remain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Records in server order.
    pub records: Vec<T>,
    /// Token for the next page; `None` once the data is exhausted.
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// A page with no continuation.
    #[must_use]
    pub const fn last(records: Vec<T>) -> Self {
        Self {
            records,
            next_page_token: None,
        }
    }
}

/// Size bounds applied while paginating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Largest page requested from the server.
    pub page_cap: usize,
    /// Total records to return across all pages; `None` is unbounded.
    pub total: Option<usize>,
}

impl PageLimits {
    /// `total` of `Some(0)` is treated as unbounded.
    #[must_use]
    pub fn new(page_cap: usize, total: Option<usize>) -> Self {
        Self {
            page_cap: page_cap.max(1),
            total: total.filter(|&n| n > 0),
        }
    }

    fn request_size(&self, collected: usize) -> usize {
        self.total.map_or(self.page_cap, |total| {
            self.page_cap.min(total.saturating_sub(collected))
        })
    }
}

enum CursorState {
    Running,
    /// The last page was delivered; this error follows it.
    Failed(AlpacaError),
    Done,
}

struct Cursor<S> {
    source: S,
    limits: PageLimits,
    token: Option<String>,
    collected: usize,
    state: CursorState,
}

impl<S: PageSource> Cursor<S> {
    async fn advance(&mut self) -> Result<Vec<S::Item>, AlpacaError> {
        let limit = self.limits.request_size(self.collected);
        let sent = self.token.take();
        let Page {
            mut records,
            next_page_token,
        } = self.source.fetch_page(sent.as_deref(), limit).await?;

        if let Some(total) = self.limits.total {
            records.truncate(total.saturating_sub(self.collected));
        }
        self.collected += records.len();

        let next = next_page_token.filter(|t| !t.is_empty());
        let reached = self.limits.total.is_some_and(|t| self.collected >= t);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            records = records.len(),
            collected = self.collected,
            has_more = next.is_some() && !reached,
            "page fetched"
        );

        match next {
            Some(token) if !reached => {
                if sent.as_deref() == Some(token.as_str()) {
                    self.state = CursorState::Failed(AlpacaError::Protocol(format!(
                        "server repeated page token `{token}`"
                    )));
                } else {
                    self.token = Some(token);
                    self.state = CursorState::Running;
                }
            }
            _ => {}
        }
        Ok(records)
    }
}

/// Streams the pages of `source`, following continuation tokens.
///
/// The stream ends when the server stops returning a token, when
/// `limits.total` records have been produced (the final page is trimmed), or
/// right after the first error. A server that hands back the token it was just
/// given produces a `Protocol` error instead of looping.
pub fn paginate<S>(
    source: S,
    limits: PageLimits,
) -> impl Stream<Item = Result<Vec<S::Item>, AlpacaError>> + Send
where
    S: PageSource,
{
    let cursor = Cursor {
        source,
        limits,
        token: None,
        collected: 0,
        state: CursorState::Running,
    };

    stream::unfold(cursor, |mut cursor| async move {
        match std::mem::replace(&mut cursor.state, CursorState::Done) {
            CursorState::Done => None,
            CursorState::Failed(err) => Some((Err(err), cursor)),
            CursorState::Running => {
                let page = cursor.advance().await;
                Some((page, cursor))
            }
        }
    })
}

/// Fetches every page of `source` and concatenates the records.
///
/// # Errors
///
/// Returns the first error hit; records fetched before it are discarded.
pub async fn collect_all<S>(source: S, limits: PageLimits) -> Result<Vec<S::Item>, AlpacaError>
where
    S: PageSource,
{
    paginate(source, limits).try_concat().await
}
