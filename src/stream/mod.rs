use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt, stream};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::core::{AlpacaError, PageLimits, PageSource, paginate};

/* ---------------- Public API ---------------- */

/// One streamed record, or the error that ended its symbol's retrieval.
#[derive(Debug)]
pub struct FetchResult<T> {
    /// The symbol this item belongs to.
    pub symbol: String,
    /// A record, or the error that ended this symbol.
    pub item: Result<T, AlpacaError>,
}

impl<T> FetchResult<T> {
    /// `true` if this item carries a record.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.item.is_ok()
    }
}

/// A lazily consumed sequence of [`FetchResult`]s.
///
/// Records arrive as soon as their page is fetched. Each symbol's records keep
/// server order; different symbols interleave arbitrarily. A symbol whose
/// retrieval fails contributes one error item and stops, while the others carry
/// on; a fatal error (rejected credentials) is delivered and then ends the whole
/// stream.
///
/// Producers run ahead of the consumer by at most the client's stream buffer.
/// Dropping the stream aborts the background task and any in-flight requests.
pub struct FetchStream<T> {
    rx: mpsc::Receiver<FetchResult<T>>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> FetchStream<T> {
    /// Spawns the producer task. Must be called from within a Tokio runtime.
    pub(crate) fn spawn<S>(
        sources: Vec<(String, S)>,
        limits: PageLimits,
        concurrency: usize,
        buffer: usize,
    ) -> Self
    where
        S: PageSource<Item = T> + 'static,
    {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let task = tokio::spawn(forward(sources, limits, concurrency, tx));
        Self { rx, task }
    }
}

impl<T> Stream for FetchStream<T> {
    type Item = FetchResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl<T> Drop for FetchStream<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/* ---------------- Internal: producers ---------------- */

/// Runs one pagination cursor per symbol, at most `concurrency` at a time, and
/// yields their pages as they complete. Each symbol's stream ends after its
/// first error.
pub(crate) fn merged_pages<S>(
    sources: Vec<(String, S)>,
    limits: PageLimits,
    concurrency: usize,
) -> impl Stream<Item = (String, Result<Vec<S::Item>, AlpacaError>)> + Send
where
    S: PageSource + 'static,
{
    stream::iter(sources)
        .map(move |(symbol, source)| {
            paginate(source, limits)
                .map(move |page| (symbol.clone(), page))
                .boxed()
        })
        .flatten_unordered(concurrency.max(1))
}

async fn forward<S>(
    sources: Vec<(String, S)>,
    limits: PageLimits,
    concurrency: usize,
    tx: mpsc::Sender<FetchResult<S::Item>>,
) where
    S: PageSource + 'static,
{
    let mut pages = std::pin::pin!(merged_pages(sources, limits, concurrency));
    let mut delivered = 0usize;

    while let Some((symbol, page)) = pages.next().await {
        match page {
            Ok(records) => {
                for record in records {
                    let item = FetchResult {
                        symbol: symbol.clone(),
                        item: Ok(record),
                    };
                    // receiver gone: stop fetching
                    if tx.send(item).await.is_err() {
                        return;
                    }
                    delivered += 1;
                    if limits.total.is_some_and(|total| delivered >= total) {
                        return;
                    }
                }
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(symbol = %symbol, error = %err, "symbol retrieval failed");

                let fatal = err.is_fatal();
                let item = FetchResult {
                    symbol,
                    item: Err(err),
                };
                if tx.send(item).await.is_err() || fatal {
                    return;
                }
            }
        }
    }
}
