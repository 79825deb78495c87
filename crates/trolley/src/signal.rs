//! Crawl-priority signals.
//!
//! Shopping behavior tells the crawler fleet what to refresh next: adding a
//! list item or searching prices emits a [`PrioritySignal`], and a
//! [`SignalRecorder`] task aggregates them into the `crawl_priority` table.
//! Emission is fire-and-forget by construction. A full channel or a dead
//! recorder costs a warning, never an error, and never delays the caller.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_postgres::Client;

use crate::pool::ConnectionProvider;
use crate::Result;

/// Where a signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    /// A shopping-list item was added.
    List,
    /// A shopper searched for prices.
    Search,
}

impl SignalSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Search => "search",
        }
    }
}

/// A request to prioritize crawling for one product search.
#[derive(Debug, Clone)]
pub struct PrioritySignal {
    /// Free text to crawl for, normalized to lowercase when recorded so
    /// repeat interest aggregates onto one row.
    pub product_search: String,
    /// Stores to target; empty means any store.
    pub stores: Vec<String>,
    pub source: SignalSource,
}

/// Sending half of the signal channel. Cheap to clone.
#[derive(Clone)]
pub struct SignalSender {
    tx: mpsc::Sender<PrioritySignal>,
}

impl SignalSender {
    /// Emit a signal, best-effort.
    ///
    /// Never blocks and never fails: when the channel is full or the
    /// recorder is gone, the signal is dropped with a warning.
    pub fn emit(&self, signal: PrioritySignal) {
        if let Err(e) = self.tx.try_send(signal) {
            tracing::warn!(error = %e, "dropping crawl-priority signal");
        }
    }
}

/// Receiving half of the signal channel, consumed by [`SignalRecorder`].
pub type SignalReceiver = mpsc::Receiver<PrioritySignal>;

/// Create a bounded signal channel.
pub fn signal_channel(capacity: usize) -> (SignalSender, SignalReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (SignalSender { tx }, rx)
}

/// Background task draining signals into the database.
///
/// ```ignore
/// let (sender, rx) = signal_channel(256);
/// tokio::spawn(SignalRecorder::new(provider.clone(), rx).run());
/// let lists = ListStore::new(provider).with_signals(sender);
/// ```
pub struct SignalRecorder<P> {
    provider: P,
    rx: SignalReceiver,
}

impl<P: ConnectionProvider> SignalRecorder<P> {
    pub fn new(provider: P, rx: SignalReceiver) -> Self {
        Self { provider, rx }
    }

    /// Run until every sender is dropped.
    ///
    /// Database errors are logged and swallowed; prioritization is advisory
    /// and one lost signal must not stop the drain.
    pub async fn run(mut self) {
        while let Some(signal) = self.rx.recv().await {
            if let Err(e) = record_signal(&self.provider, &signal).await {
                tracing::warn!(
                    error = %e,
                    search = %signal.product_search,
                    "failed to record crawl-priority signal"
                );
            }
        }
        tracing::debug!("signal recorder stopped");
    }
}

/// Record one signal synchronously.
///
/// Writes one `crawl_priority` row per targeted store, or a single any-store
/// row. Repeat signals bump `request_count` and clear `last_crawled`, so
/// fresh interest re-queues an already-crawled entry.
pub async fn record_signal<P: ConnectionProvider>(
    provider: &P,
    signal: &PrioritySignal,
) -> Result<()> {
    let conn = provider.get().await?;
    let search = normalize_search(&signal.product_search);
    let source = signal.source.as_str();
    if signal.stores.is_empty() {
        record_one(&conn, &search, None, source).await?;
    } else {
        for store in &signal.stores {
            record_one(&conn, &search, Some(store.as_str()), source).await?;
        }
    }
    Ok(())
}

async fn record_one(
    client: &Client,
    product_search: &str,
    store_name: Option<&str>,
    source: &str,
) -> Result<()> {
    client
        .execute(
            r#"
INSERT INTO crawl_priority (product_search, store_name, source)
VALUES ($1, $2, $3)
ON CONFLICT (product_search, store_name) DO UPDATE
   SET request_count = crawl_priority.request_count + 1,
       last_requested = now(),
       last_crawled = NULL
"#,
            &[&product_search, &store_name, &source],
        )
        .await?;
    Ok(())
}

/// Record search-driven interest without going through the channel.
pub async fn record_search<P: ConnectionProvider>(
    provider: &P,
    query: &str,
    store_name: Option<&str>,
) -> Result<()> {
    record_signal(
        provider,
        &PrioritySignal {
            product_search: query.to_string(),
            stores: store_name.map(str::to_string).into_iter().collect(),
            source: SignalSource::Search,
        },
    )
    .await
}

/// An uncrawled entry from the priority queue.
#[derive(Debug, Clone)]
pub struct PendingPriority {
    pub product_search: String,
    /// `None` means any store.
    pub store_name: Option<String>,
    pub source: String,
    pub request_count: i32,
    pub last_requested: DateTime<Utc>,
}

/// Most-wanted uncrawled entries, highest request count first.
pub async fn top_pending<P: ConnectionProvider>(
    provider: &P,
    limit: i64,
) -> Result<Vec<PendingPriority>> {
    let conn = provider.get().await?;
    let rows = conn
        .query(
            "SELECT product_search, store_name, source, request_count, last_requested
               FROM crawl_priority
              WHERE last_crawled IS NULL
              ORDER BY request_count DESC, last_requested DESC
              LIMIT $1",
            &[&limit],
        )
        .await?;
    Ok(rows
        .iter()
        .map(|row| PendingPriority {
            product_search: row.get(0),
            store_name: row.get(1),
            source: row.get(2),
            request_count: row.get(3),
            last_requested: row.get(4),
        })
        .collect())
}

/// Stamp a queue entry as crawled. Returns whether a row matched.
pub async fn mark_completed<P: ConnectionProvider>(
    provider: &P,
    product_search: &str,
    store_name: Option<&str>,
) -> Result<bool> {
    let conn = provider.get().await?;
    let search = normalize_search(product_search);
    let n = conn
        .execute(
            "UPDATE crawl_priority SET last_crawled = now()
              WHERE product_search = $1 AND store_name IS NOT DISTINCT FROM $2",
            &[&search, &store_name],
        )
        .await?;
    Ok(n > 0)
}

fn normalize_search(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_into_dead_channel_is_a_no_op() {
        let (sender, rx) = signal_channel(4);
        drop(rx);
        // must not panic or block
        sender.emit(PrioritySignal {
            product_search: "bread".to_string(),
            stores: vec![],
            source: SignalSource::List,
        });
    }

    #[tokio::test]
    async fn full_channel_drops_newest_signal() {
        let (sender, mut rx) = signal_channel(1);
        sender.emit(PrioritySignal {
            product_search: "first".to_string(),
            stores: vec![],
            source: SignalSource::List,
        });
        sender.emit(PrioritySignal {
            product_search: "second".to_string(),
            stores: vec![],
            source: SignalSource::List,
        });

        let got = rx.recv().await.map(|s| s.product_search);
        assert_eq!(got.as_deref(), Some("first"));
        assert!(rx.try_recv().is_err(), "overflow signal should be dropped");
    }

    #[test]
    fn search_normalization() {
        assert_eq!(normalize_search("  Hovis Bread "), "hovis bread");
        assert_eq!(normalize_search("PEPSI"), "pepsi");
    }
}
