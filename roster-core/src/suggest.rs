//! Address suggestion provider
//!
//! Wraps a completion backend behind the `CompletionService` trait and runs
//! it on a single worker task. The UI sends query fragments with `update`
//! (non-blocking) and drains whole replacement lists with `try_recv` on its
//! own update path each frame, so deliveries never interleave with other
//! state mutations.
//!
//! A newer fragment supersedes anything still queued: the worker drains the
//! command channel before issuing a request, and deliveries are in order, so
//! the last list delivered always corresponds to the newest query. Failures
//! deliver an empty list (logged at the worker), never an error.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A candidate place: primary line plus an optional secondary line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Suggestion {
    pub title: String,
    pub subtitle: String,
}

/// Seam to the external completion backend. Tests substitute a mock; the
/// real implementation is `PhotonClient`.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, query: &str) -> anyhow::Result<Vec<Suggestion>>;
}

pub struct SuggestionProvider {
    query_tx: mpsc::UnboundedSender<String>,
    result_rx: mpsc::UnboundedReceiver<Vec<Suggestion>>,
    #[allow(dead_code)]
    worker_handle: JoinHandle<()>,
}

impl SuggestionProvider {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        let (query_tx, query_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        let worker_handle = tokio::spawn(async move {
            Self::worker_loop(service, query_rx, result_tx).await;
        });

        Self {
            query_tx,
            result_rx,
            worker_handle,
        }
    }

    async fn worker_loop(
        service: Arc<dyn CompletionService>,
        mut query_rx: mpsc::UnboundedReceiver<String>,
        result_tx: mpsc::UnboundedSender<Vec<Suggestion>>,
    ) {
        while let Some(mut query) = query_rx.recv().await {
            // Coalesce the backlog; only the newest fragment matters.
            while let Ok(next) = query_rx.try_recv() {
                query = next;
            }

            let suggestions = if query.is_empty() {
                Vec::new()
            } else {
                match service.complete(&query).await {
                    Ok(list) => list,
                    Err(e) => {
                        tracing::warn!(query = %query, error = %e, "completion lookup failed");
                        Vec::new()
                    }
                }
            };

            if result_tx.send(suggestions).is_err() {
                break;
            }
        }
    }

    /// Submit the current fragment. Non-blocking; results arrive later.
    pub fn update(&self, query: impl Into<String>) {
        let _ = self.query_tx.send(query.into());
    }

    /// Drain one delivered list, if any. Called on the UI update path.
    pub fn try_recv(&mut self) -> Option<Vec<Suggestion>> {
        self.result_rx.try_recv().ok()
    }

    /// Await the next delivered list.
    pub async fn next_result(&mut self) -> Option<Vec<Suggestion>> {
        self.result_rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedService {
        result: anyhow::Result<Vec<Suggestion>>,
        calls: AtomicUsize,
    }

    impl FixedService {
        fn ok(list: Vec<Suggestion>) -> Self {
            Self {
                result: Ok(list),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                result: Err(anyhow::anyhow!("backend unavailable")),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionService for FixedService {
        async fn complete(&self, _query: &str) -> anyhow::Result<Vec<Suggestion>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(list) => Ok(list.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }
    }

    fn paris() -> Vec<Suggestion> {
        vec![Suggestion {
            title: "Paris".to_string(),
            subtitle: "Île-de-France, France".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_delivers_results_for_a_query() {
        let mut provider = SuggestionProvider::new(Arc::new(FixedService::ok(paris())));
        provider.update("Par");
        assert_eq!(provider.next_result().await, Some(paris()));
    }

    #[tokio::test]
    async fn test_failure_delivers_an_empty_list() {
        let mut provider = SuggestionProvider::new(Arc::new(FixedService::failing()));
        // Prior non-empty suggestions are irrelevant: the delivery replaces
        // the whole list, so a failure always clears.
        provider.update("Par");
        assert_eq!(provider.next_result().await, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_empty_fragment_clears_without_calling_the_backend() {
        let service = Arc::new(FixedService::ok(paris()));
        let mut provider = SuggestionProvider::new(Arc::clone(&service) as Arc<dyn CompletionService>);

        provider.update("");
        assert_eq!(provider.next_result().await, Some(Vec::new()));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_last_delivery_matches_newest_query() {
        struct EchoService;

        #[async_trait]
        impl CompletionService for EchoService {
            async fn complete(&self, query: &str) -> anyhow::Result<Vec<Suggestion>> {
                Ok(vec![Suggestion {
                    title: query.to_string(),
                    subtitle: String::new(),
                }])
            }
        }

        let mut provider = SuggestionProvider::new(Arc::new(EchoService));
        provider.update("P");
        provider.update("Pa");
        provider.update("Par");

        // Deliveries are in order; whatever was coalesced, the final list
        // reflects the newest fragment.
        let mut last = None;
        while let Some(list) = provider.next_result().await {
            let done = list.first().map(|s| s.title == "Par").unwrap_or(false);
            last = Some(list);
            if done {
                break;
            }
        }
        assert_eq!(last.unwrap()[0].title, "Par");
    }
}
