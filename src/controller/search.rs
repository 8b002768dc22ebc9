//! Search/load orchestration

use tokio::task::JoinHandle;

use crate::model::ActiveSection;
use super::AppController;

/// Who asked for a search
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchOrigin {
    User,
    Startup,
}

impl AppController {
    /// Run a search in the background. Completions are applied in arrival order.
    pub fn submit_search(&self, term: String, origin: SearchOrigin) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            controller.perform_search(&term, origin).await;
        })
    }

    /// Search for the configured initial term
    pub fn submit_startup_search(&self) -> JoinHandle<()> {
        let term = self.config.initial_search_term.clone();
        tracing::info!(term = %term, "Issuing startup search");
        self.submit_search(term, SearchOrigin::Startup)
    }

    pub async fn perform_search(&self, term: &str, origin: SearchOrigin) {
        tracing::debug!(term, ?origin, "Performing search");

        {
            let mut model = self.model.lock().await;
            if let Err(e) = model.begin_search(term) {
                tracing::warn!(term, error = %e, "Search rejected");
                return;
            }
        }

        // The model stays unlocked while the request is in flight
        let result = self.catalog.search(term).await;
        let found = result.as_ref().is_ok_and(|tracks| !tracks.is_empty());

        let mut model = self.model.lock().await;
        model.finish_search(term, result);

        if found && origin == SearchOrigin::User {
            model.set_active_section(ActiveSection::Results);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::controller::testing::{controller_with, harness};
    use crate::controller::SearchOrigin;
    use crate::error::Error;
    use crate::model::ActiveSection;
    use crate::test_support::{track, tracks, GatedCatalog};

    #[tokio::test]
    async fn blank_term_never_reaches_the_catalog() {
        let h = harness(Ok(tracks(3)));

        h.controller.perform_search("", SearchOrigin::User).await;
        h.controller.perform_search(" \t ", SearchOrigin::User).await;

        assert_eq!(h.catalog.calls(), 0);
        let snapshot = h.controller.model.lock().await.snapshot();
        assert_eq!(snapshot.error_message.as_deref(), Some("Search can't empty"));
        assert!(snapshot.tracks.is_empty());
    }

    #[tokio::test]
    async fn results_replace_the_playlist_and_take_focus() {
        let h = harness(Ok(tracks(3)));

        h.controller.perform_search("neck deep", SearchOrigin::User).await;

        assert_eq!(h.catalog.terms(), vec!["neck deep".to_string()]);
        let model = h.controller.model.lock().await;
        let snapshot = model.snapshot();
        assert_eq!(snapshot.tracks.len(), 3);
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.error_message, None);
        assert_eq!(model.active_section(), ActiveSection::Results);
    }

    #[tokio::test]
    async fn empty_result_names_the_term() {
        let h = harness(Ok(Vec::new()));

        h.controller.perform_search("zzzzqqq", SearchOrigin::User).await;

        let model = h.controller.model.lock().await;
        let snapshot = model.snapshot();
        assert_eq!(
            snapshot.error_message.as_deref(),
            Some("No songs found for 'zzzzqqq'.")
        );
        assert_eq!(model.active_section(), ActiveSection::Search);
    }

    #[tokio::test]
    async fn failure_is_reported_with_detail() {
        let h = harness(Err(Error::Network {
            term: "abba".to_string(),
            message: "connection refused".to_string(),
        }));

        h.controller.perform_search("abba", SearchOrigin::User).await;

        let snapshot = h.controller.model.lock().await.snapshot();
        assert!(snapshot.tracks.is_empty());
        let message = snapshot.error_message.unwrap();
        assert!(message.starts_with("Error fetching songs: "));
        assert!(message.contains("connection refused"));
    }

    #[tokio::test]
    async fn startup_search_uses_configured_term_and_keeps_focus() {
        let h = harness(Ok(tracks(2)));

        h.controller.submit_startup_search().await.unwrap();

        assert_eq!(h.catalog.terms(), vec!["Neck Deep".to_string()]);
        let model = h.controller.model.lock().await;
        assert_eq!(model.snapshot().tracks.len(), 2);
        assert_eq!(model.active_section(), ActiveSection::Search);
    }

    #[tokio::test]
    async fn startup_search_clears_a_stale_error() {
        let h = harness(Ok(tracks(1)));
        h.controller.perform_search("", SearchOrigin::User).await;

        h.controller.submit_startup_search().await.unwrap();

        assert_eq!(h.controller.model.lock().await.snapshot().error_message, None);
    }

    #[tokio::test]
    async fn overlapping_searches_keep_the_last_completion() {
        let catalog = Arc::new(GatedCatalog::new(vec![
            ("first", Ok(tracks(3))),
            ("second", Ok(vec![track(7)])),
        ]));
        let (controller, _engine, _events) = controller_with(catalog.clone());

        let first = controller.submit_search("first".to_string(), SearchOrigin::User);
        let second = controller.submit_search("second".to_string(), SearchOrigin::User);
        while catalog.calls() < 2 {
            tokio::task::yield_now().await;
        }
        assert!(controller.model.lock().await.snapshot().is_loading);

        catalog.release("second");
        second.await.unwrap();
        {
            let snapshot = controller.model.lock().await.snapshot();
            assert_eq!(snapshot.tracks.len(), 1);
            assert_eq!(snapshot.tracks[0].title, track(7).title);
        }

        catalog.release("first");
        first.await.unwrap();

        let snapshot = controller.model.lock().await.snapshot();
        assert_eq!(snapshot.tracks.len(), 3);
        assert_eq!(snapshot.tracks[0].title, track(0).title);
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.error_message, None);
    }
}
