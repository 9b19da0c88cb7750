// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Runs session effects against a [`Library`] on the tokio runtime.
//!
//! Every effect becomes a task whose completion is sent back over a channel and
//! dispatched as an intent, one at a time, on the caller's task. Search tasks race an
//! abort signal and report [`SearchOutcome::Aborted`] when it wins.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::history::NavigableHistory;
use crate::library::Library;
use crate::model::RequestId;
use crate::session::{Effect, Intent, SearchOutcome, SessionController};

pub struct Driver<L: Library + 'static, H: NavigableHistory> {
    session: SessionController<H>,
    library: Arc<L>,
    completions_tx: mpsc::UnboundedSender<Intent>,
    completions_rx: mpsc::UnboundedReceiver<Intent>,
    aborts: HashMap<RequestId, oneshot::Sender<()>>,
    in_flight: usize,
}

impl<L: Library + 'static, H: NavigableHistory> Driver<L, H> {
    pub fn new(session: SessionController<H>, library: Arc<L>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            session,
            library,
            completions_tx,
            completions_rx,
            aborts: HashMap::new(),
            in_flight: 0,
        }
    }

    pub fn session(&self) -> &SessionController<H> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionController<H> {
        &mut self.session
    }

    pub fn into_session(self) -> SessionController<H> {
        self.session
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Writes the initial history entry and starts the bootstrap fetches.
    pub fn start(&mut self) {
        let effects = self.session.start();
        self.run(effects);
    }

    pub fn dispatch(&mut self, intent: Intent) {
        let effects = self.session.handle(intent);
        self.run(effects);
    }

    /// Waits for one completion and dispatches it. Returns `false` when nothing is
    /// in flight.
    pub async fn step(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        let Some(intent) = self.completions_rx.recv().await else {
            return false;
        };
        self.in_flight -= 1;
        if let Intent::SearchFinished { request, .. } = &intent {
            self.aborts.remove(request);
        }
        self.dispatch(intent);
        true
    }

    /// Dispatches completions until nothing is left in flight.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            let library = Arc::clone(&self.library);
            match effect {
                Effect::FetchText {
                    request,
                    reference,
                    with_context,
                } => self.spawn(async move {
                    Intent::TextLoaded {
                        request,
                        result: library.fetch_text(&reference, with_context).await,
                    }
                }),
                Effect::FetchLinks { request, section } => self.spawn(async move {
                    Intent::LinksLoaded {
                        request,
                        result: library.fetch_links(&section).await,
                    }
                }),
                Effect::FetchTocHtml { request, book } => self.spawn(async move {
                    Intent::TocLoaded {
                        request,
                        result: library.fetch_toc_html(&book).await,
                    }
                }),
                Effect::Search {
                    request,
                    query,
                    size,
                } => {
                    let (abort_tx, abort_rx) = oneshot::channel::<()>();
                    self.aborts.insert(request, abort_tx);
                    self.spawn(async move {
                        let outcome = tokio::select! {
                            result = library.search(&query, size) => match result {
                                Ok(response) => SearchOutcome::Completed(response),
                                Err(err) => SearchOutcome::Failed(err),
                            },
                            _ = abort_rx => SearchOutcome::Aborted,
                        };
                        Intent::SearchFinished { request, outcome }
                    });
                }
                Effect::AbortSearch { request } => self.abort(request),
            }
        }
    }

    fn abort(&mut self, request: RequestId) {
        match self.aborts.remove(&request) {
            Some(abort) => {
                // The task may have finished already; its result is then simply stale.
                let _ = abort.send(());
            }
            None => tracing::debug!(%request, "abort for a search that already finished"),
        }
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Intent> + Send + 'static,
    {
        self.in_flight += 1;
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            // The receiver only goes away with the driver.
            let _ = completions.send(task.await);
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rstest::{fixture, rstest};

    use super::Driver;
    use crate::config::ReaderConfig;
    use crate::history::MemoryHistory;
    use crate::library::MemoryLibrary;
    use crate::model::fixtures::text_panel;
    use crate::model::PanelId;
    use crate::session::{Intent, LoadStatus, SessionController};
    use crate::store::PanelStore;

    #[fixture]
    fn driver() -> Driver<MemoryLibrary, MemoryHistory> {
        let library = MemoryLibrary::sample()
            .with_text_delay(Duration::from_millis(40))
            .with_search_delay("light", Duration::from_millis(500));
        let config = ReaderConfig::default();
        let store =
            PanelStore::from_panels(false, config.panel_rules(), vec![text_panel(1, "Genesis 1")]);
        Driver::new(SessionController::new(store, &config, MemoryHistory::new()), Arc::new(library))
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn settle_runs_every_fetch(mut driver: Driver<MemoryLibrary, MemoryHistory>) {
        driver.start();
        assert!(driver.in_flight() > 0);

        driver.settle().await;

        assert_eq!(driver.in_flight(), 0);
        assert_eq!(driver.session().pending_requests(), 0);
        assert_eq!(driver.session().load_status(PanelId::new(1)), Some(LoadStatus::Ready));
        assert!(driver.session().toc_html("Genesis").is_some());
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn slow_query_is_aborted_by_the_next(mut driver: Driver<MemoryLibrary, MemoryHistory>) {
        driver.start();
        let panel = PanelId::new(1);

        driver.dispatch(Intent::SearchOpened {
            panel,
            query: Some("light".to_owned()),
        });
        driver.dispatch(Intent::SearchQueryChanged {
            panel,
            query: Some("the".to_owned()),
        });
        driver.settle().await;

        let search = driver.session().search(panel).unwrap();
        assert_eq!(search.query(), "the");
        assert!(!search.has_error());
        assert!(!search.is_running());
        let results = search.results().unwrap();
        assert!(results.text_hits.iter().all(|hit| hit.content.to_lowercase().contains("the")));
    }
}
