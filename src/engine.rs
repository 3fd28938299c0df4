// src/engine.rs - Query orchestration: cache, debounce, fetch, staleness control

use log::{debug, trace};
use std::ops::Range;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cache::TermCache;
use crate::config::{AutocompleteConfig, ConfigError};
use crate::debounce::Debouncer;
use crate::highlight::Highlighter;
use crate::source::{Fetch, ItemSource, SourceError};

pub(crate) type DisplayFn<T> = Box<dyn Fn(&T) -> String + Send>;

/// Result of one fetch task, tagged with the text it was issued for and a
/// monotonically increasing ticket. The ticket identifies the live request;
/// the text drives the staleness check on delivery.
pub(crate) struct QueryOutcome<T> {
    ticket: u64,
    text: String,
    result: Result<Vec<T>, SourceError>,
}

pub(crate) struct Inflight {
    ticket: u64,
    handle: JoinHandle<()>,
}

enum EngineEvent<T> {
    DebounceFired(String),
    QueryDone(QueryOutcome<T>),
}

/// Autocomplete engine: owns the search text, the match list, the navigation
/// state and the query machinery around one item source.
///
/// The engine is driven from a single task: the host feeds it text changes
/// and key events, and calls [`pump`](Self::pump) (or [`poll`](Self::poll))
/// to let debounce timers and completed fetches act on the state. All state
/// mutation happens on the driving task; fetch tasks only ship results back
/// over a channel. The core guarantee is that the displayed match list always
/// belongs to the most recently typed text, regardless of the order in which
/// overlapping fetches complete.
///
/// Must be used inside a tokio runtime.
pub struct Autocomplete<T, S> {
    pub(crate) source: S,
    pub(crate) display: DisplayFn<T>,
    pub(crate) config: AutocompleteConfig,
    pub(crate) cache: TermCache<T>,
    pub(crate) debouncer: Debouncer<String>,
    pub(crate) debounce_rx: mpsc::UnboundedReceiver<String>,
    pub(crate) query_tx: mpsc::UnboundedSender<QueryOutcome<T>>,
    pub(crate) query_rx: mpsc::UnboundedReceiver<QueryOutcome<T>>,
    pub(crate) inflight: Option<Inflight>,
    pub(crate) next_ticket: u64,
    pub(crate) search_text: String,
    pub(crate) highlighter: Highlighter,
    pub(crate) matches: Vec<T>,
    pub(crate) selected: Option<T>,
    pub(crate) index: Option<usize>,
    pub(crate) hidden: bool,
    pub(crate) loading: bool,
    pub(crate) pending_settle: bool,
    pub(crate) scroll_top: f32,
}

impl<S> Autocomplete<String, S>
where
    S: ItemSource<String>,
{
    /// Engine over string items, displayed as themselves.
    pub fn new(source: S, config: AutocompleteConfig) -> Result<Self, ConfigError> {
        Self::with_display(source, config, Clone::clone)
    }
}

impl<T, S> Autocomplete<T, S>
where
    T: Clone + Send + 'static,
    S: ItemSource<T>,
{
    /// Engine over opaque items projected to display text by `display`.
    pub fn with_display(
        source: S,
        config: AutocompleteConfig,
        display: impl Fn(&T) -> String + Send + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (debouncer, debounce_rx) = Debouncer::new(config.debounce_window());
        let (query_tx, query_rx) = mpsc::unbounded_channel();
        let cache = TermCache::new(config.cache_capacity);
        Ok(Self {
            source,
            display: Box::new(display),
            config,
            cache,
            debouncer,
            debounce_rx,
            query_tx,
            query_rx,
            inflight: None,
            next_ticket: 0,
            search_text: String::new(),
            highlighter: Highlighter::new(""),
            matches: Vec::new(),
            selected: None,
            index: None,
            hidden: true,
            loading: false,
            pending_settle: false,
            scroll_top: 0.0,
        })
    }

    /// Apply a change of the raw search text.
    ///
    /// Per text change, one of four things happens: empty text clears
    /// everything; a cached term is served immediately; a closed dropdown
    /// defers the fetch until [`open`](Self::open); otherwise the previous
    /// in-flight request is cancelled and a fetch is armed behind the
    /// debounce window. This call is also the "value settled" point after a
    /// keystroke, so the deferred auto-hide re-check runs here.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.search_text {
            self.settle();
            return;
        }
        self.search_text = text.clone();
        self.highlighter = Highlighter::new(&text);

        if text.is_empty() {
            trace!("search text cleared");
            self.debouncer.cancel();
            self.matches.clear();
            self.loading = false;
            self.index = None;
            self.hidden = true;
            self.pending_settle = false;
            return;
        }

        if let Some(cached) = self.cache.get(&text) {
            debug!("cache hit for {:?}", text);
            self.matches = cached.to_vec();
            self.loading = false;
            self.clamp_index();
        } else if self.hidden {
            trace!("dropdown closed, deferring fetch for {:?}", text);
        } else {
            self.cancel_inflight();
            self.debouncer.schedule(text);
        }
        self.settle();
    }

    /// Re-evaluate the auto-hide rule after the input's value has settled.
    /// [`set_search_text`](Self::set_search_text) runs this implicitly; hosts
    /// call it directly for keystrokes that did not change the text.
    pub fn on_text_settled(&mut self) {
        self.settle();
    }

    /// The dropdown became relevant (input focused). Un-hides the list and
    /// issues any fetch that was deferred while it was closed.
    pub fn open(&mut self) {
        self.hidden = false;
        if self.search_text.is_empty() {
            return;
        }
        if let Some(cached) = self.cache.get(&self.search_text) {
            self.matches = cached.to_vec();
            self.loading = false;
            self.clamp_index();
        } else if self.inflight.is_none() {
            self.debouncer.schedule(self.search_text.clone());
        }
    }

    /// The dropdown lost relevance (input blurred).
    pub fn close(&mut self) {
        self.hidden = true;
    }

    /// Process one engine event: a debounce window elapsing, or a fetch
    /// completing. Resolves when something was handled.
    pub async fn pump(&mut self) {
        let event = tokio::select! {
            fired = self.debounce_rx.recv() => fired.map(EngineEvent::DebounceFired),
            done = self.query_rx.recv() => done.map(EngineEvent::QueryDone),
        };
        match event {
            Some(EngineEvent::DebounceFired(text)) => self.issue_fetch(text),
            Some(EngineEvent::QueryDone(outcome)) => self.apply_outcome(outcome),
            None => {}
        }
    }

    /// Drain every event that is already ready, without waiting.
    pub fn poll(&mut self) {
        loop {
            if let Ok(text) = self.debounce_rx.try_recv() {
                self.issue_fetch(text);
                continue;
            }
            if let Ok(outcome) = self.query_rx.try_recv() {
                self.apply_outcome(outcome);
                continue;
            }
            break;
        }
    }

    fn issue_fetch(&mut self, text: String) {
        match self.source.query(&text) {
            Fetch::Ready(items) => {
                trace!("synchronous result for {:?} ({} items)", text, items.len());
                // Valid for its own term even if the text moved on meanwhile.
                self.cache.put(&text, items.clone());
                if text == self.search_text {
                    self.matches = items;
                    self.loading = false;
                    self.clamp_index();
                    self.apply_auto_hide();
                }
            }
            Fetch::Pending(future) => {
                self.loading = true;
                let ticket = self.next_ticket;
                self.next_ticket += 1;
                let tx = self.query_tx.clone();
                let task_text = text.clone();
                debug!("fetch #{ticket} started for {:?}", text);
                let handle = tokio::spawn(async move {
                    let result = future.await;
                    let _ = tx.send(QueryOutcome {
                        ticket,
                        text: task_text,
                        result,
                    });
                });
                self.inflight = Some(Inflight { ticket, handle });
            }
        }
    }

    fn apply_outcome(&mut self, outcome: QueryOutcome<T>) {
        let QueryOutcome {
            ticket,
            text,
            result,
        } = outcome;
        let live = self.inflight.as_ref().is_some_and(|f| f.ticket == ticket);
        if live {
            self.inflight = None;
            self.loading = false;
        }
        match result {
            Ok(items) => {
                // Caching a stale result is fine: it answers the term it was
                // computed for. Only displaying it would be wrong.
                self.cache.put(&text, items.clone());
                if text == self.search_text {
                    self.matches = items;
                    self.clamp_index();
                    self.apply_auto_hide();
                } else {
                    debug!(
                        "discarding stale response for {:?} (current {:?})",
                        text, self.search_text
                    );
                }
            }
            Err(err) => {
                // Match list deliberately retained on failure.
                debug!("item source failed for {:?}: {}", text, err);
            }
        }
    }

    fn cancel_inflight(&mut self) {
        if let Some(inflight) = self.inflight.take() {
            trace!("cancelling in-flight fetch #{}", inflight.ticket);
            inflight.handle.abort();
        }
    }

    /// Two-phase key handling: a plain keystroke flags a deferred re-check,
    /// consumed once the text value settles. A key-driven settle may open the
    /// list; any other settle (or a query delivery) may only hide it.
    fn settle(&mut self) {
        if self.pending_settle {
            self.pending_settle = false;
            self.hidden = self.auto_hide();
        } else {
            self.apply_auto_hide();
        }
    }

    pub(crate) fn clamp_index(&mut self) {
        if let Some(i) = self.index
            && i >= self.matches.len()
        {
            self.index = None;
        }
    }

    pub(crate) fn display_of(&self, item: &T) -> String {
        (self.display)(item)
    }

    // --- read-side accessors -------------------------------------------------

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Current match list, in source order.
    pub fn matches(&self) -> &[T] {
        &self.matches
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.selected.as_ref()
    }

    /// Display text of the active row, if any.
    pub fn current_display_value(&self) -> Option<String> {
        let item = self.matches.get(self.index?)?;
        Some(self.display_of(item))
    }

    /// Highlighted-prefix byte range of `text` against the current term.
    pub fn highlight(&self, text: &str) -> Option<Range<usize>> {
        self.highlighter.prefix_span(text)
    }

    /// Dropdown viewport offset maintained by the scroll-into-view rule.
    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }
}

impl<T, S> Drop for Autocomplete<T, S> {
    fn drop(&mut self) {
        if let Some(inflight) = self.inflight.take() {
            inflight.handle.abort();
        }
    }
}
