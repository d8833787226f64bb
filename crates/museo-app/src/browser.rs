// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::ids::RequestId;
use crate::model::{Item, PageDescriptor, PagePayload, SearchFields};
use crate::pagination::{PageToken, pagination_window};
use crate::state::{BrowserState, ViewChanged};

pub const DEFAULT_PER_PAGE: u32 = 9;

/// Remote paginated collection the browser pulls pages from.
pub trait CollectionSource: Send + Sync + 'static {
    fn fetch_page(&self, page: u32, per_page: u32) -> Result<PagePayload>;
}

impl<S: CollectionSource + ?Sized> CollectionSource for Box<S> {
    fn fetch_page(&self, page: u32, per_page: u32) -> Result<PagePayload> {
        (**self).fetch_page(page, per_page)
    }
}

/// Result of a page request, tagged with the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub request_id: RequestId,
    pub page: u32,
    pub per_page: u32,
    pub result: Result<PagePayload>,
}

pub type ViewHandler = Box<dyn FnMut(&ViewChanged<'_>)>;

pub struct CollectionBrowser<S> {
    source: Arc<S>,
    state: BrowserState,
    per_page: u32,
    latest_request: RequestId,
    in_flight: Option<RequestId>,
    tx: Sender<FetchOutcome>,
    rx: Receiver<FetchOutcome>,
    subscribers: Vec<ViewHandler>,
}

impl<S: CollectionSource> CollectionBrowser<S> {
    pub fn new(source: S) -> Self {
        Self::with_shared_source(Arc::new(source))
    }

    pub fn with_shared_source(source: Arc<S>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            state: BrowserState::default(),
            per_page: DEFAULT_PER_PAGE,
            latest_request: RequestId::default(),
            in_flight: None,
            tx,
            rx,
            subscribers: Vec::new(),
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn with_search_fields(mut self, fields: SearchFields) -> Self {
        self.state = BrowserState::new(fields);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn state(&self) -> &BrowserState {
        &self.state
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn page(&self) -> PageDescriptor {
        self.state.page()
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &Item> {
        self.state.visible_items()
    }

    pub fn selected(&self) -> Option<&Item> {
        self.state.selected()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Registers a handler invoked synchronously after every view transition.
    pub fn subscribe(&mut self, handler: impl FnMut(&ViewChanged<'_>) + 'static) {
        self.subscribers.push(Box::new(handler));
    }

    /// Fetches a page on the calling thread, superseding any background fetch.
    pub fn fetch_page(&mut self, page: u32, per_page: u32) -> Result<PageDescriptor> {
        let request_id = self.dispatch();
        self.in_flight = None;
        debug!(request_id = request_id.get(), page, per_page, "fetching page");
        let result = self.source.fetch_page(page, per_page);
        self.apply_result(request_id, page, per_page, result)
    }

    /// Starts a fetch on a worker thread; collect it with `process_pending`.
    pub fn spawn_fetch(&mut self, page: u32, per_page: u32) -> RequestId {
        let request_id = self.dispatch();
        self.in_flight = Some(request_id);
        debug!(request_id = request_id.get(), page, per_page, "dispatching page fetch");

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = source.fetch_page(page, per_page);
            let _ = tx.send(FetchOutcome {
                request_id,
                page,
                per_page,
                result,
            });
        });
        request_id
    }

    /// Applies every finished background fetch that is still current.
    pub fn process_pending(&mut self) -> Vec<Result<PageDescriptor>> {
        let mut applied = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            if let Some(result) = self.apply_outcome(outcome) {
                applied.push(result);
            }
        }
        applied
    }

    /// Blocks until the latest dispatched fetch lands, discarding stale ones on the way.
    pub fn wait_for_latest(&mut self, timeout: Duration) -> Option<Result<PageDescriptor>> {
        let deadline = Instant::now() + timeout;
        while self.in_flight.is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(outcome) => {
                    if let Some(result) = self.apply_outcome(outcome) {
                        return Some(result);
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
        None
    }

    /// Applies an outcome only if it answers the most recently dispatched request.
    pub fn apply_outcome(&mut self, outcome: FetchOutcome) -> Option<Result<PageDescriptor>> {
        if outcome.request_id != self.latest_request {
            debug!(
                request_id = outcome.request_id.get(),
                latest = self.latest_request.get(),
                page = outcome.page,
                "discarding stale page result"
            );
            return None;
        }
        self.in_flight = None;
        Some(self.apply_result(
            outcome.request_id,
            outcome.page,
            outcome.per_page,
            outcome.result,
        ))
    }

    pub fn goto_page(&mut self, page: u32) -> Result<PageDescriptor> {
        self.check_page_target(page)?;
        self.fetch_page(page, self.per_page)
    }

    pub fn spawn_goto_page(&mut self, page: u32) -> Result<RequestId> {
        self.check_page_target(page)?;
        Ok(self.spawn_fetch(page, self.per_page))
    }

    pub fn next_page(&mut self) -> Result<PageDescriptor> {
        self.goto_page(self.state.page().page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> Result<PageDescriptor> {
        self.goto_page(self.state.page().page.saturating_sub(1))
    }

    pub fn set_filter(&mut self, key: &str, value: &str) {
        self.state.set_filter(key, value);
        self.notify();
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.state.set_search_term(term);
        self.notify();
    }

    pub fn reset_filters(&mut self) {
        self.state.reset_filters();
        self.notify();
    }

    /// Selects an item on the current page; unknown ids leave the selection as it was.
    pub fn select_item(&mut self, id: &str) -> Result<&Item> {
        if let Err(error) = self.state.select(id) {
            debug!(id, "selection target not on current page");
            return Err(error);
        }
        self.notify();
        self.state
            .selected()
            .ok_or_else(|| Error::not_found("item", id))
    }

    pub fn clear_selection(&mut self) {
        self.state.clear_selection();
        self.notify();
    }

    pub fn pagination_window(&self) -> Vec<PageToken> {
        let page = self.state.page();
        pagination_window(page.page, page.total_pages)
    }

    fn dispatch(&mut self) -> RequestId {
        self.latest_request = self.latest_request.next();
        self.latest_request
    }

    fn check_page_target(&self, page: u32) -> Result<()> {
        let current = self.state.page();
        let loaded = self.state.is_loaded();
        let out_of_range = page < 1 || (loaded && page > current.total_pages);
        if out_of_range || (loaded && page == current.page) {
            return Err(Error::PageBoundary {
                requested: page,
                current: current.page,
                total_pages: current.total_pages,
            });
        }
        Ok(())
    }

    fn apply_result(
        &mut self,
        request_id: RequestId,
        page: u32,
        per_page: u32,
        result: Result<PagePayload>,
    ) -> Result<PageDescriptor> {
        let payload = match result {
            Ok(payload) => payload,
            Err(error) => {
                warn!(request_id = request_id.get(), page, %error, "page fetch failed");
                return Err(error);
            }
        };

        let (items, descriptor) = payload.into_page(page, per_page);
        debug!(
            request_id = request_id.get(),
            page = descriptor.page,
            total_pages = descriptor.total_pages,
            items = items.len(),
            "page loaded"
        );
        self.state.replace_page(items, descriptor);
        self.notify();
        Ok(descriptor)
    }

    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let view = self.state.view();
        for handler in &mut self.subscribers {
            handler(&view);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectionBrowser, CollectionSource, FetchOutcome};
    use crate::{Error, Item, PagePayload, RequestId, Result, TAG_CITY};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Mutex;

    struct PagedSource {
        catalog: Vec<Item>,
        fail: Mutex<bool>,
    }

    impl PagedSource {
        fn with_items(count: usize) -> Self {
            let catalog = (1..=count)
                .map(|index| {
                    let city = if index % 2 == 0 { "Delhi" } else { "Chennai" };
                    Item::new(format!("m{index}"), format!("Museum {index}")).with_tag(TAG_CITY, city)
                })
                .collect();
            Self {
                catalog,
                fail: Mutex::new(false),
            }
        }

        fn set_failing(&self, fail: bool) {
            *self.fail.lock().expect("lock") = fail;
        }
    }

    impl CollectionSource for PagedSource {
        fn fetch_page(&self, page: u32, per_page: u32) -> Result<PagePayload> {
            if *self.fail.lock().expect("lock") {
                return Err(Error::network("server returned 503"));
            }
            let start = ((page - 1) * per_page) as usize;
            let items = self
                .catalog
                .iter()
                .skip(start)
                .take(per_page as usize)
                .cloned()
                .collect();
            Ok(PagePayload::Envelope {
                items,
                page: Some(page),
                per_page: Some(per_page),
                total: Some(self.catalog.len() as u32),
                total_pages: None,
            })
        }
    }

    fn browser(count: usize) -> CollectionBrowser<PagedSource> {
        CollectionBrowser::new(PagedSource::with_items(count)).with_per_page(4)
    }

    #[test]
    fn fetch_page_loads_items_and_descriptor() {
        let mut browser = browser(10);
        let descriptor = browser.fetch_page(1, 4).expect("fetch should succeed");
        assert_eq!(descriptor.total, 10);
        assert_eq!(descriptor.total_pages, 3);
        assert_eq!(browser.visible_items().count(), 4);
    }

    #[test]
    fn failed_fetch_leaves_state_untouched() {
        let mut browser = browser(10);
        browser.fetch_page(1, 4).expect("first fetch should succeed");
        browser.set_filter(TAG_CITY, "Delhi");
        let before = browser.state().clone();

        browser.source().set_failing(true);
        let error = browser.goto_page(2).expect_err("fetch should fail");
        assert!(error.is_network());
        assert_eq!(browser.state(), &before);
    }

    #[test]
    fn goto_page_rejects_boundaries() {
        let mut browser = browser(10);
        browser.fetch_page(1, 4).expect("fetch should succeed");

        for page in [0, 1, 4] {
            let error = browser.goto_page(page).expect_err("boundary should be reported");
            assert!(matches!(error, Error::PageBoundary { requested, .. } if requested == page));
        }
        assert_eq!(browser.goto_page(3).expect("page 3 exists").page, 3);
        assert_eq!(browser.prev_page().expect("page 2 exists").page, 2);
        assert_eq!(browser.next_page().expect("page 3 exists").page, 3);
        assert!(browser.next_page().is_err());
    }

    struct TotallessSource;

    impl CollectionSource for TotallessSource {
        fn fetch_page(&self, page: u32, _per_page: u32) -> Result<PagePayload> {
            Ok(PagePayload::Envelope {
                items: vec![Item::new(format!("p{page}"), format!("Museum on page {page}"))],
                page: None,
                per_page: None,
                total: None,
                total_pages: None,
            })
        }
    }

    #[test]
    fn envelope_without_totals_still_allows_earlier_pages() {
        let mut browser = CollectionBrowser::new(TotallessSource).with_per_page(4);
        assert_eq!(browser.goto_page(3).expect("page 3 loads").page, 3);
        let back = browser.goto_page(1).expect("page 1 was never loaded");
        assert_eq!(back.page, 1);
        assert_eq!(
            browser.visible_items().next().map(|item| item.id.as_str()),
            Some("p1")
        );
    }

    #[test]
    fn goto_page_before_first_load_fetches() {
        let mut browser = browser(10);
        assert_eq!(browser.goto_page(1).expect("first load").page, 1);
    }

    #[test]
    fn stale_outcome_is_discarded() {
        let mut browser = browser(10);
        let first = browser.spawn_fetch(1, 4);
        let second = browser.spawn_fetch(2, 4);
        assert!(second > first);

        let late = FetchOutcome {
            request_id: first,
            page: 1,
            per_page: 4,
            result: browser.source().fetch_page(1, 4),
        };
        let fresh = FetchOutcome {
            request_id: second,
            page: 2,
            per_page: 4,
            result: browser.source().fetch_page(2, 4),
        };

        assert_eq!(
            browser.apply_outcome(fresh).expect("current outcome").expect("ok").page,
            2
        );
        assert!(browser.apply_outcome(late).is_none());
        assert_eq!(browser.page().page, 2);
        assert_eq!(
            browser.visible_items().next().map(|item| item.id.as_str()),
            Some("m5")
        );
    }

    #[test]
    fn blocking_fetch_supersedes_background_fetch() {
        let mut browser = browser(10);
        let stale = browser.spawn_fetch(3, 4);
        browser.fetch_page(1, 4).expect("fetch should succeed");
        assert!(!browser.is_loading());

        let outcome = FetchOutcome {
            request_id: stale,
            page: 3,
            per_page: 4,
            result: browser.source().fetch_page(3, 4),
        };
        assert!(browser.apply_outcome(outcome).is_none());
        assert_eq!(browser.page().page, 1);
    }

    #[test]
    fn unknown_request_id_is_ignored() {
        let mut browser = browser(4);
        let outcome = FetchOutcome {
            request_id: RequestId::new(42),
            page: 1,
            per_page: 4,
            result: Ok(PagePayload::Bare(Vec::new())),
        };
        assert!(browser.apply_outcome(outcome).is_none());
        assert!(!browser.state().is_loaded());
    }

    #[test]
    fn subscribers_see_every_transition() {
        let mut browser = browser(10);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        browser.subscribe(move |view| {
            sink.borrow_mut()
                .push((view.items.len(), view.selected.map(|item| item.id.to_string())));
        });

        browser.fetch_page(1, 4).expect("fetch should succeed");
        browser.set_filter(TAG_CITY, "Delhi");
        browser.select_item("m2").expect("m2 is loaded");
        browser.clear_selection();

        assert_eq!(
            *seen.borrow(),
            vec![
                (4, None),
                (2, None),
                (2, Some("m2".to_owned())),
                (2, None),
            ]
        );
    }

    #[test]
    fn failed_selection_does_not_notify() {
        let mut browser = browser(4);
        browser.fetch_page(1, 4).expect("fetch should succeed");
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        browser.subscribe(move |_| *sink.borrow_mut() += 1);

        let error = browser.select_item("nope").expect_err("unknown id");
        assert!(matches!(error, Error::NotFound { .. }));
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn set_filter_is_idempotent() {
        let mut browser = browser(10);
        browser.fetch_page(1, 4).expect("fetch should succeed");
        browser.set_filter(TAG_CITY, "Chennai");
        let once: Vec<Item> = browser.visible_items().cloned().collect();
        browser.set_filter(TAG_CITY, "Chennai");
        let twice: Vec<Item> = browser.visible_items().cloned().collect();
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn pagination_window_tracks_current_page() {
        let mut browser = browser(40);
        browser.fetch_page(5, 4).expect("fetch should succeed");
        let rendered: Vec<String> = browser
            .pagination_window()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(rendered, ["1", "...", "4", "5", "6", "...", "10"]);
    }
}
