//! crates/dailystream_core/src/feed.rs
//!
//! Infinite-scroll pagination for one visible feed.
//!
//! `FeedController` is a pure state machine: hosts feed it "open" and
//! "advance" events, perform the fetch a returned `PageTicket` describes, and
//! hand the outcome back. Every ticket carries the generation it was issued
//! under, so outcomes for a feed the user has already left are dropped.

use crate::domain::{Article, Feed, NewsPayload};
use crate::fetcher::{FetchError, PaginatedCacheFetcher, DEFAULT_PAGE_SIZE};
use std::sync::Arc;
use tracing::{debug, warn};

pub const HEADLINES_ERROR_MESSAGE: &str = "Failed to fetch news articles. Please try again later.";

//=========================================================================================
// States and Tickets
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState {
    Idle,
    LoadingFirst,
    Ready { has_more: bool },
    LoadingMore,
    Exhausted,
    Error(String),
}

/// A load the host must perform on the controller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
    pub feed: Feed,
    pub page: u32,
    pub page_size: u32,
    generation: u64,
}

/// What happened to a completed load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The batch was appended; `added` articles are new.
    Appended { added: usize },
    /// The load failed and the controller changed state accordingly.
    Failed,
    /// The ticket belongs to a feed that is no longer shown.
    Stale,
}

//=========================================================================================
// FeedController
//=========================================================================================

/// Pagination state for the feed currently on screen.
#[derive(Debug, Clone)]
pub struct FeedController {
    page_size: u32,
    feed: Option<Feed>,
    generation: u64,
    page: u32,
    has_more: bool,
    articles: Vec<Article>,
    state: FeedState,
}

impl Default for FeedController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FeedController {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            feed: None,
            generation: 0,
            page: 1,
            has_more: false,
            articles: Vec::new(),
            state: FeedState::Idle,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn feed(&self) -> Option<&Feed> {
        self.feed.as_ref()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn current_page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, FeedState::LoadingFirst | FeedState::LoadingMore)
    }

    /// Shows `feed` from its first page, abandoning whatever was loading.
    ///
    /// Re-opening the feed already on screen also restarts it.
    pub fn open(&mut self, feed: Feed) -> PageTicket {
        self.generation += 1;
        self.page = 1;
        self.has_more = false;
        self.articles.clear();
        self.state = FeedState::LoadingFirst;
        debug!(%feed, generation = self.generation, "Opening feed");
        self.feed = Some(feed.clone());
        self.ticket(feed, 1)
    }

    /// The "last item became visible" event.
    ///
    /// Returns the next page to load, or `None` when the feed is idle, busy,
    /// failed or finished. A settled feed with nothing more to load becomes
    /// `Exhausted`.
    pub fn advance(&mut self) -> Option<PageTicket> {
        match self.state {
            FeedState::Ready { has_more: true } => {
                let feed = self.feed.clone()?;
                self.state = FeedState::LoadingMore;
                Some(self.ticket(feed, self.page + 1))
            }
            FeedState::Ready { has_more: false } => {
                self.state = FeedState::Exhausted;
                None
            }
            _ => None,
        }
    }

    /// Hands a completed load back to the controller.
    pub fn complete(
        &mut self,
        ticket: &PageTicket,
        outcome: Result<NewsPayload, FetchError>,
    ) -> Applied {
        if ticket.generation != self.generation || !self.is_loading() {
            debug!(feed = %ticket.feed, page = ticket.page, "Discarding stale page");
            return Applied::Stale;
        }

        match outcome {
            Ok(payload) => self.append(ticket.page, payload.articles),
            Err(e) if ticket.page == 1 => {
                warn!(feed = %ticket.feed, "Failed to load feed: {}", e);
                self.state = FeedState::Error(HEADLINES_ERROR_MESSAGE.to_string());
                Applied::Failed
            }
            Err(e) => {
                // The page is not advanced, so the next trigger retries it.
                warn!(feed = %ticket.feed, page = ticket.page, "Failed to load more: {}", e);
                self.state = FeedState::Ready { has_more: true };
                Applied::Failed
            }
        }
    }

    fn append(&mut self, page: u32, batch: Vec<Article>) -> Applied {
        let added = batch.len();
        self.page = page;
        self.has_more = added == self.page_size as usize;
        self.articles.extend(batch);
        self.state = FeedState::Ready {
            has_more: self.has_more,
        };
        Applied::Appended { added }
    }

    fn ticket(&self, feed: Feed, page: u32) -> PageTicket {
        PageTicket {
            feed,
            page,
            page_size: self.page_size,
            generation: self.generation,
        }
    }
}

//=========================================================================================
// Visibility Adapter
//=========================================================================================

/// Turns "is the last rendered item visible?" notifications into advance
/// triggers, the way an intersection observer attached to the last card
/// behaves.
///
/// Fires once per hidden → visible transition and re-arms whenever the list
/// grows or shrinks, since the observed element is then a different one.
#[derive(Debug, Default, Clone)]
pub struct LastItemObserver {
    observed_len: usize,
    visible: bool,
}

impl LastItemObserver {
    /// Attaches to the last item of a list of `len` rendered articles.
    pub fn attach(&mut self, len: usize) {
        if len != self.observed_len {
            self.observed_len = len;
            self.visible = false;
        }
    }

    /// Reports the current visibility of the observed item; returns `true`
    /// exactly when it just became visible.
    pub fn notify(&mut self, visible: bool) -> bool {
        let fired = visible && !self.visible && self.observed_len > 0;
        self.visible = visible;
        fired
    }
}

//=========================================================================================
// FeedPager
//=========================================================================================

/// Drives a `FeedController` with a fetcher for hosts that await each load
/// before reacting to the next event.
pub struct FeedPager {
    fetcher: Arc<PaginatedCacheFetcher>,
    controller: FeedController,
    observer: LastItemObserver,
}

impl FeedPager {
    pub fn new(fetcher: Arc<PaginatedCacheFetcher>, page_size: u32) -> Self {
        Self {
            fetcher,
            controller: FeedController::new(page_size),
            observer: LastItemObserver::default(),
        }
    }

    pub fn controller(&self) -> &FeedController {
        &self.controller
    }

    pub async fn open(&mut self, feed: Feed) -> Applied {
        let ticket = self.controller.open(feed);
        self.run(ticket).await
    }

    /// Loads the next page if there is one. `None` when nothing was loaded.
    pub async fn advance(&mut self) -> Option<Applied> {
        let ticket = self.controller.advance()?;
        Some(self.run(ticket).await)
    }

    /// Visibility hook for the last rendered item.
    pub async fn on_last_item_visible(&mut self, visible: bool) -> Option<Applied> {
        if self.controller.is_loading() || !self.observer.notify(visible) {
            return None;
        }
        self.advance().await
    }

    async fn run(&mut self, ticket: PageTicket) -> Applied {
        let outcome = self
            .fetcher
            .fetch(&ticket.feed, ticket.page, ticket.page_size)
            .await;
        let applied = self.controller.complete(&ticket, outcome);
        self.observer.attach(self.controller.articles().len());
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::*;
    use crate::ports::PortError;

    fn payload(prefix: &str, count: usize) -> Result<NewsPayload, FetchError> {
        Ok(page_of(prefix, count))
    }

    fn ready_with(count: usize) -> FeedController {
        let mut controller = FeedController::new(10);
        let ticket = controller.open(Feed::headlines("general"));
        controller.complete(&ticket, payload("first", count));
        controller
    }

    #[test]
    fn starts_idle_and_ignores_advance() {
        let mut controller = FeedController::default();
        assert_eq!(controller.state(), &FeedState::Idle);
        assert_eq!(controller.advance(), None);
        assert_eq!(controller.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn full_first_page_keeps_has_more() {
        let controller = ready_with(10);
        assert_eq!(controller.state(), &FeedState::Ready { has_more: true });
        assert_eq!(controller.articles().len(), 10);
        assert_eq!(controller.current_page(), 1);
    }

    #[test]
    fn short_batch_clears_has_more_and_advance_exhausts() {
        let mut controller = ready_with(7);
        assert_eq!(controller.state(), &FeedState::Ready { has_more: false });
        assert!(!controller.has_more());

        assert_eq!(controller.advance(), None);
        assert_eq!(controller.state(), &FeedState::Exhausted);
        assert_eq!(controller.advance(), None);
        assert_eq!(controller.state(), &FeedState::Exhausted);
    }

    #[test]
    fn advance_requests_the_next_page_and_appends() {
        let mut controller = ready_with(10);
        let ticket = controller.advance().unwrap();
        assert_eq!(ticket.page, 2);
        assert_eq!(ticket.page_size, 10);
        assert_eq!(controller.state(), &FeedState::LoadingMore);
        // Busy: a second trigger does nothing.
        assert_eq!(controller.advance(), None);

        let applied = controller.complete(&ticket, payload("second", 10));
        assert_eq!(applied, Applied::Appended { added: 10 });
        assert_eq!(controller.articles().len(), 20);
        assert_eq!(controller.articles()[10].title(), "second 0");
        assert_eq!(controller.current_page(), 2);
        assert!(controller.has_more());
    }

    #[test]
    fn empty_batch_ends_the_feed() {
        let mut controller = ready_with(10);
        let ticket = controller.advance().unwrap();
        controller.complete(&ticket, payload("none", 0));
        assert!(!controller.has_more());
        assert_eq!(controller.articles().len(), 10);
        assert_eq!(controller.state(), &FeedState::Ready { has_more: false });
    }

    #[test]
    fn first_page_failure_is_an_error_state() {
        let mut controller = FeedController::new(10);
        let ticket = controller.open(Feed::headlines("general"));
        let applied = controller.complete(&ticket, Err(FetchError::Status(500)));
        assert_eq!(applied, Applied::Failed);
        assert_eq!(
            controller.state(),
            &FeedState::Error(HEADLINES_ERROR_MESSAGE.to_string())
        );
        assert_eq!(controller.advance(), None);
    }

    #[test]
    fn failed_load_more_retries_the_same_page() {
        let mut controller = ready_with(10);
        let ticket = controller.advance().unwrap();
        controller.complete(&ticket, Err(FetchError::Transport("offline".into())));
        assert_eq!(controller.state(), &FeedState::Ready { has_more: true });
        assert_eq!(controller.articles().len(), 10);

        let retry = controller.advance().unwrap();
        assert_eq!(retry.page, 2);
    }

    #[test]
    fn stale_first_page_is_not_merged_into_the_new_feed() {
        let mut controller = FeedController::new(10);
        let old = controller.open(Feed::headlines("business"));
        let new = controller.open(Feed::headlines("sports"));

        assert_eq!(controller.complete(&old, payload("business", 10)), Applied::Stale);
        assert!(controller.articles().is_empty());
        assert_eq!(controller.state(), &FeedState::LoadingFirst);

        controller.complete(&new, payload("sports", 4));
        assert_eq!(controller.articles().len(), 4);
        assert!(controller
            .articles()
            .iter()
            .all(|article| article.title().starts_with("sports")));
    }

    #[test]
    fn stale_load_more_is_dropped_after_switching_feeds() {
        let mut controller = ready_with(10);
        let more = controller.advance().unwrap();
        let fresh = controller.open(Feed::search("rust").unwrap());

        assert_eq!(controller.complete(&more, payload("general", 10)), Applied::Stale);
        assert!(controller.articles().is_empty());
        assert_eq!(controller.current_page(), 1);

        controller.complete(&fresh, payload("rust", 10));
        assert_eq!(controller.feed(), Some(&Feed::Search("rust".into())));
        assert_eq!(controller.articles().len(), 10);
    }

    #[test]
    fn duplicate_completion_is_ignored() {
        let mut controller = FeedController::new(10);
        let ticket = controller.open(Feed::headlines("general"));
        controller.complete(&ticket, payload("a", 10));
        assert_eq!(controller.complete(&ticket, payload("a", 10)), Applied::Stale);
        assert_eq!(controller.articles().len(), 10);
    }

    #[test]
    fn reopening_resets_everything() {
        let mut controller = ready_with(10);
        let ticket = controller.advance().unwrap();
        controller.complete(&ticket, payload("b", 10));

        let ticket = controller.open(Feed::headlines("health"));
        assert_eq!(ticket.page, 1);
        assert_eq!(controller.state(), &FeedState::LoadingFirst);
        assert!(controller.articles().is_empty());
        assert!(!controller.has_more());
        assert_eq!(controller.current_page(), 1);
    }

    #[test]
    fn observer_fires_once_per_visibility_transition() {
        let mut observer = LastItemObserver::default();
        assert!(!observer.notify(true), "nothing rendered yet");

        observer.attach(10);
        assert!(observer.notify(true));
        assert!(!observer.notify(true));
        assert!(!observer.notify(false));
        assert!(observer.notify(true));

        // New last element after a render: re-armed even while visible.
        observer.attach(20);
        assert!(observer.notify(true));

        // Same list length: still the same element.
        observer.attach(20);
        assert!(!observer.notify(true));
    }

    fn pager(backend: ScriptedBackend) -> (Arc<ScriptedBackend>, FeedPager) {
        let backend = Arc::new(backend);
        let fetcher = PaginatedCacheFetcher::new(
            backend.clone(),
            Arc::new(MemoryStore::default()),
            Arc::new(ManualClock::at(0)),
        );
        (backend, FeedPager::new(Arc::new(fetcher), 10))
    }

    #[tokio::test]
    async fn pager_scrolls_until_a_short_page() {
        let (backend, mut pager) = pager(
            ScriptedBackend::always(ok_page("p3", 4))
                .then(ok_page("p1", 10))
                .then(ok_page("p2", 10)),
        );

        assert_eq!(
            pager.open(Feed::headlines("technology")).await,
            Applied::Appended { added: 10 }
        );
        assert_eq!(
            pager.on_last_item_visible(true).await,
            Some(Applied::Appended { added: 10 })
        );
        // Still visible, but the observer moved to the new last card.
        assert_eq!(
            pager.on_last_item_visible(true).await,
            Some(Applied::Appended { added: 4 })
        );
        assert_eq!(pager.on_last_item_visible(true).await, None);
        assert_eq!(pager.advance().await, None);
        assert_eq!(pager.controller().state(), &FeedState::Exhausted);
        assert_eq!(pager.controller().articles().len(), 24);

        let pages: Vec<u32> = backend.calls().iter().map(|(_, page, _)| *page).collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn failed_search_reads_as_an_empty_finished_feed() {
        let (_, mut pager) = pager(ScriptedBackend::always(Err(PortError::upstream(
            Some(500),
            None,
        ))));
        let feed = Feed::search("quantum").unwrap();
        assert_eq!(pager.open(feed).await, Applied::Appended { added: 0 });
        assert_eq!(
            pager.controller().state(),
            &FeedState::Ready { has_more: false }
        );
        assert!(pager.controller().articles().is_empty());
    }

    #[tokio::test]
    async fn failed_headlines_surface_an_error() {
        let (_, mut pager) = pager(ScriptedBackend::always(Err(PortError::upstream(
            Some(500),
            None,
        ))));
        assert_eq!(pager.open(Feed::headlines("general")).await, Applied::Failed);
        assert!(matches!(pager.controller().state(), FeedState::Error(_)));
    }
}
