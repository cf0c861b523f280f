use std::sync::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Everything the user controls that shapes the next catalog query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub search_term: String,
    pub genre_id: Option<String>,
    pub release_year: Option<String>,
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            genre_id: None,
            release_year: None,
            page: 1,
        }
    }
}

impl FilterState {
    pub fn with_search(mut self, text: &str) -> Self {
        self.search_term = text.to_string();
        self.page = 1;
        self
    }

    pub fn with_genre(mut self, genre_id: &str) -> Self {
        self.genre_id = non_empty(genre_id);
        self.page = 1;
        self
    }

    pub fn with_release_date(mut self, date: &str) -> Self {
        self.release_year = non_empty(date);
        self.page = 1;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

struct Inner {
    state: FilterState,
    version: u64,
    subscribers: Vec<UnboundedSender<FilterState>>,
}

/// Holds the single FilterState and publishes a snapshot to every
/// subscriber whenever a mutation actually changes it.
pub struct FilterStore {
    inner: Mutex<Inner>,
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new(FilterState::default())
    }
}

impl FilterStore {
    pub fn new(state: FilterState) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state,
                version: 0,
                subscribers: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> FilterState {
        self.lock().state.clone()
    }

    /// Number of published changes so far.
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// Subscribe to snapshots. The current state is delivered first.
    /// Returns the receiver and the version it starts at.
    pub fn subscribe(&self) -> (UnboundedReceiver<FilterState>, u64) {
        let (tx, rx) = unbounded_channel();
        let mut inner = self.lock();
        let _ = tx.send(inner.state.clone());
        inner.subscribers.push(tx);
        (rx, inner.version)
    }

    /// Apply a mutation in one step. Returns true if a new snapshot was
    /// published.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(FilterState) -> FilterState,
    {
        let mut inner = self.lock();
        let next = f(inner.state.clone());
        if next == inner.state {
            return false;
        }

        inner.state = next;
        inner.version += 1;
        debug!(version = inner.version, filters = ?inner.state, "filters changed");

        let snapshot = inner.state.clone();
        inner.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
        true
    }

    pub fn set_search(&self, text: &str) -> bool {
        self.update(|s| s.with_search(text))
    }

    /// The commit key only restarts pagination; the text is already current.
    pub fn commit_search(&self) -> bool {
        self.update(|s| s.with_page(1))
    }

    pub fn select_genre(&self, genre_id: &str) -> bool {
        self.update(|s| s.with_genre(genre_id))
    }

    pub fn set_release_date(&self, date: &str) -> bool {
        self.update(|s| s.with_release_date(date))
    }

    pub fn set_page(&self, page: u32) -> bool {
        self.update(|s| s.with_page(page))
    }

    pub fn clear(&self) -> bool {
        self.update(|_| FilterState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn busy() -> FilterState {
        FilterState {
            search_term: "alien".to_string(),
            genre_id: Some("27".to_string()),
            release_year: Some("1979-05-25".to_string()),
            page: 4,
        }
    }

    #[test]
    fn test_filter_edits_reset_page() {
        let store = FilterStore::new(busy());
        store.set_search("aliens");
        assert_eq!(store.snapshot().page, 1);

        store.set_page(3);
        store.select_genre("28");
        assert_eq!(store.snapshot().page, 1);
        assert_eq!(store.snapshot().genre_id.as_deref(), Some("28"));

        store.set_page(3);
        store.set_release_date("1986-07-18");
        assert_eq!(store.snapshot().page, 1);
        assert_eq!(store.snapshot().release_year.as_deref(), Some("1986-07-18"));
    }

    #[test]
    fn test_clear_from_any_state() {
        let store = FilterStore::new(busy());
        assert!(store.clear());
        assert_eq!(store.snapshot(), FilterState::default());
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_commit_keeps_text() {
        let store = FilterStore::new(busy());
        assert!(store.commit_search());
        let s = store.snapshot();
        assert_eq!(s.search_term, "alien");
        assert_eq!(s.page, 1);
    }

    #[test]
    fn test_unchanged_update_publishes_nothing() {
        let store = FilterStore::default();
        let (mut rx, start) = store.subscribe();
        assert_eq!(start, 0);
        assert_eq!(rx.try_recv().unwrap(), FilterState::default());

        assert!(!store.commit_search());
        assert!(!store.clear());
        assert!(!store.select_genre(""));
        assert!(rx.try_recv().is_err());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_clear_publishes_one_snapshot() {
        let store = FilterStore::new(busy());
        let (mut rx, _) = store.subscribe();
        rx.try_recv().unwrap();

        store.clear();
        assert_eq!(rx.try_recv().unwrap(), FilterState::default());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_empty_selection_clears_filter() {
        let store = FilterStore::new(busy());
        store.select_genre("");
        store.set_release_date("  ");
        let s = store.snapshot();
        assert_eq!(s.genre_id, None);
        assert_eq!(s.release_year, None);
    }
}
