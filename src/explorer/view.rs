use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::filter::{FilterState, FilterStore};
use super::pagination::Pagination;
use crate::catalog::{CatalogApi, CatalogRequest, Genre, ResultPage};
use crate::config::{CatalogConfig, SyncPolicy};

/// Everything the renderer needs, copied out at one point in time.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub filters: FilterState,
    pub genres: Vec<Genre>,
    pub results: ResultPage,
    pub loading: bool,
}

impl ViewSnapshot {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.filters.page, self.results.total_pages)
    }

    pub fn genre_name(&self) -> Option<&str> {
        let id = self.filters.genre_id.as_deref()?;
        self.genres.iter().find(|g| g.id == id).map(|g| g.name.as_str())
    }
}

struct Applied {
    page: ResultPage,
    seq: u64,
}

/// Sets the loading flag for as long as it lives.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct MountHandle {
    pub genres: JoinHandle<()>,
    pub synchronizer: JoinHandle<()>,
}

/// The explorer view: owns the filters, the genre list and the current
/// result page, and keeps the results in step with the filters.
pub struct Explorer {
    catalog: Arc<dyn CatalogApi>,
    config: CatalogConfig,
    filters: FilterStore,
    genres: RwLock<Vec<Genre>>,
    results: RwLock<Applied>,
    loading: AtomicBool,
    genres_requested: AtomicBool,
    issued: AtomicU64,
    settled: watch::Sender<u64>,
    sync_base: Mutex<Option<u64>>,
}

impl Explorer {
    pub fn new(catalog: Arc<dyn CatalogApi>, config: CatalogConfig) -> Self {
        let (settled, _) = watch::channel(0);
        Self {
            catalog,
            config,
            filters: FilterStore::default(),
            genres: RwLock::new(Vec::new()),
            results: RwLock::new(Applied {
                page: ResultPage::default(),
                seq: 0,
            }),
            loading: AtomicBool::new(false),
            genres_requested: AtomicBool::new(false),
            issued: AtomicU64::new(0),
            settled,
            sync_base: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn filters(&self) -> &FilterStore {
        &self.filters
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub async fn genres(&self) -> Vec<Genre> {
        self.genres.read().await.clone()
    }

    pub async fn results(&self) -> ResultPage {
        self.results.read().await.page.clone()
    }

    pub async fn view(&self) -> ViewSnapshot {
        ViewSnapshot {
            filters: self.filters.snapshot(),
            genres: self.genres().await,
            results: self.results().await,
            loading: self.is_loading() || self.has_pending(),
        }
    }

    /// Start the genre loader and the synchronizer.
    pub fn mount(self: &Arc<Self>) -> MountHandle {
        info!(language = %self.config.language, policy = ?self.config.sync_policy, "mounting explorer");

        let explorer = Arc::clone(self);
        let genres = tokio::spawn(async move { explorer.load_genres().await });

        let synchronizer = self.start_synchronizer();

        MountHandle { genres, synchronizer }
    }

    /// Fetch the genre list. Only the first call does anything.
    pub async fn load_genres(&self) {
        if self.genres_requested.swap(true, Ordering::SeqCst) {
            return;
        }

        let request = CatalogRequest::genres(&self.config);
        match self.catalog.genres(&request).await {
            Ok(genres) => {
                info!(count = genres.len(), "loaded genres");
                *self.genres.write().await = genres;
            }
            Err(e) => error!("Genre fetch error: {}", e),
        }
    }

    /// Subscribe to the filter store and issue one request per snapshot.
    /// Requests are not cancelled or coalesced.
    pub fn start_synchronizer(self: &Arc<Self>) -> JoinHandle<()> {
        let (mut rx, base) = self.filters.subscribe();
        if let Ok(mut sync_base) = self.sync_base.lock() {
            *sync_base = Some(base);
        }

        let explorer = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(snapshot) = rx.recv().await {
                // Numbered here, in publish order, not inside the task.
                let seq = explorer.next_seq();
                let explorer = Arc::clone(&explorer);
                tokio::spawn(async move { explorer.sync_with_seq(seq, snapshot).await });
            }
            debug!("synchronizer stopped");
        })
    }

    /// Issue the request for one filter snapshot and apply its result.
    /// Failures are logged and leave the current results in place.
    pub async fn sync(&self, filters: FilterState) {
        let seq = self.next_seq();
        self.sync_with_seq(seq, filters).await
    }

    fn next_seq(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Like `sync`, for a request already numbered by the caller.
    pub async fn sync_with_seq(&self, seq: u64, filters: FilterState) {
        let request = CatalogRequest::movies(&filters, &self.config);

        {
            let _loading = LoadingGuard::start(&self.loading);
            match self.catalog.movies(&request).await {
                Ok(page) => self.apply(seq, page.into()).await,
                Err(e) => error!(seq, "Error fetching movies: {}", e),
            }
        }

        self.settled.send_modify(|n| *n += 1);
    }

    async fn apply(&self, seq: u64, page: ResultPage) {
        let mut applied = self.results.write().await;
        if self.config.sync_policy == SyncPolicy::LatestIssued && seq < applied.seq {
            debug!(seq, newest = applied.seq, "dropping stale response");
            return;
        }

        debug!(seq, movies = page.movies.len(), total_pages = page.total_pages, "applying results");
        applied.page = page;
        applied.seq = applied.seq.max(seq);
    }

    fn expected_settled(&self) -> Option<u64> {
        let base = match self.sync_base.lock() {
            Ok(base) => *base,
            Err(_) => None,
        }?;
        Some(self.filters.version() - base + 1)
    }

    /// True while a published snapshot has not settled yet, including one
    /// the synchronizer has not issued.
    pub fn has_pending(&self) -> bool {
        match self.expected_settled() {
            Some(target) => *self.settled.borrow() < target,
            None => false,
        }
    }

    /// Wait until every snapshot published since mount has settled.
    pub async fn wait_idle(&self) {
        let Some(target) = self.expected_settled() else {
            return;
        };

        let mut rx = self.settled.subscribe();
        let _ = rx.wait_for(|&n| n >= target).await;
    }

    pub fn set_search(&self, text: &str) -> bool {
        self.filters.set_search(text)
    }

    pub fn commit_search(&self) -> bool {
        self.filters.commit_search()
    }

    pub fn select_genre(&self, genre_id: &str) -> bool {
        self.filters.select_genre(genre_id)
    }

    pub fn set_release_date(&self, date: &str) -> bool {
        self.filters.set_release_date(date)
    }

    pub fn clear(&self) -> bool {
        self.filters.clear()
    }

    /// Move to the previous page. Inert on the first page.
    pub async fn previous_page(&self) -> bool {
        match self.pagination().await.previous() {
            Some(page) => self.filters.set_page(page),
            None => false,
        }
    }

    /// Move to the next page. Inert on the last page.
    pub async fn next_page(&self) -> bool {
        match self.pagination().await.next() {
            Some(page) => self.filters.set_page(page),
            None => false,
        }
    }

    pub async fn pagination(&self) -> Pagination {
        let total_pages = self.results.read().await.page.total_pages;
        Pagination::new(self.filters.snapshot().page, total_pages)
    }
}
