//! The search orchestrator.
//!
//! Every selected volume gets its own scanner thread feeding a bounded
//! channel. The consumer drains the channels strictly in volume order, so the
//! output for a bounded run is the first `limit` accepted entries of volume 0,
//! then volume 1, and so on, whatever the thread timing. Later volumes
//! prefetch at most [`CHANNEL_CAPACITY`] matches while they wait their turn.
//!
//! Reaching the limit sets the shared cancellation flag and drops every
//! receiver; scanners notice on their next entry or send, drop their catalog
//! stream and exit. The stream joins them before reporting completion.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::entry::{CatalogEntry, Volume};
use crate::error::SearchfsError;
use crate::filter::FilterChain;
use crate::pattern::NameMatcher;
use crate::results::{ScanStats, SearchEvent};
use crate::traits::{CatalogProvider, Matcher};

/// Matches a volume scanner may buffer ahead of the consumer.
pub const CHANNEL_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// SearchRequest
// ---------------------------------------------------------------------------

/// A fully validated search, ready to run.
pub struct SearchRequest {
    pub matcher: NameMatcher,
    pub filters: FilterChain,

    /// Volumes to scan, in output order.
    pub volumes: Vec<Volume>,

    /// Cap on emitted paths across all volumes. `None` is unbounded.
    pub limit: Option<usize>,
}

/// Name pattern and filter chain, evaluated together on scanner threads.
struct Pipeline {
    matcher: NameMatcher,
    filters: FilterChain,
}

impl Matcher for Pipeline {
    fn is_match(&self, entry: &CatalogEntry) -> bool {
        self.matcher.is_match(entry) && self.filters.is_match(entry)
    }
}

enum ScanItem {
    Match(PathBuf),
    Failed(SearchfsError),
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Start scanning every volume in `request` and return the merged stream.
pub fn run(request: SearchRequest, catalog: Arc<dyn CatalogProvider>) -> SearchStream {
    let SearchRequest {
        matcher,
        filters,
        volumes,
        limit,
    } = request;

    let pipeline = Arc::new(Pipeline { matcher, filters });
    let cancel = Arc::new(AtomicBool::new(false));
    let scanned = Arc::new(AtomicUsize::new(0));

    let mut pending = VecDeque::with_capacity(volumes.len());
    let mut handles = Vec::with_capacity(volumes.len());

    if limit != Some(0) {
        for volume in volumes {
            let (tx, rx) = bounded(CHANNEL_CAPACITY);
            let scanner = Scanner {
                volume: volume.clone(),
                catalog: Arc::clone(&catalog),
                pipeline: Arc::clone(&pipeline),
                cancel: Arc::clone(&cancel),
                scanned: Arc::clone(&scanned),
                tx,
            };

            let spawned = std::thread::Builder::new()
                .name(format!("scan {}", volume.mount_path.display()))
                .spawn(move || scanner.run());

            match spawned {
                Ok(handle) => {
                    handles.push(handle);
                    pending.push_back((volume, rx));
                }
                Err(e) => {
                    let (tx, rx) = bounded(1);
                    let _ = tx.send(ScanItem::Failed(SearchfsError::Catalog(format!(
                        "unable to start scanner: {e}"
                    ))));
                    pending.push_back((volume, rx));
                }
            }
        }
    }

    SearchStream {
        pending,
        handles,
        cancel,
        scanned,
        limit,
        emitted: 0,
        completed: 0,
        failed: 0,
        started: Instant::now(),
        finished: None,
    }
}

// ---------------------------------------------------------------------------
// Per-volume scanner
// ---------------------------------------------------------------------------

struct Scanner {
    volume: Volume,
    catalog: Arc<dyn CatalogProvider>,
    pipeline: Arc<Pipeline>,
    cancel: Arc<AtomicBool>,
    scanned: Arc<AtomicUsize>,
    tx: Sender<ScanItem>,
}

impl Scanner {
    fn run(self) {
        log::debug!("scanning {}", self.volume);

        // A panicking provider must still end its volume as a failure, not
        // as a silent disconnect that reads like a finished scan.
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| self.scan())) {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown cause".into());
            let _ = self.tx.send(ScanItem::Failed(SearchfsError::Catalog(format!(
                "scanner panicked: {reason}"
            ))));
        }
    }

    fn scan(&self) {
        let entries = match self.catalog.scan(&self.volume) {
            Ok(entries) => entries,
            Err(e) => {
                let _ = self.tx.send(ScanItem::Failed(e));
                return;
            }
        };

        for item in entries {
            if self.cancel.load(Ordering::Relaxed) {
                log::debug!("scan of {} cancelled", self.volume.mount_path.display());
                return;
            }
            match item {
                Ok(entry) => {
                    self.scanned.fetch_add(1, Ordering::Relaxed);
                    if !self.pipeline.is_match(&entry) {
                        continue;
                    }
                    if self.tx.send(ScanItem::Match(entry.path)).is_err() {
                        // Receiver gone: the consumer is done with this volume.
                        return;
                    }
                }
                Err(e) => {
                    let _ = self.tx.send(ScanItem::Failed(e));
                    return;
                }
            }
        }

        log::debug!("finished scanning {}", self.volume.mount_path.display());
    }
}

// ---------------------------------------------------------------------------
// SearchStream
// ---------------------------------------------------------------------------

/// Lazily merged results of a running search.
///
/// Yields [`SearchEvent`]s in volume order until every volume is exhausted or
/// the limit is reached. Dropping the stream early cancels and joins all
/// scanners.
pub struct SearchStream {
    pending: VecDeque<(Volume, Receiver<ScanItem>)>,
    handles: Vec<JoinHandle<()>>,
    cancel: Arc<AtomicBool>,
    scanned: Arc<AtomicUsize>,
    limit: Option<usize>,
    emitted: usize,
    completed: usize,
    failed: usize,
    started: Instant,
    finished: Option<Instant>,
}

impl SearchStream {
    /// Counters so far; final once the stream has returned `None`.
    pub fn stats(&self) -> ScanStats {
        let end = self.finished.unwrap_or_else(Instant::now);
        ScanStats::compute(
            self.scanned.load(Ordering::Relaxed),
            self.emitted,
            self.completed,
            self.failed,
            end.duration_since(self.started),
        )
    }

    fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|lim| self.emitted >= lim)
    }

    /// Cancel outstanding scans and wait for every scanner to exit.
    fn shutdown(&mut self) {
        if self.finished.is_some() {
            return;
        }
        self.cancel.store(true, Ordering::Relaxed);
        // Dropping the receivers unblocks scanners waiting on a full channel.
        self.pending.clear();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::warn!("a volume scanner panicked");
            }
        }
        self.finished = Some(Instant::now());
    }
}

impl Iterator for SearchStream {
    type Item = SearchEvent;

    fn next(&mut self) -> Option<SearchEvent> {
        loop {
            if self.limit_reached() || self.pending.is_empty() {
                self.shutdown();
                return None;
            }

            let (volume, rx) = self.pending.front()?;
            match rx.recv() {
                Ok(ScanItem::Match(path)) => {
                    self.emitted += 1;
                    if self.limit_reached() {
                        log::debug!("limit of {} reached", self.emitted);
                        self.shutdown();
                    }
                    return Some(SearchEvent::Match(path));
                }
                Ok(ScanItem::Failed(error)) => {
                    let volume = volume.clone();
                    self.pending.pop_front();
                    self.failed += 1;
                    log::debug!("{} failed: {error}", volume.mount_path.display());
                    return Some(SearchEvent::VolumeFailed { volume, error });
                }
                Err(_) => {
                    // Sender dropped: the scan ran to completion.
                    self.pending.pop_front();
                    self.completed += 1;
                }
            }
        }
    }
}

impl Drop for SearchStream {
    fn drop(&mut self) {
        self.shutdown();
    }
}
