//! Crawl target orchestration
//!
//! The orchestrator owns the set of configured crawl targets. On every
//! configuration (re)load it reconciles the running set against the file:
//! entries whose raw configuration bytes are unchanged keep their running
//! task (and with it their live connection), removed entries are signalled to
//! terminate, and new entries get a task of their own. Each task runs its
//! protocol crawler in a continuous walk / pause / walk-again cycle and
//! forwards every discovered file to the indexing sink.

use crate::config::{load_config, EntryConfig, RawEntry};
use crate::crawler::{ProtocolCrawler, WalkCallback};
use crate::index::{FileEntry, FileIndex, ServerLocation};
use crate::{ConfigResult, CrawlError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;

/// One configured crawl target and its lifecycle handles
///
/// The live `ProtocolCrawler` is owned by the entry's task; the orchestrator
/// only keeps the termination signal. A carried-forward entry keeps its task,
/// so its crawler (and connection) survives the reload untouched.
struct CrawlEntry {
    /// Small per-process id used in log lines
    id: u64,

    /// Raw configuration bytes, the identity key across reloads
    raw: String,

    /// Parsed common fields
    config: EntryConfig,

    /// Fired exactly once, when the entry disappears from the configuration
    terminate: watch::Sender<bool>,

    /// Whether a task has been launched for this entry
    running: bool,
}

/// Owns all crawl targets and turns them continuously
pub struct Crawlers {
    config_path: PathBuf,
    index: Arc<dyn FileIndex>,
    entries: Vec<CrawlEntry>,
    tasks: JoinSet<()>,
    next_id: u64,
}

impl Crawlers {
    /// Creates an orchestrator reading its targets from `config_path` and
    /// reporting discovered files to `index`
    pub fn new(config_path: impl Into<PathBuf>, index: Arc<dyn FileIndex>) -> Self {
        Self {
            config_path: config_path.into(),
            index,
            entries: Vec::new(),
            tasks: JoinSet::new(),
            next_id: 0,
        }
    }

    /// (Re)loads the configuration file and reconciles the running targets
    ///
    /// On a parse failure the previous configuration and all running entries
    /// remain unchanged; the reload is simply not applied.
    pub fn reload(&mut self) -> ConfigResult<()> {
        let config = load_config(&self.config_path)?;

        let to_launch = self.reconcile(config.entrypoints);
        for idx in to_launch {
            self.launch(idx);
        }

        Ok(())
    }

    /// Blocks until every task has exited, which in practice only happens
    /// after [`quit`](Self::quit)
    pub async fn run(&mut self) {
        while self.tasks.join_next().await.is_some() {}
    }

    /// Signals every current entry to terminate
    ///
    /// Termination is cooperative: each task notices the signal at its next
    /// checkpoint, tears its crawler down and exits.
    pub fn quit(&self) {
        for entry in &self.entries {
            let _ = entry.terminate.send(true);
        }
    }

    /// Number of currently configured crawl targets
    pub fn target_count(&self) -> usize {
        self.entries.len()
    }

    /// Replaces the tracked entry set with `next`, carrying forward entries
    /// whose raw bytes match byte for byte and terminating the rest
    ///
    /// Returns the indexes of the entries that still need a task.
    fn reconcile(&mut self, next: Vec<RawEntry>) -> Vec<usize> {
        let mut previous = std::mem::take(&mut self.entries);
        let mut to_launch = Vec::new();

        for raw_entry in next {
            if let Some(pos) = previous.iter().position(|p| p.raw == raw_entry.raw) {
                // Unchanged target: keep the running task and its connection
                let prev = previous.swap_remove(pos);
                tracing::debug!("Keeping crawl target {} ({})", prev.id, prev.config.entry);
                self.entries.push(prev);
            } else {
                let id = self.next_id;
                self.next_id += 1;

                let (terminate, _) = watch::channel(false);
                tracing::info!("Added crawl target {} ({})", id, raw_entry.common.entry);

                to_launch.push(self.entries.len());
                self.entries.push(CrawlEntry {
                    id,
                    raw: raw_entry.raw,
                    config: raw_entry.common,
                    terminate,
                    running: false,
                });
            }
        }

        for removed in previous {
            tracing::info!("Removing crawl target {} ({})", removed.id, removed.config.entry);
            let _ = removed.terminate.send(true);
        }

        to_launch
    }

    /// Launches the long-running task for the entry at `idx`
    fn launch(&mut self, idx: usize) {
        let entry = &mut self.entries[idx];
        // Carried-forward entries already have a task; never start a second
        if entry.running {
            return;
        }
        entry.running = true;

        let id = entry.id;
        let raw = entry.raw.clone();
        let config = entry.config.clone();
        let terminate = entry.terminate.subscribe();
        let index = Arc::clone(&self.index);

        self.tasks.spawn(run_entry(id, raw, config, index, terminate));
    }
}

/// Task body for one crawl target: construct the crawler, then walk, pause,
/// walk again until terminated
async fn run_entry(
    id: u64,
    raw: String,
    config: EntryConfig,
    index: Arc<dyn FileIndex>,
    mut terminate: watch::Receiver<bool>,
) {
    let callback = index_callback(index, config.entry.clone());

    let mut crawler = match ProtocolCrawler::create(&raw, terminate.clone()).await {
        Ok(crawler) => crawler,
        Err(CrawlError::Terminated) => {
            tracing::debug!("Crawl target {} removed before it could connect", id);
            return;
        }
        Err(e) => {
            // Only this target dies; the rest of the process is unaffected
            tracing::error!("Crawl target {} ({}) failed to start: {}", id, config.entry, e);
            return;
        }
    };

    let turn_delay = config.turn_delay();

    loop {
        if *terminate.borrow() {
            tracing::info!("Crawl target {} ({}) terminating", id, config.entry);
            crawler.close().await;
            return;
        }

        tracing::debug!("Starting walk of {}", config.entry);
        if let Err(e) = crawler.walk(callback.as_ref()).await {
            // A broken turn must not stop subsequent turns
            tracing::warn!("Walk of {} failed: {}", config.entry, e);
        }

        tokio::select! {
            _ = tokio::time::sleep(turn_delay) => {}
            _ = terminate.changed() => {}
        }
    }
}

/// Builds the walk callback that forwards discovered files to the sink
fn index_callback(index: Arc<dyn FileIndex>, server_url: String) -> Box<WalkCallback> {
    Box::new(move |_path_hint, info| {
        // A trailing slash leaves an empty final segment; fall back to the
        // last non-empty one so distinct files keep distinct identities.
        let filename = info
            .url
            .path_segments()
            .and_then(|segments| segments.rev().find(|s| !s.is_empty()))
            .unwrap_or_else(|| info.url.path())
            .to_string();

        let entry = FileEntry {
            filename,
            size: info.size,
            mime_type: info.mime_type.clone(),
            modified: info.modified,
            servers: vec![ServerLocation {
                url: server_url.clone(),
                path: info.url.path().to_string(),
            }],
        };

        if let Err(e) = index.add_file_entry(entry) {
            tracing::warn!("Failed to index {}: {}", info.url, e);
        }
    })
}
