// SPDX-License-Identifier: MIT OR Apache-2.0

//! File system watcher for overlay file changes.
//!
//! This module provides a watcher that monitors an overlay file and fires a
//! callback once the file has settled after a change, plus a binding that
//! re-applies a YAML file to a broker layer whenever that happens.

use crate::adapters::YamlFileAdapter;
use crate::domain::{BrokerError, Result};
use crate::ports::{ChangeCallback, Layered, LayerWatcher};
use crate::service::LayerBroker;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default quiet period before a change is reported
const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// How often the watcher thread checks for a stop signal
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// File system watcher for overlay files.
///
/// Events for the file are debounced: the callback fires once no further
/// event has arrived for the debounce delay, so an editor's burst of writes
/// results in a single reload of the finished file.
///
/// # Examples
///
/// ```rust,no_run
/// use layerbroker::adapters::FileWatcher;
/// use layerbroker::ports::LayerWatcher;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # fn main() -> layerbroker::domain::Result<()> {
/// let mut watcher = FileWatcher::new("/path/to/config.yaml", None)?;
///
/// watcher.watch(Arc::new(|path: &Path| {
///     println!("Overlay changed: {}", path.display());
/// }))?;
///
/// // Later, stop watching
/// watcher.stop()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileWatcher {
    /// Canonical path to the file being watched
    file_path: PathBuf,
    debounce_delay: Duration,
    watcher: Option<RecommendedWatcher>,
    watch_thread: Option<JoinHandle<()>>,
    stop_tx: Option<Sender<()>>,
}

impl FileWatcher {
    /// Creates a new file watcher for the given path.
    ///
    /// `debounce_delay` defaults to 500ms.
    pub fn new(path: impl AsRef<Path>, debounce_delay: Option<Duration>) -> Result<Self> {
        let path = path.as_ref();
        let file_path = path.canonicalize().map_err(|e| BrokerError::WatcherError {
            message: format!("File does not exist: {}", path.display()),
            source: Some(Box::new(e)),
        })?;

        Ok(Self {
            file_path,
            debounce_delay: debounce_delay.unwrap_or(DEFAULT_DEBOUNCE),
            watcher: None,
            watch_thread: None,
            stop_tx: None,
        })
    }

    /// Loads `path` into `layer` now and again whenever the file changes.
    ///
    /// The initial load must succeed. Later reloads that fail (unreadable
    /// file, invalid YAML, fields of the wrong type) are logged and leave the
    /// layer as it was. The returned watcher keeps the binding alive; drop it
    /// or call [`stop`](LayerWatcher::stop) to end it. The watcher does not
    /// keep the broker alive.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let broker = Arc::new(LayerBroker::new(["file", "env"], AppConfig::default())?);
    /// let _watcher = FileWatcher::bind(Arc::clone(&broker), "file", "app.yaml", None)?;
    /// ```
    pub fn bind<T>(
        broker: Arc<LayerBroker<T>>,
        layer: &str,
        path: impl AsRef<Path>,
        debounce_delay: Option<Duration>,
    ) -> Result<Self>
    where
        T: Layered,
        T::Partial: DeserializeOwned,
    {
        let mut watcher = Self::new(path, debounce_delay)?;
        let adapter = YamlFileAdapter::from_file(&watcher.file_path)?;
        broker.load_layer(layer, &adapter)?;

        let layer = layer.to_string();
        let broker = Arc::downgrade(&broker);
        watcher.watch(Arc::new(move |path: &Path| {
            let Some(broker) = broker.upgrade() else {
                return;
            };
            let result = YamlFileAdapter::from_file(path)
                .and_then(|adapter| broker.load_layer(&layer, &adapter));
            match result {
                Ok(()) => tracing::info!("Reloaded layer '{}' from {}", layer, path.display()),
                Err(e) => tracing::warn!(
                    "Failed to reload layer '{}' from {}: {}",
                    layer,
                    path.display(),
                    e
                ),
            }
        }))?;

        Ok(watcher)
    }

    /// Returns the canonical path of the watched file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Returns true while the watcher thread is running.
    pub fn is_watching(&self) -> bool {
        self.watch_thread.is_some()
    }
}

/// Waits for events on `file_path` and fires `callback` once they settle.
fn run_event_loop(
    file_path: PathBuf,
    debounce_delay: Duration,
    events: Receiver<notify::Result<Event>>,
    stop_rx: Receiver<()>,
    callback: ChangeCallback,
) {
    let mut last_event: Option<Instant> = None;

    loop {
        if stop_rx.try_recv().is_ok() {
            break;
        }

        match events.recv_timeout(POLL_INTERVAL) {
            Ok(Ok(event)) => {
                if event.paths.iter().any(|p| p == &file_path) {
                    last_event = Some(Instant::now());
                }
            }
            Ok(Err(e)) => tracing::warn!("File watcher error for {}: {}", file_path.display(), e),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(at) = last_event {
            if at.elapsed() >= debounce_delay {
                last_event = None;
                tracing::debug!("Detected change in {}", file_path.display());
                callback(&file_path);
            }
        }
    }
}

impl LayerWatcher for FileWatcher {
    fn watch(&mut self, callback: ChangeCallback) -> Result<()> {
        if self.watcher.is_some() {
            return Err(BrokerError::WatcherError {
                message: "Watcher is already running".to_string(),
                source: None,
            });
        }

        let (event_tx, event_rx) = channel();
        let (stop_tx, stop_rx) = channel::<()>();

        let mut watcher =
            RecommendedWatcher::new(event_tx, notify::Config::default()).map_err(|e| {
                BrokerError::WatcherError {
                    message: format!("Failed to create file watcher: {}", e),
                    source: Some(Box::new(e)),
                }
            })?;

        // Editors often replace the file, so watch the directory holding it
        let watch_path = self
            .file_path
            .parent()
            .ok_or_else(|| BrokerError::WatcherError {
                message: "Failed to get parent directory".to_string(),
                source: None,
            })?
            .to_path_buf();

        watcher
            .watch(&watch_path, RecursiveMode::NonRecursive)
            .map_err(|e| BrokerError::WatcherError {
                message: format!("Failed to start watching: {}", e),
                source: Some(Box::new(e)),
            })?;

        let file_path = self.file_path.clone();
        let debounce_delay = self.debounce_delay;
        let watch_thread = thread::Builder::new()
            .name("layerbroker-file-watcher".to_string())
            .spawn(move || run_event_loop(file_path, debounce_delay, event_rx, stop_rx, callback))?;

        self.watcher = Some(watcher);
        self.stop_tx = Some(stop_tx);
        self.watch_thread = Some(watch_thread);
        tracing::debug!("Watching {}", self.file_path.display());

        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(handle) = self.watch_thread.take() {
            handle.join().map_err(|_| BrokerError::WatcherError {
                message: "Failed to join watcher thread".to_string(),
                source: None,
            })?;
        }

        self.watcher = None;

        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
