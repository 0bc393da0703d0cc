use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Watches the dashboard config file and signals when it should be reloaded.
///
/// Bursts of filesystem events collapse into a single pending signal; the
/// receiver reloads once per signal and re-derives stat requirements.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// use netdash_config::ConfigWatcher;
/// let (_, mut rx) = ConfigWatcher::spawn("/home/user/.config/netdash/netdash.toml");
/// while rx.recv().await.is_some() {
///     println!("config changed, reapplying requirements");
/// }
/// # }
/// ```
pub struct ConfigWatcher {
    path: PathBuf,
}

impl ConfigWatcher {
    /// Spawn a filesystem watcher for `path` on the current Tokio runtime.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        let path = path.as_ref().to_path_buf();
        let watcher = Self { path: path.clone() };

        tokio::spawn(watch_loop(path, tx));

        (watcher, rx)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<()>) {
    use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
    use std::time::Duration;

    let (sync_tx, mut sync_rx) = mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = sync_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create filesystem watcher: {e}");
            return;
        }
    };

    // Editors often replace the file, so watch the directory and filter.
    let target = path.parent().filter(|p| p.exists()).unwrap_or(&path);
    if let Err(e) = watcher.watch(target, RecursiveMode::NonRecursive) {
        error!("Failed to watch '{}': {e}", target.display());
        return;
    }

    info!("Watching config file: {}", path.display());

    while let Some(event) = sync_rx.recv().await {
        match event {
            Ok(e) => {
                use notify::EventKind::*;
                let ours = e.paths.iter().any(|p| p == &path);
                if !ours || !matches!(e.kind, Modify(_) | Create(_)) {
                    continue;
                }
                debug!(kind = ?e.kind, "config file changed");
                match tx.try_send(()) {
                    Ok(()) | Err(mpsc::error::TrySendError::Full(())) => {}
                    Err(mpsc::error::TrySendError::Closed(())) => break, // receiver dropped
                }
            }
            Err(e) => warn!("Watcher error: {e}"),
        }
    }
}
