use autoptr6_application::use_cases::ReloadConfigUseCase;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Rebuilds the active configuration when a watched file changes or, on
/// unix, when the process receives SIGHUP.
///
/// The watched set is replaced after every successful reload, so moving the
/// override file takes effect without a restart.
pub struct ConfigReloadJob {
    reload: Arc<ReloadConfigUseCase>,
    watched: Mutex<Vec<PathBuf>>,
    poll_interval: Duration,
    listen_for_sighup: bool,
    shutdown: CancellationToken,
}

impl ConfigReloadJob {
    pub fn new(reload: Arc<ReloadConfigUseCase>) -> Self {
        Self {
            reload,
            watched: Mutex::new(Vec::new()),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            listen_for_sighup: true,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_watched_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.watched = Mutex::new(paths);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_sighup(mut self, enabled: bool) -> Self {
        self.listen_for_sighup = enabled;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Files currently polled for changes.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        match self.watched.lock() {
            Ok(watched) => watched.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace_watched_paths(&self, paths: Vec<PathBuf>) {
        let mut watched = self.watched.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *watched != paths {
            info!(?paths, "Watching new configuration files");
            *watched = paths;
        }
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            watched = self.watched_paths().len(),
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            sighup = self.listen_for_sighup,
            "Starting config reload job"
        );

        let job = Arc::clone(&self);
        tokio::spawn(async move { job.watch_files().await });

        if self.listen_for_sighup {
            let job = Arc::clone(&self);
            tokio::spawn(async move { job.watch_sighup().await });
        }
    }

    async fn watch_files(&self) {
        let mut paths = self.watched_paths();
        let mut last_seen = modification_times(&paths);
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("ConfigReloadJob (files): shutting down");
                    break;
                }
                _ = interval.tick() => {
                    // A reload from another trigger may have moved the files.
                    let current_paths = self.watched_paths();
                    if current_paths != paths {
                        last_seen = modification_times(&current_paths);
                        paths = current_paths;
                        continue;
                    }

                    let current = modification_times(&paths);
                    if current != last_seen {
                        debug!("Watched configuration file changed");
                        self.run_reload("file change").await;
                        paths = self.watched_paths();
                        last_seen = modification_times(&paths);
                    }
                }
            }
        }
    }

    #[cfg(unix)]
    async fn watch_sighup(&self) {
        use tokio::signal::unix::{signal, SignalKind};

        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, "Failed to install SIGHUP handler");
                return;
            }
        };

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("ConfigReloadJob (sighup): shutting down");
                    break;
                }
                received = hangup.recv() => {
                    if received.is_none() {
                        break;
                    }
                    self.run_reload("SIGHUP").await;
                }
            }
        }
    }

    #[cfg(not(unix))]
    async fn watch_sighup(&self) {
        debug!("SIGHUP reload is only available on unix");
    }

    async fn run_reload(&self, trigger: &'static str) {
        let reload = Arc::clone(&self.reload);
        match tokio::task::spawn_blocking(move || reload.execute()).await {
            Ok(Ok(outcome)) => {
                info!(
                    trigger,
                    generation = outcome.generation,
                    subnets = outcome.subnets,
                    overrides = outcome.overrides,
                    "Reload applied"
                );
                self.replace_watched_paths(outcome.watched_paths);
            }
            Ok(Err(e)) => error!(trigger, error = %e, "Reload failed"),
            Err(e) => error!(trigger, error = %e, "Reload task panicked"),
        }
    }
}

fn modification_times(paths: &[PathBuf]) -> Vec<Option<SystemTime>> {
    paths
        .iter()
        .map(|path| std::fs::metadata(path).and_then(|m| m.modified()).ok())
        .collect()
}
