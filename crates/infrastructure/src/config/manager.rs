use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, SystemTime};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use vigil_dns_application::{ConfigChangeHandler, ConfigProvider};
use vigil_dns_domain::{ConfigError, ResolverConfig};

struct HotReload {
    token: CancellationToken,
}

/// Configuration provider backed by an `ArcSwap` snapshot.
///
/// Readers are wait-free; `update_config` publishes atomically and then
/// runs the registered change handlers synchronously. Optionally watches a
/// JSON config file by polling its modification time.
pub struct ConfigManager {
    current: ArcSwap<ResolverConfig>,
    handlers: Mutex<Vec<ConfigChangeHandler>>,
    config_path: Mutex<Option<PathBuf>>,
    last_modified: Mutex<Option<SystemTime>>,
    hot_reload: Mutex<Option<HotReload>>,
    self_ref: Weak<Self>,
}

impl ConfigManager {
    pub fn new(initial: ResolverConfig) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            current: ArcSwap::from_pointee(initial),
            handlers: Mutex::new(Vec::new()),
            config_path: Mutex::new(None),
            last_modified: Mutex::new(None),
            hot_reload: Mutex::new(None),
            self_ref: self_ref.clone(),
        })
    }

    /// Replace the snapshot with the contents of a JSON config file.
    /// Does not notify change handlers; the hot-reload path does that
    /// after a confirmed on-disk change.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: ResolverConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;

        self.current.store(Arc::new(config));
        *self.config_path.lock().unwrap() = Some(path.to_path_buf());
        *self.last_modified.lock().unwrap() = file_mtime(path);

        info!(path = %path.display(), "configuration loaded");
        Ok(())
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let config = self.current.load();
        let contents = serde_json::to_string_pretty(config.as_ref())
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(e.to_string()))?;
        info!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Reload the watched file if its modification time moved. Returns
    /// true when a new snapshot was published and handlers were notified.
    pub fn reload_if_changed(&self) -> Result<bool, ConfigError> {
        let path = self.config_path.lock().unwrap().clone();
        let Some(path) = path else {
            return Ok(false);
        };

        let mtime = file_mtime(&path);
        let changed = {
            let last = self.last_modified.lock().unwrap();
            mtime.is_some() && mtime != *last
        };
        if !changed {
            return Ok(false);
        }

        debug!(path = %path.display(), "config file changed, reloading");
        self.load_from_file(&path)?;
        self.notify_handlers();
        Ok(true)
    }

    /// Load `path` and start polling it for changes every `interval`.
    /// Requires a running tokio runtime.
    pub fn enable_hot_reload(
        &self,
        path: impl AsRef<Path>,
        interval: Duration,
    ) -> Result<(), ConfigError> {
        self.disable_hot_reload();
        self.load_from_file(path.as_ref())?;

        let runtime =
            Handle::try_current().map_err(|e| ConfigError::Io(e.to_string()))?;
        let token = CancellationToken::new();
        let watcher_token = token.clone();
        let manager = self.self_ref.clone();

        runtime.spawn(async move {
            loop {
                tokio::select! {
                    _ = watcher_token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        let Some(manager) = manager.upgrade() else { break };
                        if let Err(e) = manager.reload_if_changed() {
                            error!(error = %e, "config reload failed, keeping previous snapshot");
                        }
                    }
                }
            }
        });

        *self.hot_reload.lock().unwrap() = Some(HotReload { token });
        info!("config hot reload enabled");
        Ok(())
    }

    pub fn disable_hot_reload(&self) {
        if let Some(watch) = self.hot_reload.lock().unwrap().take() {
            watch.token.cancel();
            info!("config hot reload disabled");
        }
    }

    fn notify_handlers(&self) {
        let config = self.current.load_full();
        let handlers = self.handlers.lock().unwrap();
        for handler in handlers.iter() {
            handler(&config);
        }
    }
}

impl ConfigProvider for ConfigManager {
    fn config(&self) -> Arc<ResolverConfig> {
        self.current.load_full()
    }

    fn update_config(&self, config: ResolverConfig) {
        self.current.store(Arc::new(config));
        self.notify_handlers();
    }

    fn register_change_handler(&self, handler: ConfigChangeHandler) {
        self.handlers.lock().unwrap().push(handler);
    }
}

impl Drop for ConfigManager {
    fn drop(&mut self) {
        self.disable_hot_reload();
    }
}

fn file_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
