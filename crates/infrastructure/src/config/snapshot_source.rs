use autoptr6_application::ports::{OverrideSource, SnapshotSource};
use autoptr6_application::services::{BuiltSnapshot, SnapshotBuilder};
use autoptr6_domain::{CliOverrides, Config, DomainError};
use std::path::PathBuf;
use std::sync::Arc;

/// Builds snapshots from the config file, the environment and the
/// command-line overrides captured at startup.
///
/// Every build re-reads the file and the environment, so a reload picks up
/// edits to either. Command-line values always win.
pub struct FileSnapshotSource {
    config_path: Option<String>,
    cli: CliOverrides,
    builder: SnapshotBuilder,
}

impl FileSnapshotSource {
    pub fn new(
        config_path: Option<String>,
        cli: CliOverrides,
        overrides: Arc<dyn OverrideSource>,
    ) -> Self {
        Self {
            config_path,
            cli,
            builder: SnapshotBuilder::new(overrides),
        }
    }

    /// Loads and validates the merged configuration.
    pub fn load_config(&self) -> Result<Config, DomainError> {
        let config = Config::load(self.config_path.as_deref(), self.cli.clone())
            .map_err(|e| DomainError::ConfigError(e.to_string()))?;
        config
            .validate()
            .map_err(|e| DomainError::ConfigError(e.to_string()))?;
        Ok(config)
    }

    pub fn build_from(&self, config: &Config, generation: u64) -> Result<BuiltSnapshot, DomainError> {
        let mut built = self.builder.build(config, generation)?;
        built.watched_paths = self.watched_paths(config);
        Ok(built)
    }

    /// The config file in effect, if any.
    pub fn config_file(&self) -> Option<PathBuf> {
        self.config_path
            .clone()
            .or_else(Config::get_config_path)
            .map(PathBuf::from)
    }

    /// Files whose modification should trigger a reload.
    pub fn watched_paths(&self, config: &Config) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.config_file().into_iter().collect();
        if config.overrides.use_custom {
            paths.push(PathBuf::from(&config.overrides.file));
        }
        paths
    }
}

impl SnapshotSource for FileSnapshotSource {
    fn build(&self, generation: u64) -> Result<BuiltSnapshot, DomainError> {
        let config = self.load_config()?;
        self.build_from(&config, generation)
    }

    fn describe(&self) -> String {
        match self.config_file() {
            Some(path) => path.display().to_string(),
            None => "defaults".to_string(),
        }
    }
}
