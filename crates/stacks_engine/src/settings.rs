use std::fs;
use std::path::{Path, PathBuf};

use agent_logging::{agent_info, agent_warn};
use serde::{Deserialize, Serialize};
use stacks_core::{Config, DEFAULT_SERVER_ADDRESS};

use crate::persist::{ensure_writable_dir, parent_dir, write_atomically, PersistError};

/// Persisted user configuration.
pub trait SettingsStore: Send {
    /// Stored values, or defaults for anything never set.
    fn get(&self) -> Config;

    /// Store all three fields at once.
    fn set(&mut self, config: &Config) -> Result<(), PersistError>;

    /// Restore defaults (which clears the API key) and return them.
    fn reset(&mut self) -> Result<Config, PersistError>;

    /// False when values only live for this session.
    fn is_persistent(&self) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    config: Config,
}

impl MemorySettingsStore {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self) -> Config {
        self.config.clone()
    }

    fn set(&mut self, config: &Config) -> Result<(), PersistError> {
        self.config = config.clone();
        Ok(())
    }

    fn reset(&mut self) -> Result<Config, PersistError> {
        self.config = Config::default();
        Ok(self.config.clone())
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct PersistedSettings {
    server_url: String,
    api_key: String,
    show_notifications: bool,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_ADDRESS.to_string(),
            api_key: String::new(),
            show_notifications: true,
        }
    }
}

impl From<PersistedSettings> for Config {
    fn from(settings: PersistedSettings) -> Self {
        Config {
            server_address: settings.server_url,
            api_key: settings.api_key,
            notifications_enabled: settings.show_notifications,
        }
    }
}

impl From<&Config> for PersistedSettings {
    fn from(config: &Config) -> Self {
        Self {
            server_url: config.server_address.clone(),
            api_key: config.api_key.clone(),
            show_notifications: config.notifications_enabled,
        }
    }
}

/// RON file store. The cached value only changes after a write succeeded.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
    cached: Config,
}

impl FileSettingsStore {
    /// Fails when the file's directory cannot be written; an unreadable or
    /// malformed file falls back to defaults.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let path = path.into();
        ensure_writable_dir(parent_dir(&path))?;
        let cached = load(&path);
        Ok(Self { path, cached })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&mut self, config: &Config) -> Result<(), PersistError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&PersistedSettings::from(config), pretty)
            .map_err(|err| PersistError::Serialize(err.to_string()))?;
        write_atomically(&self.path, &content)?;
        self.cached = config.clone();
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self) -> Config {
        self.cached.clone()
    }

    fn set(&mut self, config: &Config) -> Result<(), PersistError> {
        self.write(config)
    }

    fn reset(&mut self) -> Result<Config, PersistError> {
        let defaults = Config::default();
        self.write(&defaults)?;
        Ok(defaults)
    }

    fn is_persistent(&self) -> bool {
        true
    }
}

fn load(path: &Path) -> Config {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Config::default();
        }
        Err(err) => {
            agent_warn!("Failed to read settings from {:?}: {}", path, err);
            return Config::default();
        }
    };

    match ron::from_str::<PersistedSettings>(&content) {
        Ok(settings) => {
            agent_info!("Loaded settings from {:?}", path);
            settings.into()
        }
        Err(err) => {
            agent_warn!("Failed to parse settings from {:?}: {}", path, err);
            Config::default()
        }
    }
}

/// File store at `path`, or an in-memory store for this session when the
/// location is unusable.
pub fn open_settings_store(path: &Path) -> Box<dyn SettingsStore> {
    match FileSettingsStore::open(path) {
        Ok(store) => Box::new(store),
        Err(err) => {
            agent_warn!(
                "Settings storage at {:?} unavailable ({}); settings will not survive this session",
                path,
                err
            );
            Box::new(MemorySettingsStore::default())
        }
    }
}
