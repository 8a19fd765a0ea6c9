/// Server used when nothing has been configured yet.
pub const DEFAULT_SERVER_ADDRESS: &str = "http://localhost:7788";

/// User configuration, loaded once per session and replaced only by an
/// explicit save or reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_address: String,
    pub api_key: String,
    pub notifications_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            api_key: String::new(),
            notifications_enabled: true,
        }
    }
}

impl Config {
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Both the server address and the credential are present.
    pub fn is_ready(&self) -> bool {
        !self.server_address.trim().is_empty() && self.has_credential()
    }
}

/// Raw field values from the settings dialog, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsForm {
    pub server_address: String,
    pub api_key: String,
    pub notifications_enabled: bool,
}

impl SettingsForm {
    pub fn from_config(config: &Config) -> Self {
        Self {
            server_address: config.server_address.clone(),
            api_key: config.api_key.clone(),
            notifications_enabled: config.notifications_enabled,
        }
    }

    /// Trim both text fields and require them to be non-empty.
    pub fn validate(&self) -> Result<Config, ConfigValidationError> {
        let server_address = self.server_address.trim();
        if server_address.is_empty() {
            return Err(ConfigValidationError::MissingServerAddress);
        }
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigValidationError::MissingApiKey);
        }
        Ok(Config {
            server_address: server_address.to_string(),
            api_key: api_key.to_string(),
            notifications_enabled: self.notifications_enabled,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Please enter a server URL")]
    MissingServerAddress,
    #[error(
        "Please enter an API key. Get it from: Stacks web interface → Settings tab → API Key section"
    )]
    MissingApiKey,
}
