use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Longest code the UI will lay out sensibly.
pub const MAX_CODE_LENGTH: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Number of code cells when --length is not given
    #[serde(default = "default_length")]
    pub default_length: usize,

    /// Rejections allowed before lockout (0 = unlimited)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Render entered digits as a mask character
    #[serde(default)]
    pub mask: bool,

    /// Desktop notification of the verification outcome
    #[serde(default)]
    pub notifications: bool,

    /// Timeout for --check commands, in seconds
    #[serde(default = "default_check_timeout")]
    pub check_timeout_secs: u64,

    /// Hex color overrides for the built-in palette
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<ColorOverrides>,
}

/// Optional `#RRGGBB`/`#RGB` strings, one per theme slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_selected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}

fn default_length() -> usize {
    6
}

fn default_max_attempts() -> u32 {
    3
}

fn default_check_timeout() -> u64 {
    crate::verify::DEFAULT_CHECK_TIMEOUT.as_secs()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_length: default_length(),
            max_attempts: default_max_attempts(),
            mask: false,
            notifications: false,
            check_timeout_secs: default_check_timeout(),
            colors: None,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("kodo");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(mut config) => {
                        config.sanitize();
                        return Ok(config);
                    }
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
        }

        let config = AppConfig::default();
        let _ = config.save();
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        let mut clean_config = self.clone();
        clean_config.sanitize();

        let content = toml::to_string_pretty(&clean_config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Clamp out-of-range values rather than erroring on them
    fn sanitize(&mut self) {
        if self.default_length == 0 {
            tracing::warn!(
                "default_length 0 is not usable, falling back to {}",
                default_length()
            );
            self.default_length = default_length();
        }
        if self.default_length > MAX_CODE_LENGTH {
            self.default_length = MAX_CODE_LENGTH;
        }
        if self.check_timeout_secs == 0 {
            self.check_timeout_secs = default_check_timeout();
        }
    }
}
