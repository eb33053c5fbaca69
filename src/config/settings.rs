//! User settings for pension-ledger
//!
//! Holds display preferences and the credentials of the two optional remote
//! collaborators: the cloud entry database and the advice endpoint. Both can
//! be supplied in `config.json` or through environment variables, which take
//! precedence.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::LedgerError;

pub const ENV_REMOTE_URL: &str = "PENSION_LEDGER_REMOTE_URL";
pub const ENV_REMOTE_KEY: &str = "PENSION_LEDGER_REMOTE_KEY";
pub const ENV_ADVICE_KEY: &str = "PENSION_LEDGER_ADVICE_KEY";
pub const ENV_ADVICE_URL: &str = "PENSION_LEDGER_ADVICE_URL";
pub const ENV_ADVICE_MODEL: &str = "PENSION_LEDGER_ADVICE_MODEL";

/// Cloud database connection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Project endpoint, e.g. `https://abc.supabase.co`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Access credential sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl RemoteSettings {
    /// Both the endpoint and the credential are present and non-blank
    pub fn is_configured(&self) -> bool {
        non_blank(&self.url).is_some() && non_blank(&self.key).is_some()
    }
}

/// Generative advice endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default = "default_advice_url")]
    pub base_url: String,

    #[serde(default = "default_advice_model")]
    pub model: String,
}

impl Default for AdviceSettings {
    fn default() -> Self {
        Self {
            key: None,
            base_url: default_advice_url(),
            model: default_advice_model(),
        }
    }
}

/// User settings for pension-ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Default currency symbol
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default)]
    pub remote: RemoteSettings,

    #[serde(default)]
    pub advice: AdviceSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_advice_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_advice_model() -> String {
    "gemini-2.0-flash".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            remote: RemoteSettings::default(),
            advice: AdviceSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                LedgerError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                LedgerError::Config(format!("Failed to parse settings file: {}", e))
            })?;
            settings.validate()?;

            Ok(settings)
        } else {
            // Not written here; main saves the defaults before env overrides apply
            Ok(Settings::default())
        }
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<(), LedgerError> {
        let invalid = StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error));
        if invalid {
            return Err(LedgerError::Config(format!(
                "Invalid date_format '{}' in settings",
                self.date_format
            )));
        }
        Ok(())
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| LedgerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Overlay values from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Overlay values from an arbitrary variable lookup
    ///
    /// Blank values are ignored so an exported-but-empty variable does not
    /// clobber a value from `config.json`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_REMOTE_URL) {
            self.remote.url = Some(url);
        }
        if let Some(key) = get(ENV_REMOTE_KEY) {
            self.remote.key = Some(key);
        }
        if let Some(key) = get(ENV_ADVICE_KEY) {
            self.advice.key = Some(key);
        }
        if let Some(url) = get(ENV_ADVICE_URL) {
            self.advice.base_url = url;
        }
        if let Some(model) = get(ENV_ADVICE_MODEL) {
            self.advice.model = model;
        }
    }
}

/// Return the trimmed value if it is present and not blank
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Mask a secret for display, keeping only the last four characters
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
