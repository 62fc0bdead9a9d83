// Configuration Storage Service
// Handles config file read/write, version backup and settings resolution

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const GPTZERO: &str = "gptzero";
pub const ORIGINALITY: &str = "originality";
pub const COPYLEAKS: &str = "copyleaks";

/// Per-call ceiling applied to every provider request unless overridden.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

const MAX_BACKUPS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub version: String,
    pub proxy: Option<ProxyConfig>,
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    pub enabled: bool,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub base_url: Option<String>,
    /// Only meaningful for providers with a separate login endpoint.
    pub auth_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("detector-hub"))
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file, falling back to defaults when absent
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        self.ensure_dir()?;

        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_file, content).map_err(|e| format!("Failed to write config: {}", e))
    }

    fn create_backup(&self) -> Result<(), String> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)
            .map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%3f");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| format!("Failed to create backup: {}", e))?;

        self.cleanup_old_backups(&backup_dir, MAX_BACKUPS)
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> Result<(), String> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(|e| format!("Failed to read backup dir: {}", e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // File names embed the timestamp, so lexical order is age order.
        entries.sort_by_key(|e| e.file_name());

        let remove_count = entries.len() - keep;
        for entry in entries.iter().take(remove_count) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }

    pub fn get_api_key(&self, provider: &str) -> Result<Option<String>, String> {
        let config = self.load()?;
        Ok(config.api_keys.get(provider).cloned())
    }

    pub fn set_api_key(&self, provider: &str, key: &str) -> Result<(), String> {
        let mut config = self.load()?;
        config.api_keys.insert(provider.to_string(), key.to_string());
        self.save(&config)
    }

    pub fn delete_api_key(&self, provider: &str) -> Result<(), String> {
        let mut config = self.load()?;
        config.api_keys.remove(provider);
        self.save(&config)
    }

    pub fn set_provider_url(&self, provider: &str, url: &str) -> Result<(), String> {
        let mut config = self.load()?;
        let provider_config = config.providers.entry(provider.to_string()).or_default();
        provider_config.base_url = Some(url.to_string());
        self.save(&config)
    }

    /// Apply one edit and return a line describing what changed.
    pub fn apply(&self, command: &ConfigCommand) -> Result<String, String> {
        match command {
            ConfigCommand::SetKey { provider, key } => {
                self.set_api_key(provider, key)?;
                Ok(format!("Stored API key for {}", provider))
            }
            ConfigCommand::DeleteKey { provider } => {
                if self.get_api_key(provider)?.is_none() {
                    return Ok(format!("No stored API key for {}", provider));
                }
                self.delete_api_key(provider)?;
                Ok(format!("Deleted API key for {}", provider))
            }
            ConfigCommand::SetUrl { provider, url } => {
                self.set_provider_url(provider, url)?;
                Ok(format!("Set {} endpoint to {}", provider, url))
            }
        }
    }
}

// ============ Config Commands ============

/// A persisted-config edit requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    SetKey { provider: String, key: String },
    DeleteKey { provider: String },
    SetUrl { provider: String, url: String },
}

impl ConfigCommand {
    /// Find `--set-key <provider> <key>`, `--delete-key <provider>` or
    /// `--set-url <provider> <url>` in `args`. `Ok(None)` when none is present.
    pub fn from_args(args: &[String]) -> Result<Option<Self>, String> {
        let flags = ["--set-key", "--delete-key", "--set-url"];
        let found: Vec<usize> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| flags.contains(&a.as_str()))
            .map(|(i, _)| i)
            .collect();

        let pos = match found.as_slice() {
            [] => return Ok(None),
            [pos] => *pos,
            _ => return Err("only one of --set-key, --delete-key, --set-url is allowed".to_string()),
        };
        let flag = args[pos].as_str();
        let operand = |offset: usize, what: &str| {
            args.get(pos + offset)
                .filter(|v| !v.starts_with("--") && !v.trim().is_empty())
                .cloned()
                .ok_or_else(|| format!("{} requires <{}>", flag, what))
        };

        let provider = known_provider(&operand(1, "provider")?)?;
        let command = match flag {
            "--set-key" => ConfigCommand::SetKey {
                provider,
                key: operand(2, "key")?,
            },
            "--set-url" => ConfigCommand::SetUrl {
                provider,
                url: operand(2, "url")?,
            },
            _ => ConfigCommand::DeleteKey { provider },
        };
        Ok(Some(command))
    }
}

fn known_provider(name: &str) -> Result<String, String> {
    let name = name.trim().to_lowercase();
    if [GPTZERO, ORIGINALITY, COPYLEAKS].contains(&name.as_str()) {
        Ok(name)
    } else {
        Err(format!(
            "Unknown provider: {} (expected {}, {} or {})",
            name, GPTZERO, ORIGINALITY, COPYLEAKS
        ))
    }
}

// ============ Resolved Settings ============

/// Credential, endpoints and timeout for one provider, fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    pub api_key: String,
    pub base_url: Option<String>,
    pub auth_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl ProviderSettings {
    pub fn with_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
            .unwrap_or(Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS))
    }
}

/// Process-wide configuration snapshot handed to the detector registry.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub gptzero: ProviderSettings,
    pub originality: ProviderSettings,
    pub copyleaks: ProviderSettings,
    pub proxy: Option<String>,
}

impl Settings {
    /// Resolve settings from the environment, then the config file in the
    /// default config directory, then built-in defaults.
    pub fn resolve() -> Result<Self, String> {
        let config = match ConfigStore::default_config_dir() {
            Some(dir) => ConfigStore::new(dir).load()?,
            None => AppConfig::default(),
        };
        Ok(Self::from_sources(&config, |key| env::var(key).ok()))
    }

    /// Resolve settings from an explicit config and environment lookup.
    pub fn from_sources<F>(config: &AppConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let gptzero = provider_settings(config, &lookup, GPTZERO, "GPTZERO_API_URL", None);
        let originality =
            provider_settings(config, &lookup, ORIGINALITY, "ORIGINALITY_API_URL", None);
        let copyleaks = provider_settings(
            config,
            &lookup,
            COPYLEAKS,
            "COPYLEAKS_API_URL",
            Some("COPYLEAKS_AUTH_URL"),
        );

        let proxy = non_empty(lookup("DETECTOR_HUB_PROXY")).or_else(|| {
            config
                .proxy
                .as_ref()
                .filter(|p| p.enabled)
                .and_then(|p| non_empty(p.url.clone()))
        });

        Self {
            gptzero,
            originality,
            copyleaks,
            proxy,
        }
    }
}

fn provider_settings<F>(
    config: &AppConfig,
    lookup: &F,
    provider: &str,
    url_var: &str,
    auth_url_var: Option<&str>,
) -> ProviderSettings
where
    F: Fn(&str) -> Option<String>,
{
    let upper = provider.to_uppercase();
    let env_keys = [
        format!("{}_API_KEY", upper),
        format!("DETECTOR_HUB_{}_API_KEY", upper),
    ];

    let api_key = env_keys
        .iter()
        .find_map(|k| non_empty(lookup(k.as_str())))
        .or_else(|| non_empty(config.api_keys.get(provider).cloned()))
        .unwrap_or_default();

    let provider_config = config.providers.get(provider);

    let base_url = non_empty(lookup(url_var))
        .or_else(|| provider_config.and_then(|p| non_empty(p.base_url.clone())));
    let auth_url = auth_url_var
        .and_then(|var| non_empty(lookup(var)))
        .or_else(|| provider_config.and_then(|p| non_empty(p.auth_url.clone())));
    let timeout = provider_config
        .and_then(|p| p.timeout_secs)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    ProviderSettings {
        api_key,
        base_url,
        auth_url,
        timeout,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
