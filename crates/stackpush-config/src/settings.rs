//! Orchestrator settings (`stackpush.yml`)

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that points directly at a settings file
pub const CONFIG_PATH_ENV: &str = "STACKPUSH_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["stackpush.local.yml", "stackpush.yml"];
const SETTINGS_DIR: &str = ".stackpush";

/// How the template file is chosen when several candidates exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateSelection {
    /// Every candidate is checked in order and the last existing one is used
    #[default]
    LastMatch,
    /// More than one existing candidate is an error
    Strict,
}

/// Settings for one deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PushSettings {
    /// Tag key for the application tag; `_uid` and `_env` tags derive from it
    pub app_tag_key: String,
    /// Value of the `<app_tag_key>_uid` tag
    pub app_uid: String,
    pub sbu_tag_key: String,
    pub sbu: String,
    /// Prefix of the `<company>_gav` tag
    pub company: String,
    /// Variable broker function name; no broker is invoked when unset
    pub variable_broker: Option<String>,
    pub poll_interval_secs: u64,
    /// Upper bound on status checks; unbounded when unset
    pub max_polls: Option<u32>,
    pub template_selection: TemplateSelection,
    /// Poll even when the provider reported nothing to update
    pub poll_after_no_changes: bool,
    /// Output file, relative to the working directory
    pub output_file: PathBuf,
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            app_tag_key: "app".to_string(),
            app_uid: "app-e312c4299a".to_string(),
            sbu_tag_key: "sbu".to_string(),
            sbu: String::new(),
            company: "company".to_string(),
            variable_broker: None,
            poll_interval_secs: 10,
            max_polls: None,
            template_selection: TemplateSelection::LastMatch,
            poll_after_no_changes: true,
            output_file: PathBuf::from("stackoutput.properties"),
        }
    }
}

impl PushSettings {
    /// Load settings from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::SettingsFileNotFound(path.to_path_buf())
            } else {
                ConfigError::io(path, e)
            }
        })?;
        let settings = Self::from_yaml(&content)?;
        tracing::info!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // 空ファイルはデフォルト設定として扱う
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load the discovered settings file under `root`, or defaults when none exists
    pub fn discover(root: &Path) -> Result<Self> {
        match find_settings_file(root) {
            Some(path) => Self::load(&path),
            None => {
                tracing::debug!(root = %root.display(), "No settings file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidSettings(
                "poll_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_polls == Some(0) {
            return Err(ConfigError::InvalidSettings(
                "max_polls must be greater than 0".to_string(),
            ));
        }
        if self.app_tag_key.trim().is_empty() {
            return Err(ConfigError::InvalidSettings(
                "app_tag_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 STACKPUSH_CONFIG_PATH (直接パス指定)
/// 2. ルートディレクトリ: stackpush.local.yml, stackpush.yml
/// 3. ./.stackpush/ ディレクトリ内: 同様の順序
pub fn find_settings_file(root: &Path) -> Option<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Some(path);
        }
        tracing::warn!(path = %path.display(), "{} points at a missing file", CONFIG_PATH_ENV);
    }

    // 2. ルートディレクトリで検索
    for filename in &CANDIDATES {
        let path = root.join(filename);
        if path.exists() {
            return Some(path);
        }
    }

    // 3. ./.stackpush/ ディレクトリで検索
    let settings_dir = root.join(SETTINGS_DIR);
    if settings_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = settings_dir.join(filename);
            if path.exists() {
                return Some(path);
            }
        }
    }

    None
}
