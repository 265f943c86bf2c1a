use crate::error::{OappError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const API_URL_ENV: &str = "OAPP_API_URL";
const STORE_FILE_NAME: &str = "store.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: Option<String>,
    pub timeout_seconds: u64,
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout_seconds: 30,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| OappError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("oapp").join("config.json"))
    }

    /// ローカルストアのファイルパス（data_dir未設定時はOSのデータディレクトリ）
    pub fn store_path(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .ok_or_else(|| OappError::Config("データディレクトリが見つかりません".into()))?
                .join("oapp"),
        };
        Ok(dir.join(STORE_FILE_NAME))
    }

    pub fn api_url(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                return Ok(url);
            }
        }

        self.api_url.clone().ok_or(OappError::MissingApiUrl)
    }

    pub fn set_api_url(&mut self, url: String) -> Result<()> {
        if !url.starts_with("http") {
            return Err(OappError::Config(format!("URLが不正です: {}", url)));
        }
        self.api_url = Some(url);
        self.save()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }
}
