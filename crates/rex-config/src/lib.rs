//! Configuration management for the rex CLI
//!
//! Settings live in a TOML file under the user config directory. Every value
//! has a sensible default so a missing file is not an error; the `REX_CONFIG`
//! environment variable points at an alternate file for tests and isolated
//! runs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    /// Default corpus root used when `rex extract` gets no path argument
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_root: Option<String>,
    /// File name of the license header asset looked up during the scan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_file: Option<String>,
    /// Scan files in parallel (defaults to true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,
}

impl Config {
    pub fn path() -> PathBuf {
        // Honor explicit override via REX_CONFIG for tests / isolated runs
        if let Ok(env_path) = std::env::var("REX_CONFIG") {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        #[cfg(not(target_os = "windows"))]
        {
            dirs::home_dir().map_or_else(
                || PathBuf::from(".config/rex/rex.toml"),
                |h| h.join(".config").join("rex").join("rex.toml"),
            )
        }

        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map_or_else(
                || PathBuf::from("config\\rex\\rex.toml"),
                |c| c.join("rex").join("rex.toml"),
            )
        }
    }

    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path();
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "corpus-root" => self.corpus_root.clone(),
            "license-file" => self.license_file.clone(),
            "parallel" => self.parallel.map(|v| v.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) {
        match key {
            "corpus-root" => self.corpus_root = Some(value),
            "license-file" => self.license_file = Some(value),
            "parallel" => self.parallel = value.parse().ok(),
            _ => {}
        }
    }

    pub fn is_known_key(key: &str) -> bool {
        matches!(key, "corpus-root" | "license-file" | "parallel")
    }

    pub fn is_empty(&self) -> bool {
        self.corpus_root.is_none() && self.license_file.is_none() && self.parallel.is_none()
    }

    pub fn values_iter(&self) -> Vec<(&str, String)> {
        let mut values = Vec::new();
        if let Some(ref val) = self.corpus_root {
            values.push(("corpus-root", val.clone()));
        }
        if let Some(ref val) = self.license_file {
            values.push(("license-file", val.clone()));
        }
        if let Some(val) = self.parallel {
            values.push(("parallel", val.to_string()));
        }
        values
    }

    /// Effective license file name, falling back to the fixed default
    pub fn license_file_name(&self) -> &str {
        self.license_file.as_deref().unwrap_or("licenseHeader.txt")
    }

    /// Effective parallelism setting
    pub fn parallel_enabled(&self) -> bool {
        self.parallel.unwrap_or(true)
    }
}
