//! Operator configuration for Bugzilla access.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub const CONFIG_FILE: &str = ".nss-land-commit.json";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,
    pub bugzilla_url: Option<String>,
}

impl Config {
    /// `~/.nss-land-commit.json`. A missing file just means logged out.
    pub fn load() -> Result<Config> {
        match config_path() {
            Some(path) if path.is_file() => {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("read {}", path.display()))?;
                serde_json::from_str(&content)
                    .with_context(|| format!("parse {}", path.display()))
            }
            _ => Ok(Config::default()),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE))
}
