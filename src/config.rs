// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::phrases::PhrasePool;
use crate::store::{StoreOptions, DEFAULT_FILE_PATH, DEFAULT_PLACEHOLDER_AUTHOR};
use crate::validate::Limits;

pub const ENV_CONFIG_PATH: &str = "BOARD_CONFIG_PATH";
pub const ENV_DB_PATH: &str = "BOARD_DB_PATH";
pub const ENV_POP_MAX_WAIT_SECS: &str = "BOARD_POP_MAX_WAIT_SECS";
pub const ENV_STATIC_DIR: &str = "BOARD_STATIC_DIR";
pub const DEFAULT_CONFIG_PATH: &str = "config/board.toml";

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_FILE_PATH)
}
fn default_placeholder_author() -> String {
    DEFAULT_PLACEHOLDER_AUTHOR.to_string()
}
fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}
fn default_max_author_len() -> usize {
    64
}
fn default_max_content_len() -> usize {
    500
}

/// Service configuration (TOML). Every field is optional in the file.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Cool-down between distinct pops, in seconds. 0 = no throttling.
    #[serde(default)]
    pub pop_max_wait_secs: u64,
    #[serde(default)]
    pub placeholder_updates_throttle: bool,
    #[serde(default = "default_placeholder_author")]
    pub placeholder_author: String,
    /// Empty means the built-in pool.
    #[serde(default)]
    pub phrases: Vec<String>,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_max_author_len")]
    pub max_author_len: usize,
    #[serde(default = "default_max_content_len")]
    pub max_content_len: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            pop_max_wait_secs: 0,
            placeholder_updates_throttle: false,
            placeholder_author: default_placeholder_author(),
            phrases: Vec::new(),
            static_dir: default_static_dir(),
            max_author_len: default_max_author_len(),
            max_content_len: default_max_content_len(),
        }
    }
}

impl BoardConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading board config from {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("parsing board config {}", path.display()))
    }

    /// Resolve config, then apply env overrides:
    /// 1) $BOARD_CONFIG_PATH (must exist)
    /// 2) config/board.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from(Path::new(DEFAULT_CONFIG_PATH))?
        } else {
            Self::default()
        };
        cfg.apply_env()?;
        Ok(cfg)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(p) = std::env::var(ENV_DB_PATH) {
            self.db_path = PathBuf::from(p);
        }
        if let Ok(raw) = std::env::var(ENV_POP_MAX_WAIT_SECS) {
            self.pop_max_wait_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_POP_MAX_WAIT_SECS}={raw:?} is not a number of seconds"))?;
        }
        if let Ok(p) = std::env::var(ENV_STATIC_DIR) {
            self.static_dir = PathBuf::from(p);
        }
        Ok(())
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::default()
            .with_file_path(self.db_path.clone())
            .with_pop_max_wait(Duration::from_secs(self.pop_max_wait_secs))
            .with_phrases(PhrasePool::new(self.phrases.iter().cloned()))
            .with_placeholder_author(self.placeholder_author.clone())
            .with_placeholder_updates_throttle(self.placeholder_updates_throttle)
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_author_len: self.max_author_len,
            max_content_len: self.max_content_len,
        }
    }
}
