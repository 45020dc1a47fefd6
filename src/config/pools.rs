// src/config/pools.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::urgency::UrgencyLevel;

pub const ENV_POOLS_PATH: &str = "ALERTS_POOLS_PATH";
pub const DEFAULT_BODY_LEN: usize = 100;

const DEFAULT_TITLES: [&str; 20] = [
    "App Crashed",
    "App Launched",
    "App Updated",
    "Network Issue",
    "New User",
    "Build Failed",
    "Token Expired",
    "Disk Full",
    "User Deleted Account",
    "Invalid Credit Card Used",
    "Database Time Out",
    "Could not reach Authentication Service",
    "Could not reach Twilio",
    "Unauthorized Action",
    "Service Redeployed",
    "Database Query Failed",
    "Device Lost Connection",
    "Battery Low",
    "Alarm Triggered",
    "User Bought Item",
];

/// Raw pool contents as configured. Emptiness is checked when the pools are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolsConfig {
    pub titles: Vec<String>,
    /// `None` means bodies are random alphabetic strings of `body_len` chars.
    pub messages: Option<Vec<String>>,
    pub urgencies: Vec<UrgencyLevel>,
    pub body_len: usize,
}

impl Default for PoolsConfig {
    fn default() -> Self {
        Self {
            titles: DEFAULT_TITLES.iter().map(|s| s.to_string()).collect(),
            messages: None,
            urgencies: UrgencyLevel::ALL.to_vec(),
            body_len: DEFAULT_BODY_LEN,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PoolsFile {
    titles: Option<Vec<String>>,
    messages: Option<Vec<String>>,
    urgencies: Option<Vec<String>>,
    body_len: Option<usize>,
}

impl PoolsConfig {
    /// Load pools from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading pools from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_pools(&content, ext.as_str())
            .with_context(|| format!("parsing pools from {}", path.display()))
    }

    /// Load pools using the path variable + fallbacks:
    /// 1) $ALERTS_POOLS_PATH (blank counts as unset)
    /// 2) config/pools.toml
    /// 3) config/pools.json
    /// 4) built-in defaults
    pub fn load_default<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(p) = lookup(ENV_POOLS_PATH).filter(|p| !p.trim().is_empty()) {
            let pb = PathBuf::from(p.trim());
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_POOLS_PATH} points to non-existent path {}", pb.display()));
        }
        let toml_p = PathBuf::from("config/pools.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/pools.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }
}

fn parse_pools(s: &str, hint_ext: &str) -> Result<PoolsConfig> {
    let file: PoolsFile = match hint_ext {
        "json" => serde_json::from_str(s)?,
        "toml" => toml::from_str(s)?,
        // No usable extension: try TOML, then JSON.
        _ => match toml::from_str(s) {
            Ok(v) => v,
            Err(_) => serde_json::from_str(s).map_err(|_| anyhow!("unsupported pools format"))?,
        },
    };
    from_file(file)
}

fn from_file(file: PoolsFile) -> Result<PoolsConfig> {
    let defaults = PoolsConfig::default();
    let urgencies = match file.urgencies {
        Some(raw) => clean_list(raw)
            .iter()
            .map(|s| s.parse::<UrgencyLevel>())
            .collect::<Result<Vec<_>>>()?,
        None => defaults.urgencies,
    };
    Ok(PoolsConfig {
        titles: file.titles.map(clean_list).unwrap_or(defaults.titles),
        messages: file.messages.map(clean_list),
        urgencies,
        body_len: file.body_len.unwrap_or(defaults.body_len),
    })
}

/// Trim entries and drop blanks. Order and duplicates are preserved.
fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|it| it.trim().to_string())
        .filter(|it| !it.is_empty())
        .collect()
}
