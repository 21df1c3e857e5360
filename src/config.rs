#![forbid(unsafe_code)]

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::comments::DEFAULT_QUOTA_COOLDOWN;
use crate::youtube::DEFAULT_API_BASE_URL;

pub const DEFAULT_ENV_PATH: &str = ".env";
pub const DEFAULT_CONFIG_PATH: &str = "harvest.toml";
pub const DEFAULT_BUCKET_NAME: &str = "ana-airflow-youtube-api";
pub const DEFAULT_OUTPUT_DIR: &str = ".";

pub const API_KEY_VAR: &str = "API_KEY_YOUTUBE_API";
pub const CHANNEL_IDS_VAR: &str = "HARVEST_CHANNEL_IDS";
pub const BUCKET_VAR: &str = "HARVEST_BUCKET";
pub const OUTPUT_DIR_VAR: &str = "HARVEST_OUTPUT_DIR";
pub const QUOTA_COOLDOWN_VAR: &str = "HARVEST_QUOTA_COOLDOWN_SECS";
pub const API_BASE_URL_VAR: &str = "HARVEST_API_BASE_URL";

/// Channels harvested when nothing else is configured.
pub const DEFAULT_CHANNEL_IDS: &[&str] = &[
    "UCtYLUTtgS3k1Fg4y5tAhLbw", // StatQuest
    "UCCezIgC97PvUuR4_gbFUs5g", // Corey Schafer
    "UCfzlCWGWYyIQ0aLC5w48gBQ", // sentdex
    "UCNU_lfiiWBdtULKOw6X0Dig", // Krish Naik
    "UCzL_0nIe8B4-7ShhVPfJkgw", // Data Science Dojo
    "UC7cs8q-gJRlGwj4A8OmCmXg", // Alex The Analyst
    "UC2UXDak6o7rBm23k3Vv5dww", // Tina Huang
];

/// Fully resolved settings for one run.
#[derive(Clone)]
pub struct HarvestConfig {
    pub api_key: String,
    pub channel_ids: Vec<String>,
    pub bucket_name: String,
    pub output_dir: PathBuf,
    pub quota_cooldown: Duration,
    pub api_base_url: String,
    pub upload: bool,
}

impl std::fmt::Debug for HarvestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarvestConfig")
            .field("api_key", &"<redacted>")
            .field("channel_ids", &self.channel_ids)
            .field("bucket_name", &self.bucket_name)
            .field("output_dir", &self.output_dir)
            .field("quota_cooldown", &self.quota_cooldown)
            .field("api_base_url", &self.api_base_url)
            .field("upload", &self.upload)
            .finish()
    }
}

/// Values supplied on the command line. They win over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub channel_ids: Vec<String>,
    pub bucket_name: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub quota_cooldown_secs: Option<u64>,
    pub api_base_url: Option<String>,
    pub no_upload: bool,
    pub env_path: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
}

/// Optional TOML file, lowest-priority source after the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub channel_ids: Option<Vec<String>>,
    #[serde(default)]
    pub bucket_name: Option<String>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub quota_cooldown_secs: Option<u64>,
    #[serde(default)]
    pub api_base_url: Option<String>,
}

pub fn resolve_config(overrides: ConfigOverrides) -> Result<HarvestConfig> {
    let env_path = overrides
        .env_path
        .as_deref()
        .unwrap_or_else(|| Path::new(DEFAULT_ENV_PATH));
    let file_vars = read_env_file(env_path)?;
    let file_config = match overrides.config_path.as_deref() {
        Some(path) => read_config_file(path)?,
        None => {
            let path = Path::new(DEFAULT_CONFIG_PATH);
            if path.exists() {
                read_config_file(path)?
            } else {
                FileConfig::default()
            }
        }
    };
    build_config(&file_vars, &file_config, env_var_string, overrides)
}

fn build_config(
    file_vars: &HashMap<String, String>,
    file_config: &FileConfig,
    env_lookup: impl Fn(&str) -> Option<String>,
    overrides: ConfigOverrides,
) -> Result<HarvestConfig> {
    let api_key = trimmed(overrides.api_key)
        .or_else(|| lookup_value(API_KEY_VAR, file_vars, &env_lookup))
        .ok_or_else(|| anyhow!("{API_KEY_VAR} not set"))?;

    let channel_ids = Some(clean_ids(overrides.channel_ids))
        .filter(|ids| !ids.is_empty())
        .or_else(|| {
            lookup_value(CHANNEL_IDS_VAR, file_vars, &env_lookup)
                .map(|value| parse_channel_ids(&value))
                .filter(|ids| !ids.is_empty())
        })
        .or_else(|| {
            file_config
                .channel_ids
                .clone()
                .map(clean_ids)
                .filter(|ids| !ids.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_CHANNEL_IDS.iter().map(|id| id.to_string()).collect());

    let bucket_name = trimmed(overrides.bucket_name)
        .or_else(|| lookup_value(BUCKET_VAR, file_vars, &env_lookup))
        .or_else(|| trimmed(file_config.bucket_name.clone()))
        .unwrap_or_else(|| DEFAULT_BUCKET_NAME.to_string());

    let output_dir = overrides
        .output_dir
        .or_else(|| lookup_value(OUTPUT_DIR_VAR, file_vars, &env_lookup).map(PathBuf::from))
        .or_else(|| file_config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    let quota_cooldown = overrides
        .quota_cooldown_secs
        .or_else(|| {
            lookup_value(QUOTA_COOLDOWN_VAR, file_vars, &env_lookup)
                .and_then(|value| value.parse::<u64>().ok())
        })
        .or(file_config.quota_cooldown_secs)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_QUOTA_COOLDOWN);

    let api_base_url = trimmed(overrides.api_base_url)
        .or_else(|| lookup_value(API_BASE_URL_VAR, file_vars, &env_lookup))
        .or_else(|| trimmed(file_config.api_base_url.clone()))
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

    Ok(HarvestConfig {
        api_key,
        channel_ids,
        bucket_name,
        output_dir,
        quota_cooldown,
        api_base_url,
        upload: !overrides.no_upload,
    })
}

/// Splits a comma or whitespace separated id list.
pub fn parse_channel_ids(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

fn clean_ids(ids: Vec<String>) -> Vec<String> {
    ids.into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

/// Trims the value; blank counts as unset.
fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_var_string(key: &str) -> Option<String> {
    trimmed(env::var(key).ok())
}

fn lookup_value(
    key: &str,
    file_vars: &HashMap<String, String>,
    env_lookup: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    env_lookup(key).or_else(|| trimmed(file_vars.get(key).cloned()))
}

pub fn read_config_file(path: &Path) -> Result<FileConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Parsing {}", path.display()))
}

/// Parses a dotenv-style file. A missing file yields no variables.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    if !path.exists() {
        return Ok(vars);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let line = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        let Some((key, value_raw)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value_raw.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|value| value.strip_suffix('"'))
            .or_else(|| {
                value
                    .strip_prefix('\'')
                    .and_then(|value| value.strip_suffix('\''))
            })
            .unwrap_or(value);
        vars.insert(key.to_string(), value.to_string());
    }
    Ok(vars)
}
