use std::path::{Path, PathBuf};

use anyhow::Context;

use super::types::{AppConfig, InFlightPolicy};

pub const ENV_API_BASE_URL: &str = "WORKSHOP_API_BASE_URL";
pub const ENV_ACCESS_TOKEN: &str = "WORKSHOP_ACCESS_TOKEN";
pub const ENV_IN_FLIGHT_POLICY: &str = "WORKSHOP_IN_FLIGHT_POLICY";

/// Get the default data directory: ~/.workshop
pub fn get_workshop_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".workshop"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.workshop/config.toml
    let data_dir = get_workshop_data_dir()?;
    let home_config = data_dir.join("config.toml");

    // Priority 2: ./config.toml
    let local_config = Path::new("config.toml");

    let mut cfg = if home_config.exists() {
        load_from_path(&home_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    if cfg
        .data_dir
        .as_deref()
        .map(str::trim)
        .map_or(true, str::is_empty)
    {
        cfg.data_dir = Some(data_dir.to_string_lossy().to_string());
    }

    if cfg.logging.file
        && cfg
            .logging
            .directory
            .as_deref()
            .map(str::trim)
            .map_or(true, str::is_empty)
    {
        cfg.logging.directory = Some(data_dir.join("logs").to_string_lossy().to_string());
    }

    // Environment variable overrides (Priority 0: highest)
    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;

    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str::<AppConfig>(&s).with_context(|| format!("invalid config {}", path.display()))
}

/// Applies `WORKSHOP_*` overrides. Blank values are ignored.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(ENV_API_BASE_URL) {
        cfg.api.base_url = v;
    }
    if let Some(v) = get(ENV_ACCESS_TOKEN) {
        cfg.api.access_token = Some(v.trim().to_string());
    }
    if let Some(v) = get(ENV_IN_FLIGHT_POLICY) {
        cfg.sync.in_flight_policy = v
            .parse::<InFlightPolicy>()
            .map_err(|e| anyhow::anyhow!("{ENV_IN_FLIGHT_POLICY}: {e}"))?;
    }
    Ok(())
}
