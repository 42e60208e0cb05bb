// src/scrape/config.rs
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::scrape::Commodity;

const ENV_LIST: &str = "COMMODITIES";
const ENV_PATH: &str = "COMMODITIES_PATH";
const ENV_INTERVAL: &str = "SCRAPE_INTERVAL_SECS";

pub const DEFAULT_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub interval_secs: u64,
    /// Commodity ids scraped each tick, e.g. `["wheat", "cotton_futures"]`.
    pub commodities: Vec<String>,
}

impl ScrapeConfig {
    /// Interval from `SCRAPE_INTERVAL_SECS`, commodity list from file
    /// fallbacks; defaults to every supported commodity hourly. A zero
    /// interval would panic the ticker, so it clamps to 1.
    pub fn load() -> Result<Self> {
        let interval_secs = std::env::var(ENV_INTERVAL)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_INTERVAL_SECS)
            .max(1);
        let commodities = load_commodities_default()?;
        Ok(Self {
            interval_secs,
            commodities,
        })
    }
}

/// Load the commodity list from an explicit path. Supports TOML or JSON.
pub fn load_commodities_from(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading commodity list from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_commodities(&content, ext.as_str())
}

/// Load the commodity list using env vars + fallbacks:
/// 1) $COMMODITIES (comma-separated ids)
/// 2) $COMMODITIES_PATH
/// 3) config/commodities.toml
/// 4) config/commodities.json
/// 5) every supported commodity id
pub fn load_commodities_default() -> Result<Vec<String>> {
    if let Ok(list) = std::env::var(ENV_LIST) {
        let v = clean_list(list.split(',').map(str::to_string).collect());
        if !v.is_empty() {
            return Ok(v);
        }
    }
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_commodities_from(&pb);
        } else {
            return Err(anyhow!("COMMODITIES_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/commodities.toml");
    if toml_p.exists() {
        return load_commodities_from(&toml_p);
    }
    let json_p = PathBuf::from("config/commodities.json");
    if json_p.exists() {
        return load_commodities_from(&json_p);
    }
    Ok(all_ids())
}

pub fn all_ids() -> Vec<String> {
    Commodity::ALL.iter().map(|c| c.id().to_string()).collect()
}

fn parse_commodities(s: &str, hint_ext: &str) -> Result<Vec<String>> {
    let try_toml = hint_ext == "toml" || s.contains("commodities");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported commodity list format"))
}

fn parse_toml(s: &str) -> Result<Vec<String>> {
    #[derive(serde::Deserialize)]
    struct TomlList {
        commodities: Vec<String>,
    }
    let v: TomlList = toml::from_str(s)?;
    Ok(clean_list(v.commodities))
}

fn parse_json(s: &str) -> Result<Vec<String>> {
    let v: Vec<String> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    use std::collections::BTreeSet;
    let mut set = BTreeSet::new();
    for it in items {
        let t = it.trim().to_ascii_lowercase();
        if !t.is_empty() {
            set.insert(t);
        }
    }
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn dedup_trim_and_formats_work() {
        let toml = r#"commodities = [" Wheat ", "", "barley", "barley"]"#;
        let json = r#"["beef", "  cotlook_a_index  ", ""]"#;
        let toml_out = parse_toml(toml).unwrap();
        assert_eq!(toml_out, vec!["barley".to_string(), "wheat".to_string()]);
        let json_out = parse_json(json).unwrap();
        assert_eq!(
            json_out,
            vec!["beef".to_string(), "cotlook_a_index".to_string()]
        );
    }

    #[serial_test::serial]
    #[test]
    fn zero_interval_is_clamped_not_panicking_later() {
        env::set_var(ENV_INTERVAL, "0");
        env::set_var(ENV_LIST, "wheat");
        let cfg = ScrapeConfig::load().unwrap();
        assert_eq!(cfg.interval_secs, 1);
        env::remove_var(ENV_INTERVAL);
        env::remove_var(ENV_LIST);
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        // Isolate CWD so a real config/ dir in the repo can't interfere.
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_LIST);
        env::remove_var(ENV_PATH);

        // No files in temp CWD -> every supported commodity.
        let v = load_commodities_default().unwrap();
        assert_eq!(v, all_ids());

        // Env takes precedence.
        let p_json = tmp.path().join("commodities.json");
        fs::write(&p_json, r#"["wheat"]"#).unwrap();
        env::set_var(ENV_PATH, p_json.display().to_string());
        let v2 = load_commodities_default().unwrap();
        assert_eq!(v2, vec!["wheat".to_string()]);

        // An inline list beats the path.
        env::set_var(ENV_LIST, "Beef, barley ,beef");
        let v3 = load_commodities_default().unwrap();
        assert_eq!(v3, vec!["barley".to_string(), "beef".to_string()]);
        env::remove_var(ENV_LIST);
        env::remove_var(ENV_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
