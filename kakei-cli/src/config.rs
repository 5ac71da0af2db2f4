use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use kakei_core::ForecastWindow;

use crate::state::ensure_kakei_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub forecast: ForecastSection,
    #[serde(default)]
    pub account: AccountSection,
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSection {
    /// Max months shown before the current month.
    pub lookback_months: u32,
    /// Months projected from the current month onward.
    pub horizon_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSection {
    /// IANA zone used to decide which month "today" is in.
    pub timezone: String,
    /// User id used when `--user` is not passed.
    pub default_user: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Where per-user documents live (default: `<kakei home>/data`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for ForecastSection {
    fn default() -> Self {
        let window = ForecastWindow::default();
        Self {
            lookback_months: window.lookback_months,
            horizon_months: window.horizon_months,
        }
    }
}

impl Default for AccountSection {
    fn default() -> Self {
        Self {
            timezone: "Asia/Tokyo".to_string(),
            default_user: "local".to_string(),
        }
    }
}

impl ForecastSection {
    pub fn window(&self) -> ForecastWindow {
        ForecastWindow {
            lookback_months: self.lookback_months,
            horizon_months: self.horizon_months,
        }
    }
}

impl AccountSection {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("invalid timezone '{}' in config: {e}", self.timezone))
    }
}

impl StorageSection {
    pub fn resolve_data_dir(&self, home: &Path) -> PathBuf {
        match &self.data_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => home.join(dir),
            None => home.join("data"),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_kakei_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    cfg.account.tz()?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.forecast.window(), ForecastWindow::default());
        assert_eq!(cfg.account.default_user, "local");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[forecast]\nhorizon_months = 24\n").unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.forecast.horizon_months, 24);
        assert_eq!(cfg.forecast.lookback_months, 12);
        assert_eq!(cfg.account.timezone, "Asia/Tokyo");
    }

    #[test]
    fn test_round_trips_through_toml() {
        let mut cfg = Config::default();
        cfg.storage.data_dir = Some(PathBuf::from("/srv/kakei"));
        let s = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_bad_timezone_is_rejected() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[account]\ntimezone = \"Mars/Olympus\"\n").unwrap();
        assert!(load_config_from(&p).is_err());
    }

    #[test]
    fn test_data_dir_resolution() {
        let home = Path::new("/home/u/.kakei");
        let mut storage = StorageSection::default();
        assert_eq!(storage.resolve_data_dir(home), home.join("data"));

        storage.data_dir = Some(PathBuf::from("elsewhere"));
        assert_eq!(storage.resolve_data_dir(home), home.join("elsewhere"));

        storage.data_dir = Some(PathBuf::from("/abs"));
        assert_eq!(storage.resolve_data_dir(home), PathBuf::from("/abs"));
    }
}
