use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

use kakei_core::AccountContext;
use kakei_store::{ForecastState, JsonStore, StoreError};

use crate::config::Config;

/// `$KAKEI_HOME`, or `~/.kakei`.
pub fn kakei_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("KAKEI_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".kakei"))
}

pub fn ensure_kakei_home() -> Result<PathBuf> {
    let dir = kakei_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn open_store(cfg: &Config) -> Result<JsonStore> {
    let data_dir = cfg.storage.resolve_data_dir(&ensure_kakei_home()?);
    JsonStore::new(&data_dir).with_context(|| format!("open data dir {}", data_dir.display()))
}

pub fn load_state(store: &JsonStore, user: &str) -> Result<ForecastState> {
    match ForecastState::load(store, user) {
        Ok(state) => Ok(state),
        Err(StoreError::UnknownUser(_)) => {
            anyhow::bail!("No data for user '{user}'. Run: kakei setup")
        }
        Err(e) => Err(e).with_context(|| format!("load data for '{user}'")),
    }
}

/// "Now" for this run, resolved in the configured timezone.
pub fn current_context(state: &ForecastState, cfg: &Config) -> Result<AccountContext> {
    let tz = cfg.account.tz()?;
    Ok(state.context_in(Utc::now(), &tz))
}
