//! Persistence collaborator: load everything the engine needs, save one
//! mutation at a time.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use kakei_budget::HouseholdBudget;
use kakei_core::{EventList, FutureEvent, OverrideMap, OverrideRow, RecurringBaseline, YearMonth, Yen};

use crate::error::{Result, StoreError};
use crate::record::{AccountRecord, UserRecord, delete_row, upsert_row};

const DOC_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Abstraction over backends that hold per-user forecast data.
///
/// Writes are last-write-wins; there is no cross-session coordination.
pub trait ForecastStore {
    /// Everything stored for `user`, read in one go.
    fn load_user(&self, user: &str) -> Result<UserRecord>;

    /// Create the user if needed, otherwise replace their account metadata.
    fn save_account(&self, user: &str, account: &AccountRecord) -> Result<()>;
    fn load_account(&self, user: &str) -> Result<AccountRecord>;

    fn save_baseline(&self, user: &str, baseline: &RecurringBaseline) -> Result<()>;
    fn load_baseline(&self, user: &str) -> Result<RecurringBaseline>;

    fn save_budget(&self, user: &str, budget: &HouseholdBudget) -> Result<()>;
    fn load_budget(&self, user: &str) -> Result<Option<HouseholdBudget>>;

    fn load_events(&self, user: &str) -> Result<EventList>;
    /// Insert, or replace the event with the same id.
    fn upsert_event(&self, user: &str, event: &FutureEvent) -> Result<()>;
    /// Returns whether an event was removed.
    fn delete_event(&self, user: &str, id: &str) -> Result<bool>;

    fn load_income_overrides(&self, user: &str) -> Result<OverrideMap>;
    fn upsert_income_override(&self, user: &str, ym: YearMonth, value: Yen) -> Result<()>;
    fn delete_income_override(&self, user: &str, ym: YearMonth) -> Result<bool>;

    fn load_balance_overrides(&self, user: &str) -> Result<OverrideMap>;
    fn upsert_balance_override(&self, user: &str, ym: YearMonth, value: Yen) -> Result<()>;
    fn delete_balance_override(&self, user: &str, ym: YearMonth) -> Result<bool>;
}

/// One pretty-printed JSON document per user under `data_dir`.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn user_path(&self, user: &str) -> Result<PathBuf> {
        validate_user_id(user)?;
        Ok(self.data_dir.join(format!("{user}.{DOC_EXTENSION}")))
    }

    pub fn user_exists(&self, user: &str) -> Result<bool> {
        Ok(self.user_path(user)?.exists())
    }

    /// Full document for `user`.
    pub fn load_record(&self, user: &str) -> Result<UserRecord> {
        let path = self.user_path(user)?;
        if !path.exists() {
            return Err(StoreError::UnknownUser(user.to_string()));
        }
        let raw = fs::read_to_string(&path)?;
        let record = serde_json::from_str(&raw)?;
        debug!(user, path = %path.display(), "loaded user record");
        Ok(record)
    }

    fn write_record(&self, user: &str, record: &mut UserRecord) -> Result<()> {
        let path = self.user_path(user)?;
        record.updated_at = Utc::now();
        let data = serde_json::to_string_pretty(record)?;
        write_atomic(&path, &data)?;
        debug!(user, path = %path.display(), "saved user record");
        Ok(())
    }

    /// Load, mutate, write back.
    fn modify<T>(&self, user: &str, f: impl FnOnce(&mut UserRecord) -> T) -> Result<T> {
        let mut record = self.load_record(user)?;
        let out = f(&mut record);
        self.write_record(user, &mut record)?;
        Ok(out)
    }
}

impl ForecastStore for JsonStore {
    fn load_user(&self, user: &str) -> Result<UserRecord> {
        self.load_record(user)
    }

    fn save_account(&self, user: &str, account: &AccountRecord) -> Result<()> {
        let mut record = match self.load_record(user) {
            Ok(mut existing) => {
                existing.account = *account;
                existing
            }
            Err(StoreError::UnknownUser(_)) => {
                info!(user, "creating user record");
                UserRecord::new(*account)
            }
            Err(e) => return Err(e),
        };
        self.write_record(user, &mut record)
    }

    fn load_account(&self, user: &str) -> Result<AccountRecord> {
        Ok(self.load_record(user)?.account)
    }

    fn save_baseline(&self, user: &str, baseline: &RecurringBaseline) -> Result<()> {
        self.modify(user, |r| r.baseline = *baseline)
    }

    fn load_baseline(&self, user: &str) -> Result<RecurringBaseline> {
        Ok(self.load_record(user)?.baseline)
    }

    fn save_budget(&self, user: &str, budget: &HouseholdBudget) -> Result<()> {
        self.modify(user, |r| r.budget = Some(budget.clone()))
    }

    fn load_budget(&self, user: &str) -> Result<Option<HouseholdBudget>> {
        Ok(self.load_record(user)?.budget)
    }

    fn load_events(&self, user: &str) -> Result<EventList> {
        Ok(self.load_record(user)?.events)
    }

    fn upsert_event(&self, user: &str, event: &FutureEvent) -> Result<()> {
        self.modify(user, |r| r.events.upsert(event.clone()))
    }

    fn delete_event(&self, user: &str, id: &str) -> Result<bool> {
        self.modify(user, |r| r.events.delete(id).is_some())
    }

    fn load_income_overrides(&self, user: &str) -> Result<OverrideMap> {
        Ok(OverrideMap::from_rows(self.load_record(user)?.income_overrides))
    }

    fn upsert_income_override(&self, user: &str, ym: YearMonth, value: Yen) -> Result<()> {
        self.modify(user, |r| upsert_row(&mut r.income_overrides, row(ym, value)))
    }

    fn delete_income_override(&self, user: &str, ym: YearMonth) -> Result<bool> {
        self.modify(user, |r| delete_row(&mut r.income_overrides, ym.year(), ym.month()))
    }

    fn load_balance_overrides(&self, user: &str) -> Result<OverrideMap> {
        Ok(OverrideMap::from_rows(self.load_record(user)?.balance_overrides))
    }

    fn upsert_balance_override(&self, user: &str, ym: YearMonth, value: Yen) -> Result<()> {
        self.modify(user, |r| upsert_row(&mut r.balance_overrides, row(ym, value)))
    }

    fn delete_balance_override(&self, user: &str, ym: YearMonth) -> Result<bool> {
        self.modify(user, |r| delete_row(&mut r.balance_overrides, ym.year(), ym.month()))
    }
}

fn row(ym: YearMonth, value: Yen) -> OverrideRow {
    OverrideRow {
        year: ym.year(),
        month: ym.month(),
        value,
    }
}

fn validate_user_id(user: &str) -> Result<()> {
    let ok = !user.is_empty()
        && user
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidUserId(user.to_string()))
    }
}

/// Write to a sibling temp file, then rename over the target.
fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension(TMP_SUFFIX);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_validation() {
        assert!(validate_user_id("local").is_ok());
        assert!(validate_user_id("user_01-a").is_ok());
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("../etc").is_err());
        assert!(validate_user_id("a b").is_err());
    }
}
