//! One user's loaded forecast inputs, plus persist-then-commit helpers.
//!
//! Each helper stages the change on a copy of the in-memory inputs (so the
//! engine's normalization rules decide what happens), mirrors the outcome to
//! the store as an upsert, a delete, or nothing, and only then commits the
//! copy. A failed save leaves memory as it was.

use chrono::{DateTime, TimeZone, Utc};

use kakei_core::{
    AccountContext, EventList, EventPatch, ForecastWindow, FutureEvent, MonthSnapshot,
    OverrideChange, OverrideMap, RecurringBaseline, YearMonth, Yen, clear_override,
    project_forecast_with, set_balance_override, set_income_override,
};

use crate::error::Result;
use crate::record::AccountRecord;
use crate::store::ForecastStore;

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastState {
    pub user: String,
    pub account: AccountRecord,
    pub baseline: RecurringBaseline,
    pub events: EventList,
    pub income_overrides: OverrideMap,
    pub balance_overrides: OverrideMap,
}

impl ForecastState {
    pub fn load<S: ForecastStore + ?Sized>(store: &S, user: &str) -> Result<Self> {
        let record = store.load_user(user)?;
        Ok(Self {
            user: user.to_string(),
            account: record.account,
            baseline: record.baseline,
            events: record.events,
            income_overrides: OverrideMap::from_rows(record.income_overrides),
            balance_overrides: OverrideMap::from_rows(record.balance_overrides),
        })
    }

    /// Resolve "today" and the creation date in the user's timezone.
    pub fn context_in<Tz: TimeZone>(&self, now: DateTime<Utc>, tz: &Tz) -> AccountContext {
        AccountContext {
            today: now.with_timezone(tz).date_naive(),
            account_created_at: self.account.created_at.with_timezone(tz).date_naive(),
            current_balance: self.account.current_balance,
        }
    }

    pub fn project(&self, context: &AccountContext, window: ForecastWindow) -> Vec<MonthSnapshot> {
        project_forecast_with(
            window,
            context,
            &self.baseline,
            self.events.as_slice(),
            &self.income_overrides,
            &self.balance_overrides,
        )
    }

    /// Insert, or replace the event with the same id, matching the store.
    pub fn add_event<S: ForecastStore + ?Sized>(&mut self, store: &S, event: FutureEvent) -> Result<()> {
        store.upsert_event(&self.user, &event)?;
        self.events.upsert(event);
        Ok(())
    }

    /// Returns the patched event, or `None` if `id` is unknown.
    pub fn edit_event<S: ForecastStore + ?Sized>(
        &mut self,
        store: &S,
        id: &str,
        patch: EventPatch,
    ) -> Result<Option<FutureEvent>> {
        let mut staged = self.events.clone();
        if !staged.edit(id, patch) {
            return Ok(None);
        }
        let Some(updated) = staged.get(id).cloned() else {
            return Ok(None);
        };
        store.upsert_event(&self.user, &updated)?;
        self.events = staged;
        Ok(Some(updated))
    }

    /// Unknown ids are a no-op.
    pub fn delete_event<S: ForecastStore + ?Sized>(&mut self, store: &S, id: &str) -> Result<Option<FutureEvent>> {
        if self.events.get(id).is_none() {
            return Ok(None);
        }
        store.delete_event(&self.user, id)?;
        Ok(self.events.delete(id))
    }

    pub fn set_income<S: ForecastStore + ?Sized>(
        &mut self,
        store: &S,
        ym: YearMonth,
        value: Yen,
    ) -> Result<OverrideChange> {
        let mut staged = self.income_overrides.clone();
        let change = set_income_override(&mut staged, self.baseline.monthly_income, ym, value);
        match change {
            OverrideChange::Inserted | OverrideChange::Updated => {
                store.upsert_income_override(&self.user, ym, value)?;
            }
            OverrideChange::Removed => {
                store.delete_income_override(&self.user, ym)?;
            }
            OverrideChange::Unchanged => {}
        }
        self.income_overrides = staged;
        Ok(change)
    }

    pub fn set_balance<S: ForecastStore + ?Sized>(
        &mut self,
        store: &S,
        ym: YearMonth,
        value: Yen,
    ) -> Result<OverrideChange> {
        let mut staged = self.balance_overrides.clone();
        let change = set_balance_override(&mut staged, ym, value);
        if change != OverrideChange::Unchanged {
            store.upsert_balance_override(&self.user, ym, value)?;
        }
        self.balance_overrides = staged;
        Ok(change)
    }

    pub fn clear_balance<S: ForecastStore + ?Sized>(&mut self, store: &S, ym: YearMonth) -> Result<OverrideChange> {
        let mut staged = self.balance_overrides.clone();
        let change = clear_override(&mut staged, ym);
        if change == OverrideChange::Removed {
            store.delete_balance_override(&self.user, ym)?;
        }
        self.balance_overrides = staged;
        Ok(change)
    }

    /// Replace the baseline. Existing income overrides stay as they are, even
    /// ones that now equal the new baseline income.
    pub fn set_baseline<S: ForecastStore + ?Sized>(&mut self, store: &S, baseline: RecurringBaseline) -> Result<()> {
        store.save_baseline(&self.user, &baseline)?;
        self.baseline = baseline;
        Ok(())
    }

    pub fn set_current_balance<S: ForecastStore + ?Sized>(&mut self, store: &S, balance: Yen) -> Result<()> {
        let account = AccountRecord {
            current_balance: balance,
            ..self.account
        };
        store.save_account(&self.user, &account)?;
        self.account = account;
        Ok(())
    }
}
