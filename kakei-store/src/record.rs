//! On-disk shape of one user's data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kakei_budget::HouseholdBudget;
use kakei_core::{EventList, OverrideRow, RecurringBaseline, Yen};

/// Account metadata the forecast window depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub created_at: DateTime<Utc>,
    /// Balance as of the last time the user entered it.
    pub current_balance: Yen,
}

impl AccountRecord {
    pub fn new(created_at: DateTime<Utc>, current_balance: Yen) -> Self {
        Self {
            created_at,
            current_balance,
        }
    }
}

/// Everything persisted for one user. Override rows mirror the
/// `(user, year, month) -> value` tables of a relational backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub account: AccountRecord,
    #[serde(default)]
    pub baseline: RecurringBaseline,
    #[serde(default)]
    pub budget: Option<HouseholdBudget>,
    #[serde(default)]
    pub events: EventList,
    #[serde(default)]
    pub income_overrides: Vec<OverrideRow>,
    #[serde(default)]
    pub balance_overrides: Vec<OverrideRow>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(account: AccountRecord) -> Self {
        Self {
            account,
            baseline: RecurringBaseline::default(),
            budget: None,
            events: EventList::new(),
            income_overrides: Vec::new(),
            balance_overrides: Vec::new(),
            updated_at: account.created_at,
        }
    }
}

/// Insert or replace the row for `(year, month)`.
pub(crate) fn upsert_row(rows: &mut Vec<OverrideRow>, row: OverrideRow) {
    match rows
        .iter_mut()
        .find(|r| r.year == row.year && r.month == row.month)
    {
        Some(existing) => existing.value = row.value,
        None => rows.push(row),
    }
}

/// Remove the row for `(year, month)`. Returns whether one existed.
pub(crate) fn delete_row(rows: &mut Vec<OverrideRow>, year: i32, month: u32) -> bool {
    let before = rows.len();
    rows.retain(|r| !(r.year == year && r.month == month));
    rows.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_and_delete_rows() {
        let mut rows = Vec::new();
        upsert_row(&mut rows, OverrideRow { year: 2026, month: 1, value: 1 });
        upsert_row(&mut rows, OverrideRow { year: 2026, month: 2, value: 2 });
        upsert_row(&mut rows, OverrideRow { year: 2026, month: 1, value: 3 });
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value, 3);

        assert!(delete_row(&mut rows, 2026, 2));
        assert!(!delete_row(&mut rows, 2026, 2));
        assert_eq!(rows.len(), 1);
    }
}
