//! Per-month manual overrides for income and ending balance.
//!
//! Both kinds share one map type; they differ only in how they are set:
//! - income overrides normalize away when they equal the baseline income,
//! - balance overrides are always stored, even if they happen to match the
//!   naturally accumulated balance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Yen;
use crate::month::YearMonth;

/// What a `set_*` call did to the map. Lets the persistence layer mirror
/// the change (upsert vs delete) without diffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideChange {
    Inserted,
    Updated,
    Removed,
    Unchanged,
}

/// A stored override row, as persisted: `(year, month) -> value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRow {
    pub year: i32,
    pub month: u32,
    pub value: Yen,
}

/// Ordered `YearMonth -> Yen` map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideMap {
    entries: BTreeMap<YearMonth, Yen>,
}

impl OverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted rows. Rows whose month is not a real calendar
    /// month are dropped; they could never match a projected month anyway.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = OverrideRow>,
    {
        let mut map = Self::new();
        for row in rows {
            match YearMonth::new(row.year, row.month) {
                Some(ym) => {
                    map.entries.insert(ym, row.value);
                }
                None => warn!(year = row.year, month = row.month, "ignoring override with invalid month"),
            }
        }
        map
    }

    pub fn to_rows(&self) -> Vec<OverrideRow> {
        self.entries
            .iter()
            .map(|(ym, value)| OverrideRow {
                year: ym.year(),
                month: ym.month(),
                value: *value,
            })
            .collect()
    }

    pub fn get(&self, ym: YearMonth) -> Option<Yen> {
        self.entries.get(&ym).copied()
    }

    pub fn contains(&self, ym: YearMonth) -> bool {
        self.entries.contains_key(&ym)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (YearMonth, Yen)> + '_ {
        self.entries.iter().map(|(ym, v)| (*ym, *v))
    }

    /// Insert or replace.
    pub fn upsert(&mut self, ym: YearMonth, value: Yen) -> OverrideChange {
        match self.entries.insert(ym, value) {
            None => OverrideChange::Inserted,
            Some(old) if old == value => OverrideChange::Unchanged,
            Some(_) => OverrideChange::Updated,
        }
    }

    pub fn remove(&mut self, ym: YearMonth) -> OverrideChange {
        match self.entries.remove(&ym) {
            Some(_) => OverrideChange::Removed,
            None => OverrideChange::Unchanged,
        }
    }
}

impl FromIterator<(YearMonth, Yen)> for OverrideMap {
    fn from_iter<I: IntoIterator<Item = (YearMonth, Yen)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Set the income for one month.
///
/// A value equal to the baseline income is not stored: any existing override
/// for that month is removed so the month falls back to the baseline.
pub fn set_income_override(
    overrides: &mut OverrideMap,
    baseline_income: Yen,
    ym: YearMonth,
    value: Yen,
) -> OverrideChange {
    if value == baseline_income {
        overrides.remove(ym)
    } else {
        overrides.upsert(ym, value)
    }
}

/// Force the ending balance of one month. Always stored.
pub fn set_balance_override(overrides: &mut OverrideMap, ym: YearMonth, value: Yen) -> OverrideChange {
    overrides.upsert(ym, value)
}

/// Drop an override of either kind.
pub fn clear_override(overrides: &mut OverrideMap, ym: YearMonth) -> OverrideChange {
    overrides.remove(ym)
}
