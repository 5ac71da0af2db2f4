//! Forecast projection: baseline + events + overrides -> monthly snapshots.
//!
//! The projection is a pure function of its inputs. Callers load state,
//! apply mutations, and simply re-run it; the window is at most
//! `lookback + horizon` months so full recomputation is cheap.
//!
//! Window policy:
//! - month 0 is the month containing `today`
//! - start at the account-creation month, but never more than
//!   `lookback_months` before month 0
//! - run through month `horizon_months - 1`
//! - never emit a month before account creation
//!
//! Accumulation (sequential, seeded with `current_balance`):
//!   net = income (override or baseline) + event income - fixed - event expense
//!   balance += net; a balance override then replaces balance outright.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::Yen;
use crate::event::{EventKind, FutureEvent};
use crate::month::YearMonth;
use crate::overrides::OverrideMap;

/// Per-run anchor: when "now" is, how much money there is now, and when the
/// account started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountContext {
    pub today: NaiveDate,
    pub account_created_at: NaiveDate,
    pub current_balance: Yen,
}

/// Recurring monthly income and the flat fixed-cost total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringBaseline {
    pub monthly_income: Yen,
    pub monthly_fixed_total: Yen,
}

impl RecurringBaseline {
    pub fn new(monthly_income: Yen, monthly_fixed_total: Yen) -> Self {
        Self {
            monthly_income,
            monthly_fixed_total,
        }
    }

    /// Net of a month with no events and no overrides.
    pub fn monthly_net(&self) -> Yen {
        self.monthly_income - self.monthly_fixed_total
    }
}

/// How far back and forward the timeline reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastWindow {
    /// Max months shown before the current month.
    pub lookback_months: u32,
    /// Months from the current month (inclusive) forward.
    pub horizon_months: u32,
}

impl Default for ForecastWindow {
    fn default() -> Self {
        Self {
            lookback_months: 12,
            horizon_months: 60,
        }
    }
}

impl ForecastWindow {
    /// Months that will be emitted, in order.
    pub fn months(&self, today: NaiveDate, account_created_at: NaiveDate) -> Vec<YearMonth> {
        let current = YearMonth::from(today);
        let created = YearMonth::from(account_created_at);

        let months_since_creation = created.months_until(current);
        let lookback = i32::try_from(self.lookback_months).unwrap_or(i32::MAX);
        let horizon = i32::try_from(self.horizon_months).unwrap_or(i32::MAX);
        let start_offset = (-months_since_creation).max(-lookback);

        debug!(
            %current,
            %created,
            months_since_creation,
            start_offset,
            horizon,
            "computed forecast window"
        );

        (start_offset..horizon)
            .map(|i| current.offset(i))
            .filter(|ym| *ym >= created)
            .collect()
    }
}

/// Computed state of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSnapshot {
    pub year: i32,
    pub month: u32,
    /// Baseline income, or the month's income override.
    pub starting_income: Yen,
    pub fixed_total: Yen,
    pub event_income_sum: Yen,
    pub event_expense_sum: Yen,
    pub net: Yen,
    /// Running balance after `net`, or the month's balance override.
    pub ending_balance: Yen,
    pub events_in_month: Vec<FutureEvent>,
    pub is_past: bool,
}

impl MonthSnapshot {
    pub fn year_month(&self) -> Option<YearMonth> {
        YearMonth::new(self.year, self.month)
    }

    pub fn has_events(&self) -> bool {
        self.event_income_sum > 0 || self.event_expense_sum > 0
    }
}

/// `year < current.year`, or same year and an earlier month.
pub fn is_past_month(ym: YearMonth, today: NaiveDate) -> bool {
    ym < YearMonth::from(today)
}

/// Project with the default 12-month lookback / 60-month horizon.
pub fn project_forecast(
    context: &AccountContext,
    baseline: &RecurringBaseline,
    events: &[FutureEvent],
    income_overrides: &OverrideMap,
    balance_overrides: &OverrideMap,
) -> Vec<MonthSnapshot> {
    project_forecast_with(
        ForecastWindow::default(),
        context,
        baseline,
        events,
        income_overrides,
        balance_overrides,
    )
}

/// Project over an explicit window.
pub fn project_forecast_with(
    window: ForecastWindow,
    context: &AccountContext,
    baseline: &RecurringBaseline,
    events: &[FutureEvent],
    income_overrides: &OverrideMap,
    balance_overrides: &OverrideMap,
) -> Vec<MonthSnapshot> {
    let months = window.months(context.today, context.account_created_at);
    let mut out = Vec::with_capacity(months.len());
    let mut balance = context.current_balance;

    for ym in months {
        let events_in_month: Vec<FutureEvent> =
            events.iter().filter(|e| e.lands_in(ym)).cloned().collect();
        let event_expense_sum = sum_kind(&events_in_month, EventKind::Expense);
        let event_income_sum = sum_kind(&events_in_month, EventKind::Income);

        let starting_income = income_overrides.get(ym).unwrap_or(baseline.monthly_income);
        let fixed_total = baseline.monthly_fixed_total;

        let net = starting_income + event_income_sum - fixed_total - event_expense_sum;
        balance += net;

        if let Some(forced) = balance_overrides.get(ym) {
            trace!(%ym, accumulated = balance, forced, "balance override applied");
            balance = forced;
        }

        out.push(MonthSnapshot {
            year: ym.year(),
            month: ym.month(),
            starting_income,
            fixed_total,
            event_income_sum,
            event_expense_sum,
            net,
            ending_balance: balance,
            events_in_month,
            is_past: is_past_month(ym, context.today),
        });
    }

    out
}

fn sum_kind(events: &[FutureEvent], kind: EventKind) -> Yen {
    events
        .iter()
        .filter(|e| e.kind == kind)
        .map(|e| e.amount)
        .sum()
}
