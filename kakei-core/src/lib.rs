//! kakei-core: forecast projection engine and the types it runs on.
//!
//! Everything here is pure computation. Loading and saving state is the
//! caller's job (see `kakei-store`).

pub mod event;
pub mod forecast;
pub mod month;
pub mod overrides;
pub mod summary;

/// Whole yen. Baseline and event amounts are non-negative; nets and balances
/// may go below zero.
pub type Yen = i64;

pub use event::{EventCategory, EventKind, EventList, EventPatch, FutureEvent};
pub use forecast::{
    AccountContext, ForecastWindow, MonthSnapshot, RecurringBaseline, is_past_month,
    project_forecast, project_forecast_with,
};
pub use month::{YearMonth, parse_year_month};
pub use overrides::{
    OverrideChange, OverrideMap, OverrideRow, clear_override, set_balance_override,
    set_income_override,
};
pub use summary::{ForecastSummary, YearTotals, group_by_year, year_totals};
