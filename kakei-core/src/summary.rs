//! Aggregations over a projected timeline, for year-grouped display.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Yen;
use crate::forecast::{MonthSnapshot, RecurringBaseline};
use crate::month::YearMonth;

/// Group snapshots by calendar year, preserving month order.
pub fn group_by_year(snapshots: &[MonthSnapshot]) -> BTreeMap<i32, Vec<&MonthSnapshot>> {
    let mut grouped: BTreeMap<i32, Vec<&MonthSnapshot>> = BTreeMap::new();
    for s in snapshots {
        grouped.entry(s.year).or_default().push(s);
    }
    grouped
}

/// Totals for one calendar year of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearTotals {
    pub year: i32,
    pub months: usize,
    pub income: Yen,
    pub fixed: Yen,
    pub event_income: Yen,
    pub event_expense: Yen,
    pub net: Yen,
    /// Ending balance of the last month of the year in the timeline.
    pub closing_balance: Yen,
}

impl YearTotals {
    fn from_months(year: i32, months: &[&MonthSnapshot]) -> Self {
        Self {
            year,
            months: months.len(),
            income: months.iter().map(|s| s.starting_income).sum(),
            fixed: months.iter().map(|s| s.fixed_total).sum(),
            event_income: months.iter().map(|s| s.event_income_sum).sum(),
            event_expense: months.iter().map(|s| s.event_expense_sum).sum(),
            net: months.iter().map(|s| s.net).sum(),
            closing_balance: months.last().map(|s| s.ending_balance).unwrap_or_default(),
        }
    }
}

pub fn year_totals(snapshots: &[MonthSnapshot]) -> Vec<YearTotals> {
    group_by_year(snapshots)
        .iter()
        .map(|(year, months)| YearTotals::from_months(*year, months))
        .collect()
}

/// Headline figures for the forecast screen. Event totals and balance
/// extremes only consider current and future months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub monthly_net: Yen,
    pub future_event_income: Yen,
    pub future_event_expense: Yen,
    pub final_balance: Option<Yen>,
    pub lowest_balance: Option<(YearMonth, Yen)>,
    /// First upcoming month whose ending balance is below zero.
    pub first_deficit: Option<YearMonth>,
}

impl ForecastSummary {
    pub fn from_snapshots(baseline: &RecurringBaseline, snapshots: &[MonthSnapshot]) -> Self {
        let upcoming: Vec<(YearMonth, &MonthSnapshot)> = snapshots
            .iter()
            .filter(|s| !s.is_past)
            .filter_map(|s| s.year_month().map(|ym| (ym, s)))
            .collect();

        // min_by_key keeps the first minimum; ties go to the earliest month.
        let lowest_balance = upcoming
            .iter()
            .min_by_key(|(_, s)| s.ending_balance)
            .map(|(ym, s)| (*ym, s.ending_balance));

        let first_deficit = upcoming
            .iter()
            .find(|(_, s)| s.ending_balance < 0)
            .map(|(ym, _)| *ym);

        Self {
            monthly_net: baseline.monthly_net(),
            future_event_income: upcoming.iter().map(|(_, s)| s.event_income_sum).sum(),
            future_event_expense: upcoming.iter().map(|(_, s)| s.event_expense_sum).sum(),
            final_balance: snapshots.last().map(|s| s.ending_balance),
            lowest_balance,
            first_deficit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(year: i32, month: u32, net: Yen, ending: Yen, past: bool) -> MonthSnapshot {
        MonthSnapshot {
            year,
            month,
            starting_income: 100,
            fixed_total: 100 - net,
            event_income_sum: 0,
            event_expense_sum: 0,
            net,
            ending_balance: ending,
            events_in_month: vec![],
            is_past: past,
        }
    }

    #[test]
    fn test_group_by_year_keeps_order() {
        let data = vec![
            snap(2025, 11, 1, 1, true),
            snap(2025, 12, 1, 2, true),
            snap(2026, 1, 1, 3, false),
        ];
        let grouped = group_by_year(&data);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&2025].iter().map(|s| s.month).collect::<Vec<_>>(), vec![11, 12]);
        assert_eq!(grouped[&2026].len(), 1);
    }

    #[test]
    fn test_year_totals() {
        let data = vec![
            snap(2025, 12, 10, 110, true),
            snap(2026, 1, -30, 80, false),
            snap(2026, 2, 20, 100, false),
        ];
        let totals = year_totals(&data);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[1].year, 2026);
        assert_eq!(totals[1].months, 2);
        assert_eq!(totals[1].net, -10);
        assert_eq!(totals[1].income, 200);
        assert_eq!(totals[1].closing_balance, 100);
    }

    #[test]
    fn test_summary_ignores_past_months_for_extremes() {
        let data = vec![
            snap(2025, 12, -500, -400, true),
            snap(2026, 1, -50, 50, false),
            snap(2026, 2, -60, -10, false),
            snap(2026, 3, -60, -10, false),
            snap(2026, 4, 100, 90, false),
        ];
        let baseline = RecurringBaseline::new(300, 250);
        let summary = ForecastSummary::from_snapshots(&baseline, &data);

        assert_eq!(summary.monthly_net, 50);
        assert_eq!(summary.final_balance, Some(90));
        assert_eq!(summary.lowest_balance, Some((YearMonth::new(2026, 2).unwrap(), -10)));
        assert_eq!(summary.first_deficit, YearMonth::new(2026, 2));
    }

    #[test]
    fn test_summary_of_empty_timeline() {
        let summary = ForecastSummary::from_snapshots(&RecurringBaseline::default(), &[]);
        assert_eq!(summary.final_balance, None);
        assert_eq!(summary.lowest_balance, None);
        assert_eq!(summary.first_deficit, None);
    }
}
