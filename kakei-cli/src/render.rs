//! Text, CSV and JSON views of a projected timeline.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::io;

use kakei_budget::{FixedCategory, HouseholdBudget};
use kakei_core::{
    EventKind, ForecastSummary, FutureEvent, MonthSnapshot, RecurringBaseline, group_by_year,
    year_totals,
};

use crate::amount::format_yen;

/// Snapshots grouped under one header per year.
///
/// Past months carry a `(past)` marker; months ending below zero are flagged
/// with `!`.
pub fn render_forecast(snapshots: &[MonthSnapshot], only_year: Option<i32>) -> String {
    let mut out = String::new();
    let totals = year_totals(snapshots);

    for (year, months) in group_by_year(snapshots) {
        if only_year.is_some_and(|y| y != year) {
            continue;
        }
        let _ = writeln!(out, "== {year} ==");
        for s in months {
            let marker = if s.is_past { " (past)" } else { "" };
            let flag = if s.ending_balance < 0 { " !" } else { "" };
            let _ = writeln!(
                out,
                "{}-{:02}{:<7} income {:>12}  fixed {:>12}  events {:>12} / {:>12}  net {:>12}  balance {:>14}{}",
                s.year,
                s.month,
                marker,
                format_yen(s.starting_income),
                format_yen(s.fixed_total),
                format!("+{}", format_yen(s.event_income_sum)),
                format!("-{}", format_yen(s.event_expense_sum)),
                format_yen(s.net),
                format_yen(s.ending_balance),
                flag,
            );
            for e in &s.events_in_month {
                let _ = writeln!(out, "    - {}", describe_event(e));
            }
        }
        if let Some(t) = totals.iter().find(|t| t.year == year) {
            let _ = writeln!(
                out,
                "   {} months, net {}, closing {}\n",
                t.months,
                format_yen(t.net),
                format_yen(t.closing_balance)
            );
        }
    }

    if out.is_empty() {
        out.push_str("(no months to show)\n");
    }
    out
}

pub fn describe_event(e: &FutureEvent) -> String {
    let sign = match e.kind {
        EventKind::Income => '+',
        EventKind::Expense => '-',
    };
    format!(
        "[{}] {} {}{} ({})",
        e.id,
        e.label,
        sign,
        format_yen(e.amount),
        e.category.label()
    )
}

pub fn render_events(events: &[FutureEvent]) -> String {
    if events.is_empty() {
        return "(no events)\n".to_string();
    }
    let mut sorted: Vec<&FutureEvent> = events.iter().collect();
    sorted.sort_by_key(|e| (e.year, e.month));
    let mut out = String::new();
    for e in sorted {
        let _ = writeln!(out, "{}-{:02}  {}", e.year, e.month, describe_event(e));
    }
    out
}

pub fn render_summary(
    budget: Option<&HouseholdBudget>,
    baseline: &RecurringBaseline,
    summary: &ForecastSummary,
) -> String {
    let mut out = String::new();

    if let Some(b) = budget {
        let _ = writeln!(out, "# Budget\n");
        for category in FixedCategory::ALL {
            let amount = b.category_amount(category);
            if amount != 0 {
                let _ = writeln!(out, "{:<20} {:>12}", category.label(), format_yen(amount));
            }
        }
        let subs = b.subscriptions.amount();
        if subs != 0 {
            let _ = writeln!(out, "{:<20} {:>12}", "Subscriptions", format_yen(subs));
        }
        for c in &b.custom_expenses {
            let _ = writeln!(out, "{:<20} {:>12}", c.name, format_yen(c.amount));
        }
        let s = b.summary();
        let _ = writeln!(out, "{:<20} {:>12}", "Variable expenses", format_yen(s.variable));
        let _ = writeln!(out, "\nIncome {}  fixed {}  variable {}  remaining {}\n",
            format_yen(s.income),
            format_yen(s.fixed),
            format_yen(s.variable),
            format_yen(s.remaining),
        );
    }

    let _ = writeln!(out, "# Forecast\n");
    let _ = writeln!(
        out,
        "Baseline: income {} / fixed {} (net {} per month)",
        format_yen(baseline.monthly_income),
        format_yen(baseline.monthly_fixed_total),
        format_yen(summary.monthly_net)
    );
    let _ = writeln!(
        out,
        "Upcoming events: +{} / -{}",
        format_yen(summary.future_event_income),
        format_yen(summary.future_event_expense)
    );
    if let Some(balance) = summary.final_balance {
        let _ = writeln!(out, "Balance at end of horizon: {}", format_yen(balance));
    }
    if let Some((ym, balance)) = summary.lowest_balance {
        let _ = writeln!(out, "Lowest balance: {} in {ym}", format_yen(balance));
    }
    match summary.first_deficit {
        Some(ym) => {
            let _ = writeln!(out, "Warning: balance goes negative in {ym}");
        }
        None => {
            let _ = writeln!(out, "Balance stays non-negative over the horizon");
        }
    }
    out
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    year: i32,
    month: u32,
    past: bool,
    income: i64,
    fixed: i64,
    event_income: i64,
    event_expense: i64,
    net: i64,
    ending_balance: i64,
    events: &'a str,
}

/// One row per month. Event labels are joined with `; `.
pub fn write_csv<W: io::Write>(snapshots: &[MonthSnapshot], w: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    for s in snapshots {
        let labels = s
            .events_in_month
            .iter()
            .map(|e| e.label.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        wtr.serialize(CsvRow {
            year: s.year,
            month: s.month,
            past: s.is_past,
            income: s.starting_income,
            fixed: s.fixed_total,
            event_income: s.event_income_sum,
            event_expense: s.event_expense_sum,
            net: s.net,
            ending_balance: s.ending_balance,
            events: &labels,
        })
        .context("write csv row")?;
    }
    wtr.flush().context("flush csv")?;
    Ok(())
}

pub fn to_json(snapshots: &[MonthSnapshot]) -> Result<String> {
    serde_json::to_string_pretty(snapshots).context("serialize forecast")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kakei_core::YearMonth;

    fn snap(year: i32, month: u32, ending_balance: i64, is_past: bool) -> MonthSnapshot {
        MonthSnapshot {
            year,
            month,
            starting_income: 300_000,
            fixed_total: 250_000,
            event_income_sum: 0,
            event_expense_sum: 0,
            net: 50_000,
            ending_balance,
            events_in_month: Vec::new(),
            is_past,
        }
    }

    #[test]
    fn test_forecast_groups_by_year_and_marks_rows() {
        let mut dec = snap(2025, 12, -10_000, true);
        dec.events_in_month.push(FutureEvent::new(
            "e1",
            "Trip",
            YearMonth::new(2025, 12).unwrap(),
            80_000,
            EventKind::Expense,
        ));
        let snaps = vec![dec, snap(2026, 1, 40_000, false)];

        let text = render_forecast(&snaps, None);
        assert!(text.contains("== 2025 =="));
        assert!(text.contains("== 2026 =="));
        assert!(text.contains("2025-12 (past)"));
        assert!(text.contains("-¥10,000 !"));
        assert!(text.contains("[e1] Trip -¥80,000"));
        assert!(!text.contains("2026-01 (past)"));

        let only = render_forecast(&snaps, Some(2026));
        assert!(!only.contains("== 2025 =="));
        assert!(render_forecast(&snaps, Some(1999)).contains("no months"));
    }

    #[test]
    fn test_csv_export() {
        let mut s = snap(2026, 3, 1_050_000, false);
        s.events_in_month.push(FutureEvent::new(
            "e1",
            "Trip",
            YearMonth::new(2026, 3).unwrap(),
            1,
            EventKind::Expense,
        ));
        s.events_in_month.push(FutureEvent::new(
            "e2",
            "Gift",
            YearMonth::new(2026, 3).unwrap(),
            1,
            EventKind::Expense,
        ));

        let mut buf = Vec::new();
        write_csv(&[s], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("year,month,past,income,fixed,event_income,event_expense,net,ending_balance,events")
        );
        assert_eq!(
            lines.next(),
            Some("2026,3,false,300000,250000,0,0,50000,1050000,Trip; Gift")
        );
    }

    #[test]
    fn test_json_export_is_an_array() {
        let json = to_json(&[snap(2026, 1, 0, false)]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v.as_array().map(Vec::len), Some(1));
        assert_eq!(v[0]["ending_balance"], 0);
    }

    #[test]
    fn test_summary_warns_on_deficit() {
        let baseline = RecurringBaseline::new(200_000, 250_000);
        let snaps = vec![snap(2026, 1, 10_000, false), snap(2026, 2, -40_000, false)];
        let summary = ForecastSummary::from_snapshots(&baseline, &snaps);
        let text = render_summary(None, &baseline, &summary);
        assert!(text.contains("balance goes negative in 2026-02"));
        assert!(!text.contains("# Budget"));

        let budget = HouseholdBudget::with_defaults(300_000);
        let text = render_summary(Some(&budget), &budget.baseline(), &summary);
        assert!(text.contains("# Budget"));
        assert!(text.contains("Rent"));
    }
}
