use anyhow::{Context, Result, bail};
use chrono::Utc;
use std::io::{self, BufRead, Write};
use tracing::info;

use kakei_budget::{CategoryEntry, FixedCategory, HouseholdBudget, INCOME_PRESETS, IncomeBucket};
use kakei_core::Yen;
use kakei_store::{AccountRecord, ForecastStore, JsonStore, StoreError};

use crate::amount::{format_yen, parse_non_negative_yen, parse_yen};

/// What the wizard collected.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupAnswers {
    pub budget: HouseholdBudget,
    pub current_balance: Yen,
}

struct Prompter<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.out, "{}: ", label)?;
        self.out.flush().ok();
        let mut s = String::new();
        if self.input.read_line(&mut s)? == 0 {
            bail!("input closed during setup");
        }
        Ok(s.trim().to_string())
    }

    /// Re-asks until the answer parses. Blank takes `default` when there is one.
    fn prompt_amount(
        &mut self,
        label: &str,
        default: Option<Yen>,
        parse: fn(&str) -> Result<Yen>,
    ) -> Result<Yen> {
        let label = match default {
            Some(d) => format!("{label} [{}]", format_yen(d)),
            None => label.to_string(),
        };
        loop {
            let answer = self.prompt(&label)?;
            if answer.is_empty() {
                if let Some(d) = default {
                    return Ok(d);
                }
                writeln!(self.out, "  please enter an amount")?;
                continue;
            }
            match parse(&answer) {
                Ok(v) => return Ok(v),
                Err(e) => writeln!(self.out, "  {e}")?,
            }
        }
    }
}

/// Walk through income, each fixed category, subscriptions, variable
/// spending and the current balance. Category prompts default to the
/// suggestion for the user's income bucket.
pub fn run_wizard<R: BufRead, W: Write>(input: R, out: W) -> Result<SetupAnswers> {
    let mut p = Prompter { input, out };

    writeln!(p.out, "kakei setup\n")?;
    let presets: Vec<String> = INCOME_PRESETS.iter().map(|v| format_yen(*v)).collect();
    writeln!(p.out, "Common incomes: {}", presets.join(", "))?;
    let income = p.prompt_amount("Monthly take-home income", None, parse_non_negative_yen)?;

    let bucket = IncomeBucket::for_income(income);
    let mut budget = HouseholdBudget::with_defaults(income);
    writeln!(
        p.out,
        "\nSuggested amounts are for incomes of about {}. Press enter to accept.\n",
        format_yen(bucket.representative)
    )?;

    for category in FixedCategory::ALL {
        let suggested = bucket.defaults.amount(category);
        let amount = p.prompt_amount(category.label(), Some(suggested), parse_non_negative_yen)?;
        if amount > category.slider_max() {
            writeln!(
                p.out,
                "  note: {} is above the usual maximum of {}",
                format_yen(amount),
                format_yen(category.slider_max())
            )?;
        }
        *budget.entry_mut(category) = CategoryEntry::rough(amount);
    }

    budget.subscriptions.rough = p.prompt_amount(
        "Subscriptions (monthly total)",
        Some(bucket.defaults.subscriptions),
        parse_non_negative_yen,
    )?;
    let variable = p.prompt_amount(
        "Variable spending (food, shopping)",
        Some(bucket.defaults.variable_expenses),
        parse_non_negative_yen,
    )?;
    budget.variable_expenses = CategoryEntry::rough(variable);
    budget.completed_wizard = true;

    let current_balance = p.prompt_amount("Current savings balance", Some(0), parse_yen)?;

    Ok(SetupAnswers {
        budget,
        current_balance,
    })
}

/// Persist wizard answers. Re-running setup keeps the original creation date
/// and every event and override.
pub fn save_answers(store: &JsonStore, user: &str, answers: &SetupAnswers) -> Result<()> {
    let created_at = match store.load_account(user) {
        Ok(existing) => existing.created_at,
        Err(StoreError::UnknownUser(_)) => Utc::now(),
        Err(e) => return Err(e).with_context(|| format!("load account for '{user}'")),
    };
    let account = AccountRecord::new(created_at, answers.current_balance);
    store
        .save_account(user, &account)
        .and_then(|_| store.save_budget(user, &answers.budget))
        .and_then(|_| store.save_baseline(user, &answers.budget.baseline()))
        .context("save failed, please retry")?;
    info!(user, "setup saved");
    Ok(())
}

pub fn run_setup(store: &JsonStore, user: &str) -> Result<()> {
    let stdin = io::stdin();
    let answers = run_wizard(stdin.lock(), io::stdout())?;
    save_answers(store, user, &answers)?;

    let s = answers.budget.summary();
    println!("\nSaved for user '{user}':");
    println!("- income    {}", format_yen(s.income));
    println!("- fixed     {}", format_yen(s.fixed));
    println!("- variable  {}", format_yen(s.variable));
    println!("- remaining {}", format_yen(s.remaining));

    println!("\nNext:");
    println!("- kakei forecast");
    println!("- kakei event add \"Trip\" 2026-08 80000");
    Ok(())
}
