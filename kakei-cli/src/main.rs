use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use kakei_core::{
    EventCategory, EventKind, EventPatch, ForecastSummary, FutureEvent, OverrideChange,
    RecurringBaseline, YearMonth, Yen,
};
use kakei_store::{ForecastState, ForecastStore, JsonStore};

mod amount;
mod budget_cmd;
mod config;
mod render;
mod setup;
mod state;

use amount::{format_yen, label_arg, month_arg, non_negative_yen_arg, positive_yen_arg, yen_arg};
use config::Config;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("KAKEI_BUILD_SHA"), ")");
const SAVE_FAILED: &str = "save failed, please retry";

#[derive(Parser, Debug)]
#[command(name = "kakei", version, long_version = LONG_VERSION, about = "Household budget forecasting")]
struct Cli {
    /// User id to operate on (default: account.default_user from config)
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive setup: income, recurring costs and current balance
    Setup,

    /// Project the balance month by month, grouped by year
    Forecast {
        /// Only print this year
        #[arg(long)]
        year: Option<i32>,

        /// Also write the full timeline as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Budget breakdown and forecast headline figures
    Summary,

    /// Itemize the household budget; every change re-derives the baseline
    Budget {
        #[command(subcommand)]
        command: budget_cmd::BudgetCommand,
    },

    /// One-off income and expenses
    Event {
        #[command(subcommand)]
        command: EventCommand,
    },

    /// Per-month income overrides
    Income {
        #[command(subcommand)]
        command: IncomeCommand,
    },

    /// Per-month ending-balance overrides
    Balance {
        #[command(subcommand)]
        command: BalanceCommand,
    },

    /// Show or change recurring income, fixed costs and current balance
    Baseline {
        #[arg(long, value_parser = non_negative_yen_arg)]
        income: Option<Yen>,

        #[arg(long, value_parser = non_negative_yen_arg)]
        fixed: Option<Yen>,

        #[arg(long, value_parser = yen_arg, allow_negative_numbers = true)]
        balance: Option<Yen>,
    },

    /// Manage ~/.kakei/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum EventCommand {
    /// Add an event (e.g. `kakei event add Trip 2026-08 80000`)
    Add {
        #[arg(value_parser = label_arg)]
        label: String,
        #[arg(value_parser = month_arg)]
        month: YearMonth,
        #[arg(value_parser = positive_yen_arg)]
        amount: Yen,
        #[arg(long, value_enum, default_value_t = KindArg::Expense)]
        kind: KindArg,
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
    },

    /// Change fields of an existing event
    Edit {
        id: String,
        #[arg(long, value_parser = label_arg)]
        label: Option<String>,
        #[arg(long, value_parser = month_arg)]
        month: Option<YearMonth>,
        #[arg(long, value_parser = positive_yen_arg)]
        amount: Option<Yen>,
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
    },

    /// Delete an event by id
    Delete { id: String },

    /// List events by month
    List,
}

#[derive(Subcommand, Debug)]
enum IncomeCommand {
    /// Set one month's income; the baseline amount removes the override
    Set {
        #[arg(value_parser = month_arg)]
        month: YearMonth,
        #[arg(value_parser = non_negative_yen_arg)]
        amount: Yen,
    },
}

#[derive(Subcommand, Debug)]
enum BalanceCommand {
    /// Force one month's ending balance
    Set {
        #[arg(value_parser = month_arg)]
        month: YearMonth,
        #[arg(value_parser = yen_arg, allow_negative_numbers = true)]
        amount: Yen,
    },

    /// Remove a month's balance override
    Clear {
        #[arg(value_parser = month_arg)]
        month: YearMonth,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Income,
    Expense,
}

impl From<KindArg> for EventKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Income => EventKind::Income,
            KindArg::Expense => EventKind::Expense,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CategoryArg {
    Travel,
    Gift,
    Hobby,
    Life,
    Bonus,
    Salary,
    Other,
}

impl From<CategoryArg> for EventCategory {
    fn from(c: CategoryArg) -> Self {
        match c {
            CategoryArg::Travel => EventCategory::Travel,
            CategoryArg::Gift => EventCategory::Gift,
            CategoryArg::Hobby => EventCategory::Hobby,
            CategoryArg::Life => EventCategory::Life,
            CategoryArg::Bonus => EventCategory::Bonus,
            CategoryArg::Salary => EventCategory::Salary,
            CategoryArg::Other => EventCategory::Other,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Command::Config { command } = &cli.command {
        return match command {
            ConfigCommand::Init => config::init_config(),
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
                Ok(())
            }
        };
    }

    let cfg = config::load_config()?;
    let user = cli
        .user
        .clone()
        .unwrap_or_else(|| cfg.account.default_user.clone());
    let store = state::open_store(&cfg)?;
    debug!(user = %user, data_dir = %store.data_dir().display(), "resolved store");

    match cli.command {
        Command::Setup => setup::run_setup(&store, &user)?,

        Command::Forecast { year, csv, json } => {
            let st = state::load_state(&store, &user)?;
            let ctx = state::current_context(&st, &cfg)?;
            let snapshots = st.project(&ctx, cfg.forecast.window());

            if let Some(path) = csv {
                let file =
                    File::create(&path).with_context(|| format!("create {}", path.display()))?;
                render::write_csv(&snapshots, file)?;
                eprintln!("Wrote {} months to {}", snapshots.len(), path.display());
            }

            if json {
                let shown: Vec<_> = snapshots
                    .into_iter()
                    .filter(|s| year.is_none_or(|y| y == s.year))
                    .collect();
                println!("{}", render::to_json(&shown)?);
            } else {
                print!("{}", render::render_forecast(&snapshots, year));
            }
        }

        Command::Summary => {
            let st = state::load_state(&store, &user)?;
            let ctx = state::current_context(&st, &cfg)?;
            let snapshots = st.project(&ctx, cfg.forecast.window());
            let summary = ForecastSummary::from_snapshots(&st.baseline, &snapshots);
            let budget = store
                .load_budget(&user)
                .with_context(|| format!("load budget for '{user}'"))?;
            print!("{}", render::render_summary(budget.as_ref(), &st.baseline, &summary));
        }

        Command::Budget { command } => budget_cmd::run(&store, &user, command)?,

        Command::Event { command } => {
            let mut st = state::load_state(&store, &user)?;
            run_event(&mut st, &store, command)?;
            print_outlook(&st, &cfg)?;
        }

        Command::Income {
            command: IncomeCommand::Set { month, amount },
        } => {
            let mut st = state::load_state(&store, &user)?;
            let change = st.set_income(&store, month, amount).context(SAVE_FAILED)?;
            match change {
                OverrideChange::Removed => {
                    println!("{month}: income matches baseline, override removed")
                }
                OverrideChange::Unchanged => println!("{month}: unchanged"),
                _ => println!("{month}: income set to {}", format_yen(amount)),
            }
            print_outlook(&st, &cfg)?;
        }

        Command::Balance { command } => {
            let mut st = state::load_state(&store, &user)?;
            match command {
                BalanceCommand::Set { month, amount } => {
                    st.set_balance(&store, month, amount).context(SAVE_FAILED)?;
                    println!("{month}: ending balance forced to {}", format_yen(amount));
                }
                BalanceCommand::Clear { month } => {
                    let change = st.clear_balance(&store, month).context(SAVE_FAILED)?;
                    if change == OverrideChange::Removed {
                        println!("{month}: balance override cleared");
                    } else {
                        println!("{month}: no balance override");
                    }
                }
            }
            print_outlook(&st, &cfg)?;
        }

        Command::Baseline {
            income,
            fixed,
            balance,
        } => {
            let mut st = state::load_state(&store, &user)?;
            if income.is_some() || fixed.is_some() {
                let baseline = RecurringBaseline::new(
                    income.unwrap_or(st.baseline.monthly_income),
                    fixed.unwrap_or(st.baseline.monthly_fixed_total),
                );
                st.set_baseline(&store, baseline).context(SAVE_FAILED)?;
            }
            if let Some(b) = balance {
                st.set_current_balance(&store, b).context(SAVE_FAILED)?;
            }
            println!(
                "income {}  fixed {}  net {}  current balance {}",
                format_yen(st.baseline.monthly_income),
                format_yen(st.baseline.monthly_fixed_total),
                format_yen(st.baseline.monthly_net()),
                format_yen(st.account.current_balance)
            );
        }

        Command::Config { .. } => {}
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("KAKEI_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_event(st: &mut ForecastState, store: &JsonStore, command: EventCommand) -> Result<()> {
    match command {
        EventCommand::Add {
            label,
            month,
            amount,
            kind,
            category,
        } => {
            let kind = EventKind::from(kind);
            let category = resolve_category(kind, category.map(EventCategory::from))?;
            let id = uuid::Uuid::new_v4().to_string();
            let event = FutureEvent::new(id, label, month, amount, kind).with_category(category);
            let line = render::describe_event(&event);
            st.add_event(store, event).context(SAVE_FAILED)?;
            println!("Added {month} {line}");
        }

        EventCommand::Edit {
            id,
            label,
            month,
            amount,
            kind,
            category,
        } => {
            let Some(current) = st.events.get(&id) else {
                bail!("no event with id '{id}'");
            };
            let new_kind = kind.map(EventKind::from).unwrap_or(current.kind);
            let category = match category {
                Some(c) => Some(resolve_category(new_kind, Some(c.into()))?),
                // Switching kind drops a category that no longer applies.
                None if !EventCategory::for_kind(new_kind).contains(&current.category) => {
                    Some(EventCategory::default_for(new_kind))
                }
                None => None,
            };
            let patch = EventPatch {
                label,
                year: month.map(|m| m.year()),
                month: month.map(|m| m.month()),
                amount,
                kind: kind.map(EventKind::from),
                category,
            };
            match st.edit_event(store, &id, patch).context(SAVE_FAILED)? {
                Some(e) => println!("Updated {}-{:02} {}", e.year, e.month, render::describe_event(&e)),
                None => bail!("no event with id '{id}'"),
            }
        }

        EventCommand::Delete { id } => match st.delete_event(store, &id).context(SAVE_FAILED)? {
            Some(e) => println!("Deleted {}", render::describe_event(&e)),
            None => println!("No event with id '{id}'"),
        },

        EventCommand::List => {
            print!("{}", render::render_events(st.events.as_slice()));
        }
    }
    Ok(())
}

fn resolve_category(kind: EventKind, category: Option<EventCategory>) -> Result<EventCategory> {
    match category {
        None => Ok(EventCategory::default_for(kind)),
        Some(c) if EventCategory::for_kind(kind).contains(&c) => Ok(c),
        Some(c) => bail!("category '{}' does not apply to {:?} events", c.label(), kind),
    }
}

/// One-line recap after a mutation: where the balance ends up and whether it
/// dips below zero.
fn print_outlook(st: &ForecastState, cfg: &Config) -> Result<()> {
    let ctx = state::current_context(st, cfg)?;
    let snapshots = st.project(&ctx, cfg.forecast.window());
    let summary = ForecastSummary::from_snapshots(&st.baseline, &snapshots);

    let mut out = io::stdout().lock();
    if let Some(last) = snapshots.last() {
        write!(out, "Balance in {}-{:02}: {}", last.year, last.month, format_yen(last.ending_balance))?;
    }
    if let Some(ym) = summary.first_deficit {
        write!(out, "  (goes negative in {ym})")?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_negative_balance() {
        let cli = Cli::try_parse_from(["kakei", "balance", "set", "2026-03", "-50000"]).unwrap();
        match cli.command {
            Command::Balance {
                command: BalanceCommand::Set { month, amount },
            } => {
                assert_eq!(month, YearMonth::new(2026, 3).unwrap());
                assert_eq!(amount, -50_000);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_negative_event_amount() {
        assert!(Cli::try_parse_from(["kakei", "event", "add", "Trip", "2026-08", "-1"]).is_err());
    }

    #[test]
    fn test_rejects_zero_event_amount() {
        assert!(Cli::try_parse_from(["kakei", "event", "add", "Trip", "2026-08", "0"]).is_err());
        assert!(Cli::try_parse_from(["kakei", "event", "edit", "abc", "--amount", "0"]).is_err());
    }

    #[test]
    fn test_rejects_blank_event_labels() {
        assert!(Cli::try_parse_from(["kakei", "event", "add", "  ", "2026-08", "1000"]).is_err());
        assert!(Cli::try_parse_from(["kakei", "event", "edit", "abc", "--label", "   "]).is_err());

        let cli = Cli::try_parse_from(["kakei", "event", "edit", "abc", "--label", " Trip "]).unwrap();
        match cli.command {
            Command::Event {
                command: EventCommand::Edit { label, .. },
            } => assert_eq!(label.as_deref(), Some("Trip")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_oversized_amounts() {
        assert!(
            Cli::try_parse_from(["kakei", "income", "set", "2026-03", "9223372036854775807"]).is_err()
        );
        assert!(Cli::try_parse_from(["kakei", "baseline", "--income", "9223372036854775807"]).is_err());
        assert!(Cli::try_parse_from(["kakei", "baseline", "--income", "1000000000000000"]).is_ok());
    }

    #[test]
    fn test_parses_budget_commands() {
        let cli = Cli::try_parse_from(["kakei", "budget", "item", "add", "utilities", "Gas", "4,000"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Budget {
                command: budget_cmd::BudgetCommand::Edit(budget_cmd::BudgetEdit::Item { .. })
            }
        ));
        assert!(Cli::try_parse_from(["kakei", "budget", "presets", "--category", "music"]).is_ok());
        assert!(Cli::try_parse_from(["kakei", "budget", "category", "set", "debt-repayment", "20000"]).is_ok());
        assert!(
            Cli::try_parse_from(["kakei", "budget", "subscription", "add", "netflix", "--plan", "netflix-ad"])
                .is_ok()
        );
        assert!(
            Cli::try_parse_from(["kakei", "budget", "subscription", "add", "netflix", "990", "--plan", "x"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["kakei", "budget", "subscription", "add", "netflix", "--yearly"]).is_err());
        assert!(Cli::try_parse_from(["kakei", "budget", "item", "add", "rent", "Flat", "0"]).is_err());
    }

    #[test]
    fn test_global_user_flag() {
        let cli = Cli::try_parse_from(["kakei", "summary", "--user", "alice"]).unwrap();
        assert_eq!(cli.user.as_deref(), Some("alice"));
    }

    #[test]
    fn test_resolve_category() {
        assert_eq!(resolve_category(EventKind::Income, None).unwrap(), EventCategory::Bonus);
        assert_eq!(
            resolve_category(EventKind::Expense, Some(EventCategory::Travel)).unwrap(),
            EventCategory::Travel
        );
        assert!(resolve_category(EventKind::Income, Some(EventCategory::Travel)).is_err());
    }
}
