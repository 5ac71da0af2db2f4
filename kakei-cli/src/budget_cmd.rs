use anyhow::{Context, Result, bail};
use clap::{Subcommand, ValueEnum};
use std::fmt::Write as _;
use tracing::info;

use kakei_budget::{
    BillingCycle, CategoryEntry, CustomExpense, EntryMode, ExpenseItem, FixedCategory,
    HouseholdBudget, SERVICE_PRESETS, ServiceCategory, ServicePreset, Subscription, find_preset,
    presets_in,
};
use kakei_core::Yen;
use kakei_store::{ForecastStore, StoreError};

use crate::SAVE_FAILED;
use crate::amount::{format_yen, label_arg, non_negative_yen_arg, positive_yen_arg};

#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
    /// Show every category, item, subscription and custom expense
    Show,

    /// List the built-in subscription catalog
    Presets {
        #[arg(long, value_enum)]
        category: Option<ServiceCategoryArg>,
    },

    #[command(flatten)]
    Edit(BudgetEdit),
}

/// Changes that rewrite the budget and re-derive the forecast baseline.
#[derive(Subcommand, Debug)]
pub enum BudgetEdit {
    /// Set monthly take-home income
    Income {
        #[arg(value_parser = non_negative_yen_arg)]
        amount: Yen,
    },

    /// Rough amounts and entry mode per category
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },

    /// Itemized lines inside a category
    Item {
        #[command(subcommand)]
        command: ItemCommand,
    },

    /// Recurring costs outside the fixed categories
    Custom {
        #[command(subcommand)]
        command: CustomCommand,
    },

    /// Individual subscription services
    Subscription {
        #[command(subcommand)]
        command: SubscriptionCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    /// Set the rough monthly amount and count it instead of any items
    Set {
        #[arg(value_enum)]
        category: BudgetCategoryArg,
        #[arg(value_parser = non_negative_yen_arg)]
        amount: Yen,
    },

    /// Count the rough amount or the itemized total
    Mode {
        #[arg(value_enum)]
        category: BudgetCategoryArg,
        #[arg(value_enum)]
        mode: ModeArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum ItemCommand {
    /// Add a line (e.g. `kakei budget item add utilities Electricity 9000`)
    Add {
        #[arg(value_enum)]
        category: BudgetCategoryArg,
        #[arg(value_parser = label_arg)]
        title: String,
        #[arg(value_parser = positive_yen_arg)]
        amount: Yen,
    },

    /// Remove a line by id
    Rm {
        #[arg(value_enum)]
        category: BudgetCategoryArg,
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CustomCommand {
    /// Add a recurring cost (e.g. `kakei budget custom add Gym 8000`)
    Add {
        #[arg(value_parser = label_arg)]
        name: String,
        #[arg(value_parser = positive_yen_arg)]
        amount: Yen,
        #[arg(long)]
        memo: Option<String>,
    },

    /// Remove a custom expense by id
    Rm { id: String },
}

#[derive(Subcommand, Debug)]
pub enum SubscriptionCommand {
    /// Add a service from the catalog (`netflix --plan netflix-standard`)
    /// or any service with a monthly amount (`"Gym app" 1200`)
    Add {
        service: String,
        /// Monthly price, or the annual price with --yearly
        #[arg(value_parser = positive_yen_arg)]
        amount: Option<Yen>,
        /// Catalog plan id (default: the service's first plan)
        #[arg(long, conflicts_with = "amount")]
        plan: Option<String>,
        #[arg(long, requires = "amount")]
        yearly: bool,
        #[arg(long, value_enum)]
        category: Option<ServiceCategoryArg>,
    },

    /// Remove a service by name
    Rm { name: String },

    /// Pause or resume a service without deleting it
    Toggle { name: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BudgetCategoryArg {
    Rent,
    Utilities,
    Internet,
    Mobile,
    Car,
    Insurance,
    Kids,
    Savings,
    DebtRepayment,
    Subscriptions,
    Variable,
}

impl BudgetCategoryArg {
    fn fixed(self) -> Option<FixedCategory> {
        match self {
            BudgetCategoryArg::Rent => Some(FixedCategory::Rent),
            BudgetCategoryArg::Utilities => Some(FixedCategory::Utilities),
            BudgetCategoryArg::Internet => Some(FixedCategory::Internet),
            BudgetCategoryArg::Mobile => Some(FixedCategory::Mobile),
            BudgetCategoryArg::Car => Some(FixedCategory::Car),
            BudgetCategoryArg::Insurance => Some(FixedCategory::Insurance),
            BudgetCategoryArg::Kids => Some(FixedCategory::Kids),
            BudgetCategoryArg::Savings => Some(FixedCategory::Savings),
            BudgetCategoryArg::DebtRepayment => Some(FixedCategory::DebtRepayment),
            BudgetCategoryArg::Subscriptions | BudgetCategoryArg::Variable => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            BudgetCategoryArg::Subscriptions => "Subscriptions",
            BudgetCategoryArg::Variable => "Variable expenses",
            other => other.fixed().map_or("Other", |c| c.label()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Rough,
    Detailed,
}

impl From<ModeArg> for EntryMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Rough => EntryMode::Rough,
            ModeArg::Detailed => EntryMode::Detailed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ServiceCategoryArg {
    Video,
    Music,
    BooksAudio,
    Cloud,
    Household,
    DevAi,
    Productivity,
    Creative,
    Learning,
    Games,
    Fan,
    Other,
}

impl From<ServiceCategoryArg> for ServiceCategory {
    fn from(c: ServiceCategoryArg) -> Self {
        match c {
            ServiceCategoryArg::Video => ServiceCategory::Video,
            ServiceCategoryArg::Music => ServiceCategory::Music,
            ServiceCategoryArg::BooksAudio => ServiceCategory::BooksAudio,
            ServiceCategoryArg::Cloud => ServiceCategory::Cloud,
            ServiceCategoryArg::Household => ServiceCategory::Household,
            ServiceCategoryArg::DevAi => ServiceCategory::DevAi,
            ServiceCategoryArg::Productivity => ServiceCategory::Productivity,
            ServiceCategoryArg::Creative => ServiceCategory::Creative,
            ServiceCategoryArg::Learning => ServiceCategory::Learning,
            ServiceCategoryArg::Games => ServiceCategory::Games,
            ServiceCategoryArg::Fan => ServiceCategory::Fan,
            ServiceCategoryArg::Other => ServiceCategory::Other,
        }
    }
}

pub fn run<S: ForecastStore + ?Sized>(store: &S, user: &str, command: BudgetCommand) -> Result<()> {
    match command {
        BudgetCommand::Presets { category } => {
            print!("{}", render_presets(category.map(ServiceCategory::from)));
        }
        BudgetCommand::Show => {
            let budget = load_budget(store, user)?;
            print!("{}", render_budget(&budget));
        }
        BudgetCommand::Edit(edit) => {
            let mut budget = load_budget(store, user)?;
            let line = apply(&mut budget, edit)?;
            save_budget(store, user, &budget)?;
            println!("{line}");
            let s = budget.summary();
            println!(
                "fixed {}  variable {}  remaining {}",
                format_yen(s.fixed),
                format_yen(s.variable),
                format_yen(s.remaining)
            );
        }
    }
    Ok(())
}

fn load_budget<S: ForecastStore + ?Sized>(store: &S, user: &str) -> Result<HouseholdBudget> {
    match store.load_budget(user) {
        Ok(Some(budget)) => Ok(budget),
        Ok(None) | Err(StoreError::UnknownUser(_)) => {
            bail!("No budget for user '{user}'. Run: kakei setup")
        }
        Err(e) => Err(e).with_context(|| format!("load budget for '{user}'")),
    }
}

/// Store the budget and the baseline derived from it.
pub fn save_budget<S: ForecastStore + ?Sized>(store: &S, user: &str, budget: &HouseholdBudget) -> Result<()> {
    let baseline = budget.baseline();
    store
        .save_budget(user, budget)
        .and_then(|_| store.save_baseline(user, &baseline))
        .context(SAVE_FAILED)?;
    info!(
        user,
        income = baseline.monthly_income,
        fixed = baseline.monthly_fixed_total,
        "budget saved"
    );
    Ok(())
}

/// Apply one edit and describe it in a line.
pub fn apply(budget: &mut HouseholdBudget, edit: BudgetEdit) -> Result<String> {
    match edit {
        BudgetEdit::Income { amount } => {
            budget.monthly_income = amount;
            Ok(format!("Income set to {}", format_yen(amount)))
        }
        BudgetEdit::Category { command } => apply_category(budget, command),
        BudgetEdit::Item { command } => apply_item(budget, command),
        BudgetEdit::Custom { command } => apply_custom(budget, command),
        BudgetEdit::Subscription { command } => apply_subscription(budget, command),
    }
}

fn apply_category(budget: &mut HouseholdBudget, command: CategoryCommand) -> Result<String> {
    match command {
        CategoryCommand::Set { category, amount } => {
            if let BudgetCategoryArg::Subscriptions = category {
                budget.subscriptions.rough = amount;
                budget.subscriptions.mode = EntryMode::Rough;
            } else {
                let entry = entry_mut(budget, category)?;
                entry.rough = amount;
                entry.mode = EntryMode::Rough;
                if let Some(max) = category.fixed().map(|c| c.slider_max()).filter(|m| amount > *m) {
                    return Ok(format!(
                        "{}: {} (rough, above the usual maximum of {})",
                        category.label(),
                        format_yen(amount),
                        format_yen(max)
                    ));
                }
            }
            Ok(format!("{}: {} (rough)", category.label(), format_yen(amount)))
        }
        CategoryCommand::Mode { category, mode } => {
            let counted = if let BudgetCategoryArg::Subscriptions = category {
                budget.subscriptions.mode = mode.into();
                budget.subscriptions.amount()
            } else {
                let entry = entry_mut(budget, category)?;
                entry.mode = mode.into();
                entry.amount()
            };
            Ok(format!(
                "{}: counting {} ({})",
                category.label(),
                format_yen(counted),
                mode_label(mode.into())
            ))
        }
    }
}

fn apply_item(budget: &mut HouseholdBudget, command: ItemCommand) -> Result<String> {
    match command {
        ItemCommand::Add {
            category,
            title,
            amount,
        } => {
            let entry = entry_mut(budget, category)?;
            let id = uuid::Uuid::new_v4().to_string();
            entry.items.push(ExpenseItem::new(id.clone(), title.clone(), amount));
            entry.mode = EntryMode::Detailed;
            Ok(format!(
                "Added {title} {} to {} (id {id}); itemized total {}",
                format_yen(amount),
                category.label(),
                format_yen(entry.items_total())
            ))
        }
        ItemCommand::Rm { category, id } => {
            let entry = entry_mut(budget, category)?;
            let Some(pos) = entry.items.iter().position(|i| i.id == id) else {
                bail!("no item with id '{id}' in {}", category.label());
            };
            let removed = entry.items.remove(pos);
            Ok(format!(
                "Removed {} from {}; itemized total {}",
                removed.title,
                category.label(),
                format_yen(entry.items_total())
            ))
        }
    }
}

fn apply_custom(budget: &mut HouseholdBudget, command: CustomCommand) -> Result<String> {
    match command {
        CustomCommand::Add { name, amount, memo } => {
            let id = uuid::Uuid::new_v4().to_string();
            let line = format!("Added {name} {} (id {id})", format_yen(amount));
            budget.custom_expenses.push(CustomExpense {
                id,
                name,
                amount,
                memo: memo.filter(|m| !m.trim().is_empty()),
            });
            Ok(line)
        }
        CustomCommand::Rm { id } => {
            let Some(pos) = budget.custom_expenses.iter().position(|c| c.id == id) else {
                bail!("no custom expense with id '{id}'");
            };
            let removed = budget.custom_expenses.remove(pos);
            Ok(format!("Removed {}", removed.name))
        }
    }
}

fn apply_subscription(budget: &mut HouseholdBudget, command: SubscriptionCommand) -> Result<String> {
    match command {
        SubscriptionCommand::Add {
            service,
            amount,
            plan,
            yearly,
            category,
        } => {
            let sub = new_subscription(&service, amount, plan.as_deref(), yearly)?;
            let sub = match category {
                Some(c) => sub.with_category(c.into()),
                None => sub,
            };
            if find_service(&budget.subscriptions.services, &sub.name).is_some() {
                bail!("'{}' is already in the subscription list", sub.name);
            }
            let line = format!(
                "Added {} {}/month ({})",
                sub.name,
                format_yen(sub.approx_monthly),
                sub.category.label()
            );
            budget.subscriptions.services.push(sub);
            budget.subscriptions.mode = EntryMode::Detailed;
            Ok(line)
        }
        SubscriptionCommand::Rm { name } => {
            let Some(pos) = find_service(&budget.subscriptions.services, &name) else {
                bail!("no subscription named '{name}'");
            };
            let removed = budget.subscriptions.services.remove(pos);
            Ok(format!("Removed {}", removed.name))
        }
        SubscriptionCommand::Toggle { name } => {
            let Some(pos) = find_service(&budget.subscriptions.services, &name) else {
                bail!("no subscription named '{name}'");
            };
            let sub = &mut budget.subscriptions.services[pos];
            sub.active = !sub.active;
            let state = if sub.active { "resumed" } else { "paused" };
            Ok(format!("{} {state}", sub.name))
        }
    }
}

/// Catalog services without an amount take the plan's price. Anything with an
/// amount is taken as given, keeping the catalog name and category if known.
fn new_subscription(service: &str, amount: Option<Yen>, plan: Option<&str>, yearly: bool) -> Result<Subscription> {
    let preset = find_preset(service);
    match (preset, amount) {
        (Some(preset), None) => {
            let Some(chosen) = preset.plan(plan) else {
                bail!(
                    "unknown plan '{}' for {} (plans: {})",
                    plan.unwrap_or_default(),
                    preset.name,
                    plan_ids(preset)
                );
            };
            Ok(preset.subscription(chosen))
        }
        (None, None) => bail!(
            "'{}' is not in the catalog; pass its monthly amount (see `kakei budget presets`)",
            service.trim()
        ),
        (preset, Some(amount)) => {
            let name = preset.map_or_else(|| service.trim().to_string(), |p| p.name.to_string());
            if name.is_empty() {
                bail!("service name must not be empty");
            }
            let sub = if yearly {
                Subscription::yearly(name, amount)
            } else {
                Subscription::new(name, amount, BillingCycle::Monthly)
            };
            Ok(match preset {
                Some(p) => sub.with_category(p.category),
                None => sub,
            })
        }
    }
}

fn find_service(services: &[Subscription], name: &str) -> Option<usize> {
    let name = name.trim();
    services.iter().position(|s| s.name.eq_ignore_ascii_case(name))
}

fn plan_ids(preset: &ServicePreset) -> String {
    preset.plans.iter().map(|p| p.id).collect::<Vec<_>>().join(", ")
}

fn entry_mut(budget: &mut HouseholdBudget, category: BudgetCategoryArg) -> Result<&mut CategoryEntry> {
    match (category, category.fixed()) {
        (BudgetCategoryArg::Variable, _) => Ok(&mut budget.variable_expenses),
        (_, Some(fixed)) => Ok(budget.entry_mut(fixed)),
        _ => bail!("subscriptions are itemized with `kakei budget subscription add`"),
    }
}

fn mode_label(mode: EntryMode) -> &'static str {
    match mode {
        EntryMode::Rough => "rough",
        EntryMode::Detailed => "itemized",
    }
}

pub fn render_presets(category: Option<ServiceCategory>) -> String {
    let presets: Vec<&ServicePreset> = match category {
        Some(c) => presets_in(c).collect(),
        None => SERVICE_PRESETS.iter().collect(),
    };
    let mut out = String::new();
    let mut heading = None;
    for preset in presets {
        if heading != Some(preset.category) {
            let _ = writeln!(out, "# {}", preset.category.label());
            heading = Some(preset.category);
        }
        for plan in preset.plans {
            let cycle = match plan.billing_cycle {
                BillingCycle::Yearly => " (billed yearly)",
                BillingCycle::Monthly => "",
            };
            let _ = writeln!(
                out,
                "{:<16} {:<22} {:<24} {:>8}/mo{cycle}",
                preset.id,
                preset.name,
                plan.id,
                format_yen(plan.approx_monthly)
            );
        }
    }
    out
}

pub fn render_budget(budget: &HouseholdBudget) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<20} {:>12}\n", "Income", format_yen(budget.monthly_income));

    for category in FixedCategory::ALL {
        write_entry(&mut out, category.label(), budget.entry(category));
    }

    let subs = &budget.subscriptions;
    let _ = writeln!(
        out,
        "{:<20} {:>12}  {}",
        "Subscriptions",
        format_yen(subs.amount()),
        mode_label(subs.mode)
    );
    if subs.mode == EntryMode::Detailed {
        for s in &subs.services {
            let paused = if s.active { "" } else { "  [paused]" };
            let _ = writeln!(out, "  - {:<24} {:>10}/mo{paused}", s.name, format_yen(s.approx_monthly));
        }
    }

    write_entry(&mut out, "Variable expenses", &budget.variable_expenses);

    if !budget.custom_expenses.is_empty() {
        let _ = writeln!(out, "\n# Custom");
        for c in &budget.custom_expenses {
            let _ = write!(out, "{:<20} {:>12}  {}", c.name, format_yen(c.amount), c.id);
            if let Some(memo) = &c.memo {
                let _ = write!(out, "  ({memo})");
            }
            out.push('\n');
        }
    }

    let s = budget.summary();
    let _ = writeln!(
        out,
        "\nfixed {}  variable {}  remaining {}",
        format_yen(s.fixed),
        format_yen(s.variable),
        format_yen(s.remaining)
    );
    out
}

fn write_entry(out: &mut String, label: &str, entry: &CategoryEntry) {
    let _ = writeln!(
        out,
        "{:<20} {:>12}  {}",
        label,
        format_yen(entry.amount()),
        mode_label(entry.mode)
    );
    if entry.mode == EntryMode::Detailed {
        for item in &entry.items {
            let _ = writeln!(out, "  - {:<24} {:>10}  {}", item.title, format_yen(item.amount), item.id);
        }
    }
}
