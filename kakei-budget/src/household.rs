//! Household budget: itemized recurring costs rolled up into the flat
//! baseline the forecast engine consumes.
//!
//! Each fixed category can be entered roughly (one number) or in detail
//! (a list of items). The detailed total only counts when the category is in
//! detailed mode; switching back to rough keeps the items but ignores them.

use serde::{Deserialize, Serialize};

use kakei_core::{RecurringBaseline, Yen};

use crate::defaults::IncomeBucket;
use crate::subscription::{Subscription, active_monthly_total};

/// Recurring cost categories asked about by the setup wizard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FixedCategory {
    Rent,
    Utilities,
    Internet,
    Mobile,
    Car,
    Insurance,
    Kids,
    Savings,
    DebtRepayment,
}

impl FixedCategory {
    pub const ALL: [FixedCategory; 9] = [
        FixedCategory::Rent,
        FixedCategory::Utilities,
        FixedCategory::Internet,
        FixedCategory::Mobile,
        FixedCategory::Car,
        FixedCategory::Insurance,
        FixedCategory::Kids,
        FixedCategory::Savings,
        FixedCategory::DebtRepayment,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FixedCategory::Rent => "Rent / housing",
            FixedCategory::Utilities => "Utilities",
            FixedCategory::Internet => "Internet",
            FixedCategory::Mobile => "Mobile phone",
            FixedCategory::Car => "Car",
            FixedCategory::Insurance => "Insurance",
            FixedCategory::Kids => "Children",
            FixedCategory::Savings => "Savings plan",
            FixedCategory::DebtRepayment => "Debt repayment",
        }
    }

    /// Upper bound of the wizard's amount slider.
    pub fn slider_max(&self) -> Yen {
        match self {
            FixedCategory::Rent => 300_000,
            FixedCategory::Utilities => 50_000,
            FixedCategory::Internet | FixedCategory::Mobile => 20_000,
            _ => 100_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    #[default]
    Rough,
    Detailed,
}

/// One line of an itemized category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpenseItem {
    pub id: String,
    pub title: String,
    pub amount: Yen,
}

impl ExpenseItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>, amount: Yen) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            amount,
        }
    }
}

/// A rough figure plus an optional itemization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryEntry {
    pub rough: Yen,
    #[serde(default)]
    pub mode: EntryMode,
    #[serde(default)]
    pub items: Vec<ExpenseItem>,
    #[serde(default)]
    pub memo: Option<String>,
}

impl CategoryEntry {
    pub fn rough(amount: Yen) -> Self {
        Self {
            rough: amount,
            ..Default::default()
        }
    }

    pub fn detailed(items: Vec<ExpenseItem>) -> Self {
        Self {
            mode: EntryMode::Detailed,
            items,
            ..Default::default()
        }
    }

    pub fn items_total(&self) -> Yen {
        self.items.iter().map(|i| i.amount).sum()
    }

    /// Amount that counts toward the budget.
    pub fn amount(&self) -> Yen {
        match self.mode {
            EntryMode::Rough => self.rough,
            EntryMode::Detailed => self.items_total(),
        }
    }
}

/// A user-defined recurring cost outside the fixed categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomExpense {
    pub id: String,
    pub name: String,
    pub amount: Yen,
    #[serde(default)]
    pub memo: Option<String>,
}

/// Subscriptions: a rough monthly total, or the list of actual services.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionEntry {
    pub rough: Yen,
    #[serde(default)]
    pub mode: EntryMode,
    #[serde(default)]
    pub services: Vec<Subscription>,
}

impl SubscriptionEntry {
    pub fn amount(&self) -> Yen {
        match self.mode {
            EntryMode::Rough => self.rough,
            EntryMode::Detailed => active_monthly_total(&self.services),
        }
    }
}

/// Breakdown shown on the budget summary screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub income: Yen,
    pub fixed: Yen,
    pub variable: Yen,
    pub total_expenses: Yen,
    /// Income left after fixed and variable spending. Negative means overspent.
    pub remaining: Yen,
}

/// Everything the budget wizard collects for one household.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HouseholdBudget {
    pub monthly_income: Yen,
    #[serde(default)]
    pub rent: CategoryEntry,
    #[serde(default)]
    pub utilities: CategoryEntry,
    #[serde(default)]
    pub internet: CategoryEntry,
    #[serde(default)]
    pub mobile: CategoryEntry,
    #[serde(default)]
    pub car: CategoryEntry,
    #[serde(default)]
    pub insurance: CategoryEntry,
    #[serde(default)]
    pub kids: CategoryEntry,
    #[serde(default)]
    pub savings: CategoryEntry,
    #[serde(default)]
    pub debt_repayment: CategoryEntry,
    #[serde(default)]
    pub subscriptions: SubscriptionEntry,
    /// Day-to-day spending (food, shopping). Not part of the fixed baseline.
    #[serde(default)]
    pub variable_expenses: CategoryEntry,
    #[serde(default)]
    pub custom_expenses: Vec<CustomExpense>,
    #[serde(default)]
    pub completed_wizard: bool,
}

impl HouseholdBudget {
    /// Seed every category with the default for this income's bucket.
    pub fn with_defaults(monthly_income: Yen) -> Self {
        let bucket = IncomeBucket::for_income(monthly_income);
        let mut budget = Self {
            monthly_income,
            subscriptions: SubscriptionEntry {
                rough: bucket.defaults.subscriptions,
                ..Default::default()
            },
            variable_expenses: CategoryEntry::rough(bucket.defaults.variable_expenses),
            ..Default::default()
        };
        for category in FixedCategory::ALL {
            *budget.entry_mut(category) = CategoryEntry::rough(bucket.defaults.amount(category));
        }
        budget
    }

    pub fn entry(&self, category: FixedCategory) -> &CategoryEntry {
        match category {
            FixedCategory::Rent => &self.rent,
            FixedCategory::Utilities => &self.utilities,
            FixedCategory::Internet => &self.internet,
            FixedCategory::Mobile => &self.mobile,
            FixedCategory::Car => &self.car,
            FixedCategory::Insurance => &self.insurance,
            FixedCategory::Kids => &self.kids,
            FixedCategory::Savings => &self.savings,
            FixedCategory::DebtRepayment => &self.debt_repayment,
        }
    }

    pub fn entry_mut(&mut self, category: FixedCategory) -> &mut CategoryEntry {
        match category {
            FixedCategory::Rent => &mut self.rent,
            FixedCategory::Utilities => &mut self.utilities,
            FixedCategory::Internet => &mut self.internet,
            FixedCategory::Mobile => &mut self.mobile,
            FixedCategory::Car => &mut self.car,
            FixedCategory::Insurance => &mut self.insurance,
            FixedCategory::Kids => &mut self.kids,
            FixedCategory::Savings => &mut self.savings,
            FixedCategory::DebtRepayment => &mut self.debt_repayment,
        }
    }

    pub fn category_amount(&self, category: FixedCategory) -> Yen {
        self.entry(category).amount()
    }

    pub fn custom_total(&self) -> Yen {
        self.custom_expenses.iter().map(|c| c.amount).sum()
    }

    /// Fixed categories + subscriptions + custom expenses.
    ///
    /// Custom expenses count as fixed even though the budget screen lists
    /// them separately.
    pub fn fixed_total(&self) -> Yen {
        let categories: Yen = FixedCategory::ALL
            .iter()
            .map(|c| self.category_amount(*c))
            .sum();
        categories + self.subscriptions.amount() + self.custom_total()
    }

    pub fn summary(&self) -> BudgetSummary {
        let fixed = self.fixed_total();
        let variable = self.variable_expenses.amount();
        let total_expenses = fixed + variable;
        BudgetSummary {
            income: self.monthly_income,
            fixed,
            variable,
            total_expenses,
            remaining: self.monthly_income - total_expenses,
        }
    }

    /// The only view of the budget the forecast engine gets.
    pub fn baseline(&self) -> RecurringBaseline {
        RecurringBaseline::new(self.monthly_income, self.fixed_total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::BillingCycle;

    #[test]
    fn test_rough_vs_detailed_entry() {
        let mut entry = CategoryEntry::rough(80_000);
        entry.items.push(ExpenseItem::new("i1", "Apartment", 75_000));
        entry.items.push(ExpenseItem::new("i2", "Parking", 8_000));
        assert_eq!(entry.amount(), 80_000);

        entry.mode = EntryMode::Detailed;
        assert_eq!(entry.amount(), 83_000);
    }

    #[test]
    fn test_fixed_total_excludes_variable_expenses() {
        let mut budget = HouseholdBudget {
            monthly_income: 300_000,
            ..Default::default()
        };
        budget.rent = CategoryEntry::rough(80_000);
        budget.utilities = CategoryEntry::rough(12_000);
        budget.debt_repayment = CategoryEntry::rough(15_000);
        budget.subscriptions.rough = 5_000;
        budget.variable_expenses = CategoryEntry::rough(70_000);
        budget.custom_expenses.push(CustomExpense {
            id: "c1".into(),
            name: "Gym".into(),
            amount: 8_000,
            memo: None,
        });

        assert_eq!(budget.fixed_total(), 80_000 + 12_000 + 15_000 + 5_000 + 8_000);

        let summary = budget.summary();
        assert_eq!(summary.variable, 70_000);
        assert_eq!(summary.total_expenses, 120_000 + 70_000);
        assert_eq!(summary.remaining, 300_000 - 190_000);

        let baseline = budget.baseline();
        assert_eq!(baseline.monthly_income, 300_000);
        assert_eq!(baseline.monthly_fixed_total, 120_000);
    }

    #[test]
    fn test_detailed_subscriptions_count_active_only() {
        let mut budget = HouseholdBudget::default();
        budget.subscriptions = SubscriptionEntry {
            rough: 9_999,
            mode: EntryMode::Detailed,
            services: vec![
                Subscription::new("Netflix", 1_590, BillingCycle::Monthly),
                Subscription::yearly("Prime", 5_900),
                Subscription {
                    active: false,
                    ..Subscription::new("Old gym app", 1_000, BillingCycle::Monthly)
                },
            ],
        };
        assert_eq!(budget.subscriptions.amount(), 1_590 + 492);
        assert_eq!(budget.fixed_total(), 2_082);
    }

    #[test]
    fn test_with_defaults_uses_income_bucket() {
        let budget = HouseholdBudget::with_defaults(300_000);
        assert_eq!(budget.rent.amount(), 80_000);
        assert_eq!(budget.debt_repayment.amount(), 15_000);
        assert_eq!(budget.subscriptions.amount(), 5_000);
        assert_eq!(budget.variable_expenses.amount(), 70_000);
        assert_eq!(budget.fixed_total(), 80_000 + 12_000 + 5_000 + 5_000 + 15_000 + 7_000 + 10_000 + 10_000 + 15_000 + 5_000);
    }
}
