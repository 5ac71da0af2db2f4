//! kakei-budget: household budget itemization, subscriptions, and the
//! income-bucket defaults used by the setup wizard.
//!
//! Categories stop here. The forecast engine only ever sees
//! `HouseholdBudget::baseline()`.

pub mod defaults;
pub mod household;
pub mod presets;
pub mod subscription;

pub use defaults::{INCOME_BUCKETS, INCOME_PRESETS, IncomeBucket, default_amount};
pub use household::{
    BudgetSummary, CategoryEntry, CustomExpense, EntryMode, ExpenseItem, FixedCategory,
    HouseholdBudget, SubscriptionEntry,
};
pub use presets::{PlanPreset, SERVICE_PRESETS, ServicePreset, find_preset, presets_in};
pub use subscription::{BillingCycle, ServiceCategory, Subscription, active_monthly_total};
