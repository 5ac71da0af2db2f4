//! Subscription services and their monthly-equivalent cost.

use serde::{Deserialize, Serialize};

use kakei_core::Yen;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

/// Service groupings used when asking "do you use any X?".
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
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
    #[default]
    Other,
}

impl ServiceCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ServiceCategory::Video => "Video streaming",
            ServiceCategory::Music => "Music",
            ServiceCategory::BooksAudio => "Books, magazines & audiobooks",
            ServiceCategory::Cloud => "Cloud & office",
            ServiceCategory::Household => "Budgeting & money",
            ServiceCategory::DevAi => "AI & developer tools",
            ServiceCategory::Productivity => "Work tools",
            ServiceCategory::Creative => "Design & creative",
            ServiceCategory::Learning => "Learning",
            ServiceCategory::Games => "Games",
            ServiceCategory::Fan => "Fan clubs",
            ServiceCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscription {
    pub name: String,
    #[serde(default)]
    pub category: ServiceCategory,
    /// Monthly-equivalent cost; yearly plans are spread over 12 months.
    pub approx_monthly: Yen,
    #[serde(default)]
    pub billing_cycle: BillingCycle,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Subscription {
    pub fn new(name: impl Into<String>, approx_monthly: Yen, billing_cycle: BillingCycle) -> Self {
        Self {
            name: name.into(),
            category: ServiceCategory::Other,
            approx_monthly,
            billing_cycle,
            active: true,
        }
    }

    /// A yearly plan, given its annual price.
    pub fn yearly(name: impl Into<String>, yearly_price: Yen) -> Self {
        Self::new(name, monthly_equivalent(yearly_price), BillingCycle::Yearly)
    }

    pub fn with_category(mut self, category: ServiceCategory) -> Self {
        self.category = category;
        self
    }

    /// What the service costs over a year.
    pub fn yearly_cost(&self) -> Yen {
        self.approx_monthly * 12
    }
}

/// Annual price spread over 12 months, rounded half up.
pub fn monthly_equivalent(yearly_price: Yen) -> Yen {
    (yearly_price + 6).div_euclid(12)
}

/// Total monthly cost of the active subscriptions.
pub fn active_monthly_total(subs: &[Subscription]) -> Yen {
    subs.iter().filter(|s| s.active).map(|s| s.approx_monthly).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_equivalent_rounds() {
        assert_eq!(monthly_equivalent(5_900), 492);
        assert_eq!(monthly_equivalent(21_300), 1_775);
        assert_eq!(monthly_equivalent(4_800), 400);
    }

    #[test]
    fn test_active_total_skips_cancelled() {
        let mut subs = vec![
            Subscription::new("Spotify", 980, BillingCycle::Monthly).with_category(ServiceCategory::Music),
            Subscription::yearly("Microsoft 365", 21_300).with_category(ServiceCategory::Cloud),
        ];
        assert_eq!(active_monthly_total(&subs), 980 + 1_775);

        subs[0].active = false;
        assert_eq!(active_monthly_total(&subs), 1_775);
        assert_eq!(subs[1].yearly_cost(), 21_300);
    }

    #[test]
    fn test_missing_fields_default_on_load() {
        let sub: Subscription = serde_json::from_str(r#"{"name":"Netflix","approx_monthly":1590}"#).unwrap();
        assert!(sub.active);
        assert_eq!(sub.billing_cycle, BillingCycle::Monthly);
        assert_eq!(sub.category, ServiceCategory::Other);
    }
}
