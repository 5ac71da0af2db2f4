//! Catalog of common subscription services and their plans.
//!
//! Prices are approximate monthly yen; yearly plans are already spread over
//! 12 months.

use kakei_core::Yen;

use crate::subscription::{BillingCycle, ServiceCategory, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub approx_monthly: Yen,
    pub billing_cycle: BillingCycle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicePreset {
    pub id: &'static str,
    pub name: &'static str,
    pub category: ServiceCategory,
    pub plans: &'static [PlanPreset],
}

const fn monthly(id: &'static str, name: &'static str, approx_monthly: Yen) -> PlanPreset {
    PlanPreset {
        id,
        name,
        approx_monthly,
        billing_cycle: BillingCycle::Monthly,
    }
}

const fn yearly(id: &'static str, name: &'static str, approx_monthly: Yen) -> PlanPreset {
    PlanPreset {
        id,
        name,
        approx_monthly,
        billing_cycle: BillingCycle::Yearly,
    }
}

pub static SERVICE_PRESETS: [ServicePreset; 14] = [
    ServicePreset {
        id: "netflix",
        name: "Netflix",
        category: ServiceCategory::Video,
        plans: &[
            monthly("netflix-ad", "With ads", 890),
            monthly("netflix-standard", "Standard", 1_590),
        ],
    },
    ServicePreset {
        id: "amazon-prime",
        name: "Amazon Prime",
        category: ServiceCategory::Video,
        plans: &[
            monthly("prime-monthly", "Monthly", 600),
            yearly("prime-yearly", "Yearly", 492),
        ],
    },
    ServicePreset {
        id: "disney-plus",
        name: "Disney+",
        category: ServiceCategory::Video,
        plans: &[
            monthly("disney-standard", "Standard", 1_140),
            monthly("disney-premium", "Premium", 1_520),
        ],
    },
    ServicePreset {
        id: "unext",
        name: "U-NEXT",
        category: ServiceCategory::Video,
        plans: &[monthly("unext-monthly", "Monthly", 2_189)],
    },
    ServicePreset {
        id: "spotify",
        name: "Spotify",
        category: ServiceCategory::Music,
        plans: &[monthly("spotify-premium", "Premium individual", 1_080)],
    },
    ServicePreset {
        id: "apple-music",
        name: "Apple Music",
        category: ServiceCategory::Music,
        plans: &[
            monthly("applemusic-individual", "Individual", 1_080),
            monthly("applemusic-family", "Family", 1_680),
            monthly("applemusic-student", "Student", 580),
        ],
    },
    ServicePreset {
        id: "youtube-premium",
        name: "YouTube Premium",
        category: ServiceCategory::Music,
        plans: &[
            monthly("ytpremium-individual", "Individual", 1_280),
            monthly("ytpremium-family", "Family", 2_280),
        ],
    },
    ServicePreset {
        id: "kindle-unlimited",
        name: "Kindle Unlimited",
        category: ServiceCategory::BooksAudio,
        plans: &[monthly("kindle-unlimited", "Unlimited", 980)],
    },
    ServicePreset {
        id: "audible",
        name: "Audible",
        category: ServiceCategory::BooksAudio,
        plans: &[monthly("audible-member", "Member", 1_500)],
    },
    ServicePreset {
        id: "icloud",
        name: "iCloud+",
        category: ServiceCategory::Cloud,
        plans: &[
            monthly("icloud-50gb", "50GB", 150),
            monthly("icloud-200gb", "200GB", 450),
            monthly("icloud-2tb", "2TB", 1_500),
        ],
    },
    ServicePreset {
        id: "google-one",
        name: "Google One",
        category: ServiceCategory::Cloud,
        plans: &[
            monthly("googleone-100gb", "100GB", 290),
            monthly("googleone-200gb", "200GB", 380),
            monthly("googleone-2tb", "2TB", 1_450),
        ],
    },
    ServicePreset {
        id: "microsoft-365",
        name: "Microsoft 365 Personal",
        category: ServiceCategory::Cloud,
        plans: &[yearly("ms365-yearly", "Yearly", 1_775)],
    },
    ServicePreset {
        id: "zaim",
        name: "Zaim Premium",
        category: ServiceCategory::Household,
        plans: &[
            monthly("zaim-monthly", "Monthly", 480),
            yearly("zaim-yearly", "Yearly", 400),
        ],
    },
    ServicePreset {
        id: "chatgpt",
        name: "ChatGPT",
        category: ServiceCategory::DevAi,
        plans: &[
            monthly("chatgpt-plus", "Plus", 3_000),
            monthly("chatgpt-pro", "Pro", 30_000),
        ],
    },
];

impl ServicePreset {
    /// Plan by id, or the first plan when `plan` is `None`.
    pub fn plan(&self, plan: Option<&str>) -> Option<&'static PlanPreset> {
        match plan {
            Some(id) => self.plans.iter().find(|p| p.id.eq_ignore_ascii_case(id)),
            None => self.plans.first(),
        }
    }

    pub fn subscription(&self, plan: &PlanPreset) -> Subscription {
        Subscription::new(
            format!("{} ({})", self.name, plan.name),
            plan.approx_monthly,
            plan.billing_cycle,
        )
        .with_category(self.category)
    }
}

/// Look up a service by id or display name, ignoring case.
pub fn find_preset(query: &str) -> Option<&'static ServicePreset> {
    let q = query.trim();
    SERVICE_PRESETS
        .iter()
        .find(|s| s.id.eq_ignore_ascii_case(q) || s.name.eq_ignore_ascii_case(q))
}

pub fn presets_in(category: ServiceCategory) -> impl Iterator<Item = &'static ServicePreset> {
    SERVICE_PRESETS.iter().filter(move |s| s.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::monthly_equivalent;

    #[test]
    fn test_find_preset_by_id_or_name() {
        assert_eq!(find_preset("netflix").map(|s| s.name), Some("Netflix"));
        assert_eq!(find_preset(" YouTube Premium ").map(|s| s.id), Some("youtube-premium"));
        assert!(find_preset("hbo").is_none());
    }

    #[test]
    fn test_plan_defaults_to_first() {
        let prime = find_preset("amazon-prime").unwrap();
        assert_eq!(prime.plan(None).unwrap().id, "prime-monthly");
        assert_eq!(prime.plan(Some("PRIME-YEARLY")).unwrap().approx_monthly, 492);
        assert!(prime.plan(Some("nope")).is_none());
    }

    #[test]
    fn test_yearly_prices_are_monthly_equivalents() {
        assert_eq!(monthly_equivalent(5_900), 492);
        assert_eq!(monthly_equivalent(21_300), 1_775);
        assert_eq!(monthly_equivalent(4_800), 400);
    }

    #[test]
    fn test_subscription_from_plan() {
        let icloud = find_preset("icloud").unwrap();
        let plan = icloud.plan(Some("icloud-200gb")).unwrap();
        let sub = icloud.subscription(plan);
        assert_eq!(sub.name, "iCloud+ (200GB)");
        assert_eq!(sub.approx_monthly, 450);
        assert_eq!(sub.category, ServiceCategory::Cloud);
        assert!(sub.active);
    }

    #[test]
    fn test_presets_in_category() {
        let music: Vec<_> = presets_in(ServiceCategory::Music).map(|s| s.id).collect();
        assert_eq!(music, vec!["spotify", "apple-music", "youtube-premium"]);
        assert!(SERVICE_PRESETS.iter().all(|s| !s.plans.is_empty()));
    }
}
