//! Income buckets and the suggested category amounts for each.
//!
//! The setup wizard pre-fills every slider from the bucket the user's
//! income falls into. Bounds are `min <= income < max`; anything above the
//! last bucket uses the last bucket.

use kakei_core::Yen;

use crate::household::FixedCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketDefaults {
    pub rent: Yen,
    pub utilities: Yen,
    pub internet: Yen,
    pub mobile: Yen,
    pub car: Yen,
    pub insurance: Yen,
    pub kids: Yen,
    pub savings: Yen,
    pub subscriptions: Yen,
    pub variable_expenses: Yen,
    pub debt_repayment: Yen,
}

impl BucketDefaults {
    pub fn amount(&self, category: FixedCategory) -> Yen {
        match category {
            FixedCategory::Rent => self.rent,
            FixedCategory::Utilities => self.utilities,
            FixedCategory::Internet => self.internet,
            FixedCategory::Mobile => self.mobile,
            FixedCategory::Car => self.car,
            FixedCategory::Insurance => self.insurance,
            FixedCategory::Kids => self.kids,
            FixedCategory::Savings => self.savings,
            FixedCategory::DebtRepayment => self.debt_repayment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomeBucket {
    pub id: &'static str,
    pub min: Yen,
    pub max: Yen,
    pub representative: Yen,
    pub defaults: BucketDefaults,
}

pub static INCOME_BUCKETS: [IncomeBucket; 6] = [
    IncomeBucket {
        id: "A",
        min: 0,
        max: 150_000,
        representative: 150_000,
        defaults: BucketDefaults {
            rent: 50_000,
            utilities: 7_000,
            internet: 3_000,
            mobile: 3_000,
            car: 0,
            insurance: 3_000,
            kids: 0,
            savings: 0,
            subscriptions: 2_000,
            variable_expenses: 30_000,
            debt_repayment: 0,
        },
    },
    IncomeBucket {
        id: "B",
        min: 150_000,
        max: 250_000,
        representative: 200_000,
        defaults: BucketDefaults {
            rent: 60_000,
            utilities: 10_000,
            internet: 4_000,
            mobile: 4_000,
            car: 10_000,
            insurance: 5_000,
            kids: 5_000,
            savings: 5_000,
            subscriptions: 3_000,
            variable_expenses: 50_000,
            debt_repayment: 10_000,
        },
    },
    IncomeBucket {
        id: "C",
        min: 250_000,
        max: 350_000,
        representative: 300_000,
        defaults: BucketDefaults {
            rent: 80_000,
            utilities: 12_000,
            internet: 5_000,
            mobile: 5_000,
            car: 15_000,
            insurance: 7_000,
            kids: 10_000,
            savings: 10_000,
            subscriptions: 5_000,
            variable_expenses: 70_000,
            debt_repayment: 15_000,
        },
    },
    IncomeBucket {
        id: "D",
        min: 350_000,
        max: 450_000,
        representative: 400_000,
        defaults: BucketDefaults {
            rent: 100_000,
            utilities: 15_000,
            internet: 5_000,
            mobile: 6_000,
            car: 20_000,
            insurance: 10_000,
            kids: 15_000,
            savings: 15_000,
            subscriptions: 7_000,
            variable_expenses: 90_000,
            debt_repayment: 20_000,
        },
    },
    IncomeBucket {
        id: "E",
        min: 450_000,
        max: 600_000,
        representative: 500_000,
        defaults: BucketDefaults {
            rent: 120_000,
            utilities: 20_000,
            internet: 6_000,
            mobile: 7_000,
            car: 25_000,
            insurance: 15_000,
            kids: 20_000,
            savings: 20_000,
            subscriptions: 10_000,
            variable_expenses: 120_000,
            debt_repayment: 25_000,
        },
    },
    IncomeBucket {
        id: "F",
        min: 600_000,
        max: 10_000_000,
        representative: 800_000,
        defaults: BucketDefaults {
            rent: 150_000,
            utilities: 25_000,
            internet: 6_000,
            mobile: 8_000,
            car: 30_000,
            insurance: 20_000,
            kids: 30_000,
            savings: 30_000,
            subscriptions: 15_000,
            variable_expenses: 150_000,
            debt_repayment: 30_000,
        },
    },
];

/// Quick-pick incomes offered before the free-form slider.
pub const INCOME_PRESETS: [Yen; 12] = [
    50_000, 100_000, 150_000, 200_000, 250_000, 300_000, 350_000, 400_000, 500_000, 600_000,
    800_000, 1_000_000,
];

impl IncomeBucket {
    pub fn for_income(income: Yen) -> &'static IncomeBucket {
        INCOME_BUCKETS
            .iter()
            .find(|b| income >= b.min && income < b.max)
            .unwrap_or(&INCOME_BUCKETS[INCOME_BUCKETS.len() - 1])
    }
}

/// Suggested monthly amount for `category` at this income.
pub fn default_amount(income: Yen, category: FixedCategory) -> Yen {
    IncomeBucket::for_income(income).defaults.amount(category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_bounds() {
        assert_eq!(IncomeBucket::for_income(0).id, "A");
        assert_eq!(IncomeBucket::for_income(149_999).id, "A");
        assert_eq!(IncomeBucket::for_income(150_000).id, "B");
        assert_eq!(IncomeBucket::for_income(300_000).id, "C");
        assert_eq!(IncomeBucket::for_income(599_999).id, "E");
        assert_eq!(IncomeBucket::for_income(600_000).id, "F");
    }

    #[test]
    fn test_falls_back_to_last_bucket() {
        assert_eq!(IncomeBucket::for_income(50_000_000).id, "F");
        assert_eq!(IncomeBucket::for_income(-1).id, "F");
    }

    #[test]
    fn test_default_amount() {
        assert_eq!(default_amount(300_000, FixedCategory::Rent), 80_000);
        assert_eq!(default_amount(100_000, FixedCategory::Car), 0);
        assert_eq!(default_amount(800_000, FixedCategory::DebtRepayment), 30_000);
    }

    #[test]
    fn test_presets_are_ascending() {
        assert!(INCOME_PRESETS.windows(2).all(|w| w[0] < w[1]));
    }
}
