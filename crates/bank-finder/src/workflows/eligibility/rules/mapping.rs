use super::normalizer::rule_key;
use crate::workflows::eligibility::domain::LoanCategory;

/// Lender policy fields, each required for every lender in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleField {
    MinSecurityRatio,
    RoiLow,
    RoiHigh,
    PfMin,
    PfMax,
    IdealDscr,
    MarginRate(LoanCategory),
}

impl RuleField {
    pub const fn ordered() -> [RuleField; 11] {
        [
            RuleField::MinSecurityRatio,
            RuleField::RoiLow,
            RuleField::RoiHigh,
            RuleField::PfMin,
            RuleField::PfMax,
            RuleField::IdealDscr,
            RuleField::MarginRate(LoanCategory::Land),
            RuleField::MarginRate(LoanCategory::Construction),
            RuleField::MarginRate(LoanCategory::Machinery),
            RuleField::MarginRate(LoanCategory::Utilities),
            RuleField::MarginRate(LoanCategory::Other),
        ]
    }

    /// Row label used by the bank rule workbook.
    pub const fn source_label(self) -> &'static str {
        match self {
            RuleField::MinSecurityRatio => "MinSec",
            RuleField::RoiLow => "LowROI",
            RuleField::RoiHigh => "HighROI",
            RuleField::PfMin => "Min_PF",
            RuleField::PfMax => "Max_PF",
            RuleField::IdealDscr => "Ideal_DSCR",
            RuleField::MarginRate(LoanCategory::Land) => "Margin4LandPurchaseTL",
            RuleField::MarginRate(LoanCategory::Construction) => "Margin4ConstructionTL",
            RuleField::MarginRate(LoanCategory::Machinery) => "Margin4MTL",
            RuleField::MarginRate(LoanCategory::Utilities) => "Margin4UtilitiesTL",
            RuleField::MarginRate(LoanCategory::Other) => "Margin4OTL",
        }
    }

    pub const fn field_name(self) -> &'static str {
        match self {
            RuleField::MinSecurityRatio => "min_security_ratio",
            RuleField::RoiLow => "roi_low",
            RuleField::RoiHigh => "roi_high",
            RuleField::PfMin => "pf_min",
            RuleField::PfMax => "pf_max",
            RuleField::IdealDscr => "ideal_dscr",
            RuleField::MarginRate(LoanCategory::Land) => "margin_rate_land",
            RuleField::MarginRate(LoanCategory::Construction) => "margin_rate_construction",
            RuleField::MarginRate(LoanCategory::Machinery) => "margin_rate_machinery",
            RuleField::MarginRate(LoanCategory::Utilities) => "margin_rate_utilities",
            RuleField::MarginRate(LoanCategory::Other) => "margin_rate_other",
        }
    }

    /// Everything except the DSCR target is a fraction expected in `[0, 1]`.
    pub const fn is_fraction(self) -> bool {
        !matches!(self, RuleField::IdealDscr)
    }
}

pub(crate) fn field_for_label(label: &str) -> Option<RuleField> {
    let key = rule_key(label);
    RuleField::ordered().into_iter().find(|field| {
        rule_key(field.source_label()) == key || rule_key(field.field_name()) == key
    })
}

#[cfg(test)]
pub(crate) fn lookup_for_tests(label: &str) -> Option<RuleField> {
    field_for_label(label)
}
