use std::fmt;

use serde::{Deserialize, Serialize};

/// Lender identifier as it appears in the rule table header.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LenderId(pub String);

impl LenderId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Term-loan purposes that attract a lender-specific margin rate.
///
/// The cash-credit requirement is deliberately absent: it counts towards the total loan but
/// never towards the promoter margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanCategory {
    Land,
    Construction,
    Machinery,
    Utilities,
    Other,
}

impl LoanCategory {
    pub const fn ordered() -> [LoanCategory; 5] {
        [
            LoanCategory::Land,
            LoanCategory::Construction,
            LoanCategory::Machinery,
            LoanCategory::Utilities,
            LoanCategory::Other,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            LoanCategory::Land => "Land Purchase",
            LoanCategory::Construction => "Construction",
            LoanCategory::Machinery => "Machinery",
            LoanCategory::Utilities => "Utilities",
            LoanCategory::Other => "Other Expenses",
        }
    }
}

/// Whether land and building are already pledged to the lender as primary security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityPledge {
    #[default]
    #[serde(alias = "Yes", alias = "YES")]
    Yes,
    #[serde(alias = "No", alias = "NO")]
    No,
}

impl SecurityPledge {
    pub const fn is_pledged(self) -> bool {
        matches!(self, SecurityPledge::Yes)
    }

    pub const fn label(self) -> &'static str {
        match self {
            SecurityPledge::Yes => "Yes",
            SecurityPledge::No => "No",
        }
    }
}

/// Underwriting checks applied to every lender, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CheckKind {
    Security,
    Margin,
    Roi,
    Pf,
    Dscr,
}

impl CheckKind {
    pub const fn ordered() -> [CheckKind; 5] {
        [
            CheckKind::Security,
            CheckKind::Margin,
            CheckKind::Roi,
            CheckKind::Pf,
            CheckKind::Dscr,
        ]
    }

    /// Column name used in the parameter matrix and in reject reasons.
    pub const fn label(self) -> &'static str {
        match self {
            CheckKind::Security => "Security_OK",
            CheckKind::Margin => "Margin_OK",
            CheckKind::Roi => "ROI_OK",
            CheckKind::Pf => "PF_OK",
            CheckKind::Dscr => "DSCR_OK",
        }
    }
}

/// Raw proposal details as captured by a form or API client.
///
/// Percentages (`expected_roi_pct`, `expected_pf_pct`) are entered as whole percentages,
/// e.g. `10.5` for 10.5%. Every amount defaults to zero when omitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalInput {
    pub primary_security: SecurityPledge,
    pub land_cost: f64,
    pub land_loan: f64,
    pub construction_cost: f64,
    pub construction_loan: f64,
    pub machinery_cost: f64,
    pub machinery_loan: f64,
    pub utility_cost: f64,
    pub utility_loan: f64,
    pub contingencies: f64,
    pub other_loan: f64,
    pub cc_requirement: f64,
    pub other_security_value: f64,
    pub expected_roi_pct: f64,
    pub expected_pf_pct: f64,
    /// Promoter own funds plus unsecured loans.
    pub available_margin: f64,
    pub projected_dscr_year1: f64,
}

impl ProposalInput {
    fn numeric_fields(&self) -> [(&'static str, f64); 16] {
        [
            ("land_cost", self.land_cost),
            ("land_loan", self.land_loan),
            ("construction_cost", self.construction_cost),
            ("construction_loan", self.construction_loan),
            ("machinery_cost", self.machinery_cost),
            ("machinery_loan", self.machinery_loan),
            ("utility_cost", self.utility_cost),
            ("utility_loan", self.utility_loan),
            ("contingencies", self.contingencies),
            ("other_loan", self.other_loan),
            ("cc_requirement", self.cc_requirement),
            ("other_security_value", self.other_security_value),
            ("expected_roi_pct", self.expected_roi_pct),
            ("expected_pf_pct", self.expected_pf_pct),
            ("available_margin", self.available_margin),
            ("projected_dscr_year1", self.projected_dscr_year1),
        ]
    }
}

/// Validation errors raised before a proposal reaches the evaluator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProposalError {
    #[error("proposal field `{field}` must not be negative (found {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("proposal field `{field}` must be a finite number")]
    NonFinite { field: &'static str },
}

/// A validated proposal with its derived totals computed once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proposal {
    input: ProposalInput,
    project_cost: f64,
    required_total_loan: f64,
    security_value: f64,
}

impl Proposal {
    pub fn validate(input: ProposalInput) -> Result<Self, ProposalError> {
        for (field, value) in input.numeric_fields() {
            if !value.is_finite() {
                return Err(ProposalError::NonFinite { field });
            }
            if value < 0.0 {
                return Err(ProposalError::Negative { field, value });
            }
        }

        let project_cost = input.land_cost
            + input.construction_cost
            + input.machinery_cost
            + input.utility_cost
            + input.contingencies;

        let required_total_loan = input.land_loan
            + input.construction_loan
            + input.machinery_loan
            + input.utility_loan
            + input.other_loan
            + input.cc_requirement;

        // Land and building only count as collateral when not already pledged as primary.
        let security_value = if input.primary_security.is_pledged() {
            input.other_security_value
        } else {
            input.other_security_value + input.land_cost + input.construction_cost
        };

        // Finite inputs can still overflow once summed.
        for (field, total) in [
            ("project_cost", project_cost),
            ("required_total_loan", required_total_loan),
            ("security_value", security_value),
        ] {
            if !total.is_finite() {
                return Err(ProposalError::NonFinite { field });
            }
        }

        Ok(Self {
            input,
            project_cost,
            required_total_loan,
            security_value,
        })
    }

    pub fn input(&self) -> &ProposalInput {
        &self.input
    }

    pub fn project_cost(&self) -> f64 {
        self.project_cost
    }

    pub fn required_total_loan(&self) -> f64 {
        self.required_total_loan
    }

    pub fn security_value(&self) -> f64 {
        self.security_value
    }

    pub fn loan_for(&self, category: LoanCategory) -> f64 {
        match category {
            LoanCategory::Land => self.input.land_loan,
            LoanCategory::Construction => self.input.construction_loan,
            LoanCategory::Machinery => self.input.machinery_loan,
            LoanCategory::Utilities => self.input.utility_loan,
            LoanCategory::Other => self.input.other_loan,
        }
    }

    pub fn available_margin(&self) -> f64 {
        self.input.available_margin
    }

    /// Expected interest rate as a fraction.
    pub fn expected_roi(&self) -> f64 {
        self.input.expected_roi_pct / 100.0
    }

    /// Expected processing fee as a fraction.
    pub fn expected_pf(&self) -> f64 {
        self.input.expected_pf_pct / 100.0
    }

    pub fn projected_dscr(&self) -> f64 {
        self.input.projected_dscr_year1
    }
}

impl TryFrom<ProposalInput> for Proposal {
    type Error = ProposalError;

    fn try_from(value: ProposalInput) -> Result<Self, Self::Error> {
        Proposal::validate(value)
    }
}
