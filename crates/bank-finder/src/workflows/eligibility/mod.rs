//! Lender eligibility matching for loan proposals.
//!
//! A proposal is validated once, then every lender policy in the rule table is applied to it:
//! security coverage, promoter margin, ROI and processing-fee bands and the DSCR floor. Each
//! lender receives pass/fail checks, an approval score and remediation steps, and the
//! aggregated report feeds the JSON API, the CLI and the spreadsheet export.

pub mod domain;
pub mod evaluation;
pub mod report;
pub mod router;
pub mod rules;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CheckKind, LenderId, LoanCategory, Proposal, ProposalError, ProposalInput, SecurityPledge,
};
pub use evaluation::{
    assess, evaluate, evaluate_lender, recommend, score, score_breakdown, EligibilityEngine,
    EvaluationError, EvaluationResult, LenderAssessment, ParameterChecks, NO_ACTION_REQUIRED,
};
pub use report::{EligibilityReport, ProposalSummary};
pub use router::eligibility_router;
pub use rules::{
    rule_source_for, CsvRuleSource, LenderPolicy, MarginRates, RuleCatalog, RuleField,
    RuleFormat, RuleSource, RuleTable, RuleTableError, XlsxRuleSource,
};
pub use service::{EligibilityService, EligibilityServiceError};
