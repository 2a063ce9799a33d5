mod recommendations;
mod scoring;

pub use recommendations::{recommend, NO_ACTION_REQUIRED};
pub use scoring::{score, score_breakdown, PenaltyKind, ScoreBreakdown, ScorePenalty};

use super::domain::{CheckKind, LenderId, LoanCategory, Proposal};
use super::rules::{LenderPolicy, RuleTable};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("lender `{0}` is not present in the rule table")]
    UnknownLender(LenderId),
}

/// Requirement versus what the proposal offers. `gap` is signed: negative means surplus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageGap {
    pub required: f64,
    pub available: f64,
    pub gap: f64,
    /// Gap as a percentage of the requirement; zero when nothing is required.
    pub gap_pct: f64,
}

impl CoverageGap {
    fn measure(required: f64, available: f64) -> Self {
        let gap = required - available;
        let gap_pct = if required > 0.0 {
            gap / required * 100.0
        } else {
            0.0
        };

        Self {
            required,
            available,
            gap,
            gap_pct,
        }
    }
}

/// Inclusive range of acceptable fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

/// Pricing and repayment terms compared against a lender's bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricingTerms {
    pub expected_roi: f64,
    pub roi_band: Band,
    pub expected_pf: f64,
    pub pf_band: Band,
    pub projected_dscr: f64,
    pub ideal_dscr: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParameterChecks {
    pub security_ok: bool,
    pub margin_ok: bool,
    pub roi_ok: bool,
    pub pf_ok: bool,
    pub dscr_ok: bool,
}

impl ParameterChecks {
    pub fn passed(&self, check: CheckKind) -> bool {
        match check {
            CheckKind::Security => self.security_ok,
            CheckKind::Margin => self.margin_ok,
            CheckKind::Roi => self.roi_ok,
            CheckKind::Pf => self.pf_ok,
            CheckKind::Dscr => self.dscr_ok,
        }
    }

    pub fn all_passed(&self) -> bool {
        CheckKind::ordered()
            .into_iter()
            .all(|check| self.passed(check))
    }

    pub fn failed(&self) -> Vec<CheckKind> {
        CheckKind::ordered()
            .into_iter()
            .filter(|check| !self.passed(*check))
            .collect()
    }
}

/// Outcome of applying one lender's rules to a proposal, before scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LenderAssessment {
    pub lender: LenderId,
    pub security: CoverageGap,
    /// Security value over requested loan; zero when no loan is requested.
    pub security_coverage_ratio: f64,
    pub margin: CoverageGap,
    pub pricing: PricingTerms,
    pub checks: ParameterChecks,
}

impl LenderAssessment {
    pub fn is_eligible(&self) -> bool {
        self.checks.all_passed()
    }
}

/// Fully evaluated lender: rule checks, approval score and remediation steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    #[serde(flatten)]
    pub assessment: LenderAssessment,
    pub is_eligible: bool,
    /// Comma-joined names of the failing checks; omitted from JSON when eligible.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reject_reason: String,
    pub score: f64,
    pub recommendations: Vec<String>,
}

impl EvaluationResult {
    pub fn lender(&self) -> &LenderId {
        &self.assessment.lender
    }

    pub fn is_eligible(&self) -> bool {
        self.is_eligible
    }

    pub fn failed_checks(&self) -> Vec<CheckKind> {
        self.assessment.checks.failed()
    }

    /// Comma-joined names of the failing checks, empty when eligible.
    pub fn reject_reason(&self) -> &str {
        &self.reject_reason
    }
}

fn reject_reason(checks: &ParameterChecks) -> String {
    checks
        .failed()
        .into_iter()
        .map(CheckKind::label)
        .collect::<Vec<_>>()
        .join(",")
}

/// Applies a lender policy to a proposal. Pure: identical inputs give identical output.
pub fn assess(proposal: &Proposal, policy: &LenderPolicy) -> LenderAssessment {
    let required_total_loan = proposal.required_total_loan();
    let security_value = proposal.security_value();

    let security_coverage_ratio = if required_total_loan > 0.0 {
        security_value / required_total_loan
    } else {
        0.0
    };
    let security = CoverageGap::measure(
        policy.min_security_ratio * required_total_loan,
        security_value,
    );

    let margin_required = LoanCategory::ordered()
        .into_iter()
        .map(|category| policy.margin_rates.rate_for(category) * proposal.loan_for(category))
        .sum::<f64>();
    let margin = CoverageGap::measure(margin_required, proposal.available_margin());

    let pricing = PricingTerms {
        expected_roi: proposal.expected_roi(),
        roi_band: Band {
            low: policy.roi_low,
            high: policy.roi_high,
        },
        expected_pf: proposal.expected_pf(),
        pf_band: Band {
            low: policy.pf_min,
            high: policy.pf_max,
        },
        projected_dscr: proposal.projected_dscr(),
        ideal_dscr: policy.ideal_dscr,
    };

    let checks = ParameterChecks {
        security_ok: required_total_loan > 0.0
            && security_coverage_ratio >= policy.min_security_ratio,
        margin_ok: margin.available >= margin.required,
        roi_ok: pricing.roi_band.contains(pricing.expected_roi),
        pf_ok: pricing.pf_band.contains(pricing.expected_pf),
        dscr_ok: pricing.projected_dscr >= pricing.ideal_dscr,
    };

    LenderAssessment {
        lender: policy.lender.clone(),
        security,
        security_coverage_ratio,
        margin,
        pricing,
        checks,
    }
}

/// Assesses, scores and derives recommendations for a single lender policy.
pub fn evaluate(proposal: &Proposal, policy: &LenderPolicy) -> EvaluationResult {
    let assessment = assess(proposal, policy);
    let score = score(&assessment);
    let recommendations = recommend(&assessment);

    EvaluationResult {
        is_eligible: assessment.is_eligible(),
        reject_reason: reject_reason(&assessment.checks),
        assessment,
        score,
        recommendations,
    }
}

/// Looks up `lender` in the rule table and evaluates the proposal against it.
pub fn evaluate_lender(
    proposal: &Proposal,
    rules: &RuleTable,
    lender: &LenderId,
) -> Result<EvaluationResult, EvaluationError> {
    let policy = rules
        .policy(lender)
        .ok_or_else(|| EvaluationError::UnknownLender(lender.clone()))?;
    Ok(evaluate(proposal, policy))
}

/// Stateless evaluator bound to a snapshot of the rule table.
#[derive(Debug, Clone)]
pub struct EligibilityEngine {
    rules: Arc<RuleTable>,
}

impl EligibilityEngine {
    pub fn new(rules: Arc<RuleTable>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn evaluate(
        &self,
        proposal: &Proposal,
        lender: &LenderId,
    ) -> Result<EvaluationResult, EvaluationError> {
        evaluate_lender(proposal, &self.rules, lender)
    }

    /// Evaluates every lender in rule-table order.
    pub fn evaluate_all(&self, proposal: &Proposal) -> Vec<EvaluationResult> {
        self.rules
            .policies()
            .iter()
            .map(|policy| evaluate(proposal, policy))
            .collect()
    }
}
