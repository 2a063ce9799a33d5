mod export;
pub mod views;

pub use export::{save_workbook, workbook_bytes, ExportError, REPORT_FILE_NAME};

use super::domain::{Proposal, SecurityPledge};
use super::evaluation::{EligibilityEngine, EvaluationResult};
use super::rules::RuleTable;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;
use views::{ParameterCheckRow, RecommendationRow, ReportTables, ScoreRankingEntry};

/// Totals derived from the proposal, shown alongside the lender results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalSummary {
    pub primary_security: SecurityPledge,
    pub project_cost: f64,
    pub required_total_loan: f64,
    pub security_value: f64,
}

impl ProposalSummary {
    fn from_proposal(proposal: &Proposal) -> Self {
        Self {
            primary_security: proposal.input().primary_security,
            project_cost: proposal.project_cost(),
            required_total_loan: proposal.required_total_loan(),
            security_value: proposal.security_value(),
        }
    }
}

/// Result set for one proposal evaluated against every lender in the rule table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityReport {
    pub proposal: ProposalSummary,
    /// Lenders passing every check, smallest margin gap first.
    pub eligible: Vec<EvaluationResult>,
    /// Lenders failing at least one check, smallest margin gap first.
    pub rejected: Vec<EvaluationResult>,
    /// Check outcomes per lender in rule-table order.
    pub parameter_matrix: Vec<ParameterCheckRow>,
    /// Recommendations per lender in rule-table order.
    pub recommendations: Vec<RecommendationRow>,
}

impl EligibilityReport {
    pub fn run(proposal: &Proposal, rules: Arc<RuleTable>) -> Self {
        Self::from_engine(proposal, &EligibilityEngine::new(rules))
    }

    pub fn from_engine(proposal: &Proposal, engine: &EligibilityEngine) -> Self {
        let results = engine.evaluate_all(proposal);

        let parameter_matrix = results.iter().map(ParameterCheckRow::from_result).collect();
        let recommendations = results
            .iter()
            .map(RecommendationRow::from_result)
            .collect();

        let (mut eligible, mut rejected): (Vec<_>, Vec<_>) = results
            .into_iter()
            .partition(EvaluationResult::is_eligible);
        eligible.sort_by(by_margin_gap);
        rejected.sort_by(by_margin_gap);

        debug!(
            lenders = engine.rules().len(),
            eligible = eligible.len(),
            rejected = rejected.len(),
            "proposal evaluated against lender rules"
        );

        Self {
            proposal: ProposalSummary::from_proposal(proposal),
            eligible,
            rejected,
            parameter_matrix,
            recommendations,
        }
    }

    pub fn tables(&self) -> ReportTables {
        ReportTables::from_report(self)
    }

    /// Eligible lenders with their approval scores, in eligible-table order.
    pub fn score_ranking(&self) -> Vec<ScoreRankingEntry> {
        self.eligible
            .iter()
            .map(|result| ScoreRankingEntry {
                bank: result.lender().clone(),
                score: result.score,
            })
            .collect()
    }
}

fn by_margin_gap(left: &EvaluationResult, right: &EvaluationResult) -> Ordering {
    left.assessment
        .margin
        .gap
        .total_cmp(&right.assessment.margin.gap)
        .then_with(|| left.lender().cmp(right.lender()))
}
