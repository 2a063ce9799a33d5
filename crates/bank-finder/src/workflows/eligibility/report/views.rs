use super::EligibilityReport;
use crate::workflows::eligibility::domain::{CheckKind, LenderId};
use crate::workflows::eligibility::evaluation::{EvaluationResult, ParameterChecks};
use serde::Serialize;

pub const ELIGIBLE_SHEET: &str = "Eligible";
pub const REJECTED_SHEET: &str = "Rejected";
pub const PARAMETER_CHECKS_SHEET: &str = "Parameter_Checks";
pub const RECOMMENDATIONS_SHEET: &str = "Recommendations";

const BANK_COLUMN: &str = "Bank";
const REJECT_REASON_COLUMN: &str = "Reject Reason";
const RECOMMENDATIONS_COLUMN: &str = "Recommendations";
const GAP_COLUMNS: [&str; 9] = [
    "Required Margin",
    "Available Margin",
    "Margin Gap",
    "Margin Gap %",
    "Required Security",
    "Available Security",
    "Security Gap",
    "Security Gap %",
    "Approval Score",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterCheckRow {
    pub bank: LenderId,
    #[serde(flatten)]
    pub checks: ParameterChecks,
}

impl ParameterCheckRow {
    pub(crate) fn from_result(result: &EvaluationResult) -> Self {
        Self {
            bank: result.lender().clone(),
            checks: result.assessment.checks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRow {
    pub bank: LenderId,
    /// Recommendations joined with `"; "`.
    pub recommendations: String,
}

impl RecommendationRow {
    pub(crate) fn from_result(result: &EvaluationResult) -> Self {
        Self {
            bank: result.lender().clone(),
            recommendations: result.recommendations.join("; "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRankingEntry {
    pub bank: LenderId,
    pub score: f64,
}

/// Binary indicator used when a check outcome is rendered as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckIndicator {
    Pass,
    Fail,
}

impl CheckIndicator {
    pub const fn from_passed(passed: bool) -> Self {
        if passed {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Fail => "Fail",
        }
    }

    /// Traffic-light glyph for terminal output.
    pub const fn light(self) -> &'static str {
        match self {
            Self::Pass => "🟢",
            Self::Fail => "🔴",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Check(CheckIndicator),
}

impl Cell {
    /// Plain-text rendering; numbers keep two decimals.
    pub fn display(&self) -> String {
        match self {
            Cell::Text(value) => value.clone(),
            Cell::Number(value) => format!("{value:.2}"),
            Cell::Check(indicator) => indicator.label().to_string(),
        }
    }
}

/// Header row plus data rows, without an index column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: &'static str,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|candidate| candidate == header)
    }
}

/// The four output tables handed to rendering and export.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTables {
    pub eligible: Table,
    pub rejected: Table,
    pub parameter_checks: Table,
    pub recommendations: Table,
}

impl ReportTables {
    pub(crate) fn from_report(report: &EligibilityReport) -> Self {
        Self {
            eligible: lender_table(ELIGIBLE_SHEET, &report.eligible, false),
            rejected: lender_table(REJECTED_SHEET, &report.rejected, true),
            parameter_checks: parameter_table(report),
            recommendations: recommendation_table(report),
        }
    }

    /// Tables in workbook sheet order.
    pub fn ordered(&self) -> [&Table; 4] {
        [
            &self.eligible,
            &self.rejected,
            &self.parameter_checks,
            &self.recommendations,
        ]
    }
}

fn lender_table(name: &'static str, results: &[EvaluationResult], with_reason: bool) -> Table {
    let mut headers = vec![BANK_COLUMN.to_string()];
    if with_reason {
        headers.push(REJECT_REASON_COLUMN.to_string());
    }
    headers.extend(GAP_COLUMNS.iter().map(|column| column.to_string()));

    let rows = results
        .iter()
        .map(|result| {
            let assessment = &result.assessment;
            let mut row = vec![Cell::Text(result.lender().to_string())];
            if with_reason {
                row.push(Cell::Text(result.reject_reason().to_string()));
            }
            row.extend([
                Cell::Number(assessment.margin.required),
                Cell::Number(assessment.margin.available),
                Cell::Number(assessment.margin.gap),
                Cell::Number(assessment.margin.gap_pct),
                Cell::Number(assessment.security.required),
                Cell::Number(assessment.security.available),
                Cell::Number(assessment.security.gap),
                Cell::Number(assessment.security.gap_pct),
                Cell::Number(result.score),
            ]);
            row
        })
        .collect();

    Table {
        name,
        headers,
        rows,
    }
}

fn parameter_table(report: &EligibilityReport) -> Table {
    let mut headers = vec![BANK_COLUMN.to_string()];
    headers.extend(
        CheckKind::ordered()
            .into_iter()
            .map(|check| check.label().to_string()),
    );

    let rows = report
        .parameter_matrix
        .iter()
        .map(|entry| {
            let mut row = vec![Cell::Text(entry.bank.to_string())];
            row.extend(CheckKind::ordered().into_iter().map(|check| {
                Cell::Check(CheckIndicator::from_passed(entry.checks.passed(check)))
            }));
            row
        })
        .collect();

    Table {
        name: PARAMETER_CHECKS_SHEET,
        headers,
        rows,
    }
}

fn recommendation_table(report: &EligibilityReport) -> Table {
    let rows = report
        .recommendations
        .iter()
        .map(|entry| {
            vec![
                Cell::Text(entry.bank.to_string()),
                Cell::Text(entry.recommendations.clone()),
            ]
        })
        .collect();

    Table {
        name: RECOMMENDATIONS_SHEET,
        headers: vec![
            BANK_COLUMN.to_string(),
            RECOMMENDATIONS_COLUMN.to_string(),
        ],
        rows,
    }
}
