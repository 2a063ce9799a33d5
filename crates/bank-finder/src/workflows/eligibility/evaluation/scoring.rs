use super::LenderAssessment;
use serde::Serialize;

const MAX_SCORE: f64 = 100.0;
/// Weight for band deviations expressed as fractions (one percentage point = one point).
const PERCENT_WEIGHT: f64 = 100.0;
/// DSCR is a plain ratio, so a shortfall of 0.1 costs one point.
const DSCR_WEIGHT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyKind {
    MarginShortfall,
    SecurityShortfall,
    RoiBelowBand,
    RoiAboveBand,
    PfAboveBand,
    PfBelowBand,
    DscrShortfall,
}

impl PenaltyKind {
    pub const fn label(self) -> &'static str {
        match self {
            PenaltyKind::MarginShortfall => "margin shortfall",
            PenaltyKind::SecurityShortfall => "security shortfall",
            PenaltyKind::RoiBelowBand => "ROI below band",
            PenaltyKind::RoiAboveBand => "ROI above band",
            PenaltyKind::PfAboveBand => "PF above band",
            PenaltyKind::PfBelowBand => "PF below band",
            PenaltyKind::DscrShortfall => "DSCR shortfall",
        }
    }
}

/// Points deducted for one deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScorePenalty {
    pub kind: PenaltyKind,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Non-zero deductions in the order they are applied.
    pub penalties: Vec<ScorePenalty>,
    pub total: f64,
}

/// Approval score in `[0, 100]`. Computed for eligible and rejected lenders alike.
pub fn score(assessment: &LenderAssessment) -> f64 {
    score_breakdown(assessment).total
}

pub fn score_breakdown(assessment: &LenderAssessment) -> ScoreBreakdown {
    let pricing = &assessment.pricing;

    let candidates = [
        (PenaltyKind::MarginShortfall, assessment.margin.gap_pct),
        (PenaltyKind::SecurityShortfall, assessment.security.gap_pct),
        (
            PenaltyKind::RoiBelowBand,
            (pricing.roi_band.low - pricing.expected_roi) * PERCENT_WEIGHT,
        ),
        (
            PenaltyKind::RoiAboveBand,
            (pricing.expected_roi - pricing.roi_band.high) * PERCENT_WEIGHT,
        ),
        (
            PenaltyKind::PfAboveBand,
            (pricing.expected_pf - pricing.pf_band.high) * PERCENT_WEIGHT,
        ),
        (
            PenaltyKind::PfBelowBand,
            (pricing.pf_band.low - pricing.expected_pf) * PERCENT_WEIGHT,
        ),
        (
            PenaltyKind::DscrShortfall,
            (pricing.ideal_dscr - pricing.projected_dscr) * DSCR_WEIGHT,
        ),
    ];

    let penalties: Vec<ScorePenalty> = candidates
        .into_iter()
        .filter(|(_, points)| *points > 0.0)
        .map(|(kind, points)| ScorePenalty { kind, points })
        .collect();

    let raw = penalties
        .iter()
        .fold(MAX_SCORE, |score, penalty| score - penalty.points);
    let total = if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, MAX_SCORE)
    };

    ScoreBreakdown { penalties, total }
}
