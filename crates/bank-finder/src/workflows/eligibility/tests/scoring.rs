use super::common::*;
use crate::workflows::eligibility::domain::{Proposal, ProposalInput};
use crate::workflows::eligibility::evaluation::{
    assess, score, score_breakdown, PenaltyKind, ScorePenalty,
};

#[test]
fn eligible_lender_scores_full_marks() {
    let breakdown = score_breakdown(&assess(&proposal(), &policy("Alpha Bank")));

    assert!(breakdown.penalties.is_empty());
    assert_eq!(breakdown.total, 100.0);
}

#[test]
fn roi_above_band_costs_one_point_per_percentage_point() {
    let input = ProposalInput {
        expected_roi_pct: 15.0,
        ..proposal_input()
    };
    let proposal = Proposal::validate(input).expect("valid proposal");

    let breakdown = score_breakdown(&assess(&proposal, &policy("Alpha Bank")));

    assert_eq!(breakdown.penalties.len(), 1);
    assert_eq!(breakdown.penalties[0].kind, PenaltyKind::RoiAboveBand);
    assert_close(breakdown.penalties[0].points, 3.0);
    assert_close(breakdown.total, 97.0);
}

#[test]
fn surplus_security_adds_no_penalty() {
    let assessment = assess(&proposal(), &policy("Alpha Bank"));

    assert!(assessment.security.gap_pct < 0.0);
    assert!(score_breakdown(&assessment)
        .penalties
        .iter()
        .all(|penalty| penalty.kind != PenaltyKind::SecurityShortfall));
}

#[test]
fn penalties_apply_in_fixed_order_with_dscr_weighted_by_ten() {
    let breakdown = score_breakdown(&assess(&weak_proposal(), &policy("Alpha Bank")));

    let kinds: Vec<PenaltyKind> = breakdown
        .penalties
        .iter()
        .map(|penalty: &ScorePenalty| penalty.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            PenaltyKind::MarginShortfall,
            PenaltyKind::SecurityShortfall,
            PenaltyKind::RoiAboveBand,
            PenaltyKind::PfAboveBand,
            PenaltyKind::DscrShortfall,
        ]
    );

    let points: Vec<f64> = breakdown.penalties.iter().map(|penalty| penalty.points).collect();
    assert_close(points[0], 20.0);
    assert_close(points[1], 40.0);
    assert_close(points[2], 3.0);
    assert_close(points[3], 1.0);
    assert_close(points[4], 2.5);
    assert_close(breakdown.total, 33.5);
}

#[test]
fn below_band_pricing_is_penalized() {
    let input = ProposalInput {
        expected_roi_pct: 6.0,
        expected_pf_pct: 0.0,
        ..proposal_input()
    };
    let proposal = Proposal::validate(input).expect("valid proposal");

    let breakdown = score_breakdown(&assess(&proposal, &policy("Alpha Bank")));

    let kinds: Vec<PenaltyKind> = breakdown.penalties.iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![PenaltyKind::RoiBelowBand, PenaltyKind::PfBelowBand]);
    assert_close(breakdown.total, 100.0 - 2.0 - 0.25);
}

#[test]
fn score_is_clamped_at_zero() {
    let input = ProposalInput {
        other_security_value: 0.0,
        available_margin: 0.0,
        expected_roi_pct: 60.0,
        projected_dscr_year1: 0.0,
        ..proposal_input()
    };
    let proposal = Proposal::validate(input).expect("valid proposal");

    assert_eq!(score(&assess(&proposal, &policy("Alpha Bank"))), 0.0);
}

#[test]
fn score_stays_within_bounds_across_proposals() {
    let lenders = [policy("Alpha Bank"), {
        let mut strict = policy("Strict Bank");
        strict.min_security_ratio = 2.0;
        strict.ideal_dscr = 3.0;
        strict
    }];

    for security in [0.0, 250_000.0, 5_000_000.0] {
        for margin in [0.0, 100_000.0, 1_000_000.0] {
            for roi in [0.0, 10.0, 40.0] {
                let input = ProposalInput {
                    other_security_value: security,
                    available_margin: margin,
                    expected_roi_pct: roi,
                    ..proposal_input()
                };
                let proposal = Proposal::validate(input).expect("valid proposal");
                for lender in &lenders {
                    let value = score(&assess(&proposal, lender));
                    assert!((0.0..=100.0).contains(&value), "score {value} out of range");
                }
            }
        }
    }
}
