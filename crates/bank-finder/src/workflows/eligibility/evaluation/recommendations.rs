use super::LenderAssessment;
use crate::workflows::eligibility::domain::CheckKind;

/// Sole recommendation for a lender whose checks all pass.
pub const NO_ACTION_REQUIRED: &str = "Eligible — no action required.";

/// One remediation step per failing check, ordered security, margin, ROI, PF, DSCR.
pub fn recommend(assessment: &LenderAssessment) -> Vec<String> {
    let failed = assessment.checks.failed();
    if failed.is_empty() {
        return vec![NO_ACTION_REQUIRED.to_string()];
    }

    failed
        .into_iter()
        .map(|check| remediation(assessment, check))
        .collect()
}

fn remediation(assessment: &LenderAssessment, check: CheckKind) -> String {
    let pricing = &assessment.pricing;
    match check {
        // Coverage is undefined without a loan, so there is no collateral gap to close.
        CheckKind::Security if assessment.security.gap <= 0.0 => {
            "Request a loan amount so security coverage can be assessed".to_string()
        }
        CheckKind::Security => format!("Add security of {:.0}", assessment.security.gap),
        CheckKind::Margin => format!("Add promoter margin of {:.0}", assessment.margin.gap),
        CheckKind::Roi => format!(
            "Adjust ROI to {:.2}% - {:.2}%",
            pricing.roi_band.low * 100.0,
            pricing.roi_band.high * 100.0
        ),
        CheckKind::Pf => format!(
            "Adjust PF to {:.2}% - {:.2}%",
            pricing.pf_band.low * 100.0,
            pricing.pf_band.high * 100.0
        ),
        CheckKind::Dscr => format!("Improve DSCR to {:.2}", pricing.ideal_dscr),
    }
}
