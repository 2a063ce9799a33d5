use std::io::Cursor;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::eligibility::domain::{LenderId, ProposalInput, SecurityPledge};
use crate::workflows::eligibility::rules::{
    LenderPolicy, MarginRates, RuleSource, RuleTable, RuleTableError,
};
use crate::workflows::eligibility::{EligibilityService, Proposal};

pub(super) const TOLERANCE: f64 = 1e-9;

pub(super) const RULE_SHEET: &str = "Criteria,Alpha Bank,Beta Bank,Gamma Bank\n\
MinSec,50%,70%,40%\n\
LowROI,8%,9%,7%\n\
HighROI,12%,11%,10%\n\
Min_PF,0.25%,0.5%,0%\n\
Max_PF,1%,1%,0.75%\n\
Ideal_DSCR,1.25,1.6,1.2\n\
Margin4LandPurchaseTL,25%,40%,25%\n\
Margin4ConstructionTL,25%,30%,25%\n\
Margin4MTL,25%,25%,20%\n\
Margin4UtilitiesTL,25%,25%,20%\n\
Margin4OTL,25%,30%,25%\n";

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn policy(name: &str) -> LenderPolicy {
    LenderPolicy {
        lender: LenderId::new(name),
        min_security_ratio: 0.5,
        roi_low: 0.08,
        roi_high: 0.12,
        pf_min: 0.0025,
        pf_max: 0.01,
        ideal_dscr: 1.25,
        margin_rates: MarginRates {
            land: 0.25,
            construction: 0.25,
            machinery: 0.25,
            utilities: 0.25,
            other: 0.25,
        },
    }
}

pub(super) fn table(policies: Vec<LenderPolicy>) -> Arc<RuleTable> {
    Arc::new(RuleTable::new(policies).expect("valid rule table"))
}

pub(super) fn sheet_table() -> Arc<RuleTable> {
    Arc::new(RuleTable::from_reader(Cursor::new(RULE_SHEET)).expect("rule sheet loads"))
}

/// One million requested, 600k of other security, 250k margin required at 25%.
pub(super) fn proposal_input() -> ProposalInput {
    ProposalInput {
        primary_security: SecurityPledge::Yes,
        land_cost: 400_000.0,
        land_loan: 200_000.0,
        construction_cost: 600_000.0,
        construction_loan: 400_000.0,
        machinery_cost: 500_000.0,
        machinery_loan: 300_000.0,
        utility_cost: 100_000.0,
        utility_loan: 50_000.0,
        contingencies: 50_000.0,
        other_loan: 50_000.0,
        cc_requirement: 0.0,
        other_security_value: 600_000.0,
        expected_roi_pct: 10.0,
        expected_pf_pct: 0.5,
        available_margin: 300_000.0,
        projected_dscr_year1: 1.5,
    }
}

pub(super) fn proposal() -> Proposal {
    Proposal::validate(proposal_input()).expect("valid proposal")
}

/// Fails every check against [`policy`].
pub(super) fn weak_proposal() -> Proposal {
    let input = ProposalInput {
        other_security_value: 300_000.0,
        available_margin: 200_000.0,
        expected_roi_pct: 15.0,
        expected_pf_pct: 2.0,
        projected_dscr_year1: 1.0,
        ..proposal_input()
    };
    Proposal::validate(input).expect("valid proposal")
}

/// In-memory rule source whose sheet can be swapped to exercise reloads.
pub(super) struct SheetSource {
    sheet: Mutex<String>,
}

impl SheetSource {
    pub(super) fn new(sheet: &str) -> Self {
        Self {
            sheet: Mutex::new(sheet.to_string()),
        }
    }

    pub(super) fn replace(&self, sheet: &str) {
        *self.sheet.lock().expect("sheet mutex poisoned") = sheet.to_string();
    }
}

impl RuleSource for SheetSource {
    fn describe(&self) -> String {
        "in-memory sheet".to_string()
    }

    fn load(&self) -> Result<RuleTable, RuleTableError> {
        let sheet = self.sheet.lock().expect("sheet mutex poisoned").clone();
        RuleTable::from_reader(Cursor::new(sheet))
    }
}

pub(super) fn service() -> Arc<EligibilityService<SheetSource>> {
    Arc::new(EligibilityService::from_source(SheetSource::new(RULE_SHEET)).expect("rules load"))
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = read_body(response).await;
    serde_json::from_slice(&body).expect("json payload")
}
