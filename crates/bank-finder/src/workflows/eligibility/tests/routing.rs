use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::eligibility::router::evaluate_handler;
use crate::workflows::eligibility::{eligibility_router, ProposalInput};

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).expect("serialize")))
        .expect("request")
}

fn proposal_payload() -> Value {
    serde_json::to_value(proposal_input()).expect("serialize proposal")
}

fn router() -> Router {
    eligibility_router(service())
}

#[tokio::test]
async fn evaluate_handler_rejects_negative_amounts() {
    let input = ProposalInput {
        land_loan: -10.0,
        ..proposal_input()
    };

    let response = evaluate_handler::<SheetSource>(State(service()), axum::Json(input)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("land_loan"));
}

#[tokio::test]
async fn evaluate_route_returns_partitioned_report() {
    let response = router()
        .oneshot(post_json("/api/v1/eligibility/evaluate", &proposal_payload()))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;

    let eligible: Vec<&str> = body["eligible"]
        .as_array()
        .expect("eligible array")
        .iter()
        .map(|entry| entry["lender"].as_str().expect("lender"))
        .collect();
    assert_eq!(eligible, vec!["Gamma Bank", "Alpha Bank"]);
    assert_eq!(body["rejected"][0]["lender"], json!("Beta Bank"));
    assert_eq!(body["rejected"][0]["is_eligible"], json!(false));
    assert_eq!(
        body["rejected"][0]["reject_reason"],
        json!("Security_OK,Margin_OK,DSCR_OK")
    );
    assert!(body["eligible"][0].get("reject_reason").is_none());
    assert_eq!(body["parameter_matrix"][1]["security_ok"], json!(false));
    assert_eq!(body["proposal"]["project_cost"], json!(1_650_000.0));
}

#[tokio::test]
async fn evaluate_route_applies_defaults_for_missing_fields() {
    let response = router()
        .oneshot(post_json(
            "/api/v1/eligibility/evaluate",
            &json!({ "land_loan": 100000.0 }),
        ))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["proposal"]["primary_security"], json!("yes"));
    assert_eq!(body["eligible"], json!([]));
    assert_eq!(body["rejected"].as_array().expect("rejected").len(), 3);
}

#[tokio::test]
async fn export_route_streams_workbook() {
    let response = router()
        .oneshot(post_json("/api/v1/eligibility/export", &proposal_payload()))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .expect("ascii header")
        .to_string();
    assert!(disposition.contains("Loan_Bank_Eligibility_Report.xlsx"));

    let body = read_body(response).await;
    assert!(body.starts_with(b"PK"));
}

#[tokio::test]
async fn rules_route_lists_lenders_in_sheet_order() {
    let response = router()
        .oneshot(
            Request::get("/api/v1/rules")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let lenders: Vec<&str> = body["lenders"]
        .as_array()
        .expect("lenders array")
        .iter()
        .map(|policy| policy["lender"].as_str().expect("lender"))
        .collect();
    assert_eq!(lenders, vec!["Alpha Bank", "Beta Bank", "Gamma Bank"]);
    assert!(body["loaded_at"].is_string());
}

#[tokio::test]
async fn reload_route_swaps_in_updated_sheet() {
    let service = service();
    let router = eligibility_router(Arc::clone(&service));

    service
        .catalog()
        .source()
        .replace("Criteria,Delta Bank\nMinSec,50%\nLowROI,8%\nHighROI,12%\nMin_PF,0.25%\nMax_PF,1%\nIdeal_DSCR,1.25\nMargin4LandPurchaseTL,25%\nMargin4ConstructionTL,25%\nMargin4MTL,25%\nMargin4UtilitiesTL,25%\nMargin4OTL,25%\n");

    let response = router
        .oneshot(
            Request::post("/api/v1/rules/reload")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], json!("reloaded"));
    assert_eq!(body["lenders"], json!(1));

    let lenders: Vec<String> = service.rules().lenders().map(|id| id.to_string()).collect();
    assert_eq!(lenders, vec!["Delta Bank".to_string()]);
}

#[tokio::test]
async fn failed_reload_keeps_previous_rules() {
    let service = service();
    let router = eligibility_router(Arc::clone(&service));
    let before = service.rules();

    service
        .catalog()
        .source()
        .replace("Criteria,Delta Bank\nMinSec,50%\n");

    let response = router
        .oneshot(
            Request::post("/api/v1/rules/reload")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("Delta Bank"));
    assert!(Arc::ptr_eq(&before, &service.rules()));
}
