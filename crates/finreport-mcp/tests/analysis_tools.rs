//! compute_* tools through the server.

mod common;

use approx::assert_relative_eq;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::ErrorCode;
use serde_json::json;

use common::{harness, json_body};
use finreport_mcp::tools::analysis::{
    ComputeReturnsParams, ComputeSharpeParams, ComputeVolatilityParams,
};

fn params<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Parameters<T> {
    Parameters(serde_json::from_value(value).unwrap())
}

#[tokio::test]
async fn test_compute_returns_scenario() {
    let h = harness(vec![]);
    let result = h
        .server
        .compute_returns(params::<ComputeReturnsParams>(json!({ "prices": [100, 110, 121] })))
        .await
        .unwrap();
    let body = json_body(&result);
    assert_eq!(body["total_return_pct"], 21.0);
    assert_eq!(body["avg_return_pct"], 10.0);
    assert_eq!(body["return_count"], 2);
    assert_eq!(body["period"], "daily");
}

#[tokio::test]
async fn test_compute_returns_zero_price_is_division_by_zero() {
    let h = harness(vec![]);
    let err = h
        .server
        .compute_returns(params::<ComputeReturnsParams>(json!({ "prices": [100, 0, 50] })))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert_eq!(err.data, Some(json!({ "kind": "division_by_zero" })));
}

#[tokio::test]
async fn test_compute_returns_single_price_is_insufficient() {
    let h = harness(vec![]);
    let err = h
        .server
        .compute_returns(params::<ComputeReturnsParams>(json!({ "prices": [100] })))
        .await
        .unwrap_err();
    assert_eq!(err.data, Some(json!({ "kind": "insufficient_data" })));
}

#[tokio::test]
async fn test_compute_volatility_unknown_period_matches_daily() {
    let h = harness(vec![]);
    let returns = json!([0.01, -0.02, 0.015, -0.005]);

    let daily = json_body(
        &h.server
            .compute_volatility(params::<ComputeVolatilityParams>(
                json!({ "returns": returns, "period": "daily" }),
            ))
            .await
            .unwrap(),
    );
    let unknown = json_body(
        &h.server
            .compute_volatility(params::<ComputeVolatilityParams>(
                json!({ "returns": returns, "period": "fortnightly" }),
            ))
            .await
            .unwrap(),
    );

    assert_eq!(daily["volatility_pct"], 1.37);
    assert_relative_eq!(daily["annualized_volatility_pct"].as_f64().unwrap(), 21.74);
    assert_eq!(
        daily["annualized_volatility_pct"],
        unknown["annualized_volatility_pct"]
    );
    assert_eq!(unknown["period"], "daily");
}

#[tokio::test]
async fn test_compute_sharpe_ratio_scenario() {
    let h = harness(vec![]);
    let body = json_body(
        &h.server
            .compute_sharpe_ratio(params::<ComputeSharpeParams>(
                json!({ "returns": [0.01, 0.02, -0.01, 0.015] }),
            ))
            .await
            .unwrap(),
    );
    assert_eq!(body["risk_free_rate_pct"], 2.0);
    assert_relative_eq!(body["sharpe_ratio"].as_f64().unwrap(), 0.761, epsilon = 1e-9);
    assert_relative_eq!(
        body["annualized_sharpe_ratio"].as_f64().unwrap(),
        12.087,
        epsilon = 1e-3
    );
    assert_eq!(body["data_points"], 4);
}

#[tokio::test]
async fn test_compute_sharpe_ratio_constant_returns() {
    let h = harness(vec![]);
    let err = h
        .server
        .compute_sharpe_ratio(params::<ComputeSharpeParams>(
            json!({ "returns": [0.01, 0.01, 0.01], "risk_free_rate": 0.03 }),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.data, Some(json!({ "kind": "division_by_zero" })));
}
