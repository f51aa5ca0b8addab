//! Market data and report tools against in-memory capabilities.

mod common;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::ErrorCode;
use serde_json::json;

use common::{harness, json_body};
use finreport_mcp::tools::market::{FinancialInfoParams, MarketDataParams, StockPriceParams};
use finreport_mcp::tools::reports::{PortfolioReportParams, StockReportParams};
use finreport_traits::ReportSink;

fn params<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Parameters<T> {
    Parameters(serde_json::from_value(value).unwrap())
}

#[tokio::test]
async fn test_get_stock_price_summary() {
    let h = harness(vec![]);
    let body = json_body(
        &h.server
            .get_stock_price(params::<StockPriceParams>(json!({ "symbol": "aapl" })))
            .await
            .unwrap(),
    );
    assert_eq!(body["symbol"], "AAPL");
    assert_eq!(body["period"], "1mo");
    assert_eq!(body["data_points"], 3);
    assert_eq!(body["latest_price"], 121.0);
    assert_eq!(body["price_change"], 21.0);
    assert_eq!(body["price_change_pct"], 21.0);
    assert_eq!(body["volume"], 3_000_000);
    assert_eq!(body["source"], "memory");
}

#[tokio::test]
async fn test_get_stock_price_rejects_bad_interval_and_unknown_symbol() {
    let h = harness(vec![]);
    let err = h
        .server
        .get_stock_price(params::<StockPriceParams>(
            json!({ "symbol": "AAPL", "interval": "7d" }),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

    let err = h
        .server
        .get_stock_price(params::<StockPriceParams>(json!({ "symbol": "ZZZZ" })))
        .await
        .unwrap_err();
    assert_eq!(err.data, Some(json!({ "kind": "not_found" })));

    let err = h
        .server
        .get_stock_price(params::<StockPriceParams>(json!({ "symbol": "  " })))
        .await
        .unwrap_err();
    assert_eq!(err.data, Some(json!({ "kind": "invalid_input" })));
}

#[tokio::test]
async fn test_get_financial_info() {
    let h = harness(vec![]);
    let body = json_body(
        &h.server
            .get_financial_info(params::<FinancialInfoParams>(json!({ "symbol": "AAPL" })))
            .await
            .unwrap(),
    );
    assert_eq!(body["name"], "Apple Inc.");
    assert_eq!(body["industry"], "Consumer Electronics");
    assert_eq!(body["trailing_pe"], 29.4);

    let err = h
        .server
        .get_financial_info(params::<FinancialInfoParams>(
            json!({ "symbol": "AAPL", "info_type": "balance_sheet" }),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.data, Some(json!({ "kind": "unsupported" })));
}

#[tokio::test]
async fn test_get_market_data_reports_failures_inline() {
    let h = harness(vec![]);
    let body = json_body(
        &h.server
            .get_market_data(params::<MarketDataParams>(
                json!({ "symbols": ["AAPL", "NOPE", "msft"], "data_type": "market_cap" }),
            ))
            .await
            .unwrap(),
    );
    assert_eq!(body["count"], 3);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["results"][0], json!({ "symbol": "AAPL", "market_cap": 2.9e12 }));
    assert_eq!(body["results"][1]["symbol"], "NOPE");
    assert!(body["results"][1]["error"].as_str().unwrap().contains("not found"));
    assert_eq!(body["results"][2]["symbol"], "MSFT");
}

#[tokio::test]
async fn test_get_market_data_rejects_empty_list_and_bad_type() {
    let h = harness(vec![]);
    let err = h
        .server
        .get_market_data(params::<MarketDataParams>(json!({ "symbols": [] })))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

    let err = h
        .server
        .get_market_data(params::<MarketDataParams>(
            json!({ "symbols": ["AAPL"], "data_type": "eps" }),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
}

#[tokio::test]
async fn test_generate_stock_report_writes_to_sink() {
    let h = harness(vec![]);
    let body = json_body(
        &h.server
            .generate_stock_report(params::<StockReportParams>(
                json!({ "symbol": "AAPL", "report_type": "detailed" }),
            ))
            .await
            .unwrap(),
    );
    let name = body["report_name"].as_str().unwrap();
    assert!(name.starts_with("stock_report_AAPL_"));
    assert!(name.ends_with(".txt"));
    assert_eq!(body["total_return_pct"], 21.0);
    assert_eq!(body["volatility"]["data_points"], 2);

    let stored = h.reports.read(name).await.unwrap();
    assert!(stored.content.contains("Company: Apple Inc."));
    assert!(stored.content.contains("Annualized volatility"));
    assert!(stored.content.contains("Market cap: $2.90T"));
    assert_eq!(stored.content, body["report"].as_str().unwrap());
}

#[tokio::test]
async fn test_generate_stock_report_basic_omits_fundamentals() {
    let h = harness(vec![]);
    let body = json_body(
        &h.server
            .generate_stock_report(params::<StockReportParams>(json!({ "symbol": "MSFT" })))
            .await
            .unwrap(),
    );
    assert!(body["volatility"].is_null());
    assert!(!body["report"].as_str().unwrap().contains("Fundamentals"));

    let err = h
        .server
        .generate_stock_report(params::<StockReportParams>(
            json!({ "symbol": "MSFT", "report_type": "fancy" }),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert!(h.reports.len() == 1);
}

#[tokio::test]
async fn test_generate_portfolio_report_weights() {
    let h = harness(vec![]);
    let body = json_body(
        &h.server
            .generate_portfolio_report(params::<PortfolioReportParams>(
                json!({ "symbols": ["AAPL", "MSFT"], "weights": [3, 1] }),
            ))
            .await
            .unwrap(),
    );
    // AAPL +21%, MSFT -2%: 0.75 * 21 + 0.25 * -2
    assert_eq!(body["portfolio_return_pct"], 15.25);
    assert_eq!(body["holdings"][0]["weight_pct"], 75.0);
    assert_eq!(body["holdings"][1]["total_return_pct"], -2.0);
    assert!(body["report_name"]
        .as_str()
        .unwrap()
        .starts_with("portfolio_report_"));

    let equal = json_body(
        &h.server
            .generate_portfolio_report(params::<PortfolioReportParams>(
                json!({ "symbols": ["AAPL", "MSFT"] }),
            ))
            .await
            .unwrap(),
    );
    assert_eq!(equal["portfolio_return_pct"], 9.5);
}

#[tokio::test]
async fn test_generate_portfolio_report_validation() {
    let h = harness(vec![]);
    let err = h
        .server
        .generate_portfolio_report(params::<PortfolioReportParams>(
            json!({ "symbols": ["AAPL", "MSFT"], "weights": [1] }),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

    let err = h
        .server
        .generate_portfolio_report(params::<PortfolioReportParams>(json!({ "symbols": [] })))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert!(h.reports.is_empty());
}
