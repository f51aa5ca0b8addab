//! AI tools with scripted language models.

mod common;

use std::sync::Arc;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::ErrorCode;
use serde_json::json;

use common::{harness, json_body, market, ScriptedModel};
use finreport_ext_file::InMemoryReportSink;
use finreport_mcp::tools::ai::{AiReportParams, AnalyzeCompanyParams, InvestmentAdviceParams};
use finreport_mcp::FinReportServer;
use finreport_traits::ReportSink;

fn params<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Parameters<T> {
    Parameters(serde_json::from_value(value).unwrap())
}

#[tokio::test]
async fn test_primary_backend_answer_is_not_degraded() {
    let primary = ScriptedModel::answering("ollama", "Strong balance sheet.");
    let secondary = ScriptedModel::answering("openai", "unused");
    let h = harness(vec![primary.clone(), secondary.clone()]);

    let body = json_body(
        &h.server
            .ai_analyze_company(params::<AnalyzeCompanyParams>(json!({ "symbol": "aapl" })))
            .await
            .unwrap(),
    );
    assert_eq!(body["analysis"], "Strong balance sheet.");
    assert_eq!(body["backend"], "ollama");
    assert_eq!(body["degraded"], false);
    assert_eq!(body["analysis_type"], "comprehensive");
    assert_eq!(body["company"], "Apple Inc.");
    assert_eq!(secondary.calls(), 0);

    // profile and recent returns reach the prompt
    let prompt = primary.last_prompt();
    assert!(prompt.contains("Apple Inc. (AAPL)"));
    assert!(prompt.contains("1-month return: 21.00%"));
}

#[tokio::test]
async fn test_fallback_answer_is_degraded() {
    let primary = ScriptedModel::failing("ollama");
    let secondary = ScriptedModel::answering("openai", "Hold.");
    let h = harness(vec![primary.clone(), secondary]);

    let body = json_body(
        &h.server
            .ai_investment_advice(params::<InvestmentAdviceParams>(
                json!({ "symbol": "MSFT", "investment_horizon": "long_term" }),
            ))
            .await
            .unwrap(),
    );
    assert_eq!(body["advice"], "Hold.");
    assert_eq!(body["backend"], "openai");
    assert_eq!(body["degraded"], true);
    assert_eq!(body["investment_horizon"], "long_term");
    assert_eq!(primary.calls(), 1);
}

#[tokio::test]
async fn test_all_backends_failing_is_internal_error() {
    let h = harness(vec![ScriptedModel::failing("ollama"), ScriptedModel::failing("openai")]);
    let err = h
        .server
        .ai_analyze_company(params::<AnalyzeCompanyParams>(json!({ "symbol": "AAPL" })))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    assert_eq!(err.data, Some(json!({ "kind": "ai_unavailable" })));
    assert!(err.message.contains("ollama"));
}

#[tokio::test]
async fn test_offline_placeholder_is_marked() {
    let server = FinReportServer::builder()
        .with_market_data(market())
        .with_model(ScriptedModel::failing("ollama"))
        .with_offline_fallback(true)
        .build();
    let body = json_body(
        &server
            .ai_analyze_company(params::<AnalyzeCompanyParams>(
                json!({ "symbol": "AAPL", "analysis_type": "risk" }),
            ))
            .await
            .unwrap(),
    );
    assert_eq!(body["backend"], "offline");
    assert_eq!(body["degraded"], true);
    assert!(body["analysis"]
        .as_str()
        .unwrap()
        .starts_with("[offline placeholder]"));
}

#[tokio::test]
async fn test_unknown_symbol_and_bad_choice_rejected() {
    let model = ScriptedModel::answering("ollama", "x");
    let h = harness(vec![model.clone()]);

    let err = h
        .server
        .ai_analyze_company(params::<AnalyzeCompanyParams>(json!({ "symbol": "ZZZZ" })))
        .await
        .unwrap_err();
    assert_eq!(err.data, Some(json!({ "kind": "not_found" })));

    let err = h
        .server
        .ai_generate_report(params::<AiReportParams>(
            json!({ "symbol": "AAPL", "report_style": "poetic" }),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_ai_generate_report_adds_title_and_saves_markdown() {
    let reports = Arc::new(InMemoryReportSink::new());
    let server = FinReportServer::builder()
        .with_market_data(market())
        .with_report_sink(reports.clone())
        .with_model(ScriptedModel::answering("ollama", "Revenue grew steadily."))
        .build();

    let body = json_body(
        &server
            .ai_generate_report(params::<AiReportParams>(json!({ "symbol": "AAPL" })))
            .await
            .unwrap(),
    );
    let name = body["report_name"].as_str().unwrap();
    assert!(name.starts_with("ai_report_AAPL_"));
    assert!(name.ends_with(".md"));
    assert_eq!(body["report_style"], "professional");
    assert_eq!(body["degraded"], false);

    let stored = reports.read(name).await.unwrap();
    assert!(stored
        .content
        .starts_with("# Apple Inc. (AAPL) Financial Report"));
    assert!(stored.content.contains("Revenue grew steadily."));
}

#[tokio::test]
async fn test_ai_status_reports_each_backend() {
    let h = harness(vec![ScriptedModel::answering("ollama", "x")]);
    let body = json_body(&h.server.ai_status().await.unwrap());
    assert_eq!(body["healthy"], 1);
    assert_eq!(body["backends"][0]["backend"], "ollama");
    assert_eq!(body["backends"][0]["models"], json!(["scripted-1"]));
    assert_eq!(body["offline_fallback"], false);
}
