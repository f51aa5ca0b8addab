//! Shared fixtures for the tool integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use rmcp::model::CallToolResult;
use serde_json::Value;

use finreport_ext_file::{InMemoryMarketData, InMemoryReportSink, SymbolSnapshot};
use finreport_mcp::FinReportServer;
use finreport_traits::{
    Completion, CompanyProfile, CompletionRequest, LanguageModel, PriceBar, TraitError,
};

/// Scripted backend: answers with `reply`, or fails when `reply` is None.
pub struct ScriptedModel {
    pub name: &'static str,
    pub healthy: bool,
    pub reply: Option<String>,
    pub calls: AtomicUsize,
    pub last_prompt: std::sync::Mutex<Option<String>>,
}

impl ScriptedModel {
    pub fn answering(name: &'static str, reply: &str) -> Arc<Self> {
        Arc::new(Self {
            name,
            healthy: true,
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: std::sync::Mutex::new(None),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            healthy: true,
            reply: None,
            calls: AtomicUsize::new(0),
            last_prompt: std::sync::Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> String {
        self.last_prompt.lock().unwrap().clone().unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn backend(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        "scripted-1"
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<Completion, TraitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(request.prompt.clone());
        match &self.reply {
            Some(text) => Ok(Completion {
                text: text.clone(),
                model: "scripted-1".into(),
            }),
            None => Err(TraitError::ConnectionFailed("connection refused".into())),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }
}

/// Daily bars ending 2025-03-31 with the given closes.
pub fn daily_bars(closes: &[f64]) -> Vec<PriceBar> {
    let end = Utc.with_ymd_and_hms(2025, 3, 31, 21, 0, 0).unwrap();
    let n = closes.len() as i64;
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| PriceBar {
            timestamp: end - Duration::days(n - 1 - i as i64),
            open: *close,
            high: close * 1.01,
            low: close * 0.99,
            close: *close,
            volume: 1_000_000,
        })
        .collect()
}

pub fn aapl() -> SymbolSnapshot {
    SymbolSnapshot {
        profile: CompanyProfile {
            symbol: "AAPL".into(),
            name: "Apple Inc.".into(),
            sector: Some("Technology".into()),
            industry: Some("Consumer Electronics".into()),
            market_cap: Some(2.9e12),
            trailing_pe: Some(29.4),
            price_to_book: Some(45.1),
            dividend_yield: Some(0.0051),
            fifty_two_week_high: Some(199.6),
            fifty_two_week_low: Some(164.1),
            current_price: Some(121.0),
            volume: Some(51_000_000),
        },
        bars: daily_bars(&[100.0, 110.0, 121.0]),
    }
}

pub fn msft() -> SymbolSnapshot {
    SymbolSnapshot {
        profile: CompanyProfile {
            symbol: "MSFT".into(),
            name: "Microsoft Corporation".into(),
            market_cap: Some(3.1e12),
            ..CompanyProfile::default()
        },
        bars: daily_bars(&[400.0, 396.0, 392.0]),
    }
}

pub fn market() -> Arc<InMemoryMarketData> {
    let market = InMemoryMarketData::new();
    market.insert(aapl());
    market.insert(msft());
    Arc::new(market)
}

pub struct Harness {
    pub server: FinReportServer,
    pub reports: Arc<InMemoryReportSink>,
}

pub fn harness(models: Vec<Arc<ScriptedModel>>) -> Harness {
    let reports = Arc::new(InMemoryReportSink::new());
    let mut builder = FinReportServer::builder()
        .with_market_data(market())
        .with_report_sink(reports.clone());
    for model in models {
        builder = builder.with_model(model);
    }
    Harness {
        server: builder.build(),
        reports,
    }
}

/// Parses the JSON text content of a tool result.
pub fn json_body(result: &CallToolResult) -> Value {
    let raw = serde_json::to_value(result).unwrap();
    let text = raw["content"][0]["text"].as_str().unwrap().to_string();
    serde_json::from_str(&text).unwrap()
}
