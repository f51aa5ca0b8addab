//! Report rendering and the built-in report templates.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use finreport_core::analysis::{ReturnsSummary, VolatilitySummary};
use finreport_traits::{CompanyProfile, PriceHistory};

/// URI prefix shared by every report resource.
pub const RESOURCE_PREFIX: &str = "financial://reports/";

/// URI prefix of generated reports.
pub const GENERATED_PREFIX: &str = "financial://reports/generated/";

const RULE: &str = "====================";

/// A static report template published as a resource.
#[derive(Debug, Clone, Copy)]
pub struct ReportTemplate {
    /// Resource URI
    pub uri: &'static str,
    /// Display name
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
    /// Template body
    pub body: &'static str,
}

/// The templates listed by `list_resources`.
pub const TEMPLATES: [ReportTemplate; 3] = [
    ReportTemplate {
        uri: "financial://reports/stock_analysis_template",
        name: "Stock analysis report template",
        description: "Standard single-stock analysis report layout",
        body: STOCK_ANALYSIS_TEMPLATE,
    },
    ReportTemplate {
        uri: "financial://reports/portfolio_template",
        name: "Portfolio report template",
        description: "Portfolio composition and performance report layout",
        body: PORTFOLIO_TEMPLATE,
    },
    ReportTemplate {
        uri: "financial://reports/market_analysis_template",
        name: "Market analysis report template",
        description: "Market overview report layout",
        body: MARKET_ANALYSIS_TEMPLATE,
    },
];

const STOCK_ANALYSIS_TEMPLATE: &str = "\
Stock Analysis Report Template
====================

Basic information:
- Symbol: [SYMBOL]
- Company: [COMPANY_NAME]
- Industry: [INDUSTRY]
- Analysis date: [DATE]

Price analysis:
- Current price: $[CURRENT_PRICE]
- 52-week high: $[52W_HIGH]
- 52-week low: $[52W_LOW]
- Price change: $[PRICE_CHANGE] ([PRICE_CHANGE_PCT]%)

Financial metrics:
- Market cap: [MARKET_CAP]
- P/E ratio: [PE_RATIO]
- P/B ratio: [PB_RATIO]
- Dividend yield: [DIVIDEND_YIELD]%

Risk:
- Daily volatility: [VOLATILITY]%
- Annualized volatility: [ANNUALIZED_VOLATILITY]%

Recommendation: [RECOMMENDATION]

Risk warnings:
[RISK_WARNINGS]
";

const PORTFOLIO_TEMPLATE: &str = "\
Portfolio Report Template
====================

Generated: [DATE]

Holdings:
- [SYMBOL]: weight [WEIGHT]%, 1-month return [RETURN]%

Performance summary:
- Portfolio 1-month return: [PORTFOLIO_RETURN]%
- Best holding: [BEST_SYMBOL] ([BEST_RETURN]%)
- Worst holding: [WORST_SYMBOL] ([WORST_RETURN]%)

Notes:
[NOTES]
";

const MARKET_ANALYSIS_TEMPLATE: &str = "\
Market Analysis Report Template
====================

Analysis date: [DATE]

Market overview:
- Major indices: [INDICES]
- Market trend: [TREND]
- Breadth: [BREADTH]

Sector performance:
- Leading sectors: [LEADING_SECTORS]
- Lagging sectors: [LAGGING_SECTORS]

Macro factors:
- Rates: [RATES]
- Inflation: [INFLATION]

Outlook:
[OUTLOOK]
";

/// Template by URI.
pub fn template(uri: &str) -> Option<&'static ReportTemplate> {
    TEMPLATES.iter().find(|t| t.uri == uri)
}

/// Resource URI of a generated report.
pub fn generated_uri(name: &str) -> String {
    format!("{GENERATED_PREFIX}{name}")
}

/// `YYYYmmdd_HHMMSS` stamp used in report names.
pub fn report_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Money with two decimals, or `n/a`.
pub fn format_money(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("${v:.2}"))
}

/// Plain number with two decimals, or `n/a`.
pub fn format_number(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

/// Percentage (already scaled) with two decimals, or `n/a`.
pub fn format_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}%"))
}

/// Large amounts with a T/B/M suffix, or `n/a`.
pub fn format_large(value: Option<f64>) -> String {
    let Some(v) = value else {
        return "n/a".to_string();
    };
    let abs = v.abs();
    if abs >= 1e12 {
        format!("${:.2}T", v / 1e12)
    } else if abs >= 1e9 {
        format!("${:.2}B", v / 1e9)
    } else if abs >= 1e6 {
        format!("${:.2}M", v / 1e6)
    } else {
        format!("${v:.0}")
    }
}

/// Inputs of a rendered stock report.
#[derive(Debug, Clone)]
pub struct StockReport<'a> {
    /// Company profile
    pub profile: &'a CompanyProfile,
    /// Price history the figures come from
    pub history: &'a PriceHistory,
    /// Return statistics of the history
    pub returns: &'a ReturnsSummary,
    /// Volatility of the history, detailed reports only
    pub volatility: Option<&'a VolatilitySummary>,
    /// basic or detailed
    pub report_type: &'a str,
    /// Market data source name
    pub source: &'a str,
    /// Generation time
    pub generated_at: DateTime<Utc>,
}

/// Renders a plain-text stock report.
pub fn render_stock_report(report: &StockReport<'_>) -> String {
    let p = report.profile;
    let h = report.history;
    let latest = h.latest_close();
    let change = latest.zip(h.first_close()).map(|(last, first)| last - first);

    let mut out = String::new();
    let _ = writeln!(out, "Stock Analysis Report\n{RULE}\n");
    let _ = writeln!(out, "Symbol: {}", p.symbol);
    let _ = writeln!(out, "Company: {}", p.name);
    let _ = writeln!(out, "Report type: {}", report.report_type);
    let _ = writeln!(
        out,
        "Generated at: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "Data source: {}\n", report.source);

    let _ = writeln!(out, "Price ({} history, {} bars):", h.range, h.interval);
    let _ = writeln!(out, "- Latest close: {}", format_money(latest));
    let _ = writeln!(
        out,
        "- Change: {} ({})",
        format_money(change),
        format_pct(Some(report.returns.total_return_pct))
    );
    let _ = writeln!(
        out,
        "- Range: {} - {}",
        format_money(h.low()),
        format_money(h.high())
    );
    let _ = writeln!(out, "- Total volume: {}", h.total_volume());

    if let Some(vol) = report.volatility {
        let r = report.returns;
        let _ = writeln!(out, "\nReturns and risk ({} periods):", r.return_count);
        let _ = writeln!(out, "- Average return: {:.2}%", r.avg_return_pct);
        let _ = writeln!(out, "- Best period: {:.2}%", r.max_return_pct);
        let _ = writeln!(out, "- Worst period: {:.2}%", r.min_return_pct);
        let _ = writeln!(out, "- Volatility: {:.2}%", vol.volatility_pct);
        let _ = writeln!(
            out,
            "- Annualized volatility: {:.2}%",
            vol.annualized_volatility_pct
        );

        let _ = writeln!(out, "\nFundamentals:");
        let _ = writeln!(
            out,
            "- Sector: {} / {}",
            p.sector.as_deref().unwrap_or("n/a"),
            p.industry.as_deref().unwrap_or("n/a")
        );
        let _ = writeln!(out, "- Market cap: {}", format_large(p.market_cap));
        let _ = writeln!(out, "- P/E ratio: {}", format_number(p.trailing_pe));
        let _ = writeln!(out, "- P/B ratio: {}", format_number(p.price_to_book));
        let _ = writeln!(
            out,
            "- Dividend yield: {}",
            format_pct(p.dividend_yield.map(|y| y * 100.0))
        );
        let _ = writeln!(
            out,
            "- 52-week range: {} - {}",
            format_money(p.fifty_two_week_low),
            format_money(p.fifty_two_week_high)
        );
    }

    let _ = writeln!(out, "\n{RULE}");
    out
}

/// One line of a portfolio report.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Holding {
    /// Symbol
    pub symbol: String,
    /// Normalized weight in percent
    pub weight_pct: f64,
    /// Total return over the history in percent
    pub total_return_pct: f64,
    /// Latest close
    pub latest_price: Option<f64>,
}

/// Renders a plain-text portfolio report.
pub fn render_portfolio_report(
    holdings: &[Holding],
    portfolio_return_pct: f64,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Portfolio Report\n{RULE}\n");
    let _ = writeln!(
        out,
        "Generated at: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "Holdings:");
    for h in holdings {
        let _ = writeln!(
            out,
            "- {}: weight {:.2}%, 1-month return {:.2}%, last {}",
            h.symbol,
            h.weight_pct,
            h.total_return_pct,
            format_money(h.latest_price)
        );
    }

    let _ = writeln!(out, "\nPerformance summary:");
    let _ = writeln!(out, "- Portfolio 1-month return: {portfolio_return_pct:.2}%");
    let by_return = |a: &&Holding, b: &&Holding| a.total_return_pct.total_cmp(&b.total_return_pct);
    if let Some(best) = holdings.iter().max_by(by_return) {
        let _ = writeln!(
            out,
            "- Best holding: {} ({:.2}%)",
            best.symbol, best.total_return_pct
        );
    }
    if let Some(worst) = holdings.iter().min_by(by_return) {
        let _ = writeln!(
            out,
            "- Worst holding: {} ({:.2}%)",
            worst.symbol, worst.total_return_pct
        );
    }

    let _ = writeln!(out, "\n{RULE}");
    out
}

/// Returns `content` as markdown, adding a title block when it has none.
pub fn ensure_markdown(content: &str, name: &str, symbol: &str, at: DateTime<Utc>) -> String {
    let trimmed = content.trim();
    if trimmed.starts_with('#') {
        return format!("{trimmed}\n");
    }
    format!(
        "# {name} ({symbol}) Financial Report\n\n\
         **Generated:** {date}\n\n\
         **Disclaimer:** This report was generated by a language model and is not investment advice.\n\n\
         {trimmed}\n",
        date = at.format("%Y-%m-%d"),
    )
}
