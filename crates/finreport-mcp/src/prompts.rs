//! Prompt construction for the AI tools.

use std::fmt::Write as _;
use std::str::FromStr;

use finreport_core::analysis::ReturnsSummary;
use finreport_traits::{CompanyProfile, CompletionRequest};

use crate::error::ToolError;
use crate::templates::{format_large, format_money, format_number, format_pct};

macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident, $what:literal { $($variant:ident => $tag:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $(
                #[allow(missing_docs)]
                $variant,
            )+
        }

        impl $name {
            /// Accepted tags.
            pub const TAGS: &'static [&'static str] = &[$($tag),+];

            /// Wire tag.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ToolError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($tag => Ok($name::$variant),)+
                    other => Err(ToolError::invalid(format!(
                        "unknown {} '{}', expected one of: {}",
                        $what,
                        other,
                        Self::TAGS.join(", ")
                    ))),
                }
            }
        }
    };
}

choice_enum!(
    /// Focus of `ai_analyze_company`.
    AnalysisFocus, "analysis_type" {
        Financial => "financial",
        Investment => "investment",
        Risk => "risk",
        Comprehensive => "comprehensive",
    }
);

choice_enum!(
    /// Style of `ai_generate_report`.
    ReportStyle, "report_style" {
        Professional => "professional",
        Simple => "simple",
        Detailed => "detailed",
    }
);

choice_enum!(
    /// Horizon of `ai_investment_advice`.
    InvestmentHorizon, "investment_horizon" {
        ShortTerm => "short_term",
        MediumTerm => "medium_term",
        LongTerm => "long_term",
    }
);

const ANALYST_SYSTEM: &str = "You are a financial analyst. Be objective, cite the figures you \
are given, and state clearly when data is missing. Do not invent numbers.";

/// Company facts and recent performance handed to every prompt.
#[derive(Debug, Clone)]
pub struct CompanyContext<'a> {
    /// Profile from the market data source
    pub profile: &'a CompanyProfile,
    /// One-month return statistics, when history was available
    pub recent: Option<&'a ReturnsSummary>,
}

impl CompanyContext<'_> {
    fn facts(&self) -> String {
        let p = self.profile;
        let mut out = String::new();
        let _ = writeln!(out, "Company: {} ({})", p.name, p.symbol);
        let _ = writeln!(
            out,
            "Sector: {} / {}",
            p.sector.as_deref().unwrap_or("n/a"),
            p.industry.as_deref().unwrap_or("n/a")
        );
        let _ = writeln!(out, "Current price: {}", format_money(p.current_price));
        let _ = writeln!(out, "Market cap: {}", format_large(p.market_cap));
        let _ = writeln!(out, "Trailing P/E: {}", format_number(p.trailing_pe));
        let _ = writeln!(out, "Price/Book: {}", format_number(p.price_to_book));
        let _ = writeln!(
            out,
            "Dividend yield: {}",
            format_pct(p.dividend_yield.map(|y| y * 100.0))
        );
        let _ = writeln!(
            out,
            "52-week range: {} - {}",
            format_money(p.fifty_two_week_low),
            format_money(p.fifty_two_week_high)
        );
        if let Some(r) = self.recent {
            let _ = writeln!(
                out,
                "1-month return: {:.2}% (avg daily {:.2}%, best {:.2}%, worst {:.2}%)",
                r.total_return_pct, r.avg_return_pct, r.max_return_pct, r.min_return_pct
            );
        }
        out
    }
}

/// Prompt for `ai_analyze_company`.
pub fn analysis_prompt(ctx: &CompanyContext<'_>, focus: AnalysisFocus) -> CompletionRequest {
    let sections = match focus {
        AnalysisFocus::Financial => "profitability, valuation multiples and balance sheet signals",
        AnalysisFocus::Investment => "valuation, growth prospects and investment merit",
        AnalysisFocus::Risk => "market, sector and company-specific risks",
        AnalysisFocus::Comprehensive => {
            "financial condition, industry position, competitive advantages, risk factors and investment value"
        }
    };
    let prompt = format!(
        "Analyze {name} ({symbol}).\n\n{facts}\nFocus ({focus}): cover {sections}.",
        name = ctx.profile.name,
        symbol = ctx.profile.symbol,
        facts = ctx.facts(),
        focus = focus.as_str(),
    );
    CompletionRequest::new(prompt).with_system(ANALYST_SYSTEM)
}

/// Prompt for `ai_generate_report`.
pub fn report_prompt(ctx: &CompanyContext<'_>, style: ReportStyle) -> CompletionRequest {
    let shape = match style {
        ReportStyle::Professional => {
            "executive summary, company overview, financial analysis, business analysis, risk assessment, recommendation, conclusion"
        }
        ReportStyle::Simple => "a short summary, three key points and a one-line recommendation",
        ReportStyle::Detailed => {
            "executive summary, company overview, financial analysis with every figure above, business analysis, risk assessment, valuation discussion, recommendation, conclusion"
        }
    };
    let prompt = format!(
        "Write a {style} markdown report on {name} ({symbol}).\n\n{facts}\nSections: {shape}.",
        style = style.as_str(),
        name = ctx.profile.name,
        symbol = ctx.profile.symbol,
        facts = ctx.facts(),
    );
    CompletionRequest::new(prompt).with_system(ANALYST_SYSTEM)
}

/// Prompt for `ai_investment_advice`.
pub fn advice_prompt(ctx: &CompanyContext<'_>, horizon: InvestmentHorizon) -> CompletionRequest {
    let window = match horizon {
        InvestmentHorizon::ShortTerm => "under 6 months",
        InvestmentHorizon::MediumTerm => "6 to 24 months",
        InvestmentHorizon::LongTerm => "more than 2 years",
    };
    let prompt = format!(
        "Give {horizon} investment guidance ({window}) on {name} ({symbol}).\n\n{facts}\n\
         Include a rating (buy / hold / sell), a target price range, the reasoning, \
         the main risks and a suggested strategy.",
        horizon = horizon.as_str(),
        name = ctx.profile.name,
        symbol = ctx.profile.symbol,
        facts = ctx.facts(),
    );
    CompletionRequest::new(prompt).with_system(ANALYST_SYSTEM)
}
