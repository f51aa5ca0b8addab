//! Snapshot market data sources.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Datelike, Duration, TimeZone, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use finreport_traits::error::TraitError;
use finreport_traits::market_data::{
    validate_history_request, CompanyProfile, MarketDataSource, PriceBar, PriceHistory, StockQuote,
};

/// Everything known about one symbol in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSnapshot {
    /// Company profile (its `symbol` is the snapshot key)
    pub profile: CompanyProfile,
    /// Bars in chronological order
    #[serde(default)]
    pub bars: Vec<PriceBar>,
}

/// Keeps the bars within `range` of the newest bar. `max` keeps everything.
fn bars_in_range(bars: &[PriceBar], range: &str) -> Vec<PriceBar> {
    let Some(last) = bars.last() else {
        return Vec::new();
    };
    let end = last.timestamp;
    let start = match range {
        "1d" => end - Duration::days(1),
        "5d" => end - Duration::days(5),
        "1mo" => end - Duration::days(30),
        "3mo" => end - Duration::days(91),
        "6mo" => end - Duration::days(182),
        "1y" => end - Duration::days(365),
        "2y" => end - Duration::days(730),
        "5y" => end - Duration::days(1826),
        "10y" => end - Duration::days(3652),
        "ytd" => Utc
            .with_ymd_and_hms(end.year(), 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(end),
        _ => return bars.to_vec(),
    };
    bars.iter()
        .filter(|b| b.timestamp >= start)
        .cloned()
        .collect()
}

// =============================================================================
// IN-MEMORY SOURCE
// =============================================================================

/// Market data held in memory, keyed by upper-case symbol.
///
/// The interval argument of [`MarketDataSource::price_history`] is not
/// resampled; bars are served at the granularity they were stored with.
#[derive(Debug, Default)]
pub struct InMemoryMarketData {
    symbols: DashMap<String, SymbolSnapshot>,
}

impl InMemoryMarketData {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a symbol.
    pub fn insert(&self, snapshot: SymbolSnapshot) {
        let key = snapshot.profile.symbol.to_ascii_uppercase();
        self.symbols.insert(key, snapshot);
    }

    /// Remove every symbol.
    pub fn clear(&self) {
        self.symbols.clear();
    }

    /// Number of symbols held.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True when no symbols are held.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn get(&self, symbol: &str) -> Result<SymbolSnapshot, TraitError> {
        self.symbols
            .get(&symbol.to_ascii_uppercase())
            .map(|s| s.clone())
            .ok_or_else(|| TraitError::NotFound(format!("symbol '{symbol}'")))
    }
}

#[async_trait]
impl MarketDataSource for InMemoryMarketData {
    fn name(&self) -> &str {
        "memory"
    }

    async fn price_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<PriceHistory, TraitError> {
        validate_history_request(range, interval)?;
        let snapshot = self.get(symbol)?;
        Ok(PriceHistory {
            symbol: snapshot.profile.symbol.clone(),
            range: range.to_string(),
            interval: interval.to_string(),
            bars: bars_in_range(&snapshot.bars, range),
        })
    }

    async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile, TraitError> {
        Ok(self.get(symbol)?.profile)
    }

    async fn quote(&self, symbol: &str) -> Result<StockQuote, TraitError> {
        let snapshot = self.get(symbol)?;
        let last = snapshot.bars.last();
        Ok(StockQuote {
            symbol: snapshot.profile.symbol.clone(),
            price: snapshot
                .profile
                .current_price
                .or_else(|| last.map(|b| b.close)),
            volume: snapshot.profile.volume.or_else(|| last.map(|b| b.volume)),
            market_cap: snapshot.profile.market_cap,
        })
    }
}

// =============================================================================
// JSON SNAPSHOT SOURCE
// =============================================================================

/// Market data loaded from a JSON file holding an array of
/// [`SymbolSnapshot`] objects.
#[derive(Debug)]
pub struct JsonMarketDataSource {
    file_path: PathBuf,
    inner: InMemoryMarketData,
}

impl JsonMarketDataSource {
    /// Create a source and load the file. A missing file yields an empty source.
    pub fn new(file_path: impl AsRef<Path>) -> Result<Self, TraitError> {
        let source = Self {
            file_path: file_path.as_ref().to_path_buf(),
            inner: InMemoryMarketData::new(),
        };
        source.reload()?;
        Ok(source)
    }

    /// Reload symbols from file, replacing what was loaded before.
    pub fn reload(&self) -> Result<(), TraitError> {
        self.inner.clear();
        if !self.file_path.exists() {
            tracing::warn!(path = %self.file_path.display(), "market data snapshot not found");
            return Ok(());
        }

        let content = std::fs::read_to_string(&self.file_path)
            .map_err(|e| TraitError::IoError(e.to_string()))?;
        let snapshots: Vec<SymbolSnapshot> =
            serde_json::from_str(&content).map_err(|e| TraitError::ParseError(e.to_string()))?;

        for mut snapshot in snapshots {
            snapshot.bars.sort_by_key(|b| b.timestamp);
            self.inner.insert(snapshot);
        }
        tracing::info!(
            path = %self.file_path.display(),
            symbols = self.inner.len(),
            "market data snapshot loaded"
        );
        Ok(())
    }
}

#[async_trait]
impl MarketDataSource for JsonMarketDataSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn price_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<PriceHistory, TraitError> {
        self.inner.price_history(symbol, range, interval).await
    }

    async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile, TraitError> {
        self.inner.company_profile(symbol).await
    }

    async fn quote(&self, symbol: &str) -> Result<StockQuote, TraitError> {
        self.inner.quote(symbol).await
    }
}
