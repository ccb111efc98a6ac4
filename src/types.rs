use serde::Serialize;
use tabled::Tabled;

use crate::util::format_number;

/// One normalized row of the ads export. Field names are the canonical set
/// produced by the schema normalizer; numeric fields are already coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct AdRecord {
    pub ad_name: String,
    pub status: String,
    /// Opaque identifier; Shopee exports mix numeric and alphanumeric
    /// sequence values, so this is never parsed as a number.
    pub sequence: String,
    pub expense: f64,
    pub gmv: f64,
    pub roas: f64,
    pub items: f64,
}

/// One row of the product costing table.
#[derive(Debug, Clone, PartialEq)]
pub struct CostRecord {
    pub product_name: String,
    pub product_cost: f64,
    pub srp_price: f64,
}

impl CostRecord {
    /// Join key: uppercased, trimmed product name.
    pub fn product_key(&self) -> String {
        self.product_name.trim().to_uppercase()
    }
}

/// Match outcome for one ad, as exposed in the report tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Matched,
    Unmatched,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Matched => "Matched",
            MatchStatus::Unmatched => "Unmatched",
        }
    }
}

/// Run/off decision against break-even ROAS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunDecision {
    Run,
    Off,
}

impl RunDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunDecision::Run => "RUN",
            RunDecision::Off => "OFF",
        }
    }
}

/// Three-way profitability tier. The branches are mutually exclusive and
/// exhaustive: WINNING at or above suggested ROAS, OPTIMIZE between
/// break-even and suggested, LOSING below break-even.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Winning,
    Optimize,
    Losing,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Winning => "WINNING",
            Tier::Optimize => "OPTIMIZE",
            Tier::Losing => "LOSING",
        }
    }
}

/// An ad decorated with its match outcome, joined cost data, and every
/// derived decision metric. Built once per run by the decision engine and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedAd {
    pub ad: AdRecord,
    pub matched_product: Option<String>,
    pub match_status: MatchStatus,
    pub product_cost: f64,
    pub srp_price: f64,
    pub profit_per_item: f64,
    pub net_profit: f64,
    pub profit_margin_pct: f64,
    /// `f64::INFINITY` when the product margin is zero or negative.
    pub break_even_roas: f64,
    pub suggested_roas: f64,
    pub decision_run_off: RunDecision,
    pub decision_tier: Tier,
}

/// Summary scalars over the active (non-deleted) view only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_gmv: f64,
    pub total_expense: f64,
    pub total_net_profit: f64,
    /// Mean over finite ROAS values only.
    pub avg_roas: f64,
    pub winning_ads: usize,
    pub losing_ads: usize,
}

/// Presentation row for CSV export and console previews. All numbers are
/// pre-formatted strings so both sinks show the same thing.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ReportRow {
    #[serde(rename = "Ad Name")]
    #[tabled(rename = "Ad Name")]
    pub ad_name: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Sequence")]
    #[tabled(rename = "Sequence")]
    pub sequence: String,
    #[serde(rename = "Expense")]
    #[tabled(rename = "Expense")]
    pub expense: String,
    #[serde(rename = "GMV")]
    #[tabled(rename = "GMV")]
    pub gmv: String,
    #[serde(rename = "ROAS")]
    #[tabled(rename = "ROAS")]
    pub roas: String,
    #[serde(rename = "Items")]
    #[tabled(rename = "Items")]
    pub items: String,
    #[serde(rename = "Matched Product")]
    #[tabled(rename = "Matched Product")]
    pub matched_product: String,
    #[serde(rename = "Match Status")]
    #[tabled(rename = "Match Status")]
    pub match_status: String,
    #[serde(rename = "Product Cost")]
    #[tabled(rename = "Product Cost")]
    pub product_cost: String,
    #[serde(rename = "SRP Price")]
    #[tabled(rename = "SRP Price")]
    pub srp_price: String,
    #[serde(rename = "Net Profit")]
    #[tabled(rename = "Net Profit")]
    pub net_profit: String,
    #[serde(rename = "Break-even ROAS")]
    #[tabled(rename = "Break-even ROAS")]
    pub break_even_roas: String,
    #[serde(rename = "Suggested ROAS")]
    #[tabled(rename = "Suggested ROAS")]
    pub suggested_roas: String,
    #[serde(rename = "Decision (RUN/OFF)")]
    #[tabled(rename = "Decision (RUN/OFF)")]
    pub decision_run_off: String,
    #[serde(rename = "Decision (WIN/OPT/LOSE)")]
    #[tabled(rename = "Decision (WIN/OPT/LOSE)")]
    pub decision_tier: String,
}

impl ReportRow {
    pub fn from_decorated(d: &DecoratedAd) -> Self {
        ReportRow {
            ad_name: d.ad.ad_name.clone(),
            status: d.ad.status.clone(),
            sequence: d.ad.sequence.clone(),
            expense: format_number(d.ad.expense, 2),
            gmv: format_number(d.ad.gmv, 2),
            roas: format_number(d.ad.roas, 2),
            items: format_number(d.ad.items, 0),
            matched_product: d.matched_product.clone().unwrap_or_default(),
            match_status: d.match_status.as_str().to_string(),
            product_cost: format_number(d.product_cost, 2),
            srp_price: format_number(d.srp_price, 2),
            net_profit: format_number(d.net_profit, 2),
            break_even_roas: format_number(d.break_even_roas, 2),
            suggested_roas: format_number(d.suggested_roas, 2),
            decision_run_off: d.decision_run_off.as_str().to_string(),
            decision_tier: d.decision_tier.as_str().to_string(),
        }
    }
}
