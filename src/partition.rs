// Partitioning of decorated rows into report views, and the KPI rollup
// over the active view.
use crate::types::{DecoratedAd, KpiSummary, MatchStatus, Tier};
use crate::util::finite_mean;

/// The three report views. `unmatched` is a filtered sub-view of `active`,
/// so those rows appear in both; `active` and `deleted` are disjoint and
/// together cover the input exactly.
#[derive(Debug, Clone)]
pub struct Partition {
    pub active: Vec<DecoratedAd>,
    pub deleted: Vec<DecoratedAd>,
    pub unmatched: Vec<DecoratedAd>,
}

pub fn partition(rows: &[DecoratedAd]) -> Partition {
    let (deleted, active): (Vec<DecoratedAd>, Vec<DecoratedAd>) = rows
        .iter()
        .cloned()
        .partition(|r| r.ad.status.eq_ignore_ascii_case("DELETED"));
    let unmatched: Vec<DecoratedAd> = active
        .iter()
        .filter(|r| r.match_status == MatchStatus::Unmatched)
        .cloned()
        .collect();
    Partition {
        active,
        deleted,
        unmatched,
    }
}

/// Reduce the active view to the summary scalars. Sums include every
/// active row; the ROAS mean skips infinite and NaN values.
pub fn kpi_summary(active: &[DecoratedAd]) -> KpiSummary {
    let roas: Vec<f64> = active.iter().map(|r| r.ad.roas).collect();
    KpiSummary {
        total_gmv: active.iter().map(|r| r.ad.gmv).sum(),
        total_expense: active.iter().map(|r| r.ad.expense).sum(),
        total_net_profit: active.iter().map(|r| r.net_profit).sum(),
        avg_roas: finite_mean(&roas),
        winning_ads: active
            .iter()
            .filter(|r| r.decision_tier == Tier::Winning)
            .count(),
        losing_ads: active
            .iter()
            .filter(|r| r.decision_tier == Tier::Losing)
            .count(),
    }
}
