// Decision engine: joins matched ads to cost data and derives the
// profitability metrics and run/tier decisions for every ad row.
use std::collections::HashMap;

use crate::error::ReportError;
use crate::matcher::match_product;
use crate::types::{AdRecord, CostRecord, DecoratedAd, MatchStatus, RunDecision, Tier};

pub const DEFAULT_MULTIPLIER: f64 = 1.25;

/// Decorate every ad with match outcome, joined cost fields, and decision
/// metrics. `multiplier` scales break-even ROAS into the suggested target
/// and must be a positive finite number.
///
/// Rows are processed independently; two runs over identical inputs yield
/// identical output.
pub fn decorate_ads(
    ads: &[AdRecord],
    costing: &HashMap<String, CostRecord>,
    multiplier: f64,
) -> Result<Vec<DecoratedAd>, ReportError> {
    if !(multiplier > 0.0) || !multiplier.is_finite() {
        return Err(ReportError::Compute(format!(
            "profit multiplier must be a positive finite number, got {multiplier}"
        )));
    }
    Ok(ads.iter().map(|ad| decorate_one(ad, costing, multiplier)).collect())
}

fn decorate_one(
    ad: &AdRecord,
    costing: &HashMap<String, CostRecord>,
    multiplier: f64,
) -> DecoratedAd {
    let name = if ad.ad_name.is_empty() {
        None
    } else {
        Some(ad.ad_name.as_str())
    };
    let matched_product = match_product(name).map(str::to_string);
    let match_status = if matched_product.is_some() {
        MatchStatus::Matched
    } else {
        MatchStatus::Unmatched
    };

    // Left join on the uppercased product key; a matched ad whose product
    // is absent from the costing table keeps Matched status but zero costs.
    let cost_hit = matched_product
        .as_deref()
        .and_then(|p| costing.get(&p.to_uppercase()));
    let (product_cost, srp_price) = cost_hit
        .map(|c| (c.product_cost, c.srp_price))
        .unwrap_or((0.0, 0.0));

    let profit_per_item = {
        let p = srp_price - product_cost;
        if p.is_nan() {
            0.0
        } else {
            p
        }
    };
    let net_profit = ad.items * profit_per_item - ad.expense;
    let profit_margin_pct = if ad.gmv > 0.0 { net_profit / ad.gmv } else { 0.0 };

    // Zero or negative margin: no finite ROAS can break even. Infinity is
    // propagated through the comparisons rather than special-cased.
    let margin = srp_price - product_cost;
    let break_even_roas = if margin > 0.0 {
        srp_price / margin
    } else {
        f64::INFINITY
    };
    let suggested_roas = break_even_roas * multiplier;

    let decision_run_off = if ad.roas >= break_even_roas {
        RunDecision::Run
    } else {
        RunDecision::Off
    };
    let decision_tier = if ad.roas >= suggested_roas {
        Tier::Winning
    } else if ad.roas >= break_even_roas {
        Tier::Optimize
    } else {
        Tier::Losing
    };

    DecoratedAd {
        ad: ad.clone(),
        matched_product,
        match_status,
        product_cost,
        srp_price,
        profit_per_item,
        net_profit,
        profit_margin_pct,
        break_even_roas,
        suggested_roas,
        decision_run_off,
        decision_tier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::costing_index;

    fn ad(name: &str, expense: f64, gmv: f64, roas: f64, items: f64) -> AdRecord {
        AdRecord {
            ad_name: name.to_string(),
            status: "Ongoing".to_string(),
            sequence: "1".to_string(),
            expense,
            gmv,
            roas,
            items,
        }
    }

    fn big_armor_costing() -> HashMap<String, CostRecord> {
        costing_index(&[CostRecord {
            product_name: "BIG ARMOR".to_string(),
            product_cost: 20.0,
            srp_price: 50.0,
        }])
    }

    #[test]
    fn big_armor_end_to_end() {
        let ads = vec![ad("BIG ARMOR Promo", 100.0, 500.0, 5.0, 10.0)];
        let rows = decorate_ads(&ads, &big_armor_costing(), 1.25).unwrap();
        let r = &rows[0];
        assert_eq!(r.matched_product.as_deref(), Some("BIG ARMOR"));
        assert_eq!(r.match_status, MatchStatus::Matched);
        assert_eq!(r.profit_per_item, 30.0);
        assert_eq!(r.net_profit, 200.0);
        assert!((r.break_even_roas - 50.0 / 30.0).abs() < 1e-12);
        assert!((r.suggested_roas - 50.0 / 30.0 * 1.25).abs() < 1e-12);
        assert_eq!(r.decision_run_off, RunDecision::Run);
        assert_eq!(r.decision_tier, Tier::Winning);
    }

    #[test]
    fn zero_margin_goes_infinite_and_off() {
        let costing = costing_index(&[CostRecord {
            product_name: "BIG ARMOR".to_string(),
            product_cost: 50.0,
            srp_price: 50.0,
        }]);
        let ads = vec![ad("BIG ARMOR Promo", 10.0, 100.0, 10.0, 5.0)];
        let r = &decorate_ads(&ads, &costing, 1.25).unwrap()[0];
        assert!(r.break_even_roas.is_infinite());
        assert!(r.suggested_roas.is_infinite());
        assert_eq!(r.decision_run_off, RunDecision::Off);
        assert_eq!(r.decision_tier, Tier::Losing);
    }

    #[test]
    fn negative_margin_also_goes_infinite() {
        // Selling below cost: no finite ROAS breaks even.
        let costing = costing_index(&[CostRecord {
            product_name: "BIG ARMOR".to_string(),
            product_cost: 60.0,
            srp_price: 50.0,
        }]);
        let ads = vec![ad("BIG ARMOR", 10.0, 100.0, 10.0, 5.0)];
        let r = &decorate_ads(&ads, &costing, 1.25).unwrap()[0];
        assert!(r.break_even_roas.is_infinite() && r.break_even_roas > 0.0);
        assert_eq!(r.decision_run_off, RunDecision::Off);
    }

    #[test]
    fn unmatched_ads_get_zero_costs_and_lose() {
        let ads = vec![ad("mystery gadget", 10.0, 100.0, 10.0, 5.0)];
        let r = &decorate_ads(&ads, &big_armor_costing(), 1.25).unwrap()[0];
        assert_eq!(r.match_status, MatchStatus::Unmatched);
        assert_eq!(r.matched_product, None);
        assert_eq!(r.product_cost, 0.0);
        assert_eq!(r.srp_price, 0.0);
        assert!(r.break_even_roas.is_infinite());
        assert_eq!(r.decision_run_off, RunDecision::Off);
    }

    #[test]
    fn matched_without_cost_row_keeps_matched_status() {
        // The "TEMPERED" rule matches but the costing table has no row.
        let ads = vec![ad("Tempered Glass 9H", 10.0, 50.0, 5.0, 2.0)];
        let r = &decorate_ads(&ads, &big_armor_costing(), 1.25).unwrap()[0];
        assert_eq!(r.match_status, MatchStatus::Matched);
        assert_eq!(r.product_cost, 0.0);
        assert_eq!(r.srp_price, 0.0);
    }

    #[test]
    fn tier_boundaries_are_exact() {
        // break-even = 50/30 ≈ 1.667, suggested = 1.667 * 1.2 = 2.0
        let costing = big_armor_costing();
        let between = ad("BIG ARMOR", 0.0, 10.0, 1.9, 0.0);
        let r = &decorate_ads(&[between], &costing, 1.2).unwrap()[0];
        assert_eq!(r.decision_run_off, RunDecision::Run);
        assert_eq!(r.decision_tier, Tier::Optimize);

        let at_suggested = ad("BIG ARMOR", 0.0, 10.0, 50.0 / 30.0 * 1.2, 0.0);
        let r = &decorate_ads(&[at_suggested], &costing, 1.2).unwrap()[0];
        assert_eq!(r.decision_tier, Tier::Winning);

        let below = ad("BIG ARMOR", 0.0, 10.0, 1.0, 0.0);
        let r = &decorate_ads(&[below], &costing, 1.2).unwrap()[0];
        assert_eq!(r.decision_run_off, RunDecision::Off);
        assert_eq!(r.decision_tier, Tier::Losing);
    }

    #[test]
    fn winning_rows_are_a_subset_of_run_rows() {
        let costing = big_armor_costing();
        let ads: Vec<AdRecord> = [0.5, 1.7, 2.0, 2.5, 10.0]
            .iter()
            .map(|&roas| ad("BIG ARMOR", 1.0, 10.0, roas, 1.0))
            .collect();
        for r in decorate_ads(&ads, &costing, 1.25).unwrap() {
            if r.decision_tier == Tier::Winning {
                assert_eq!(r.decision_run_off, RunDecision::Run);
            }
            if r.decision_run_off == RunDecision::Off {
                assert_eq!(r.decision_tier, Tier::Losing);
            }
        }
    }

    #[test]
    fn zero_gmv_margin_is_zero_not_nan() {
        let ads = vec![ad("BIG ARMOR", 100.0, 0.0, 0.0, 0.0)];
        let r = &decorate_ads(&ads, &big_armor_costing(), 1.25).unwrap()[0];
        assert_eq!(r.profit_margin_pct, 0.0);
    }

    #[test]
    fn engine_is_deterministic() {
        let ads = vec![
            ad("BIG ARMOR Promo", 100.0, 500.0, 5.0, 10.0),
            ad("mystery", 5.0, 0.0, 0.0, 0.0),
        ];
        let costing = big_armor_costing();
        let a = decorate_ads(&ads, &costing, 1.25).unwrap();
        let b = decorate_ads(&ads, &costing, 1.25).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn non_positive_multiplier_is_a_compute_error() {
        let ads = vec![ad("BIG ARMOR", 1.0, 1.0, 1.0, 1.0)];
        let costing = big_armor_costing();
        assert!(decorate_ads(&ads, &costing, 0.0).is_err());
        assert!(decorate_ads(&ads, &costing, -1.0).is_err());
        assert!(decorate_ads(&ads, &costing, f64::NAN).is_err());
    }
}
