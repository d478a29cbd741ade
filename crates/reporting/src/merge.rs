//! Left-joins tracking events onto influencer attributes and
//! payout records.

use std::collections::HashMap;

use roi_core::types::{
    Influencer, InfluencerId, MergedRecord, Payout, RawTables, TrackingEvent, UNKNOWN,
};
use tracing::debug;

pub const BRAND_MUSCLEBLAZE: &str = "MuscleBlaze";
pub const BRAND_HKVITALS: &str = "HKVitals";
pub const BRAND_GRITZO: &str = "Gritzo";

/// Infer a brand from the product name.
///
/// This is a naming heuristic, not a catalogue lookup: a case-sensitive "MB"
/// substring means MuscleBlaze, "HK" means HKVitals, and anything else is
/// attributed to Gritzo, including products of unrelated brands.
pub fn infer_brand(product: &str) -> &'static str {
    if product.contains("MB") {
        BRAND_MUSCLEBLAZE
    } else if product.contains("HK") {
        BRAND_HKVITALS
    } else {
        BRAND_GRITZO
    }
}

/// Supplied brand if present and non-empty, inferred otherwise.
pub fn resolve_brand(event: &TrackingEvent) -> String {
    match event.brand.as_deref() {
        Some(brand) if !brand.is_empty() => brand.to_string(),
        _ => infer_brand(&event.product).to_string(),
    }
}

fn index_by<T, F>(rows: &[T], key: F) -> HashMap<InfluencerId, Vec<&T>>
where
    F: Fn(&T) -> InfluencerId,
{
    let mut index: HashMap<InfluencerId, Vec<&T>> = HashMap::new();
    for row in rows {
        index.entry(key(row)).or_default().push(row);
    }
    index
}

fn joined(
    event: &TrackingEvent,
    brand: &str,
    influencer: Option<&Influencer>,
    payout: Option<&Payout>,
) -> MergedRecord {
    MergedRecord {
        source: event.source.clone(),
        campaign: event.campaign.clone(),
        influencer_id: event.influencer_id,
        user_id: event.user_id.clone(),
        product: event.product.clone(),
        date: event.date,
        orders: event.orders,
        revenue: event.revenue,
        brand: brand.to_string(),
        name: influencer.map(|i| i.name.clone()),
        category: influencer.map_or_else(|| UNKNOWN.to_string(), |i| i.category.clone()),
        gender: influencer.map_or_else(|| UNKNOWN.to_string(), |i| i.gender.clone()),
        followers: influencer.map(|i| i.followers),
        platform: influencer.map(|i| i.platform.clone()),
        basis: payout.and_then(|p| p.basis),
        rate: payout.and_then(|p| p.rate),
        payout_orders: payout.and_then(|p| p.orders),
        total_payout: payout.map(|p| p.total_payout),
    }
}

/// Left outer join: tracking ⟕ influencers (on id) ⟕ payouts (on influencer_id).
///
/// Output follows tracking order. A tracking row with several matching
/// influencer or payout rows is emitted once per combination, in right-table
/// order; a row with no match is still emitted once.
pub fn merge(
    tracking: &[TrackingEvent],
    influencers: &[Influencer],
    payouts: &[Payout],
) -> Vec<MergedRecord> {
    let influencers_by_id = index_by(influencers, |i| i.id);
    let payouts_by_id = index_by(payouts, |p| p.influencer_id);

    let mut merged = Vec::with_capacity(tracking.len());
    for event in tracking {
        let brand = resolve_brand(event);

        let inf_matches: Vec<Option<&Influencer>> = match influencers_by_id.get(&event.influencer_id)
        {
            Some(rows) => rows.iter().copied().map(Some).collect(),
            None => vec![None],
        };
        let payout_matches: Vec<Option<&Payout>> = match payouts_by_id.get(&event.influencer_id) {
            Some(rows) => rows.iter().copied().map(Some).collect(),
            None => vec![None],
        };

        for influencer in &inf_matches {
            for payout in &payout_matches {
                merged.push(joined(event, &brand, *influencer, *payout));
            }
        }
    }

    debug!(
        tracking = tracking.len(),
        merged = merged.len(),
        "Merged tracking with influencers and payouts"
    );
    merged
}

pub fn merge_tables(tables: &RawTables) -> Vec<MergedRecord> {
    merge(&tables.tracking, &tables.influencers, &tables.payouts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roi_core::sample;

    #[test]
    fn test_infer_brand() {
        assert_eq!(infer_brand("MB Protein"), BRAND_MUSCLEBLAZE);
        assert_eq!(infer_brand("HKVitals"), BRAND_HKVITALS);
        assert_eq!(infer_brand("Gritzo"), BRAND_GRITZO);
        // Case-sensitive: lowercase does not match.
        assert_eq!(infer_brand("mb whey"), BRAND_GRITZO);
        // Unrelated products still land on the fallback brand.
        assert_eq!(infer_brand("Acme Bar"), BRAND_GRITZO);
    }

    #[test]
    fn test_supplied_brand_wins() {
        let mut event = sample::tracking().remove(0);
        event.brand = Some("CustomBrand".into());
        assert_eq!(resolve_brand(&event), "CustomBrand");
        event.brand = Some(String::new());
        assert_eq!(resolve_brand(&event), BRAND_MUSCLEBLAZE);
    }

    #[test]
    fn test_sample_merge_one_row_per_event() {
        let tables = sample::tables();
        let merged = merge_tables(&tables);
        assert_eq!(merged.len(), 4);
        for (record, event) in merged.iter().zip(&tables.tracking) {
            assert_eq!(record.influencer_id, event.influencer_id);
            assert!(record.name.is_some());
            assert!(record.total_payout.is_some());
        }
        assert_eq!(merged[0].brand, BRAND_MUSCLEBLAZE);
        assert_eq!(merged[1].brand, BRAND_HKVITALS);
        assert_eq!(merged[2].brand, BRAND_GRITZO);
        assert_eq!(merged[0].platform.as_deref(), Some("Instagram"));
    }

    #[test]
    fn test_unmatched_influencer_gets_unknown() {
        let mut tracking = sample::tracking();
        tracking[0].influencer_id = 99;
        let merged = merge(&tracking, &sample::influencers(), &sample::payouts());
        assert_eq!(merged.len(), 4);
        let orphan = &merged[0];
        assert_eq!(orphan.influencer_id, 99);
        assert_eq!(orphan.category, UNKNOWN);
        assert_eq!(orphan.gender, UNKNOWN);
        assert_eq!(orphan.name, None);
        assert_eq!(orphan.followers, None);
        assert_eq!(orphan.total_payout, None);
    }

    #[test]
    fn test_multiple_payouts_replicate_row() {
        let mut payouts = sample::payouts();
        let mut extra = payouts[0].clone();
        extra.total_payout = 1000.0;
        payouts.push(extra);

        let merged = merge(&sample::tracking(), &sample::influencers(), &payouts);
        assert_eq!(merged.len(), 5);
        assert_eq!(merged[0].influencer_id, 1);
        assert_eq!(merged[1].influencer_id, 1);
        assert_eq!(merged[0].total_payout, Some(5000.0));
        assert_eq!(merged[1].total_payout, Some(1000.0));
        assert_eq!(merged[2].influencer_id, 2);
    }

    #[test]
    fn test_duplicate_influencer_ids_replicate_in_table_order() {
        let mut influencers = sample::influencers();
        let mut twin = influencers[0].clone();
        twin.name = "AlexFitAlt".into();
        twin.platform = "YouTube".into();
        influencers.push(twin);
        let mut payouts = sample::payouts();
        let mut extra = payouts[0].clone();
        extra.total_payout = 1000.0;
        payouts.push(extra);

        let merged = merge(&sample::tracking(), &influencers, &payouts);
        // 2 influencer rows x 2 payout rows for the first event, then one each.
        assert_eq!(merged.len(), 7);
        let first: Vec<_> = merged[..4]
            .iter()
            .map(|r| (r.name.as_deref().unwrap(), r.total_payout.unwrap()))
            .collect();
        assert_eq!(
            first,
            vec![
                ("AlexFit", 5000.0),
                ("AlexFit", 1000.0),
                ("AlexFitAlt", 5000.0),
                ("AlexFitAlt", 1000.0),
            ]
        );
        assert!(merged[..4].iter().all(|r| r.influencer_id == 1));
        assert_eq!(merged[4].influencer_id, 2);
    }

    #[test]
    fn test_empty_tracking_merges_to_empty() {
        let merged = merge(&[], &sample::influencers(), &sample::payouts());
        assert!(merged.is_empty());
    }
}
