//! Bundled four-influencer demo dataset, used when no input tables are
//! available so the rest of the pipeline never special-cases missing data.

use chrono::NaiveDate;

use crate::types::{
    Influencer, Payout, PayoutBasis, Post, RawTables, TableOrigin, TrackingEvent, UNKNOWN,
};

fn june(day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2025, 6, day)
}

pub fn influencers() -> Vec<Influencer> {
    [
        (1, "AlexFit", "Fitness", "M", 120_000, "Instagram"),
        (2, "VitaG", "Wellness", "F", 95_000, "YouTube"),
        (3, "RishiRun", "Fitness", "M", 66_000, "Twitter"),
        (4, "SabaLife", "Wellness", "F", 180_000, "Instagram"),
    ]
    .into_iter()
    .map(|(id, name, category, gender, followers, platform)| Influencer {
        id,
        name: name.to_string(),
        category: category.to_string(),
        gender: gender.to_string(),
        followers,
        platform: platform.to_string(),
    })
    .collect()
}

pub fn posts() -> Vec<Post> {
    [
        (1, "Instagram", 1, "url1", "Try MB Power!", 30_000, 1_500, 130),
        (2, "YouTube", 2, "url2", "HKVitals review", 18_000, 500, 50),
        (3, "Twitter", 3, "url3", "Training Gritzo", 9_500, 310, 17),
        (4, "Instagram", 4, "url4", "Morning Wellness", 42_000, 2_100, 220),
    ]
    .into_iter()
    .map(
        |(influencer_id, platform, day, url, caption, reach, likes, comments)| Post {
            influencer_id,
            platform: platform.to_string(),
            date: june(day),
            url: Some(url.to_string()),
            caption: caption.to_string(),
            reach,
            likes,
            comments,
        },
    )
    .collect()
}

pub fn tracking() -> Vec<TrackingEvent> {
    [
        ("Instagram", "SummerFit", 1, "u122", "MB Protein", 1, 10, 2500.0),
        ("YouTube", "HKLaunch", 2, "u293", "HKVitals", 2, 7, 2000.0),
        ("Twitter", "RunGritzo", 3, "u456", "Gritzo", 3, 2, 380.0),
        ("Instagram", "WellnessBlast", 4, "u998", "HKVitals", 4, 15, 3400.0),
    ]
    .into_iter()
    .map(
        |(source, campaign, influencer_id, user_id, product, day, orders, revenue)| {
            TrackingEvent {
                source: source.to_string(),
                campaign: campaign.to_string(),
                influencer_id,
                user_id: user_id.to_string(),
                product: product.to_string(),
                date: june(day),
                orders,
                revenue,
                brand: None,
            }
        },
    )
    .collect()
}

pub fn payouts() -> Vec<Payout> {
    [
        (1, PayoutBasis::Post, 5000.0, 1, 5000.0),
        (2, PayoutBasis::Post, 4500.0, 1, 4500.0),
        (3, PayoutBasis::Order, 180.0, 2, 360.0),
        (4, PayoutBasis::Post, 7000.0, 1, 7000.0),
    ]
    .into_iter()
    .map(|(influencer_id, basis, rate, orders, total_payout)| Payout {
        influencer_id,
        basis: Some(basis),
        rate: Some(rate),
        orders: Some(orders),
        total_payout,
    })
    .collect()
}

pub fn tables() -> RawTables {
    RawTables {
        influencers: influencers(),
        posts: posts(),
        tracking: tracking(),
        payouts: payouts(),
        origin: TableOrigin::BuiltIn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_has_four_rows_per_table() {
        let t = tables();
        assert_eq!(t.influencers.len(), 4);
        assert_eq!(t.posts.len(), 4);
        assert_eq!(t.tracking.len(), 4);
        assert_eq!(t.payouts.len(), 4);
        assert_eq!(t.origin, TableOrigin::BuiltIn);
    }

    #[test]
    fn test_sample_totals() {
        let revenue: f64 = tracking().iter().map(|t| t.revenue).sum();
        let payout: f64 = payouts().iter().map(|p| p.total_payout).sum();
        assert!((revenue - 8280.0).abs() < 1e-9);
        assert!((payout - 16860.0).abs() < 1e-9);
    }

    #[test]
    fn test_sample_categories_are_known() {
        assert!(influencers().iter().all(|i| i.category != UNKNOWN));
    }
}
