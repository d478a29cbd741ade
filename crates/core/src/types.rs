use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Key shared by influencers, posts, tracking events and payouts.
pub type InfluencerId = u64;

/// Fill value for categorical attributes that could not be resolved.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Influencer {
    pub id: InfluencerId,
    pub name: String,
    /// Persona / content niche, e.g. "Fitness".
    pub category: String,
    pub gender: String,
    pub followers: u64,
    pub platform: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub influencer_id: InfluencerId,
    pub platform: String,
    pub date: Option<NaiveDate>,
    pub url: Option<String>,
    pub caption: String,
    pub reach: u64,
    pub likes: u64,
    pub comments: u64,
}

/// One attributed conversion row from the tracking feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub source: String,
    pub campaign: String,
    pub influencer_id: InfluencerId,
    pub user_id: String,
    pub product: String,
    pub date: Option<NaiveDate>,
    pub orders: u64,
    pub revenue: f64,
    /// Supplied brand, if the feed carried one. Derived during merge otherwise.
    pub brand: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutBasis {
    Post,
    Order,
}

/// Case-insensitive; `per-post` and `per_order` style spellings are accepted.
impl FromStr for PayoutBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let word = normalized
            .strip_prefix("per")
            .map(|rest| rest.trim_start_matches(['-', '_', ' ']))
            .unwrap_or(normalized.as_str());
        match word {
            "post" => Ok(Self::Post),
            "order" => Ok(Self::Order),
            _ => Err(format!("unknown payout basis '{s}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub influencer_id: InfluencerId,
    pub basis: Option<PayoutBasis>,
    pub rate: Option<f64>,
    pub orders: Option<u64>,
    pub total_payout: f64,
}

/// A tracking event left-joined with its influencer and payout rows.
///
/// Influencer-side fields are `None` when no influencer matched, except
/// `category` and `gender` which fall back to [`UNKNOWN`]. Payout-side
/// fields are `None` when no payout matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub source: String,
    pub campaign: String,
    pub influencer_id: InfluencerId,
    pub user_id: String,
    pub product: String,
    pub date: Option<NaiveDate>,
    pub orders: u64,
    pub revenue: f64,
    pub brand: String,
    pub name: Option<String>,
    pub category: String,
    pub gender: String,
    pub followers: Option<u64>,
    pub platform: Option<String>,
    pub basis: Option<PayoutBasis>,
    pub rate: Option<f64>,
    pub payout_orders: Option<u64>,
    pub total_payout: Option<f64>,
}

/// Where a set of raw tables came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableOrigin {
    /// All four tables were supplied explicitly.
    Provided,
    /// Loaded from the configured sample directory.
    SampleFiles,
    /// The bundled four-row demo dataset.
    BuiltIn,
}

/// The four input tables of one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTables {
    pub influencers: Vec<Influencer>,
    pub posts: Vec<Post>,
    pub tracking: Vec<TrackingEvent>,
    pub payouts: Vec<Payout>,
    pub origin: TableOrigin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_basis_serde() {
        let basis: PayoutBasis = serde_json::from_str("\"order\"").unwrap();
        assert_eq!(basis, PayoutBasis::Order);
        assert_eq!(serde_json::to_string(&PayoutBasis::Post).unwrap(), "\"post\"");
    }

    #[test]
    fn test_payout_basis_from_str() {
        assert_eq!("Post".parse::<PayoutBasis>(), Ok(PayoutBasis::Post));
        assert_eq!(" ORDER ".parse::<PayoutBasis>(), Ok(PayoutBasis::Order));
        assert_eq!("per-order".parse::<PayoutBasis>(), Ok(PayoutBasis::Order));
        assert_eq!("per_post".parse::<PayoutBasis>(), Ok(PayoutBasis::Post));
        assert!("flat".parse::<PayoutBasis>().is_err());
    }

    #[test]
    fn test_table_origin_serde() {
        let json = serde_json::to_string(&TableOrigin::SampleFiles).unwrap();
        assert_eq!(json, "\"sample_files\"");
    }
}
