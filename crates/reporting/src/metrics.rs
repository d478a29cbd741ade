//! ROAS scoring and the dashboard's aggregate views.
//!
//! A ROAS whose payout is absent or zero is `None`. Every mean below skips
//! `None` values; a group with no numeric values has a `None` mean. Orderings
//! place `None` after every number, whichever direction they sort in.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use roi_core::types::{Influencer, InfluencerId, MergedRecord, Post};
use serde::{Deserialize, Serialize};

// ─── Per-record ratios ──────────────────────────────────────────────────────

/// `revenue / payout`, or `None` when the payout is absent or zero.
pub fn roas(revenue: f64, payout: Option<f64>) -> Option<f64> {
    match payout {
        Some(p) if p != 0.0 => Some(revenue / p),
        _ => None,
    }
}

/// `(revenue - baseline) / payout`, under the same guard as [`roas`].
pub fn incremental_roas(revenue: f64, baseline: f64, payout: Option<f64>) -> Option<f64> {
    roas(revenue - baseline, payout)
}

/// A filtered record with its ratios attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: MergedRecord,
    #[serde(rename = "ROAS")]
    pub roas: Option<f64>,
    #[serde(rename = "incremental_ROAS")]
    pub incremental_roas: Option<f64>,
}

pub fn score(records: Vec<MergedRecord>, baseline: f64) -> Vec<ScoredRecord> {
    records
        .into_iter()
        .map(|record| ScoredRecord {
            roas: roas(record.revenue, record.total_payout),
            incremental_roas: incremental_roas(record.revenue, baseline, record.total_payout),
            record,
        })
        .collect()
}

fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn ascending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Group items by key, keeping groups in first-appearance order.
fn group_ordered<'a, T, K, F>(items: &'a [T], key: F) -> Vec<(K, Vec<&'a T>)>
where
    K: Eq + std::hash::Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&T>)> = Vec::new();
    for item in items {
        let k = key(item);
        match index.get(&k).copied() {
            Some(i) => groups[i].1.push(item),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }
    groups
}

// ─── Summary KPIs ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub record_count: usize,
    pub total_orders: u64,
    pub total_revenue: f64,
    pub total_payout: f64,
    pub overall_roas: Option<f64>,
    pub overall_incremental_roas: Option<f64>,
}

pub fn kpis(records: &[ScoredRecord], baseline: f64) -> Kpis {
    let total_revenue: f64 = records.iter().map(|r| r.record.revenue).sum();
    let total_payout: f64 = records.iter().filter_map(|r| r.record.total_payout).sum();
    Kpis {
        record_count: records.len(),
        total_orders: records.iter().map(|r| r.record.orders).sum(),
        total_revenue,
        total_payout,
        overall_roas: roas(total_revenue, Some(total_payout)),
        overall_incremental_roas: incremental_roas(total_revenue, baseline, Some(total_payout)),
    }
}

// ─── Influencer leaderboard ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub influencer_id: InfluencerId,
    pub name: Option<String>,
    pub category: String,
    pub total_revenue: f64,
    pub total_payout: f64,
    pub total_orders: u64,
    pub mean_roas: Option<f64>,
    pub mean_incremental_roas: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// First `n` entries, for display.
    pub fn top(&self, n: usize) -> &[LeaderboardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per (influencer_id, name, category) totals, best mean ROAS first.
/// Equal means keep first-appearance order.
pub fn leaderboard(records: &[ScoredRecord]) -> Leaderboard {
    let groups = group_ordered(records, |r| {
        (
            r.record.influencer_id,
            r.record.name.clone(),
            r.record.category.clone(),
        )
    });

    let mut entries: Vec<LeaderboardEntry> = groups
        .into_iter()
        .map(|((influencer_id, name, category), rows)| LeaderboardEntry {
            influencer_id,
            name,
            category,
            total_revenue: rows.iter().map(|r| r.record.revenue).sum(),
            total_payout: rows.iter().filter_map(|r| r.record.total_payout).sum(),
            total_orders: rows.iter().map(|r| r.record.orders).sum(),
            mean_roas: mean(rows.iter().map(|r| r.roas)),
            mean_incremental_roas: mean(rows.iter().map(|r| r.incremental_roas)),
        })
        .collect();

    entries.sort_by(|a, b| descending(a.mean_roas, b.mean_roas));
    Leaderboard { entries }
}

// ─── Persona summary ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaSummary {
    pub category: String,
    pub record_count: usize,
    pub mean_roas: Option<f64>,
}

pub fn persona_summary(records: &[ScoredRecord]) -> Vec<PersonaSummary> {
    let mut personas: Vec<PersonaSummary> =
        group_ordered(records, |r| r.record.category.clone())
            .into_iter()
            .map(|(category, rows)| PersonaSummary {
                category,
                record_count: rows.len(),
                mean_roas: mean(rows.iter().map(|r| r.roas)),
            })
            .collect();
    personas.sort_by(|a, b| descending(a.mean_roas, b.mean_roas));
    personas
}

// ─── Worst performers ───────────────────────────────────────────────────────

/// The `limit` records with the lowest incremental ROAS, lowest first.
/// Ties keep input order.
pub fn worst_performers(records: &[ScoredRecord], limit: usize) -> Vec<ScoredRecord> {
    let mut ranked: Vec<&ScoredRecord> = records.iter().collect();
    ranked.sort_by(|a, b| ascending(a.incremental_roas, b.incremental_roas));
    ranked.into_iter().take(limit).cloned().collect()
}

// ─── Post engagement ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostEngagement {
    pub influencer_id: InfluencerId,
    pub name: Option<String>,
    pub platform: String,
    pub post_count: usize,
    pub total_reach: u64,
    pub avg_likes: f64,
    pub avg_comments: f64,
}

/// Engagement per (influencer_id, platform) over the full post table,
/// ordered by key. `post_count` counts posts that carry a url.
pub fn post_engagement(posts: &[Post], influencers: &[Influencer]) -> Vec<PostEngagement> {
    // First influencer row wins for a duplicated id.
    let mut names: HashMap<InfluencerId, &str> = HashMap::with_capacity(influencers.len());
    for influencer in influencers {
        names
            .entry(influencer.id)
            .or_insert(influencer.name.as_str());
    }

    let mut groups: BTreeMap<(InfluencerId, &str), Vec<&Post>> = BTreeMap::new();
    for post in posts {
        groups
            .entry((post.influencer_id, post.platform.as_str()))
            .or_default()
            .push(post);
    }

    groups
        .into_iter()
        .map(|((influencer_id, platform), rows)| {
            let n = rows.len() as f64;
            PostEngagement {
                influencer_id,
                name: names.get(&influencer_id).map(|n| n.to_string()),
                platform: platform.to_string(),
                post_count: rows.iter().filter(|p| p.url.is_some()).count(),
                total_reach: rows.iter().map(|p| p.reach).sum(),
                avg_likes: rows.iter().map(|p| p.likes as f64).sum::<f64>() / n,
                avg_comments: rows.iter().map(|p| p.comments as f64).sum::<f64>() / n,
            }
        })
        .collect()
}

// ─── Revenue vs payout by influencer ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluencerRevenue {
    pub name: String,
    pub revenue: f64,
    pub payout: f64,
}

/// Revenue and payout summed per influencer name, ordered by name. Records
/// without a matched influencer are skipped.
pub fn revenue_by_influencer(records: &[ScoredRecord]) -> Vec<InfluencerRevenue> {
    let mut totals: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for r in records {
        if let Some(name) = r.record.name.as_deref() {
            let entry = totals.entry(name).or_insert((0.0, 0.0));
            entry.0 += r.record.revenue;
            entry.1 += r.record.total_payout.unwrap_or(0.0);
        }
    }
    totals
        .into_iter()
        .map(|(name, (revenue, payout))| InfluencerRevenue {
            name: name.to_string(),
            revenue,
            payout,
        })
        .collect()
}
