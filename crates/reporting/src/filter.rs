//! Strict multi-dimensional membership filtering over merged
//! records.
//!
//! Every dimension is an allow-list. An empty allow-list matches nothing; it
//! is never read as "no constraint". Use [`FilterOptions`] to build the
//! allow-everything spec for a given dataset.

use std::collections::BTreeSet;

use roi_core::types::{Influencer, MergedRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inclusive follower-count bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerRange {
    pub min: u64,
    pub max: u64,
}

impl FollowerRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// A record without a follower count (no matching influencer) is never
    /// in range.
    pub fn contains(&self, followers: Option<u64>) -> bool {
        followers.is_some_and(|f| self.min <= f && f <= self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub brands: BTreeSet<String>,
    pub products: BTreeSet<String>,
    pub platforms: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub genders: BTreeSet<String>,
    pub follower_range: FollowerRange,
}

fn to_set<I, S>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

impl FilterSpec {
    pub fn brands<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.brands = to_set(values);
        self
    }

    pub fn products<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.products = to_set(values);
        self
    }

    pub fn platforms<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = to_set(values);
        self
    }

    pub fn categories<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = to_set(values);
        self
    }

    pub fn genders<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genders = to_set(values);
        self
    }

    pub fn followers(mut self, min: u64, max: u64) -> Self {
        self.follower_range = FollowerRange::new(min, max);
        self
    }

    pub fn matches(&self, record: &MergedRecord) -> bool {
        self.brands.contains(&record.brand)
            && self.products.contains(&record.product)
            && record
                .platform
                .as_ref()
                .is_some_and(|p| self.platforms.contains(p))
            && self.categories.contains(&record.category)
            && self.genders.contains(&record.gender)
            && self.follower_range.contains(record.followers)
    }

    /// Subsequence of `records` that pass every dimension, in input order.
    pub fn apply(&self, records: &[MergedRecord]) -> Vec<MergedRecord> {
        let filtered: Vec<MergedRecord> = records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();
        debug!(
            input = records.len(),
            output = filtered.len(),
            "Applied dashboard filters"
        );
        filtered
    }
}

/// Selectable values for each filter dimension, as offered by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub brands: Vec<String>,
    pub products: Vec<String>,
    pub platforms: Vec<String>,
    pub categories: Vec<String>,
    pub genders: Vec<String>,
    pub follower_range: FollowerRange,
}

fn distinct<'a, I>(values: I) -> Vec<String>
where
    I: Iterator<Item = Option<&'a str>>,
{
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for value in values.flatten() {
        if seen.insert(value) {
            out.push(value.to_string());
        }
    }
    out
}

impl FilterOptions {
    /// Distinct values per dimension in first-appearance order over `merged`;
    /// absent values are skipped. The follower range spans the influencer
    /// table, or `0..=0` when it is empty.
    pub fn from_tables(merged: &[MergedRecord], influencers: &[Influencer]) -> Self {
        let min = influencers.iter().map(|i| i.followers).min().unwrap_or(0);
        let max = influencers.iter().map(|i| i.followers).max().unwrap_or(0);
        Self {
            brands: distinct(merged.iter().map(|r| Some(r.brand.as_str()))),
            products: distinct(merged.iter().map(|r| Some(r.product.as_str()))),
            platforms: distinct(merged.iter().map(|r| r.platform.as_deref())),
            categories: distinct(merged.iter().map(|r| Some(r.category.as_str()))),
            genders: distinct(merged.iter().map(|r| Some(r.gender.as_str()))),
            follower_range: FollowerRange::new(min, max),
        }
    }

    /// A spec that selects every option.
    pub fn allow_all(&self) -> FilterSpec {
        FilterSpec {
            brands: to_set(self.brands.iter().cloned()),
            products: to_set(self.products.iter().cloned()),
            platforms: to_set(self.platforms.iter().cloned()),
            categories: to_set(self.categories.iter().cloned()),
            genders: to_set(self.genders.iter().cloned()),
            follower_range: self.follower_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::merge_tables;
    use roi_core::sample;

    fn sample_merged() -> (Vec<MergedRecord>, FilterOptions) {
        let tables = sample::tables();
        let merged = merge_tables(&tables);
        let options = FilterOptions::from_tables(&merged, &tables.influencers);
        (merged, options)
    }

    #[test]
    fn test_options_from_sample() {
        let (_, options) = sample_merged();
        assert_eq!(options.brands, vec!["MuscleBlaze", "HKVitals", "Gritzo"]);
        assert_eq!(options.products, vec!["MB Protein", "HKVitals", "Gritzo"]);
        assert_eq!(options.platforms, vec!["Instagram", "YouTube", "Twitter"]);
        assert_eq!(options.categories, vec!["Fitness", "Wellness"]);
        assert_eq!(options.genders, vec!["M", "F"]);
        assert_eq!(options.follower_range, FollowerRange::new(66_000, 180_000));
    }

    #[test]
    fn test_allow_all_keeps_everything() {
        let (merged, options) = sample_merged();
        let filtered = options.allow_all().apply(&merged);
        assert_eq!(filtered, merged);
    }

    #[test]
    fn test_category_filter() {
        let (merged, options) = sample_merged();
        let filtered = options.allow_all().categories(["Fitness"]).apply(&merged);
        let ids: Vec<_> = filtered.iter().map(|r| r.influencer_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_empty_allow_list_matches_nothing() {
        let (merged, options) = sample_merged();
        let filtered = options
            .allow_all()
            .platforms(Vec::<String>::new())
            .apply(&merged);
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_follower_range_inclusive() {
        let (merged, options) = sample_merged();
        let filtered = options.allow_all().followers(95_000, 120_000).apply(&merged);
        let ids: Vec<_> = filtered.iter().map(|r| r.influencer_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_unmatched_influencer_never_passes() {
        let tables = sample::tables();
        let mut tracking = tables.tracking.clone();
        tracking[0].influencer_id = 42;
        let merged = crate::merge::merge(&tracking, &tables.influencers, &tables.payouts);
        let spec = FilterOptions::from_tables(&merged, &tables.influencers)
            .allow_all()
            .categories(["Fitness", "Wellness", "Unknown"])
            .genders(["M", "F", "Unknown"])
            .followers(0, u64::MAX);
        let filtered = spec.apply(&merged);
        assert_eq!(filtered.len(), 3);
        assert!(filtered.iter().all(|r| r.influencer_id != 42));
    }
}
