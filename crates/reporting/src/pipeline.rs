//! One render pass: merge → filter → score → aggregate.
//!
//! A pass is a pure function of (tables, filter spec, baseline). Nothing is
//! cached or shared between passes.

use roi_core::config::{validate_baseline, PipelineConfig};
use roi_core::types::{RawTables, TableOrigin};
use roi_core::RoiResult;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::filter::{FilterOptions, FilterSpec};
use crate::merge::merge_tables;
use crate::metrics::{
    self, InfluencerRevenue, Kpis, Leaderboard, PersonaSummary, PostEngagement, ScoredRecord,
};

/// Everything the renderer consumes from one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub origin: TableOrigin,
    pub baseline_revenue: f64,
    /// Row count of the merged table before filtering.
    pub merged_count: usize,
    pub filter: FilterSpec,
    pub records: Vec<ScoredRecord>,
    pub kpis: Kpis,
    pub leaderboard: Leaderboard,
    pub personas: Vec<PersonaSummary>,
    pub worst_performers: Vec<ScoredRecord>,
    pub post_engagement: Vec<PostEngagement>,
    pub revenue_by_influencer: Vec<InfluencerRevenue>,
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Filter options for `tables`, i.e. what an unfiltered dashboard selects.
    pub fn filter_options(&self, tables: &RawTables) -> FilterOptions {
        FilterOptions::from_tables(&merge_tables(tables), &tables.influencers)
    }

    /// Run with every filter option selected.
    pub fn run_unfiltered(&self, tables: &RawTables, baseline: f64) -> RoiResult<DashboardReport> {
        let spec = self.filter_options(tables).allow_all();
        self.run(tables, &spec, baseline)
    }

    pub fn run(
        &self,
        tables: &RawTables,
        spec: &FilterSpec,
        baseline: f64,
    ) -> RoiResult<DashboardReport> {
        let baseline = validate_baseline(baseline)?;

        let merged = merge_tables(tables);
        let merged_count = merged.len();
        let filtered = spec.apply(&merged);
        let records = metrics::score(filtered, baseline);

        let report = DashboardReport {
            origin: tables.origin,
            baseline_revenue: baseline,
            merged_count,
            filter: spec.clone(),
            kpis: metrics::kpis(&records, baseline),
            leaderboard: metrics::leaderboard(&records),
            personas: metrics::persona_summary(&records),
            worst_performers: metrics::worst_performers(
                &records,
                self.config.worst_performers_limit,
            ),
            post_engagement: metrics::post_engagement(&tables.posts, &tables.influencers),
            revenue_by_influencer: metrics::revenue_by_influencer(&records),
            records,
        };

        info!(
            merged = report.merged_count,
            filtered = report.records.len(),
            baseline,
            total_revenue = report.kpis.total_revenue,
            total_payout = report.kpis.total_payout,
            "Render pass complete"
        );
        Ok(report)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roi_core::{sample, RoiError};

    #[test]
    fn test_unfiltered_sample_pass() {
        let report = Pipeline::default()
            .run_unfiltered(&sample::tables(), 0.0)
            .unwrap();
        assert_eq!(report.origin, TableOrigin::BuiltIn);
        assert_eq!(report.merged_count, 4);
        assert_eq!(report.records.len(), 4);
        assert_eq!(report.leaderboard.len(), 4);
        assert_eq!(report.worst_performers.len(), 4);
        assert_eq!(report.post_engagement.len(), 4);
    }

    #[test]
    fn test_negative_baseline_rejected() {
        let err = Pipeline::default()
            .run_unfiltered(&sample::tables(), -1.0)
            .unwrap_err();
        assert!(matches!(err, RoiError::InvalidBaseline(_)));
    }

    #[test]
    fn test_worst_performers_limit_from_config() {
        let pipeline = Pipeline::new(PipelineConfig {
            worst_performers_limit: 2,
            ..Default::default()
        });
        let report = pipeline.run_unfiltered(&sample::tables(), 0.0).unwrap();
        assert_eq!(report.worst_performers.len(), 2);
    }

    #[test]
    fn test_passes_are_idempotent() {
        let tables = sample::tables();
        let pipeline = Pipeline::default();
        let a = pipeline.run_unfiltered(&tables, 100.0).unwrap();
        let b = pipeline.run_unfiltered(&tables, 100.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_report_serializes_undefined_roas_as_null() {
        let mut tables = sample::tables();
        tables.payouts[0].total_payout = 0.0;
        let report = Pipeline::default().run_unfiltered(&tables, 0.0).unwrap();
        assert_eq!(report.records[0].roas, None);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["records"][0]["ROAS"].is_null());
        assert!(json["records"][1]["ROAS"].is_number());
    }
}
