use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RoiError, RoiResult};

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `INFLUENCER_ROI__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Input table locations. When any of the four explicit paths is missing
/// the loader tries `sample_dir`, then the bundled sample.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub influencers_path: Option<PathBuf>,
    #[serde(default)]
    pub posts_path: Option<PathBuf>,
    #[serde(default)]
    pub tracking_path: Option<PathBuf>,
    #[serde(default)]
    pub payouts_path: Option<PathBuf>,
    #[serde(default)]
    pub sample_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub baseline_revenue: f64,
    #[serde(default = "default_leaderboard_limit")]
    pub leaderboard_limit: usize,
    #[serde(default = "default_worst_performers_limit")]
    pub worst_performers_limit: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub csv_path: Option<PathBuf>,
    #[serde(default)]
    pub json_path: Option<PathBuf>,
}

pub const SAMPLE_INFLUENCERS_FILE: &str = "influencers.csv";
pub const SAMPLE_POSTS_FILE: &str = "posts.csv";
pub const SAMPLE_TRACKING_FILE: &str = "tracking_data.csv";
pub const SAMPLE_PAYOUTS_FILE: &str = "payouts.csv";

fn default_leaderboard_limit() -> usize {
    10
}
fn default_worst_performers_limit() -> usize {
    5
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            baseline_revenue: 0.0,
            leaderboard_limit: default_leaderboard_limit(),
            worst_performers_limit: default_worst_performers_limit(),
        }
    }
}

/// Paths of the four tables, in loader order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePaths {
    pub influencers: PathBuf,
    pub posts: PathBuf,
    pub tracking: PathBuf,
    pub payouts: PathBuf,
}

impl TablePaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            influencers: dir.join(SAMPLE_INFLUENCERS_FILE),
            posts: dir.join(SAMPLE_POSTS_FILE),
            tracking: dir.join(SAMPLE_TRACKING_FILE),
            payouts: dir.join(SAMPLE_PAYOUTS_FILE),
        }
    }

    pub fn all_exist(&self) -> bool {
        [&self.influencers, &self.posts, &self.tracking, &self.payouts]
            .iter()
            .all(|p| p.is_file())
    }
}

impl DataConfig {
    /// All four explicit paths, or `None` if any is missing.
    pub fn explicit_paths(&self) -> Option<TablePaths> {
        Some(TablePaths {
            influencers: self.influencers_path.clone()?,
            posts: self.posts_path.clone()?,
            tracking: self.tracking_path.clone()?,
            payouts: self.payouts_path.clone()?,
        })
    }

    /// Sample directory paths, only when all four files are present.
    pub fn sample_paths(&self) -> Option<TablePaths> {
        let paths = TablePaths::in_dir(self.sample_dir.as_deref()?);
        paths.all_exist().then_some(paths)
    }
}

pub fn validate_baseline(baseline: f64) -> RoiResult<f64> {
    if baseline.is_finite() && baseline >= 0.0 {
        Ok(baseline)
    } else {
        Err(RoiError::InvalidBaseline(baseline))
    }
}

impl AppConfig {
    /// Load configuration from an optional config file and environment variables.
    ///
    /// A named file must exist and parse; an unreadable file is an error, not
    /// a silent fallback to defaults.
    pub fn load(file: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("INFLUENCER_ROI")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn validate(&self) -> RoiResult<()> {
        validate_baseline(self.pipeline.baseline_revenue)?;
        if self.pipeline.leaderboard_limit == 0 {
            return Err(RoiError::Config(
                "pipeline.leaderboard_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.pipeline.baseline_revenue, 0.0);
        assert_eq!(cfg.pipeline.leaderboard_limit, 10);
        assert_eq!(cfg.pipeline.worst_performers_limit, 5);
        assert!(cfg.data.explicit_paths().is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_explicit_paths_require_all_four() {
        let mut data = DataConfig {
            influencers_path: Some("i.csv".into()),
            posts_path: Some("p.csv".into()),
            tracking_path: Some("t.csv".into()),
            payouts_path: None,
            sample_dir: None,
        };
        assert!(data.explicit_paths().is_none());
        data.payouts_path = Some("pay.csv".into());
        let paths = data.explicit_paths().unwrap();
        assert_eq!(paths.payouts, PathBuf::from("pay.csv"));
    }

    #[test]
    fn test_sample_paths_missing_dir() {
        let data = DataConfig {
            sample_dir: Some("/definitely/not/here".into()),
            ..Default::default()
        };
        assert!(data.sample_paths().is_none());
    }

    #[test]
    fn test_negative_baseline_rejected() {
        assert!(validate_baseline(-5.0).is_err());
        assert!(validate_baseline(f64::NAN).is_err());
        assert_eq!(validate_baseline(120.0).unwrap(), 120.0);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(AppConfig::load(Some("/definitely/not/here/roi.toml")).is_err());
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roi.toml");
        std::fs::write(&path, "[pipeline\nbaseline_revenue = ").unwrap();
        assert!(AppConfig::load(path.to_str()).is_err());
    }

    #[test]
    fn test_load_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roi.toml");
        std::fs::write(
            &path,
            "[pipeline]\nbaseline_revenue = 300.0\nleaderboard_limit = 3\n",
        )
        .unwrap();
        let cfg = AppConfig::load(path.to_str()).unwrap();
        assert_eq!(cfg.pipeline.baseline_revenue, 300.0);
        assert_eq!(cfg.pipeline.leaderboard_limit, 3);
        assert_eq!(cfg.pipeline.worst_performers_limit, 5);
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{"pipeline": {"baseline_revenue": 250.0}}"#).unwrap();
        assert_eq!(cfg.pipeline.baseline_revenue, 250.0);
        assert_eq!(cfg.pipeline.leaderboard_limit, 10);
        assert!(cfg.export.csv_path.is_none());
    }
}
