//! Influencer ROI — runs one dashboard render pass over the campaign tables
//! and prints the KPIs, leaderboards and detailed table.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use roi_core::config::AppConfig;
use roi_reporting::export;
use roi_reporting::{load_tables, DashboardReport, FilterSpec, Pipeline};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "influencer-roi")]
#[command(about = "Influencer campaign ROI dashboard")]
#[command(version)]
struct Cli {
    /// Optional TOML config file
    #[arg(long, env = "INFLUENCER_ROI_CONFIG")]
    config: Option<String>,

    /// Influencers CSV (all four tables are needed, otherwise sample data is used)
    #[arg(long)]
    influencers: Option<PathBuf>,

    /// Posts CSV
    #[arg(long)]
    posts: Option<PathBuf>,

    /// Tracking data CSV
    #[arg(long)]
    tracking: Option<PathBuf>,

    /// Payouts CSV
    #[arg(long)]
    payouts: Option<PathBuf>,

    /// Directory holding influencers.csv, posts.csv, tracking_data.csv, payouts.csv
    #[arg(long)]
    sample_dir: Option<PathBuf>,

    /// Baseline revenue for incremental ROAS (overrides config)
    #[arg(long)]
    baseline: Option<f64>,

    /// Brands to keep (comma-separated; default: all)
    #[arg(long, value_delimiter = ',')]
    brand: Vec<String>,

    /// Products to keep
    #[arg(long, value_delimiter = ',')]
    product: Vec<String>,

    /// Platforms to keep
    #[arg(long, value_delimiter = ',')]
    platform: Vec<String>,

    /// Persona categories to keep
    #[arg(long, value_delimiter = ',')]
    category: Vec<String>,

    /// Genders to keep
    #[arg(long, value_delimiter = ',')]
    gender: Vec<String>,

    /// Minimum follower count (inclusive)
    #[arg(long)]
    min_followers: Option<u64>,

    /// Maximum follower count (inclusive)
    #[arg(long)]
    max_followers: Option<u64>,

    /// Leaderboard rows to show (overrides config)
    #[arg(long)]
    top: Option<usize>,

    /// Write the filtered detail table as CSV
    #[arg(long)]
    export_csv: Option<PathBuf>,

    /// Write the full report as JSON
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Output format on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "influencer_roi=info,roi_reporting=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    let data = &mut config.data;
    if let Some(p) = &cli.influencers {
        data.influencers_path = Some(p.clone());
    }
    if let Some(p) = &cli.posts {
        data.posts_path = Some(p.clone());
    }
    if let Some(p) = &cli.tracking {
        data.tracking_path = Some(p.clone());
    }
    if let Some(p) = &cli.payouts {
        data.payouts_path = Some(p.clone());
    }
    if let Some(dir) = &cli.sample_dir {
        data.sample_dir = Some(dir.clone());
    }
    if let Some(baseline) = cli.baseline {
        config.pipeline.baseline_revenue = baseline;
    }
    if let Some(top) = cli.top {
        config.pipeline.leaderboard_limit = top;
    }
    if let Some(path) = &cli.export_csv {
        config.export.csv_path = Some(path.clone());
    }
    if let Some(path) = &cli.export_json {
        config.export.json_path = Some(path.clone());
    }
}

/// Start from "everything selected" and narrow each dimension the user named.
fn build_filter(mut spec: FilterSpec, cli: &Cli) -> FilterSpec {
    if !cli.brand.is_empty() {
        spec = spec.brands(cli.brand.iter().cloned());
    }
    if !cli.product.is_empty() {
        spec = spec.products(cli.product.iter().cloned());
    }
    if !cli.platform.is_empty() {
        spec = spec.platforms(cli.platform.iter().cloned());
    }
    if !cli.category.is_empty() {
        spec = spec.categories(cli.category.iter().cloned());
    }
    if !cli.gender.is_empty() {
        spec = spec.genders(cli.gender.iter().cloned());
    }
    let range = spec.follower_range;
    spec.followers(
        cli.min_followers.unwrap_or(range.min),
        cli.max_followers.unwrap_or(range.max),
    )
}

fn fmt_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn print_text(report: &DashboardReport, top: usize) {
    let k = &report.kpis;
    println!("Influencer Campaign ROI Dashboard");
    println!("=================================");
    println!("Total Revenue     ₹{:.0}", k.total_revenue);
    println!("Total Payout      ₹{:.0}", k.total_payout);
    println!("Overall ROAS      {}", fmt_ratio(k.overall_roas));
    println!("Incremental ROAS  {}", fmt_ratio(k.overall_incremental_roas));

    println!("\nRevenue and Payout by Influencer");
    for row in &report.revenue_by_influencer {
        println!("  {:<16} {:>12.0} {:>12.0}", row.name, row.revenue, row.payout);
    }

    println!("\nPost Engagement (by Influencer and Platform)");
    for p in &report.post_engagement {
        println!(
            "  {:<16} {:<10} posts={} reach={} avg_likes={:.1} avg_comments={:.1}",
            p.name.as_deref().unwrap_or("-"),
            p.platform,
            p.post_count,
            p.total_reach,
            p.avg_likes,
            p.avg_comments
        );
    }

    println!("\nTop Influencers");
    for e in report.leaderboard.top(top) {
        println!(
            "  {:<16} {:<10} rev={:.0} payout={:.0} orders={} roas={} incr={}",
            e.name.as_deref().unwrap_or("-"),
            e.category,
            e.total_revenue,
            e.total_payout,
            e.total_orders,
            fmt_ratio(e.mean_roas),
            fmt_ratio(e.mean_incremental_roas)
        );
    }

    println!("\nBest Personas (Category avg ROAS)");
    for p in &report.personas {
        println!("  {:<16} {}", p.category, fmt_ratio(p.mean_roas));
    }

    println!("\nPoor ROIs (lowest incremental ROAS)");
    for r in &report.worst_performers {
        println!(
            "  {:<16} {:<12} {:<10} {:<14} incr={} rev={:.0} payout={}",
            r.record.name.as_deref().unwrap_or("-"),
            r.record.brand,
            r.record.platform.as_deref().unwrap_or("-"),
            r.record.product,
            fmt_ratio(r.incremental_roas),
            r.record.revenue,
            r.record
                .total_payout
                .map_or_else(|| "-".to_string(), |p| format!("{p:.0}"))
        );
    }

    println!("\nDetailed Campaign Table");
    for r in &report.records {
        println!(
            "  {:<12} {:<14} {:<16} {:<10} {:<14} {:>4} {:>8.0} roas={} incr={}",
            r.record.brand,
            r.record.campaign,
            r.record.name.as_deref().unwrap_or("-"),
            r.record.platform.as_deref().unwrap_or("-"),
            r.record.product,
            r.record.orders,
            r.record.revenue,
            fmt_ratio(r.roas),
            fmt_ratio(r.incremental_roas)
        );
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config =
        AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    apply_overrides(&mut config, &cli);
    config.validate().context("invalid configuration")?;

    info!(
        baseline = config.pipeline.baseline_revenue,
        leaderboard_limit = config.pipeline.leaderboard_limit,
        "Configuration loaded"
    );

    let tables = load_tables(&config.data).context("failed to load input tables")?;
    let pipeline = Pipeline::new(config.pipeline.clone());
    let spec = build_filter(pipeline.filter_options(&tables).allow_all(), &cli);
    let report = pipeline.run(&tables, &spec, config.pipeline.baseline_revenue)?;

    if let Some(path) = &config.export.csv_path {
        export::write_csv_file(&report.records, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    if let Some(path) = &config.export.json_path {
        export::write_json_file(&report, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    match cli.format {
        OutputFormat::Text => print_text(&report, config.pipeline.leaderboard_limit),
        OutputFormat::Json => println!("{}", export::to_json_string(&report)?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roi_core::sample;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("influencer-roi").chain(args.iter().copied()))
    }

    #[test]
    fn test_filter_flags_narrow_spec() {
        let cli = parse(&["--category", "Fitness", "--platform", "Instagram,Twitter"]);
        let tables = sample::tables();
        let pipeline = Pipeline::default();
        let spec = build_filter(pipeline.filter_options(&tables).allow_all(), &cli);
        assert_eq!(spec.categories.len(), 1);
        assert_eq!(spec.platforms.len(), 2);
        assert_eq!(spec.brands.len(), 3);
        assert_eq!(spec.follower_range.min, 66_000);

        let report = pipeline.run(&tables, &spec, 0.0).unwrap();
        assert_eq!(report.records.len(), 2);
    }

    #[test]
    fn test_follower_flags_override_range() {
        let cli = parse(&["--min-followers", "100000"]);
        let tables = sample::tables();
        let spec = build_filter(
            Pipeline::default().filter_options(&tables).allow_all(),
            &cli,
        );
        assert_eq!(spec.follower_range.min, 100_000);
        assert_eq!(spec.follower_range.max, 180_000);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = parse(&["--baseline", "500", "--top", "3", "--sample-dir", "/tmp/data"]);
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &cli);
        assert_eq!(config.pipeline.baseline_revenue, 500.0);
        assert_eq!(config.pipeline.leaderboard_limit, 3);
        assert_eq!(config.data.sample_dir, Some(PathBuf::from("/tmp/data")));
    }

    #[test]
    fn test_fmt_ratio() {
        assert_eq!(fmt_ratio(None), "-");
        assert_eq!(fmt_ratio(Some(0.49111)), "0.49");
    }
}
