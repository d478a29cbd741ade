//! Data loader: reads the four campaign tables from CSV, validating the
//! header against each table's required columns.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use roi_core::config::{DataConfig, TablePaths};
use roi_core::sample;
use roi_core::types::{
    Influencer, InfluencerId, Payout, PayoutBasis, Post, RawTables, TableOrigin, TrackingEvent,
    UNKNOWN,
};
use roi_core::{RoiError, RoiResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

pub const INFLUENCERS: &str = "influencers";
pub const POSTS: &str = "posts";
pub const TRACKING: &str = "tracking";
pub const PAYOUTS: &str = "payouts";

const INFLUENCER_COLUMNS: &[&str] = &["id", "name", "followers", "platform"];
const POST_COLUMNS: &[&str] = &["influencer_id", "platform", "reach", "likes", "comments"];
const TRACKING_COLUMNS: &[&str] = &["influencer_id", "product", "orders", "revenue"];
const PAYOUT_COLUMNS: &[&str] = &["influencer_id", "total_payout"];

// ─── Raw CSV rows ───────────────────────────────────────────────────────────

// Identifier and count cells stay text until `RowCtx` parses them, so large
// ids never pass through `f64`.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InfluencerRow {
    id: Option<String>,
    name: Option<String>,
    category: Option<String>,
    gender: Option<String>,
    followers: Option<String>,
    platform: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PostRow {
    influencer_id: Option<String>,
    platform: Option<String>,
    date: Option<String>,
    url: Option<String>,
    caption: Option<String>,
    reach: Option<String>,
    likes: Option<String>,
    comments: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TrackingRow {
    source: Option<String>,
    campaign: Option<String>,
    influencer_id: Option<String>,
    user_id: Option<String>,
    product: Option<String>,
    date: Option<String>,
    orders: Option<String>,
    revenue: Option<f64>,
    brand: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PayoutRow {
    influencer_id: Option<String>,
    basis: Option<String>,
    rate: Option<f64>,
    orders: Option<String>,
    total_payout: Option<f64>,
}

/// 2^53; every integer below it has an exact `f64` representation.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Parse a non-negative integer cell. Plain digits are read exactly; a
/// float-formatted cell such as `2.0` is accepted only when it is integral
/// and small enough to have been written without rounding.
fn parse_count(raw: &str) -> Option<u64> {
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n);
    }
    let value: f64 = raw.parse().ok()?;
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < MAX_EXACT_FLOAT)
        .then_some(value as u64)
}

/// Position of a data row, for error messages. Rows are numbered from 1,
/// not counting the header.
struct RowCtx {
    table: &'static str,
    row: usize,
}

impl RowCtx {
    fn required<T>(&self, value: Option<T>, column: &'static str) -> RoiResult<T> {
        value.ok_or_else(|| RoiError::invalid_value(self.table, self.row, column, "missing value"))
    }

    fn count(&self, value: Option<String>, column: &'static str) -> RoiResult<u64> {
        let raw = self.required(value, column)?;
        parse_count(&raw).ok_or_else(|| {
            RoiError::invalid_value(
                self.table,
                self.row,
                column,
                format!("expected a non-negative integer, got '{raw}'"),
            )
        })
    }

    fn id(&self, value: Option<String>, column: &'static str) -> RoiResult<InfluencerId> {
        self.count(value, column)
    }

    fn amount(&self, value: Option<f64>, column: &'static str) -> RoiResult<f64> {
        let value = self.required(value, column)?;
        if !value.is_finite() || value < 0.0 {
            return Err(RoiError::invalid_value(
                self.table,
                self.row,
                column,
                format!("expected a non-negative number, got {value}"),
            ));
        }
        Ok(value)
    }

    /// Dates are informational only; an unreadable cell is logged and
    /// dropped rather than failing the table.
    fn date(&self, value: Option<String>, column: &'static str) -> Option<NaiveDate> {
        let raw = value?;
        // Accept a trailing time component, e.g. "2025-06-01 00:00:00".
        let day = raw.get(..10).unwrap_or(raw.as_str());
        match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(e) => {
                warn!(
                    table = self.table,
                    row = self.row,
                    column,
                    value = %raw,
                    error = %e,
                    "Unreadable date, leaving it empty"
                );
                None
            }
        }
    }

    fn basis(&self, value: Option<String>) -> Option<PayoutBasis> {
        let raw = value?;
        match raw.parse() {
            Ok(basis) => Some(basis),
            Err(_) => {
                warn!(
                    table = self.table,
                    row = self.row,
                    value = %raw,
                    "Unrecognised payout basis, leaving it empty"
                );
                None
            }
        }
    }
}

fn read_rows<R: Read, T: DeserializeOwned>(
    reader: R,
    table: &'static str,
    required: &[&str],
) -> RoiResult<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if let Some(missing) = required
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        return Err(RoiError::schema(table, *missing));
    }

    let rows = rdr.deserialize().collect::<Result<Vec<T>, _>>()?;
    debug!(table, rows = rows.len(), "Parsed CSV table");
    Ok(rows)
}

fn rows_with_ctx<T>(rows: Vec<T>, table: &'static str) -> impl Iterator<Item = (RowCtx, T)> {
    rows.into_iter()
        .enumerate()
        .map(move |(i, row)| (RowCtx { table, row: i + 1 }, row))
}

// ─── Table readers ──────────────────────────────────────────────────────────

/// `category` and `gender` are optional and default to "Unknown".
pub fn read_influencers<R: Read>(reader: R) -> RoiResult<Vec<Influencer>> {
    let rows: Vec<InfluencerRow> = read_rows(reader, INFLUENCERS, INFLUENCER_COLUMNS)?;
    rows_with_ctx(rows, INFLUENCERS)
        .map(|(ctx, row)| -> RoiResult<Influencer> {
            Ok(Influencer {
                id: ctx.id(row.id, "id")?,
                name: ctx.required(row.name, "name")?,
                category: row.category.unwrap_or_else(|| UNKNOWN.to_string()),
                gender: row.gender.unwrap_or_else(|| UNKNOWN.to_string()),
                followers: ctx.count(row.followers, "followers")?,
                platform: ctx.required(row.platform, "platform")?,
            })
        })
        .collect()
}

pub fn read_posts<R: Read>(reader: R) -> RoiResult<Vec<Post>> {
    let rows: Vec<PostRow> = read_rows(reader, POSTS, POST_COLUMNS)?;
    rows_with_ctx(rows, POSTS)
        .map(|(ctx, row)| -> RoiResult<Post> {
            Ok(Post {
                influencer_id: ctx.id(row.influencer_id, "influencer_id")?,
                platform: ctx.required(row.platform, "platform")?,
                date: ctx.date(row.date, "date"),
                url: row.url,
                caption: row.caption.unwrap_or_default(),
                reach: ctx.count(row.reach, "reach")?,
                likes: ctx.count(row.likes, "likes")?,
                comments: ctx.count(row.comments, "comments")?,
            })
        })
        .collect()
}

/// A missing `brand` column is not an error; the merge engine derives it.
pub fn read_tracking<R: Read>(reader: R) -> RoiResult<Vec<TrackingEvent>> {
    let rows: Vec<TrackingRow> = read_rows(reader, TRACKING, TRACKING_COLUMNS)?;
    rows_with_ctx(rows, TRACKING)
        .map(|(ctx, row)| -> RoiResult<TrackingEvent> {
            Ok(TrackingEvent {
                source: row.source.unwrap_or_default(),
                campaign: row.campaign.unwrap_or_default(),
                influencer_id: ctx.id(row.influencer_id, "influencer_id")?,
                user_id: row.user_id.unwrap_or_default(),
                product: ctx.required(row.product, "product")?,
                date: ctx.date(row.date, "date"),
                orders: ctx.count(row.orders, "orders")?,
                revenue: ctx.amount(row.revenue, "revenue")?,
                brand: row.brand,
            })
        })
        .collect()
}

pub fn read_payouts<R: Read>(reader: R) -> RoiResult<Vec<Payout>> {
    let rows: Vec<PayoutRow> = read_rows(reader, PAYOUTS, PAYOUT_COLUMNS)?;
    rows_with_ctx(rows, PAYOUTS)
        .map(|(ctx, row)| -> RoiResult<Payout> {
            Ok(Payout {
                influencer_id: ctx.id(row.influencer_id, "influencer_id")?,
                basis: ctx.basis(row.basis),
                rate: row.rate,
                orders: row.orders.map(|o| ctx.count(Some(o), "orders")).transpose()?,
                total_payout: ctx.amount(row.total_payout, "total_payout")?,
            })
        })
        .collect()
}

// ─── Source resolution ──────────────────────────────────────────────────────

fn open(path: &Path) -> RoiResult<File> {
    File::open(path).map_err(|source| RoiError::Open {
        path: path.display().to_string(),
        source,
    })
}

pub fn read_paths(paths: &TablePaths, origin: TableOrigin) -> RoiResult<RawTables> {
    let tables = RawTables {
        influencers: read_influencers(open(&paths.influencers)?)?,
        posts: read_posts(open(&paths.posts)?)?,
        tracking: read_tracking(open(&paths.tracking)?)?,
        payouts: read_payouts(open(&paths.payouts)?)?,
        origin,
    };
    info!(
        ?origin,
        influencers = tables.influencers.len(),
        posts = tables.posts.len(),
        tracking = tables.tracking.len(),
        payouts = tables.payouts.len(),
        "Input tables loaded"
    );
    Ok(tables)
}

/// Resolve the four input tables: explicit paths when all four are set,
/// otherwise the sample directory when it holds all four files, otherwise
/// the bundled sample dataset.
pub fn load_tables(config: &DataConfig) -> RoiResult<RawTables> {
    if let Some(paths) = config.explicit_paths() {
        return read_paths(&paths, TableOrigin::Provided);
    }

    let configured = [
        &config.influencers_path,
        &config.posts_path,
        &config.tracking_path,
        &config.payouts_path,
    ]
    .iter()
    .filter(|p| p.is_some())
    .count();
    if configured > 0 {
        warn!(
            configured,
            "Only some input tables were supplied; falling back to sample data"
        );
    }

    if let Some(paths) = config.sample_paths() {
        info!(dir = ?config.sample_dir, "Loading sample data files");
        return read_paths(&paths, TableOrigin::SampleFiles);
    }

    warn!("Sample files not found, using built-in demo data");
    Ok(sample::tables())
}
