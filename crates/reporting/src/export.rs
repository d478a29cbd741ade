//! CSV and JSON export of a render pass.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use roi_core::RoiResult;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::metrics::ScoredRecord;
use crate::pipeline::DashboardReport;

pub const EXPORT_COLUMNS: [&str; 10] = [
    "brand",
    "campaign",
    "name",
    "platform",
    "product",
    "orders",
    "revenue",
    "total_payout",
    "ROAS",
    "incremental_ROAS",
];

/// One line of the detailed campaign export. Undefined ratios and missing
/// influencer or payout fields are written as empty cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub brand: String,
    pub campaign: String,
    pub name: Option<String>,
    pub platform: Option<String>,
    pub product: String,
    pub orders: u64,
    pub revenue: f64,
    pub total_payout: Option<f64>,
    #[serde(rename = "ROAS")]
    pub roas: Option<f64>,
    #[serde(rename = "incremental_ROAS")]
    pub incremental_roas: Option<f64>,
}

impl From<&ScoredRecord> for ExportRow {
    fn from(r: &ScoredRecord) -> Self {
        Self {
            brand: r.record.brand.clone(),
            campaign: r.record.campaign.clone(),
            name: r.record.name.clone(),
            platform: r.record.platform.clone(),
            product: r.record.product.clone(),
            orders: r.record.orders,
            revenue: r.record.revenue,
            total_payout: r.record.total_payout,
            roas: r.roas,
            incremental_roas: r.incremental_roas,
        }
    }
}

/// Write the header and one row per record. The header is written even
/// when there are no records.
pub fn write_csv<W: Write>(records: &[ScoredRecord], writer: W) -> RoiResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(EXPORT_COLUMNS)?;
    for record in records {
        wtr.serialize(ExportRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(records: &[ScoredRecord]) -> RoiResult<String> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    Ok(String::from_utf8(buf).map_err(anyhow::Error::from)?)
}

pub fn write_csv_file(records: &[ScoredRecord], path: &Path) -> RoiResult<()> {
    write_csv(records, File::create(path)?)?;
    info!(path = %path.display(), rows = records.len(), "CSV export written");
    Ok(())
}

/// Parse a file produced by [`write_csv`].
pub fn read_csv<R: Read>(reader: R) -> RoiResult<Vec<ExportRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let rows = rdr.deserialize().collect::<Result<Vec<ExportRow>, _>>()?;
    Ok(rows)
}

pub fn to_json_string(report: &DashboardReport) -> RoiResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn write_json_file(report: &DashboardReport, path: &Path) -> RoiResult<()> {
    std::fs::write(path, to_json_string(report)?)?;
    info!(path = %path.display(), "JSON report written");
    Ok(())
}
