use crate::export::Report;
use crate::Result;
use anyhow::Context;

pub(super) fn render(report: &Report) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if report.is_empty() {
        writer
            .write_record(super::ReportRow::HEADERS)
            .context("Unable to write the CSV header")?;
    }
    for row in report.rows() {
        writer
            .serialize(row)
            .with_context(|| format!("Unable to write transaction {} as CSV", row.id))?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish the CSV report: {}", e.error()))
}
