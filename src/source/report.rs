use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::ReportError;
use crate::source::ReportWriter;
use crate::types::ranking::RankingTable;

/// Writes ranking tables as CSV files into one directory.
#[derive(Debug, Clone)]
pub struct CsvReportWriter {
    dir: PathBuf,
}

impl CsvReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ReportWriter for CsvReportWriter {
    fn emit(&self, table: &RankingTable, destination: &str) -> Result<String, ReportError> {
        table.check_shape()?;
        fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(format!("{}.csv", destination));
        let file = fs::File::create(&path)?;
        write_table(table, file)?;

        tracing::info!("Saved {} rows to {}", table.rows.len(), path.display());
        Ok(path.display().to_string())
    }
}

/// `2024-03-01_2k` style report name.
pub fn report_name(slug: &str, date: NaiveDate) -> String {
    format!("{}_{}", date.format("%Y-%m-%d"), slug)
}

pub fn to_csv(table: &RankingTable) -> Result<Vec<u8>, ReportError> {
    table.check_shape()?;
    let mut buffer = Vec::new();
    write_table(table, &mut buffer)?;
    Ok(buffer)
}

fn write_table<W: Write>(table: &RankingTable, out: W) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&table.header)?;
    for row in &table.rows {
        writer.write_record(row.cells().iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
