use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::ReportError;
use crate::types::category::Category;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Integer(i64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => f.write_str(text),
            Cell::Integer(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingRow {
    pub name: String,
    /// `"bike"` for bike entries, empty for rowers.
    pub tag: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<Cell>,
    pub split: String,
    pub watts: u32,
    pub stroke_rate: u32,
    pub splits: Vec<String>,
    #[serde(skip)]
    pub is_bike: bool,
    /// Pace in seconds per 500 m; lower ranks higher.
    #[serde(skip)]
    pub sort_key: f64,
}

impl RankingRow {
    pub fn tag_for(is_bike: bool) -> String {
        if is_bike {
            "bike".to_string()
        } else {
            String::new()
        }
    }

    pub fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![
            Cell::Text(self.name.clone()),
            Cell::Text(self.tag.clone()),
            Cell::Text(self.date.format("%Y-%m-%d").to_string()),
        ];
        if let Some(headline) = &self.headline {
            cells.push(headline.clone());
        }
        cells.push(Cell::Text(self.split.clone()));
        cells.push(Cell::Integer(self.watts as i64));
        cells.push(Cell::Integer(self.stroke_rate as i64));
        cells.extend(self.splits.iter().cloned().map(Cell::Text));
        cells
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingTable {
    pub category: String,
    pub header: Vec<String>,
    pub rows: Vec<RankingRow>,
}

impl RankingTable {
    pub fn new(category: &Category) -> Self {
        Self {
            category: category.slug.to_string(),
            header: category.header(),
            rows: Vec::new(),
        }
    }

    /// Rowers before bikes, then fastest first. Ties keep input order.
    pub fn sort(&mut self) {
        self.rows.sort_by(|a, b| {
            a.is_bike
                .cmp(&b.is_bike)
                .then(a.sort_key.total_cmp(&b.sort_key))
        });
    }

    pub fn check_shape(&self) -> Result<(), ReportError> {
        let expected = self.header.len();
        for (row, entry) in self.rows.iter().enumerate() {
            let found = entry.cells().len();
            if found != expected {
                return Err(ReportError::RowShape { row, found, expected });
            }
        }
        Ok(())
    }
}
