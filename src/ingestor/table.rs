//! Structured-table strategy: one channel per `<tr>` with an address cell

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::address::{find_address, is_numeric_label};
use super::ExtractionStrategy;
use crate::models::RawRecord;

pub struct TableStrategy;

impl TableStrategy {
    pub fn new() -> Self {
        Self
    }

    fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
        row.children()
            .filter_map(ElementRef::wrap)
            .filter(|cell| matches!(cell.value().name(), "td" | "th"))
            .map(|cell| {
                cell.text()
                    .flat_map(str::split_whitespace)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    fn record_from_cells(cells: &[String]) -> Option<RawRecord> {
        let (address_index, address) = cells
            .iter()
            .enumerate()
            .find_map(|(i, text)| find_address(text).map(|m| (i, m.as_str().to_string())))?;

        let name = cells
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != address_index)
            .map(|(_, text)| text.trim())
            .find(|text| !text.is_empty() && !is_numeric_label(text));

        Some(match name {
            Some(name) => RawRecord::new(name, address),
            None => RawRecord::unnamed(address),
        })
    }
}

impl Default for TableStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for TableStrategy {
    fn name(&self) -> &'static str {
        "table"
    }

    fn extract(&self, content: &str) -> Vec<RawRecord> {
        let Ok(rows) = Selector::parse("table tr") else {
            return Vec::new();
        };

        let document = Html::parse_document(content);
        let records: Vec<RawRecord> = document
            .select(&rows)
            .filter_map(|row| Self::record_from_cells(&Self::cell_texts(row)))
            .collect();

        debug!("Table strategy matched {} rows", records.len());
        records
    }
}
