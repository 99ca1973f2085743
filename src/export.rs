use std::cmp::Ordering;
use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook};
use tracing::warn;

use crate::slack::Message;
use crate::trade::{parse_message, Field, ParsedTrade};

pub const DATE_COLUMN: &str = "Date";

/// Largest number of characters Excel stores in one cell.
const MAX_CELL_CHARS: usize = 32_767;

pub fn columns() -> impl Iterator<Item = &'static str> {
    Field::ALL
        .iter()
        .map(|f| f.label())
        .chain(std::iter::once(DATE_COLUMN))
}

/// Ascending by date, rows without a date last.
fn by_date(a: &ParsedTrade, b: &ParsedTrade) -> Ordering {
    match (&a.date, &b.date) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn fit_cell(value: &str, row: u32, col: u16) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => {
            warn!(
                row,
                col,
                chars = value.chars().count(),
                "Cell value exceeds {} characters, truncating",
                MAX_CELL_CHARS
            );
            &value[..end]
        }
        None => value,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    rows: Vec<ParsedTrade>,
}

impl Table {
    /// Parses every message and sorts the resulting rows. The sort is stable.
    pub fn from_messages(messages: &[Message]) -> Self {
        Self::new(messages.iter().map(parse_message))
    }

    pub fn new(rows: impl IntoIterator<Item = ParsedTrade>) -> Self {
        Self {
            rows: rows.into_iter().sorted_by(by_date).collect(),
        }
    }

    pub fn rows(&self) -> &[ParsedTrade] {
        &self.rows
    }

    /// Writes the table to an xlsx file, replacing anything already at `path`.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut workbook = Workbook::new();
        let header = Format::new()
            .set_bold()
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Center);
        let sheet = workbook.add_worksheet();
        for (col, name) in columns().enumerate() {
            sheet.write_string_with_format(0, col as u16, name, &header)?;
        }
        for (i, row) in self.rows.iter().enumerate() {
            let row_num = i as u32 + 1;
            for (col, value) in row.cells().enumerate() {
                if let Some(value) = value {
                    let col = col as u16;
                    sheet.write_string(row_num, col, fit_cell(value, row_num, col))?;
                }
            }
        }
        workbook
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}
