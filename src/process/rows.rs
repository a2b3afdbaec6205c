// src/process/rows.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Node, Selector};
use tracing::debug;

use crate::error::{Result, ScrapeError};
use crate::process::utils::normalize_text;

static BODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody").expect("tbody selector should parse"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("row selector should parse"));
static CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("cell selector should parse"));
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("img selector should parse"));

/// One body row, positionally aligned with its table's column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record(Vec<String>);

impl Record {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn set(&mut self, idx: usize, value: String) {
        if let Some(slot) = self.0.get_mut(idx) {
            *slot = value;
        }
    }

    pub(crate) fn push(&mut self, value: String) {
        self.0.push(value);
    }

    pub fn into_values(self) -> Vec<String> {
        self.0
    }
}

/// The single string inside `el`, descending through elements that each
/// have exactly one child. `<td><b>x</b></td>` has one, `<td>a<br>b</td>`
/// and `<td></td>` do not.
fn sole_string(el: ElementRef<'_>) -> Option<String> {
    let mut children = el.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }
    match only.value() {
        Node::Text(text) => Some((**text).to_owned()),
        Node::Element(_) => ElementRef::wrap(only).and_then(sole_string),
        _ => None,
    }
}

/// Value of one body cell: its normalized text, else `image_marker` when it
/// holds an image, else the empty string.
pub fn cell_value(td: ElementRef<'_>, image_marker: &str) -> String {
    if let Some(text) = sole_string(td) {
        return normalize_text(&text);
    }
    if td.select(&IMG).next().is_some() {
        return image_marker.to_string();
    }
    String::new()
}

/// Convert the rows of the table's first `tbody` into records.
///
/// Rows without any `td` are spacers and yield nothing. Any other row must
/// have exactly `columns.len()` cells.
pub fn extract_rows(
    table: ElementRef<'_>,
    columns: &[String],
    image_marker: &str,
) -> Result<Vec<Record>> {
    let body = table
        .select(&BODY)
        .next()
        .ok_or_else(|| ScrapeError::MissingElement {
            what: "tbody",
            context: "region table".to_string(),
        })?;

    let mut records = Vec::new();
    for (row_idx, tr) in body.select(&ROW).enumerate() {
        let values: Vec<String> = tr
            .select(&CELL)
            .map(|td| cell_value(td, image_marker))
            .collect();
        if values.is_empty() {
            debug!(row = row_idx, "skipping row without data cells");
            continue;
        }
        if values.len() != columns.len() {
            return Err(ScrapeError::RowWidthMismatch {
                row: row_idx,
                expected: columns.len(),
                found: values.len(),
            });
        }
        records.push(Record::new(values));
    }
    Ok(records)
}
