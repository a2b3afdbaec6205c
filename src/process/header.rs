// src/process/header.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use tracing::trace;

use crate::error::{Result, ScrapeError};
use crate::process::utils::normalize_text;

static HEADER_ROW: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr.tableHeader").expect("header row selector should parse"));
static HEADER_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th").expect("header cell selector should parse"));

/// One `<th>`: its normalized label and how many columns it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub label: String,
    pub span: usize,
}

impl HeaderCell {
    pub fn new(label: impl Into<String>, span: usize) -> Self {
        Self {
            label: label.into(),
            span,
        }
    }

    fn from_element(th: ElementRef<'_>) -> Result<Self> {
        let span = match th.value().attr("colspan") {
            None => 1,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ScrapeError::InvalidColspan {
                        value: raw.to_string(),
                    })
                }
            },
        };
        // all descendant text, so `High<br/>Net Worth` reads "HighNet Worth"
        let label = normalize_text(&th.text().collect::<String>());
        Ok(Self { label, span })
    }
}

/// Read every `tr.tableHeader` row of `table` as header cells, in document order.
pub fn header_rows(table: ElementRef<'_>) -> Result<Vec<Vec<HeaderCell>>> {
    table
        .select(&HEADER_ROW)
        .map(|tr| {
            tr.select(&HEADER_CELL)
                .map(HeaderCell::from_element)
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}

/// Repeat each label once per spanned column.
fn expand(row: &[HeaderCell]) -> Vec<&str> {
    row.iter()
        .flat_map(|cell| std::iter::repeat(cell.label.as_str()).take(cell.span))
        .collect()
}

/// Combine two span-aware header rows into one flat name per column.
///
/// Labels at the same expanded position are joined with a space, trimmed, and
/// have every `"- "` removed so that wrapped labels like `Founda-`/`tions`
/// come out as `Foundations`. Empty names are kept.
pub fn flatten_header_rows(first: &[HeaderCell], second: &[HeaderCell]) -> Result<Vec<String>> {
    let top = expand(first);
    let bottom = expand(second);
    if top.len() != bottom.len() {
        return Err(ScrapeError::HeaderWidthMismatch {
            first: top.len(),
            second: bottom.len(),
        });
    }

    let names: Vec<String> = top
        .iter()
        .zip(bottom.iter())
        .map(|(a, b)| format!("{} {}", a, b).trim().replace("- ", ""))
        .collect();
    trace!(?names, "flattened header");
    Ok(names)
}

/// Flat column names for a region table with a two-row header block.
pub fn flatten_headers(table: ElementRef<'_>) -> Result<Vec<String>> {
    let rows = header_rows(table)?;
    match rows.as_slice() {
        [first, second] => flatten_header_rows(first, second),
        _ => Err(ScrapeError::HeaderRowCount { found: rows.len() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first_table(doc: &Html) -> ElementRef<'_> {
        doc.select(&Selector::parse("table").unwrap()).next().unwrap()
    }

    const REPORT_HEADER: &str = r#"
        <table><thead>
        <tr class="tableHeaderMeta">
          <th colspan="5"> </th><th colspan="6">Customers</th><th colspan="4"> </th>
        </tr>
        <tr class="tableHeader">
          <th colspan="2"><b>Rank</b></th>
          <th colspan="3">&nbsp;</th>
          <th><b>   Individuals   </b></th>
          <th><b>High<br/>Net Worth</b></th>
          <th><b>Ultra-High<br/>Net Worth</b></th>
          <th valign="bottom"><b>Founda-</b></th>
          <th valign="bottom"><b>Endow-</b></th>
          <th valign="bottom"><b>Institu-</b></th>
          <th><b>Total<br/>Asset</b></th>
          <th><b>Typical<br/>Account</b></th>
          <th><b>Typical<br/>Net Worth</b></th>
        </tr>
        <tr class="tableHeader">
          <th><b>'18</b></th><th>'17</th>
          <th><b>Name</b></th><th><b>Firm</b></th><th><b>Location</b></th>
          <th>(Up to $1mil)</th><th>($1-10 mil)</th><th>($10 mil+)</th>
          <th><b>tions</b></th><th><b>ments</b></th><th><b>tional</b></th>
          <th>($mil)</th><th>($mil)</th><th>($mil)</th>
        </tr>
        </thead><tbody></tbody></table>"#;

    #[test]
    fn spans_expand_and_rows_join() {
        let first = vec![
            HeaderCell::new("Rank", 2),
            HeaderCell::new("", 3),
            HeaderCell::new("Individuals", 1),
        ];
        let second = vec![
            HeaderCell::new("'18", 1),
            HeaderCell::new("'17", 1),
            HeaderCell::new("Name", 1),
            HeaderCell::new("Firm", 1),
            HeaderCell::new("Location", 1),
            HeaderCell::new("(Up to $1mil)", 1),
        ];
        let names = flatten_header_rows(&first, &second).unwrap();
        assert_eq!(
            names,
            vec![
                "Rank '18",
                "Rank '17",
                "Name",
                "Firm",
                "Location",
                "Individuals (Up to $1mil)"
            ]
        );
    }

    #[test]
    fn full_report_header() {
        let doc = Html::parse_document(REPORT_HEADER);
        let names = flatten_headers(first_table(&doc)).unwrap();
        assert_eq!(names.len(), 14);
        assert_eq!(&names[..2], ["Rank '18", "Rank '17"]);
        assert_eq!(names[2], "Name");
        assert_eq!(names[6], "HighNet Worth ($1-10 mil)");
        assert_eq!(names[8], "Foundations");
        assert_eq!(names[9], "Endowments");
        assert_eq!(names[10], "Institutional");
        assert_eq!(names[5], "Individuals (Up to $1mil)");
        assert_eq!(names[13], "TypicalNet Worth ($mil)");
    }

    #[test]
    fn meta_row_is_not_a_header_row() {
        let doc = Html::parse_document(REPORT_HEADER);
        let rows = header_rows(first_table(&doc)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], HeaderCell::new("Rank", 2));
        assert_eq!(rows[0][1], HeaderCell::new("", 3));
    }

    #[test]
    fn flattening_is_repeatable() {
        let doc = Html::parse_document(REPORT_HEADER);
        let table = first_table(&doc);
        assert_eq!(flatten_headers(table).unwrap(), flatten_headers(table).unwrap());
    }

    #[test]
    fn width_mismatch_is_rejected() {
        let first = vec![HeaderCell::new("Rank", 2)];
        let second = vec![HeaderCell::new("'18", 1)];
        let err = flatten_header_rows(&first, &second).unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::HeaderWidthMismatch { first: 2, second: 1 }
        ));
    }

    #[test]
    fn empty_pairs_give_empty_names() {
        let first = vec![HeaderCell::new("", 1), HeaderCell::new("A", 1)];
        let second = vec![HeaderCell::new("", 1), HeaderCell::new("", 1)];
        assert_eq!(flatten_header_rows(&first, &second).unwrap(), vec!["", "A"]);
    }

    #[test]
    fn bad_colspan_is_rejected() {
        let html = r#"<table><tr class="tableHeader"><th colspan="two">X</th></tr>
            <tr class="tableHeader"><th>Y</th></tr></table>"#;
        let doc = Html::parse_document(html);
        let err = flatten_headers(first_table(&doc)).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidColspan { .. }));

        let html = r#"<table><tr class="tableHeader"><th colspan="0">X</th></tr></table>"#;
        let doc = Html::parse_document(html);
        assert!(header_rows(first_table(&doc)).is_err());
    }

    #[test]
    fn wrong_number_of_header_rows() {
        let html = r#"<table><tr class="tableHeader"><th>X</th></tr><tr><td>1</td></tr></table>"#;
        let doc = Html::parse_document(html);
        let err = flatten_headers(first_table(&doc)).unwrap_err();
        assert!(matches!(err, ScrapeError::HeaderRowCount { found: 1 }));
    }
}
