// src/dataset.rs

use std::collections::HashMap;
use tracing::debug;

use crate::process::region::RegionTable;

/// All region tables stacked into one, over the union of their columns.
/// A cell is `None` when its row's region had no such column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Dataset {
    /// Stack `tables` in order. Columns appear in first-seen order; the n-th
    /// column called `x` in any table lands in the n-th `x` slot of the
    /// union, so duplicate and empty names survive.
    pub fn concat(tables: Vec<RegionTable>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut slots: HashMap<(String, usize), usize> = HashMap::new();
        let mut layouts: Vec<Vec<usize>> = Vec::with_capacity(tables.len());

        for table in &tables {
            let mut occurrences: HashMap<&str, usize> = HashMap::new();
            let mut layout = Vec::with_capacity(table.columns.len());
            for name in &table.columns {
                let nth = occurrences.entry(name.as_str()).or_insert(0);
                let key = (name.clone(), *nth);
                *nth += 1;
                let idx = *slots.entry(key).or_insert_with(|| {
                    columns.push(name.clone());
                    columns.len() - 1
                });
                layout.push(idx);
            }
            layouts.push(layout);
        }

        let total: usize = tables.iter().map(RegionTable::len).sum();
        let mut rows = Vec::with_capacity(total);
        for (table, layout) in tables.into_iter().zip(layouts) {
            for record in table.records {
                let mut row = vec![None; columns.len()];
                for (value, &idx) in record.into_values().into_iter().zip(&layout) {
                    row[idx] = Some(value);
                }
                rows.push(row);
            }
        }

        debug!(columns = columns.len(), rows = rows.len(), "concatenated regions");
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
