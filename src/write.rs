// src/write.rs

use std::{fs, io::BufWriter, path::Path};
use tempfile::NamedTempFile;
use tracing::{info, instrument};

use crate::dataset::Dataset;
use crate::error::{Result, ScrapeError};

/// Write `dataset` as delimited UTF-8 text with a header row and no index
/// column. Null cells are written as empty fields. Returns the number of
/// data rows written.
#[instrument(level = "info", skip(dataset, path), fields(path = %path.as_ref().display()))]
pub fn write_dataset<P: AsRef<Path>>(dataset: &Dataset, path: P, delimiter: u8) -> Result<usize> {
    let path = path.as_ref();
    if dataset.columns().is_empty() {
        return Err(ScrapeError::EmptyDataset);
    }

    // 1) Make sure the destination directory exists
    let dir = match path.parent().filter(|d| !d.as_os_str().is_empty()) {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            dir
        }
        None => Path::new("."),
    };

    // 2) Write everything to a tmp file in the same directory; it is removed
    //    on drop unless persisted
    let mut tmp = NamedTempFile::new_in(dir)?;
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(BufWriter::new(tmp.as_file_mut()));

    wtr.write_record(dataset.columns())?;
    for row in dataset.rows() {
        wtr.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
    }
    wtr.flush()?;
    drop(wtr);

    // 3) Rename over the destination
    tmp.persist(path).map_err(|e| ScrapeError::Io(e.error))?;

    info!(rows = dataset.len(), "wrote results to {}", path.display());
    Ok(dataset.len())
}
