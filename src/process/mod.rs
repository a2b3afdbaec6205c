//! Table normalization: flat headers, typed rows and region tagging.

pub mod header;
pub mod region;
pub mod rows;
pub mod utils;

pub use header::{flatten_header_rows, flatten_headers, header_rows, HeaderCell};
pub use region::{parse_region_page, RegionPattern, RegionTable};
pub use rows::{cell_value, extract_rows, Record};
pub use utils::normalize_text;
