//! Excel workbook I/O
//!
//! - Import: line-item workbook (.xlsx) → [`Table`](crate::types::Table)
//! - Export: metric answer → chart workbook (.xlsx)

mod exporter;
mod importer;

pub use exporter::ChartExporter;
pub use importer::{load, ExcelLoader};
