// Adapters layer: concrete implementations for external systems (spreadsheets, pdf, zip, storage).

pub mod pdf_renderer;
pub mod storage;
pub mod table_source;
pub mod zip_archive;

pub use pdf_renderer::{Background, PdfLayout, PdfRenderer};
pub use storage::LocalStorage;
pub use table_source::SpreadsheetSource;
pub use zip_archive::ZipArchiveWriter;
