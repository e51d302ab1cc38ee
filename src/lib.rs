pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{LocalStorage, PdfRenderer, SpreadsheetSource, ZipArchiveWriter};
pub use app::{CustomTextPipeline, PresencePipeline};
pub use config::CertificateConfig;
pub use core::engine::CertificateEngine;
pub use utils::error::{CertificateError, Result};
