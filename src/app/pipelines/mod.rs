pub mod custom_pipeline;
pub mod presence_pipeline;

pub use custom_pipeline::CustomTextPipeline;
pub use presence_pipeline::PresencePipeline;

use crate::adapters::{Background, PdfRenderer, SpreadsheetSource, ZipArchiveWriter};
use crate::config::CertificateConfig;
use crate::domain::model::{BatchOutcome, RunReport, Table};
use crate::domain::ports::{ArchiveWriter, Storage, TableSource};
use crate::utils::error::Result;

/// Reads the configured input through storage and decodes it.
pub async fn read_input<S: Storage>(storage: &S, config: &CertificateConfig) -> Result<Table> {
    let path = config.input_path()?;
    tracing::debug!("Reading input spreadsheet: {}", path);
    let bytes = storage.read_file(path).await?;
    let source = SpreadsheetSource::new(config.input.sheet.clone(), config.delimiter()?);
    source.read(&bytes, path)
}

async fn build_renderer<S: Storage>(storage: &S, config: &CertificateConfig) -> Result<PdfRenderer> {
    let background = match config.render.background.as_deref() {
        Some(path) if !path.trim().is_empty() => {
            tracing::debug!("Loading background image: {}", path);
            let bytes = storage.read_file(path).await?;
            Some(Background::from_bytes(&bytes)?)
        }
        _ => None,
    };
    Ok(PdfRenderer::new(config.render.layout.clone(), background))
}

async fn write_archive<S: Storage>(
    storage: &S,
    outcome: BatchOutcome,
    output_path: String,
) -> Result<RunReport> {
    let bytes = ZipArchiveWriter.pack(&outcome.archive)?;
    storage.write_file(&output_path, &bytes).await?;

    let certificates = outcome.archive.len();
    let mean_hours = if certificates > 0 {
        outcome.total_hours / certificates as f64
    } else {
        0.0
    };

    Ok(RunReport {
        output_path,
        certificates,
        participants: outcome.participants,
        total_hours: outcome.total_hours,
        mean_hours,
        skipped: outcome.failures,
    })
}
