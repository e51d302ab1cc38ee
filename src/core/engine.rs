use crate::core::Pipeline;
use crate::domain::model::RunReport;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives a [`Pipeline`] through extract, transform and load.
pub struct CertificateEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> CertificateEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("🚀 Starting certificate batch");
        self.monitor.log_stats("Start");

        tracing::info!("📥 Reading spreadsheet...");
        let table = self.pipeline.extract().await?;
        tracing::info!(
            "📊 Read {} rows across {} columns",
            table.row_count(),
            table.column_count()
        );
        self.monitor.log_stats("Extract");

        tracing::info!("🔧 Building certificates...");
        let outcome = self.pipeline.transform(table).await?;
        tracing::info!(
            "✅ Rendered {} of {} certificates",
            outcome.archive.len(),
            outcome.participants
        );
        if !outcome.failures.is_empty() {
            tracing::warn!("⚠️ {} participants were skipped", outcome.failures.len());
        }
        self.monitor.log_render_stats("Transform", outcome.archive.len());

        tracing::info!("💾 Writing archive...");
        let report = self.pipeline.load(outcome).await?;
        tracing::info!("📦 Output saved to: {}", report.output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats(report.certificates);

        Ok(report)
    }
}
