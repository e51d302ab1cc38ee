use crate::domain::model::{Archive, BatchOutcome, CertificateText, RunReport, Table};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Decodes spreadsheet bytes into a [`Table`]. `file_name` is used for
/// format detection and error messages.
pub trait TableSource: Send + Sync {
    fn read(&self, bytes: &[u8], file_name: &str) -> Result<Table>;
}

/// Turns the composed text of one certificate into document bytes.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, text: &CertificateText) -> Result<Vec<u8>>;
}

pub trait ArchiveWriter: Send + Sync {
    fn pack(&self, archive: &Archive) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Table>;
    async fn transform(&self, table: Table) -> Result<BatchOutcome>;
    async fn load(&self, outcome: BatchOutcome) -> Result<RunReport>;
}
