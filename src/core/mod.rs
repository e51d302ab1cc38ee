pub mod aggregator;
pub mod column_resolver;
pub mod composer;
pub mod engine;
pub mod packager;
pub mod preview;

pub use crate::domain::model::{
    Archive, BatchOutcome, CertificateText, ColumnResolution, ParticipantSummary, RunReport, Table,
};
pub use crate::domain::ports::{ArchiveWriter, DocumentRenderer, Pipeline, Storage, TableSource};
pub use crate::utils::error::Result;
