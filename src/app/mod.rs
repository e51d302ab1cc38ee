pub mod pipelines;

pub use pipelines::{CustomTextPipeline, PresencePipeline};
