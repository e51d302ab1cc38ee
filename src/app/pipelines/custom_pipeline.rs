use super::{build_renderer, read_input, write_archive};
use crate::config::toml_config::{CertificateConfig, DEFAULT_CUSTOM_ARCHIVE};
use crate::core::aggregator::custom_entries;
use crate::core::column_resolver::find_column;
use crate::core::composer::{CertificateComposer, CustomTemplate};
use crate::core::packager::BatchPackager;
use crate::core::{BatchOutcome, Pipeline, RunReport, Storage, Table};
use crate::domain::model::ColumnRef;
use crate::utils::error::{CertificateError, Result};

/// One certificate per named row, with the body taken from a template or a text column.
pub struct CustomTextPipeline<S: Storage> {
    storage: S,
    config: CertificateConfig,
}

impl<S: Storage> CustomTextPipeline<S> {
    pub fn new(storage: S, config: CertificateConfig) -> Self {
        Self { storage, config }
    }

    fn template(&self) -> CustomTemplate {
        let custom = &self.config.custom;
        let mut template = CustomTemplate::new(custom.template.clone()).with_footer(custom.footer.clone());
        if !custom.placeholders.is_empty() {
            template.placeholders = custom.placeholders.clone();
        }
        template
    }

    fn name_column(&self, headers: &[&str]) -> Result<ColumnRef> {
        if let Some(column) = find_column(headers, "name", self.config.custom.name_column.as_deref())? {
            return Ok(column);
        }
        headers
            .first()
            .map(|header| ColumnRef {
                index: 0,
                header: header.to_string(),
            })
            .ok_or_else(|| CertificateError::UnresolvableSchema {
                message: "table has no columns".to_string(),
            })
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for CustomTextPipeline<S> {
    async fn extract(&self) -> Result<Table> {
        read_input(&self.storage, &self.config).await
    }

    async fn transform(&self, table: Table) -> Result<BatchOutcome> {
        let renderer = build_renderer(&self.storage, &self.config).await?;

        let headers = table.headers();
        let name = self.name_column(&headers)?;
        let text = find_column(&headers, "text", self.config.custom.text_column.as_deref())?;
        if self.config.custom.template.is_none() && text.is_none() {
            tracing::warn!("⚠️ No template or text column configured, bodies will be empty");
        }

        let entries = custom_entries(&table, &name, text.as_ref());
        tracing::info!("👥 {} named rows in column '{}'", entries.len(), name.header);

        let render = &self.config.render;
        let composer = CertificateComposer::new(&render.title, &render.salutation, render.wrap_width);
        let template = self.template();
        let packager =
            BatchPackager::new(self.config.batch.on_render_failure, self.config.batch.workers);

        packager.build(
            &entries,
            |entry| composer.compose_custom(entry, &template),
            &renderer,
        )
    }

    async fn load(&self, outcome: BatchOutcome) -> Result<RunReport> {
        let output_path = self.config.archive_path(DEFAULT_CUSTOM_ARCHIVE);
        write_archive(&self.storage, outcome, output_path).await
    }
}
