use super::{build_renderer, read_input, write_archive};
use crate::config::toml_config::{CertificateConfig, DEFAULT_PRESENCE_ARCHIVE};
use crate::core::aggregator::ParticipationAggregator;
use crate::core::column_resolver::ColumnResolver;
use crate::core::composer::{
    format_issue_date, format_period_date, CertificateComposer, PresenceDetails,
};
use crate::core::packager::BatchPackager;
use crate::core::{BatchOutcome, Pipeline, RunReport, Storage, Table};
use crate::utils::error::Result;
use std::collections::HashSet;

/// Attendance rows grouped per participant, one certificate with the total hours each.
pub struct PresencePipeline<S: Storage> {
    storage: S,
    config: CertificateConfig,
}

impl<S: Storage> PresencePipeline<S> {
    pub fn new(storage: S, config: CertificateConfig) -> Self {
        Self { storage, config }
    }

    fn details(&self) -> PresenceDetails {
        let presence = &self.config.presence;
        PresenceDetails {
            organization: presence.organization.clone(),
            start: format_period_date(&presence.start_date),
            end: format_period_date(&presence.end_date),
            location: presence.location.clone(),
            issue_date: presence
                .issue_date
                .clone()
                .unwrap_or_else(|| format_issue_date(chrono::Local::now().date_naive())),
            style: presence.body_style,
            activity_threshold: presence.activity_threshold,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for PresencePipeline<S> {
    async fn extract(&self) -> Result<Table> {
        read_input(&self.storage, &self.config).await
    }

    async fn transform(&self, table: Table) -> Result<BatchOutcome> {
        let renderer = build_renderer(&self.storage, &self.config).await?;

        let columns = &self.config.columns;
        let resolver = ColumnResolver::new(
            columns.keywords.clone(),
            columns.overrides.clone(),
            columns.fallback.clone(),
        );
        let resolution = resolver.resolve(&table.headers())?;
        tracing::info!(
            "🧭 Name column: '{}'{}",
            resolution.roles.name.header,
            if resolution.used_fallback() {
                " (positional fallback)"
            } else {
                ""
            }
        );

        let summaries = ParticipationAggregator::new(self.config.presence.hours_per_record)
            .with_normalized_names(self.config.batch.normalize_names)
            .aggregate(&table, &resolution)?;
        tracing::info!("👥 {} unique participants", summaries.len());

        let render = &self.config.render;
        let composer = CertificateComposer::new(&render.title, &render.salutation, render.wrap_width);
        let details = self.details();
        let packager =
            BatchPackager::new(self.config.batch.on_render_failure, self.config.batch.workers);

        let mut outcome = packager.build(
            &summaries,
            |summary| composer.compose_presence(summary, &details),
            &renderer,
        )?;

        let skipped: HashSet<&str> = outcome
            .failures
            .iter()
            .map(|f| f.participant.as_str())
            .collect();
        outcome.total_hours = summaries
            .iter()
            .filter(|s| !skipped.contains(s.name.as_str()))
            .map(|s| s.total_hours)
            .sum();

        Ok(outcome)
    }

    async fn load(&self, outcome: BatchOutcome) -> Result<RunReport> {
        let output_path = self.config.archive_path(DEFAULT_PRESENCE_ARCHIVE);
        write_archive(&self.storage, outcome, output_path).await
    }
}
