use crate::domain::model::{
    Archive, BatchOutcome, CertificateDocument, CertificateText, RenderFailureReport,
    CERTIFICATE_SUFFIX,
};
use crate::domain::ports::DocumentRenderer;
use crate::utils::error::{CertificateError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// What to do when one participant's certificate fails to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderFailurePolicy {
    /// Fail the batch with the participant's name; no archive is produced.
    #[default]
    Abort,
    /// Leave the participant out and report it in the outcome.
    Skip,
}

/// `Ana Maria Silva` -> `Ana_Maria_Silva_certificado.pdf`
pub fn file_name_for(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("{}{}", stem, CERTIFICATE_SUFFIX)
}

#[derive(Debug, Clone)]
pub struct BatchPackager {
    policy: RenderFailurePolicy,
    workers: usize,
}

impl Default for BatchPackager {
    fn default() -> Self {
        Self::new(RenderFailurePolicy::Abort, 1)
    }
}

impl BatchPackager {
    pub fn new(policy: RenderFailurePolicy, workers: usize) -> Self {
        Self {
            policy,
            workers: workers.max(1),
        }
    }

    /// Composes and renders one certificate per item, in item order, and
    /// collects them into an in-memory archive.
    ///
    /// With more than one worker the rendering runs on a rayon pool; results
    /// are still consumed in input order, so the archive is the same as a
    /// sequential run.
    pub fn build<T, F, R>(&self, items: &[T], compose: F, renderer: &R) -> Result<BatchOutcome>
    where
        T: Sync,
        F: Fn(&T) -> CertificateText + Sync,
        R: DocumentRenderer + ?Sized,
    {
        let render_one = |item: &T| {
            let text = compose(item);
            let rendered = renderer.render(&text);
            (text.name, rendered)
        };

        if self.workers > 1 && items.len() > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .build()
                .map_err(|e| CertificateError::ConfigValidationError {
                    field: "batch.workers".to_string(),
                    message: format!("cannot start render pool: {}", e),
                })?;
            tracing::debug!("Rendering {} certificates on {} workers", items.len(), self.workers);
            let rendered: Vec<_> = pool.install(|| items.par_iter().map(render_one).collect());
            self.collect(items.len(), rendered.into_iter())
        } else {
            self.collect(items.len(), items.iter().map(render_one))
        }
    }

    fn collect(
        &self,
        participants: usize,
        rendered: impl Iterator<Item = (String, Result<Vec<u8>>)>,
    ) -> Result<BatchOutcome> {
        let mut archive = Archive::new();
        let mut failures = Vec::new();

        for (name, result) in rendered {
            match result {
                Ok(bytes) => {
                    let stored = archive.insert(CertificateDocument {
                        file_name: file_name_for(&name),
                        bytes,
                    });
                    tracing::debug!("📄 Added {}", stored);
                }
                Err(e) => match self.policy {
                    RenderFailurePolicy::Abort => {
                        tracing::error!("❌ Rendering failed for '{}', aborting batch", name);
                        return Err(match e {
                            CertificateError::RenderFailure { .. } => e,
                            other => CertificateError::render(name, other),
                        });
                    }
                    RenderFailurePolicy::Skip => {
                        tracing::warn!("⚠️ Skipping '{}': {}", name, e);
                        failures.push(RenderFailureReport {
                            participant: name,
                            message: e.to_string(),
                        });
                    }
                },
            }
        }

        Ok(BatchOutcome {
            archive,
            failures,
            participants,
            total_hours: 0.0,
        })
    }
}
