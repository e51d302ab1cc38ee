use crate::adapters::PdfLayout;
use crate::core::aggregator::DEFAULT_HOURS_PER_RECORD;
use crate::core::column_resolver::{ColumnOverrides, KeywordSets, PositionalFallback};
use crate::core::composer::{
    default_placeholders, BodyStyle, DEFAULT_ACTIVITY_THRESHOLD, DEFAULT_LOCATION,
    DEFAULT_ORGANIZATION, DEFAULT_SALUTATION, DEFAULT_TITLE, DEFAULT_WRAP_WIDTH,
};
use crate::core::packager::RenderFailurePolicy;
use crate::utils::error::{CertificateError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PRESENCE_ARCHIVE: &str = "certificados_presenca.zip";
pub const DEFAULT_CUSTOM_ARCHIVE: &str = "certificados_personalizados.zip";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateConfig {
    pub input: InputConfig,
    pub columns: ColumnsConfig,
    pub presence: PresenceConfig,
    pub custom: CustomConfig,
    pub render: RenderConfig,
    pub output: OutputConfig,
    pub batch: BatchConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: Option<String>,
    pub sheet: Option<String>,
    /// Single character; only used for csv/tsv input.
    pub delimiter: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    #[serde(flatten)]
    pub overrides: ColumnOverrides,
    pub keywords: KeywordSets,
    pub fallback: PositionalFallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    pub hours_per_record: f64,
    pub organization: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    /// Free text; today's date in long form when absent.
    pub issue_date: Option<String>,
    pub body_style: BodyStyle,
    pub activity_threshold: usize,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            hours_per_record: DEFAULT_HOURS_PER_RECORD,
            organization: DEFAULT_ORGANIZATION.to_string(),
            start_date: String::new(),
            end_date: String::new(),
            location: DEFAULT_LOCATION.to_string(),
            issue_date: None,
            body_style: BodyStyle::default(),
            activity_threshold: DEFAULT_ACTIVITY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomConfig {
    pub template: Option<String>,
    pub name_column: Option<String>,
    pub text_column: Option<String>,
    pub footer: Option<String>,
    pub placeholders: Vec<String>,
}

impl Default for CustomConfig {
    fn default() -> Self {
        Self {
            template: None,
            name_column: None,
            text_column: None,
            footer: None,
            placeholders: default_placeholders(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub background: Option<String>,
    pub wrap_width: usize,
    pub title: String,
    pub salutation: String,
    pub layout: PdfLayout,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: None,
            wrap_width: DEFAULT_WRAP_WIDTH,
            title: DEFAULT_TITLE.to_string(),
            salutation: DEFAULT_SALUTATION.to_string(),
            layout: PdfLayout::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub archive_name: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./output".to_string(),
            archive_name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub on_render_failure: RenderFailurePolicy,
    pub workers: usize,
    pub normalize_names: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            on_render_failure: RenderFailurePolicy::default(),
            workers: 1,
            normalize_names: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl CertificateConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CertificateError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            CertificateError::ConfigValidationError {
                field: "environment".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn input_path(&self) -> Result<&str> {
        self.input
            .path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| CertificateError::MissingConfigError {
                field: "input.path".to_string(),
            })
    }

    pub fn delimiter(&self) -> Result<Option<u8>> {
        match self.input.delimiter.as_deref() {
            None | Some("") => Ok(None),
            Some("\\t") | Some("\t") => Ok(Some(b'\t')),
            Some(d) if d.len() == 1 => Ok(Some(d.as_bytes()[0])),
            Some(d) => Err(CertificateError::InvalidConfigValueError {
                field: "input.delimiter".to_string(),
                value: d.to_string(),
                reason: "must be a single ASCII character".to_string(),
            }),
        }
    }

    pub fn archive_path(&self, default_name: &str) -> String {
        let name = self
            .output
            .archive_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(default_name);
        Path::new(&self.output.path)
            .join(name)
            .to_string_lossy()
            .to_string()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for CertificateConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.input.path {
            validation::validate_path("input.path", path)?;
            let allowed = crate::adapters::table_source::SUPPORTED_EXTENSIONS;
            validation::validate_file_extension("input.path", path, &allowed)?;
        }
        self.delimiter()?;

        if let Some(background) = &self.render.background {
            validation::validate_path("render.background", background)?;
        }
        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_non_empty_string("render.title", &self.render.title)?;
        validation::validate_positive_number("render.wrap_width", self.render.wrap_width, 1)?;
        validation::validate_positive_number("batch.workers", self.batch.workers, 1)?;
        validation::validate_range(
            "presence.hours_per_record",
            self.presence.hours_per_record,
            0.0,
            1000.0,
        )?;

        if let Some(name) = &self.output.archive_name {
            validation::validate_file_extension("output.archive_name", name, &["zip"])?;
        }

        if self.columns.keywords.name.is_empty() {
            return Err(CertificateError::ConfigValidationError {
                field: "columns.keywords.name".to_string(),
                message: "at least one name keyword is required".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CertificateConfig::from_toml_str("").unwrap();
        assert_eq!(config.presence.hours_per_record, 2.0);
        assert_eq!(config.render.title, "CERTIFICADO");
        assert_eq!(config.batch.workers, 1);
        assert_eq!(config.batch.on_render_failure, RenderFailurePolicy::Abort);
        assert_eq!(config.custom.placeholders, vec!["{name}", "{nome}"]);
        assert!(!config.monitoring_enabled());
        assert!(config.input_path().is_err());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[input]
path = "presenca.xlsx"
sheet = "Respostas"

[columns]
name = "Nome do participante"

[columns.keywords]
activity = ["oficina"]

[columns.fallback]
name = 1
email = 7

[presence]
hours_per_record = 3
organization = "Instituto Exemplo"
start_date = "2026-03-01"
end_date = "2026-06-30"
body_style = "detailed"

[render]
wrap_width = 60

[render.layout]
signature_line = false

[output]
path = "./lote"
archive_name = "turma.zip"

[batch]
on_render_failure = "skip"
workers = 4
normalize_names = true

[monitoring]
enabled = true
"#;
        let config = CertificateConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input_path().unwrap(), "presenca.xlsx");
        assert_eq!(config.input.sheet.as_deref(), Some("Respostas"));
        assert_eq!(
            config.columns.overrides.name.as_deref(),
            Some("Nome do participante")
        );
        assert_eq!(config.columns.keywords.activity, vec!["oficina"]);
        // untouched keyword sets keep their defaults
        assert!(config.columns.keywords.email.contains(&"e-mail".to_string()));
        assert_eq!(config.columns.fallback.name, 1);
        assert_eq!(config.columns.fallback.email, Some(7));
        assert_eq!(config.presence.hours_per_record, 3.0);
        assert_eq!(config.presence.body_style, BodyStyle::Detailed);
        assert_eq!(config.render.wrap_width, 60);
        assert!(!config.render.layout.signature_line);
        assert_eq!(config.render.layout.title_size, 36.0);
        assert_eq!(config.batch.on_render_failure, RenderFailurePolicy::Skip);
        assert!(config.batch.normalize_names);
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());

        let archive = config.archive_path(DEFAULT_PRESENCE_ARCHIVE);
        assert!(archive.ends_with("turma.zip"));
        assert!(archive.starts_with("./lote"));
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("CERTIFICADOS_TEST_ORG", "Associação Teste");
        let config = CertificateConfig::from_toml_str(
            r#"
[presence]
organization = "${CERTIFICADOS_TEST_ORG}"
location = "${CERTIFICADOS_UNSET_VAR}"
"#,
        )
        .unwrap();
        assert_eq!(config.presence.organization, "Associação Teste");
        assert_eq!(config.presence.location, "${CERTIFICADOS_UNSET_VAR}");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = CertificateConfig::default();
        config.batch.workers = 0;
        assert!(config.validate().is_err());

        let mut config = CertificateConfig::default();
        config.input.path = Some("lista.pdf".to_string());
        assert!(config.validate().is_err());

        let mut config = CertificateConfig::default();
        config.input.delimiter = Some(";;".to_string());
        assert!(matches!(
            config.validate(),
            Err(CertificateError::InvalidConfigValueError { .. })
        ));

        let config = CertificateConfig::from_toml_str("[presence]\nhours_per_record = nan").unwrap();
        assert!(config.presence.hours_per_record.is_nan());
        assert!(config.validate().is_err());

        let mut config = CertificateConfig::default();
        config.input.delimiter = Some(";".to_string());
        assert_eq!(config.delimiter().unwrap(), Some(b';'));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = CertificateConfig::from_toml_str("[batch]\nworkers = \"many\"");
        assert!(matches!(
            result,
            Err(CertificateError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[output]\npath = \"./saida\"").unwrap();
        let config = CertificateConfig::from_file(file.path()).unwrap();
        assert_eq!(config.output.path, "./saida");
        assert!(config.archive_path(DEFAULT_CUSTOM_ARCHIVE).ends_with(DEFAULT_CUSTOM_ARCHIVE));
    }
}
