use crate::config::toml_config::CertificateConfig;
use crate::core::composer::BodyStyle;
use crate::core::packager::RenderFailurePolicy;
use crate::core::preview::DEFAULT_PREVIEW_ROWS;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "certificados")]
#[command(about = "Turns an attendance spreadsheet into a zip of certificate PDFs")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log CPU and memory usage per phase
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// One certificate per participant with the hours they attended
    Presence(PresenceArgs),
    /// One certificate per row from a text template
    Custom(CustomArgs),
    /// Print the headers and first rows of a spreadsheet as JSON
    Preview(PreviewArgs),
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Spreadsheet to read (xlsx, xls, ods, csv, ...)
    pub input: Option<String>,

    #[arg(long)]
    pub sheet: Option<String>,

    /// Field delimiter for csv/tsv input
    #[arg(long)]
    pub delimiter: Option<String>,
}

impl InputArgs {
    fn apply(&self, config: &mut CertificateConfig) {
        if let Some(input) = &self.input {
            config.input.path = Some(input.clone());
        }
        if let Some(sheet) = &self.sheet {
            config.input.sheet = Some(sheet.clone());
        }
        if let Some(delimiter) = &self.delimiter {
            config.input.delimiter = Some(delimiter.clone());
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Directory the archive is written to
    #[arg(short, long)]
    pub output: Option<String>,

    #[arg(long)]
    pub archive_name: Option<String>,

    /// Image stretched behind every page
    #[arg(long)]
    pub background: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub workers: Option<usize>,

    /// Leave out participants whose certificate fails instead of aborting
    #[arg(long)]
    pub skip_failures: bool,
}

impl BatchArgs {
    fn apply(&self, config: &mut CertificateConfig) {
        self.input.apply(config);
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if let Some(name) = &self.archive_name {
            config.output.archive_name = Some(name.clone());
        }
        if let Some(background) = &self.background {
            config.render.background = Some(background.clone());
        }
        if let Some(title) = &self.title {
            config.render.title = title.clone();
        }
        if let Some(workers) = self.workers {
            config.batch.workers = workers;
        }
        if self.skip_failures {
            config.batch.on_render_failure = RenderFailurePolicy::Skip;
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct PresenceArgs {
    #[command(flatten)]
    pub batch: BatchArgs,

    #[arg(long)]
    pub hours_per_record: Option<f64>,

    #[arg(long)]
    pub organization: Option<String>,

    /// First day of the period, e.g. 2026-03-01
    #[arg(long)]
    pub start_date: Option<String>,

    #[arg(long)]
    pub end_date: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub issue_date: Option<String>,

    /// List the activities in the certificate body
    #[arg(long)]
    pub detailed: bool,

    #[arg(long)]
    pub name_column: Option<String>,

    #[arg(long)]
    pub email_column: Option<String>,

    #[arg(long)]
    pub activity_column: Option<String>,

    /// Trim names before grouping rows
    #[arg(long)]
    pub normalize_names: bool,
}

impl PresenceArgs {
    pub fn apply(&self, config: &mut CertificateConfig) {
        self.batch.apply(config);
        let presence = &mut config.presence;
        if let Some(hours) = self.hours_per_record {
            presence.hours_per_record = hours;
        }
        if let Some(organization) = &self.organization {
            presence.organization = organization.clone();
        }
        if let Some(start) = &self.start_date {
            presence.start_date = start.clone();
        }
        if let Some(end) = &self.end_date {
            presence.end_date = end.clone();
        }
        if let Some(location) = &self.location {
            presence.location = location.clone();
        }
        if let Some(issue_date) = &self.issue_date {
            presence.issue_date = Some(issue_date.clone());
        }
        if self.detailed {
            presence.body_style = BodyStyle::Detailed;
        }

        let overrides = &mut config.columns.overrides;
        if let Some(name) = &self.name_column {
            overrides.name = Some(name.clone());
        }
        if let Some(email) = &self.email_column {
            overrides.email = Some(email.clone());
        }
        if let Some(activity) = &self.activity_column {
            overrides.activity = Some(activity.clone());
        }
        if self.normalize_names {
            config.batch.normalize_names = true;
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct CustomArgs {
    #[command(flatten)]
    pub batch: BatchArgs,

    /// Body text; `{name}` and `{nome}` are replaced by each row's name
    #[arg(long)]
    pub template: Option<String>,

    /// Column with the name; the first column when absent
    #[arg(long)]
    pub name_column: Option<String>,

    /// Column whose non-empty cells replace the template for that row
    #[arg(long)]
    pub text_column: Option<String>,

    #[arg(long)]
    pub footer: Option<String>,
}

impl CustomArgs {
    pub fn apply(&self, config: &mut CertificateConfig) {
        self.batch.apply(config);
        let custom = &mut config.custom;
        if let Some(template) = &self.template {
            custom.template = Some(template.clone());
        }
        if let Some(name) = &self.name_column {
            custom.name_column = Some(name.clone());
        }
        if let Some(text) = &self.text_column {
            custom.text_column = Some(text.clone());
        }
        if let Some(footer) = &self.footer {
            custom.footer = Some(footer.clone());
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Number of rows to show
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub rows: usize,
}

impl PreviewArgs {
    pub fn apply(&self, config: &mut CertificateConfig) {
        self.input.apply(config);
    }
}

impl Cli {
    /// Applies the subcommand's flags on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut CertificateConfig) {
        match &self.command {
            Command::Presence(args) => args.apply(config),
            Command::Custom(args) => args.apply(config),
            Command::Preview(args) => args.apply(config),
        }
        if self.monitor {
            config.monitoring = Some(crate::config::toml_config::MonitoringConfig { enabled: true });
        }
    }
}
