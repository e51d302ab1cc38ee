use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertificateError {
    #[error("Unresolvable schema: {message}")]
    UnresolvableSchema { message: String },

    #[error("Missing identity column: no participant names found in column '{column}'")]
    MissingIdentityColumn { column: String },

    #[error("Unreadable table '{source_name}': {message}")]
    UnreadableTable {
        source_name: String,
        message: String,
    },

    #[error("Column '{column}' for role '{role}' not found in table")]
    ColumnNotFound { role: String, column: String },

    #[error("Failed to render certificate for '{participant}': {message}")]
    RenderFailure {
        participant: String,
        message: String,
    },

    #[error("Invalid background image: {message}")]
    InvalidBackground { message: String },

    #[error("Archive operation failed: {0}")]
    ArchiveError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },
}

/// Pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Schema,
    Render,
    Archive,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CertificateError {
    pub fn unreadable(source_name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::UnreadableTable {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    pub fn render(participant: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::RenderFailure {
            participant: participant.into(),
            message: message.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnreadableTable { .. } | Self::CsvError(_) => ErrorCategory::Input,
            Self::UnresolvableSchema { .. }
            | Self::MissingIdentityColumn { .. }
            | Self::ColumnNotFound { .. } => ErrorCategory::Schema,
            Self::RenderFailure { .. } | Self::InvalidBackground { .. } => ErrorCategory::Render,
            Self::ArchiveError(_) => ErrorCategory::Archive,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input | ErrorCategory::Schema => {
                ErrorSeverity::High
            }
            ErrorCategory::Render => ErrorSeverity::Medium,
            ErrorCategory::Archive | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::UnresolvableSchema { .. } => {
                "Make sure the first row of the sheet holds the column headers".to_string()
            }
            Self::MissingIdentityColumn { column } => format!(
                "Column '{}' has no names; pass --name-column with the header that holds participant names",
                column
            ),
            Self::UnreadableTable { .. } | Self::CsvError(_) => {
                "Check that the file is a valid .xlsx, .xls, .ods or .csv spreadsheet".to_string()
            }
            Self::ColumnNotFound { column, .. } => format!(
                "Header '{}' does not exist; run `certificados preview` to list the available columns",
                column
            ),
            Self::RenderFailure { .. } => {
                "Retry with on_render_failure = \"skip\" to produce the remaining certificates"
                    .to_string()
            }
            Self::InvalidBackground { .. } => {
                "Use a PNG or JPEG image as background".to_string()
            }
            Self::ArchiveError(_) => "Check free memory and retry".to_string(),
            Self::IoError(_) => "Check file paths and permissions".to_string(),
            Self::SerializationError(_) => "Report this error with the input file".to_string(),
            Self::ConfigValidationError { field, .. }
            | Self::InvalidConfigValueError { field, .. }
            | Self::MissingConfigError { field } => {
                format!("Fix the '{}' setting in the config file or CLI flags", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        let stage = match self.category() {
            ErrorCategory::Input => "reading the spreadsheet",
            ErrorCategory::Schema => "detecting columns",
            ErrorCategory::Render => "rendering certificates",
            ErrorCategory::Archive => "building the archive",
            ErrorCategory::Configuration => "loading the configuration",
            ErrorCategory::System => "accessing the system",
        };
        format!("Failed while {}: {}", stage, self)
    }
}

pub type Result<T> = std::result::Result<T, CertificateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_failure_names_participant() {
        let err = CertificateError::render("Ana Silva", "font missing");
        assert_eq!(err.category(), ErrorCategory::Render);
        assert!(err.to_string().contains("Ana Silva"));
        assert!(err.user_friendly_message().starts_with("Failed while rendering"));
    }

    #[test]
    fn test_schema_errors_are_high_severity() {
        let err = CertificateError::ColumnNotFound {
            role: "name".to_string(),
            column: "Nome".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Schema);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("Nome"));
    }
}
