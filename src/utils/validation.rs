use crate::utils::error::{CertificateError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CertificateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CertificateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(CertificateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// Checks the extension of a single file name, case-insensitively.
pub fn validate_file_extension(
    field_name: &str,
    file: &str,
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
    {
        Some(extension) if allowed_set.contains(extension.as_str()) => Ok(()),
        Some(extension) => Err(CertificateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(CertificateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CertificateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN fails both comparisons
    if !(value >= min && value <= max) {
        return Err(CertificateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("batch.workers", 4, 1).is_ok());
        assert!(validate_positive_number("batch.workers", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        let allowed = ["xlsx", "csv"];
        assert!(validate_file_extension("input.path", "presenca.xlsx", &allowed).is_ok());
        assert!(validate_file_extension("input.path", "PRESENCA.XLSX", &allowed).is_ok());
        assert!(validate_file_extension("input.path", "presenca.txt", &allowed).is_err());
        assert!(validate_file_extension("input.path", "presenca", &allowed).is_err());
    }

    #[test]
    fn test_validate_range_and_strings() {
        assert!(validate_range("render.wrap_width", 80, 10, 400).is_ok());
        assert!(validate_range("render.wrap_width", 5, 10, 400).is_err());
        assert!(validate_non_empty_string("presence.organization", "  ").is_err());
    }

    #[test]
    fn test_validate_range_rejects_nan() {
        assert!(validate_range("presence.hours_per_record", f64::NAN, 0.0, 1000.0).is_err());
        assert!(validate_range("presence.hours_per_record", f64::INFINITY, 0.0, 1000.0).is_err());
        assert!(validate_range("presence.hours_per_record", 2.5, 0.0, 1000.0).is_ok());
    }
}
