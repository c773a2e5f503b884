use thiserror::Error;

use crate::config::{ServerSettings, Settings, StatusSettings};
use crate::domain::StatusPattern;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_server(&settings.server) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_status(&settings.status) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_mock(settings) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_status(status: &StatusSettings) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = [("status.default", &status.default), ("status.error", &status.error)]
            .into_iter()
            .filter_map(|(field, pattern)| {
                pattern.parse::<StatusPattern>().err().map(|e| ValidationError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("{} (expected three digits or X, e.g. 2XX)", e),
                })
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_mock(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if settings.folder.trim().is_empty() {
            errors.push(ValidationError::MissingField("folder".to_string()));
        }

        if settings.content_type.trim().is_empty() {
            errors.push(ValidationError::MissingField("content_type".to_string()));
        }

        if !settings.local_url.is_empty() && !settings.local_url.starts_with('/') {
            errors.push(ValidationError::InvalidValue {
                field: "local_url".to_string(),
                reason: "Mount prefix must start with '/'".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(ConfigValidator::validate(&Settings::default()).is_ok());
    }

    #[test]
    fn test_invalid_status_patterns_are_reported_together() {
        let mut settings = Settings::default();
        settings.status.default = "2XXX".to_string();
        settings.status.error = "oops".to_string();

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].to_string().contains("status.default"));
        assert!(errors[1].to_string().contains("status.error"));
    }

    #[test]
    fn test_server_and_mount_errors() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        settings.server.host = String::new();
        settings.local_url = "mock".to_string();

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_lowercase_wildcards_are_accepted() {
        let mut settings = Settings::default();
        settings.status.default = "2xx".to_string();
        assert!(ConfigValidator::validate(&settings).is_ok());
    }
}
