use thiserror::Error;

use crate::config::ConfigError;
use crate::export::ExportError;
use crate::gateway::GatewayError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown sort key `{0}`")]
    UnknownSortKey(String),
    #[error("threshold {0}% is outside the reviewable range 0..=20")]
    ThresholdOutOfRange(String),
    #[error("variance row `{0}` is not loaded")]
    UnknownRow(String),
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl ApplicationError {
    /// Stable machine-readable class used in CLI outcome payloads.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "invalid_input",
            Self::Config(_) => "config_validation",
            Self::Gateway(_) => "gateway",
            Self::Export(_) => "export",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Domain(_) => 1,
            Self::Config(_) => 2,
            Self::Gateway(_) => 3,
            Self::Export(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ConfigError;
    use crate::errors::{ApplicationError, DomainError};
    use crate::gateway::GatewayError;

    #[test]
    fn domain_error_maps_to_invalid_input_class() {
        let error = ApplicationError::from(DomainError::UnknownSortKey("colour".to_owned()));

        assert_eq!(error.error_class(), "invalid_input");
        assert_eq!(error.exit_code(), 1);
        assert_eq!(error.to_string(), "unknown sort key `colour`");
    }

    #[test]
    fn config_error_maps_to_config_validation() {
        let error = ApplicationError::from(ConfigError::Validation("bad port".to_owned()));

        assert_eq!(error.error_class(), "config_validation");
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn gateway_error_keeps_status_in_message() {
        let error = ApplicationError::from(GatewayError::Status {
            url: "http://localhost:4000/api/variances".to_owned(),
            status: 503,
        });

        assert_eq!(error.error_class(), "gateway");
        assert!(error.to_string().contains("503"));
    }
}
