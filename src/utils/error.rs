use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Invalid status transition for {entity}: {from} -> {to}")]
    InvalidTransition {
        entity: String,
        from: String,
        to: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    CsvError(#[from] csv::Error),
}

impl ClinicError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    /// Free-text notice shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::HttpError(e) if e.is_timeout() => {
                "El servidor tardó demasiado en responder. Inténtalo de nuevo.".to_string()
            }
            Self::HttpError(e) if e.is_connect() => {
                "No se pudo conectar con el servidor. Revisa tu conexión.".to_string()
            }
            Self::HttpError(_) => "Error de comunicación con el servidor.".to_string(),
            Self::ApiError { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::ApiError { status, .. } => format!("El servidor respondió con error {}.", status),
            Self::NotFound { resource, .. } => format!("No se encontró {}.", resource),
            Self::Unauthorized { .. } => {
                "Tu sesión expiró o no tienes permiso. Inicia sesión nuevamente.".to_string()
            }
            Self::InvalidTransition { from, to, .. } => {
                format!("No se puede pasar de {} a {}.", from, to)
            }
            Self::ValidationError { message } => message.clone(),
            Self::ConfigError { message } => format!("Configuración inválida: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuración inválida en {}: {}", field, reason)
            }
            Self::MissingConfigError { field } => format!("Falta la configuración {}.", field),
            Self::IoError(e) => format!("Error de archivo: {}", e),
            Self::SerializationError(_) => "Respuesta del servidor no reconocida.".to_string(),
            Self::CsvError(e) => format!("No se pudo generar el CSV: {}", e),
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigError { .. }
                | Self::InvalidConfigValueError { .. }
                | Self::MissingConfigError { .. }
                | Self::ValidationError { .. }
        )
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> i32 {
        if self.is_config_error() {
            2
        } else {
            1
        }
    }
}

pub type Result<T> = std::result::Result<T, ClinicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_prefers_backend_message() {
        let err = ClinicError::ApiError {
            status: 409,
            message: "La reserva ya fue cancelada".to_string(),
        };
        assert_eq!(err.user_message(), "La reserva ya fue cancelada");

        let blank = ClinicError::ApiError {
            status: 500,
            message: "  ".to_string(),
        };
        assert_eq!(blank.user_message(), "El servidor respondió con error 500.");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ClinicError::validation("x").exit_code(), 2);
        assert_eq!(
            ClinicError::MissingConfigError {
                field: "api.base_url".to_string()
            }
            .exit_code(),
            2
        );
        assert_eq!(
            ClinicError::Unauthorized {
                message: "expired".to_string()
            }
            .exit_code(),
            1
        );
    }
}
