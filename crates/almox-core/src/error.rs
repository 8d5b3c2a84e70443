use almox_api::ApiError;
use thiserror::Error;

use crate::notify::ToastLevel;

/// All the ways an operation in the client can go wrong
#[derive(Error, Debug)]
pub enum Error {
    /// Server answered with an error, or never answered at all
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Rejected locally before any request went out
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// How loudly this should be reported to the user
    pub fn toast_level(&self) -> ToastLevel {
        match self {
            Error::Validation(err) => err.toast_level(),
            _ => ToastLevel::Error,
        }
    }
}

/// Pre-flight checks on a transaction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Selecione um item primeiro")]
    NoItemSelected,

    #[error("Digite seu nome")]
    MissingName,

    #[error("Quantidade deve ser maior que zero")]
    InvalidQuantity,

    #[error("Quantidade indisponível em estoque! Disponível: {available}, solicitado: {requested}")]
    InsufficientStock { available: i64, requested: u32 },
}

impl ValidationError {
    pub fn toast_level(&self) -> ToastLevel {
        match self {
            ValidationError::InsufficientStock { .. } => ToastLevel::Error,
            _ => ToastLevel::Warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_levels() {
        assert_eq!(Error::from(ValidationError::MissingName).toast_level(), ToastLevel::Warning);
        assert_eq!(
            Error::from(ValidationError::InsufficientStock { available: 3, requested: 5 }).toast_level(),
            ToastLevel::Error
        );
    }

    #[test]
    fn test_api_error_keeps_server_message() {
        let err = Error::from(ApiError::Server {
            status: 404,
            message: "Item não encontrado".into(),
        });
        assert_eq!(err.to_string(), "Item não encontrado");
        assert!(!err.is_validation());
        assert_eq!(err.toast_level(), ToastLevel::Error);
    }
}
