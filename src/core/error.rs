//! Typed error handling for the order engine
//!
//! Errors are grouped by how the user interface has to react to them:
//!
//! - [`ValidationError`]: user-correctable, blocks a save, names the field
//! - [`StorageError`]: the document store failed; the operation can be retried
//! - [`NotFoundError`]: a referenced order/product/client does not exist
//! - [`ConfigError`]: configuration could not be loaded or is inconsistent
//!
//! Numeric and date parse failures never reach this type. They are absorbed
//! by the pricing and reconciliation layers (see [`crate::core::locale::ParseError`]).
//!
//! # Example
//!
//! ```rust,ignore
//! match adapter.save(&mut state, false).await {
//!     Ok(id) => notifier.notify(NoticeLevel::Success, &format!("Pedido {} salvo", id)),
//!     Err(err) => {
//!         let notice = err.to_notice();
//!         notifier.notify(notice.level, &notice.message);
//!     }
//! }
//! ```

use crate::core::collaborators::NoticeLevel;
use serde::Serialize;
use std::fmt;

/// The main error type of the order engine
#[derive(Debug)]
pub enum OrderError {
    /// User-correctable input problems
    Validation(ValidationError),

    /// Document store failures
    Storage(StorageError),

    /// Referenced record is missing
    NotFound(NotFoundError),

    /// Configuration errors
    Config(ConfigError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderError::Validation(e) => write!(f, "{}", e),
            OrderError::Storage(e) => write!(f, "{}", e),
            OrderError::NotFound(e) => write!(f, "{}", e),
            OrderError::Config(e) => write!(f, "{}", e),
            OrderError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for OrderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrderError::Validation(e) => Some(e),
            OrderError::Storage(e) => Some(e),
            OrderError::NotFound(e) => Some(e),
            OrderError::Config(e) => Some(e),
            OrderError::Internal(_) => None,
        }
    }
}

/// User-facing rendition of an error, handed to the notification provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorNotice {
    /// Severity of the toast
    pub level: NoticeLevel,
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Whether retrying the same action may succeed
    pub retryable: bool,
}

impl OrderError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            OrderError::Validation(e) => e.error_code(),
            OrderError::Storage(_) => "STORAGE_ERROR",
            OrderError::NotFound(_) => "NOT_FOUND",
            OrderError::Config(_) => "CONFIG_ERROR",
            OrderError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the operation may succeed if the user simply tries again
    pub fn is_retryable(&self) -> bool {
        matches!(self, OrderError::Storage(_))
    }

    /// Convert to a notification the UI layer can display
    ///
    /// Storage failures get a generic "try again" message while missing
    /// records are reported as such, so the two are never confused.
    pub fn to_notice(&self) -> ErrorNotice {
        let (level, message) = match self {
            OrderError::Validation(e) => (NoticeLevel::Warning, e.user_message()),
            OrderError::Storage(_) => (
                NoticeLevel::Error,
                "Não foi possível salvar os dados. Verifique a conexão e tente novamente."
                    .to_string(),
            ),
            OrderError::NotFound(e) => (
                NoticeLevel::Error,
                format!("{} não encontrado(a): {}", e.entity_label(), e.id),
            ),
            OrderError::Config(e) => (NoticeLevel::Error, e.to_string()),
            OrderError::Internal(_) => (
                NoticeLevel::Error,
                "Erro inesperado. Recarregue a página.".to_string(),
            ),
        };

        ErrorNotice {
            level,
            code: self.error_code().to_string(),
            message,
            retryable: self.is_retryable(),
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors that block a save until the user fixes the named field
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// No client selected for the order
    MissingClient,

    /// The order has no line items
    MissingItems,

    /// An edit was requested for an order that was never persisted
    MissingId,

    /// The status is not part of the configured status list
    UnknownStatus { status: String },

    /// Generic single field problem
    FieldError { field: String, message: String },
}

impl ValidationError {
    /// Name of the offending form field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingClient => "client",
            ValidationError::MissingItems => "items",
            ValidationError::MissingId => "id",
            ValidationError::UnknownStatus { .. } => "status",
            ValidationError::FieldError { field, .. } => field,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::MissingClient => "VALIDATION_NO_CLIENT",
            ValidationError::MissingItems => "VALIDATION_NO_ITEMS",
            ValidationError::MissingId => "VALIDATION_NO_ID",
            ValidationError::UnknownStatus { .. } => "VALIDATION_UNKNOWN_STATUS",
            ValidationError::FieldError { .. } => "VALIDATION_ERROR",
        }
    }

    fn user_message(&self) -> String {
        match self {
            ValidationError::MissingClient => "Selecione um cliente".to_string(),
            ValidationError::MissingItems => "Adicione pelo menos um item ao pedido".to_string(),
            ValidationError::MissingId => "Pedido ainda não foi salvo".to_string(),
            ValidationError::UnknownStatus { status } => format!("Status inválido: {}", status),
            ValidationError::FieldError { field, message } => format!("{}: {}", field, message),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingClient => write!(f, "Validation error: no client"),
            ValidationError::MissingItems => write!(f, "Validation error: no items"),
            ValidationError::MissingId => write!(f, "Validation error: no order id"),
            ValidationError::UnknownStatus { status } => {
                write!(f, "Validation error: unknown status '{}'", status)
            }
            ValidationError::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for OrderError {
    fn from(err: ValidationError) -> Self {
        OrderError::Validation(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors raised by document store backends
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Backend cannot be reached
    Unavailable { backend: String },

    /// Query or write was rejected
    QueryError { backend: String, message: String },

    /// A document could not be (de)serialized
    Serialization { message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable { backend } => {
                write!(f, "Storage backend '{}' is unavailable", backend)
            }
            StorageError::QueryError { backend, message } => {
                write!(f, "{} query error: {}", backend, message)
            }
            StorageError::Serialization { message } => {
                write!(f, "Document serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for OrderError {
    fn from(err: StorageError) -> Self {
        OrderError::Storage(err)
    }
}

// =============================================================================
// Not Found Errors
// =============================================================================

/// A referenced document does not exist
#[derive(Debug, Clone, PartialEq)]
pub struct NotFoundError {
    /// Collection the lookup ran against (e.g. "orders")
    pub collection: String,
    /// Document id
    pub id: String,
}

impl NotFoundError {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    fn entity_label(&self) -> &str {
        match self.collection.as_str() {
            "orders" => "Pedido",
            "clients" => "Cliente",
            "products" => "Produto",
            _ => "Registro",
        }
    }
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with id '{}' not found", self.collection, self.id)
    }
}

impl std::error::Error for NotFoundError {}

impl From<NotFoundError> for OrderError {
    fn from(err: NotFoundError) -> Self {
        OrderError::NotFound(err)
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse a configuration source
    ParseError { message: String },

    /// A value is out of its accepted range
    InvalidValue { key: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { message } => {
                write!(f, "Failed to parse config: {}", message)
            }
            ConfigError::InvalidValue { key, message } => {
                write!(f, "Invalid config value for '{}': {}", key, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for OrderError {
    fn from(err: ConfigError) -> Self {
        OrderError::Config(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for OrderError {
    fn from(err: serde_json::Error) -> Self {
        OrderError::Storage(StorageError::Serialization {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for OrderError {
    fn from(err: serde_yaml::Error) -> Self {
        OrderError::Config(ConfigError::ParseError {
            message: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for OrderError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<OrderError>() {
            Ok(order_err) => return order_err,
            Err(other) => other,
        };
        match err.downcast::<ConfigError>() {
            Ok(config_err) => OrderError::Config(config_err),
            Err(other) => OrderError::Internal(other.to_string()),
        }
    }
}

/// A specialized Result type for order engine operations
pub type OrderResult<T> = Result<T, OrderError>;
