use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Why a simulation entry was refused.
///
/// Every variant is recoverable: the agent corrects the form and tries again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent, blank or not a number.
    MissingRequiredField(&'static str),
    /// The coefficient is exactly zero.
    ZeroCoefficient,
    /// The operation settles a prior loan but the balance or current bank is missing.
    MissingBalanceOrBank,
    /// The operation type is not one of the known categories.
    UnknownOperationType(String),
    /// A numeric field parsed but is outside its allowed range.
    OutOfRange(&'static str),
}

impl ValidationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingRequiredField(_) => "missing_required_field",
            ValidationError::ZeroCoefficient => "zero_coefficient",
            ValidationError::MissingBalanceOrBank => "missing_balance_or_bank",
            ValidationError::UnknownOperationType(_) => "unknown_operation_type",
            ValidationError::OutOfRange(_) => "out_of_range",
        }
    }

    /// Form field the agent has to fix, if the error points at a single one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingRequiredField(field) | ValidationError::OutOfRange(field) => {
                Some(*field)
            }
            ValidationError::ZeroCoefficient => Some("coefficient"),
            ValidationError::UnknownOperationType(_) => Some("operation_type"),
            ValidationError::MissingBalanceOrBank => None,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingRequiredField(field) => {
                write!(f, "Missing or invalid required field: {}", field)
            }
            ValidationError::ZeroCoefficient => write!(f, "Coefficient cannot be zero"),
            ValidationError::MissingBalanceOrBank => write!(
                f,
                "This operation requires the outstanding balance and the current bank"
            ),
            ValidationError::UnknownOperationType(value) => {
                write!(f, "Unknown operation type: {}", value)
            }
            ValidationError::OutOfRange(field) => write!(f, "Value out of range: {}", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Resource not found error.
    NotFound(String),
    /// Bad request error (invalid input).
    BadRequest(String),
    /// A simulation entry failed validation.
    Validation(ValidationError),
    /// Error interacting with an external API.
    ExternalApiError(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Validation(err) => write!(f, "Validation failed: {}", err),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl IntoResponse for AppError {
    /// Maps each error variant to an HTTP status code and JSON body.
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Validation(err) => {
                tracing::debug!("Rejected simulation entry: {}", err);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({
                        "error": err.to_string(),
                        "code": err.code(),
                        "field": err.field(),
                    }),
                )
            }
            AppError::ExternalApiError(msg) => {
                tracing::error!("External API error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "error": "External service error" }),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
                return source.clone().into_response();
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalApiError(err.to_string())
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }
}
