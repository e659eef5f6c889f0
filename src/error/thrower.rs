//! Shorthand constructors for the error taxonomy. These only build the
//! error; callers return it with `Err(..)` or `?`.

use super::ApiError;

const UNEXPECTED_ERROR: &str = "Unexpected error occurred";

/// Bad request for a missing field: `"<field> is required"`
pub fn required(field: &str) -> ApiError {
    ApiError::BadRequest(format!("{} is required", field))
}

/// Bad request carrying the given text
pub fn message(text: impl Into<String>) -> ApiError {
    ApiError::BadRequest(text.into())
}

/// Generic API failure wrapping a lower-level error
pub fn exception<E>(error: E) -> ApiError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let text = error.to_string();
    let message = if text.is_empty() { UNEXPECTED_ERROR.to_string() } else { text };

    ApiError::Api {
        message: Some(message),
        source: Some(Box::new(error)),
    }
}

/// Mixin giving services, controllers and validators `self.required(..)` style helpers.
pub trait ExceptionThrower {
    fn required(&self, field: &str) -> ApiError {
        required(field)
    }

    fn message(&self, text: &str) -> ApiError {
        message(text)
    }

    fn exception<E>(&self, error: E) -> ApiError
    where
        E: std::error::Error + Send + Sync + 'static,
        Self: Sized,
    {
        exception(error)
    }
}
