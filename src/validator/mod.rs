//! Request validation run before a service touches persistence. A validator
//! returns `Ok(())` or the [`ApiError`] to send back.

use crate::error::{ApiError, ExceptionThrower};

pub trait CreateRequestValidator<D>: ExceptionThrower {
    fn validate_create_request(&self, body: &D) -> Result<(), ApiError>;
}

pub trait UpdateRequestValidator<I, D>: ExceptionThrower {
    fn validate_update_request(&self, id: &I, body: &D) -> Result<(), ApiError>;
}

pub trait FindRequestValidator<I>: ExceptionThrower {
    fn validate_find_request(&self, id: &I) -> Result<(), ApiError>;
}

/// All three validations for one resource
pub trait RequestValidator<I, D>:
    CreateRequestValidator<D> + UpdateRequestValidator<I, D> + FindRequestValidator<I>
{
}

impl<T, I, D> RequestValidator<I, D> for T where
    T: CreateRequestValidator<D> + UpdateRequestValidator<I, D> + FindRequestValidator<I>
{
}
