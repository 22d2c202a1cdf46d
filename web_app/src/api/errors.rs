//! Typed failures raised by the domain services.
//!
//! Services return `anyhow::Result`; when a failure belongs to the domain it is
//! a [`ClinicError`] inside the `anyhow::Error`, so the presentation layer can
//! recover it with `downcast_ref` and pick the right response.

use derive_more::{Display, Error};

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum ClinicError {
    /// Referenced id or name does not resolve
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// Uniqueness violation
    #[display("conflict: {_0}")]
    Conflict(#[error(not(source))] String),
    /// Semantically invalid argument
    #[display("invalid input: {_0}")]
    InvalidInput(#[error(not(source))] String),
    /// Required reference data is missing from the store. Deployment defect.
    #[display("configuration error: {_0}")]
    ConfigurationError(#[error(not(source))] String),
    #[display("unauthorized: {_0}")]
    Unauthorized(#[error(not(source))] String),
    #[display("forbidden: {_0}")]
    Forbidden(#[error(not(source))] String),
}

impl ClinicError {
    pub fn not_found(what: impl Into<String>) -> anyhow::Error {
        ClinicError::NotFound(what.into()).into()
    }

    pub fn conflict(what: impl Into<String>) -> anyhow::Error {
        ClinicError::Conflict(what.into()).into()
    }

    pub fn invalid_input(what: impl Into<String>) -> anyhow::Error {
        ClinicError::InvalidInput(what.into()).into()
    }

    pub fn configuration(what: impl Into<String>) -> anyhow::Error {
        ClinicError::ConfigurationError(what.into()).into()
    }

    /// Message without the category prefix, to render back into a form
    pub fn message(&self) -> &str {
        match self {
            ClinicError::NotFound(msg)
            | ClinicError::Conflict(msg)
            | ClinicError::InvalidInput(msg)
            | ClinicError::ConfigurationError(msg)
            | ClinicError::Unauthorized(msg)
            | ClinicError::Forbidden(msg) => msg,
        }
    }
}

/// Extracts the [`ClinicError`] carried by `err`, if any.
pub fn as_clinic_error(err: &anyhow::Error) -> Option<&ClinicError> {
    err.downcast_ref::<ClinicError>()
}
