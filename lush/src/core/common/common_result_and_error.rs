// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Result alias and a lightweight error payload for failures that don't deserve their
//! own [`miette::Diagnostic`] enum. Component specific errors (for example
//! [`crate::TypeRegistryError`]) are converted into [`miette::Report`] with `?`.

use std::{error::Error,
          fmt::{Display, Formatter, Result}};

/// Type alias for [`miette::Result`]. Works hand in hand w/ [`CommonError`] and any
/// other type of error that implements [`std::error::Error`].
pub type CommonResult<T> = miette::Result<T>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonError {
    pub error_type: CommonErrorType,
    pub error_message: Option<String>,
}

#[non_exhaustive]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommonErrorType {
    #[default]
    General,
    InvalidArguments,
    IOError,
    NotFound,
    CommandExecutionError,
    ConfigFolderPathCouldNotBeGenerated,
}

impl Error for CommonError {}

impl Display for CommonError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match &self.error_message {
            Some(msg) => write!(f, "{:?}: {msg}", self.error_type),
            None => write!(f, "{:?}", self.error_type),
        }
    }
}

impl CommonError {
    /// Both [`CommonError::error_type`] and [`CommonError::error_message`] available.
    ///
    /// # Errors
    ///
    /// Always returns an error, that's the point.
    pub fn new_error_result<T>(err_type: CommonErrorType, msg: &str) -> CommonResult<T> {
        Err(miette::miette!(CommonError {
            error_type: err_type,
            error_message: Some(msg.to_string()),
        }))
    }

    /// Only [`CommonError::error_type`] available.
    ///
    /// # Errors
    ///
    /// Always returns an error.
    pub fn new_error_result_with_only_type<T>(
        err_type: CommonErrorType,
    ) -> CommonResult<T> {
        Err(miette::miette!(CommonError {
            error_type: err_type,
            error_message: None,
        }))
    }
}
