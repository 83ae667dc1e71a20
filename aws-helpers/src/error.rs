/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;

mod code;
pub use code::ErrorCode;

/// A boxed error that is `Send` and `Sync`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by this library
///
/// NOTE: Use [`aws_smithy_types::error::display::DisplayErrorContext`] or similar to display
/// the entire error cause/source chain.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    code: Option<ErrorCode>,
    source: BoxError,
}

/// General categories of errors.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Operation input validation issues (e.g. an ambiguous or missing location)
    InputInvalid,

    /// The value or type tag is not supported by the operation
    TypeUnsupported,

    /// Encoding or decoding a value failed
    Serialization,

    /// The operation requires a capability that was not compiled in (see crate features)
    MissingCapability,

    /// I/O errors
    IOError,

    /// Resource not found (e.g. bucket, key, HIT)
    NotFound,

    /// Any other error returned by the remote service
    ServiceError,
}

impl Error {
    /// Creates a new [`Error`] from a known kind of error as well as an arbitrary error
    /// source.
    pub fn new<E>(kind: ErrorKind, err: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            code: None,
            source: err.into(),
        }
    }

    /// Returns the corresponding [`ErrorKind`] for this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the classified service error code, if this error came from a remote call.
    pub fn code(&self) -> Option<&ErrorCode> {
        self.code.as_ref()
    }

    /// Returns true if the error represents a missing remote resource.
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub(crate) fn with_code(mut self, code: ErrorCode) -> Self {
        if code.is_not_found() {
            self.kind = ErrorKind::NotFound;
        }
        self.code = Some(code);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::InputInvalid => write!(f, "invalid input"),
            ErrorKind::TypeUnsupported => write!(f, "unsupported type"),
            ErrorKind::Serialization => write!(f, "serialization error"),
            ErrorKind::MissingCapability => write!(f, "missing capability"),
            ErrorKind::IOError => write!(f, "I/O error"),
            ErrorKind::NotFound => write!(f, "resource not found"),
            ErrorKind::ServiceError => match &self.code {
                Some(code) => write!(f, "service error: {code}"),
                None => write!(f, "service error"),
            },
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::new(ErrorKind::IOError, value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::new(ErrorKind::Serialization, value)
    }
}

impl From<aws_smithy_types::error::operation::BuildError> for Error {
    fn from(value: aws_smithy_types::error::operation::BuildError) -> Self {
        Self::new(ErrorKind::InputInvalid, value)
    }
}

impl From<aws_smithy_types::byte_stream::error::Error> for Error {
    fn from(value: aws_smithy_types::byte_stream::error::Error) -> Self {
        Self::new(ErrorKind::IOError, value)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(value: quick_xml::Error) -> Self {
        Self::new(ErrorKind::Serialization, value)
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::new(ErrorKind::IOError, value)
    }
}

// Covers the S3, STS and MTurk clients, which all share the smithy runtime `SdkError`.
impl<E, R> From<SdkError<E, R>> for Error
where
    E: std::error::Error + ProvideErrorMetadata + Send + Sync + 'static,
    R: Send + Sync + fmt::Debug + 'static,
{
    fn from(value: SdkError<E, R>) -> Self {
        let code = value.code().map(ErrorCode::from);
        let err = Error::new(ErrorKind::ServiceError, value);
        match code {
            Some(code) => err.with_code(code),
            None => err,
        }
    }
}

pub(crate) fn invalid_input<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::InputInvalid, err)
}

pub(crate) fn type_unsupported<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::TypeUnsupported, err)
}

pub(crate) fn serialization<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::Serialization, err)
}

#[allow(dead_code)]
pub(crate) fn missing_capability(feature: &str) -> Error {
    Error::new(
        ErrorKind::MissingCapability,
        format!("this operation requires the `{feature}` feature of aws-helpers"),
    )
}

pub(crate) fn from_kind<E>(kind: ErrorKind) -> impl FnOnce(E) -> Error
where
    E: Into<BoxError>,
{
    |err| Error::new(kind, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::operation::get_object::GetObjectError;
    use aws_smithy_types::error::ErrorMetadata;

    fn service_error(code: &str) -> Error {
        let err = GetObjectError::generic(ErrorMetadata::builder().code(code).build());
        let sdk_err: aws_sdk_s3::error::SdkError<GetObjectError, ()> =
            aws_sdk_s3::error::SdkError::service_error(err, ());
        sdk_err.into()
    }

    #[test]
    fn test_no_such_key_is_not_found() {
        let err = service_error("NoSuchKey");
        assert_eq!(&ErrorKind::NotFound, err.kind());
        assert_eq!(Some(&ErrorCode::NoSuchKey), err.code());
    }

    #[test]
    fn test_other_codes_are_service_errors() {
        let err = service_error("SlowDown");
        assert_eq!(&ErrorKind::ServiceError, err.kind());
        assert_eq!(Some(&ErrorCode::SlowDown), err.code());
        assert_eq!("service error: SlowDown", err.to_string());
    }

    #[test]
    fn test_mturk_service_error_keeps_code() {
        use aws_sdk_mturk::operation::get_hit::GetHITError;

        let err = GetHITError::generic(ErrorMetadata::builder().code("ServiceFault").build());
        let sdk_err: aws_sdk_mturk::error::SdkError<GetHITError, ()> =
            aws_sdk_mturk::error::SdkError::service_error(err, ());
        let err: Error = sdk_err.into();
        assert_eq!(&ErrorKind::ServiceError, err.kind());
        assert_eq!(
            Some(&ErrorCode::Unknown("ServiceFault".to_owned())),
            err.code()
        );
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let err = service_error("SomethingNew");
        assert_eq!(
            Some(&ErrorCode::Unknown("SomethingNew".to_owned())),
            err.code()
        );
    }
}
