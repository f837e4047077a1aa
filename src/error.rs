//! `postwire` error types.
use std::{
    backtrace::{Backtrace, BacktraceStatus},
    fmt,
};

use crate::{
    auth::AuthError,
    connection::ParseError,
    postgres::{ProtocolError, SqlError},
};

/// A specialized [`Result`] type for `postwire` operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All possible error from `postwire` library.
///
/// Carries the classified [`ErrorKind`] together with a backtrace captured
/// at the point the error entered this type (when `RUST_BACKTRACE` asks
/// for one).
pub struct Error {
    kind: ErrorKind,
    backtrace: Backtrace,
}

/// All possible error kind from `postwire` library.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Url or option parsing failure.
    #[error(transparent)]
    Config(#[from] ParseError),
    /// Wire invariant violation.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// Authentication exchange failure detected on the client side.
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// An error reported by the server.
    #[error(transparent)]
    Database(#[from] SqlError),
}

impl Error {
    /// The classified error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Backtrace captured where the error was classified.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind, backtrace: Backtrace::capture() }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        ErrorKind::from(err).into()
    }
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        ErrorKind::from(err).into()
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        ErrorKind::from(err).into()
    }
}

impl From<SqlError> for Error {
    fn from(err: SqlError) -> Self {
        ErrorKind::from(err).into()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)?;
        if matches!(self.backtrace.status(), BacktraceStatus::Captured) {
            write!(f, "\n\nbacktrace:\n{}", self.backtrace)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Error").field(&self.kind).finish()
    }
}
