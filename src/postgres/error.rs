//! Protocol and server error types.
use std::fmt;

use super::fields::ErrorFieldType;

/// An error when translating buffer from postgres.
///
/// This covers violations of the local wire invariants only. An
/// `ErrorResponse` sent by the server is a valid protocol event and is
/// carried as [`SqlError`] instead.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Malformed frame, unknown message type where exhaustiveness is
    /// required, or trailing bytes after a fixed-shape payload.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// A read past the end of the message payload.
    #[error("unexpected end of message payload")]
    UnexpectedEof,

    /// A NUL terminated string is not valid UTF-8.
    #[error("message string is not valid UTF-8")]
    InvalidUtf8,

    /// The server requested an authentication method the client does not
    /// implement (Kerberos, GSSAPI, SSPI).
    #[error("authentication method not supported (code {0})")]
    UnsupportedAuth(u32),

    /// The state machine rejected a message for the current state.
    #[error("illegal in state {state}: {event}")]
    IllegalStateTransition {
        /// Description of the state the connection was in.
        state: String,
        /// Description of the offending message.
        event: String,
    },
}

impl ProtocolError {
    pub(crate) fn invalid(detail: impl fmt::Display) -> ProtocolError {
        Self::InvalidMessage(detail.to_string())
    }

    pub(crate) fn unknown(msgtype: u8) -> ProtocolError {
        Self::InvalidMessage(format!("unknown message type {:?}", msgtype as char))
    }

    pub(crate) fn illegal(state: impl fmt::Display, event: impl fmt::Display) -> ProtocolError {
        Self::IllegalStateTransition {
            state: state.to_string(),
            event: event.to_string(),
        }
    }
}

/// Classification of a server error by its SQLSTATE class.
///
/// The five character code carried in the `C` field groups errors into
/// classes by its first two characters; a handful of codes that callers
/// routinely branch on get their own variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlErrorKind {
    /// `42601` syntax error.
    SyntaxError,
    /// `42P01` relation does not exist.
    UndefinedTable,
    /// `23505` unique constraint violation.
    UniqueViolation,
    /// Everything else, inspect [`SqlError::code`].
    Generic,
}

impl SqlErrorKind {
    fn classify(code: &str) -> SqlErrorKind {
        match code {
            "42601" => Self::SyntaxError,
            "42P01" => Self::UndefinedTable,
            "23505" => Self::UniqueViolation,
            _ => Self::Generic,
        }
    }
}

/// An error reported by the server through an `ErrorResponse` message.
///
/// The message body consists of one or more identified fields. `Severity`,
/// `Code` and `Message` are always present; the rest are kept verbatim and
/// reachable through [`field`][SqlError::field].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{severity}: {message} (SQLSTATE {code})")]
pub struct SqlError {
    /// The severity from the `S` field (`ERROR`, `FATAL`, or `PANIC`).
    pub severity: String,
    /// The SQLSTATE code from the `C` field.
    pub code: String,
    /// The primary human-readable message from the `M` field.
    pub message: String,
    /// Classification of [`code`][SqlError::code].
    pub kind: SqlErrorKind,
    fields: Vec<(ErrorFieldType, String)>,
}

impl SqlError {
    /// Build from the decoded field list of an `ErrorResponse`.
    pub fn from_fields(fields: Vec<(ErrorFieldType, String)>) -> SqlError {
        let get = |ty: ErrorFieldType| {
            fields
                .iter()
                .find(|(t, _)| *t == ty)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };
        let severity = get(ErrorFieldType::Severity);
        let code = get(ErrorFieldType::Code);
        let message = get(ErrorFieldType::Message);
        let kind = SqlErrorKind::classify(&code);
        SqlError { severity, code, message, kind, fields }
    }

    /// Look up any raw field, e.g. `Detail`, `Hint` or `ConstraintName`.
    pub fn field(&self, ty: ErrorFieldType) -> Option<&str> {
        self.fields
            .iter()
            .find(|(t, _)| *t == ty)
            .map(|(_, v)| v.as_str())
    }
}
