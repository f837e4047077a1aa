//! Field codec for `ErrorResponse` and `NoticeResponse`.
//!
//! The message body consists of one or more identified fields, followed by
//! a zero byte as a terminator. Fields can appear in any order.
//!
//! For each field there is the following:
//!
//! `Byte1` A code identifying the field type; if zero, this is the message
//! terminator and no string follows. Since more field types might be added
//! in future, unrecognized tags are preserved rather than dropped.
//!
//! `String` The field value.
use crate::codec::MessageReader;

use super::ProtocolError;

/// A code identifying one field of an error or notice message.
///
/// <https://www.postgresql.org/docs/current/protocol-error-fields.html>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFieldType {
    /// `S` - ERROR, FATAL, PANIC, or a localized translation of one of
    /// these. Always present.
    Severity,
    /// `V` - same as `S`, but never localized.
    SeverityNonLocalized,
    /// `C` - the SQLSTATE code. Not localized. Always present.
    Code,
    /// `M` - the primary human-readable error message. Always present.
    Message,
    /// `D` - secondary error message carrying more detail.
    Detail,
    /// `H` - a suggestion what to do about the problem.
    Hint,
    /// `P` - error cursor position as an index into the original query.
    Position,
    /// `p` - same as `P`, but for an internally generated command.
    InternalPosition,
    /// `q` - the text of the failed internally generated command.
    InternalQuery,
    /// `W` - context in which the error occurred, e.g. a call stack
    /// traceback of active functions.
    Where,
    /// `s` - schema name, if the error was associated with a specific
    /// database object.
    SchemaName,
    /// `t` - table name.
    TableName,
    /// `c` - column name.
    ColumnName,
    /// `d` - data type name.
    DataTypeName,
    /// `n` - constraint name.
    ConstraintName,
    /// `F` - the source-code file name where the error was reported.
    File,
    /// `L` - the source-code line number.
    Line,
    /// `R` - the source-code routine name.
    Routine,
    /// A tag this library does not know about, kept for forward
    /// compatibility.
    Unknown(u8),
}

impl ErrorFieldType {
    /// Map a field tag byte to its type.
    pub fn from_char(tag: u8) -> ErrorFieldType {
        match tag {
            b'S' => Self::Severity,
            b'V' => Self::SeverityNonLocalized,
            b'C' => Self::Code,
            b'M' => Self::Message,
            b'D' => Self::Detail,
            b'H' => Self::Hint,
            b'P' => Self::Position,
            b'p' => Self::InternalPosition,
            b'q' => Self::InternalQuery,
            b'W' => Self::Where,
            b's' => Self::SchemaName,
            b't' => Self::TableName,
            b'c' => Self::ColumnName,
            b'd' => Self::DataTypeName,
            b'n' => Self::ConstraintName,
            b'F' => Self::File,
            b'L' => Self::Line,
            b'R' => Self::Routine,
            tag => Self::Unknown(tag),
        }
    }

    /// The field tag byte.
    pub fn to_char(self) -> u8 {
        match self {
            Self::Severity => b'S',
            Self::SeverityNonLocalized => b'V',
            Self::Code => b'C',
            Self::Message => b'M',
            Self::Detail => b'D',
            Self::Hint => b'H',
            Self::Position => b'P',
            Self::InternalPosition => b'p',
            Self::InternalQuery => b'q',
            Self::Where => b'W',
            Self::SchemaName => b's',
            Self::TableName => b't',
            Self::ColumnName => b'c',
            Self::DataTypeName => b'd',
            Self::ConstraintName => b'n',
            Self::File => b'F',
            Self::Line => b'L',
            Self::Routine => b'R',
            Self::Unknown(tag) => tag,
        }
    }
}

/// Read the field list up to and including its terminator.
pub(crate) fn read_fields(
    body: &mut MessageReader,
) -> Result<Vec<(ErrorFieldType, String)>, ProtocolError> {
    let mut fields = Vec::new();
    loop {
        let tag = body.read_u8()?;
        if tag == 0 {
            break;
        }
        fields.push((ErrorFieldType::from_char(tag), body.read_cstring()?));
    }
    Ok(fields)
}
