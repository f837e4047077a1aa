use super::ProtocolError;

/// Postgres data transmission format.
///
/// Data of a particular data type might be transmitted in any of several
/// different formats. As of PostgreSQL 7.4 the only supported formats are
/// "text" and "binary". Clients can specify a format code for each
/// transmitted parameter value and for each column of a query result.
///
/// <https://www.postgresql.org/docs/current/protocol-overview.html#PROTOCOL-FORMAT-CODES>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCode {
    /// Text has format code zero.
    ///
    /// In the text transmitted representation, there is no trailing null
    /// character; the frontend must add one to received values if it wants
    /// to process them as C strings.
    Text,
    /// Binary has format code one.
    ///
    /// Binary representations for integers use network byte order (most
    /// significant byte first). Keep in mind that binary representations
    /// for complex data types might change across server versions.
    Binary,
}

impl FormatCode {
    /// Return the wire format code.
    pub fn to_int(self) -> i16 {
        match self {
            FormatCode::Text => 0,
            FormatCode::Binary => 1,
        }
    }

    /// Map a wire format code, which must presently be zero or one.
    pub fn from_int(code: i16) -> Result<FormatCode, ProtocolError> {
        match code {
            0 => Ok(FormatCode::Text),
            1 => Ok(FormatCode::Binary),
            _ => Err(ProtocolError::invalid(format_args!("format code {code}"))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn format_codes() {
        assert_eq!(FormatCode::Text.to_int(), 0);
        assert_eq!(FormatCode::Binary.to_int(), 1);
        assert_eq!(FormatCode::from_int(0).unwrap(), FormatCode::Text);
        assert_eq!(FormatCode::from_int(1).unwrap(), FormatCode::Binary);
        assert!(FormatCode::from_int(2).is_err());
    }
}
