//! Postgres Backend Messages
//!
//! Docs here mostly quoted from the official postgres documentation.
use bytes::Bytes;

use crate::codec::MessageReader;

use super::{
    fields::{read_fields, ErrorFieldType},
    FormatCode, ProtocolError,
};

/// Backend transaction status indicator carried by `ReadyForQuery`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// `I` - idle, not in a transaction block.
    Idle,
    /// `T` - in a transaction block.
    InTransaction,
    /// `E` - in a failed transaction block; queries will be rejected until
    /// the block is ended.
    InFailedTransaction,
}

impl TransactionStatus {
    /// Map the status byte of a `ReadyForQuery` message.
    pub fn from_u8(status: u8) -> Result<TransactionStatus, ProtocolError> {
        match status {
            b'I' => Ok(Self::Idle),
            b'T' => Ok(Self::InTransaction),
            b'E' => Ok(Self::InFailedTransaction),
            _ => Err(ProtocolError::invalid(format_args!(
                "transaction status {:?}",
                status as char,
            ))),
        }
    }

    /// The wire status byte.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Idle => b'I',
            Self::InTransaction => b'T',
            Self::InFailedTransaction => b'E',
        }
    }
}

/// Cancellation key data.
///
/// The frontend must save these values if it wishes to be able to issue
/// `CancelRequest` messages later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendKeyData {
    /// The process ID of this backend.
    pub process_id: i32,
    /// The secret key of this backend.
    pub secret_key: i32,
}

/// Description of a single field of a `RowDescription`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescription {
    /// The field name.
    pub name: String,
    /// If the field can be identified as a column of a specific table,
    /// the object ID of the table; otherwise zero.
    pub table_oid: i32,
    /// If the field can be identified as a column of a specific table,
    /// the attribute number of the column; otherwise zero.
    pub column_attr: i16,
    /// The object ID of the field's data type.
    pub type_oid: i32,
    /// The data type size (see `pg_type.typlen`).
    /// Note that negative values denote variable-width types.
    pub type_size: i16,
    /// The type modifier (see `pg_attribute.atttypmod`).
    /// The meaning of the modifier is type-specific.
    pub type_modifier: i32,
    /// The format code being used for the field.
    ///
    /// In a RowDescription returned from the statement variant of Describe,
    /// the format code is not yet known and will always be zero.
    pub format_code: FormatCode,
}

impl FieldDescription {
    fn read(body: &mut MessageReader) -> Result<FieldDescription, ProtocolError> {
        Ok(FieldDescription {
            name: body.read_cstring()?,
            table_oid: body.read_int32()?,
            column_attr: body.read_int16()?,
            type_oid: body.read_int32()?,
            type_size: body.read_int16()?,
            type_modifier: body.read_int32()?,
            format_code: FormatCode::from_int(body.read_int16()?)?,
        })
    }
}

/// Identifies the message as an authentication request.
///
/// The request kind is the first 32-bit integer of the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    /// Specifies that the authentication was successful.
    Ok,
    /// Specifies that Kerberos V5 authentication is required.
    KerberosV5,
    /// Specifies that a clear-text password is required.
    CleartextPassword,
    /// Specifies that an MD5-encrypted password is required.
    MD5Password {
        /// The salt to use when encrypting the password.
        salt: [u8; 4],
    },
    /// Specifies that GSSAPI authentication is required.
    GSS,
    /// Specifies that SSPI authentication is required.
    SSPI,
    /// Specifies that SASL authentication is required.
    SASL {
        /// List of SASL authentication mechanisms, in the server's order
        /// of preference.
        mechanisms: Vec<String>,
    },
    /// Specifies that this message contains a SASL challenge.
    SASLContinue {
        /// SASL data, specific to the SASL mechanism being used.
        data: Bytes,
    },
    /// Specifies that SASL authentication has completed.
    SASLFinal {
        /// SASL outcome "additional data", specific to the SASL mechanism
        /// being used.
        data: Bytes,
    },
}

impl Authentication {
    fn read(body: &mut MessageReader) -> Result<Authentication, ProtocolError> {
        let auth = match body.read_uint32()? {
            0 => Authentication::Ok,
            2 => Authentication::KerberosV5,
            3 => Authentication::CleartextPassword,
            5 => Authentication::MD5Password {
                salt: body.read_uint32()?.to_be_bytes(),
            },
            7 => Authentication::GSS,
            9 => Authentication::SSPI,
            10 => {
                // The message body is a list of mechanism names. A zero byte
                // is required as terminator after the last name, so the list
                // ends at the first empty name.
                let mut mechanisms = Vec::new();
                loop {
                    let name = body.read_cstring()?;
                    if name.is_empty() {
                        break;
                    }
                    mechanisms.push(name);
                }
                body.expect_end("AuthenticationSASL")?;
                Authentication::SASL { mechanisms }
            }
            11 => Authentication::SASLContinue { data: body.read_remaining() },
            12 => Authentication::SASLFinal { data: body.read_remaining() },
            kind => return Err(ProtocolError::invalid(format_args!(
                "authentication request kind {kind}",
            ))),
        };
        match &auth {
            Authentication::Ok
            | Authentication::KerberosV5
            | Authentication::CleartextPassword
            | Authentication::MD5Password { .. }
            | Authentication::GSS
            | Authentication::SSPI => body.expect_end("authentication request")?,
            _ => {}
        }
        Ok(auth)
    }
}

/// Postgres backend messages.
///
/// Large payloads (`DataRow` columns, `CopyData`, SASL data) borrow from
/// the input buffer through [`Bytes`], so no copy is made during parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendMessage {
    /// `R` - an authentication request, see [`Authentication`].
    Authentication(Authentication),
    /// `S` - a run-time parameter status report.
    ParameterStatus {
        /// The name of the run-time parameter being reported.
        name: String,
        /// The current value of the parameter.
        value: String,
    },
    /// `K` - cancellation key data.
    BackendKeyData(BackendKeyData),
    /// `Z` - the backend is ready for a new query cycle.
    ReadyForQuery {
        /// Current backend transaction status.
        status: TransactionStatus,
    },
    /// `T` - a row description, sent ahead of the `DataRow` messages of a
    /// `SELECT`, `FETCH`, etc. query.
    RowDescription {
        /// One entry per row field (can be empty).
        fields: Vec<FieldDescription>,
    },
    /// `D` - one of the set of rows returned by the query.
    DataRow {
        /// Column values in the order of the preceding `RowDescription`;
        /// `None` is a NULL column.
        columns: Vec<Option<Bytes>>,
    },
    /// `C` - an SQL command completed normally.
    CommandComplete {
        /// The command tag, usually a single word identifying which SQL
        /// command was completed, e.g. `INSERT 0 1`.
        tag: String,
    },
    /// `I` - response to an empty query string, substitutes for
    /// `CommandComplete`.
    EmptyQueryResponse,
    /// `E` - an error has occurred.
    ErrorResponse {
        /// The identified fields of the error.
        fields: Vec<(ErrorFieldType, String)>,
    },
    /// `N` - a warning message. The frontend should display the message.
    NoticeResponse {
        /// The identified fields of the notice.
        fields: Vec<(ErrorFieldType, String)>,
    },
    /// `A` - a `NOTIFY` notification from another session.
    NotificationResponse {
        /// The process ID of the notifying backend process.
        process_id: i32,
        /// The name of the channel that the notify has been raised on.
        channel: String,
        /// The "payload" string passed from the notifying process.
        payload: String,
    },
    /// `n` - no-data indicator, the statement returns no rows.
    NoData,
    /// `s` - an Execute message's row-count limit was reached.
    PortalSuspended,
    /// `1` - Parse-complete indicator.
    ParseComplete,
    /// `2` - Bind-complete indicator.
    BindComplete,
    /// `3` - Close-complete indicator.
    CloseComplete,
    /// `t` - a parameter description for a prepared statement.
    ParameterDescription {
        /// The object ID of each parameter data type.
        oids: Vec<i32>,
    },
    /// `G` - the frontend must now transfer copy data.
    CopyInResponse {
        /// Overall copy format.
        format: FormatCode,
        /// Format of each column; all zero (text) unless the overall
        /// format is binary.
        column_formats: Vec<FormatCode>,
    },
    /// `H` - the backend is about to transfer copy data.
    CopyOutResponse {
        /// Overall copy format.
        format: FormatCode,
        /// Format of each column.
        column_formats: Vec<FormatCode>,
    },
    /// `W` - copy in both directions, used only for streaming replication.
    CopyBothResponse {
        /// Overall copy format.
        format: FormatCode,
        /// Format of each column.
        column_formats: Vec<FormatCode>,
    },
    /// `d` - a chunk of copy data stream.
    CopyData(Bytes),
    /// `c` - the copy data stream is finished.
    CopyDone,
    /// `V` - the result of a function call.
    FunctionCallResponse {
        /// The function result value; `None` is a NULL result.
        value: Option<Bytes>,
    },
    /// `v` - the server does not support the requested minor protocol
    /// version.
    NegotiateProtocolVersion {
        /// Newest minor protocol version supported by the server for the
        /// major protocol version requested by the client.
        minor: i32,
        /// Protocol options not recognized by the server.
        options: Vec<String>,
    },
}

impl BackendMessage {
    /// Decode one backend message from its type byte and payload.
    ///
    /// The payload is the frame body, already delimited by the transport
    /// reader: the four length bytes are not part of it.
    pub fn parse(tag: u8, body: Bytes) -> Result<BackendMessage, ProtocolError> {
        let mut body = MessageReader::new(body);
        let message = match tag {
            b'R' => Self::Authentication(Authentication::read(&mut body)?),
            b'S' => {
                let name = body.read_cstring()?;
                let value = body.read_cstring()?;
                body.expect_end("ParameterStatus")?;
                Self::ParameterStatus { name, value }
            }
            b'K' => {
                let key = BackendKeyData {
                    process_id: body.read_int32()?,
                    secret_key: body.read_int32()?,
                };
                body.expect_end("BackendKeyData")?;
                Self::BackendKeyData(key)
            }
            b'Z' => {
                let status = TransactionStatus::from_u8(body.read_u8()?)?;
                body.expect_end("ReadyForQuery")?;
                Self::ReadyForQuery { status }
            }
            b'T' => {
                let field_len = body.read_int16()?;
                let mut fields = Vec::with_capacity(field_len.max(0) as usize);
                for _ in 0..field_len {
                    fields.push(FieldDescription::read(&mut body)?);
                }
                Self::RowDescription { fields }
            }
            b'D' => {
                let column_len = body.read_int16()?;
                let mut columns = Vec::with_capacity(column_len.max(0) as usize);
                for _ in 0..column_len {
                    // -1 indicates a NULL column value, no bytes follow
                    columns.push(match body.read_int32()? {
                        -1 => None,
                        len if len < 0 => {
                            return Err(ProtocolError::invalid(format_args!(
                                "negative column length {len}",
                            )))
                        }
                        len => Some(body.read_bytes(len as usize)?),
                    });
                }
                Self::DataRow { columns }
            }
            b'C' => {
                let tag = body.read_cstring()?;
                body.expect_end("CommandComplete")?;
                Self::CommandComplete { tag }
            }
            b'I' => {
                body.expect_end("EmptyQueryResponse")?;
                Self::EmptyQueryResponse
            }
            b'E' => Self::ErrorResponse { fields: read_fields(&mut body)? },
            b'N' => Self::NoticeResponse { fields: read_fields(&mut body)? },
            b'A' => {
                let process_id = body.read_int32()?;
                let channel = body.read_cstring()?;
                let payload = body.read_cstring()?;
                body.expect_end("NotificationResponse")?;
                Self::NotificationResponse { process_id, channel, payload }
            }
            b'n' => {
                body.expect_end("NoData")?;
                Self::NoData
            }
            b's' => {
                body.expect_end("PortalSuspended")?;
                Self::PortalSuspended
            }
            b'1' => {
                body.expect_end("ParseComplete")?;
                Self::ParseComplete
            }
            b'2' => {
                body.expect_end("BindComplete")?;
                Self::BindComplete
            }
            b'3' => {
                body.expect_end("CloseComplete")?;
                Self::CloseComplete
            }
            b't' => {
                let param_len = body.read_int16()?;
                let mut oids = Vec::with_capacity(param_len.max(0) as usize);
                for _ in 0..param_len {
                    oids.push(body.read_int32()?);
                }
                body.expect_end("ParameterDescription")?;
                Self::ParameterDescription { oids }
            }
            b'G' => {
                let (format, column_formats) = read_copy_response(&mut body)?;
                Self::CopyInResponse { format, column_formats }
            }
            b'H' => {
                let (format, column_formats) = read_copy_response(&mut body)?;
                Self::CopyOutResponse { format, column_formats }
            }
            b'W' => {
                let (format, column_formats) = read_copy_response(&mut body)?;
                Self::CopyBothResponse { format, column_formats }
            }
            b'd' => Self::CopyData(body.read_remaining()),
            b'c' => {
                body.expect_end("CopyDone")?;
                Self::CopyDone
            }
            b'V' => {
                let value = match body.read_int32()? {
                    -1 => None,
                    len if len < 0 => {
                        return Err(ProtocolError::invalid(format_args!(
                            "negative function result length {len}",
                        )))
                    }
                    len => Some(body.read_bytes(len as usize)?),
                };
                body.expect_end("FunctionCallResponse")?;
                Self::FunctionCallResponse { value }
            }
            b'v' => {
                let minor = body.read_int32()?;
                let option_len = body.read_int32()?;
                let mut options = Vec::with_capacity(option_len.max(0) as usize);
                for _ in 0..option_len {
                    options.push(body.read_cstring()?);
                }
                body.expect_end("NegotiateProtocolVersion")?;
                Self::NegotiateProtocolVersion { minor, options }
            }
            tag => return Err(ProtocolError::unknown(tag)),
        };
        Ok(message)
    }

    /// The message name, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "Authentication",
            Self::ParameterStatus { .. } => "ParameterStatus",
            Self::BackendKeyData(_) => "BackendKeyData",
            Self::ReadyForQuery { .. } => "ReadyForQuery",
            Self::RowDescription { .. } => "RowDescription",
            Self::DataRow { .. } => "DataRow",
            Self::CommandComplete { .. } => "CommandComplete",
            Self::EmptyQueryResponse => "EmptyQueryResponse",
            Self::ErrorResponse { .. } => "ErrorResponse",
            Self::NoticeResponse { .. } => "NoticeResponse",
            Self::NotificationResponse { .. } => "NotificationResponse",
            Self::NoData => "NoData",
            Self::PortalSuspended => "PortalSuspended",
            Self::ParseComplete => "ParseComplete",
            Self::BindComplete => "BindComplete",
            Self::CloseComplete => "CloseComplete",
            Self::ParameterDescription { .. } => "ParameterDescription",
            Self::CopyInResponse { .. } => "CopyInResponse",
            Self::CopyOutResponse { .. } => "CopyOutResponse",
            Self::CopyBothResponse { .. } => "CopyBothResponse",
            Self::CopyData(_) => "CopyData",
            Self::CopyDone => "CopyDone",
            Self::FunctionCallResponse { .. } => "FunctionCallResponse",
            Self::NegotiateProtocolVersion { .. } => "NegotiateProtocolVersion",
        }
    }

    /// Get message name from message type.
    ///
    /// Returns `"Unknown"` for unknown message type.
    pub fn message_name(tag: u8) -> &'static str {
        match tag {
            b'R' => "Authentication",
            b'S' => "ParameterStatus",
            b'K' => "BackendKeyData",
            b'Z' => "ReadyForQuery",
            b'T' => "RowDescription",
            b'D' => "DataRow",
            b'C' => "CommandComplete",
            b'I' => "EmptyQueryResponse",
            b'E' => "ErrorResponse",
            b'N' => "NoticeResponse",
            b'A' => "NotificationResponse",
            b'n' => "NoData",
            b's' => "PortalSuspended",
            b'1' => "ParseComplete",
            b'2' => "BindComplete",
            b'3' => "CloseComplete",
            b't' => "ParameterDescription",
            b'G' => "CopyInResponse",
            b'H' => "CopyOutResponse",
            b'W' => "CopyBothResponse",
            b'd' => "CopyData",
            b'c' => "CopyDone",
            b'V' => "FunctionCallResponse",
            b'v' => "NegotiateProtocolVersion",
            _ => "Unknown",
        }
    }
}

/// Shared body of `CopyInResponse`/`CopyOutResponse`/`CopyBothResponse`:
/// `Int8` overall format, `Int16` column count, `Int16[]` per-column codes.
fn read_copy_response(
    body: &mut MessageReader,
) -> Result<(FormatCode, Vec<FormatCode>), ProtocolError> {
    let format = FormatCode::from_int(body.read_u8()? as i16)?;
    let column_len = body.read_int16()?;
    let mut column_formats = Vec::with_capacity(column_len.max(0) as usize);
    for _ in 0..column_len {
        column_formats.push(FormatCode::from_int(body.read_int16()?)?);
    }
    body.expect_end("copy response")?;
    Ok((format, column_formats))
}

#[cfg(test)]
mod test {
    use crate::codec::MessageWriter;

    use super::*;

    #[test]
    fn authentication_ok() {
        let msg = BackendMessage::parse(b'R', Bytes::from_static(&[0, 0, 0, 0])).unwrap();
        assert_eq!(msg, BackendMessage::Authentication(Authentication::Ok));
    }

    #[test]
    fn authentication_md5() {
        let msg = BackendMessage::parse(
            b'R',
            Bytes::from_static(&[0, 0, 0, 5, 0x01, 0x02, 0x03, 0x04]),
        )
        .unwrap();
        assert_eq!(
            msg,
            BackendMessage::Authentication(Authentication::MD5Password {
                salt: [0x01, 0x02, 0x03, 0x04],
            }),
        );
    }

    #[test]
    fn authentication_sasl_mechanisms() {
        let msg = BackendMessage::parse(
            b'R',
            Bytes::from_static(b"\x00\x00\x00\x0aSCRAM-SHA-256-PLUS\0SCRAM-SHA-256\0\0"),
        )
        .unwrap();
        assert_eq!(
            msg,
            BackendMessage::Authentication(Authentication::SASL {
                mechanisms: vec!["SCRAM-SHA-256-PLUS".into(), "SCRAM-SHA-256".into()],
            }),
        );
    }

    #[test]
    fn ready_for_query_statuses() {
        for (byte, status) in [
            (0x49, TransactionStatus::Idle),
            (0x54, TransactionStatus::InTransaction),
            (0x45, TransactionStatus::InFailedTransaction),
        ] {
            let msg = BackendMessage::parse(b'Z', Bytes::copy_from_slice(&[byte])).unwrap();
            assert_eq!(msg, BackendMessage::ReadyForQuery { status });
        }
        assert!(BackendMessage::parse(b'Z', Bytes::from_static(&[b'X'])).is_err());
    }

    #[test]
    fn ready_for_query_rejects_trailing_bytes() {
        let err = BackendMessage::parse(b'Z', Bytes::from_static(&[b'I', 0])).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
    }

    #[test]
    fn backend_key_data() {
        let mut w = MessageWriter::new();
        w.write_int32(1234);
        w.write_int32(5678);
        let msg = BackendMessage::parse(b'K', w.to_bytes()).unwrap();
        assert_eq!(
            msg,
            BackendMessage::BackendKeyData(BackendKeyData {
                process_id: 1234,
                secret_key: 5678,
            }),
        );
    }

    #[test]
    fn parameter_status() {
        let body = Bytes::from_static(b"server_version\x0017.2\x00");
        let msg = BackendMessage::parse(b'S', body).unwrap();
        assert_eq!(
            msg,
            BackendMessage::ParameterStatus {
                name: "server_version".into(),
                value: "17.2".into(),
            },
        );
    }

    #[test]
    fn row_description() {
        let mut w = MessageWriter::new();
        w.write_int16(1);
        w.write_cstring("id");
        w.write_int32(0);
        w.write_int16(0);
        w.write_int32(23); // int4
        w.write_int16(4);
        w.write_int32(-1);
        w.write_int16(0);
        let msg = BackendMessage::parse(b'T', w.to_bytes()).unwrap();
        assert_eq!(
            msg,
            BackendMessage::RowDescription {
                fields: vec![FieldDescription {
                    name: "id".into(),
                    table_oid: 0,
                    column_attr: 0,
                    type_oid: 23,
                    type_size: 4,
                    type_modifier: -1,
                    format_code: FormatCode::Text,
                }],
            },
        );
    }

    #[test]
    fn data_row_with_null_column() {
        let mut w = MessageWriter::new();
        w.write_int16(2);
        w.write_int32(3);
        w.write_bytes(b"420");
        w.write_int32(-1);
        let msg = BackendMessage::parse(b'D', w.to_bytes()).unwrap();
        assert_eq!(
            msg,
            BackendMessage::DataRow {
                columns: vec![Some(Bytes::from_static(b"420")), None],
            },
        );
    }

    #[test]
    fn negative_lengths_are_rejected() {
        // only -1 means NULL; any other negative length is malformed
        let mut w = MessageWriter::new();
        w.write_int16(1);
        w.write_int32(-2);
        let err = BackendMessage::parse(b'D', w.to_bytes()).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));

        let mut w = MessageWriter::new();
        w.write_int32(-7);
        let err = BackendMessage::parse(b'V', w.to_bytes()).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
    }

    #[test]
    fn error_response_fields() {
        let body = Bytes::from_static(b"SERROR\0C42P01\0Mrelation \"foo\" does not exist\0\0");
        let msg = BackendMessage::parse(b'E', body).unwrap();
        let BackendMessage::ErrorResponse { fields } = msg else {
            panic!("expected ErrorResponse");
        };
        assert_eq!(fields[1], (ErrorFieldType::Code, "42P01".to_owned()));
    }

    #[test]
    fn notification_response() {
        let mut w = MessageWriter::new();
        w.write_int32(99);
        w.write_cstring("jobs");
        w.write_cstring("wake up");
        let msg = BackendMessage::parse(b'A', w.to_bytes()).unwrap();
        assert_eq!(
            msg,
            BackendMessage::NotificationResponse {
                process_id: 99,
                channel: "jobs".into(),
                payload: "wake up".into(),
            },
        );
    }

    #[test]
    fn copy_in_response() {
        let mut w = MessageWriter::new();
        w.write_u8(1);
        w.write_int16(2);
        w.write_int16(1);
        w.write_int16(1);
        let msg = BackendMessage::parse(b'G', w.to_bytes()).unwrap();
        assert_eq!(
            msg,
            BackendMessage::CopyInResponse {
                format: FormatCode::Binary,
                column_formats: vec![FormatCode::Binary, FormatCode::Binary],
            },
        );
    }

    #[test]
    fn parameter_description() {
        let mut w = MessageWriter::new();
        w.write_int16(2);
        w.write_int32(23);
        w.write_int32(25);
        let msg = BackendMessage::parse(b't', w.to_bytes()).unwrap();
        assert_eq!(msg, BackendMessage::ParameterDescription { oids: vec![23, 25] });
    }

    #[test]
    fn unit_messages() {
        assert_eq!(BackendMessage::parse(b'1', Bytes::new()).unwrap(), BackendMessage::ParseComplete);
        assert_eq!(BackendMessage::parse(b'2', Bytes::new()).unwrap(), BackendMessage::BindComplete);
        assert_eq!(BackendMessage::parse(b'3', Bytes::new()).unwrap(), BackendMessage::CloseComplete);
        assert_eq!(BackendMessage::parse(b'n', Bytes::new()).unwrap(), BackendMessage::NoData);
        assert_eq!(BackendMessage::parse(b's', Bytes::new()).unwrap(), BackendMessage::PortalSuspended);
        assert_eq!(BackendMessage::parse(b'I', Bytes::new()).unwrap(), BackendMessage::EmptyQueryResponse);
        assert_eq!(BackendMessage::parse(b'c', Bytes::new()).unwrap(), BackendMessage::CopyDone);
    }

    #[test]
    fn unknown_tag_is_never_dropped() {
        let err = BackendMessage::parse(b'?', Bytes::new()).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
        assert_eq!(BackendMessage::message_name(b'?'), "Unknown");
        assert_eq!(BackendMessage::message_name(b'Z'), "ReadyForQuery");
    }
}
