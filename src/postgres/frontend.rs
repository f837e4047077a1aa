//! Postgres Frontend Messages
//!
//! All variant fields here mirror the actual message sent to postgres.
use bytes::Bytes;

use crate::codec::{MessageWriter, UsizeExt};
use crate::{CANCEL_REQUEST_CODE, SSL_REQUEST_CODE};

use super::FormatCode;

/// Postgres frontend messages.
///
/// [`serialize`][FrontendMessage::serialize] produces the complete framed
/// byte sequence for the transport: type byte (for historical reasons the
/// startup, SSL request and cancel request messages have none), self
/// inclusive length, then the body.
#[derive(Debug, Clone, PartialEq)]
pub enum FrontendMessage {
    /// The startup message, the very first message sent by the client.
    Startup {
        /// The protocol version number. The most significant 16 bits are
        /// the major version number (3 for the protocol described here).
        version: i32,
        /// Pairs of parameter name and value strings. `user` is required;
        /// `database` defaults to the user name.
        params: Vec<(String, String)>,
    },
    /// Asks the server whether SSL is supported; answered with a single
    /// `S` or `N` byte rather than a regular message.
    SSLRequest,
    /// Cancels the current query of another session, sent over a fresh
    /// connection rather than the one it targets.
    CancelRequest {
        /// The process ID of the target backend.
        process_id: i32,
        /// The secret key for the target backend.
        secret_key: i32,
    },
    /// `p` - a password response. The password is encrypted if the server
    /// requested it.
    PasswordMessage {
        /// The password, possibly MD5-encrypted.
        password: String,
    },
    /// `p` - initial SASL response, names the selected mechanism.
    SASLInitialResponse {
        /// Name of the SASL authentication mechanism that the client
        /// selected.
        mechanism: String,
        /// Mechanism specific "Initial Client Response".
        initial_response: Bytes,
    },
    /// `p` - a subsequent SASL challenge response.
    SASLResponse {
        /// Mechanism specific message data.
        data: Bytes,
    },
    /// `Q` - a simple query.
    Query {
        /// The query string itself.
        sql: String,
    },
    /// `P` - a Parse command.
    Parse {
        /// Prepared statement name (an empty string selects the unnamed
        /// prepared statement).
        name: String,
        /// The query string to be parsed.
        sql: String,
        /// The object ID of each prespecified parameter data type.
        /// Placing a zero is equivalent to leaving the type unspecified.
        param_types: Vec<i32>,
    },
    /// `B` - a Bind command.
    Bind {
        /// The name of the destination portal (an empty string selects the
        /// unnamed portal).
        portal: String,
        /// The name of the source prepared statement (an empty string
        /// selects the unnamed prepared statement).
        statement: String,
        /// The parameter format codes. Can be empty to use the default
        /// (text) for every parameter, or hold a single entry applied to
        /// all parameters, or match the parameter count.
        param_formats: Vec<FormatCode>,
        /// The parameter values; `None` is a NULL parameter, written as
        /// length -1 with no value bytes.
        params: Vec<Option<Bytes>>,
        /// The result-column format codes, with the same count rules as
        /// `param_formats`.
        result_formats: Vec<FormatCode>,
    },
    /// `D` - a Describe command.
    Describe {
        /// `'S'` to describe a prepared statement; or `'P'` to describe a
        /// portal.
        kind: u8,
        /// The name of the prepared statement or portal (an empty string
        /// selects the unnamed one).
        name: String,
    },
    /// `E` - an Execute command.
    Execute {
        /// The name of the portal to execute (an empty string selects the
        /// unnamed portal).
        portal: String,
        /// Maximum number of rows to return, if portal contains a query
        /// that returns rows (ignored otherwise). Zero denotes "no limit".
        max_rows: i32,
    },
    /// `C` - a Close command.
    Close {
        /// `'S'` to close a prepared statement; or `'P'` to close a portal.
        kind: u8,
        /// The name of the prepared statement or portal to close (an empty
        /// string selects the unnamed one).
        name: String,
    },
    /// `S` - a Sync command, closes the current extended-query cycle.
    Sync,
    /// `H` - a Flush command.
    Flush,
    /// `d` - a chunk of copy data stream.
    CopyData(Bytes),
    /// `c` - the copy data stream is finished.
    CopyDone,
    /// `f` - the copy failed, the given reason is reported back by the
    /// server in an `ErrorResponse`.
    CopyFail {
        /// An error message to report as the cause of failure.
        reason: String,
    },
    /// `X` - termination, the frontend closes the connection afterwards.
    Terminate,
}

impl FrontendMessage {
    /// The message type byte, `None` for the untagged startup-phase
    /// messages.
    pub fn tag(&self) -> Option<u8> {
        match self {
            Self::Startup { .. } | Self::SSLRequest | Self::CancelRequest { .. } => None,
            Self::PasswordMessage { .. }
            | Self::SASLInitialResponse { .. }
            | Self::SASLResponse { .. } => Some(b'p'),
            Self::Query { .. } => Some(b'Q'),
            Self::Parse { .. } => Some(b'P'),
            Self::Bind { .. } => Some(b'B'),
            Self::Describe { .. } => Some(b'D'),
            Self::Execute { .. } => Some(b'E'),
            Self::Close { .. } => Some(b'C'),
            Self::Sync => Some(b'S'),
            Self::Flush => Some(b'H'),
            Self::CopyData(_) => Some(b'd'),
            Self::CopyDone => Some(b'c'),
            Self::CopyFail { .. } => Some(b'f'),
            Self::Terminate => Some(b'X'),
        }
    }

    /// The message name, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Startup { .. } => "Startup",
            Self::SSLRequest => "SSLRequest",
            Self::CancelRequest { .. } => "CancelRequest",
            Self::PasswordMessage { .. } => "PasswordMessage",
            Self::SASLInitialResponse { .. } => "SASLInitialResponse",
            Self::SASLResponse { .. } => "SASLResponse",
            Self::Query { .. } => "Query",
            Self::Parse { .. } => "Parse",
            Self::Bind { .. } => "Bind",
            Self::Describe { .. } => "Describe",
            Self::Execute { .. } => "Execute",
            Self::Close { .. } => "Close",
            Self::Sync => "Sync",
            Self::Flush => "Flush",
            Self::CopyData(_) => "CopyData",
            Self::CopyDone => "CopyDone",
            Self::CopyFail { .. } => "CopyFail",
            Self::Terminate => "Terminate",
        }
    }

    /// Encode into the framed byte sequence ready for the transport.
    pub fn serialize(&self) -> Bytes {
        let mut w = MessageWriter::new();
        let frame = w.begin_frame(self.tag());
        match self {
            Self::Startup { version, params } => {
                w.write_int32(*version);
                for (name, value) in params {
                    w.write_cstring(name);
                    w.write_cstring(value);
                }
                // A zero byte is required as a terminator after the last
                // name/value pair.
                w.write_u8(0);
            }
            Self::SSLRequest => {
                w.write_int32(SSL_REQUEST_CODE);
            }
            Self::CancelRequest { process_id, secret_key } => {
                w.write_int32(CANCEL_REQUEST_CODE);
                w.write_int32(*process_id);
                w.write_int32(*secret_key);
            }
            Self::PasswordMessage { password } => {
                w.write_cstring(password);
            }
            Self::SASLInitialResponse { mechanism, initial_response } => {
                w.write_cstring(mechanism);
                // Length of the "Initial Client Response"; -1 would mean the
                // selected mechanism has none.
                w.write_int32(initial_response.len().to_i32());
                w.write_bytes(initial_response);
            }
            Self::SASLResponse { data } => {
                w.write_bytes(data);
            }
            Self::Query { sql } => {
                w.write_cstring(sql);
            }
            Self::Parse { name, sql, param_types } => {
                w.write_cstring(name);
                w.write_cstring(sql);
                w.write_int16(param_types.len().to_i16());
                for oid in param_types {
                    w.write_int32(*oid);
                }
            }
            Self::Bind { portal, statement, param_formats, params, result_formats } => {
                w.write_cstring(portal);
                w.write_cstring(statement);

                w.write_int16(param_formats.len().to_i16());
                for format in param_formats {
                    w.write_int16(format.to_int());
                }

                w.write_int16(params.len().to_i16());
                for param in params {
                    match param {
                        // -1 indicates a NULL parameter value, no value
                        // bytes follow
                        None => w.write_int32(-1),
                        Some(value) => {
                            w.write_int32(value.len().to_i32());
                            w.write_bytes(value);
                        }
                    }
                }

                w.write_int16(result_formats.len().to_i16());
                for format in result_formats {
                    w.write_int16(format.to_int());
                }
            }
            Self::Describe { kind, name } | Self::Close { kind, name } => {
                w.write_u8(*kind);
                w.write_cstring(name);
            }
            Self::Execute { portal, max_rows } => {
                w.write_cstring(portal);
                w.write_int32(*max_rows);
            }
            Self::Sync | Self::Flush | Self::CopyDone | Self::Terminate => {}
            Self::CopyData(data) => {
                w.write_bytes(data);
            }
            Self::CopyFail { reason } => {
                w.write_cstring(reason);
            }
        }
        w.end_frame(frame);
        w.to_bytes()
    }
}

#[cfg(test)]
mod test {
    use crate::PROTOCOL_VERSION;

    use super::*;

    /// The length field counts everything from itself to the end of frame.
    fn assert_length_law(bytes: &Bytes, tag_len: usize) {
        let len = i32::from_be_bytes(bytes[tag_len..tag_len + 4].try_into().unwrap());
        assert_eq!(len as usize, bytes.len() - tag_len);
    }

    #[test]
    fn query() {
        let bytes = FrontendMessage::Query { sql: "SELECT 1".into() }.serialize();
        assert_eq!(bytes[0], 0x51);
        assert_eq!(&bytes[1..5], &[0x00, 0x00, 0x00, 0x0D]);
        assert_eq!(&bytes[5..], b"SELECT 1\x00");
        assert_length_law(&bytes, 1);
    }

    #[test]
    fn terminate() {
        let bytes = FrontendMessage::Terminate.serialize();
        assert_eq!(&bytes[..], &[0x58, 0x00, 0x00, 0x00, 0x04]);
    }

    #[test]
    fn startup() {
        let bytes = FrontendMessage::Startup {
            version: PROTOCOL_VERSION,
            params: vec![
                ("user".into(), "u".into()),
                ("database".into(), "d".into()),
            ],
        }
        .serialize();
        assert_length_law(&bytes, 0);
        assert_eq!(&bytes[4..8], &[0x00, 0x03, 0x00, 0x00]);
        assert_eq!(&bytes[8..], b"user\x00u\x00database\x00d\x00\x00");
    }

    #[test]
    fn ssl_and_cancel_requests() {
        let bytes = FrontendMessage::SSLRequest.serialize();
        assert_eq!(&bytes[..], &[0, 0, 0, 8, 0x04, 0xD2, 0x16, 0x2F]);

        let bytes = FrontendMessage::CancelRequest { process_id: 1234, secret_key: 5678 }.serialize();
        assert_eq!(bytes.len(), 16);
        assert_length_law(&bytes, 0);
        assert_eq!(&bytes[4..8], &[0x04, 0xD2, 0x16, 0x2E]);
        assert_eq!(&bytes[8..12], &1234i32.to_be_bytes());
        assert_eq!(&bytes[12..16], &5678i32.to_be_bytes());
    }

    #[test]
    fn parse_with_param_types() {
        let bytes = FrontendMessage::Parse {
            name: "s1".into(),
            sql: "SELECT $1".into(),
            param_types: vec![23],
        }
        .serialize();
        assert_eq!(bytes[0], b'P');
        assert_length_law(&bytes, 1);
        assert_eq!(&bytes[5..], b"s1\x00SELECT $1\x00\x00\x01\x00\x00\x00\x17");
    }

    #[test]
    fn bind_with_null_param() {
        let bytes = FrontendMessage::Bind {
            portal: "".into(),
            statement: "s1".into(),
            param_formats: vec![FormatCode::Text],
            params: vec![Some(Bytes::from_static(b"42")), None],
            result_formats: vec![FormatCode::Binary],
        }
        .serialize();
        assert_eq!(bytes[0], b'B');
        assert_length_law(&bytes, 1);
        let body = &bytes[5..];
        assert_eq!(
            body,
            b"\x00s1\x00\
              \x00\x01\x00\x00\
              \x00\x02\
              \x00\x00\x00\x0242\
              \xff\xff\xff\xff\
              \x00\x01\x00\x01",
        );
    }

    #[test]
    fn describe_and_close_kinds() {
        let bytes = FrontendMessage::Describe { kind: b'S', name: "s1".into() }.serialize();
        assert_eq!(bytes[0], b'D');
        assert_eq!(&bytes[5..], b"Ss1\x00");

        let bytes = FrontendMessage::Close { kind: b'P', name: "".into() }.serialize();
        assert_eq!(bytes[0], b'C');
        assert_eq!(&bytes[5..], b"P\x00");
    }

    #[test]
    fn execute_unlimited() {
        let bytes = FrontendMessage::Execute { portal: "".into(), max_rows: 0 }.serialize();
        assert_eq!(bytes[0], b'E');
        assert_eq!(&bytes[5..], b"\x00\x00\x00\x00\x00");
    }

    #[test]
    fn sasl_initial_response() {
        let bytes = FrontendMessage::SASLInitialResponse {
            mechanism: "SCRAM-SHA-256".into(),
            initial_response: Bytes::from_static(b"n,,n=,r=abc"),
        }
        .serialize();
        assert_eq!(bytes[0], b'p');
        assert_length_law(&bytes, 1);
        assert_eq!(&bytes[5..18], b"SCRAM-SHA-256");
        assert_eq!(bytes[18], 0);
        assert_eq!(&bytes[19..23], &11i32.to_be_bytes());
        assert_eq!(&bytes[23..], b"n,,n=,r=abc");
    }

    #[test]
    fn copy_messages() {
        let bytes = FrontendMessage::CopyData(Bytes::from_static(b"1\tfoo\n")).serialize();
        assert_eq!(bytes[0], b'd');
        assert_length_law(&bytes, 1);

        let bytes = FrontendMessage::CopyDone.serialize();
        assert_eq!(&bytes[..], &[b'c', 0, 0, 0, 4]);

        let bytes = FrontendMessage::CopyFail { reason: "aborted".into() }.serialize();
        assert_eq!(bytes[0], b'f');
        assert_eq!(&bytes[5..], b"aborted\x00");
    }

    #[test]
    fn every_tagged_message_honors_length_law() {
        let messages = [
            FrontendMessage::PasswordMessage { password: "hunter2".into() },
            FrontendMessage::SASLResponse { data: Bytes::from_static(b"c=biws") },
            FrontendMessage::Sync,
            FrontendMessage::Flush,
            FrontendMessage::Execute { portal: "p".into(), max_rows: 10 },
        ];
        for message in messages {
            assert_length_law(&message.serialize(), 1);
        }
    }
}
