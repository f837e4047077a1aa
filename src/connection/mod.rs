//! The connection state machine.
//!
//! [`Connection`] is a pure transition function over the observable
//! connection lifecycle: it performs no I/O. The embedder owns the
//! transport, serializes the frontend messages this module hands out, and
//! feeds every parsed backend message back through
//! [`receive`][Connection::receive].
use std::{collections::BTreeMap, fmt};

use crate::{
    auth::{hash_md5_password, AuthError, ScramAuthenticator},
    postgres::{
        Authentication, BackendKeyData, BackendMessage, FrontendMessage, ProtocolError, SqlError,
        TransactionStatus,
    },
    Result, PROTOCOL_VERSION,
};

mod config;

pub use config::{ConnectionConfig, ParseError, SslMode};

/// The observable lifecycle of a connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    /// No startup message has been issued yet.
    Connecting,
    /// Startup sent, the authentication and parameter exchange is running.
    Authenticating,
    /// The backend is ready for a new query cycle.
    ReadyForQuery(TransactionStatus),
    /// A query cycle is in flight.
    Busy,
    /// The backend expects `CopyData` from us.
    CopyIn,
    /// The backend is streaming `CopyData` to us.
    CopyOut,
    /// The protocol was violated; only `Terminate` may still be sent.
    Error(String),
    /// `Terminate` was sent, the connection is gone.
    Terminated,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => f.write_str("Connecting"),
            Self::Authenticating => f.write_str("Authenticating"),
            Self::ReadyForQuery(status) => write!(f, "ReadyForQuery({status:?})"),
            Self::Busy => f.write_str("Busy"),
            Self::CopyIn => f.write_str("CopyIn"),
            Self::CopyOut => f.write_str("CopyOut"),
            Self::Error(reason) => write!(f, "Error({reason})"),
            Self::Terminated => f.write_str("Terminated"),
        }
    }
}

/// Postgres connection state machine.
///
/// Tracks the connection configuration, current [`ConnectionState`], the
/// run-time parameters the server reported, and the cancellation key data.
/// Which messages are legal depends on the state; an illegal
/// [`send`][Connection::send] is rejected without a state change, while an
/// illegal [`receive`][Connection::receive] poisons the connection into
/// [`ConnectionState::Error`].
#[derive(Debug)]
pub struct Connection {
    config: ConnectionConfig,
    state: ConnectionState,
    server_params: BTreeMap<String, String>,
    key_data: Option<BackendKeyData>,
    scram: Option<ScramAuthenticator>,
    last_error: Option<SqlError>,
}

impl Connection {
    /// Create a connection in the [`Connecting`][ConnectionState::Connecting]
    /// state.
    pub fn new(config: ConnectionConfig) -> Connection {
        Connection {
            config,
            state: ConnectionState::Connecting,
            server_params: BTreeMap::new(),
            key_data: None,
            scram: None,
            last_error: None,
        }
    }

    /// The configuration this connection was created with.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn current_state(&self) -> &ConnectionState {
        &self.state
    }

    /// Look up a run-time parameter reported by the server, e.g.
    /// `server_version` or `client_encoding`.
    pub fn server_parameter(&self, name: &str) -> Option<&str> {
        self.server_params.get(name).map(String::as_str)
    }

    /// Cancellation key data, available once startup completed.
    pub fn backend_key_data(&self) -> Option<BackendKeyData> {
        self.key_data
    }

    /// The most recent `ErrorResponse` the server reported.
    pub fn last_error(&self) -> Option<&SqlError> {
        self.last_error.as_ref()
    }

    /// Build the startup message and advance to
    /// [`Authenticating`][ConnectionState::Authenticating].
    ///
    /// The message must reach the transport before anything else; to begin
    /// a session, a frontend opens a connection to the server and sends a
    /// startup message.
    pub fn startup(&mut self) -> Result<FrontendMessage> {
        let mut params = vec![("user".to_owned(), self.config.user.clone())];
        if self.config.database != self.config.user {
            params.push(("database".to_owned(), self.config.database.clone()));
        }
        if let Some(name) = &self.config.application_name {
            params.push(("application_name".to_owned(), name.clone()));
        }
        for (name, value) in &self.config.options {
            params.push((name.clone(), value.clone()));
        }

        let startup = FrontendMessage::Startup { version: PROTOCOL_VERSION, params };
        self.send(&startup)?;
        Ok(startup)
    }

    /// Build the cancel request matching this connection, to be sent over a
    /// separate connection.
    ///
    /// Returns `None` until the server provided its key data.
    pub fn cancel_request(&self) -> Option<FrontendMessage> {
        let BackendKeyData { process_id, secret_key } = self.key_data?;
        Some(FrontendMessage::CancelRequest { process_id, secret_key })
    }

    /// Record the send of a frontend message, checking that it is legal in
    /// the current state.
    ///
    /// Rejected sends leave the state untouched. Frontend messages must be
    /// delivered to the transport in the order they were accepted here.
    pub fn send(&mut self, message: &FrontendMessage) -> Result<()> {
        use ConnectionState::*;
        use FrontendMessage as F;

        #[cfg(feature = "verbose")]
        tracing::trace!("(F){} in {}", message.name(), self.state);

        // a poisoned or closed connection only lets the terminator through
        if matches!(self.state, Error(_) | Terminated) && !matches!(message, F::Terminate) {
            return Err(self.reject_send(message));
        }

        let next = match (&self.state, message) {
            (_, F::Terminate) => Terminated,
            // issued on a fresh connection on behalf of this one, does not
            // touch this machine
            (_, F::CancelRequest { .. }) => return Ok(()),

            (Connecting, F::SSLRequest) => Connecting,
            (Connecting, F::Startup { .. }) => Authenticating,

            (Authenticating, F::PasswordMessage { .. }) => Authenticating,
            (Authenticating, F::SASLInitialResponse { .. }) => Authenticating,
            (Authenticating, F::SASLResponse { .. }) => Authenticating,

            // the first message of a cycle leaves the idle state; the rest
            // of an extended-query batch follows while busy
            (
                ReadyForQuery(_),
                F::Query { .. }
                | F::Parse { .. }
                | F::Bind { .. }
                | F::Describe { .. }
                | F::Execute { .. }
                | F::Close { .. }
                | F::Sync
                | F::Flush,
            ) => Busy,
            (
                Busy,
                F::Parse { .. }
                | F::Bind { .. }
                | F::Describe { .. }
                | F::Execute { .. }
                | F::Close { .. }
                | F::Sync
                | F::Flush,
            ) => Busy,

            (CopyIn, F::CopyData(_)) => CopyIn,
            (CopyIn, F::CopyDone | F::CopyFail { .. }) => Busy,

            _ => return Err(self.reject_send(message)),
        };

        self.transition(next);
        Ok(())
    }

    /// Apply a received backend message, advancing the state.
    ///
    /// Returns the frontend message the caller must now deliver to the
    /// transport, when the protocol demands a response (the authentication
    /// exchange). Backend messages must be fed in the order the transport
    /// produced them.
    pub fn receive(&mut self, message: &BackendMessage) -> Result<Option<FrontendMessage>> {
        use BackendMessage as B;
        use ConnectionState::*;

        #[cfg(feature = "verbose")]
        tracing::trace!("(B){} in {}", message.name(), self.state);

        let next = match (&self.state, message) {
            // the server may still flush queued messages after a violation
            (Error(_), _) => return Ok(None),

            (Authenticating, B::Authentication(auth)) => {
                return self.advance_authentication(auth);
            }
            (Authenticating, B::ParameterStatus { name, value }) => {
                self.server_params.insert(name.clone(), value.clone());
                Authenticating
            }
            (Authenticating, B::BackendKeyData(key)) => {
                self.key_data = Some(*key);
                Authenticating
            }
            (Authenticating, B::NegotiateProtocolVersion { .. }) => Authenticating,
            (Authenticating, B::NoticeResponse { .. }) => Authenticating,
            (Authenticating, B::ErrorResponse { fields }) => {
                // a startup failure; the server closes the connection after
                let error = SqlError::from_fields(fields.clone());
                let reason = error.to_string();
                self.last_error = Some(error);
                Error(reason)
            }
            (Authenticating, B::ReadyForQuery { status }) => ReadyForQuery(*status),

            // servers report these asynchronously in every established state
            (
                ReadyForQuery(_) | Busy | CopyIn | CopyOut,
                B::ParameterStatus { name, value },
            ) => {
                self.server_params.insert(name.clone(), value.clone());
                return Ok(None);
            }
            (
                ReadyForQuery(_) | Busy | CopyIn | CopyOut,
                B::NoticeResponse { .. } | B::NotificationResponse { .. },
            ) => return Ok(None),
            (
                ReadyForQuery(_) | Busy | CopyIn | CopyOut,
                B::ErrorResponse { fields },
            ) => {
                // the cycle keeps going until the ReadyForQuery that closes it
                self.last_error = Some(SqlError::from_fields(fields.clone()));
                return Ok(None);
            }
            (
                ReadyForQuery(_) | Busy | CopyIn | CopyOut,
                B::ReadyForQuery { status },
            ) => ReadyForQuery(*status),

            (
                Busy,
                B::RowDescription { .. }
                | B::DataRow { .. }
                | B::CommandComplete { .. }
                | B::EmptyQueryResponse
                | B::ParseComplete
                | B::BindComplete
                | B::CloseComplete
                | B::NoData
                | B::PortalSuspended
                | B::ParameterDescription { .. }
                | B::FunctionCallResponse { .. },
            ) => Busy,
            (Busy, B::CopyInResponse { .. } | B::CopyBothResponse { .. }) => CopyIn,
            (Busy, B::CopyOutResponse { .. }) => CopyOut,

            (CopyOut, B::CopyData(_)) => CopyOut,
            (CopyOut, B::CopyDone) => Busy,

            _ => return Err(self.reject_receive(message)),
        };

        self.transition(next);
        Ok(None)
    }

    /// Answer an authentication request while
    /// [`Authenticating`][ConnectionState::Authenticating].
    fn advance_authentication(
        &mut self,
        auth: &Authentication,
    ) -> Result<Option<FrontendMessage>> {
        use Authentication as A;

        let response = match auth {
            A::Ok => {
                // the server must prove itself through SASLFinal before
                // declaring success
                if self.scram.as_ref().is_some_and(|scram| !scram.is_complete()) {
                    return Err(self.fail_auth(AuthError::OutOfOrder("SCRAM exchange incomplete")));
                }
                #[cfg(feature = "verbose")]
                tracing::trace!("authentication succeeded");
                self.scram = None;
                None
            }
            A::CleartextPassword => {
                let Some(password) = self.config.password.clone() else {
                    return Err(self.fail_auth(AuthError::MissingPassword));
                };
                Some(FrontendMessage::PasswordMessage { password })
            }
            A::MD5Password { salt } => {
                let Some(password) = self.config.password.as_deref() else {
                    return Err(self.fail_auth(AuthError::MissingPassword));
                };
                let password = hash_md5_password(&self.config.user, password, *salt);
                Some(FrontendMessage::PasswordMessage { password })
            }
            A::SASL { mechanisms } => {
                if !mechanisms.iter().any(|m| m == ScramAuthenticator::MECHANISM) {
                    return Err(self.fail_auth(AuthError::NoSupportedMechanism(
                        mechanisms.join(", "),
                    )));
                }
                let Some(password) = self.config.password.clone() else {
                    return Err(self.fail_auth(AuthError::MissingPassword));
                };
                let scram = ScramAuthenticator::new(&self.config.user, &password);
                let initial_response = scram.initial_response();
                self.scram = Some(scram);
                #[cfg(feature = "verbose")]
                tracing::trace!("SCRAM exchange started");
                Some(FrontendMessage::SASLInitialResponse {
                    mechanism: ScramAuthenticator::MECHANISM.to_owned(),
                    initial_response,
                })
            }
            A::SASLContinue { data } => {
                let Some(scram) = self.scram.as_mut() else {
                    return Err(self.fail_auth(AuthError::OutOfOrder("not started")));
                };
                match scram.process_server_first(data) {
                    Ok(data) => Some(FrontendMessage::SASLResponse { data }),
                    Err(err) => return Err(self.fail_auth(err)),
                }
            }
            A::SASLFinal { data } => {
                let Some(scram) = self.scram.as_mut() else {
                    return Err(self.fail_auth(AuthError::OutOfOrder("not started")));
                };
                if let Err(err) = scram.process_server_final(data) {
                    return Err(self.fail_auth(err));
                }
                #[cfg(feature = "verbose")]
                tracing::trace!("server signature verified");
                None
            }
            A::KerberosV5 => return Err(self.fail_unsupported(2)),
            A::GSS => return Err(self.fail_unsupported(7)),
            A::SSPI => return Err(self.fail_unsupported(9)),
        };
        Ok(response)
    }

    fn fail_auth(&mut self, error: AuthError) -> crate::Error {
        self.transition(ConnectionState::Error(error.to_string()));
        error.into()
    }

    fn fail_unsupported(&mut self, kind: u32) -> crate::Error {
        let error = ProtocolError::UnsupportedAuth(kind);
        self.transition(ConnectionState::Error(error.to_string()));
        error.into()
    }

    fn reject_send(&self, message: &FrontendMessage) -> crate::Error {
        ProtocolError::illegal(&self.state, format_args!("send {}", message.name())).into()
    }

    fn reject_receive(&mut self, message: &BackendMessage) -> crate::Error {
        let error = ProtocolError::illegal(
            &self.state,
            format_args!("receive {}", message.name()),
        );
        self.transition(ConnectionState::Error(error.to_string()));
        error.into()
    }

    fn transition(&mut self, next: ConnectionState) {
        #[cfg(feature = "verbose")]
        if self.state != next {
            tracing::trace!("connection state {} -> {next}", self.state);
        }
        self.state = next;
    }
}
