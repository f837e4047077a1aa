//! Password based authentication.
//!
//! The server picks the method; the client answers `AuthenticationCleartextPassword`
//! with the password itself, `AuthenticationMD5Password` with the salted
//! double MD5 digest from [`hash_md5_password`], and `AuthenticationSASL`
//! with the SCRAM-SHA-256 exchange driven by [`ScramAuthenticator`].
use md5::{Digest, Md5};

mod scram;

pub use scram::ScramAuthenticator;

/// An authentication exchange failure.
///
/// Server `ErrorResponse` messages (e.g. a wrong password rejected by the
/// server) are not `AuthError`; this covers failures detected on the client
/// side of the exchange.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The server nonce does not continue the client nonce.
    #[error("SCRAM nonce mismatch")]
    NonceMismatch,

    /// The signature of the server-final message does not match the one
    /// derived from the password, so the server does not actually know the
    /// password it verified.
    #[error("SCRAM server signature mismatch")]
    ServerSignatureMismatch,

    /// A SCRAM message did not have the expected attribute layout.
    #[error("malformed SCRAM message: {0}")]
    Malformed(String),

    /// An authentication sub-message arrived in the wrong exchange phase.
    #[error("SCRAM message out of order, exchange is {0}")]
    OutOfOrder(&'static str),

    /// The server offered none of the mechanisms the client implements.
    #[error("no supported SASL mechanism offered ({0})")]
    NoSupportedMechanism(String),

    /// The server requested a password but the configuration has none.
    #[error("password required but not configured")]
    MissingPassword,
}

/// Compute the response to an MD5 password challenge.
///
/// Formula: `"md5" || hex(md5(hex(md5(password || user)) || salt))` with
/// lowercase hexadecimal, giving a 35 character string.
pub fn hash_md5_password(user: &str, password: &str, salt: [u8; 4]) -> String {
    let mut hasher = Md5::new();
    hasher.update(password.as_bytes());
    hasher.update(user.as_bytes());
    let inner = format!("{:x}", hasher.finalize());

    let mut hasher = Md5::new();
    hasher.update(inner.as_bytes());
    hasher.update(salt);
    format!("md5{:x}", hasher.finalize())
}
